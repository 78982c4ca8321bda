//! # Framesmith
//!
//! An image-compositing toolkit: fit raster images into frames, pad and
//! background them, stamp styled text, and bend or fade the result.
//!
//! # Pipeline
//!
//! Every operation reads and writes an owned RGBA canvas
//! ([`imaging::PixelBuffer`]):
//!
//! ```text
//! decode ─→ add_gutter ─→ resize / fit_to_image ─→ write_text ─→ apply_arch / set_opacity ─→ encode
//!              (pad)        (background + fit)        (stamp)          (warp / fade)
//! ```
//!
//! Steps are independent; callers pick the ones they need. The `framesmith`
//! binary exposes each as a subcommand.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Fit geometry, canvases, backgrounds, gutters, text layout, transforms, codecs |
//! | [`config`] | `framesmith.toml` loading, validation and merging for CLI defaults |
//!
//! # Design Decisions
//!
//! ## Pure Geometry, Thin Raster Layer
//!
//! All sizing math (fit rectangles, gutter margins, corner radii, arch
//! offsets, text alignment) lives in pure functions that take and return
//! numbers. The raster layer only copies, fills and blends pixels, so the
//! geometry is unit tested without images.
//!
//! ## Exact Aspect Comparison
//!
//! Deciding whether a source is relatively wider than its destination
//! compares `src_w * dst_h` with `dst_w * src_h` in 64-bit integers.
//! Equal aspect ratios are detected exactly, so a 200x100 source fills a
//! 400x200 frame with no one-pixel crop or letterbox.
//!
//! ## Font Backend Trait
//!
//! Text layout only needs a bounding box and a way to draw a string at a
//! baseline. That seam is the [`imaging::TextBackend`] trait: the binary
//! uses `ab_glyph` through [`imaging::GlyphFont`], tests use a fixed-metric
//! mock that records every draw.
//!
//! ## Ownership Instead of Handle Swapping
//!
//! Operations that produce a differently-sized canvas
//! ([`imaging::add_gutter`], [`imaging::apply_arch`]) consume their input and
//! return the new buffer. Scratch canvases are plain owned values dropped at
//! scope end, including on early error returns.

pub mod config;
pub mod imaging;
