//! Image compositing: fitting, framing, text and pixel transforms.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (JPEG, PNG, GIF, TIFF, WebP in; JPEG, PNG, WebP out) |
//! | **Copy-resample** | `image::imageops::resize` (`Triangle`) + `overlay` |
//! | **Glyph metrics / raster** | `ab_glyph` outlines, coverage blended into the canvas |
//! | **Rounded background** | 10× supersampled arcs + flood fill, then downsampled |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit, gutter, arch and alignment math (unit testable)
//! - **Parameters**: Colors, alignment, gutters and option structs
//! - **Canvas**: [`PixelBuffer`] and its raster primitives
//! - **Font**: [`TextBackend`] trait + [`GlyphFont`]
//! - **Operations**: background, gutter, compose, text and transform, built from the above

mod background;
mod calculations;
pub mod canvas;
pub mod codec;
mod compose;
mod error;
pub mod font;
mod gutter;
mod params;
mod text;
mod transform;

pub use background::build_background;
pub use calculations::{FitMode, FitResult, fit};
pub use canvas::PixelBuffer;
pub use codec::{OutputFormat, decode, encode, open, save, supported_input_extensions};
pub use compose::{
    BLUESKY_THUMBNAIL, ConstrainedTarget, EncodedImage, create_transparent, fit_to_image, resize,
    resize_for_bluesky_thumbnail, resize_for_constrained_file_size,
};
pub use error::{ImagingError, Result};
pub use font::{FontKind, GlyphBounds, GlyphFont, TextBackend};
pub use gutter::add_gutter;
pub use params::{
    Color, FillSpec, FrameOptions, Gutter, HorizontalAlign, Quality, TextStyle, VerticalAlign,
};
pub use text::{TextBox, TextLayout, layout, measure, render, write_condensed_text, write_text};
pub use transform::{apply_arch, set_opacity};
