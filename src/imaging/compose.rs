//! Fitting sources onto destination canvases.
//!
//! These functions combine the pure geometry in
//! [`calculations`](super::calculations) with the raster primitives of
//! [`PixelBuffer`]:
//!
//! - [`resize`]: frame a source into a fresh canvas (background, gutter, Contain fit)
//! - [`fit_to_image`]: fit a source onto an existing canvas
//! - [`resize_for_constrained_file_size`]: frame and JPEG-encode under a byte budget

use super::background::build_background;
use super::calculations::{FitMode, FitResult, fit};
use super::canvas::PixelBuffer;
use super::codec::{OutputFormat, encode};
use super::error::{ImagingError, Result};
use super::gutter::add_gutter;
use super::params::{FrameOptions, Quality};
use serde::{Deserialize, Serialize};

/// Maximum pixel size and byte budget for a constrained encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstrainedTarget {
    pub width: u32,
    pub height: u32,
    pub max_bytes: u64,
}

/// Bluesky's external-embed thumbnail limits.
pub const BLUESKY_THUMBNAIL: ConstrainedTarget = ConstrainedTarget {
    width: 1000,
    height: 1000,
    max_bytes: 976_560,
};

impl Default for ConstrainedTarget {
    fn default() -> Self {
        BLUESKY_THUMBNAIL
    }
}

/// Encoded image bytes plus what they are.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    /// Quality the bytes were encoded at.
    pub quality: Quality,
}

/// Allocate a fully transparent canvas.
pub fn create_transparent(width: u32, height: u32) -> Result<PixelBuffer> {
    PixelBuffer::transparent(width, height)
}

/// Frame `src` into a new `dst_w` x `dst_h` canvas.
///
/// The source is padded by the optional gutter, then Contain-fitted over the
/// background described by `options`. `src` itself is never modified.
#[tracing::instrument(skip(src), fields(src_w = src.width(), src_h = src.height()))]
pub fn resize(
    src: &PixelBuffer,
    dst_w: u32,
    dst_h: u32,
    options: &FrameOptions,
) -> Result<PixelBuffer> {
    let padded;
    let source = match options.gutter {
        Some(gutter) => {
            padded = add_gutter(src.clone(), gutter)?;
            &padded
        }
        None => src,
    };

    let mut canvas = build_background(dst_w, dst_h, options.fill_spec())?;
    fit_to_image(&mut canvas, source, FitMode::Contain)?;
    Ok(canvas)
}

/// Copy `src` onto `dst` using the geometry of [`fit`] for their sizes.
pub fn fit_to_image(dst: &mut PixelBuffer, src: &PixelBuffer, mode: FitMode) -> Result<FitResult> {
    let (src_w, src_h) = src.dimensions();
    let (dst_w, dst_h) = dst.dimensions();
    let r = fit(src_w, src_h, dst_w, dst_h, mode)?;
    dst.copy_resampled(
        src,
        r.dst_x as i64,
        r.dst_y as i64,
        r.src_x,
        r.src_y,
        r.dst_w,
        r.dst_h,
        r.src_w,
        r.src_h,
    );
    Ok(r)
}

/// Contain-fit `src` into `max_w` x `max_h` and JPEG-encode it under `max_bytes`.
///
/// Quality starts at 100 and steps down by one until the encoding fits.
#[tracing::instrument(skip(src), fields(src_w = src.width(), src_h = src.height()))]
pub fn resize_for_constrained_file_size(
    src: &PixelBuffer,
    max_w: u32,
    max_h: u32,
    max_bytes: u64,
) -> Result<EncodedImage> {
    let mut canvas = create_transparent(max_w, max_h)?;
    fit_to_image(&mut canvas, src, FitMode::Contain)?;

    let format = OutputFormat::Jpeg;
    for q in (1..=100).rev() {
        let quality = Quality::new(q);
        let bytes = encode(&canvas, format, quality)?;
        tracing::debug!(quality = q, size = bytes.len(), "constrained encode attempt");
        if !bytes.is_empty() && bytes.len() as u64 <= max_bytes {
            return Ok(EncodedImage {
                bytes,
                mime_type: format.mime_type(),
                quality,
            });
        }
    }
    Err(ImagingError::EncodingUnachievable { max_bytes })
}

/// [`resize_for_constrained_file_size`] with the [`BLUESKY_THUMBNAIL`] limits.
pub fn resize_for_bluesky_thumbnail(src: &PixelBuffer) -> Result<EncodedImage> {
    let ConstrainedTarget {
        width,
        height,
        max_bytes,
    } = BLUESKY_THUMBNAIL;
    resize_for_constrained_file_size(src, width, height, max_bytes)
}
