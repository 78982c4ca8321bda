//! Transparent padding around an image.

use super::calculations::gutter_margins;
use super::canvas::PixelBuffer;
use super::error::{ImagingError, Result};
use super::params::Gutter;

/// Pad `img` with a transparent margin on every side.
///
/// `Gutter::Percent` adds that share of each dimension per side.
/// `Gutter::Pixels(n)` adds `dimension + n` per side.
pub fn add_gutter(img: PixelBuffer, gutter: Gutter) -> Result<PixelBuffer> {
    let (src_w, src_h) = img.dimensions();
    let (margin_x, margin_y) = gutter_margins(src_w, src_h, gutter);
    let padded = |dim: u32, margin: u32| {
        margin
            .checked_mul(2)
            .and_then(|m| dim.checked_add(m))
            .ok_or_else(|| ImagingError::InvalidGutter(format!("{gutter:?} overflows {src_w}x{src_h}")))
    };
    let dst_w = padded(src_w, margin_x)?;
    let dst_h = padded(src_h, margin_y)?;

    let mut dst = PixelBuffer::transparent(dst_w, dst_h)?;
    dst.copy_resampled(
        &img,
        margin_x as i64,
        margin_y as i64,
        0,
        0,
        src_w,
        src_h,
        src_w,
        src_h,
    );
    tracing::debug!(?gutter, margin_x, margin_y, dst_w, dst_h, "gutter added");
    Ok(dst)
}
