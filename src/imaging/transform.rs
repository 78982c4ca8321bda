//! Pixel-level transforms: the vertical arch warp and opacity scaling.

use super::calculations::{arch_offsets, scaled_alpha};
use super::canvas::PixelBuffer;
use super::error::{ImagingError, Result};

/// Bend `img` along a parabola centered on its middle column.
///
/// Each column is shifted down by its offset on the curve without
/// resampling; the canvas grows by the largest offset. Positive magnitudes
/// leave the center highest, negative ones invert the arch, and zero
/// returns the image unchanged.
pub fn apply_arch(img: PixelBuffer, magnitude: f64) -> Result<PixelBuffer> {
    if magnitude == 0.0 {
        return Ok(img);
    }
    let (width, height) = img.dimensions();
    let offsets = arch_offsets(width, magnitude);
    let grow = offsets.iter().copied().max().unwrap_or(0);
    let out_height = height
        .checked_add(grow)
        .ok_or_else(|| ImagingError::dimension(width, u32::MAX))?;

    let mut out = PixelBuffer::transparent(width, out_height)?;
    for (x, &offset) in offsets.iter().enumerate() {
        let x = x as u32;
        for y in 0..height {
            if let Some(color) = img.get_pixel(x, y) {
                out.set_pixel(x as i64, (y + offset) as i64, color);
            }
        }
    }
    tracing::debug!(magnitude, width, height, grow, "arch applied");
    Ok(out)
}

/// Scale every pixel's alpha to `percent` of its current value. Color is untouched.
pub fn set_opacity(img: &mut PixelBuffer, percent: f64) {
    let (width, height) = img.dimensions();
    for y in 0..height {
        for x in 0..width {
            if let Some(mut color) = img.get_pixel(x, y) {
                color.a = scaled_alpha(color.a, percent);
                img.set_pixel(x as i64, y as i64, color);
            }
        }
    }
}
