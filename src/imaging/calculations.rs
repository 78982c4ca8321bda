//! Pure calculation functions for compositing geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Geometry is computed in `f64` and only rounded when it becomes a pixel
//! coordinate or size.

use super::error::{ImagingError, Result};
use super::params::{Gutter, HorizontalAlign, VerticalAlign};
use std::cmp::Ordering;

/// How a source rectangle is fitted into a destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale to fit entirely inside the destination, letterboxing the rest.
    #[default]
    Contain,
    /// Scale to fill the destination entirely, cropping the overflow.
    Cover,
}

/// Crop and placement geometry for copying a source onto a destination.
///
/// `src_*` is the region read from the source, `dst_*` the region written in
/// the destination. Cover crops the source and always writes the full
/// destination; Contain reads the full source and letterboxes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub src_x: u32,
    pub src_y: u32,
    pub src_w: u32,
    pub src_h: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub dst_w: u32,
    pub dst_h: u32,
    /// Used dimension relative to the source dimension, in percent.
    pub scale_percent: f64,
}

/// Compare the aspect ratios of two rectangles without floating point.
///
/// `Greater` means the source is relatively wider than the destination.
fn compare_aspect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Ordering {
    (src_w as u64 * dst_h as u64).cmp(&(dst_w as u64 * src_h as u64))
}

/// Center a span of `used` pixels inside `extent`, rounding at the edge.
fn centered(extent: u32, used: f64) -> (u32, u32) {
    let size = (used.round() as u32).clamp(1, extent);
    let offset = ((extent as f64 - used) / 2.0).round() as u32;
    (offset.min(extent - size), size)
}

/// Calculate the geometry for fitting a `src` rectangle into a `dst` rectangle.
///
/// # Examples
/// ```
/// # use framesmith::imaging::{FitMode, fit};
/// // 1000x500 covering 500x500: crop the middle 500 columns
/// let r = fit(1000, 500, 500, 500, FitMode::Cover).unwrap();
/// assert_eq!((r.src_x, r.src_y, r.src_w, r.src_h), (250, 0, 500, 500));
///
/// // 1000x500 contained in 500x500: letterbox top and bottom
/// let r = fit(1000, 500, 500, 500, FitMode::Contain).unwrap();
/// assert_eq!((r.dst_x, r.dst_y, r.dst_w, r.dst_h), (0, 125, 500, 250));
/// ```
pub fn fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, mode: FitMode) -> Result<FitResult> {
    if src_w == 0 || src_h == 0 {
        return Err(ImagingError::dimension(src_w, src_h));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(ImagingError::dimension(dst_w, dst_h));
    }

    let (sw, sh) = (src_w as f64, src_h as f64);
    let (dw, dh) = (dst_w as f64, dst_h as f64);
    let shape = compare_aspect(src_w, src_h, dst_w, dst_h);

    let result = match mode {
        FitMode::Cover => {
            let (use_w, use_h, scale) = match shape {
                Ordering::Greater => {
                    // Too wide: keep full height, crop columns
                    let use_w = dw * (sh / dh);
                    (use_w, sh, use_w / sw * 100.0)
                }
                Ordering::Less => {
                    // Too tall: keep full width, crop rows
                    let use_h = dh * (sw / dw);
                    (sw, use_h, use_h / sh * 100.0)
                }
                Ordering::Equal => (sw, sh, 100.0),
            };
            let (src_x, src_w) = centered(src_w, use_w);
            let (src_y, src_h) = centered(src_h, use_h);
            FitResult {
                src_x,
                src_y,
                src_w,
                src_h,
                dst_x: 0,
                dst_y: 0,
                dst_w,
                dst_h,
                scale_percent: scale,
            }
        }
        FitMode::Contain => {
            let (use_w, use_h) = match shape {
                Ordering::Greater => (dw, sh / sw * dw),
                Ordering::Less => (sw / sh * dh, dh),
                Ordering::Equal => (dw, dh),
            };
            let (dst_x, dst_w) = centered(dst_w, use_w);
            let (dst_y, dst_h) = centered(dst_h, use_h);
            FitResult {
                src_x: 0,
                src_y: 0,
                src_w,
                src_h,
                dst_x,
                dst_y,
                dst_w,
                dst_h,
                scale_percent: use_w / sw * 100.0,
            }
        }
    };

    tracing::debug!(?mode, src_w, src_h, dst_w, dst_h, ?result, "fit");
    Ok(result)
}

/// Resolve a gutter into absolute `(x, y)` margins for a source of the given size.
pub fn gutter_margins(src_w: u32, src_h: u32, gutter: Gutter) -> (u32, u32) {
    match gutter {
        Gutter::Percent(pct) => {
            let pct = pct as f64 / 100.0;
            (
                (src_w as f64 * pct).round() as u32,
                (src_h as f64 * pct).round() as u32,
            )
        }
        Gutter::Pixels(px) => (src_w.saturating_add(px), src_h.saturating_add(px)),
    }
}

/// Corner arc `(diameter, radius)` for a rounded background of the given size.
///
/// The diameter is 26% of the longer side, capped at the shorter side so the
/// arcs never leave the canvas.
pub fn corner_geometry(width: u32, height: u32) -> (u32, u32) {
    let diameter = (width.max(height) as f64 * 0.26).round() as u32;
    let diameter = diameter.min(width.min(height));
    let radius = (diameter as f64 / 2.0).round() as u32;
    (diameter, radius)
}

/// Vertical displacement of column `x` for an arch of the given magnitude.
///
/// A downward parabola centered on the image: zero at the middle column,
/// most negative at the edges when `magnitude > 0`.
pub fn arch_height(x: u32, magnitude: f64, width: u32) -> f64 {
    let w = width as f64;
    -(magnitude / 100.0 / (w * 0.8)) * (x as f64 - w / 2.0).powi(2)
}

/// Row offset for every column of an arch, normalized so the smallest is 0.
///
/// Positive magnitudes lift the center (edges pushed down), negative
/// magnitudes invert the arch.
pub fn arch_offsets(width: u32, magnitude: f64) -> Vec<u32> {
    let heights: Vec<f64> = (0..width)
        .map(|x| arch_height(x, magnitude, width).round())
        .collect();
    let top = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    heights.iter().map(|h| (top - h) as u32).collect()
}

/// Scale a stroke width proportionally to a shrunk font size.
pub fn scaled_stroke(stroke: u32, size: f32, original_size: f32) -> u32 {
    (stroke as f32 * (size / original_size)).round() as u32
}

/// Resolve a horizontal anchor into the draw x coordinate.
pub fn align_horizontal(x: i32, width: u32, align: HorizontalAlign) -> i32 {
    match align {
        HorizontalAlign::Center => x - (width as f64 / 2.0).round() as i32,
        HorizontalAlign::Right => x - width as i32,
        HorizontalAlign::Left | HorizontalAlign::None => x,
    }
}

/// Resolve a vertical anchor into the draw baseline y coordinate.
pub fn align_vertical(y: i32, height: u32, baseline: u32, align: VerticalAlign) -> i32 {
    match align {
        VerticalAlign::Middle => y + (baseline as f64 / 2.0).round() as i32,
        VerticalAlign::Top => y + baseline as i32,
        VerticalAlign::Bottom => y - (height as i32 - baseline as i32),
        VerticalAlign::None => y,
    }
}

/// Width of a horizontally condensed span.
pub fn condensed_width(width: u32, percent: u32) -> u32 {
    (width as f64 * (percent as f64 / 100.0)).floor() as u32
}

/// Scale a straight (0 = transparent, 255 = opaque) alpha by `percent`.
///
/// Equivalent to `127 - round((127 - a) * pct / 100)` on the inverted 0–127
/// scale, but computed at full 8-bit precision so 100% is exact.
pub fn scaled_alpha(alpha: u8, percent: f64) -> u8 {
    (alpha as f64 * (percent / 100.0)).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit: scenarios
    // =========================================================================

    #[test]
    fn cover_wide_source_crops_columns() {
        let r = fit(1000, 500, 500, 500, FitMode::Cover).unwrap();
        assert_eq!((r.src_x, r.src_y, r.src_w, r.src_h), (250, 0, 500, 500));
        assert_eq!((r.dst_x, r.dst_y, r.dst_w, r.dst_h), (0, 0, 500, 500));
        assert_eq!(r.scale_percent, 50.0);
    }

    #[test]
    fn cover_tall_source_crops_rows() {
        // 400x800 covering 400x200: use 400x200 of the source, starting at row 300
        let r = fit(400, 800, 400, 200, FitMode::Cover).unwrap();
        assert_eq!((r.src_x, r.src_y, r.src_w, r.src_h), (0, 300, 400, 200));
        assert_eq!(r.scale_percent, 25.0);
    }

    #[test]
    fn contain_wide_source_letterboxes_vertically() {
        // 100x50 in 300x200 → 300x150 centered at y=25
        let r = fit(100, 50, 300, 200, FitMode::Contain).unwrap();
        assert_eq!((r.dst_x, r.dst_y, r.dst_w, r.dst_h), (0, 25, 300, 150));
        assert_eq!((r.src_x, r.src_y, r.src_w, r.src_h), (0, 0, 100, 50));
        assert_eq!(r.scale_percent, 300.0);
    }

    #[test]
    fn contain_tall_source_letterboxes_horizontally() {
        // 50x100 in 300x200 → 100x200 centered at x=100
        let r = fit(50, 100, 300, 200, FitMode::Contain).unwrap();
        assert_eq!((r.dst_x, r.dst_y, r.dst_w, r.dst_h), (100, 0, 100, 200));
    }

    #[test]
    fn equal_aspect_is_exact_in_both_modes() {
        for mode in [FitMode::Cover, FitMode::Contain] {
            let r = fit(200, 100, 400, 200, mode).unwrap();
            assert_eq!((r.src_x, r.src_y, r.dst_x, r.dst_y), (0, 0, 0, 0), "{mode:?}");
            assert_eq!((r.src_w, r.src_h), (200, 100), "{mode:?}");
            assert_eq!((r.dst_w, r.dst_h), (400, 200), "{mode:?}");
        }
    }

    #[test]
    fn equal_aspect_reports_scale() {
        assert_eq!(fit(200, 100, 400, 200, FitMode::Cover).unwrap().scale_percent, 100.0);
        assert_eq!(fit(200, 100, 400, 200, FitMode::Contain).unwrap().scale_percent, 200.0);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        for (sw, sh, dw, dh) in [(0, 10, 10, 10), (10, 0, 10, 10), (10, 10, 0, 10), (10, 10, 10, 0)] {
            assert!(matches!(
                fit(sw, sh, dw, dh, FitMode::Contain),
                Err(ImagingError::InvalidDimension { .. })
            ));
        }
    }

    // =========================================================================
    // fit: properties over a grid of sizes
    // =========================================================================

    const SIZES: &[u32] = &[37, 100, 199, 480, 640, 1000, 1921];

    fn each_case(mut check: impl FnMut(u32, u32, u32, u32)) {
        for &sw in SIZES {
            for &sh in SIZES {
                for &dw in SIZES {
                    for &dh in SIZES {
                        check(sw, sh, dw, dh);
                    }
                }
            }
        }
    }

    #[test]
    fn cover_uses_destination_aspect_inside_source() {
        each_case(|sw, sh, dw, dh| {
            let r = fit(sw, sh, dw, dh, FitMode::Cover).unwrap();
            let aspect = dw as f64 / dh as f64;
            let drift = (r.src_w as f64 - aspect * r.src_h as f64).abs();
            assert!(drift <= 0.5 + 0.5 * aspect + 1e-9, "{sw}x{sh} -> {dw}x{dh}: {r:?}");
            assert!(r.src_x + r.src_w <= sw && r.src_y + r.src_h <= sh, "{r:?}");
            assert_eq!((r.dst_x, r.dst_y, r.dst_w, r.dst_h), (0, 0, dw, dh));
        });
    }

    #[test]
    fn contain_uses_source_aspect_inside_destination() {
        each_case(|sw, sh, dw, dh| {
            let r = fit(sw, sh, dw, dh, FitMode::Contain).unwrap();
            let aspect = sw as f64 / sh as f64;
            let drift = (r.dst_w as f64 - aspect * r.dst_h as f64).abs();
            assert!(drift <= 0.5 + 0.5 * aspect + 1e-9, "{sw}x{sh} -> {dw}x{dh}: {r:?}");
            assert!(r.dst_x + r.dst_w <= dw && r.dst_y + r.dst_h <= dh, "{r:?}");
            assert_eq!((r.src_x, r.src_y, r.src_w, r.src_h), (0, 0, sw, sh));
        });
    }

    #[test]
    fn only_one_side_is_offset() {
        each_case(|sw, sh, dw, dh| {
            let cover = fit(sw, sh, dw, dh, FitMode::Cover).unwrap();
            assert!(cover.src_x == 0 || cover.src_y == 0);
            let contain = fit(sw, sh, dw, dh, FitMode::Contain).unwrap();
            assert!(contain.dst_x == 0 || contain.dst_y == 0);
        });
    }

    // =========================================================================
    // gutter_margins
    // =========================================================================

    #[test]
    fn percent_gutter_is_per_axis() {
        assert_eq!(gutter_margins(100, 200, Gutter::Percent(10)), (10, 20));
        assert_eq!(gutter_margins(15, 25, Gutter::Percent(10)), (2, 3));
    }

    #[test]
    fn pixel_gutter_adds_source_size() {
        assert_eq!(gutter_margins(100, 200, Gutter::Pixels(5)), (105, 205));
    }

    // =========================================================================
    // corner_geometry
    // =========================================================================

    #[test]
    fn corner_diameter_is_quarter_of_long_side() {
        assert_eq!(corner_geometry(1000, 1000), (260, 130));
        assert_eq!(corner_geometry(2000, 1000), (520, 260));
    }

    #[test]
    fn corner_diameter_capped_by_short_side() {
        assert_eq!(corner_geometry(1000, 100), (100, 50));
    }

    // =========================================================================
    // arch
    // =========================================================================

    #[test]
    fn arch_height_is_zero_at_center() {
        assert_eq!(arch_height(50, 30.0, 100), 0.0);
        // -(0.3 / 80) * 50^2 = -9.375
        assert!((arch_height(0, 30.0, 100) + 9.375).abs() < 1e-9);
    }

    #[test]
    fn arch_offsets_lift_center() {
        let offsets = arch_offsets(100, 30.0);
        assert_eq!(offsets[50], 0);
        assert_eq!(offsets[0], 9);
        assert_eq!(*offsets.iter().max().unwrap(), 9);
    }

    #[test]
    fn negative_arch_inverts() {
        let offsets = arch_offsets(100, -30.0);
        assert_eq!(offsets[50], 9);
        assert_eq!(offsets[0], 0);
    }

    #[test]
    fn zero_magnitude_has_no_offsets() {
        assert!(arch_offsets(64, 0.0).iter().all(|&o| o == 0));
    }

    // =========================================================================
    // text helpers
    // =========================================================================

    #[test]
    fn stroke_scales_with_size() {
        assert_eq!(scaled_stroke(4, 20.0, 40.0), 2);
        assert_eq!(scaled_stroke(3, 30.0, 40.0), 2); // 2.25 → 2
        assert_eq!(scaled_stroke(0, 10.0, 40.0), 0);
    }

    #[test]
    fn horizontal_alignment() {
        assert_eq!(align_horizontal(100, 41, HorizontalAlign::Left), 100);
        assert_eq!(align_horizontal(100, 41, HorizontalAlign::None), 100);
        assert_eq!(align_horizontal(100, 41, HorizontalAlign::Center), 79); // round(20.5) = 21
        assert_eq!(align_horizontal(100, 41, HorizontalAlign::Right), 59);
    }

    #[test]
    fn vertical_alignment() {
        // height 30 with descenders, baseline 22
        assert_eq!(align_vertical(100, 30, 22, VerticalAlign::Top), 122);
        assert_eq!(align_vertical(100, 30, 22, VerticalAlign::Middle), 111);
        assert_eq!(align_vertical(100, 30, 22, VerticalAlign::Bottom), 92);
        assert_eq!(align_vertical(100, 30, 22, VerticalAlign::None), 100);
    }

    #[test]
    fn condensed_width_floors() {
        assert_eq!(condensed_width(102, 80), 81); // 81.6
        assert_eq!(condensed_width(50, 100), 50);
        assert_eq!(condensed_width(50, 0), 0);
    }

    #[test]
    fn alpha_scaling_bounds() {
        for a in [0u8, 1, 64, 127, 200, 255] {
            assert_eq!(scaled_alpha(a, 100.0), a);
            assert_eq!(scaled_alpha(a, 0.0), 0);
        }
        assert_eq!(scaled_alpha(255, 50.0), 128);
        assert_eq!(scaled_alpha(200, 150.0), 255);
    }
}
