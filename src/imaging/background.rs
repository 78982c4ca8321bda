//! Background canvases: transparent, solid, or a rounded rectangle.
//!
//! The rounded outline is stroked as an aliased `tiny_skia` hairline on a
//! supersampled canvas, flood-filled from the center and downsampled.

use super::calculations::{corner_geometry, scaled_alpha};
use super::canvas::PixelBuffer;
use super::error::{ImagingError, Result};
use super::params::{Color, FillSpec};
use tiny_skia::{Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

/// Rounded backgrounds are drawn at this multiple of the target size and
/// downsampled, which antialiases the corners.
const SUPERSAMPLE: u32 = 10;

/// Cubic control-point distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Build a `width` x `height` canvas filled according to `fill`.
pub fn build_background(width: u32, height: u32, fill: FillSpec) -> Result<PixelBuffer> {
    match fill {
        FillSpec::Transparent => PixelBuffer::transparent(width, height),
        FillSpec::Solid(color) => PixelBuffer::filled(width, height, color),
        FillSpec::RoundedSolid(color) => rounded(width, height, color),
    }
}

fn rounded(width: u32, height: u32, color: Color) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(ImagingError::dimension(width, height));
    }
    let big_w = width
        .checked_mul(SUPERSAMPLE)
        .ok_or_else(|| ImagingError::dimension(width, height))?;
    let big_h = height
        .checked_mul(SUPERSAMPLE)
        .ok_or_else(|| ImagingError::dimension(width, height))?;

    let (diameter, radius) = corner_geometry(big_w, big_h);
    let solid = Color { a: 255, ..color };
    let mut big = outline(big_w, big_h, radius, solid)?;
    big.flood_fill(big_w / 2, big_h / 2, solid);
    tracing::debug!(width, height, diameter, radius, "rounded background");

    let mut canvas = PixelBuffer::transparent(width, height)?;
    canvas.copy_resampled(&big, 0, 0, 0, 0, width, height, big_w, big_h);
    if color.a < 255 {
        let percent = color.a as f64 * 100.0 / 255.0;
        for p in canvas.as_image_mut().pixels_mut() {
            p.0[3] = scaled_alpha(p.0[3], percent);
        }
    }
    Ok(canvas)
}

/// Stroke the rounded-rectangle outline onto a transparent `width` x `height` canvas.
///
/// The outline runs along column 0, column `width - 1`, row 0 and row
/// `height - 1`, with quarter arcs of `radius` at each corner. Coordinates sit
/// a quarter pixel into each pixel so floor and round snapping agree.
fn outline(width: u32, height: u32, radius: u32, color: Color) -> Result<PixelBuffer> {
    let path = outline_path(width, height, radius)
        .ok_or_else(|| ImagingError::dimension(width, height))?;
    let mut pixmap =
        Pixmap::new(width, height).ok_or_else(|| ImagingError::dimension(width, height))?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = false;
    // Zero width strokes a one-pixel hairline
    let stroke = Stroke {
        width: 0.0,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

    let mut canvas = PixelBuffer::transparent(width, height)?;
    let stroked = pixmap.data().chunks_exact(4).map(|px| px[3] > 0);
    for (px, on_outline) in canvas.as_image_mut().pixels_mut().zip(stroked) {
        if on_outline {
            *px = color.to_rgba();
        }
    }
    Ok(canvas)
}

fn outline_path(width: u32, height: u32, radius: u32) -> Option<Path> {
    let (left, top) = (0.25_f32, 0.25_f32);
    let (right, bottom) = (width as f32 - 0.75, height as f32 - 0.75);
    let r = radius as f32;
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    pb.line_to(right - r, top);
    pb.cubic_to(right - r + k, top, right, top + r - k, right, top + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(left + r, bottom);
    pb.cubic_to(left + r - k, bottom, left, bottom - r + k, left, bottom - r);
    pb.line_to(left, top + r);
    pb.cubic_to(left, top + r - k, left + r - k, top, left + r, top);
    pb.close();
    pb.finish()
}
