//! Text layout and rendering on top of a [`TextBackend`].
//!
//! Layout works from the backend's bounding box. The *baseline* of a box is
//! the height of `"ABCDEF"` at the same size, so alignment anchors on cap
//! height rather than on the string's own ascenders and descenders.
//!
//! | Vertical | Draw y (baseline) |
//! |---|---|
//! | `Top` | `y + baseline` |
//! | `Middle` | `y + round(baseline / 2)` |
//! | `Bottom` | `y - (height - baseline)` |
//! | `None` | `y` |

use super::calculations::{align_horizontal, align_vertical, condensed_width, scaled_stroke};
use super::canvas::PixelBuffer;
use super::error::{ImagingError, Result};
use super::font::TextBackend;
use super::params::{Color, HorizontalAlign, TextStyle, VerticalAlign};

/// Reference string whose height is the baseline of every box.
const BASELINE_SAMPLE: &str = "ABCDEF";

/// Smallest font size the shrink-to-fit loop will try.
const MIN_FONT_SIZE: f32 = 1.0;

/// Measured size of a string at one font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
    pub baseline: u32,
}

/// Resolved size, stroke and baseline origin for drawing a string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub size: f32,
    pub x: i32,
    pub y: i32,
    pub stroke: u32,
    pub text_box: TextBox,
}

pub fn measure(backend: &impl TextBackend, text: &str, size: f32) -> TextBox {
    let bounds = backend.bounding_box(text, size);
    TextBox {
        width: bounds.width(),
        height: bounds.height(),
        baseline: backend.bounding_box(BASELINE_SAMPLE, size).height(),
    }
}

/// Pick the font size and draw origin for `text` anchored at `(x, y)`.
///
/// With a `max_width`, the size drops one point at a time (scaling the
/// stroke along with it) until the text plus stroke on both sides fits.
pub fn layout(
    backend: &impl TextBackend,
    text: &str,
    x: i32,
    y: i32,
    style: &TextStyle,
) -> Result<TextLayout> {
    let mut size = style.size;
    let (text_box, stroke) = loop {
        let text_box = measure(backend, text, size);
        let stroke = scaled_stroke(style.stroke, size, style.size);
        let needed = text_box.width as u64 + 2 * stroke as u64;
        match style.max_width {
            Some(max_width) if needed > max_width as u64 => {
                tracing::debug!(size, needed, max_width, "text too wide, shrinking");
                size -= 1.0;
                if size < MIN_FONT_SIZE {
                    return Err(ImagingError::LayoutUnachievable { max_width });
                }
            }
            _ => break (text_box, stroke),
        }
    };

    Ok(TextLayout {
        size,
        x: align_horizontal(x, text_box.width, style.horizontal),
        y: align_vertical(y, text_box.height, text_box.baseline, style.vertical),
        stroke,
        text_box,
    })
}

/// Draw `text` at a resolved layout.
///
/// A non-zero stroke with a stroke color draws the text in the stroke color
/// at every offset within `stroke` pixels first, then the fill on top.
pub fn render(
    canvas: &mut PixelBuffer,
    backend: &impl TextBackend,
    text: &str,
    layout: &TextLayout,
    color: Color,
    stroke_color: Option<Color>,
) {
    if let Some(stroke_color) = stroke_color.filter(|_| layout.stroke > 0) {
        let s = layout.stroke as i32;
        for dx in -s..=s {
            for dy in -s..=s {
                backend.draw_text(
                    canvas,
                    text,
                    layout.size,
                    layout.x + dx,
                    layout.y + dy,
                    stroke_color,
                );
            }
        }
    }
    backend.draw_text(canvas, text, layout.size, layout.x, layout.y, color);
}

/// Lay out and draw `text` anchored at `(x, y)`.
pub fn write_text(
    canvas: &mut PixelBuffer,
    backend: &impl TextBackend,
    text: &str,
    x: i32,
    y: i32,
    style: &TextStyle,
) -> Result<TextLayout> {
    let layout = layout(backend, text, x, y, style)?;
    render(canvas, backend, text, &layout, style.color, style.stroke_color);
    Ok(layout)
}

/// Draw `text` squeezed horizontally to `condensed` percent of its width.
///
/// The text is rendered at full width into a scratch canvas with a 1px
/// transparent border, then resampled onto `canvas`. Alignment applies to
/// the condensed width.
#[allow(clippy::too_many_arguments)]
pub fn write_condensed_text(
    canvas: &mut PixelBuffer,
    backend: &impl TextBackend,
    text: &str,
    size: f32,
    color: Color,
    condensed: u32,
    x: i32,
    y: i32,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
) -> Result<()> {
    let text_box = measure(backend, text, size);
    let scratch_w = text_box.width + 2;
    let scratch_h = text_box.height + 2;

    let mut scratch = PixelBuffer::transparent(scratch_w, scratch_h)?;
    let style = TextStyle {
        size,
        color,
        ..TextStyle::default()
    };
    write_text(&mut scratch, backend, text, 1, 1, &style)?;

    let dst_w = condensed_width(scratch_w, condensed);
    let dst_x = align_horizontal(x, dst_w, horizontal) - 1;
    let dst_y = match vertical {
        VerticalAlign::Top => y,
        _ => align_vertical(y, text_box.height, text_box.baseline, vertical) - text_box.baseline as i32,
    } - 1;
    tracing::debug!(condensed, dst_w, dst_x, dst_y, "condensed text");

    canvas.copy_resampled(
        &scratch,
        dst_x as i64,
        dst_y as i64,
        0,
        0,
        dst_w,
        scratch_h,
        scratch_w,
        scratch_h,
    );
    Ok(())
}
