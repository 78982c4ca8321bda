//! Font metrics and glyph rendering.
//!
//! The [`TextBackend`] trait is the seam between text layout and the font
//! rasterizer: layout only ever asks for a bounding box and for a string to
//! be drawn at a baseline origin. The production implementation is
//! [`GlyphFont`], backed by `ab_glyph`.
//!
//! ## Font kind dispatch
//!
//! The font path's extension (the text after the last `.`) selects the
//! loading path. Exactly `ttf` is [`FontKind::TrueType`]; anything else,
//! including an upper-case `TTF`, goes down the [`FontKind::FreeType`] path.
//! There is no content sniffing. An extension that is not a known font type
//! is logged and still loaded through the FreeType path.

use super::canvas::PixelBuffer;
use super::error::{ImagingError, Result};
use super::params::Color;
use ab_glyph::{Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont, point};
use std::path::{Path, PathBuf};

/// Extensions the FreeType path knows how to handle.
const FREETYPE_EXTENSIONS: &[&str] = &["otf", "ttc", "otc", "TTF", "OTF", "TTC"];

/// Pixel bounds of a rendered string relative to its baseline origin.
///
/// `top` is negative for glyphs that rise above the baseline; `bottom` is
/// positive for descenders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl GlyphBounds {
    pub fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }
}

/// Text metrics and rendering for a single font face.
///
/// Sizes are in points. `draw_text` places the string's baseline origin at
/// `(x, y)` and composites it over the canvas.
pub trait TextBackend: Sync {
    /// Bounding box of `text` rendered at `size`.
    fn bounding_box(&self, text: &str, size: f32) -> GlyphBounds;

    /// Draw `text` with its baseline origin at `(x, y)`.
    fn draw_text(
        &self,
        canvas: &mut PixelBuffer,
        text: &str,
        size: f32,
        x: i32,
        y: i32,
        color: Color,
    );
}

/// Loading path selected from a font file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    TrueType,
    FreeType,
}

impl FontKind {
    pub fn from_path(path: &Path) -> Self {
        let name = path.to_string_lossy();
        if font_extension(&name) == "ttf" {
            Self::TrueType
        } else {
            Self::FreeType
        }
    }
}

/// Text after the last `.`, or the whole name when there is none.
fn font_extension(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// An `ab_glyph` font face loaded from disk.
pub struct GlyphFont {
    font: FontVec,
    kind: FontKind,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont").field("kind", &self.kind).finish_non_exhaustive()
    }
}

impl GlyphFont {
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data, path)
    }

    /// Parse font data, using `path` only to pick the [`FontKind`] and for errors.
    pub fn from_bytes(data: Vec<u8>, path: &Path) -> Result<Self> {
        let kind = FontKind::from_path(path);
        let name = path.to_string_lossy();
        let extension = font_extension(&name);
        if kind == FontKind::FreeType && !FREETYPE_EXTENSIONS.contains(&extension) {
            tracing::warn!(path = %path.display(), extension, "unrecognized font extension, using FreeType path");
        }

        let font = FontVec::try_from_vec(data).map_err(|e| match kind {
            FontKind::TrueType => ImagingError::FontLoad {
                path: PathBuf::from(path),
                reason: e.to_string(),
            },
            FontKind::FreeType => ImagingError::UnsupportedFontType {
                path: PathBuf::from(path),
                extension: extension.to_string(),
            },
        })?;
        tracing::debug!(path = %path.display(), ?kind, "font loaded");
        Ok(Self { font, kind })
    }

    pub fn kind(&self) -> FontKind {
        self.kind
    }

    /// `ab_glyph` scales by line height; convert a point size at 96 dpi.
    fn scale(&self, size: f32) -> PxScale {
        let px_per_em = size * 96.0 / 72.0;
        match self.font.units_per_em() {
            Some(units) => PxScale::from(px_per_em * self.font.height_unscaled() / units),
            None => PxScale::from(px_per_em),
        }
    }

    /// Glyphs laid out along a baseline starting at `(x, y)`, plus the final caret x.
    fn layout(&self, text: &str, size: f32, x: f32, y: f32) -> (Vec<Glyph>, f32) {
        let scale = self.scale(size);
        let scaled = self.font.as_scaled(scale);
        let mut caret = x;
        let mut previous: Option<GlyphId> = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, y)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        (glyphs, caret)
    }
}

impl TextBackend for GlyphFont {
    fn bounding_box(&self, text: &str, size: f32) -> GlyphBounds {
        let (glyphs, caret) = self.layout(text, size, 0.0, 0.0);
        let mut bounds = GlyphBounds {
            right: caret.ceil() as i32,
            ..GlyphBounds::default()
        };
        for glyph in glyphs {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let px = outlined.px_bounds();
                bounds.left = bounds.left.min(px.min.x.floor() as i32);
                bounds.top = bounds.top.min(px.min.y.floor() as i32);
                bounds.right = bounds.right.max(px.max.x.ceil() as i32);
                bounds.bottom = bounds.bottom.max(px.max.y.ceil() as i32);
            }
        }
        bounds
    }

    fn draw_text(
        &self,
        canvas: &mut PixelBuffer,
        text: &str,
        size: f32,
        x: i32,
        y: i32,
        color: Color,
    ) {
        let (glyphs, _) = self.layout(text, size, x as f32, y as f32);
        for glyph in glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let origin = outlined.px_bounds().min;
            outlined.draw(|gx, gy, coverage| {
                canvas.blend_pixel(
                    origin.x as i64 + gx as i64,
                    origin.y as i64 + gy as i64,
                    color,
                    coverage,
                );
            });
        }
    }
}
