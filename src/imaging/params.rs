//! Parameter types for compositing operations.
//!
//! These types describe *what* to draw, not *how*. They are the interface
//! between callers (the CLI, config files, library users) and the pixel
//! work in [`compose`](super::compose), [`text`](super::text) and
//! [`transform`](super::transform). All of them validate at construction or
//! parse time so the drawing code never sees an out-of-range value.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Color`]: RGBA8 color, parsed from `#rgb`, `#rrggbb` or `#rrggbbaa`.
//! - [`Gutter`]: Padding added around a source: `"10%"` or `"10"` pixels.
//! - [`FillSpec`]: Background fill: transparent, solid, or rounded solid.
//! - [`HorizontalAlign`] / [`VerticalAlign`]: Text anchor resolution.
//! - [`FrameOptions`]: Optional arguments of a framed resize.
//! - [`TextStyle`]: Optional arguments of a text stamp.

use super::error::ImagingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Straight-alpha RGBA color. `a = 255` is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(px: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self { r, g, b, a }
    }
}

impl FromStr for Color {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ImagingError::InvalidColor(s.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let digit = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|d| d * 17)
                        .map_err(|_| invalid())
                };
                Ok(Color::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ImagingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Padding added around a source image before it is placed.
///
/// - `Percent(n)`: margin is `round(dimension * n / 100)` on each axis.
/// - `Pixels(n)`: margin is `dimension + n` on each axis. This is much
///   larger than a plain `n` pixel border and is kept for compatibility
///   with existing layouts that depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gutter {
    Percent(u32),
    Pixels(u32),
}

impl FromStr for Gutter {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |_| ImagingError::InvalidGutter(s.to_string());
        match trimmed.strip_suffix('%') {
            Some(pct) => pct.trim().parse().map(Gutter::Percent).map_err(invalid),
            None => trimmed.parse().map(Gutter::Pixels).map_err(invalid),
        }
    }
}

impl TryFrom<String> for Gutter {
    type Error = ImagingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Gutter> for String {
    fn from(g: Gutter) -> Self {
        match g {
            Gutter::Percent(n) => format!("{n}%"),
            Gutter::Pixels(n) => n.to_string(),
        }
    }
}

/// How a background canvas is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillSpec {
    Transparent,
    Solid(Color),
    /// Solid fill clipped to a rounded rectangle.
    RoundedSolid(Color),
}

/// Horizontal text anchor. `None` treats the x coordinate as final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    None,
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchor. `None` treats the y coordinate as the final baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    None,
    Bottom,
    Middle,
    #[default]
    Top,
}

impl TryFrom<u8> for HorizontalAlign {
    type Error = ImagingError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Left),
            2 => Ok(Self::Center),
            3 => Ok(Self::Right),
            other => Err(ImagingError::InvalidAlignment(other)),
        }
    }
}

impl TryFrom<u8> for VerticalAlign {
    type Error = ImagingError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Bottom),
            2 => Ok(Self::Middle),
            3 => Ok(Self::Top),
            other => Err(ImagingError::InvalidAlignment(other)),
        }
    }
}

impl FromStr for HorizontalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(format!(
                "unknown horizontal alignment '{other}' (expected none|left|center|right)"
            )),
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "bottom" => Ok(Self::Bottom),
            "middle" => Ok(Self::Middle),
            "top" => Ok(Self::Top),
            other => Err(format!(
                "unknown vertical alignment '{other}' (expected none|bottom|middle|top)"
            )),
        }
    }
}

/// Optional arguments of [`resize`](super::compose::resize).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOptions {
    /// Background color painted behind the fitted source.
    pub background: Option<Color>,
    /// Clip the background to a rounded rectangle. Ignored without a background.
    pub rounded: bool,
    /// Padding added around the source before fitting.
    pub gutter: Option<Gutter>,
}

impl FrameOptions {
    /// The background fill this frame asks for.
    pub fn fill_spec(&self) -> FillSpec {
        match (self.background, self.rounded) {
            (None, _) => FillSpec::Transparent,
            (Some(color), false) => FillSpec::Solid(color),
            (Some(color), true) => FillSpec::RoundedSolid(color),
        }
    }
}

/// Styling for [`write_text`](super::text::write_text).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Requested font size in points.
    pub size: f32,
    pub color: Color,
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    /// Shrink the font until the text (plus stroke) fits this width.
    pub max_width: Option<u32>,
    /// Outline thickness in pixels at the requested size.
    pub stroke: u32,
    pub stroke_color: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            color: Color::BLACK,
            horizontal: HorizontalAlign::default(),
            vertical: VerticalAlign::default(),
            max_width: None,
            stroke: 0,
            stroke_color: None,
        }
    }
}
