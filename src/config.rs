//! CLI configuration module.
//!
//! Handles loading, validating, and merging `framesmith.toml`. Stock defaults
//! are serialized to a TOML table, the user's file is merged on top of it,
//! and the result is deserialized and validated. Command-line flags override
//! the resolved values per invocation.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [frame]
//! # background = "#ffffff"  # Background behind fitted images (omit for transparent)
//! rounded = false           # Clip the background to a rounded rectangle
//! # gutter = "10%"          # Padding around the source: "N%" or "N" pixels
//!
//! [text]
//! # font = "fonts/Inter.ttf"
//! size = 12.0               # Font size in points
//! color = "#000000"
//! stroke = 0                # Outline thickness in pixels
//! # stroke_color = "#ffffff"
//! horizontal = "left"       # none | left | center | right
//! vertical = "top"          # none | bottom | middle | top
//!
//! [output]
//! quality = 90              # JPEG quality (1-100)
//!
//! [constrained]
//! width = 1000
//! height = 1000
//! max_bytes = 976560
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    Color, ConstrainedTarget, FrameOptions, Gutter, HorizontalAlign, Quality,
    TextStyle, VerticalAlign,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "framesmith.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `framesmith.toml`.
///
/// All fields have defaults. User files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Background and padding for framed resizes.
    pub frame: FrameConfig,
    /// Font and styling for text stamps.
    pub text: TextConfig,
    /// Encoder settings.
    pub output: OutputConfig,
    /// Size and byte budget for the `thumbnail` command.
    pub constrained: ConstrainedTarget,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.text.size.is_nan() || self.text.size <= 0.0 {
            return Err(ConfigError::Validation(
                "text.size must be positive".into(),
            ));
        }
        let ConstrainedTarget {
            width,
            height,
            max_bytes,
        } = self.constrained;
        if width == 0 || height == 0 || max_bytes == 0 {
            return Err(ConfigError::Validation(
                "constrained.width, height and max_bytes must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Defaults for framed resizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub background: Option<Color>,
    pub rounded: bool,
    pub gutter: Option<Gutter>,
}

impl FrameConfig {
    pub fn options(&self) -> FrameOptions {
        FrameOptions {
            background: self.background,
            rounded: self.rounded,
            gutter: self.gutter,
        }
    }
}

/// Defaults for text stamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Font file. `.ttf` loads as TrueType, anything else through FreeType.
    pub font: Option<PathBuf>,
    pub size: f32,
    pub color: Color,
    pub stroke: u32,
    pub stroke_color: Option<Color>,
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl Default for TextConfig {
    fn default() -> Self {
        let style = TextStyle::default();
        Self {
            font: None,
            size: style.size,
            color: style.color,
            stroke: style.stroke,
            stroke_color: style.stroke_color,
            horizontal: style.horizontal,
            vertical: style.vertical,
        }
    }
}

impl TextConfig {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            size: self.size,
            color: self.color,
            horizontal: self.horizontal,
            vertical: self.vertical,
            max_width: None,
            stroke: self.stroke,
            stroke_color: self.stroke_color,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100). PNG and WebP output is lossless.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for batch commands.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `framesmith.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Framesmith Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Framed resize (blank, resize)
# ---------------------------------------------------------------------------
[frame]
# Background painted behind the fitted image, as #rgb, #rrggbb or #rrggbbaa.
# Omit for a transparent background.
# background = "#ffffff"

# Clip the background to a rounded rectangle. Needs a background.
rounded = false

# Padding added around the source before fitting.
# "10%" pads each side by 10% of that dimension; a bare number N pads each
# side by the dimension plus N pixels.
# gutter = "10%"

# ---------------------------------------------------------------------------
# Text stamps (text)
# ---------------------------------------------------------------------------
[text]
# Font file. Only a lowercase .ttf extension loads as TrueType; everything
# else goes through the FreeType loader.
# font = "fonts/Inter.ttf"

# Font size in points.
size = 12.0

color = "#000000"

# Outline thickness in pixels, drawn in stroke_color around the text.
stroke = 0
# stroke_color = "#ffffff"

# Anchor of the (x, y) position: none | left | center | right
horizontal = "left"
# none | bottom | middle | top
vertical = "top"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG and WebP are lossless.
quality = 90

# ---------------------------------------------------------------------------
# Size-constrained JPEG (thumbnail)
# ---------------------------------------------------------------------------
[constrained]
# Canvas the image is fitted into.
width = 1000
height = 1000
# Quality steps down from 100 until the file is at most this many bytes.
max_bytes = 976560

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch resize. Omit for auto (= CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}
