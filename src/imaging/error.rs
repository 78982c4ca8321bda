use std::path::PathBuf;
use thiserror::Error;

/// Result type for imaging operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid dimension: {width}x{height} (width and height must be non-zero)")]
    InvalidDimension { width: u32, height: u32 },
    #[error("Invalid alignment code: {0}")]
    InvalidAlignment(u8),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid gutter: {0}")]
    InvalidGutter(String),
    #[error("Unsupported font type '{extension}': {path}")]
    UnsupportedFontType { path: PathBuf, extension: String },
    #[error("Failed to load font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },
    #[error("Text does not fit within {max_width}px even at the minimum font size")]
    LayoutUnachievable { max_width: u32 },
    #[error("Cannot encode within {max_bytes} bytes even at the lowest quality")]
    EncodingUnachievable { max_bytes: u64 },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

impl ImagingError {
    pub(crate) fn dimension(width: u32, height: u32) -> Self {
        Self::InvalidDimension { width, height }
    }
}
