//! Decode and encode pixel buffers with the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::load_from_memory[_with_format]` |
//! | Open from disk | `image::ImageReader` (format from hint, else sniffed) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |

use super::canvas::PixelBuffer;
use super::error::{ImagingError, Result};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> Vec<&'static str> {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
}

/// Formats a [`PixelBuffer`] can be encoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// Pick an output format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            ImagingError::UnsupportedFormat(format!("cannot write '{ext}' ({})", path.display()))
        })
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }
}

/// Decode an encoded image. Without a hint the format is sniffed from the bytes.
pub fn decode(bytes: &[u8], format_hint: Option<ImageFormat>) -> Result<PixelBuffer> {
    let img = match format_hint {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| ImagingError::Decode(e.to_string()))?;
    Ok(PixelBuffer::from(img))
}

/// Encode a buffer. `quality` only affects JPEG; PNG and WebP are lossless.
pub fn encode(buffer: &PixelBuffer, format: OutputFormat, quality: Quality) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let written = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(buffer.to_rgb());
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8);
            rgb.write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let rgba = DynamicImage::ImageRgba8(buffer.as_image().clone());
            rgba.write_with_encoder(PngEncoder::new(&mut bytes))
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(buffer.as_image().clone());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut bytes))
        }
    };
    written.map_err(|e| ImagingError::Encode(format!("{format:?}: {e}")))?;
    Ok(bytes)
}

/// Load and decode an image from disk.
pub fn open(path: &Path, format_hint: Option<ImageFormat>) -> Result<PixelBuffer> {
    let mut reader = ImageReader::open(path)?;
    match format_hint {
        Some(format) => reader.set_format(format),
        None => reader = reader.with_guessed_format()?,
    }
    let img = reader
        .decode()
        .map_err(|e| ImagingError::Decode(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "decoded");
    Ok(PixelBuffer::from(img))
}

/// Encode a buffer and write it to `path`, inferring the format from the extension.
pub fn save(buffer: &PixelBuffer, path: &Path, quality: Quality) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let bytes = encode(buffer, format, quality)?;
    std::fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Color;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::transparent(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(
                    x as i64,
                    y as i64,
                    Color::rgb((x % 256) as u8, (y % 256) as u8, 128),
                );
            }
        }
        buf
    }

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "gif", "tif", "tiff", "webp"] {
            assert!(exts.contains(expected), "expected {expected} in supported extensions");
        }
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_extension("bmp"), None);
        assert!(OutputFormat::from_path(Path::new("out.avif")).is_err());
    }

    #[test]
    fn png_preserves_pixels_and_alpha() {
        let mut buf = gradient(16, 8);
        buf.set_pixel(3, 3, Color::rgba(10, 20, 30, 40));
        let bytes = encode(&buf, OutputFormat::Png, Quality::default()).unwrap();
        let decoded = decode(&bytes, None).unwrap();
        assert_eq!(decoded, buf);
    }

    #[test]
    fn jpeg_size_drops_with_quality() {
        let buf = gradient(128, 128);
        let high = encode(&buf, OutputFormat::Jpeg, Quality::new(100)).unwrap();
        let low = encode(&buf, OutputFormat::Jpeg, Quality::new(10)).unwrap();
        assert!(low.len() < high.len());
        let decoded = decode(&high, Some(ImageFormat::Jpeg)).unwrap();
        assert_eq!(decoded.dimensions(), (128, 128));
    }

    #[test]
    fn decode_garbage_errors() {
        assert!(matches!(
            decode(b"not an image", None),
            Err(ImagingError::Decode(_))
        ));
    }

    #[test]
    fn save_and_open_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let buf = gradient(20, 10);
        save(&buf, &path, Quality::default()).unwrap();
        let opened = open(&path, None).unwrap();
        assert_eq!(opened, buf);
    }

    #[test]
    fn open_nonexistent_file_errors() {
        assert!(matches!(
            open(Path::new("/nonexistent/image.png"), None),
            Err(ImagingError::Io(_))
        ));
    }

    #[test]
    fn save_unsupported_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let buf = gradient(4, 4);
        assert!(matches!(
            save(&buf, &tmp.path().join("out.bmp"), Quality::default()),
            Err(ImagingError::UnsupportedFormat(_))
        ));
    }
}
