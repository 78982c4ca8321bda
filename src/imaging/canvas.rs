//! Owned RGBA pixel buffer and the raster primitives the compositor draws with.
//!
//! | Primitive | Implementation |
//! |---|---|
//! | Allocate | `image::RgbaImage::from_pixel` |
//! | Fill / flood fill | in-place, 4-connected scanline stack |
//! | Copy-resample | `image::imageops::crop_imm` + `resize` (`Triangle`, premultiplied `f32`) + `overlay` |
//! | Blend | `image::Pixel::blend` (source-over) |
//!
//! Alpha is straight 8-bit: 0 is fully transparent, 255 fully opaque.

use super::error::{ImagingError, Result};
use super::params::Color;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, Rgba32FImage, RgbaImage};

/// Resampling filter for every scaled copy.
///
/// `Triangle` widens its support with the scale factor, so large reductions
/// average over the covered source area.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// An owned RGBA8 canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Allocate a fully transparent canvas.
    pub fn transparent(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Allocate a canvas filled with a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImagingError::dimension(width, height));
        }
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, color.to_rgba()),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Color at `(x, y)`, or `None` outside the canvas.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|p| Color::from(*p))
    }

    /// Overwrite the pixel at `(x, y)`. Coordinates outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) {
        if let Some(px) = self.pixel_mut(x, y) {
            *px = color.to_rgba();
        }
    }

    /// Composite `color` over the pixel at `(x, y)` with extra `coverage` (0..=1).
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        let alpha = (color.a as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
        if alpha == 0 {
            return;
        }
        if let Some(px) = self.pixel_mut(x, y) {
            px.blend(&Rgba([color.r, color.g, color.b, alpha]));
        }
    }

    fn pixel_mut(&mut self, x: i64, y: i64) -> Option<&mut Rgba<u8>> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return None;
        }
        Some(self.image.get_pixel_mut(x as u32, y as u32))
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        self.image.pixels_mut().for_each(|p| *p = rgba);
    }

    /// Replace the 4-connected region of same-colored pixels around `(x, y)`.
    pub fn flood_fill(&mut self, x: u32, y: u32, color: Color) {
        let Some(&target) = self.image.get_pixel_checked(x, y) else {
            return;
        };
        let replacement = color.to_rgba();
        if target == replacement {
            return;
        }

        let (w, h) = self.dimensions();
        let mut stack = vec![(x, y)];
        while let Some((sx, sy)) = stack.pop() {
            if *self.image.get_pixel(sx, sy) != target {
                continue;
            }
            // Walk left and right along the row, then seed the rows above and below
            let mut left = sx;
            while left > 0 && *self.image.get_pixel(left - 1, sy) == target {
                left -= 1;
            }
            let mut right = sx;
            while right + 1 < w && *self.image.get_pixel(right + 1, sy) == target {
                right += 1;
            }
            for cx in left..=right {
                self.image.put_pixel(cx, sy, replacement);
                if sy > 0 && *self.image.get_pixel(cx, sy - 1) == target {
                    stack.push((cx, sy - 1));
                }
                if sy + 1 < h && *self.image.get_pixel(cx, sy + 1) == target {
                    stack.push((cx, sy + 1));
                }
            }
        }
    }

    /// Copy a region of `src` onto this canvas, scaling it to the destination size.
    ///
    /// The source region is clipped to `src`; the destination may extend past
    /// any edge and is clipped. Pixels are composited source-over.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_resampled(
        &mut self,
        src: &PixelBuffer,
        dst_x: i64,
        dst_y: i64,
        src_x: u32,
        src_y: u32,
        dst_w: u32,
        dst_h: u32,
        src_w: u32,
        src_h: u32,
    ) {
        let src_x = src_x.min(src.width());
        let src_y = src_y.min(src.height());
        let src_w = src_w.min(src.width() - src_x);
        let src_h = src_h.min(src.height() - src_y);
        if dst_w == 0 || dst_h == 0 || src_w == 0 || src_h == 0 {
            return;
        }

        let region = imageops::crop_imm(&src.image, src_x, src_y, src_w, src_h).to_image();
        if (src_w, src_h) == (dst_w, dst_h) {
            imageops::overlay(&mut self.image, &region, dst_x, dst_y);
        } else {
            // Filter in premultiplied space so transparent pixels carry no color
            let scaled = imageops::resize(&premultiplied(&region), dst_w, dst_h, RESAMPLE_FILTER);
            imageops::overlay(&mut self.image, &unpremultiplied(&scaled), dst_x, dst_y);
        }
    }

    /// Drop the alpha channel. Fully transparent pixels come out black.
    pub fn to_rgb(&self) -> image::RgbImage {
        DynamicImage::ImageRgba8(self.image.clone()).to_rgb8()
    }
}

fn premultiplied(image: &RgbaImage) -> Rgba32FImage {
    Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0.map(|c| c as f32 / 255.0);
        Rgba([r * a, g * a, b * a, a])
    })
}

fn unpremultiplied(image: &Rgba32FImage) -> RgbaImage {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        if a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)])
    })
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.into_rgba8(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn is_red(c: Option<Color>) -> bool {
        c.is_some_and(|c| c.r >= 250 && c.g <= 5 && c.b <= 5 && c.a >= 250)
    }

    #[test]
    fn transparent_canvas_has_zero_alpha() {
        let buf = PixelBuffer::transparent(4, 3).unwrap();
        assert_eq!(buf.dimensions(), (4, 3));
        assert!(buf.as_image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn zero_size_canvas_is_rejected() {
        assert!(matches!(
            PixelBuffer::transparent(0, 10),
            Err(ImagingError::InvalidDimension { width: 0, height: 10 })
        ));
    }

    #[test]
    fn set_pixel_ignores_out_of_bounds() {
        let mut buf = PixelBuffer::transparent(2, 2).unwrap();
        buf.set_pixel(-1, 0, RED);
        buf.set_pixel(2, 1, RED);
        buf.set_pixel(1, 1, RED);
        assert_eq!(buf.get_pixel(1, 1), Some(RED));
        assert_eq!(buf.get_pixel(5, 5), None);
        assert_eq!(buf.as_image().pixels().filter(|p| p.0[3] > 0).count(), 1);
    }

    #[test]
    fn blend_over_transparent_takes_source_color() {
        let mut buf = PixelBuffer::transparent(1, 1).unwrap();
        buf.blend_pixel(0, 0, RED, 1.0);
        assert_eq!(buf.get_pixel(0, 0), Some(RED));
    }

    #[test]
    fn flood_fill_stops_at_outline() {
        let mut buf = PixelBuffer::transparent(10, 10).unwrap();
        // Closed square outline from (2,2) to (7,7)
        for i in 2..=7 {
            buf.set_pixel(i, 2, RED);
            buf.set_pixel(i, 7, RED);
            buf.set_pixel(2, i, RED);
            buf.set_pixel(7, i, RED);
        }
        buf.flood_fill(4, 4, RED);

        assert_eq!(buf.get_pixel(4, 4), Some(RED));
        assert_eq!(buf.get_pixel(6, 6), Some(RED));
        assert_eq!(buf.get_pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(buf.get_pixel(9, 5), Some(Color::TRANSPARENT));
        // 6x6 square, outline included
        assert_eq!(buf.as_image().pixels().filter(|p| p.0[3] > 0).count(), 36);
    }

    #[test]
    fn flood_fill_whole_canvas() {
        let mut buf = PixelBuffer::transparent(5, 4).unwrap();
        buf.flood_fill(0, 0, RED);
        assert!(buf.as_image().pixels().all(|p| Color::from(*p) == RED));
    }

    #[test]
    fn copy_same_size_is_exact() {
        let mut src = PixelBuffer::transparent(3, 3).unwrap();
        src.set_pixel(1, 1, RED);
        let mut dst = PixelBuffer::filled(5, 5, Color::WHITE).unwrap();
        dst.copy_resampled(&src, 2, 2, 0, 0, 3, 3, 3, 3);
        assert_eq!(dst.get_pixel(3, 3), Some(RED));
        // Transparent source pixels leave the destination alone
        assert_eq!(dst.get_pixel(2, 2), Some(Color::WHITE));
    }

    #[test]
    fn copy_scales_solid_region() {
        let src = PixelBuffer::filled(10, 10, RED).unwrap();
        let mut dst = PixelBuffer::transparent(40, 40).unwrap();
        dst.copy_resampled(&src, 5, 5, 0, 0, 20, 20, 10, 10);
        assert!(is_red(dst.get_pixel(15, 15)));
        assert!(is_red(dst.get_pixel(5, 5)));
        assert_eq!(dst.get_pixel(4, 4), Some(Color::TRANSPARENT));
        assert_eq!(dst.get_pixel(25, 25), Some(Color::TRANSPARENT));
    }

    #[test]
    fn copy_clips_negative_destination() {
        let src = PixelBuffer::filled(4, 4, RED).unwrap();
        let mut dst = PixelBuffer::transparent(4, 4).unwrap();
        dst.copy_resampled(&src, -2, -2, 0, 0, 4, 4, 4, 4);
        assert_eq!(dst.get_pixel(0, 0), Some(RED));
        assert_eq!(dst.get_pixel(1, 1), Some(RED));
        assert_eq!(dst.get_pixel(2, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn downscale_does_not_bleed_transparent_black() {
        // Opaque red half next to a fully transparent (0,0,0,0) half
        let mut src = PixelBuffer::transparent(20, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                src.set_pixel(x, y, RED);
            }
        }
        let mut dst = PixelBuffer::transparent(7, 4).unwrap();
        dst.copy_resampled(&src, 0, 0, 0, 0, 7, 4, 20, 10);

        let partial: Vec<Color> = dst
            .as_image()
            .pixels()
            .map(|p| Color::from(*p))
            .filter(|c| c.a > 0)
            .collect();
        assert!(partial.iter().any(|c| c.a < 255), "expected an antialiased seam");
        for c in partial {
            assert_eq!((c.r, c.g, c.b), (255, 0, 0), "{c:?}");
        }
    }
}
