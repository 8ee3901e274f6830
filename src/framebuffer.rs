//! RGBA raster target for chart rendering.
//!
//! Rows are padded to a 64-byte stride. Whole-layer compositing goes through
//! trueno's vector kernels.

use crate::color::Rgba;
use crate::error::{Error, Result};
use trueno::Vector;

/// Row alignment in bytes.
const ROW_ALIGNMENT: usize = 64;

/// RGBA pixel buffer in row-major order.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// Four bytes per pixel: [R, G, B, A].
    pixels: Vec<u8>,
    /// Row length in bytes, including padding.
    stride: usize,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rangehist::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(800, 600).unwrap();
    /// assert_eq!(fb.width(), 800);
    /// assert_eq!(fb.height(), 600);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + ROW_ALIGNMENT - 1) & !(ROW_ALIGNMENT - 1);
        let pixels = vec![0; stride * (height as usize)];

        Ok(Self { width, height, pixels, stride })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row length in bytes.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// One row of pixels, without padding.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        Some(&self.pixels[start..start + (self.width as usize) * 4])
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for y in 0..self.height as usize {
            let start = y * self.stride;
            let row = &mut self.pixels[start..start + (self.width as usize) * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Overwrite a rectangle; coordinates are clamped to the buffer.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let Some((x1, y1, x2, y2)) = self.clip(x, y, w, h) else {
            return;
        };
        let rgba = color.to_array();
        for row_y in y1..y2 {
            let start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            let row = &mut self.pixels[start..start + ((x2 - x1) as usize) * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Alpha-blend a rectangle; coordinates are clamped to the buffer.
    pub fn blend_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        if color.a == 255 {
            self.fill_rect(x, y, w, h, color);
            return;
        }
        let Some((x1, y1, x2, y2)) = self.clip(x, y, w, h) else {
            return;
        };
        for py in y1..y2 {
            for px in x1..x2 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    fn clip(&self, x: u32, y: u32, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);
        (x1 < x2 && y1 < y2).then_some((x1, y1, x2, y2))
    }

    /// Color at a pixel, `None` out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.pixel_index(x, y);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(Rgba::from_array(rgba))
    }

    /// Set a pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Composite `color` over a pixel ("over" operator).
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height || color.a == 0 {
            return;
        }

        let idx = self.pixel_index(x, y);
        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(self.pixels[idx + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let blend = |src: u8, dst: u8| -> u8 {
            let src_f = f32::from(src) / 255.0;
            let dst_f = f32::from(dst) / 255.0;
            ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0).round() as u8
        };
        self.pixels[idx] = blend(color.r, self.pixels[idx]);
        self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
        self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
        self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
    }

    /// Mix a same-sized layer into this buffer: `out = layer * alpha + self * (1 - alpha)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers differ in size.
    pub fn blend_over(&mut self, layer: &Framebuffer, alpha: f32) -> Result<()> {
        if self.width != layer.width || self.height != layer.height {
            return Err(Error::InvalidDimensions { width: layer.width, height: layer.height });
        }

        let alpha = alpha.clamp(0.0, 1.0);
        let row_len = (self.width as usize) * 4;
        let alpha_vec = Vector::from_vec(vec![alpha; row_len]);
        let inv_vec = Vector::from_vec(vec![1.0 - alpha; row_len]);

        for y in 0..self.height as usize {
            let start = y * self.stride;
            let dst: Vec<f32> =
                self.pixels[start..start + row_len].iter().map(|&b| f32::from(b)).collect();
            let src: Vec<f32> =
                layer.pixels[start..start + row_len].iter().map(|&b| f32::from(b)).collect();

            let (Ok(src_scaled), Ok(dst_scaled)) =
                (Vector::from_vec(src).mul(&alpha_vec), Vector::from_vec(dst).mul(&inv_vec))
            else {
                continue;
            };
            if let Ok(mixed) = src_scaled.add(&dst_scaled) {
                let row = &mut self.pixels[start..start + row_len];
                for (out, &v) in row.iter_mut().zip(mixed.as_slice()) {
                    *out = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Pixels without row padding, as PNG encoders expect.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;
        if self.stride == row_bytes {
            return self.pixels.clone();
        }
        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for y in 0..self.height as usize {
            let start = y * self.stride;
            compact.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        compact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_framebuffer() {
        let fb = Framebuffer::new(100, 50).unwrap();
        assert_eq!(fb.width(), 100);
        assert_eq!(fb.height(), 50);
        assert!(fb.stride() >= 400);
        assert_eq!(fb.stride() % 64, 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Framebuffer::new(0, 100).is_err());
        assert!(Framebuffer::new(100, 0).is_err());
    }

    #[test]
    fn test_clear_and_fill() {
        let mut fb = Framebuffer::new(30, 30).unwrap();
        fb.clear(Rgba::WHITE);
        fb.fill_rect(10, 10, 5, 5, Rgba::RED);
        assert_eq!(fb.get_pixel(12, 12), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(15, 15), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_rect_clamped() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.fill_rect(8, 8, 100, 100, Rgba::BLUE);
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::BLUE));
        fb.fill_rect(20, 20, 5, 5, Rgba::RED);
    }

    #[test]
    fn test_blend_pixel() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear(Rgba::WHITE);
        fb.blend_pixel(1, 1, Rgba::new(255, 0, 0, 128));
        let p = fb.get_pixel(1, 1).unwrap();
        assert_eq!(p.r, 255);
        assert!(p.g > 100 && p.g < 150);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_blend_rect_transparent_is_noop() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear(Rgba::WHITE);
        fb.blend_rect(0, 0, 4, 4, Rgba::TRANSPARENT);
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blend_over() {
        let mut base = Framebuffer::new(20, 20).unwrap();
        let mut layer = Framebuffer::new(20, 20).unwrap();
        base.clear(Rgba::BLACK);
        layer.clear(Rgba::WHITE);
        base.blend_over(&layer, 0.5).unwrap();
        let p = base.get_pixel(10, 10).unwrap();
        assert!(p.r > 120 && p.r < 135);

        let other = Framebuffer::new(5, 5).unwrap();
        assert!(base.blend_over(&other, 0.5).is_err());
    }

    #[test]
    fn test_compact_pixels_len() {
        let fb = Framebuffer::new(3, 2).unwrap();
        assert_eq!(fb.to_compact_pixels().len(), 3 * 2 * 4);
        assert_eq!(fb.row(1).unwrap().len(), 12);
        assert!(fb.row(2).is_none());
    }
}
