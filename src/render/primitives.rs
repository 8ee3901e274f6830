//! Primitive rendering functions.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

/// Trait for drawable primitives.
pub trait Drawable {
    /// Draw this primitive to a framebuffer.
    fn draw(&self, fb: &mut Framebuffer);
}

/// A shape in pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Mark {
    /// Axis-aligned rectangle spanning `(x0, y0)`..`(x1, y1)` in any order.
    Rect {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Straight line segment.
    Line { x0: f32, y0: f32, x1: f32, y1: f32, stroke: Rgba, stroke_width: f32 },
}

impl Mark {
    /// Rectangle normalized to `(left, top, width, height)`.
    #[must_use]
    pub fn rect_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        match *self {
            Self::Rect { x0, y0, x1, y1, .. } => {
                Some((x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()))
            }
            Self::Line { .. } => None,
        }
    }
}

impl Drawable for Mark {
    fn draw(&self, fb: &mut Framebuffer) {
        match *self {
            Self::Rect { fill, stroke, stroke_width, .. } => {
                let Some((left, top, width, height)) = self.rect_bounds() else {
                    return;
                };
                let (x, y) = (left.round() as i32, top.round() as i32);
                // keep thin bars visible
                let w = (width.round() as u32).max(1);
                let h = height.round() as u32;
                draw_rect(fb, x, y, w, h, fill);
                if let Some(stroke) = stroke {
                    if stroke_width > 0.0 && h > 0 {
                        draw_rect_outline(fb, x, y, w, h, stroke, stroke_width.round() as u32);
                    }
                }
            }
            Self::Line { x0, y0, x1, y1, stroke, stroke_width } => {
                let (x0, y0) = (x0.round() as i32, y0.round() as i32);
                let (x1, y1) = (x1.round() as i32, y1.round() as i32);
                let thickness = (stroke_width.round() as i32).max(1);
                for offset in 0..thickness {
                    if x0 == x1 {
                        draw_line(fb, x0 + offset, y0, x1 + offset, y1, stroke);
                    } else {
                        draw_line(fb, x0, y0 + offset, x1, y1 + offset, stroke);
                    }
                }
            }
        }
    }
}

/// Draw a line using Bresenham's algorithm, alpha-blending each pixel.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        if x >= 0 && y >= 0 {
            fb.blend_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Fill a rectangle, blending when `color` is translucent.
pub fn draw_rect(fb: &mut Framebuffer, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
    // shift the far edge in when the rectangle starts off-buffer
    let width = width.saturating_sub(x.min(0).unsigned_abs());
    let height = height.saturating_sub(y.min(0).unsigned_abs());
    fb.blend_rect(x.max(0) as u32, y.max(0) as u32, width, height, color);
}

/// Draw a rectangle outline of the given thickness.
pub fn draw_rect_outline(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgba,
    thickness: u32,
) {
    let t = thickness.max(1).min(width).min(height);
    if t == 0 {
        return;
    }
    let (w, h) = (width as i32, height as i32);
    let ti = t as i32;

    draw_rect(fb, x, y, width, t, color);
    draw_rect(fb, x, y + h - ti, width, t, color);
    if height > 2 * t {
        draw_rect(fb, x, y + ti, t, height - 2 * t, color);
        draw_rect(fb, x + w - ti, y + ti, t, height - 2 * t, color);
    }
}
