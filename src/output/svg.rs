//! SVG output encoder.
//!
//! Charts render to SVG either as vector marks or, via
//! [`SvgEncoder::from_framebuffer`], as an embedded PNG.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::render::Mark;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG encoder for framebuffer and vector output.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    /// `None` for transparent.
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names match SVG attribute names.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Line
    Line { x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, stroke_width: f32 },
    /// Text
    Text { x: f32, y: f32, text: String, font_size: f32, fill: Rgba, anchor: TextAnchor },
    /// Embedded raster image (base64 PNG data URI)
    Image { x: f32, y: f32, width: f32, height: f32, data: String },
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the position.
    #[default]
    Start,
    /// Text is centered on the position.
    Middle,
    /// Text ends at the position.
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl From<Mark> for SvgElement {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Rect { fill, stroke, stroke_width, .. } => {
                let (x, y, width, height) = mark.rect_bounds().unwrap_or_default();
                Self::Rect { x, y, width, height, fill, stroke, stroke_width }
            }
            Mark::Line { x0, y0, x1, y1, stroke, stroke_width } => {
                Self::Line { x1: x0, y1: y0, x2: x1, y2: y1, stroke, stroke_width }
            }
        }
    }
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create an empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(Rgba::WHITE), elements: Vec::new() }
    }

    /// Create from a framebuffer (embeds as raster image).
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn from_framebuffer(fb: &Framebuffer) -> Result<Self> {
        let mut encoder = Self::new(fb.width(), fb.height());
        encoder.background = None;

        let png_bytes = super::PngEncoder::to_bytes(fb)?;
        let data = format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes));
        encoder.elements.push(SvgElement::Image {
            x: 0.0,
            y: 0.0,
            width: fb.width() as f32,
            height: fb.height() as f32,
            data,
        });

        Ok(encoder)
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a chart mark.
    #[must_use]
    pub fn mark(mut self, mark: Mark) -> Self {
        self.elements.push(mark.into());
        self
    }

    /// Add anchored text.
    #[must_use]
    pub fn text(
        mut self,
        x: f32,
        y: f32,
        text: &str,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
    ) -> Self {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill,
            anchor,
        });
        self
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Elements in drawing order.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Render to an SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        if let Some(bg) = self.background {
            let _ =
                writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, rgba_to_css(bg));
        }
        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

fn rgba_to_css(color: Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!("rgba({},{},{},{:.3})", color.r, color.g, color.b, f32::from(color.a) / 255.0)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect { x, y, width, height, fill, stroke, stroke_width } => {
            let stroke_attr = stroke
                .map(|s| format!(r#" stroke="{}" stroke-width="{stroke_width}""#, rgba_to_css(s)))
                .unwrap_or_default();
            format!(
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"{stroke_attr}/>"#,
                rgba_to_css(*fill)
            )
        }
        SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width } => format!(
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"/>"#,
            rgba_to_css(*stroke)
        ),
        SvgElement::Text { x, y, text, font_size, fill, anchor } => format!(
            r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="{font_size}" fill="{}" text-anchor="{}">{}</text>"#,
            rgba_to_css(*fill),
            anchor.as_str(),
            escape_xml(text)
        ),
        SvgElement::Image { x, y, width, height, data } => format!(
            r#"<image x="{x}" y="{y}" width="{width}" height="{height}" xlink:href="{data}"/>"#
        ),
    }
}
