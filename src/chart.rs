//! Histogram chart: renders an engine snapshot to raster or vector output.
//!
//! Drawing order, back to front: limit boxes, detail histogram, outlier
//! bars, in-range bars, rug ticks, axes.

use crate::binning::{self, BinSpec};
use crate::color::Rgba;
use crate::config::{BarStyle, BoxStyle, ChartStyle, HistogramOptions};
use crate::data::DataSource;
use crate::engine::HistogramEngine;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::output::{PngEncoder, SvgEncoder, TextAnchor};
use crate::render::{Drawable, Mark};
use crate::scale::LinearScale;
use crate::table::{BinRow, BinTable};
use std::path::Path;

/// Headroom above the tallest element.
const Y_HEADROOM: f64 = 1.05;

/// Label font size in SVG output.
const LABEL_FONT_SIZE: f32 = 11.0;

/// Marks grouped by compositing pass.
#[derive(Debug, Clone, Default)]
pub struct ChartLayers {
    /// Limit boxes.
    pub limits: Vec<Mark>,
    /// Detail histogram, drawn opaque and composited at the details alpha.
    pub details: Vec<Mark>,
    /// Bars, rug and axes.
    pub marks: Vec<Mark>,
}

/// Interactive histogram chart.
///
/// Owns a [`HistogramEngine`]; mutate it through [`HistogramChart::engine_mut`]
/// and render again.
#[derive(Debug)]
pub struct HistogramChart {
    engine: HistogramEngine,
    style: ChartStyle,
    width: u32,
    height: u32,
    margin: u32,
    rug: bool,
    details: bool,
}

impl HistogramChart {
    /// Build the engine and chart from construction options.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be built from `source`.
    pub fn new(source: impl Into<DataSource>, options: &HistogramOptions) -> Result<Self> {
        let engine = HistogramEngine::new(source, options)?;
        Ok(Self::with_engine(engine, options))
    }

    /// Wrap an existing engine, taking presentation settings from `options`.
    #[must_use]
    pub fn with_engine(engine: HistogramEngine, options: &HistogramOptions) -> Self {
        Self {
            engine,
            style: options.style,
            width: options.width,
            height: options.height,
            margin: 40,
            rug: options.rug,
            details: options.details,
        }
    }

    /// Set the plot margin in pixels.
    #[must_use]
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Toggle the rug.
    #[must_use]
    pub fn rug(mut self, rug: bool) -> Self {
        self.rug = rug;
        self
    }

    /// Toggle the detail histogram.
    #[must_use]
    pub fn details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    /// Replace the element styles.
    #[must_use]
    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &HistogramEngine {
        &self.engine
    }

    /// Mutable access to the underlying engine.
    pub fn engine_mut(&mut self) -> &mut HistogramEngine {
        &mut self.engine
    }

    /// Output size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // ========================================================================
    // Layout
    // ========================================================================

    fn plot_area(&self) -> Result<(f64, f64, f64, f64)> {
        if self.width <= 2 * self.margin || self.height <= 2 * self.margin {
            return Err(Error::InvalidDimensions { width: self.width, height: self.height });
        }
        let m = f64::from(self.margin);
        Ok((m, m, f64::from(self.width) - m, f64::from(self.height) - m))
    }

    /// Fine-grained histogram: one bin per datum over the data extent.
    fn detail_table(&self) -> Result<Option<BinTable>> {
        if !self.details {
            return Ok(None);
        }
        let dataset = self.engine.dataset();
        let spec = BinSpec::Count(dataset.len());
        let binned = binning::histogram(dataset.values(), &spec, dataset.extent(), false)?;
        Ok(Some(BinTable::from_binned(&binned)))
    }

    /// Top of the y domain, before headroom.
    fn y_max(&self, details: Option<&BinTable>) -> f64 {
        let mut max = self.engine.bin_table().max_count();
        if self.engine.outliers() {
            for row in self.engine.outlier_table().rows() {
                if row.is_drawable() {
                    max = max.max(row.count);
                }
            }
        }
        if let Some(details) = details {
            max = max.max(details.max_count() * self.style.details.scale);
        }
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }

    /// Every mark of the current snapshot, in pixel space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the margins leave no plot area.
    pub fn layers(&self) -> Result<ChartLayers> {
        let (left, top, right, bottom) = self.plot_area()?;
        let viewport = self.engine.viewport();
        let xs = LinearScale::widened((viewport.start, viewport.end), (left, right))?;
        let details = self.detail_table()?;
        let y_max = self.y_max(details.as_ref());
        let ys = LinearScale::new((0.0, y_max * Y_HEADROOM), (bottom, top))?;

        let plot = Plot { xs, ys, left, right, top, bottom };
        let mut layers = ChartLayers::default();

        if self.engine.show_limits() {
            let (low, high) = self.engine.limit();
            let (start, end) = (viewport.bounds.0.min(low), viewport.bounds.1.max(high));
            let outer = &self.style.outer_limit_box;
            let inner = &self.style.inner_limit_box;
            layers.limits.extend(plot.band(start, low, outer));
            layers.limits.extend(plot.band(low, high, inner));
            layers.limits.extend(plot.band(high, end, outer));
        }

        if let Some(details) = &details {
            let fill = self.style.details.fill.with_alpha(255);
            let scale = self.style.details.scale;
            for row in details.rows().iter().filter(|r| r.count > 0.0) {
                let scaled = BinRow { count: row.count * scale, ..*row };
                layers.details.extend(plot.bar(&scaled, fill, None, 0.0));
            }
        }

        if self.engine.outliers() {
            let style = &self.style.outlier_bars;
            for row in self.engine.outlier_table().rows() {
                if row.is_drawable() && row.count > 0.0 {
                    layers.marks.extend(plot.styled_bar(&row, style));
                }
            }
        }

        let style = &self.style.bars;
        for row in self.engine.bin_table().rows() {
            if !row.count.is_nan() {
                layers.marks.extend(plot.styled_bar(row, style));
            }
        }

        if self.rug {
            let rug = &self.style.rug;
            let tick_top = ys.scale(self.engine.bin_table().max_count() * rug.height_fraction);
            let color = rug.color.with_opacity(rug.alpha);
            for &v in self.engine.dataset().values() {
                let x = xs.scale(v);
                if (left..=right).contains(&x) {
                    layers.marks.push(Mark::Line {
                        x0: x as f32,
                        y0: bottom as f32,
                        x1: x as f32,
                        y1: tick_top as f32,
                        stroke: color,
                        stroke_width: 1.0,
                    });
                }
            }
        }

        layers.marks.push(plot.line((left, bottom), (right, bottom)));
        layers.marks.push(plot.line((left, bottom), (left, top)));
        Ok(layers)
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Render to a new framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are unusable.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let layers = self.layers()?;
        let mut fb = Framebuffer::new(self.width, self.height)?;
        fb.clear(self.style.background);

        for mark in &layers.limits {
            mark.draw(&mut fb);
        }
        if !layers.details.is_empty() {
            let mut layer = fb.clone();
            for mark in &layers.details {
                mark.draw(&mut layer);
            }
            fb.blend_over(&layer, self.style.details.fill_alpha)?;
        }
        for mark in &layers.marks {
            mark.draw(&mut fb);
        }
        Ok(fb)
    }

    /// Render to a vector SVG document with viewport labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are unusable.
    pub fn to_svg(&self) -> Result<SvgEncoder> {
        let layers = self.layers()?;
        let alpha = self.style.details.fill_alpha;
        let details = layers.details.into_iter().map(|mark| match mark {
            Mark::Rect { x0, y0, x1, y1, fill, stroke, stroke_width } => {
                Mark::Rect { x0, y0, x1, y1, fill: fill.with_opacity(alpha), stroke, stroke_width }
            }
            line @ Mark::Line { .. } => line,
        });

        let mut svg = SvgEncoder::new(self.width, self.height)
            .background(Some(self.style.background));
        for mark in layers.limits.into_iter().chain(details).chain(layers.marks) {
            svg = svg.mark(mark);
        }

        let (left, _, right, bottom) = self.plot_area()?;
        let viewport = self.engine.viewport();
        let label_y = (bottom + f64::from(LABEL_FONT_SIZE) + 4.0) as f32;
        Ok(svg
            .text(
                left as f32,
                label_y,
                &format_tick(viewport.start),
                LABEL_FONT_SIZE,
                Rgba::BLACK,
                TextAnchor::Start,
            )
            .text(
                right as f32,
                label_y,
                &format_tick(viewport.end),
                LABEL_FONT_SIZE,
                Rgba::BLACK,
                TextAnchor::End,
            ))
    }

    /// Render to an SVG document that embeds the framebuffer as a PNG image.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or PNG encoding fails.
    pub fn to_raster_svg(&self) -> Result<SvgEncoder> {
        SvgEncoder::from_framebuffer(&self.to_framebuffer()?)
    }

    /// Write a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PngEncoder::write_to_file(&self.to_framebuffer()?, path)
    }

    /// Write a vector SVG file.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_svg()?.write_to_file(path)
    }
}

impl batuta_common::display::WithDimensions for HistogramChart {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Scales plus the plot rectangle, for mark construction.
struct Plot {
    xs: LinearScale,
    ys: LinearScale,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Plot {
    /// Horizontal pixel span of `[low, high]`, clipped to the plot; `None`
    /// when nothing is visible.
    fn span(&self, low: f64, high: f64) -> Option<(f64, f64)> {
        let x0 = self.xs.scale(low).max(self.left);
        let x1 = self.xs.scale(high).min(self.right);
        (x1 >= x0).then_some((x0, x1))
    }

    fn bar(&self, row: &BinRow, fill: Rgba, stroke: Option<Rgba>, width: f32) -> Option<Mark> {
        let (x0, x1) = self.span(row.left, row.right)?;
        let y1 = self.ys.scale(row.count).max(self.top);
        Some(Mark::Rect {
            x0: x0 as f32,
            y0: self.bottom as f32,
            x1: x1 as f32,
            y1: y1 as f32,
            fill,
            stroke,
            stroke_width: width,
        })
    }

    fn styled_bar(&self, row: &BinRow, style: &BarStyle) -> Option<Mark> {
        let fill = style.fill.with_opacity(style.fill_alpha);
        let stroke = (style.line_width > 0.0).then_some(style.line);
        self.bar(row, fill, stroke, style.line_width)
    }

    fn band(&self, low: f64, high: f64, style: &BoxStyle) -> Option<Mark> {
        if high <= low {
            return None;
        }
        let (x0, x1) = self.span(low, high)?;
        let stroke = (style.line_width > 0.0 && style.line_alpha > 0.0)
            .then(|| style.line.with_opacity(style.line_alpha));
        Some(Mark::Rect {
            x0: x0 as f32,
            y0: self.bottom as f32,
            x1: x1 as f32,
            y1: self.top as f32,
            fill: style.fill.with_opacity(style.fill_alpha),
            stroke,
            stroke_width: style.line_width,
        })
    }

    fn line(&self, from: (f64, f64), to: (f64, f64)) -> Mark {
        Mark::Line {
            x0: from.0 as f32,
            y0: from.1 as f32,
            x1: to.0 as f32,
            y1: to.1 as f32,
            stroke: Rgba::BLACK,
            stroke_width: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batuta_common::display::WithDimensions;
    use tempfile::NamedTempFile;

    const SCENARIO: [f64; 10] = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 4.0, 4.0];

    fn scenario_chart() -> HistogramChart {
        let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize).dimensions(120, 100);
        HistogramChart::new(SCENARIO.to_vec(), &options).unwrap().margin(0)
    }

    fn rect_count(marks: &[Mark]) -> usize {
        marks.iter().filter(|m| matches!(m, Mark::Rect { .. })).count()
    }

    #[test]
    fn test_layers_bars_and_rug() {
        let chart = scenario_chart();
        let layers = chart.layers().unwrap();
        assert!(layers.limits.is_empty());
        assert!(layers.details.is_empty());
        // four bins, no outliers
        assert_eq!(rect_count(&layers.marks), 4);
        // ten rug ticks plus two axes
        assert_eq!(layers.marks.len() - 4, 12);
    }

    #[test]
    fn test_bar_pixels() {
        let fb = scenario_chart().to_framebuffer().unwrap();
        // viewport (0, 6) over 120px: bin [4, 5] spans x 80..100
        assert_eq!(fb.get_pixel(90, 50), Some(Rgba::rgb(0x03, 0x65, 0x64)));
        assert_eq!(fb.get_pixel(90, 2), Some(Rgba::WHITE));
        // left of the first bin
        assert_eq!(fb.get_pixel(10, 50), Some(Rgba::WHITE));
    }

    #[test]
    fn test_outlier_bar_drawn() {
        let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize).dimensions(300, 100);
        let chart = HistogramChart::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0], &options)
            .unwrap()
            .margin(0);
        let layers = chart.layers().unwrap();
        assert_eq!(rect_count(&layers.marks), 5);

        let mut chart = chart;
        chart.engine_mut().set_outliers(false);
        assert_eq!(rect_count(&chart.layers().unwrap().marks), 4);
    }

    #[test]
    fn test_limit_boxes() {
        let options = HistogramOptions::new().limit(2.0, 4.0).bins(4usize).dimensions(200, 100);
        let chart = HistogramChart::new(SCENARIO.to_vec(), &options).unwrap().margin(0);
        assert!(chart.engine().show_limits());
        let layers = chart.layers().unwrap();
        assert_eq!(layers.limits.len(), 3);
    }

    #[test]
    fn test_details_layer() {
        let chart = scenario_chart().details(true);
        let layers = chart.layers().unwrap();
        // four distinct values over ten fine bins
        assert_eq!(layers.details.len(), 4);
        assert!(chart.to_framebuffer().is_ok());
        let svg = chart.to_svg().unwrap().render();
        assert!(svg.contains("rgba(0,255,0,0.2"));
    }

    #[test]
    fn test_rug_disabled() {
        let layers = scenario_chart().rug(false).layers().unwrap();
        assert_eq!(layers.marks.len(), 4 + 2);
    }

    #[test]
    fn test_zero_plot_area_rejected() {
        let chart = scenario_chart().margin(60);
        assert!(matches!(chart.layers(), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_set_dimensions() {
        let mut chart = scenario_chart();
        chart.set_dimensions(64, 48);
        assert_eq!(HistogramChart::dimensions(&chart), (64, 48));
        let fb = chart.to_framebuffer().unwrap();
        assert_eq!((fb.width(), fb.height()), (64, 48));
    }

    #[test]
    fn test_density_nan_bins_skipped() {
        let options =
            HistogramOptions::new().range(10.0, 20.0).bins(2usize).density(true).dimensions(100, 80);
        let chart = HistogramChart::new(vec![1.0, 2.0], &options).unwrap().margin(0);
        let layers = chart.layers().unwrap();
        // in-range bars are NaN; only the low outlier bar remains
        assert_eq!(rect_count(&layers.marks), 1);
    }

    #[test]
    fn test_write_outputs() {
        let chart = scenario_chart();
        let png = NamedTempFile::new().unwrap();
        chart.write_png(png.path()).unwrap();
        let svg = NamedTempFile::new().unwrap();
        chart.write_svg(svg.path()).unwrap();
        let content = std::fs::read_to_string(svg.path()).unwrap();
        assert!(content.contains("<rect"));
        assert!(content.contains(">0</text>"));
        assert!(content.contains(">6</text>"));
    }

    #[test]
    fn test_raster_svg_embeds_framebuffer() {
        let chart = scenario_chart();
        let out = chart.to_raster_svg().unwrap().render();
        assert!(out.contains(r#"width="120""#));
        assert!(out.contains("data:image/png;base64,"));
        // the raster carries the bars; no vector marks or labels
        assert!(!out.contains("<rect"));
        assert!(!out.contains("</text>"));
    }
}
