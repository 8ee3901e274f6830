//! Construction options and chart styles.
//!
//! Options are consumed once when a histogram is built. Every field has a
//! default, so a YAML document only needs the keys it changes:
//!
//! ```yaml
//! column: mpg
//! bins: 20          # or "auto", "fd", "sturges", ... or [0, 10, 20, 40]
//! limit: [15, 35]
//! density: false
//! style:
//!   bars:
//!     fill: "#036564"
//! ```

use crate::binning::BinSpec;
use crate::color::Rgba;
use crate::debounce::DEFAULT_QUIET;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fill and outline of a family of bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarStyle {
    /// Fill colour.
    pub fill: Rgba,
    /// Fill opacity (0.0-1.0).
    pub fill_alpha: f32,
    /// Outline colour.
    pub line: Rgba,
    /// Outline width in pixels; 0 disables the outline.
    pub line_width: f32,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            fill: Rgba::rgb(0x03, 0x65, 0x64),
            fill_alpha: 1.0,
            line: Rgba::rgb(0x03, 0x36, 0x49),
            line_width: 1.0,
        }
    }
}

impl BarStyle {
    /// Default style for the two outlier bars.
    #[must_use]
    pub fn outliers() -> Self {
        Self { fill: Rgba::RED, line: Rgba::rgb(0x22, 0x22, 0x22), ..Self::default() }
    }
}

/// Shaded box of the limit band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxStyle {
    /// Fill colour.
    pub fill: Rgba,
    /// Fill opacity.
    pub fill_alpha: f32,
    /// Edge colour.
    pub line: Rgba,
    /// Edge opacity.
    pub line_alpha: f32,
    /// Edge width in pixels.
    pub line_width: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self::outer()
    }
}

impl BoxStyle {
    /// Boxes outside the limit band.
    #[must_use]
    pub fn outer() -> Self {
        Self { fill: Rgba::RED, fill_alpha: 0.1, line: Rgba::RED, line_alpha: 0.4, line_width: 2.0 }
    }

    /// Box between the limits.
    #[must_use]
    pub fn inner() -> Self {
        Self {
            fill: Rgba::YELLOW,
            fill_alpha: 0.05,
            line: Rgba::YELLOW,
            line_alpha: 0.0,
            line_width: 0.0,
        }
    }
}

/// One tick per datum along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RugStyle {
    /// Tick colour.
    pub color: Rgba,
    /// Tick opacity.
    pub alpha: f32,
    /// Tick height as a fraction of the tallest bar.
    pub height_fraction: f64,
}

impl Default for RugStyle {
    fn default() -> Self {
        Self { color: Rgba::BLACK, alpha: 0.6, height_fraction: 0.1 }
    }
}

/// Fine-grained histogram drawn behind the bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsStyle {
    /// Fill colour.
    pub fill: Rgba,
    /// Fill opacity.
    pub fill_alpha: f32,
    /// Height multiplier applied to the per-bin counts.
    pub scale: f64,
}

impl Default for DetailsStyle {
    fn default() -> Self {
        Self { fill: Rgba::GREEN, fill_alpha: 0.2, scale: 0.5 }
    }
}

/// Styles for every chart element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// In-range bars.
    pub bars: BarStyle,
    /// Outlier bars.
    pub outlier_bars: BarStyle,
    /// Boxes below and above the limit band.
    pub outer_limit_box: BoxStyle,
    /// Box inside the limit band.
    pub inner_limit_box: BoxStyle,
    /// Rug ticks.
    pub rug: RugStyle,
    /// Detail histogram.
    pub details: DetailsStyle,
    /// Background colour.
    pub background: Rgba,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            bars: BarStyle::default(),
            outlier_bars: BarStyle::outliers(),
            outer_limit_box: BoxStyle::outer(),
            inner_limit_box: BoxStyle::inner(),
            rug: RugStyle::default(),
            details: DetailsStyle::default(),
            background: Rgba::WHITE,
        }
    }
}

/// Histogram construction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramOptions {
    /// Column of a table input; ignored for a bare series.
    pub column: Option<String>,
    /// Bin count, estimator or explicit edges.
    pub bins: BinSpec,
    /// Visible range; derived from the limit band or the data when absent.
    pub range: Option<(f64, f64)>,
    /// Limit band; derived from the data when absent.
    pub limit: Option<(f64, f64)>,
    /// Normalize the in-range bars to unit area.
    pub density: bool,
    /// Draw the outlier bars.
    pub outliers: bool,
    /// Draw the limit boxes; defaults to whether `limit` was given.
    pub show_limits: Option<bool>,
    /// Draw the rug.
    pub rug: bool,
    /// Draw the detail histogram.
    pub details: bool,
    /// Rebin when the viewport is panned or zoomed by the host.
    pub auto_update: bool,
    /// Quiet window for viewport notifications, in milliseconds.
    pub debounce_ms: u64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Element styles.
    pub style: ChartStyle,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            column: None,
            bins: BinSpec::default(),
            range: None,
            limit: None,
            density: false,
            outliers: true,
            show_limits: None,
            rug: true,
            details: false,
            auto_update: true,
            debounce_ms: DEFAULT_QUIET.as_millis() as u64,
            width: 800,
            height: 600,
            style: ChartStyle::default(),
        }
    }
}

impl HistogramOptions {
    /// Options with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column selector.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the bin specification.
    #[must_use]
    pub fn bins(mut self, bins: impl Into<BinSpec>) -> Self {
        self.bins = bins.into();
        self
    }

    /// Set the visible range.
    #[must_use]
    pub fn range(mut self, low: f64, high: f64) -> Self {
        self.range = Some((low, high));
        self
    }

    /// Set the limit band.
    #[must_use]
    pub fn limit(mut self, low: f64, high: f64) -> Self {
        self.limit = Some((low, high));
        self
    }

    /// Enable density normalization.
    #[must_use]
    pub fn density(mut self, density: bool) -> Self {
        self.density = density;
        self
    }

    /// Draw or skip the outlier bars.
    #[must_use]
    pub fn outliers(mut self, outliers: bool) -> Self {
        self.outliers = outliers;
        self
    }

    /// Enable or disable rebinning on viewport changes.
    #[must_use]
    pub fn auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    /// Set the output dimensions.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the element styles.
    #[must_use]
    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether the limit boxes are drawn.
    #[must_use]
    pub fn show_limits(&self) -> bool {
        self.show_limits.unwrap_or(self.limit.is_some())
    }

    /// Debounce window as a Duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Loads options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parses options from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Serializes options to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| Error::ConfigParse { line: 0, message: e.to_string() })
    }
}
