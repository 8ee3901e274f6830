//! # rangehist
//!
//! Interactive histogram with a numpy-compatible binning engine.
//!
//! A [`HistogramEngine`](engine::HistogramEngine) holds a numeric dataset and
//! a visible range. It bins the values inside the range, aggregates the values
//! outside it into two outlier bars flush against the histogram, and keeps
//! the range, limit band and viewport consistent while the host pans, zooms
//! or resets the view. Viewport notifications are debounced through a
//! [`TickScheduler`](debounce::TickScheduler) owned by the host.
//!
//! [`HistogramChart`](chart::HistogramChart) renders an engine snapshot to a
//! framebuffer (PNG) or to vector SVG.
//!
//! ## Quick Start
//!
//! ```rust
//! use rangehist::prelude::*;
//!
//! let options = HistogramOptions::new().range(1.0, 5.0).bins(4usize);
//! let mut engine =
//!     HistogramEngine::new(vec![1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 4.0, 4.0], &options)?;
//!
//! let counts: Vec<f64> = engine.bin_table().rows().iter().map(|r| r.count).collect();
//! assert_eq!(counts, vec![1.0, 2.0, 3.0, 4.0]);
//!
//! engine.update_view(ViewRegion::Data, 0.0, 0)?;
//! assert_eq!(engine.visible_range(), (1.0, 4.0));
//! # Ok::<(), rangehist::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: Enable trueno's parallel kernels for layer compositing

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// unwrap() is confined to tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Dataset extraction and missing-value handling.
pub mod data;

/// Bin edges, estimators and counting.
pub mod binning;

/// Bin and outlier tables.
pub mod table;

/// Stateful histogram engine and view updates.
pub mod engine;

/// Single-slot debounce timer.
pub mod debounce;

/// Construction options and styles.
pub mod config;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Color types.
pub mod color;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Scale functions for data-to-pixel mappings.
pub mod scale;

/// Rasterization of chart marks.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

/// Histogram chart rendering.
pub mod chart;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for rangehist operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use rangehist::prelude::*;
/// ```
pub mod prelude {
    pub use crate::binning::{BinEstimator, BinSpec};
    pub use crate::chart::HistogramChart;
    pub use crate::color::Rgba;
    pub use crate::config::{ChartStyle, HistogramOptions};
    pub use crate::data::{DataSource, Dataset, Table};
    pub use crate::debounce::TickScheduler;
    pub use crate::engine::{HistogramEngine, ViewRegion, Viewport, ViewportEdge};
    pub use crate::error::{Error, Result};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::output::{PngEncoder, SvgEncoder};
    pub use crate::table::{BinRow, BinTable, OutlierTable};
    pub use batuta_common::display::WithDimensions;
}
