//! Histogram binning and range engine.
//!
//! [`HistogramEngine`] owns the dataset, the bin specification, the visible
//! range and the limit band, and keeps the derived state (bin table, outlier
//! table, axis bounds, viewport) consistent with them. Every mutator runs the
//! same pipeline:
//!
//! 1. bin the dataset over the visible range,
//! 2. aggregate the values outside it into the two outlier rows,
//! 3. (for range changes) recompute the axis bounds and reset the viewport.
//!
//! Derived state is computed before anything is committed, so a mutator that
//! fails leaves the engine exactly as it was.
//!
//! # View-driven updates
//!
//! A host that lets the user pan or zoom reports every viewport edge change
//! through [`HistogramEngine::on_viewport_change`]. With auto-update enabled
//! and a [`TickScheduler`] attached, changes are debounced and the rebinning
//! runs on the host's next tick via [`HistogramEngine::tick`].

use crate::binning::{self, BinSpec, Binned};
use crate::config::HistogramOptions;
use crate::data::{DataSource, Dataset};
use crate::debounce::{Debouncer, TickScheduler};
use crate::error::{Error, Result};
use crate::table::{BinTable, OutlierTable};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, trace};

/// Basis interval for [`HistogramEngine::update_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewRegion {
    /// The live viewport.
    #[default]
    XRange,
    /// The dataset extent.
    Data,
    /// The limit band.
    Limit,
    /// The visible range the engine was constructed with.
    Reset,
}

impl ViewRegion {
    /// Parse a region name; unrecognized names select [`ViewRegion::XRange`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "data" => Self::Data,
            "limit" => Self::Limit,
            "reset" => Self::Reset,
            _ => Self::XRange,
        }
    }

    /// Name as accepted by [`ViewRegion::parse`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::XRange => "x_range",
            Self::Data => "data",
            Self::Limit => "limit",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for ViewRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for ViewRegion {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

/// Which end of the viewport changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEdge {
    /// Left end.
    Start,
    /// Right end.
    End,
}

impl FromStr for ViewportEdge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(Error::InvalidData(format!("unknown viewport edge {other:?}"))),
        }
    }
}

/// Renderer window along x and its pan/zoom clamp.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left end of the visible window.
    pub start: f64,
    /// Right end of the visible window.
    pub end: f64,
    /// Outer limits the window may not leave.
    pub bounds: (f64, f64),
}

impl Viewport {
    /// Window width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Clamp a value into the bounds.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.bounds.0).min(self.bounds.1)
    }

    /// Window shifted by `delta`, kept inside the bounds without resizing.
    #[must_use]
    pub fn panned(&self, delta: f64) -> (f64, f64) {
        let width = self.width();
        let start = (self.start + delta).max(self.bounds.0).min(self.bounds.1 - width);
        (start, start + width)
    }

    /// Window scaled by `factor` around `anchor`, clamped to the bounds.
    #[must_use]
    pub fn zoomed(&self, factor: f64, anchor: f64) -> (f64, f64) {
        let start = anchor - (anchor - self.start) * factor;
        let end = anchor + (self.end - anchor) * factor;
        (self.clamp(start), self.clamp(end))
    }
}

/// How the current visible range came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOrigin {
    /// Supplied by the caller (options, setter or view update).
    Explicit,
    /// Derived from the limit band or the data extent.
    Derived,
}

/// Binning result before it is committed to the engine.
struct Computed {
    binned: Binned,
    outliers: OutlierTable,
}

fn compute(
    dataset: &Dataset,
    spec: &BinSpec,
    range: (f64, f64),
    density: bool,
) -> Result<Computed> {
    let binned = binning::histogram(dataset.values(), spec, range, density)?;
    let outliers = OutlierTable::compute(dataset, range, &binned.edges);
    Ok(Computed { binned, outliers })
}

/// Limit band widened by a quarter of its width on each side.
fn pad_quarter(band: (f64, f64)) -> (f64, f64) {
    let add = (band.1 - band.0) / 4.0;
    (band.0 - add, band.1 + add)
}

/// Stateful histogram: dataset, bins, ranges and the tables derived from them.
pub struct HistogramEngine {
    source: DataSource,
    column: String,
    dataset: Dataset,
    bins: BinSpec,
    edges: Vec<f64>,
    range: (f64, f64),
    range_origin: RangeOrigin,
    original_range: (f64, f64),
    original_origin: RangeOrigin,
    limit: (f64, f64),
    density: bool,
    outliers: bool,
    show_limits: bool,
    auto_update: bool,
    axis_bounds: (f64, f64),
    viewport: Viewport,
    bin_table: BinTable,
    outlier_table: OutlierTable,
    debouncer: Debouncer,
    session: Option<Box<dyn TickScheduler>>,
}

impl fmt::Debug for HistogramEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistogramEngine")
            .field("column", &self.column)
            .field("len", &self.dataset.len())
            .field("bins", &self.bins)
            .field("range", &self.range)
            .field("limit", &self.limit)
            .field("axis_bounds", &self.axis_bounds)
            .field("viewport", &self.viewport)
            .field("session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl HistogramEngine {
    /// Build an engine from raw input and construction options.
    ///
    /// The visible range is `options.range`, else the limit band padded by a
    /// quarter of its width on each side, else the data extent. The limit
    /// band defaults to the data extent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if no value survives missing-value
    /// removal, and [`Error::InvalidBinSpec`] if the bins cannot be computed.
    pub fn new(source: impl Into<DataSource>, options: &HistogramOptions) -> Result<Self> {
        let source = source.into();
        let (dataset, column) = source.extract(options.column.as_deref())?;

        let (range, range_origin) = match (options.range, options.limit) {
            (Some(range), _) => (range, RangeOrigin::Explicit),
            (None, Some(limit)) => (pad_quarter(limit), RangeOrigin::Derived),
            (None, None) => (dataset.extent(), RangeOrigin::Derived),
        };
        let limit = options.limit.unwrap_or_else(|| dataset.extent());
        let computed = compute(&dataset, &options.bins, range, options.density)?;

        debug!(
            column = %column,
            len = dataset.len(),
            low = range.0,
            high = range.1,
            "histogram created"
        );

        let mut engine = Self {
            source,
            column,
            dataset,
            bins: options.bins.clone(),
            edges: Vec::new(),
            range,
            range_origin,
            original_range: range,
            original_origin: range_origin,
            limit,
            density: options.density,
            outliers: options.outliers,
            show_limits: options.show_limits(),
            auto_update: options.auto_update,
            axis_bounds: range,
            viewport: Viewport::default(),
            bin_table: BinTable::default(),
            outlier_table: OutlierTable::default(),
            debouncer: Debouncer::new(options.debounce()),
            session: None,
        };
        engine.commit(computed);
        engine.recompute_axis_bounds();
        Ok(engine)
    }

    fn commit(&mut self, computed: Computed) {
        self.bin_table = BinTable::from_binned(&computed.binned);
        self.edges = computed.binned.edges;
        self.outlier_table = computed.outliers;
        trace!(
            bins = self.bin_count(),
            low = self.range.0,
            high = self.range.1,
            outliers = self.outlier_table.total(),
            "histogram recomputed"
        );
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Replace the input and the column selector.
    ///
    /// The visible range and limit band are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for an unusable input; the engine is
    /// left unchanged.
    pub fn set_dataset(
        &mut self,
        source: impl Into<DataSource>,
        column: Option<&str>,
    ) -> Result<()> {
        let source = source.into();
        let (dataset, used) = source.extract(column)?;
        let computed = compute(&dataset, &self.bins, self.range, self.density)?;

        debug!(
            column = %used,
            len = dataset.len(),
            min = dataset.min(),
            max = dataset.max(),
            "dataset replaced"
        );
        self.source = source;
        self.column = used;
        self.dataset = dataset;
        self.commit(computed);
        self.recompute_axis_bounds();
        Ok(())
    }

    /// Select another column of the retained input.
    ///
    /// # Errors
    ///
    /// See [`HistogramEngine::set_dataset`].
    pub fn set_column(&mut self, column: &str) -> Result<()> {
        let source = self.source.clone();
        self.set_dataset(source, Some(column))
    }

    /// Set the visible range; `None` falls back to the limit band.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinSpec`] for a reversed or non-finite range;
    /// the engine is left unchanged.
    pub fn set_visible_range(&mut self, range: Option<(f64, f64)>) -> Result<()> {
        let (range, origin) = match range {
            Some(range) => (range, RangeOrigin::Explicit),
            None => (self.limit, RangeOrigin::Derived),
        };
        self.apply_range(range, origin)
    }

    fn apply_range(&mut self, range: (f64, f64), origin: RangeOrigin) -> Result<()> {
        let computed = compute(&self.dataset, &self.bins, range, self.density)?;
        self.range = range;
        self.range_origin = origin;
        self.commit(computed);
        self.recompute_axis_bounds();
        Ok(())
    }

    /// Replace the bin specification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinSpec`] if the specification cannot be
    /// applied; the engine is left unchanged.
    pub fn set_bin_spec(&mut self, spec: impl Into<BinSpec>) -> Result<()> {
        let spec = spec.into();
        let computed = compute(&self.dataset, &spec, self.range, self.density)?;
        self.bins = spec;
        self.commit(computed);
        Ok(())
    }

    /// Replace the limit band; `None` resets it to the data extent.
    ///
    /// A visible range that was derived rather than supplied follows the new
    /// band, padded by a quarter of its width on each side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinSpec`] if the re-derived range cannot be
    /// binned; the engine is left unchanged.
    pub fn set_limit(&mut self, limit: Option<(f64, f64)>) -> Result<()> {
        let limit = limit.unwrap_or_else(|| self.dataset.extent());
        if self.range_origin == RangeOrigin::Derived {
            self.apply_range(pad_quarter(limit), RangeOrigin::Derived)?;
        }
        self.limit = limit;
        Ok(())
    }

    /// Toggle density normalization.
    ///
    /// # Errors
    ///
    /// See [`HistogramEngine::recompute_histogram`].
    pub fn set_density(&mut self, density: bool) -> Result<()> {
        let computed = compute(&self.dataset, &self.bins, self.range, density)?;
        self.density = density;
        self.commit(computed);
        Ok(())
    }

    /// Draw or skip the outlier bars. The outlier table is computed either way.
    pub fn set_outliers(&mut self, outliers: bool) {
        self.outliers = outliers;
    }

    /// Draw or skip the limit boxes.
    pub fn set_show_limits(&mut self, show_limits: bool) {
        self.show_limits = show_limits;
    }

    /// Enable or disable view-driven rebinning. Disabling drops a pending update.
    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.auto_update = auto_update;
        if !auto_update {
            self.debouncer.cancel();
        }
    }

    // ------------------------------------------------------------------
    // Recompute pipeline
    // ------------------------------------------------------------------

    /// Rebin the dataset over the visible range and rebuild both tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinSpec`] if binning fails.
    pub fn recompute_histogram(&mut self) -> Result<()> {
        let computed = compute(&self.dataset, &self.bins, self.range, self.density)?;
        self.commit(computed);
        Ok(())
    }

    /// Recompute the axis bounds and reset the viewport to the visible range
    /// plus one bin width on each side.
    pub fn recompute_axis_bounds(&mut self) {
        let width = self.bin_width();
        let quarter = width * self.bin_count() as f64 / 4.0;
        let (low, high) = self.range;

        let lower = (self.dataset.min() - quarter).min(low - quarter);
        let upper = (self.dataset.max() + quarter).max(high + quarter);
        self.axis_bounds = (lower, upper);

        // bounds only clamp host pan/zoom; with fewer than four bins the
        // one-bin margin reaches past them
        self.viewport = Viewport { start: low - width, end: high + width, bounds: (lower, upper) };
    }

    /// Move the visible range relative to a basis interval.
    ///
    /// For [`ViewRegion::XRange`] the basis is the viewport, which carries a
    /// one-bin margin on each side; that margin, `(end - start) / (bins + 2)`,
    /// is inset. The other regions are ranges already and get no margin. The
    /// result is then widened on both sides by `add_fraction` of the basis
    /// width plus `add_bins` bin widths (negative values narrow it).
    ///
    /// [`ViewRegion::Reset`] without adjustment restores the constructed
    /// range exactly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinSpec`] if the adjusted range is reversed;
    /// the engine is left unchanged.
    pub fn update_view(
        &mut self,
        region: ViewRegion,
        add_fraction: f64,
        add_bins: i32,
    ) -> Result<()> {
        let bins = self.bin_count() as f64;
        let (start, end, margin, bin_width) = match region {
            ViewRegion::XRange => {
                let (start, end) = (self.viewport.start, self.viewport.end);
                let margin = (end - start) / (bins + 2.0);
                (start, end, margin, margin)
            }
            ViewRegion::Data => {
                let (start, end) = self.dataset.extent();
                (start, end, 0.0, (end - start) / bins)
            }
            ViewRegion::Limit => {
                let (start, end) = self.limit;
                (start, end, 0.0, (end - start) / bins)
            }
            ViewRegion::Reset => {
                let (start, end) = self.original_range;
                (start, end, 0.0, (end - start) / bins)
            }
        };

        let mut add = 0.0;
        if add_fraction != 0.0 {
            add += (end - start) * add_fraction;
        }
        if add_bins != 0 {
            add += f64::from(add_bins) * bin_width;
        }
        let range = (start + margin - add, end - margin + add);

        debug!(region = %region, low = range.0, high = range.1, "updating view");
        let origin = if region == ViewRegion::Reset && add == 0.0 {
            self.original_origin
        } else {
            RangeOrigin::Explicit
        };
        self.apply_range(range, origin)
    }

    // ------------------------------------------------------------------
    // Host integration
    // ------------------------------------------------------------------

    /// Attach the live session that provides update ticks.
    pub fn attach_session(&mut self, session: Box<dyn TickScheduler>) {
        self.session = Some(session);
    }

    /// Detach the session, dropping any pending update.
    pub fn detach_session(&mut self) -> Option<Box<dyn TickScheduler>> {
        self.debouncer.cancel();
        self.session.take()
    }

    /// True while a session is attached.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Viewport notification hook.
    ///
    /// Applies `new` (clamped to the axis bounds) to the given viewport
    /// edge. With auto-update on and a session attached, (re)arms the
    /// debounce timer and asks the session for a tick at its deadline;
    /// otherwise the change only moves the viewport.
    pub fn on_viewport_change(&mut self, edge: ViewportEdge, new: f64, old: f64, now: Instant) {
        let value = self.viewport.clamp(new);
        match edge {
            ViewportEdge::Start => self.viewport.start = value,
            ViewportEdge::End => self.viewport.end = value,
        }

        if !self.auto_update {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            let deadline = self.debouncer.trigger(now);
            session.request_tick(deadline);
            trace!(?edge, new, old, "viewport change debounced");
        }
    }

    /// Report a whole new window, one notification per edge that moved.
    pub fn move_viewport(&mut self, start: f64, end: f64, now: Instant) {
        let old = self.viewport;
        if start != old.start {
            self.on_viewport_change(ViewportEdge::Start, start, old.start, now);
        }
        if end != old.end {
            self.on_viewport_change(ViewportEdge::End, end, old.end, now);
        }
    }

    /// Host update tick: runs the debounced view update once it is due.
    ///
    /// Returns whether an update ran.
    ///
    /// # Errors
    ///
    /// Propagates a failing [`HistogramEngine::update_view`].
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if !self.debouncer.fire_if_due(now) {
            return Ok(false);
        }
        debug!("debounced view update");
        self.update_view(ViewRegion::XRange, 0.0, 0)?;
        Ok(true)
    }

    /// Deadline of the pending view update, if any.
    #[must_use]
    pub fn pending_update(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Column the dataset was taken from.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Current bin specification.
    #[must_use]
    pub fn bin_spec(&self) -> &BinSpec {
        &self.bins
    }

    /// Number of bins in the last computation.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Edges of the last computation.
    #[must_use]
    pub fn bin_edges(&self) -> &[f64] {
        &self.edges
    }

    /// Visible range width divided by the bin count.
    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.range.1 - self.range.0) / self.bin_count() as f64
    }

    /// Current visible range.
    #[must_use]
    pub fn visible_range(&self) -> (f64, f64) {
        self.range
    }

    /// Visible range at construction.
    #[must_use]
    pub fn original_range(&self) -> (f64, f64) {
        self.original_range
    }

    /// Limit band.
    #[must_use]
    pub fn limit(&self) -> (f64, f64) {
        self.limit
    }

    /// Whether counts are density-normalized.
    #[must_use]
    pub fn density(&self) -> bool {
        self.density
    }

    /// Whether the outlier bars are drawn.
    #[must_use]
    pub fn outliers(&self) -> bool {
        self.outliers
    }

    /// Whether the limit boxes are drawn.
    #[must_use]
    pub fn show_limits(&self) -> bool {
        self.show_limits
    }

    /// Whether viewport changes trigger rebinning.
    #[must_use]
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Pan/zoom clamp.
    #[must_use]
    pub fn axis_bounds(&self) -> (f64, f64) {
        self.axis_bounds
    }

    /// Renderer window.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// In-range bars.
    #[must_use]
    pub fn bin_table(&self) -> &BinTable {
        &self.bin_table
    }

    /// Outlier bars.
    #[must_use]
    pub fn outlier_table(&self) -> &OutlierTable {
        &self.outlier_table
    }
}
