//! Row-shaped output tables consumed by bar renderers.

use crate::binning::Binned;
use crate::data::Dataset;

/// One bar: `{count, left, right, width, mid}`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BinRow {
    /// Count or density.
    pub count: f64,
    /// Left edge.
    pub left: f64,
    /// Right edge.
    pub right: f64,
    /// `right - left`.
    pub width: f64,
    /// `left + width / 2`.
    pub mid: f64,
}

impl BinRow {
    /// Build a row from its edges; `width` and `mid` follow.
    #[must_use]
    pub fn new(count: f64, left: f64, right: f64) -> Self {
        let width = right - left;
        Self { count, left, right, width, mid: left + width / 2.0 }
    }

    /// True when every field is a number (no `NaN` placeholder).
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        [self.count, self.left, self.right, self.width, self.mid].iter().all(|v| !v.is_nan())
    }

    /// Bit-level equality, treating `NaN` placeholders as equal.
    #[must_use]
    pub fn bit_eq(&self, other: &Self) -> bool {
        let a = [self.count, self.left, self.right, self.width, self.mid];
        let b = [other.count, other.left, other.right, other.width, other.mid];
        a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits())
    }
}

/// In-range bars, one per bin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinTable {
    rows: Vec<BinRow>,
}

impl BinTable {
    /// Reshape a binning result into rows.
    #[must_use]
    pub fn from_binned(binned: &Binned) -> Self {
        let rows = binned
            .counts
            .iter()
            .zip(binned.edges.windows(2))
            .map(|(&count, w)| BinRow::new(count, w[0], w[1]))
            .collect();
        Self { rows }
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[BinRow] {
        &self.rows
    }

    /// Number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True before the first computation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Left edge of the first bin.
    #[must_use]
    pub fn first_edge(&self) -> Option<f64> {
        self.rows.first().map(|r| r.left)
    }

    /// Right edge of the last bin.
    #[must_use]
    pub fn last_edge(&self) -> Option<f64> {
        self.rows.last().map(|r| r.right)
    }

    /// Tallest bar, ignoring `NaN` densities.
    #[must_use]
    pub fn max_count(&self) -> f64 {
        self.rows.iter().map(|r| r.count).filter(|c| !c.is_nan()).fold(0.0, f64::max)
    }

    /// Sum of counts.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Bit-level equality of every row.
    #[must_use]
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.rows.len() == other.rows.len()
            && self.rows.iter().zip(&other.rows).all(|(a, b)| a.bit_eq(b))
    }
}

/// The two out-of-range bars.
///
/// Each bar sits flush against the histogram: the low bar ends at the first
/// bin edge and the high bar starts at the last one. Its outward edge is the
/// most extreme outlier, or `NaN` when that side is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutlierTable {
    /// Values strictly below the visible range.
    pub low: BinRow,
    /// Values strictly above the visible range.
    pub high: BinRow,
}

impl OutlierTable {
    /// Aggregate values outside `range` against the computed `edges`.
    #[must_use]
    pub fn compute(dataset: &Dataset, range: (f64, f64), edges: &[f64]) -> Self {
        let first = edges.first().copied().unwrap_or(range.0);
        let last = edges.last().copied().unwrap_or(range.1);

        let (mut low_count, mut low_min) = (0usize, f64::NAN);
        let (mut high_count, mut high_max) = (0usize, f64::NAN);
        for &v in dataset.values() {
            if v < range.0 {
                low_count += 1;
                low_min = if low_min.is_nan() { v } else { low_min.min(v) };
            } else if v > range.1 {
                high_count += 1;
                high_max = if high_max.is_nan() { v } else { high_max.max(v) };
            }
        }

        Self {
            low: BinRow::new(low_count as f64, low_min, first),
            high: BinRow::new(high_count as f64, last, high_max),
        }
    }

    /// Rows in `[low, high]` order.
    #[must_use]
    pub fn rows(&self) -> [BinRow; 2] {
        [self.low, self.high]
    }

    /// Total number of outliers.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.low.count + self.high.count
    }

    /// Bit-level equality, treating `NaN` placeholders as equal.
    #[must_use]
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.low.bit_eq(&other.low) && self.high.bit_eq(&other.high)
    }
}
