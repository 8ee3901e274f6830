//! Histogram binning.
//!
//! Supports automatic bin-count selection with the Sturges, square-root,
//! Rice, Scott and Freedman-Diaconis rules, fixed bin counts and explicit
//! bin edges.
//!
//! # Semantics
//!
//! - Equal-width bins span the binning range exactly; every bin is half-open
//!   `[left, right)` except the last, which is closed.
//! - Values outside the range are not counted.
//! - A zero-width range is widened to `(low - 0.5, high + 0.5)`.
//! - Automatic estimators see only the values inside the range. A zero bin
//!   width (constant data, or no data in range) yields a single bin.
//!
//! # References
//!
//! - Sturges, H. A. (1926). "The Choice of a Class Interval." *JASA*, 21(153), 65-66.
//! - Scott, D. W. (1979). "On optimal and data-based histograms." *Biometrika*, 66(3), 605-610.
//! - Freedman, D., & Diaconis, P. (1981). "On the histogram as a density estimator."
//!   *Z. Wahrscheinlichkeitstheorie*, 57(4), 453-476.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper limit for automatically chosen bin counts.
pub const MAX_AUTO_BINS: usize = 10_000;

/// Rule for choosing the bin count from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinEstimator {
    /// Minimum of the Freedman-Diaconis and Sturges widths.
    #[default]
    Auto,
    /// Sturges' rule: width = ptp / (log2(n) + 1)
    Sturges,
    /// Square-root rule: width = ptp / sqrt(n)
    Sqrt,
    /// Rice rule: width = ptp / (2 * n^(1/3))
    Rice,
    /// Scott's rule: width = (24 * sqrt(pi) / n)^(1/3) * std
    Scott,
    /// Freedman-Diaconis rule: width = 2 * IQR / n^(1/3)
    #[serde(rename = "fd")]
    FreedmanDiaconis,
}

impl BinEstimator {
    /// Estimated bin width for the given values (0.0 when undefined).
    #[must_use]
    pub fn bin_width(self, values: &[f64]) -> f64 {
        let n = values.len();
        if n == 0 {
            return 0.0;
        }
        let nf = n as f64;
        match self {
            Self::Sturges => ptp(values) / (nf.log2() + 1.0),
            Self::Sqrt => ptp(values) / nf.sqrt(),
            Self::Rice => ptp(values) / (2.0 * nf.cbrt()),
            Self::Scott => (24.0 * std::f64::consts::PI.sqrt() / nf).cbrt() * std_dev(values),
            Self::FreedmanDiaconis => 2.0 * iqr(values) / nf.cbrt(),
            Self::Auto => {
                let fd = Self::FreedmanDiaconis.bin_width(values);
                let sturges = Self::Sturges.bin_width(values);
                if fd > 0.0 {
                    fd.min(sturges)
                } else {
                    sturges
                }
            }
        }
    }

    /// Bin count for `values` over `range`.
    #[must_use]
    pub fn bin_count(self, values: &[f64], range: (f64, f64)) -> usize {
        let width = self.bin_width(values);
        if width > 0.0 && width.is_finite() {
            (((range.1 - range.0) / width).ceil() as usize).clamp(1, MAX_AUTO_BINS)
        } else {
            1
        }
    }

    /// Name as used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Sturges => "sturges",
            Self::Sqrt => "sqrt",
            Self::Rice => "rice",
            Self::Scott => "scott",
            Self::FreedmanDiaconis => "fd",
        }
    }
}

impl fmt::Display for BinEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinEstimator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sturges" => Ok(Self::Sturges),
            "sqrt" => Ok(Self::Sqrt),
            "rice" => Ok(Self::Rice),
            "scott" => Ok(Self::Scott),
            "fd" | "freedman-diaconis" => Ok(Self::FreedmanDiaconis),
            other => Err(Error::InvalidBinSpec(format!("unknown bin estimator {other:?}"))),
        }
    }
}

fn ptp(values: &[f64]) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max - min
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Interquartile range with linear interpolation between order statistics.
fn iqr(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, 0.75) - percentile(&sorted, 0.25)
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// How the binning range is divided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    /// Explicit, strictly increasing edges; the binning range is ignored.
    Edges(Vec<f64>),
    /// Fixed number of equal-width bins.
    Count(usize),
    /// Bin count chosen by an estimator.
    Auto(BinEstimator),
}

impl Default for BinSpec {
    fn default() -> Self {
        Self::Auto(BinEstimator::Auto)
    }
}

impl From<usize> for BinSpec {
    fn from(n: usize) -> Self {
        Self::Count(n)
    }
}

impl From<Vec<f64>> for BinSpec {
    fn from(edges: Vec<f64>) -> Self {
        Self::Edges(edges)
    }
}

impl From<BinEstimator> for BinSpec {
    fn from(estimator: BinEstimator) -> Self {
        Self::Auto(estimator)
    }
}

/// Bin edges and per-bin counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Binned {
    /// Count (or density) per bin.
    pub counts: Vec<f64>,
    /// `counts.len() + 1` increasing edges.
    pub edges: Vec<f64>,
}

impl Binned {
    /// Number of bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }
}

/// Compute bin edges for `spec` over `range`.
///
/// # Errors
///
/// Returns [`Error::InvalidBinSpec`] for a zero bin count, a reversed or
/// non-finite range, or edges that are too few, non-finite or not strictly
/// increasing.
pub fn bin_edges(values: &[f64], spec: &BinSpec, range: (f64, f64)) -> Result<Vec<f64>> {
    let n = match spec {
        BinSpec::Edges(edges) => {
            validate_edges(edges)?;
            return Ok(edges.clone());
        }
        BinSpec::Count(0) => {
            return Err(Error::InvalidBinSpec("bin count must be at least 1".to_string()))
        }
        BinSpec::Count(n) => *n,
        BinSpec::Auto(estimator) => {
            let (lo, hi) = binning_range(range)?;
            let inside: Vec<f64> =
                values.iter().copied().filter(|&v| v >= lo && v <= hi).collect();
            estimator.bin_count(&inside, (lo, hi))
        }
    };
    let (lo, hi) = binning_range(range)?;
    Ok(linspace(lo, hi, n))
}

/// Bin `values` according to `spec` over `range`.
///
/// With `density`, counts are divided by `total * width` so the histogram
/// integrates to 1; with no value in range the densities are `NaN`.
///
/// # Errors
///
/// See [`bin_edges`].
pub fn histogram(
    values: &[f64],
    spec: &BinSpec,
    range: (f64, f64),
    density: bool,
) -> Result<Binned> {
    let edges = bin_edges(values, spec, range)?;
    let mut counts = match spec {
        BinSpec::Edges(_) => count_sorted_edges(values, &edges),
        _ => count_equal_width(values, &edges),
    };

    if density {
        let total: f64 = counts.iter().sum();
        for (count, w) in counts.iter_mut().zip(edges.windows(2)) {
            *count /= total * (w[1] - w[0]);
        }
    }

    Ok(Binned { counts, edges })
}

fn binning_range(range: (f64, f64)) -> Result<(f64, f64)> {
    let (lo, hi) = range;
    if !lo.is_finite() || !hi.is_finite() {
        return Err(Error::InvalidBinSpec(format!("range ({lo}, {hi}) is not finite")));
    }
    if lo > hi {
        return Err(Error::InvalidBinSpec(format!("range low {lo} exceeds high {hi}")));
    }
    if !(hi - lo).is_finite() {
        return Err(Error::InvalidBinSpec(format!("range ({lo}, {hi}) width overflows")));
    }
    if lo == hi {
        return Ok((lo - 0.5, hi + 0.5));
    }
    Ok((lo, hi))
}

fn validate_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::InvalidBinSpec(format!(
            "need at least 2 bin edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(Error::InvalidBinSpec("bin edges must be finite".to_string()));
    }
    if let Some(w) = edges.windows(2).find(|w| w[1] <= w[0]) {
        return Err(Error::InvalidBinSpec(format!(
            "bin edges must increase strictly ({} followed by {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / n as f64;
    let mut edges: Vec<f64> = (0..=n).map(|i| lo + i as f64 * step).collect();
    edges[n] = hi;
    edges
}

/// Index by arithmetic, then nudge by one where rounding disagrees with the
/// stored edges so the result matches a search over `edges`.
fn count_equal_width(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let n = edges.len() - 1;
    let (first, last) = (edges[0], edges[n]);
    let norm = n as f64 / (last - first);
    let mut counts = vec![0.0; n];

    for &v in values {
        if !(v >= first && v <= last) {
            continue;
        }
        let mut i = (((v - first) * norm) as usize).min(n - 1);
        if v < edges[i] {
            i -= 1;
        } else if v >= edges[i + 1] && i != n - 1 {
            i += 1;
        }
        counts[i] += 1.0;
    }
    counts
}

fn count_sorted_edges(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let n = edges.len() - 1;
    let (first, last) = (edges[0], edges[n]);
    let mut counts = vec![0.0; n];

    for &v in values {
        if !(v >= first && v <= last) {
            continue;
        }
        let i = edges.partition_point(|&e| e <= v).saturating_sub(1).min(n - 1);
        counts[i] += 1.0;
    }
    counts
}
