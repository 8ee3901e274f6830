//! Data-to-pixel mapping.

use crate::error::{Error, Result};

/// Linear map from a data domain onto a pixel range.
///
/// The range may be reversed (`range.0 > range.1`), which is how the y axis
/// puts zero at the bottom of the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::InvalidData(format!(
                "scale domain ({}, {}) is not finite",
                domain.0, domain.1
            )));
        }
        if domain.0 == domain.1 {
            return Err(Error::InvalidData("scale domain min and max cannot be equal".to_string()));
        }
        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Like [`LinearScale::new`], but an empty domain is widened by ±0.5.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is not finite.
    pub fn widened(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if domain.0 == domain.1 {
            return Self::new((domain.0 - 0.5, domain.1 + 0.5), range);
        }
        Self::new(domain, range)
    }

    /// Map a domain value to the range.
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    /// Map a range value back to the domain.
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Domain extent.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    /// Range extent.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}
