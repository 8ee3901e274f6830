//! Dataset extraction.
//!
//! A histogram is fed either a bare series of values or a table of named
//! columns plus a column selector. Missing entries (`NaN` or `None`) are
//! dropped; what remains is the [`Dataset`].

use crate::error::{Error, Result};

/// Column name used when the input is a bare series.
pub const DEFAULT_COLUMN: &str = "x";

/// Named numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl Table {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column; `NaN` entries count as missing.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        let values = values.iter().map(|&v| if v.is_nan() { None } else { Some(v) }).collect();
        self.columns.push((name.into(), values));
        self
    }

    /// Add a column with explicit missing entries.
    #[must_use]
    pub fn column_opt(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    /// Look up a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

/// Raw histogram input.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A bare sequence of values.
    Series(Vec<f64>),
    /// Named columns, selected by column name.
    Table(Table),
}

impl From<Vec<f64>> for DataSource {
    fn from(values: Vec<f64>) -> Self {
        Self::Series(values)
    }
}

impl From<&[f64]> for DataSource {
    fn from(values: &[f64]) -> Self {
        Self::Series(values.to_vec())
    }
}

impl From<Table> for DataSource {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl DataSource {
    /// Extract the selected column.
    ///
    /// Returns the dataset and the selector actually used: a series, or a
    /// single-column table whose only column does not match, resolves to
    /// [`DEFAULT_COLUMN`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] when the selector matches no column of a
    /// multi-column table, or when no value survives missing-value removal.
    pub fn extract(&self, selector: Option<&str>) -> Result<(Dataset, String)> {
        let (values, used): (Vec<f64>, String) = match self {
            Self::Series(values) => {
                (values.iter().copied().filter(|v| !v.is_nan()).collect(), DEFAULT_COLUMN.into())
            }
            Self::Table(table) => match selector.and_then(|s| table.get(s).map(|c| (s, c))) {
                Some((name, column)) => (present(column), name.to_string()),
                None if table.width() == 1 => {
                    let column = table.columns[0].1.as_slice();
                    (present(column), DEFAULT_COLUMN.into())
                }
                None => {
                    return Err(Error::InvalidData(format!(
                        "column {:?} not found (available: {})",
                        selector.unwrap_or(DEFAULT_COLUMN),
                        table.names().collect::<Vec<_>>().join(", ")
                    )))
                }
            },
        };
        Ok((Dataset::new(values)?, used))
    }
}

fn present(column: &[Option<f64>]) -> Vec<f64> {
    column.iter().flatten().copied().filter(|v| !v.is_nan()).collect()
}

/// Non-empty sequence of finite-or-infinite, non-missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    values: Vec<f64>,
    min: f64,
    max: f64,
}

impl Dataset {
    /// Wrap values, dropping any `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if nothing is left.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        let values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return Err(Error::InvalidData(
                "no values left after dropping missing entries".to_string(),
            ));
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self { values, min, max })
    }

    /// Values in input order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest value.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// `(min, max)`.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}
