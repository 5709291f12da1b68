//! Statistics Calculator Module
//! KPI indicators over a numeric column of the filtered table.

use polars::prelude::*;
use statrs::statistics::{Data, Median, Statistics};
use std::fmt;
use thiserror::Error;

use crate::data::is_numeric;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' does not exist in the table")]
    InvalidColumn(String),
    #[error("Invalid aggregation: {0}")]
    InvalidAggregation(String),
}

/// A statistic that may be undefined for an empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Value(f64),
    NoData,
}

impl Measure {
    pub fn value(self) -> Option<f64> {
        match self {
            Measure::Value(v) => Some(v),
            Measure::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Measure::NoData)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Value(v) => f.write_str(&format_thousands(*v, 2)),
            Measure::NoData => f.write_str("Sin datos"),
        }
    }
}

/// Summary indicators for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicators {
    pub column: String,
    /// Rows in the table, regardless of missing values in `column`.
    pub count: usize,
    pub sum: f64,
    pub mean: Measure,
    pub median: Measure,
}

/// Non-missing, non-NaN values of a numeric column as f64.
pub(crate) fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, StatsError> {
    let series = df
        .column(column)
        .map_err(|_| StatsError::InvalidColumn(column.to_string()))?;
    if !is_numeric(series.dtype()) {
        return Err(StatsError::InvalidAggregation(format!(
            "column '{}' is not numeric",
            column
        )));
    }

    let values = series.cast(&DataType::Float64)?;
    let values = values
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    Ok(values)
}

/// Count, sum, mean and median of `column` over `df`.
///
/// An empty sample yields `sum = 0` and `NoData` for mean and median.
pub fn compute_indicators(df: &DataFrame, column: &str) -> Result<Indicators, StatsError> {
    let values = numeric_values(df, column)?;

    let (mean, median) = if values.is_empty() {
        (Measure::NoData, Measure::NoData)
    } else {
        let mean = Statistics::mean(values.iter());
        let median = Data::new(values.clone()).median();
        (Measure::Value(mean), Measure::Value(median))
    };

    Ok(Indicators {
        column: column.to_string(),
        count: df.height(),
        sum: values.iter().sum(),
        mean,
        median,
    })
}

/// Format with `decimals` places and comma thousands separators.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
