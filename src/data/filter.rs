//! Filter Engine
//! Per-column predicates combined with logical AND.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;

use super::loader::{is_numeric, unique_values};
use super::processor::ProcessorError;

/// Restriction on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Row passes when its value is one of `allowed`. Missing values pass
    /// only with `include_missing`.
    Text {
        allowed: BTreeSet<String>,
        include_missing: bool,
    },
    /// Inclusive numeric interval. Missing and NaN values never pass.
    Range { min: f64, max: f64 },
}

/// Column name → filter. Columns without an entry are unrestricted.
pub type FilterSet = BTreeMap<String, ColumnFilter>;

impl ColumnFilter {
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnFilter::Text {
            allowed: values.into_iter().map(Into::into).collect(),
            include_missing: false,
        }
    }

    pub fn range(min: f64, max: f64) -> Self {
        ColumnFilter::Range { min, max }
    }

    /// The filter that lets every non-missing value of `column` through:
    /// its distinct values for text, its observed min/max for numbers.
    ///
    /// `None` for a numeric column with no observed values.
    pub fn default_for(df: &DataFrame, column: &str) -> Result<Option<Self>, ProcessorError> {
        let series = df
            .column(column)
            .map_err(|_| ProcessorError::InvalidColumn(column.to_string()))?;

        if !is_numeric(series.dtype()) {
            return Ok(Some(Self::text(unique_values(df, column)?)));
        }

        let values = series.cast(&DataType::Float64)?;
        let (min, max) = values
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            return Ok(None);
        }
        Ok(Some(Self::range(min, max)))
    }

    /// Whether any value could pass this filter.
    pub fn is_satisfiable(&self) -> bool {
        match self {
            ColumnFilter::Text {
                allowed,
                include_missing,
            } => *include_missing || !allowed.is_empty(),
            ColumnFilter::Range { min, max } => min <= max,
        }
    }

    fn mask(&self, column: &Column) -> Result<Vec<bool>, ProcessorError> {
        match self {
            ColumnFilter::Text {
                allowed,
                include_missing,
            } => {
                let text = column.cast(&DataType::String)?;
                Ok(text
                    .str()?
                    .into_iter()
                    .map(|v| match v {
                        Some(v) => allowed.contains(v),
                        None => *include_missing,
                    })
                    .collect())
            }
            ColumnFilter::Range { min, max } => {
                if !is_numeric(column.dtype()) {
                    return Err(ProcessorError::FilterMismatch {
                        column: column.name().to_string(),
                    });
                }
                let values = column.cast(&DataType::Float64)?;
                Ok(values
                    .f64()?
                    .into_iter()
                    .map(|v| v.is_some_and(|v| *min <= v && v <= *max))
                    .collect())
            }
        }
    }
}

/// Default filters for every column of `df`.
pub fn default_filters(df: &DataFrame) -> Result<FilterSet, ProcessorError> {
    let mut filters = FilterSet::new();
    for column in df.get_column_names() {
        if let Some(filter) = ColumnFilter::default_for(df, column.as_str())? {
            filters.insert(column.to_string(), filter);
        }
    }
    Ok(filters)
}

/// Keep the rows of `df` that satisfy every filter, in their original order.
pub fn apply_filters(df: &DataFrame, filters: &FilterSet) -> Result<DataFrame, ProcessorError> {
    if filters.is_empty() {
        return Ok(df.clone());
    }

    let mut keep = vec![true; df.height()];
    for (name, filter) in filters {
        let column = df
            .column(name)
            .map_err(|_| ProcessorError::InvalidColumn(name.clone()))?;
        for (slot, pass) in keep.iter_mut().zip(filter.mask(column)?) {
            *slot &= pass;
        }
    }

    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let filtered = df.filter(&mask)?;
    log::debug!(
        "Filtered {} -> {} rows over {} column filter(s)",
        df.height(),
        filtered.height(),
        filters.len()
    );
    Ok(filtered)
}
