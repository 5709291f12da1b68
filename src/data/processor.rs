//! Data Processor Module
//! Column selection over a loaded table.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' does not exist in the table")]
    InvalidColumn(String),
    #[error("Column '{column}' is not numeric and cannot take a range filter")]
    FilterMismatch { column: String },
}

/// Narrow `df` to `columns`, in the given order.
///
/// Repeated names keep their first position only.
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame, ProcessorError> {
    let mut ordered: Vec<&str> = Vec::with_capacity(columns.len());
    for name in columns {
        if df.column(name).is_err() {
            return Err(ProcessorError::InvalidColumn(name.clone()));
        }
        if !ordered.contains(&name.as_str()) {
            ordered.push(name);
        }
    }

    Ok(df.select(ordered)?)
}
