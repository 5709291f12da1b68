//! One pass of the dashboard pipeline: select, filter, summarize, aggregate.
//!
//! [`compute`] is a pure function of the loaded table and the user's
//! selections. The GUI calls it again whenever a control changes.

use polars::prelude::*;
use thiserror::Error;

use crate::data::{
    apply_filters, numeric_columns, select_columns, ExportError, FilterSet, LoaderError,
    ProcessorError,
};
use crate::stats::{aggregate, compute_indicators, AggregationSpec, GroupedTable, Indicators, StatsError};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// The user's current selections.
#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    /// Visible columns, in display order.
    pub columns: Vec<String>,
    pub filters: FilterSet,
    /// Numeric column summarized by the KPI cards.
    pub indicator_column: Option<String>,
    pub chart: Option<AggregationSpec>,
}

/// Everything the dashboard displays for one query.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filtered: DataFrame,
    pub numeric_columns: Vec<String>,
    /// `None` when no indicator column was requested or none is numeric.
    pub indicators: Option<Indicators>,
    pub grouped: Option<GroupedTable>,
}

impl DashboardView {
    pub fn has_numeric_columns(&self) -> bool {
        !self.numeric_columns.is_empty()
    }
}

/// Run the pipeline over `base`.
///
/// Indicators and the chart are only computed while the selected columns
/// include a numeric one.
pub fn compute(base: &DataFrame, query: &DashboardQuery) -> Result<DashboardView, DashboardError> {
    let selected = select_columns(base, &query.columns)?;
    let filtered = apply_filters(&selected, &query.filters)?;
    let numeric_columns = numeric_columns(&filtered);

    let (indicators, grouped) = if numeric_columns.is_empty() {
        (None, None)
    } else {
        let indicators = query
            .indicator_column
            .as_deref()
            .map(|column| compute_indicators(&filtered, column))
            .transpose()?;
        let grouped = query
            .chart
            .as_ref()
            .map(|spec| aggregate(&filtered, spec))
            .transpose()?;
        (indicators, grouped)
    };

    log::debug!(
        "Dashboard view: {} of {} rows, {} columns",
        filtered.height(),
        base.height(),
        filtered.width()
    );

    Ok(DashboardView {
        filtered,
        numeric_columns,
        indicators,
        grouped,
    })
}
