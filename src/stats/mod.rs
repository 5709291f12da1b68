//! Stats module - KPI indicators and grouped aggregation

mod aggregator;
mod calculator;

pub use aggregator::{
    aggregate, group_sizes, AggregationSpec, GroupRow, GroupedTable, ReductionKind, SortOrder,
    GROUP_COL, MISSING_GROUP_LABEL, SECONDARY_COL, VALUE_COL,
};
pub use calculator::{compute_indicators, format_thousands, Indicators, Measure, StatsError};
