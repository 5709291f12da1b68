//! Grouped aggregation for the dashboard chart.

use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

use super::calculator::StatsError;
use crate::data::is_numeric;

/// Output column holding the grouping value.
pub const GROUP_COL: &str = "group";
/// Output column holding the reduced value.
pub const VALUE_COL: &str = "value";
/// Output column holding the per-group mean of the secondary column.
pub const SECONDARY_COL: &str = "secondary";

/// Label for the group of rows with a missing grouping value.
pub const MISSING_GROUP_LABEL: &str = "(vacío)";

/// Per-group reduction of the value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionKind {
    #[default]
    Sum,
    Mean,
    Median,
    Count,
}

impl ReductionKind {
    pub const ALL: [ReductionKind; 4] = [
        ReductionKind::Sum,
        ReductionKind::Mean,
        ReductionKind::Median,
        ReductionKind::Count,
    ];

    /// Dashboard label.
    pub fn label(self) -> &'static str {
        match self {
            ReductionKind::Sum => "Suma",
            ReductionKind::Mean => "Promedio",
            ReductionKind::Median => "Mediana",
            ReductionKind::Count => "Conteo",
        }
    }

    fn expr(self, value: Expr) -> Expr {
        match self {
            ReductionKind::Sum => value.sum(),
            ReductionKind::Mean => value.mean(),
            ReductionKind::Median => value.median(),
            ReductionKind::Count => len(),
        }
    }
}

impl fmt::Display for ReductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReductionKind {
    type Err = StatsError;

    /// Accepts English names and the dashboard's Spanish labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" | "suma" => Ok(ReductionKind::Sum),
            "mean" | "promedio" => Ok(ReductionKind::Mean),
            "median" | "mediana" => Ok(ReductionKind::Median),
            "count" | "conteo" => Ok(ReductionKind::Count),
            other => Err(StatsError::InvalidAggregation(format!(
                "unknown reduction kind '{}'",
                other
            ))),
        }
    }
}

/// Ordering of the grouped rows by reduced value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// First-encountered group order.
    #[default]
    Unordered,
    Descending,
    Ascending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [
        SortOrder::Unordered,
        SortOrder::Descending,
        SortOrder::Ascending,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Unordered => "Sin ordenar",
            SortOrder::Descending => "Descendente",
            SortOrder::Ascending => "Ascendente",
        }
    }
}

/// What to group, what to reduce and how to order the result.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub group_column: String,
    pub value_column: String,
    pub kind: ReductionKind,
    pub secondary_column: Option<String>,
    pub sort: SortOrder,
}

impl AggregationSpec {
    pub fn new(group_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
            value_column: value_column.into(),
            kind: ReductionKind::default(),
            secondary_column: None,
            sort: SortOrder::default(),
        }
    }

    pub fn with_kind(mut self, kind: ReductionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_secondary(mut self, column: impl Into<String>) -> Self {
        self.secondary_column = Some(column.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// One row of the grouped result, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub label: String,
    pub value: Option<f64>,
    pub secondary: Option<f64>,
}

/// Result of [`aggregate`]: columns `group`, `value` and optionally `secondary`.
#[derive(Debug, Clone)]
pub struct GroupedTable {
    pub frame: DataFrame,
    pub spec: AggregationSpec,
}

impl GroupedTable {
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn has_secondary(&self) -> bool {
        self.spec.secondary_column.is_some()
    }

    /// Axis title for the reduced value, e.g. `Promedio de Precio`.
    pub fn value_title(&self) -> String {
        format!("{} de {}", self.spec.kind.label(), self.spec.value_column)
    }

    /// Rows in output order. Missing grouping values are labelled
    /// [`MISSING_GROUP_LABEL`].
    pub fn rows(&self) -> Result<Vec<GroupRow>, StatsError> {
        let labels = self.frame.column(GROUP_COL)?.cast(&DataType::String)?;
        let values = self.frame.column(VALUE_COL)?;
        let values = values.f64()?;

        let secondary = if self.has_secondary() {
            Some(self.frame.column(SECONDARY_COL)?.f64()?.clone())
        } else {
            None
        };

        let rows = labels
            .str()?
            .into_iter()
            .zip(values.into_iter())
            .enumerate()
            .map(|(i, (label, value))| GroupRow {
                label: label.unwrap_or(MISSING_GROUP_LABEL).to_string(),
                value,
                secondary: secondary.as_ref().and_then(|s| s.get(i)),
            })
            .collect();
        Ok(rows)
    }
}

fn require_numeric(df: &DataFrame, column: &str) -> Result<(), StatsError> {
    let series = df
        .column(column)
        .map_err(|_| StatsError::InvalidColumn(column.to_string()))?;
    if is_numeric(series.dtype()) {
        Ok(())
    } else {
        Err(StatsError::InvalidAggregation(format!(
            "column '{}' is not numeric",
            column
        )))
    }
}

/// Group `df` by `spec.group_column` and reduce `spec.value_column`.
///
/// Groups appear in first-encountered order; rows with a missing grouping
/// value form their own group. NaN values are reduced as missing. Sorting by
/// value is stable.
pub fn aggregate(df: &DataFrame, spec: &AggregationSpec) -> Result<GroupedTable, StatsError> {
    if df.column(&spec.group_column).is_err() {
        return Err(StatsError::InvalidColumn(spec.group_column.clone()));
    }
    require_numeric(df, &spec.value_column)?;
    if let Some(secondary) = &spec.secondary_column {
        require_numeric(df, secondary)?;
    }

    let mut inputs = vec![
        col(spec.group_column.as_str()).alias(GROUP_COL),
        col(spec.value_column.as_str())
            .cast(DataType::Float64)
            .fill_nan(lit(NULL))
            .alias(VALUE_COL),
    ];
    let mut aggs = vec![spec
        .kind
        .expr(col(VALUE_COL))
        .cast(DataType::Float64)
        .alias(VALUE_COL)];
    if let Some(secondary) = &spec.secondary_column {
        inputs.push(
            col(secondary.as_str())
                .cast(DataType::Float64)
                .fill_nan(lit(NULL))
                .alias(SECONDARY_COL),
        );
        aggs.push(col(SECONDARY_COL).mean().alias(SECONDARY_COL));
    }

    let mut lf = df
        .clone()
        .lazy()
        .select(inputs)
        .group_by_stable([col(GROUP_COL)])
        .agg(aggs);

    let descending = match spec.sort {
        SortOrder::Unordered => None,
        SortOrder::Descending => Some(true),
        SortOrder::Ascending => Some(false),
    };
    if let Some(descending) = descending {
        lf = lf.sort(
            [VALUE_COL],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        );
    }

    let frame = lf.collect()?;
    log::debug!(
        "Aggregated {} rows into {} groups ({} of {} by {})",
        df.height(),
        frame.height(),
        spec.kind.label(),
        spec.value_column,
        spec.group_column
    );

    Ok(GroupedTable {
        frame,
        spec: spec.clone(),
    })
}

/// Number of rows in each group of `column`, in first-encountered order.
pub fn group_sizes(df: &DataFrame, column: &str) -> Result<Vec<usize>, StatsError> {
    if df.column(column).is_err() {
        return Err(StatsError::InvalidColumn(column.to_string()));
    }

    let sizes = df
        .clone()
        .lazy()
        .group_by_stable([col(column)])
        .agg([len().cast(DataType::UInt64).alias("size")])
        .collect()?;

    let sizes = sizes
        .column("size")?
        .u64()?
        .into_no_null_iter()
        .map(|n| n as usize)
        .collect();
    Ok(sizes)
}
