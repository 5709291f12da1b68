//! Integration tests for the select / filter / aggregate pipeline

use polars::prelude::*;
use realty_dashboard::dashboard::{compute, DashboardQuery};
use realty_dashboard::data::{
    apply_filters, default_filters, export_csv, load_table, select_columns, ColumnFilter,
    FilterSet, TableCache,
};
use realty_dashboard::stats::{
    aggregate, compute_indicators, group_sizes, AggregationSpec, ReductionKind, SortOrder,
};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

fn narrowing_filters() -> FilterSet {
    let mut filters = FilterSet::new();
    filters.insert(
        "Tipo".to_string(),
        ColumnFilter::text(["Casa"]),
    );
    filters.insert(
        "Precio".to_string(),
        ColumnFilter::range(100_000_000.0, 300_000_000.0),
    );
    filters
}

#[test]
fn test_filtering_is_idempotent() {
    let df = common::create_sales_dataframe();
    let filters = narrowing_filters();

    let once = apply_filters(&df, &filters).unwrap();
    let twice = apply_filters(&once, &filters).unwrap();

    assert_eq!(once.height(), 3);
    assert!(once.equals_missing(&twice));
}

#[test]
fn test_select_and_filter_commute() {
    let df = common::create_sales_dataframe();
    let filters = narrowing_filters();
    let columns = vec!["Precio".to_string(), "Tipo".to_string(), "Barrio".to_string()];

    let select_then_filter =
        apply_filters(&select_columns(&df, &columns).unwrap(), &filters).unwrap();
    let filter_then_select =
        select_columns(&apply_filters(&df, &filters).unwrap(), &columns).unwrap();

    assert!(select_then_filter.equals_missing(&filter_then_select));
}

#[test]
fn test_filtered_rows_are_a_subset_in_original_order() {
    let df = common::create_sales_dataframe();
    let filtered = apply_filters(&df, &narrowing_filters()).unwrap();

    let areas: Vec<f64> = filtered
        .column("Area")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(areas, vec![90.5, 110.25, 130.5]);
}

#[test]
fn test_default_filters_only_drop_incomplete_rows() {
    let df = common::create_sales_dataframe();
    let filtered = apply_filters(&df, &default_filters(&df).unwrap()).unwrap();

    // One row lacks a Barrio, another lacks a Precio.
    assert_eq!(filtered.height(), df.height() - 2);
}

#[test]
fn test_group_sizes_sum_to_filtered_rows() {
    let df = common::create_sales_dataframe();
    for filters in [FilterSet::new(), narrowing_filters()] {
        let filtered = apply_filters(&df, &filters).unwrap();
        for column in ["Barrio", "Tipo", "Estrato"] {
            let sizes = group_sizes(&filtered, column).unwrap();
            assert_eq!(sizes.iter().sum::<usize>(), filtered.height());

            let grouped = aggregate(
                &filtered,
                &AggregationSpec::new(column, "Precio").with_kind(ReductionKind::Count),
            )
            .unwrap();
            assert_eq!(grouped.len(), sizes.len());
            let counted: f64 = grouped.rows().unwrap().iter().filter_map(|r| r.value).sum();
            assert_eq!(counted as usize, filtered.height());
        }
    }
}

#[test]
fn test_grouped_rows_match_distinct_values() {
    let df = common::create_sales_dataframe();
    let grouped = aggregate(&df, &AggregationSpec::new("Barrio", "Precio")).unwrap();

    // Centro, Caobos, missing, Prados
    assert_eq!(grouped.len(), 4);
}

#[test]
fn test_export_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let df = common::create_sales_dataframe();
    let filtered = apply_filters(&df, &narrowing_filters()).unwrap();

    let bytes = export_csv(&filtered).unwrap();
    let path = temp_dir.path().join("datos_filtrados.csv");
    std::fs::write(&path, &bytes).unwrap();

    let reloaded = load_table(&path).unwrap();
    assert_eq!(common::all_columns(&reloaded), common::all_columns(&filtered));
    assert_eq!(reloaded.height(), filtered.height());
    assert!(reloaded.equals_missing(&filtered));
}

#[test]
fn test_loaded_csv_matches_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(temp_dir.path(), "cucutaventacasas.csv", common::sales_csv());

    let mut cache = TableCache::new();
    let loaded = cache.get_or_load(&path).unwrap();
    assert!(loaded.equals_missing(&common::create_sales_dataframe()));
}

#[test]
fn test_example_sum_by_neighbourhood() {
    let df = df! {
        "Barrio" => ["A", "A", "B"],
        "Precio" => [100i64, 200, 300],
    }
    .unwrap();

    let grouped = aggregate(&df, &AggregationSpec::new("Barrio", "Precio")).unwrap();
    let rows = grouped.rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].label.as_str(), rows[0].value), ("A", Some(300.0)));
    assert_eq!((rows[1].label.as_str(), rows[1].value), ("B", Some(300.0)));
}

#[test]
fn test_example_mean_descending() {
    let df = df! {
        "Barrio" => ["A", "A", "B"],
        "Precio" => [100i64, 300, 300],
    }
    .unwrap();

    let spec = AggregationSpec::new("Barrio", "Precio")
        .with_kind(ReductionKind::Mean)
        .with_sort(SortOrder::Descending);
    let rows = aggregate(&df, &spec).unwrap().rows().unwrap();
    assert_eq!((rows[0].label.as_str(), rows[0].value), ("B", Some(300.0)));
    assert_eq!((rows[1].label.as_str(), rows[1].value), ("A", Some(200.0)));
}

#[test]
fn test_example_numeric_and_text_filters() {
    let df = df! {
        "Barrio" => ["A", "A", "B"],
        "Precio" => [100i64, 200, 300],
    }
    .unwrap();

    let mut range = FilterSet::new();
    range.insert("Precio".into(), ColumnFilter::range(150.0, 250.0));
    let filtered = apply_filters(&df, &range).unwrap();
    assert_eq!(filtered.height(), 1);
    assert_eq!(filtered.column("Precio").unwrap().i64().unwrap().get(0), Some(200));

    let mut text = FilterSet::new();
    text.insert("Barrio".into(), ColumnFilter::text(["A"]));
    assert_eq!(apply_filters(&df, &text).unwrap().height(), 2);
}

#[test]
fn test_example_indicators_on_empty_table() {
    let df = common::create_sales_dataframe();
    let mut filters = FilterSet::new();
    filters.insert("Precio".into(), ColumnFilter::range(1.0, 2.0));
    let empty = apply_filters(&df, &filters).unwrap();

    let indicators = compute_indicators(&empty, "Precio").unwrap();
    assert_eq!(indicators.count, 0);
    assert_eq!(indicators.sum, 0.0);
    assert!(indicators.mean.is_no_data());
    assert!(indicators.median.is_no_data());
}

#[test]
fn test_dashboard_query_with_stratum_coloring() {
    let df = common::create_sales_dataframe();
    let query = DashboardQuery {
        columns: common::all_columns(&df),
        filters: default_filters(&df).unwrap(),
        indicator_column: Some("Area".into()),
        chart: Some(
            AggregationSpec::new("Tipo", "Precio")
                .with_kind(ReductionKind::Median)
                .with_secondary("Estrato")
                .with_sort(SortOrder::Ascending),
        ),
    };

    let view = compute(&df, &query).unwrap();
    assert_eq!(view.filtered.height(), 6);
    assert_eq!(view.numeric_columns, vec!["Precio", "Area", "Estrato"]);

    let grouped = view.grouped.unwrap();
    assert!(grouped.has_secondary());
    let rows = grouped.rows().unwrap();
    // Casa: 180M, 220M, 410M, 260M -> 240M; Apartamento: 350M, 150M -> 250M
    assert_eq!(rows[0].label, "Casa");
    assert_eq!(rows[0].value, Some(240_000_000.0));
    assert_eq!(rows[1].label, "Apartamento");
    assert_eq!(rows[1].value, Some(250_000_000.0));
    assert_eq!(rows[1].secondary, Some(4.0));
}

#[test]
fn test_nan_cells_agree_between_indicators_and_chart() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "nan.csv",
        "Barrio,Precio\nA,100\nA,NaN\nA,300\nB,NaN\n",
    );
    let df = load_table(&path).unwrap();

    let query = DashboardQuery {
        columns: common::all_columns(&df),
        filters: FilterSet::new(),
        indicator_column: Some("Precio".into()),
        chart: Some(AggregationSpec::new("Barrio", "Precio").with_kind(ReductionKind::Mean)),
    };
    let view = compute(&df, &query).unwrap();

    let indicators = view.indicators.unwrap();
    assert_eq!(indicators.sum, 400.0);
    assert_eq!(indicators.mean.value(), Some(200.0));

    let rows = view.grouped.unwrap().rows().unwrap();
    assert_eq!(rows[0].value, indicators.mean.value());
    assert_eq!(rows[1].value, None);
}
