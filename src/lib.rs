//! Realty Dashboard - interactive exploration of real-estate sales data.
//!
//! The pipeline (select columns, filter, summarize, group) lives in
//! [`data`], [`stats`] and [`dashboard`] as plain functions over polars
//! DataFrames; [`gui`] is an eframe front end that drives it.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod stats;
