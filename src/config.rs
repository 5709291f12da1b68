//! Dashboard configuration: command line plus an optional JSON file.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::data::EXPORT_FILE_NAME;

/// Interactive real-estate sales dashboard.
#[derive(Parser, Debug, Default)]
#[command(name = "realty-dashboard", version, about)]
pub struct Cli {
    /// CSV file to explore (overrides the config file)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub export_file_name: String,
    pub chart_image_name: String,
    /// Rows of the filtered table shown in the preview grid.
    pub preview_rows: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("cucutaventacasas.csv"),
            export_file_name: EXPORT_FILE_NAME.to_string(),
            chart_image_name: "grafico.png".to_string(),
            preview_rows: 200,
            chart_width: 1200,
            chart_height: 700,
            window_width: 1400.0,
            window_height: 850.0,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Build the effective configuration from the command line.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(data) = &cli.data {
            config.data_path = data.clone();
        }
        Ok(config)
    }
}
