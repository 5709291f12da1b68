//! Realty Dashboard - interactive real-estate sales dashboard.

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use realty_dashboard::config::{Cli, DashboardConfig};
use realty_dashboard::gui::DashboardApp;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_cli(&cli)?;
    log::info!("Starting dashboard for {}", config.data_path.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Dashboard Inmobiliario"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Dashboard Inmobiliario",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard window failed: {}", e))
}
