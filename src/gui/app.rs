//! Dashboard Main Application
//! Main window with control panel and dashboard view.

use crate::charts::save_bar_chart_png;
use crate::config::DashboardConfig;
use crate::dashboard::{compute, DashboardError};
use crate::data::{write_export, TableCache};
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: TableCache,
    data_path: PathBuf,
    base: Option<Arc<DataFrame>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            data_path: config.data_path.clone(),
            chart_viewer: ChartViewer::new(config.preview_rows),
            config,
            cache: TableCache::new(),
            base: None,
            control_panel: ControlPanel::new(),
        };
        app.load_data();
        app
    }

    /// Fetch the table for `data_path` from the cache and reset the controls
    /// if it is a different table than the one shown.
    fn load_data(&mut self) {
        match self.cache.get_or_load(&self.data_path) {
            Ok(table) => {
                let unchanged = self
                    .base
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &table));
                if !unchanged {
                    self.control_panel.set_table(&table);
                }
                self.control_panel.set_status(&format!(
                    "{}: {} filas, {} columnas",
                    self.data_path.display(),
                    table.height(),
                    table.width()
                ));
                self.base = Some(table);
                self.recompute();
            }
            Err(e) => {
                log::error!("Failed to load data: {}", e);
                self.base = None;
                self.control_panel.set_status("Error al cargar datos");
                self.chart_viewer
                    .set_error(format!("No se pudieron cargar los datos. {}", e));
            }
        }
    }

    /// Re-run the pipeline for the current selections.
    fn recompute(&mut self) {
        let Some(base) = &self.base else {
            return;
        };

        match compute(base, &self.control_panel.query()) {
            Ok(view) => self.chart_viewer.set_view(view),
            Err(e) => {
                log::warn!("Dashboard update failed: {}", e);
                self.chart_viewer.set_error(e.to_string());
            }
        }
    }

    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.data_path = path;
            self.load_data();
        }
    }

    fn handle_export_csv(&mut self) {
        let Some(view) = self.chart_viewer.view() else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(&self.config.export_file_name)
            .save_file()
        else {
            return;
        };

        let result = write_export(&view.filtered, &path).map_err(DashboardError::from);
        self.report_export(result, &path, "Datos exportados");
    }

    fn handle_export_chart(&mut self) {
        let Some(grouped) = self.chart_viewer.view().and_then(|v| v.grouped.as_ref()) else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(&self.config.chart_image_name)
            .save_file()
        else {
            return;
        };

        let result = save_bar_chart_png(
            grouped,
            self.config.chart_width,
            self.config.chart_height,
            &path,
        );
        self.report_export(result, &path, "Gráfico exportado");
    }

    fn report_export<E: std::fmt::Display>(&mut self, result: Result<(), E>, path: &Path, done: &str) {
        match result {
            Ok(()) => self
                .control_panel
                .set_status(&format!("{}: {}", done, path.display())),
            Err(e) => {
                log::error!("Export to {} failed: {}", path.display(), e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, self.base.as_deref());

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => self.load_data(),
                        ControlPanelAction::Changed => self.recompute(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.chart_viewer.show(ui) {
                ChartViewerAction::ExportCsv => self.handle_export_csv(),
                ChartViewerAction::ExportChart => self.handle_export_chart(),
                ChartViewerAction::None => {}
            }
        });
    }
}
