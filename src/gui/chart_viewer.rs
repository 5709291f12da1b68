//! Chart Viewer Widget
//! Central panel: KPI cards, grouped bar chart, filtered table preview and downloads.

use egui::{Color32, RichText, ScrollArea};
use polars::prelude::{AnyValue, DataFrame};

use crate::charts::ChartPlotter;
use crate::dashboard::DashboardView;
use crate::stats::{format_thousands, GroupRow, Indicators};

const CHART_HEIGHT: f32 = 380.0;
const TABLE_HEIGHT: f32 = 320.0;
const CARD_WIDTH: f32 = 200.0;

/// Actions triggered from the central panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    ExportCsv,
    ExportChart,
}

/// Displays the latest [`DashboardView`].
#[derive(Default)]
pub struct ChartViewer {
    view: Option<DashboardView>,
    rows: Vec<GroupRow>,
    error: Option<String>,
    preview_rows: usize,
}

fn cell_text(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

impl ChartViewer {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            preview_rows,
            ..Default::default()
        }
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.rows = match view.grouped.as_ref().map(|g| g.rows()) {
            Some(Ok(rows)) => rows,
            Some(Err(e)) => {
                log::warn!("Could not read grouped rows: {}", e);
                Vec::new()
            }
            None => Vec::new(),
        };
        self.view = Some(view);
        self.error = None;
    }

    /// Show `message` in place of the dashboard.
    pub fn set_error(&mut self, message: String) {
        self.view = None;
        self.rows.clear();
        self.error = Some(message);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        ui.label(RichText::new("📊 Dashboard Inmobiliario Interactivo").size(24.0).strong());
        ui.add_space(8.0);

        if let Some(error) = &self.error {
            egui::Frame::none()
                .rounding(8.0)
                .stroke(egui::Stroke::new(2.0, Color32::from_rgb(220, 53, 69)))
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("⚠ {}", error))
                            .size(15.0)
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                });
            return action;
        }

        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return action;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                // ===== Indicators =====
                ui.label(RichText::new("📌 Indicadores").size(18.0).strong());
                ui.add_space(5.0);
                match &view.indicators {
                    Some(indicators) => Self::draw_indicators(ui, indicators),
                    None => {
                        ui.label(
                            RichText::new("No hay columnas numéricas disponibles para KPIs.")
                                .color(Color32::from_rgb(255, 193, 7)),
                        );
                    }
                }

                ui.add_space(15.0);
                ui.separator();

                // ===== Chart =====
                ui.label(RichText::new("📈 Visualización Dinámica").size(18.0).strong());
                ui.add_space(5.0);
                if let Some(grouped) = &view.grouped {
                    if grouped.is_empty() {
                        ui.label(RichText::new("Sin datos para graficar").color(Color32::GRAY));
                    } else {
                        ChartPlotter::draw_bar_chart(ui, grouped, &self.rows, CHART_HEIGHT);
                        if ui.button("🖼 Descargar gráfico").clicked() {
                            action = ChartViewerAction::ExportChart;
                        }
                    }
                }

                ui.add_space(15.0);
                ui.separator();

                // ===== Filtered Table =====
                ui.label(RichText::new("📋 Datos Filtrados").size(18.0).strong());
                ui.label(
                    RichText::new(format!(
                        "{} registros",
                        format_thousands(view.filtered.height() as f64, 0)
                    ))
                    .size(12.0)
                    .color(Color32::GRAY),
                );
                ui.add_space(5.0);
                Self::draw_table(ui, &view.filtered, self.preview_rows);

                ui.add_space(10.0);
                if ui.button("⬇ Descargar datos filtrados").clicked() {
                    action = ChartViewerAction::ExportCsv;
                }
            });

        action
    }

    fn draw_indicators(ui: &mut egui::Ui, indicators: &Indicators) {
        let cards = [
            ("Total registros", format_thousands(indicators.count as f64, 0)),
            ("Suma", format_thousands(indicators.sum, 0)),
            ("Promedio", indicators.mean.to_string()),
            ("Mediana", indicators.median.to_string()),
        ];

        ui.label(RichText::new(format!("Métrica: {}", indicators.column)).size(12.0).color(Color32::GRAY));
        ui.horizontal_wrapped(|ui| {
            for (title, value) in cards {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.set_width(CARD_WIDTH);
                        ui.vertical(|ui| {
                            ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(value).size(22.0).strong());
                        });
                    });
                ui.add_space(8.0);
            }
        });
    }

    /// Grid of the first `limit` rows.
    fn draw_table(ui: &mut egui::Ui, df: &DataFrame, limit: usize) {
        let shown = df.height().min(limit);
        ScrollArea::both()
            .id_salt("filtered_table")
            .max_height(TABLE_HEIGHT)
            .show(ui, |ui| {
                egui::Grid::new("filtered_table_grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for column in df.get_columns() {
                            ui.label(RichText::new(column.name().as_str()).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in 0..shown {
                            for column in df.get_columns() {
                                let text = column.get(row).map(cell_text).unwrap_or_default();
                                ui.label(RichText::new(text).size(12.0));
                            }
                            ui.end_row();
                        }
                    });
            });

        if df.height() > shown {
            ui.label(
                RichText::new(format!("Mostrando {} de {} filas", shown, df.height()))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
    }
}
