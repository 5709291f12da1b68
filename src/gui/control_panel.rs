//! Control Panel Widget
//! Left side panel: data source, visible columns, filters, KPI and chart selectors.

use std::collections::{BTreeMap, BTreeSet};

use egui::{Color32, ComboBox, RichText, ScrollArea};
use polars::prelude::DataFrame;

use crate::dashboard::DashboardQuery;
use crate::data::{column_names, default_filters, numeric_columns, ColumnFilter, FilterSet};
use crate::stats::{AggregationSpec, ReductionKind, SortOrder, MISSING_GROUP_LABEL};

const LABEL_WIDTH: f32 = 110.0;
const COMBO_WIDTH: f32 = 170.0;

/// KPI and chart selections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSettings {
    pub indicator_column: Option<String>,
    pub group_column: Option<String>,
    pub value_column: Option<String>,
    pub kind: ReductionKind,
    pub secondary_column: Option<String>,
    pub sort: SortOrder,
}

/// Left side control panel. Holds widget state only; every derived table is
/// recomputed from [`ControlPanel::query`].
#[derive(Default)]
pub struct ControlPanel {
    pub columns: Vec<String>,
    numeric: BTreeSet<String>,
    pub visible: Vec<bool>,
    pub filters: FilterSet,
    /// Choices offered by each text filter, captured when the filter was introduced.
    options: BTreeMap<String, Vec<String>>,
    /// Text filters whose column has missing values, offered as a "(vacío)" choice.
    with_missing: BTreeSet<String>,
    pub settings: ChartSettings,
    pub status: String,
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Reload,
    Changed,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            status: "Ready".to_string(),
            ..Default::default()
        }
    }

    /// Reset every control for a freshly loaded table: all columns visible,
    /// default (no-op) filters.
    pub fn set_table(&mut self, df: &DataFrame) {
        self.columns = column_names(df);
        self.numeric = numeric_columns(df).into_iter().collect();
        self.visible = vec![true; self.columns.len()];
        self.filters.clear();
        self.options.clear();
        self.with_missing.clear();
        self.settings = ChartSettings::default();

        match default_filters(df) {
            Ok(filters) => {
                for (column, filter) in filters {
                    self.introduce_filter(df, column, filter);
                }
            }
            Err(e) => log::warn!("Could not build default filters: {}", e),
        }
        self.sync_settings();
    }

    fn introduce_filter(&mut self, base: &DataFrame, column: String, filter: ColumnFilter) {
        if let ColumnFilter::Text { allowed, .. } = &filter {
            let mut choices: Vec<String> = allowed.iter().cloned().collect();
            choices.sort();
            self.options.insert(column.clone(), choices);
            if base.column(&column).is_ok_and(|c| c.null_count() > 0) {
                self.with_missing.insert(column.clone());
            }
        }
        self.filters.insert(column, filter);
    }

    /// Visible columns in table order.
    pub fn visible_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.visible)
            .filter(|(_, &shown)| shown)
            .map(|(col, _)| col.clone())
            .collect()
    }

    /// Visible numeric columns in table order.
    pub fn visible_numeric(&self) -> Vec<String> {
        self.visible_columns()
            .into_iter()
            .filter(|c| self.numeric.contains(c))
            .collect()
    }

    pub fn query(&self) -> DashboardQuery {
        let chart = match (&self.settings.group_column, &self.settings.value_column) {
            (Some(group), Some(value)) => Some(AggregationSpec {
                group_column: group.clone(),
                value_column: value.clone(),
                kind: self.settings.kind,
                secondary_column: self.settings.secondary_column.clone(),
                sort: self.settings.sort,
            }),
            _ => None,
        };

        DashboardQuery {
            columns: self.visible_columns(),
            filters: self.filters.clone(),
            indicator_column: self.settings.indicator_column.clone(),
            chart,
        }
    }

    /// Drop filters of hidden columns and default the filters of newly
    /// visible ones from `base`.
    fn sync_filters(&mut self, base: &DataFrame) {
        let visible: BTreeSet<String> = self.visible_columns().into_iter().collect();
        self.filters.retain(|col, _| visible.contains(col));
        self.options.retain(|col, _| visible.contains(col));
        self.with_missing.retain(|col| visible.contains(col));

        for column in visible {
            if self.filters.contains_key(&column) {
                continue;
            }
            match ColumnFilter::default_for(base, &column) {
                Ok(Some(filter)) => self.introduce_filter(base, column, filter),
                Ok(None) => {}
                Err(e) => log::warn!("No default filter for '{}': {}", column, e),
            }
        }
    }

    /// Keep KPI and chart selections pointing at visible columns.
    fn sync_settings(&mut self) {
        let visible = self.visible_columns();
        let numeric = self.visible_numeric();
        let s = &mut self.settings;

        let keep = |choice: &mut Option<String>, allowed: &[String], fallback: bool| {
            if choice.as_ref().is_some_and(|c| !allowed.contains(c)) {
                *choice = None;
            }
            if choice.is_none() && fallback {
                *choice = allowed.first().cloned();
            }
        };

        keep(&mut s.indicator_column, &numeric, true);
        keep(&mut s.group_column, &visible, true);
        keep(&mut s.value_column, &numeric, true);
        keep(&mut s.secondary_column, &numeric, false);
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, base: Option<&DataFrame>) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("⚙️ Configuración")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(8.0);
        ui.separator();

        // ===== Data Source =====
        ui.horizontal(|ui| {
            if ui.button("📂 Abrir CSV").clicked() {
                action = ControlPanelAction::BrowseCsv;
            }
            if ui.button("🔄 Recargar").clicked() {
                action = ControlPanelAction::Reload;
            }
        });
        ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));

        let Some(base) = base else {
            return action;
        };

        ui.add_space(10.0);
        ui.separator();

        // ===== Visible Columns =====
        ui.label(RichText::new("📋 Columnas visibles").size(14.0).strong());
        let mut columns_changed = false;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("visible_columns")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for (i, col) in self.columns.iter().enumerate() {
                            if i < self.visible.len() && ui.checkbox(&mut self.visible[i], col.as_str()).changed() {
                                columns_changed = true;
                            }
                        }
                    });
            });
        ui.horizontal(|ui| {
            if ui.small_button("Todas").clicked() {
                self.visible.iter_mut().for_each(|v| *v = true);
                columns_changed = true;
            }
            if ui.small_button("Ninguna").clicked() {
                self.visible.iter_mut().for_each(|v| *v = false);
                columns_changed = true;
            }
        });

        if columns_changed {
            self.sync_filters(base);
            self.sync_settings();
            action = ControlPanelAction::Changed;
        }

        ui.add_space(10.0);
        ui.separator();

        // ===== Filters =====
        ui.label(RichText::new("🔎 Filtros").size(14.0).strong());
        if self.filters_ui(ui) {
            action = ControlPanelAction::Changed;
        }

        ui.add_space(10.0);
        ui.separator();

        // ===== KPI and Chart =====
        ui.label(RichText::new("📈 Indicadores y gráfico").size(14.0).strong());
        ui.add_space(5.0);
        if self.chart_settings_ui(ui) {
            action = ControlPanelAction::Changed;
        }

        action
    }

    fn filters_ui(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        for column in self.visible_columns() {
            let Some(filter) = self.filters.get_mut(&column) else {
                continue;
            };

            match filter {
                ColumnFilter::Text {
                    allowed,
                    include_missing,
                } => {
                    let choices = self.options.get(&column).map(Vec::as_slice).unwrap_or(&[]);
                    let has_missing = self.with_missing.contains(&column);
                    let header = format!(
                        "{} ({}/{})",
                        column,
                        allowed.len() + usize::from(has_missing && *include_missing),
                        choices.len() + usize::from(has_missing)
                    );
                    egui::CollapsingHeader::new(header)
                        .id_salt(format!("filter_{}", column))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                if ui.small_button("Todos").clicked() {
                                    allowed.extend(choices.iter().cloned());
                                    *include_missing = has_missing;
                                    changed = true;
                                }
                                if ui.small_button("Ninguno").clicked() {
                                    allowed.clear();
                                    *include_missing = false;
                                    changed = true;
                                }
                            });
                            ScrollArea::vertical()
                                .id_salt(format!("filter_values_{}", column))
                                .max_height(150.0)
                                .show(ui, |ui| {
                                    if has_missing {
                                        changed |= ui
                                            .checkbox(include_missing, MISSING_GROUP_LABEL)
                                            .changed();
                                    }
                                    for choice in choices {
                                        let mut checked = allowed.contains(choice);
                                        if ui.checkbox(&mut checked, choice.as_str()).changed() {
                                            if checked {
                                                allowed.insert(choice.clone());
                                            } else {
                                                allowed.remove(choice);
                                            }
                                            changed = true;
                                        }
                                    }
                                });
                        });
                }
                ColumnFilter::Range { min, max } => {
                    ui.label(RichText::new(&column).strong());
                    ui.horizontal(|ui| {
                        changed |= ui
                            .add(egui::DragValue::new(min).speed(1.0).prefix("mínimo: "))
                            .changed();
                        changed |= ui
                            .add(egui::DragValue::new(max).speed(1.0).prefix("máximo: "))
                            .changed();
                    });
                    if *min > *max {
                        ui.label(
                            RichText::new("Rango vacío: mínimo > máximo")
                                .size(11.0)
                                .color(Color32::from_rgb(220, 53, 69)),
                        );
                    }
                }
            }
        }

        changed
    }

    fn chart_settings_ui(&mut self, ui: &mut egui::Ui) -> bool {
        let visible = self.visible_columns();
        let numeric = self.visible_numeric();

        if numeric.is_empty() {
            ui.label(
                RichText::new("No hay columnas numéricas disponibles para KPIs.")
                    .color(Color32::from_rgb(255, 193, 7)),
            );
            return false;
        }

        let s = &mut self.settings;
        let mut changed = false;

        changed |= column_combo(ui, "indicator_col", "Métrica KPI:", &mut s.indicator_column, &numeric, false);
        ui.add_space(5.0);
        changed |= column_combo(ui, "group_col", "Eje X (categoría):", &mut s.group_column, &visible, false);
        changed |= column_combo(ui, "value_col", "Eje Y (métrica):", &mut s.value_column, &numeric, false);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Tipo de cálculo:"));
            ComboBox::from_id_salt("reduction_kind")
                .width(COMBO_WIDTH)
                .selected_text(s.kind.label())
                .show_ui(ui, |ui| {
                    for kind in ReductionKind::ALL {
                        changed |= ui.selectable_value(&mut s.kind, kind, kind.label()).changed();
                    }
                });
        });

        changed |= column_combo(ui, "secondary_col", "Color por:", &mut s.secondary_column, &numeric, true);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Orden:"));
            ComboBox::from_id_salt("sort_order")
                .width(COMBO_WIDTH)
                .selected_text(s.sort.label())
                .show_ui(ui, |ui| {
                    for sort in SortOrder::ALL {
                        changed |= ui.selectable_value(&mut s.sort, sort, sort.label()).changed();
                    }
                });
        });

        changed
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Labelled column picker. `optional` adds a "(ninguna)" entry.
fn column_combo(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    selected: &mut Option<String>,
    choices: &[String],
    optional: bool,
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(label));
        ComboBox::from_id_salt(id)
            .width(COMBO_WIDTH)
            .selected_text(selected.as_deref().unwrap_or("(ninguna)"))
            .show_ui(ui, |ui| {
                if optional && ui.selectable_label(selected.is_none(), "(ninguna)").clicked() {
                    *selected = None;
                    changed = true;
                }
                for col in choices {
                    if ui
                        .selectable_label(selected.as_deref() == Some(col.as_str()), col.as_str())
                        .clicked()
                    {
                        *selected = Some(col.clone());
                        changed = true;
                    }
                }
            });
    });
    changed
}
