//! Chart Plotter Module
//! Interactive grouped bar chart using egui_plot.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot};

use super::color::{bar_colors, color_for, secondary_range};
use crate::stats::{format_thousands, GroupRow, GroupedTable};

const BAR_WIDTH: f64 = 0.7;
const LEGEND_STEPS: usize = 6;

fn to_color32((r, g, b): (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Draws the dashboard chart.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Bar per group, X = group label, Y = reduced value.
    pub fn draw_bar_chart(ui: &mut egui::Ui, grouped: &GroupedTable, rows: &[GroupRow], height: f32) {
        let colors = bar_colors(rows, grouped.has_secondary());

        let bars: Vec<Bar> = rows
            .iter()
            .zip(colors)
            .enumerate()
            .map(|(i, (row, color))| {
                Bar::new(i as f64, row.value.unwrap_or(0.0))
                    .width(BAR_WIDTH)
                    .fill(to_color32(color))
                    .name(&row.label)
            })
            .collect();

        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let value_title = grouped.value_title();

        Plot::new("grouped_bar_chart")
            .height(height)
            .allow_scroll(false)
            .x_axis_label(grouped.spec.group_column.clone())
            .y_axis_label(value_title.clone())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(value_title));
            });

        if let (Some(secondary), Some((lo, hi))) =
            (&grouped.spec.secondary_column, secondary_range(rows))
        {
            Self::draw_scale_legend(ui, secondary, lo, hi);
        }
    }

    /// Horizontal swatches from the lowest to the highest secondary mean.
    fn draw_scale_legend(ui: &mut egui::Ui, column: &str, lo: f64, hi: f64) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{} (promedio):", column)).size(12.0));
            ui.label(RichText::new(format_thousands(lo, 2)).size(12.0));
            for step in 0..LEGEND_STEPS {
                let t = step as f64 / (LEGEND_STEPS - 1) as f64;
                let color = to_color32(color_for(lo + (hi - lo) * t, lo, hi));
                let (rect, _) = ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 3.0, color);
            }
            ui.label(RichText::new(format_thousands(hi, 2)).size(12.0));
        });
    }
}
