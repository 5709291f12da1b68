//! Static Chart Renderer
//! Renders the grouped bar chart to a PNG image with plotters.
//!
//! Layout:
//! 1. Caption: "{reduction} de {value} por {group}"
//! 2. Bars colored by the secondary mean when one is charted
//! 3. Group labels under each bar

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use super::color::bar_colors;
use crate::stats::{GroupedTable, StatsError};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No groups to chart")]
    NoData,
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("Failed to write chart image: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Y axis bounds that always include zero, padded above the tallest bar.
fn value_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);
    if lo == hi {
        return (0.0, 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad)
}

/// Render `grouped` as a `width` x `height` PNG.
pub fn render_bar_chart_png(
    grouped: &GroupedTable,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, RenderError> {
    if grouped.is_empty() {
        return Err(RenderError::NoData);
    }
    if width == 0 || height == 0 {
        return Err(RenderError::Draw(format!(
            "invalid chart size {}x{}",
            width, height
        )));
    }

    let rows = grouped.rows()?;
    let values: Vec<f64> = rows.iter().map(|r| r.value.unwrap_or(0.0)).collect();
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let colors = bar_colors(&rows, grouped.has_secondary());
    let (y_min, y_max) = value_range(&values);

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let caption = format!(
            "{} por {}",
            grouped.value_title(),
            grouped.spec.group_column
        );
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d((0..rows.len()).into_segmented(), y_min..y_max)
            .map_err(draw_err)?;

        let x_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&x_label)
            .x_desc(grouped.spec.group_column.as_str())
            .y_desc(grouped.value_title())
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(values.iter().zip(&colors).enumerate().map(|(i, (&v, &(r, g, b)))| {
                Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                    RGBColor(r, g, b).filled(),
                )
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    let image = RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| RenderError::Draw("chart buffer size mismatch".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Render the chart and write it to `path`.
pub fn save_bar_chart_png(
    grouped: &GroupedTable,
    width: u32,
    height: u32,
    path: &Path,
) -> Result<(), RenderError> {
    let png = render_bar_chart_png(grouped, width, height)?;
    std::fs::write(path, &png)?;
    log::info!("Saved chart image to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{aggregate, AggregationSpec};
    use polars::prelude::*;

    #[test]
    fn empty_groups_cannot_be_rendered() {
        let df = df! {
            "Barrio" => Vec::<String>::new(),
            "Precio" => Vec::<f64>::new(),
        }
        .unwrap();
        let grouped = aggregate(&df, &AggregationSpec::new("Barrio", "Precio")).unwrap();
        assert!(matches!(
            render_bar_chart_png(&grouped, 400, 300),
            Err(RenderError::NoData)
        ));
    }

    #[test]
    fn zero_sized_chart_is_rejected() {
        let df = df! {
            "Barrio" => ["A"],
            "Precio" => [100.0f64],
        }
        .unwrap();
        let grouped = aggregate(&df, &AggregationSpec::new("Barrio", "Precio")).unwrap();
        for (width, height) in [(0, 300), (400, 0)] {
            assert!(matches!(
                render_bar_chart_png(&grouped, width, height),
                Err(RenderError::Draw(_))
            ));
        }
    }

    #[test]
    fn value_range_includes_zero() {
        assert_eq!(value_range(&[0.0, 0.0]), (0.0, 1.0));
        let (lo, hi) = value_range(&[100.0, 300.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 300.0);
        let (lo, hi) = value_range(&[-50.0, 50.0]);
        assert!(lo < -50.0 && hi > 50.0);
    }
}
