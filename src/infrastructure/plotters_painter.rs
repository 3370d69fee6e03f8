// Plotters chart painter - Draws the stage-1 raster in black on white
use crate::application::chart_layout::{
    format_tick, format_value, label_capacity, label_precision, nice_step, time_axis_range,
    time_ticks, value_axis_range, value_ticks,
};
use crate::application::chart_renderer::{ChartPainter, plottable_series};
use crate::domain::chart::{CanvasSize, LineStyle};
use crate::domain::error::RenderError;
use crate::domain::series::SeriesDataSet;
use crate::infrastructure::config::RenderConfig;
use crate::infrastructure::raster::crop_to_content;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;

const FONT: &str = "sans-serif";
const TITLE_FONT_SIZE: u32 = 16;
const AXIS_DESC_FONT_SIZE: u32 = 12;
const LABEL_FONT_SIZE: u32 = 10;
const SERIES_STROKE_WIDTH: u32 = 2;
const CROP_MARGIN_PX: u32 = 4;
const Y_TICK_TARGET: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersPainter;

impl ChartPainter for PlottersPainter {
    fn paint(
        &self,
        data: &SeriesDataSet,
        config: &RenderConfig,
        canvas: CanvasSize,
        target: &Path,
    ) -> Result<(), RenderError> {
        draw_chart(data, config, canvas, target).map_err(|e| RenderError::Draw(e.to_string()))?;
        crop_to_content(target, CROP_MARGIN_PX)
    }
}

/// Backend-space start and end of the two legend strokes for a line style.
fn legend_segments(style: LineStyle) -> ((i32, i32), (i32, i32)) {
    match style.dash_pattern() {
        None => ((0, 10), (10, 20)),
        Some((dash, gap)) => {
            let (dash, gap) = (dash as i32, gap as i32);
            ((0, dash), (dash + gap, 2 * dash + gap))
        }
    }
}

fn draw_chart(
    data: &SeriesDataSet,
    config: &RenderConfig,
    canvas: CanvasSize,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, end) = data.time_bounds().ok_or("no data points to draw")?;
    let (value_min, value_max) = data.value_bounds().ok_or("no data points to draw")?;

    let (x_start, x_end) = time_axis_range(start, end);
    let (y_lo, y_hi) = value_axis_range(value_min, value_max);
    let interval_secs = i64::from(config.tick_interval_minutes) * 60;
    let x_ticks = time_ticks(x_start, x_end, interval_secs, label_capacity(canvas.width));
    let y_ticks = value_ticks(y_lo, y_hi, Y_TICK_TARGET);
    // Plotters picks its own y label step, never finer than this one.
    let y_precision = label_precision(nice_step(y_hi - y_lo, Y_TICK_TARGET));

    let root = BitMapBackend::new(target, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            &config.title,
            (FONT, TITLE_FONT_SIZE).into_font().color(&BLACK),
        )
        .margin(8)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(
            (x_start..x_end).with_key_points(x_ticks.clone()),
            y_lo..y_hi,
        )?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_ticks.len().max(1))
        .y_labels(Y_TICK_TARGET)
        .x_label_formatter(&|ts| format_tick(*ts))
        .y_label_formatter(&|v| format_value(*v, y_precision))
        .x_desc(config.x_axis_label.as_str())
        .y_desc(config.y_axis_label.as_str())
        .axis_style(BLACK)
        .label_style((FONT, LABEL_FONT_SIZE).into_font().color(&BLACK))
        .axis_desc_style((FONT, AXIS_DESC_FONT_SIZE).into_font().color(&BLACK))
        .draw()?;

    // Dotted grid at the labelled ticks only.
    let grid = BLACK.stroke_width(1);
    for &t in &x_ticks {
        chart.draw_series(DashedLineSeries::new(vec![(t, y_lo), (t, y_hi)], 1, 3, grid))?;
    }
    for &v in &y_ticks {
        chart.draw_series(DashedLineSeries::new(
            vec![(x_start, v), (x_end, v)],
            1,
            3,
            grid,
        ))?;
    }

    let stroke = BLACK.stroke_width(SERIES_STROKE_WIDTH);
    for series in plottable_series(data, config) {
        let coords: Vec<(i64, f64)> = series
            .points
            .iter()
            .map(|p| (p.timestamp.timestamp(), p.value))
            .collect();

        let anno = match series.style.dash_pattern() {
            None => chart.draw_series(LineSeries::new(coords, stroke))?,
            Some((dash, gap)) => {
                chart.draw_series(DashedLineSeries::new(coords, dash, gap, stroke))?
            }
        };

        let (first, second) = legend_segments(series.style);
        anno.label(series.name).legend(move |(x, y)| {
            EmptyElement::at((x, y))
                + PathElement::new(vec![(first.0, 0), (first.1, 0)], stroke)
                + PathElement::new(vec![(second.0, 0), (second.1, 0)], stroke)
        });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, LABEL_FONT_SIZE).into_font().color(&BLACK))
        .background_style(WHITE)
        .border_style(WHITE)
        .draw()?;

    root.present()?;
    Ok(())
}
