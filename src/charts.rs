//! Exploratory charts rendered as SVG files with `plotters`.

use anyhow::Result;
use chrono::NaiveDate;
use plotters::coord::types::RangedDate;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analyzers::classify::WeatherType;
use crate::analyzers::types::{CorrelationMatrix, DailyCount, DailyMean, Exploration, WeatherCount};
use crate::analyzers::utility::HistogramBin;
use crate::observation::{Column, Dataset};

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
const TAB_GREEN: RGBColor = RGBColor(44, 160, 44);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const NO_DATA: RGBColor = RGBColor(200, 200, 200);

const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

const FONT: &str = "sans-serif";

/// Renders all seven charts into `dir` and returns the written paths.
///
/// Nothing is drawn for an empty dataset.
#[tracing::instrument(skip(dataset, exploration, dir), fields(dir = %dir.display()))]
pub fn render_all(dataset: &Dataset, exploration: &Exploration, dir: &Path) -> Result<Vec<PathBuf>> {
    if dataset.is_empty() {
        warn!("Dataset is empty, skipping charts");
        return Ok(Vec::new());
    }
    fs::create_dir_all(dir)?;

    let path = |name: &str| dir.join(name);
    let written = vec![
        temperature_histogram(&path("temperature_histogram.svg"), &exploration.temperature_histogram)?,
        weather_type_counts(&path("weather_type_counts.svg"), &exploration.weather_counts)?,
        daily_temperature(&path("daily_temperature.svg"), &exploration.daily_temperature)?,
        daily_humidity_precipitation(
            &path("daily_humidity_precipitation.svg"),
            &exploration.daily_humidity,
            &exploration.daily_precipitation,
        )?,
        temperature_vs_humidity(&path("temperature_vs_humidity.svg"), dataset)?,
        correlation_heatmap(&path("correlation_heatmap.svg"), &exploration.correlation)?,
        temperature_by_weather_type(&path("temperature_by_weather_type.svg"), dataset)?,
    ];

    info!(charts = written.len(), "Charts rendered");
    Ok(written)
}

/// Padded `(start, end)` covering every value; `(0, 1)` when there are none.
fn value_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    let pad = if (hi - lo).abs() > 1e-9 { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

/// First and last date of a daily series, widened to at least one day.
fn date_range(dates: impl IntoIterator<Item = NaiveDate>) -> Option<RangedDate<NaiveDate>> {
    let mut dates = dates.into_iter();
    let first = dates.next()?;
    let last = dates.last().unwrap_or(first);
    let last = if last > first { last } else { first.succ_opt()? };
    Some(RangedDate::from(first..last))
}

/// Splits a daily series into runs of consecutive defined values.
///
/// Days without data end a run, so line charts show a gap there.
pub fn contiguous_runs(series: &[DailyMean]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in series {
        match point.mean {
            Some(v) => current.push((point.date, v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> RGBColor {
    let mix = |x: f64, y: f64| (x + (y - x) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Diverging blue-white-red colour for a correlation in `[-1, 1]`.
pub fn coolwarm(r: f64) -> RGBColor {
    let r = r.clamp(-1.0, 1.0);
    if r < 0.0 {
        lerp(NEUTRAL, COOL, -r)
    } else {
        lerp(NEUTRAL, WARM, r)
    }
}

fn segment_label(names: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) => names.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn temperature_histogram(path: &Path, bins: &[HistogramBin]) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_start = bins.first().map_or(0.0, |b| b.lower);
    let x_end = bins.last().map_or(1.0, |b| b.upper);
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Average Temperatures", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_start..x_end, 0f64..y_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Temperature (°C)")
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], SKY_BLUE.filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
    }))?;

    root.present()?;
    Ok(path.to_path_buf())
}

fn weather_type_counts(path: &Path, counts: &[WeatherCount]) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (700, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<String> = counts.iter().map(|c| c.weather_type.to_string()).collect();
    let last = counts.len().saturating_sub(1);
    let y_max = counts.iter().map(|c| c.count).max().unwrap_or(0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Frequency of Weather Conditions", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0usize..last).into_segmented(), 0usize..y_max + y_max / 20 + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Weather Type")
        .y_desc("Number of Records")
        .x_label_formatter(&|v| segment_label(&names, v))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(LIGHT_CORAL.filled())
            .margin(10)
            .data(counts.iter().enumerate().map(|(i, c)| (i, c.count))),
    )?;

    root.present()?;
    Ok(path.to_path_buf())
}

fn daily_temperature(path: &Path, daily: &[DailyMean]) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (1200, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let dates = date_range(daily.iter().map(|d| d.date))
        .ok_or_else(|| anyhow::anyhow!("no daily temperatures to plot"))?;
    let (y_start, y_end) = value_range(daily.iter().filter_map(|d| d.mean));

    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Average Temperature Over Time", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(dates, y_start..y_end)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Temperature (°C)")
        .draw()?;

    for run in contiguous_runs(daily) {
        chart.draw_series(LineSeries::new(run, ORANGE.stroke_width(2)))?;
    }

    root.present()?;
    Ok(path.to_path_buf())
}

fn daily_humidity_precipitation(
    path: &Path,
    humidity: &[DailyMean],
    precipitation: &[DailyCount],
) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let dates = date_range(humidity.iter().map(|d| d.date))
        .ok_or_else(|| anyhow::anyhow!("no daily humidity to plot"))?;
    let secondary_dates = date_range(precipitation.iter().map(|d| d.date))
        .ok_or_else(|| anyhow::anyhow!("no daily precipitation to plot"))?;
    let (h_start, h_end) = value_range(humidity.iter().filter_map(|d| d.mean));
    let (_, p_end) = value_range(precipitation.iter().map(|d| d.count as f64));

    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Humidity and Precipitation Over Time", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(dates, h_start..h_end)?
        .set_secondary_coord(secondary_dates, 0f64..p_end.max(1.0));

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Humidity")
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Precipitation Count")
        .draw()?;

    for run in contiguous_runs(humidity) {
        chart.draw_series(LineSeries::new(run, TAB_BLUE.stroke_width(2)))?;
    }
    chart.draw_secondary_series(LineSeries::new(
        precipitation.iter().map(|d| (d.date, d.count as f64)),
        TAB_GREEN.stroke_width(2),
    ))?;

    root.present()?;
    Ok(path.to_path_buf())
}

fn temperature_vs_humidity(path: &Path, dataset: &Dataset) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let temps = dataset.column(Column::Temperature);
    let humidity = dataset.column(Column::Humidity);
    let (x_start, x_end) = value_range(temps.iter().copied());
    let (y_start, y_end) = value_range(humidity.iter().copied());

    let mut chart = ChartBuilder::on(&root)
        .caption("Temperature vs. Humidity", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_start..x_end, y_start..y_end)?;

    chart
        .configure_mesh()
        .x_desc("Temperature (°C)")
        .y_desc("Humidity")
        .draw()?;

    chart.draw_series(
        temps
            .iter()
            .zip(&humidity)
            .map(|(&t, &h)| Circle::new((t, h), 3, PURPLE.mix(0.5).filled())),
    )?;

    root.present()?;
    Ok(path.to_path_buf())
}

fn correlation_heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (650, 550)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = matrix.columns.len();
    let names: Vec<&str> = matrix.columns.iter().map(|c| c.label()).collect();
    let extent = n as f64 - 0.5;

    // row 0 is drawn at the top
    let row_y = |row: usize| (n - 1 - row) as f64;
    let label_at = |v: f64, flip: bool| {
        let idx = v.round();
        if (v - idx).abs() > 1e-6 || idx < 0.0 || idx as usize >= n {
            return String::new();
        }
        let idx = idx as usize;
        names[if flip { n - 1 - idx } else { idx }].to_string()
    };

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Heatmap", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(130)
        .build_cartesian_2d(-0.5f64..extent, -0.5f64..extent)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|v| label_at(*v, false))
        .y_label_formatter(&|v| label_at(*v, true))
        .draw()?;

    let cells: Vec<(usize, usize, Option<f64>)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| (i, j, matrix.get(i, j)))
        .collect();

    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        let x = j as f64;
        let y = row_y(i);
        let color = r.map_or(NO_DATA, coolwarm);
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
    }))?;

    let centered = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        let text = r.map_or_else(|| "NaN".to_string(), |r| format!("{r:.2}"));
        Text::new(text, (j as f64, row_y(i)), centered.clone())
    }))?;

    root.present()?;
    Ok(path.to_path_buf())
}

fn temperature_by_weather_type(path: &Path, dataset: &Dataset) -> Result<PathBuf> {
    let root = SVGBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let groups: Vec<(WeatherType, Vec<f64>)> = WeatherType::alphabetical()
        .into_iter()
        .map(|t| (t, dataset.column_where(Column::Temperature, t)))
        .filter(|(_, temps)| !temps.is_empty())
        .collect();
    let names: Vec<String> = groups.iter().map(|(t, _)| t.to_string()).collect();
    let quartiles: Vec<Quartiles> = groups.iter().map(|(_, temps)| Quartiles::new(temps.as_slice())).collect();

    let (lo, hi) = value_range(groups.iter().flat_map(|(_, temps)| temps.iter().copied()));
    let last = groups.len().saturating_sub(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Temperature by Weather Type", (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0usize..last).into_segmented(), lo as f32..hi as f32)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Weather Type")
        .y_desc("Temperature (°C)")
        .x_label_formatter(&|v| segment_label(&names, v))
        .draw()?;

    chart.draw_series(
        quartiles
            .iter()
            .enumerate()
            .map(|(i, q)| Boxplot::new_vertical(SegmentValue::CenterOf(i), q).width(30)),
    )?;

    root.present()?;
    Ok(path.to_path_buf())
}
