use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzers::classify::WeatherType;
use crate::analyzers::types::{
    ColumnSummary, CorrelationMatrix, DailyCount, DailyMean, Exploration, Extremum, KeyFindings,
    RainComparison, WeatherCount, WeatherTypeMean,
};
use crate::analyzers::utility::{argmax, argmin, histogram, max, mean, median, min, pearson};
use crate::observation::{Column, Dataset, Observation};

/// Number of temperature histogram buckets unless configured otherwise.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Mean, median, max and min for each of `columns`.
pub fn summary_statistics(dataset: &Dataset, columns: &[Column]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .map(|&column| {
            let values = dataset.column(column);
            ColumnSummary {
                column,
                mean: mean(&values),
                median: median(&values),
                max: max(&values),
                min: min(&values),
            }
        })
        .collect()
}

/// Observations per weather type, most frequent first.
///
/// Ties keep the order in which the types first appear.
pub fn weather_counts(dataset: &Dataset) -> Vec<WeatherCount> {
    let mut counts: Vec<WeatherCount> = Vec::new();
    for obs in dataset.observations() {
        match counts.iter_mut().find(|c| c.weather_type == obs.weather_type) {
            Some(entry) => entry.count += 1,
            None => counts.push(WeatherCount {
                weather_type: obs.weather_type,
                count: 1,
            }),
        }
    }
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Every calendar day from the first to the last observed day, inclusive.
fn day_span(dataset: &Dataset) -> Vec<NaiveDate> {
    let days = dataset.observations().iter().map(|o| o.timestamp.date_naive());
    let (Some(first), Some(last)) = (days.clone().min(), days.max()) else {
        return Vec::new();
    };
    first.iter_days().take_while(|d| *d <= last).collect()
}

fn group_by_day<'a>(dataset: &'a Dataset) -> BTreeMap<NaiveDate, Vec<&'a Observation>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Observation>> = BTreeMap::new();
    for obs in dataset.observations() {
        groups.entry(obs.timestamp.date_naive()).or_default().push(obs);
    }
    groups
}

/// Daily mean of `column`, with `None` for days that have no observations.
pub fn daily_mean(dataset: &Dataset, column: Column) -> Vec<DailyMean> {
    let groups = group_by_day(dataset);
    day_span(dataset)
        .into_iter()
        .map(|date| {
            let values: Vec<f64> = groups
                .get(&date)
                .map(|group| group.iter().map(|o| column.value(o)).collect())
                .unwrap_or_default();
            DailyMean {
                date,
                mean: mean(&values),
            }
        })
        .collect()
}

/// Daily count of records with a precipitation type.
pub fn daily_precipitation_count(dataset: &Dataset) -> Vec<DailyCount> {
    let groups = group_by_day(dataset);
    day_span(dataset)
        .into_iter()
        .map(|date| DailyCount {
            date,
            count: groups.get(&date).map_or(0, |group| {
                group.iter().filter(|o| !o.precip_type.is_empty()).count()
            }),
        })
        .collect()
}

/// Pairwise Pearson correlations between `columns`.
pub fn correlation_matrix(dataset: &Dataset, columns: &[Column]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = columns.iter().map(|&c| dataset.column(c)).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        values[i][i] = pearson(&series[i], &series[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

/// Correlation between two columns of the dataset.
pub fn column_correlation(dataset: &Dataset, a: Column, b: Column) -> Option<f64> {
    pearson(&dataset.column(a), &dataset.column(b))
}

fn extremum(dataset: &Dataset, index: Option<usize>) -> Result<Extremum> {
    let obs = index
        .and_then(|i| dataset.observations().get(i))
        .context("extremum of an empty temperature series")?;
    Ok(Extremum {
        timestamp: obs.timestamp,
        value: obs.temperature_c,
    })
}

/// Highest temperature reading; the earliest in source order wins ties.
///
/// # Errors
///
/// Fails on an empty dataset.
pub fn hottest(dataset: &Dataset) -> Result<Extremum> {
    extremum(dataset, argmax(&dataset.column(Column::Temperature)))
}

/// Lowest temperature reading; the earliest in source order wins ties.
///
/// # Errors
///
/// Fails on an empty dataset.
pub fn coldest(dataset: &Dataset) -> Result<Extremum> {
    extremum(dataset, argmin(&dataset.column(Column::Temperature)))
}

/// Mean temperature of rainy rows versus all other rows.
pub fn rain_comparison(dataset: &Dataset) -> RainComparison {
    let (rainy, non_rainy): (Vec<&Observation>, Vec<&Observation>) = dataset
        .observations()
        .iter()
        .partition(|o| o.weather_type == WeatherType::Rainy);

    let temps = |rows: Vec<&Observation>| -> Vec<f64> {
        rows.into_iter().map(|o| o.temperature_c).collect()
    };

    RainComparison {
        rainy_mean_temperature: mean(&temps(rainy)),
        non_rainy_mean_temperature: mean(&temps(non_rainy)),
    }
}

/// Mean of `column` for every weather type, in label order. Empty groups yield `None`.
pub fn mean_by_weather_type(dataset: &Dataset, column: Column) -> Vec<WeatherTypeMean> {
    WeatherType::alphabetical()
        .into_iter()
        .map(|weather_type| WeatherTypeMean {
            weather_type,
            mean: mean(&dataset.column_where(column, weather_type)),
        })
        .collect()
}

/// Runs every descriptive reduction. Never fails; an empty dataset yields empty or `None` results.
#[tracing::instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn explore(dataset: &Dataset, bins: usize) -> Exploration {
    let exploration = Exploration {
        observations: dataset.len(),
        statistics: summary_statistics(dataset, &Column::NUMERIC),
        weather_counts: weather_counts(dataset),
        daily_temperature: daily_mean(dataset, Column::Temperature),
        daily_humidity: daily_mean(dataset, Column::Humidity),
        daily_precipitation: daily_precipitation_count(dataset),
        correlation: correlation_matrix(dataset, &Column::NUMERIC),
        temperature_histogram: histogram(&dataset.column(Column::Temperature), bins),
    };
    debug!(
        days = exploration.daily_temperature.len(),
        weather_types = exploration.weather_counts.len(),
        "Exploration computed"
    );
    exploration
}

/// Computes the summary-report answers.
///
/// # Errors
///
/// Fails when the dataset is empty, since the temperature extrema are undefined.
#[tracing::instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn key_findings(dataset: &Dataset) -> Result<KeyFindings> {
    Ok(KeyFindings {
        hottest: hottest(dataset)?,
        coldest: coldest(dataset)?,
        temperature_humidity_correlation: column_correlation(
            dataset,
            Column::Temperature,
            Column::Humidity,
        ),
        rain: rain_comparison(dataset),
        wind_by_weather_type: mean_by_weather_type(dataset, Column::WindSpeed),
    })
}
