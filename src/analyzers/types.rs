//! Data types produced by the aggregation pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::analyzers::classify::WeatherType;
use crate::analyzers::utility::HistogramBin;
use crate::observation::Column;

/// Mean, median, max and min of one numeric column. `None` on an empty dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

/// Number of observations carrying a weather type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherCount {
    pub weather_type: WeatherType,
    pub count: usize,
}

/// Calendar-day (UTC) mean; `None` for days without observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub mean: Option<f64>,
}

/// Calendar-day (UTC) record count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Symmetric pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }
}

/// Timestamp and value of an extreme temperature reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremum {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainComparison {
    pub rainy_mean_temperature: Option<f64>,
    pub non_rainy_mean_temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherTypeMean {
    pub weather_type: WeatherType,
    pub mean: Option<f64>,
}

/// Descriptive results that exist for any dataset, empty or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exploration {
    pub observations: usize,
    pub statistics: Vec<ColumnSummary>,
    pub weather_counts: Vec<WeatherCount>,
    pub daily_temperature: Vec<DailyMean>,
    pub daily_humidity: Vec<DailyMean>,
    pub daily_precipitation: Vec<DailyCount>,
    pub correlation: CorrelationMatrix,
    pub temperature_histogram: Vec<HistogramBin>,
}

/// Answers to the summary-report questions. Requires a non-empty dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyFindings {
    pub hottest: Extremum,
    pub coldest: Extremum,
    pub temperature_humidity_correlation: Option<f64>,
    pub rain: RainComparison,
    pub wind_by_weather_type: Vec<WeatherTypeMean>,
}

/// Complete analysis result, written as JSON on request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub generated_at: DateTime<Utc>,
    pub exploration: Exploration,
    pub findings: KeyFindings,
}

impl Analysis {
    /// Bundles the two aggregation stages, stamped with the current time.
    pub fn new(exploration: Exploration, findings: KeyFindings) -> Self {
        Self {
            generated_at: Utc::now(),
            exploration,
            findings,
        }
    }
}
