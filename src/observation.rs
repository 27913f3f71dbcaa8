use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::classify::WeatherType;

/// A cleaned source row: every tracked field is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub precip_type: String,
    pub temperature_c: f64,
    pub humidity: f64,
    pub wind_speed_kmh: f64,
}

/// A [`Reading`] annotated with its derived [`WeatherType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub precip_type: String,
    pub temperature_c: f64,
    pub humidity: f64,
    pub wind_speed_kmh: f64,
    pub weather_type: WeatherType,
}

/// Numeric columns that take part in statistics and correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Column {
    #[serde(rename = "Temperature (C)")]
    Temperature,
    #[serde(rename = "Humidity")]
    Humidity,
    #[serde(rename = "Wind Speed (km/h)")]
    WindSpeed,
}

impl Column {
    pub const NUMERIC: [Column; 3] = [Column::Temperature, Column::Humidity, Column::WindSpeed];

    /// Source header for the column.
    pub fn label(self) -> &'static str {
        match self {
            Column::Temperature => "Temperature (C)",
            Column::Humidity => "Humidity",
            Column::WindSpeed => "Wind Speed (km/h)",
        }
    }

    pub fn value(self, obs: &Observation) -> f64 {
        match self {
            Column::Temperature => obs.temperature_c,
            Column::Humidity => obs.humidity,
            Column::WindSpeed => obs.wind_speed_kmh,
        }
    }
}

/// Observations in source order. Built once by annotation and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Extracts one numeric column in source order.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.observations.iter().map(|o| column.value(o)).collect()
    }

    /// Values of `column` for observations labelled `weather_type`.
    pub fn column_where(&self, column: Column, weather_type: WeatherType) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.weather_type == weather_type)
            .map(|o| column.value(o))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn obs(temp: f64, weather_type: WeatherType) -> Observation {
        Observation {
            timestamp: Utc.with_ymd_and_hms(2006, 4, 1, 0, 0, 0).unwrap(),
            summary: "x".to_string(),
            precip_type: "rain".to_string(),
            temperature_c: temp,
            humidity: 0.5,
            wind_speed_kmh: 3.0,
            weather_type,
        }
    }

    #[test]
    fn test_column_preserves_source_order() {
        let ds = Dataset::new(vec![obs(3.0, WeatherType::Clear), obs(1.0, WeatherType::Rainy)]);
        assert_eq!(ds.column(Column::Temperature), vec![3.0, 1.0]);
        assert_eq!(ds.column(Column::WindSpeed), vec![3.0, 3.0]);
    }

    #[test]
    fn test_column_where_filters_by_label() {
        let ds = Dataset::new(vec![
            obs(3.0, WeatherType::Clear),
            obs(1.0, WeatherType::Rainy),
            obs(2.0, WeatherType::Rainy),
        ]);
        assert_eq!(
            ds.column_where(Column::Temperature, WeatherType::Rainy),
            vec![1.0, 2.0]
        );
        assert!(ds.column_where(Column::Temperature, WeatherType::Foggy).is_empty());
    }

    #[test]
    fn test_column_labels_match_source_headers() {
        assert_eq!(Column::Temperature.label(), "Temperature (C)");
        assert_eq!(Column::WindSpeed.label(), "Wind Speed (km/h)");
    }
}
