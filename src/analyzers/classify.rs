use serde::Serialize;
use std::fmt;

use crate::observation::{Dataset, Observation, Reading};

/// Weather category derived from a free-text summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherType {
    Rainy,
    Foggy,
    Breezy,
    Overcast,
    Cloudy,
    Clear,
    Other,
}

impl WeatherType {
    pub const ALL: [WeatherType; 7] = [
        WeatherType::Rainy,
        WeatherType::Foggy,
        WeatherType::Breezy,
        WeatherType::Overcast,
        WeatherType::Cloudy,
        WeatherType::Clear,
        WeatherType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WeatherType::Rainy => "rainy",
            WeatherType::Foggy => "foggy",
            WeatherType::Breezy => "breezy",
            WeatherType::Overcast => "overcast",
            WeatherType::Cloudy => "cloudy",
            WeatherType::Clear => "clear",
            WeatherType::Other => "other",
        }
    }

    /// All variants ordered by label.
    pub fn alphabetical() -> Vec<WeatherType> {
        let mut all = Self::ALL.to_vec();
        all.sort_by_key(|t| t.label());
        all
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword groups in priority order. The first group with a hit decides.
///
/// | Keywords           | Type     |
/// |--------------------|----------|
/// | rain               | rainy    |
/// | fog                | foggy    |
/// | breeze, wind       | breezy   |
/// | overcast           | overcast |
/// | cloud              | cloudy   |
/// | clear, sunny       | clear    |
static RULES: &[(&[&str], WeatherType)] = &[
    (&["rain"], WeatherType::Rainy),
    (&["fog"], WeatherType::Foggy),
    (&["breeze", "wind"], WeatherType::Breezy),
    (&["overcast"], WeatherType::Overcast),
    (&["cloud"], WeatherType::Cloudy),
    (&["clear", "sunny"], WeatherType::Clear),
];

/// Maps a summary to its [`WeatherType`], case-insensitively.
pub fn classify(summary: &str) -> WeatherType {
    let summary = summary.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| summary.contains(k)))
        .map_or(WeatherType::Other, |(_, weather_type)| *weather_type)
}

/// Labels every reading, storing its summary lower-cased.
#[tracing::instrument(skip_all, fields(rows = readings.len()))]
pub fn annotate(readings: Vec<Reading>) -> Dataset {
    let observations = readings
        .into_iter()
        .map(|r| {
            let summary = r.summary.to_lowercase();
            Observation {
                weather_type: classify(&summary),
                timestamp: r.timestamp,
                summary,
                precip_type: r.precip_type,
                temperature_c: r.temperature_c,
                humidity: r.humidity,
                wind_speed_kmh: r.wind_speed_kmh,
            }
        })
        .collect();
    Dataset::new(observations)
}
