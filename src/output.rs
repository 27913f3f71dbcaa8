//! Console rendering of analysis results.
//!
//! Every section is rendered to a `String` so it can be printed to stdout or
//! inspected in tests. Undefined values render as `NaN`.

use std::fmt::Write;

use crate::analyzers::types::{
    ColumnSummary, CorrelationMatrix, Exploration, KeyFindings, WeatherCount,
};

fn num(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "NaN".to_string(),
    }
}

/// Statistics table: one row per statistic, one column per numeric field.
pub fn format_statistics(stats: &[ColumnSummary]) -> String {
    let mut out = String::from("Basic Statistics:\n");
    let widths: Vec<usize> = stats.iter().map(|s| s.column.label().len().max(12)).collect();

    let _ = write!(out, "{:<8}", "");
    for (s, &w) in stats.iter().zip(&widths) {
        let _ = write!(out, "  {:>w$}", s.column.label());
    }
    out.push('\n');

    let rows: [(&str, fn(&ColumnSummary) -> Option<f64>); 4] = [
        ("mean", |s| s.mean),
        ("median", |s| s.median),
        ("max", |s| s.max),
        ("min", |s| s.min),
    ];
    for (name, get) in rows {
        let _ = write!(out, "{name:<8}");
        for (s, &w) in stats.iter().zip(&widths) {
            let _ = write!(out, "  {:>w$}", num(get(s), 6));
        }
        out.push('\n');
    }
    out
}

pub fn format_weather_counts(counts: &[WeatherCount]) -> String {
    let mut out = String::from("Number of Days by Weather Type:\n");
    for c in counts {
        let _ = writeln!(out, "{:<10}{:>8}", c.weather_type.label(), c.count);
    }
    out
}

pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::from("Correlation Matrix:\n");
    let width = matrix
        .columns
        .iter()
        .map(|c| c.label().len())
        .max()
        .unwrap_or(0);

    let _ = write!(out, "{:<width$}", "");
    for c in &matrix.columns {
        let _ = write!(out, "  {:>w$}", c.label(), w = c.label().len().max(9));
    }
    out.push('\n');

    for (i, row) in matrix.columns.iter().enumerate() {
        let _ = write!(out, "{:<width$}", row.label());
        for (j, c) in matrix.columns.iter().enumerate() {
            let _ = write!(
                out,
                "  {:>w$}",
                num(matrix.get(i, j), 6),
                w = c.label().len().max(9)
            );
        }
        out.push('\n');
    }
    out
}

/// Final report block with extrema, correlation and group means.
pub fn format_summary_report(findings: &KeyFindings) -> String {
    let mut out = String::from("--- Summary Report ---\n");
    let _ = writeln!(
        out,
        "Hottest Day: {} → {:.2}°C",
        findings.hottest.timestamp.date_naive(),
        findings.hottest.value
    );
    let _ = writeln!(
        out,
        "Coldest Day: {} → {:.2}°C",
        findings.coldest.timestamp.date_naive(),
        findings.coldest.value
    );
    let _ = writeln!(
        out,
        "\nTemperature-Humidity Correlation: {}",
        num(findings.temperature_humidity_correlation, 2)
    );
    let _ = writeln!(
        out,
        "\nAverage Temp on Rainy Days: {}°C",
        num(findings.rain.rainy_mean_temperature, 2)
    );
    let _ = writeln!(
        out,
        "Average Temp on Non-Rainy Days: {}°C",
        num(findings.rain.non_rainy_mean_temperature, 2)
    );
    out.push_str("\nAverage Wind Speeds by Weather Type:\n");
    for w in &findings.wind_by_weather_type {
        let _ = writeln!(out, "{:<10}{:>12}", w.weather_type.label(), num(w.mean, 6));
    }
    out
}

/// Statistics, weather counts and correlation sections, blank-line separated.
pub fn format_exploration(exploration: &Exploration) -> String {
    [
        format_statistics(&exploration.statistics),
        format_weather_counts(&exploration.weather_counts),
        format_correlation(&exploration.correlation),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::classify::WeatherType;
    use crate::analyzers::types::{Extremum, RainComparison, WeatherTypeMean};
    use crate::observation::Column;
    use chrono::{TimeZone, Utc};

    fn findings() -> KeyFindings {
        KeyFindings {
            hottest: Extremum {
                timestamp: Utc.with_ymd_and_hms(2006, 7, 2, 14, 0, 0).unwrap(),
                value: 30.0,
            },
            coldest: Extremum {
                timestamp: Utc.with_ymd_and_hms(2006, 1, 5, 4, 0, 0).unwrap(),
                value: 10.0,
            },
            temperature_humidity_correlation: Some(-0.6324),
            rain: RainComparison {
                rainy_mean_temperature: Some(10.0),
                non_rainy_mean_temperature: None,
            },
            wind_by_weather_type: vec![
                WeatherTypeMean {
                    weather_type: WeatherType::Breezy,
                    mean: Some(21.5),
                },
                WeatherTypeMean {
                    weather_type: WeatherType::Clear,
                    mean: None,
                },
            ],
        }
    }

    #[test]
    fn test_summary_report_lines() {
        let report = format_summary_report(&findings());
        assert!(report.contains("Hottest Day: 2006-07-02 → 30.00°C"));
        assert!(report.contains("Coldest Day: 2006-01-05 → 10.00°C"));
        assert!(report.contains("Temperature-Humidity Correlation: -0.63"));
        assert!(report.contains("Average Temp on Rainy Days: 10.00°C"));
        assert!(report.contains("Average Temp on Non-Rainy Days: NaN°C"));
        assert!(report.contains("breezy"));
        assert!(report.contains("21.500000"));
    }

    #[test]
    fn test_statistics_table_layout() {
        let stats = vec![ColumnSummary {
            column: Column::Humidity,
            mean: Some(0.5),
            median: None,
            max: Some(1.0),
            min: Some(0.0),
        }];
        let table = format_statistics(&stats);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("Humidity"));
        assert!(lines[2].starts_with("mean") && lines[2].ends_with("0.500000"));
        assert!(lines[3].ends_with("NaN"));
    }

    #[test]
    fn test_weather_counts_lines() {
        let counts = vec![
            WeatherCount {
                weather_type: WeatherType::Cloudy,
                count: 7,
            },
            WeatherCount {
                weather_type: WeatherType::Rainy,
                count: 2,
            },
        ];
        let text = format_weather_counts(&counts);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("cloudy") && lines[1].ends_with('7'));
    }

    #[test]
    fn test_correlation_rows() {
        let matrix = CorrelationMatrix {
            columns: vec![Column::Temperature, Column::Humidity],
            values: vec![vec![Some(1.0), Some(-0.5)], vec![Some(-0.5), Some(1.0)]],
        };
        let text = format_correlation(&matrix);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("Temperature (C)"));
        assert!(lines[2].contains("-0.500000"));
        assert!(lines[3].trim_end().ends_with("1.000000"));
    }
}
