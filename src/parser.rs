//! CSV loader and cleaner for weather observation tables.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::observation::Reading;

pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Formatted Date";
pub const SUMMARY_COLUMN: &str = "Summary";
pub const PRECIP_TYPE_COLUMN: &str = "Precip Type";
pub const TEMPERATURE_COLUMN: &str = "Temperature (C)";
pub const HUMIDITY_COLUMN: &str = "Humidity";
pub const WIND_SPEED_COLUMN: &str = "Wind Speed (km/h)";

/// Field values treated as missing, in any column.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One source row before cleaning. `None` marks a missing tracked field.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub precip_type: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    /// True when no column of the row, tracked or not, holds a missing marker.
    pub complete: bool,
}

/// Header positions of the tracked columns.
struct ColumnIndex {
    timestamp: usize,
    summary: usize,
    precip_type: usize,
    temperature: usize,
    humidity: usize,
    wind_speed: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, timestamp_column: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("missing required column {name:?}"))
        };

        Ok(Self {
            timestamp: find(timestamp_column)?,
            summary: find(SUMMARY_COLUMN)?,
            precip_type: find(PRECIP_TYPE_COLUMN)?,
            temperature: find(TEMPERATURE_COLUMN)?,
            humidity: find(HUMIDITY_COLUMN)?,
            wind_speed: find(WIND_SPEED_COLUMN)?,
        })
    }
}

pub fn is_missing(field: &str) -> bool {
    MISSING_MARKERS.contains(&field)
}

/// Parses a timestamp into a UTC instant.
///
/// Accepts the dataset's native `2006-04-01 00:00:00.000 +0200` form, RFC 3339,
/// and naive date-times or dates, which are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    bail!("unrecognised timestamp {value:?}")
}

fn field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|v| !is_missing(v))
}

fn numeric(record: &StringRecord, idx: usize, name: &str, row: usize) -> Result<Option<f64>> {
    field(record, idx)
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("row {row}: invalid {name:?} value {v:?}"))
        })
        .transpose()
}

/// Reads every row of a CSV source, parsing the timestamp and numeric columns.
///
/// # Errors
///
/// Fails on malformed CSV, a missing required header, or a present but
/// unparseable timestamp or number.
pub fn read_records<R: Read>(reader: R, timestamp_column: &str) -> Result<Vec<RawRecord>> {
    // fields stay untrimmed so a blank-looking value is not a missing marker
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, timestamp_column)?;

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("row {row}: malformed CSV record"))?;

        let timestamp = field(&record, index.timestamp)
            .map(|v| {
                parse_timestamp(v.trim()).with_context(|| format!("row {row}: bad timestamp"))
            })
            .transpose()?;

        records.push(RawRecord {
            timestamp,
            summary: field(&record, index.summary).map(str::to_string),
            precip_type: field(&record, index.precip_type).map(str::to_string),
            temperature_c: numeric(&record, index.temperature, TEMPERATURE_COLUMN, row)?,
            humidity: numeric(&record, index.humidity, HUMIDITY_COLUMN, row)?,
            wind_speed_kmh: numeric(&record, index.wind_speed, WIND_SPEED_COLUMN, row)?,
            complete: !record.iter().any(is_missing),
        });
    }

    debug!(rows = records.len(), "CSV records read");
    Ok(records)
}

/// Opens `path` and reads its records. The file is closed before returning.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load(path: &Path, timestamp_column: &str) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records =
        read_records(file, timestamp_column).with_context(|| format!("parsing {}", path.display()))?;
    info!(rows = records.len(), "Source loaded");
    Ok(records)
}

impl RawRecord {
    fn into_reading(self) -> Option<Reading> {
        if !self.complete {
            return None;
        }
        Some(Reading {
            timestamp: self.timestamp?,
            summary: self.summary?,
            precip_type: self.precip_type?,
            temperature_c: self.temperature_c?,
            humidity: self.humidity?,
            wind_speed_kmh: self.wind_speed_kmh?,
        })
    }
}

/// Drops every record with a missing field, keeping source order.
pub fn clean(records: Vec<RawRecord>) -> Vec<Reading> {
    let total = records.len();
    let readings: Vec<Reading> = records.into_iter().filter_map(RawRecord::into_reading).collect();

    let dropped = total - readings.len();
    if dropped > 0 {
        warn!(dropped, kept = readings.len(), "Dropped incomplete rows");
    } else {
        debug!(kept = readings.len(), "No incomplete rows");
    }
    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HEADER: &str = "Formatted Date,Summary,Precip Type,Temperature (C),Apparent Temperature (C),Humidity,Wind Speed (km/h)\n";

    fn read(body: &str) -> Result<Vec<RawRecord>> {
        read_records(format!("{HEADER}{body}").as_bytes(), DEFAULT_TIMESTAMP_COLUMN)
    }

    #[test]
    fn test_parse_native_offset_timestamp() {
        let ts = parse_timestamp("2006-04-01 00:00:00.000 +0200").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2006, 3, 31, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_other_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2020-01-02T03:04:05Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2020-01-02T05:04:05+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2020-01-02 03:04:05").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2020-01-02").unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(""));
        assert!(is_missing("null"));
        assert!(is_missing("NaN"));
        assert!(!is_missing("rain"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn test_read_records_parses_fields() {
        let records = read("2006-04-01 00:00:00.000 +0200,Partly Cloudy,rain,9.47,7.38,0.89,14.11\n").unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert!(r.complete);
        assert_eq!(r.summary.as_deref(), Some("Partly Cloudy"));
        assert_eq!(r.temperature_c, Some(9.47));
        assert_eq!(r.humidity, Some(0.89));
        assert_eq!(r.wind_speed_kmh, Some(14.11));
    }

    #[test]
    fn test_untracked_missing_column_marks_row_incomplete() {
        let records = read("2006-04-01 00:00:00.000 +0200,Clear,rain,9.47,,0.89,14.11\n").unwrap();
        assert!(!records[0].complete);
        assert_eq!(records[0].temperature_c, Some(9.47));
    }

    #[test]
    fn test_clean_drops_rows_with_any_missing_field() {
        let body = "\
2006-04-01 00:00:00.000 +0200,Clear,rain,9.0,7.0,0.8,10.0
2006-04-01 01:00:00.000 +0200,Clear,null,9.0,7.0,0.8,10.0
2006-04-01 02:00:00.000 +0200,,rain,9.0,7.0,0.8,10.0
2006-04-01 03:00:00.000 +0200,Foggy,snow,NaN,7.0,0.8,10.0
,Foggy,snow,1.0,7.0,0.8,10.0
2006-04-01 05:00:00.000 +0200,Windy,snow,-2.5,-4.0,0.6,30.0
";
        let readings = clean(read(body).unwrap());
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].summary, "Clear");
        assert_eq!(readings[1].summary, "Windy");
        assert_eq!(readings[1].precip_type, "snow");
    }

    #[test]
    fn test_whitespace_field_is_not_missing() {
        let body = "2006-04-01 00:00:00.000 +0200 ,Clear, rain, 9.0 , ,0.8,10.0\n";
        let records = read(body).unwrap();
        let r = &records[0];
        assert!(r.complete);
        assert_eq!(r.temperature_c, Some(9.0));
        assert_eq!(r.precip_type.as_deref(), Some(" rain"));

        let readings = clean(records);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].timestamp, Utc.with_ymd_and_hms(2006, 3, 31, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_headers_match_exactly() {
        let csv = "Formatted Date, Summary,Precip Type,Temperature (C),Humidity,Wind Speed (km/h)\n";
        let err = read_records(csv.as_bytes(), DEFAULT_TIMESTAMP_COLUMN).unwrap_err();
        assert!(err.to_string().contains("\"Summary\""));
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let csv = "Formatted Date,Summary,Temperature (C),Humidity,Wind Speed (km/h)\n";
        let err = read_records(csv.as_bytes(), DEFAULT_TIMESTAMP_COLUMN).unwrap_err();
        assert!(err.to_string().contains("Precip Type"));
    }

    #[test]
    fn test_custom_timestamp_column() {
        let csv = "time,Summary,Precip Type,Temperature (C),Humidity,Wind Speed (km/h)\n2020-01-01,Clear,rain,1,0.5,2\n";
        assert!(read_records(csv.as_bytes(), DEFAULT_TIMESTAMP_COLUMN).is_err());
        let records = read_records(csv.as_bytes(), "time").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_bad_number_is_fatal() {
        let err = read("2006-04-01 00:00:00.000 +0200,Clear,rain,warm,7.0,0.8,10.0\n").unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        assert!(read("someday,Clear,rain,1.0,7.0,0.8,10.0\n").is_err());
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        assert!(read("2006-04-01 00:00:00.000 +0200,Clear,rain\n").is_err());
    }
}
