use crate::analyzers::aggregate::{explore, key_findings};
use crate::analyzers::classify::annotate;
use crate::analyzers::types::Analysis;
use crate::observation::Dataset;
use crate::parser::{RawRecord, clean, load, read_records};
use anyhow::Result;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Cleans and labels loaded records: `clean` then `annotate`.
pub fn prepare(records: Vec<RawRecord>) -> Dataset {
    let dataset = annotate(clean(records));
    info!(observations = dataset.len(), "Dataset prepared");
    dataset
}

/// Loads, cleans and labels the dataset stored at `path`.
pub fn load_dataset(path: &Path, timestamp_column: &str) -> Result<Dataset> {
    Ok(prepare(load(path, timestamp_column)?))
}

/// Aggregates a prepared dataset into a full [`Analysis`].
///
/// # Errors
///
/// Fails when the dataset is empty.
pub fn analyze(dataset: &Dataset, bins: usize) -> Result<Analysis> {
    let exploration = explore(dataset, bins);
    Ok(Analysis::new(exploration, key_findings(dataset)?))
}

/// Runs the whole pipeline over an in-memory CSV source.
pub fn analyze_reader<R: Read>(
    reader: R,
    timestamp_column: &str,
    bins: usize,
) -> Result<(Dataset, Analysis)> {
    let dataset = prepare(read_records(reader, timestamp_column)?);
    let analysis = analyze(&dataset, bins)?;
    Ok((dataset, analysis))
}

/// Runs the whole pipeline over the CSV file at `path`.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn analyze_path(path: &Path, timestamp_column: &str, bins: usize) -> Result<(Dataset, Analysis)> {
    let dataset = load_dataset(path, timestamp_column)?;
    let analysis = analyze(&dataset, bins)?;
    Ok((dataset, analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::classify::WeatherType;
    use crate::parser::DEFAULT_TIMESTAMP_COLUMN;

    const CSV: &str = "\
Formatted Date,Summary,Precip Type,Temperature (C),Humidity,Wind Speed (km/h)
2006-04-01 00:00:00.000 +0000,Light Rain,rain,10.0,0.9,4.0
2006-04-02 00:00:00.000 +0000,Clear Sky,rain,30.0,0.3,6.0
2006-04-03 00:00:00.000 +0000,Overcast,,20.0,0.5,6.0
";

    #[test]
    fn test_analyze_reader_end_to_end() {
        let (dataset, analysis) =
            analyze_reader(CSV.as_bytes(), DEFAULT_TIMESTAMP_COLUMN, 30).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.observations()[0].summary, "light rain");
        assert_eq!(dataset.observations()[0].weather_type, WeatherType::Rainy);

        let f = &analysis.findings;
        assert_eq!(f.hottest.value, 30.0);
        assert_eq!(f.hottest.timestamp.date_naive().to_string(), "2006-04-02");
        assert_eq!(f.coldest.value, 10.0);
        assert_eq!(f.rain.rainy_mean_temperature, Some(10.0));
        assert_eq!(f.rain.non_rainy_mean_temperature, Some(30.0));
        assert_eq!(analysis.exploration.observations, 2);
    }

    #[test]
    fn test_analyze_matches_separate_stages() {
        let dataset = prepare(read_records(CSV.as_bytes(), DEFAULT_TIMESTAMP_COLUMN).unwrap());
        let before = chrono::Utc::now();
        let combined = analyze(&dataset, 5).unwrap();
        let staged = Analysis::new(explore(&dataset, 5), key_findings(&dataset).unwrap());

        assert!(combined.generated_at >= before);
        assert!(staged.generated_at >= combined.generated_at);
        assert_eq!(combined.exploration, staged.exploration);
        assert_eq!(combined.findings, staged.findings);
    }

    #[test]
    fn test_all_rows_dropped_is_fatal_for_findings() {
        let csv = "Formatted Date,Summary,Precip Type,Temperature (C),Humidity,Wind Speed (km/h)\n2006-04-01,Clear,,1.0,0.5,1.0\n";
        assert!(analyze_reader(csv.as_bytes(), DEFAULT_TIMESTAMP_COLUMN, 30).is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let path = std::env::temp_dir().join("weather_eda_does_not_exist.csv");
        assert!(analyze_path(&path, DEFAULT_TIMESTAMP_COLUMN, 30).is_err());
    }
}
