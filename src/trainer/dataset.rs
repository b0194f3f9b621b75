// dataset.rs
//
// Loads the historical traffic CSV into a feature matrix over the canonical
// candidate columns. Missing cells stay `None` for the imputer.

use crate::error::TrainingError;
use crate::feature_pipeline::time_features;
use crate::global_variables::{
    DATETIME_COLUMN, FEATURE_CANDIDATES, MIN_FEATURE_COLUMNS, TARGET_COLUMN,
};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const MISSING_MARKERS: [&str; 5] = ["nan", "na", "n/a", "null", "none"];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDataset {
    features: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
    targets: Vec<f64>,
    skipped_rows: usize,
}

/// Where each selected feature comes from in a CSV record.
#[derive(Debug, Clone, Copy)]
enum FeatureSource {
    Column(usize),
    Hour(usize),
    Weekday(usize),
}

impl HistoricalDataset {
    pub fn load(path: &Path) -> Result<Self, TrainingError> {
        if !path.is_file() {
            return Err(TrainingError::DatasetNotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| TrainingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} rows from {} ({} skipped), features: {:?}",
            dataset.len(),
            path.display(),
            dataset.skipped_rows,
            dataset.features
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TrainingError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let target_idx =
            column(TARGET_COLUMN).ok_or_else(|| TrainingError::MissingTarget(TARGET_COLUMN.into()))?;
        let datetime_idx = column(DATETIME_COLUMN);

        // Derived time columns replace any stored hour/weekday.
        let mut features = Vec::new();
        let mut sources = Vec::new();
        for name in FEATURE_CANDIDATES {
            let source = match (name, datetime_idx) {
                ("hour", Some(dt)) => Some(FeatureSource::Hour(dt)),
                ("weekday", Some(dt)) => Some(FeatureSource::Weekday(dt)),
                _ => column(name).map(FeatureSource::Column),
            };
            if let Some(source) = source {
                features.push(name.to_string());
                sources.push(source);
            }
        }
        if features.len() < MIN_FEATURE_COLUMNS {
            return Err(TrainingError::InsufficientFeatures {
                found: features,
                required: MIN_FEATURE_COLUMNS,
            });
        }

        let mut rows = Vec::new();
        let mut targets = Vec::new();
        let mut skipped_rows = 0;

        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let row_no = idx + 1;

            let Some(target) = parse_cell(&record, target_idx, row_no, TARGET_COLUMN)? else {
                warn!("Row {}: missing {}, skipping", row_no, TARGET_COLUMN);
                skipped_rows += 1;
                continue;
            };

            let row = features
                .iter()
                .zip(&sources)
                .map(|(name, source)| match *source {
                    FeatureSource::Column(col) => parse_cell(&record, col, row_no, name),
                    FeatureSource::Hour(col) => {
                        Ok(parse_datetime(record.get(col).unwrap_or("")).map(|dt| time_features(&dt).0))
                    }
                    FeatureSource::Weekday(col) => {
                        Ok(parse_datetime(record.get(col).unwrap_or("")).map(|dt| time_features(&dt).1))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            rows.push(row);
            targets.push(target);
        }

        Ok(Self {
            features,
            rows,
            targets,
            skipped_rows,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Empty cells and NaN-like markers are missing. Anything else that is not a
/// finite number is fatal.
fn parse_cell(
    record: &StringRecord,
    col: usize,
    row: usize,
    column: &str,
) -> Result<Option<f64>, TrainingError> {
    let raw = record.get(col).unwrap_or("");
    if raw.is_empty() || MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(TrainingError::InvalidValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Unparseable timestamps yield `None`. A bare date counts as midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> Result<HistoricalDataset, TrainingError> {
        HistoricalDataset::from_reader(csv.as_bytes())
    }

    #[test]
    fn selects_candidate_columns_in_canonical_order() {
        let ds = load(
            "rain,distance_km,traffic_level,notes\n\
             0,4.5,40,x\n\
             1,10.0,75,y\n",
        )
        .expect("load");
        assert_eq!(ds.features(), ["distance_km", "rain"]);
        assert_eq!(ds.rows()[0], vec![Some(4.5), Some(0.0)]);
        assert_eq!(ds.targets(), [40.0, 75.0]);
    }

    #[test]
    fn derives_time_columns_from_datetime() {
        let ds = load(
            "datetime,distance_km,hour,traffic_level\n\
             2024-01-02 08:15:00,3.0,23,50\n\
             garbage,4.0,23,60\n",
        )
        .expect("load");
        assert_eq!(ds.features(), ["distance_km", "hour", "weekday"]);
        assert_eq!(ds.rows()[0], vec![Some(3.0), Some(8.0), Some(1.0)]);
        assert_eq!(ds.rows()[1], vec![Some(4.0), None, None]);
    }

    #[test]
    fn missing_cells_and_nan_are_missing_values() {
        let ds = load(
            "distance_km,temperature,traffic_level\n\
             ,NaN,10\n\
             2.0,,20\n",
        )
        .expect("load");
        assert_eq!(ds.rows()[0], vec![None, None]);
        assert_eq!(ds.rows()[1], vec![Some(2.0), None]);
    }

    #[test]
    fn rows_without_target_are_skipped() {
        let ds = load(
            "distance_km,rain,traffic_level\n\
             1.0,0,\n\
             2.0,0,30\n",
        )
        .expect("load");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows(), 1);
    }

    #[test]
    fn non_numeric_cell_is_fatal() {
        let err = load(
            "distance_km,rain,traffic_level\n\
             1.0,0,10\n\
             far,0,20\n",
        )
        .unwrap_err();
        match err {
            TrainingError::InvalidValue { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "distance_km");
                assert_eq!(value, "far");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_target_column_is_fatal() {
        assert!(matches!(
            load("distance_km,rain\n1,0\n"),
            Err(TrainingError::MissingTarget(_))
        ));
    }

    #[test]
    fn too_few_feature_columns_is_fatal() {
        assert!(matches!(
            load("distance_km,traffic_level\n1,10\n"),
            Err(TrainingError::InsufficientFeatures { required: 2, .. })
        ));
    }

    #[test]
    fn absent_file_is_reported() {
        let path = Path::new("definitely/not/here.csv");
        assert!(matches!(
            HistoricalDataset::load(path),
            Err(TrainingError::DatasetNotFound(p)) if p == path
        ));
    }

    #[test]
    fn parses_common_datetime_layouts() {
        assert!(parse_datetime("2024-03-04T17:30:00").is_some());
        assert!(parse_datetime("2024-03-04 17:30").is_some());
        assert_eq!(
            parse_datetime("2024-03-04").map(|d| time_features(&d)),
            Some((0.0, 0.0))
        );
        assert!(parse_datetime("04/03/2024").is_none());
    }
}
