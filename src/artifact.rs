//! Persisted model artifact and its metadata record.
//!
//! Both files are JSON. Writes go through a sibling temporary file and a
//! rename so a reader never sees a half-written artifact.

use crate::error::{PredictionError, TrainingError};
use crate::feature_pipeline::MeanImputer;
use crate::regressor::GradientBoostingRegressor;
use crate::trainer::model_selection::GridParams;
use chrono::Local;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything inference needs: feature order, imputation means and the
/// fitted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub features: Vec<String>,
    #[serde(rename = "imputer_means")]
    pub imputer: MeanImputer,
    pub regressor: GradientBoostingRegressor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub timestamp: String,
    pub model_type: String,
    pub features: Vec<String>,
    pub target: String,
    pub params: GridParams,
    pub rmse: f64,
    pub r2_score: f64,
}

/// Local wall-clock time in ISO-8601 without a zone suffix.
pub fn metadata_timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), TrainingError> {
    let json = serde_json::to_string_pretty(value)?;
    commit_files(&[(json, path)])
}

/// Writes a set of already-serialized documents as one unit. Every temp file
/// is written before any destination is renamed; if a temp write fails, the
/// temp files written so far are removed and no destination is touched.
pub fn commit_files(files: &[(String, &Path)]) -> Result<(), TrainingError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for (json, path) in files {
        match stage(json, path) {
            Ok(tmp) => staged.push((tmp, *path)),
            Err(e) => {
                for (tmp, _) in &staged {
                    let _ = fs::remove_file(tmp);
                }
                return Err(e);
            }
        }
    }
    for (tmp, path) in &staged {
        fs::rename(tmp, path).map_err(|source| io_error(path, source))?;
    }
    Ok(())
}

fn stage(json: &str, path: &Path) -> Result<PathBuf, TrainingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|source| io_error(path, source))?;
    Ok(tmp)
}

fn io_error(path: &Path, source: std::io::Error) -> TrainingError {
    TrainingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PredictionError> {
    let text = fs::read_to_string(path).map_err(|source| PredictionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PredictionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
