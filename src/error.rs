use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of the offline training run.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("target column '{0}' is not in the dataset")]
    MissingTarget(String),

    #[error("not enough feature columns to build a model (found {found:?}, need at least {required})")]
    InsufficientFeatures { found: Vec<String>, required: usize },

    #[error("not enough labelled rows to split and cross-validate (have {have}, need at least {required})")]
    InsufficientRows { have: usize, required: usize },

    #[error("non-numeric value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("imputation failed: {0}")]
    Impute(#[from] ImputeError),

    #[error("hyperparameter grid is empty")]
    EmptyGrid,

    #[error("row {row} has {got} features, expected {expected}")]
    RowWidth { row: usize, expected: usize, got: usize },

    #[error("feature matrix and target have different lengths ({rows} rows, {targets} targets)")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("failed to write artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ImputeError {
    #[error("cannot fit on an empty batch")]
    EmptyBatch,

    #[error("column {0} has no values to fit a mean on")]
    EmptyColumn(usize),

    #[error("row {row} has {got} values, expected {expected}")]
    RowWidth { row: usize, expected: usize, got: usize },
}

/// Errors of the online inference path. Callers that want the degrade
/// behaviour use the total wrappers on `TrafficPredictor`.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unknown feature '{0}' cannot be built from a route")]
    UnknownFeature(String),

    #[error("imputation failed: {0}")]
    Impute(#[from] ImputeError),

    #[error("row has {got} values, model expects {expected}")]
    RowWidth { expected: usize, got: usize },

    #[error("model produced a non-finite value ({0})")]
    NonFiniteOutput(f64),
}

/// Failures of the routing collaborator, surfaced to the caller.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("at least two coordinates are required, got {0}")]
    InsufficientCoordinates(usize),

    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("routing response has no route: {0}")]
    MalformedResponse(String),

    #[error("{preference} route unavailable: {source}")]
    Preference {
        preference: &'static str,
        #[source]
        source: Box<RouteError>,
    },
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Service(String),

    #[error("unexpected weather response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no routes to export")]
    NoRoutes,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rendering failed: {0}")]
    Render(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}
