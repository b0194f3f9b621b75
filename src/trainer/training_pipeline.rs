// training_pipeline.rs
//
// Offline training run: load, split, impute, tune, refit, evaluate, persist.
// Nothing is written unless every earlier step succeeded.

use crate::artifact::{commit_files, metadata_timestamp, ModelArtifact, ModelMetadata};
use crate::config::AppConfig;
use crate::error::TrainingError;
use crate::feature_pipeline::MeanImputer;
use crate::global_variables::{CV_FOLDS, MODEL_TYPE, RANDOM_STATE, TARGET_COLUMN, TEST_SIZE};
use crate::regressor::GradientBoostingRegressor;
use crate::trainer::dataset::HistoricalDataset;
use crate::trainer::metrics::{r2_score, rmse};
use crate::trainer::model_selection::{
    grid_search, parameter_grid, select_rows, train_test_split_indices, GridParams, KFold,
};
use log::info;
use std::path::PathBuf;

const MIN_TRAIN_ROWS: usize = 3;
const MIN_TEST_ROWS: usize = 1;

#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub metadata_path: PathBuf,
    pub grid: Vec<GridParams>,
    pub cv_folds: usize,
    pub test_size: f64,
    pub seed: u64,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub metadata: ModelMetadata,
    pub n_train: usize,
    pub n_test: usize,
    pub skipped_rows: usize,
    pub cv_score: f64,
}

/// A fitted model with its metadata, not yet persisted.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub artifact: ModelArtifact,
    pub report: TrainingReport,
}

impl TrainingPipeline {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            model_path: config.model_path.clone(),
            metadata_path: config.metadata_path.clone(),
            grid: parameter_grid(),
            cv_folds: CV_FOLDS,
            test_size: TEST_SIZE,
            seed: RANDOM_STATE,
        }
    }

    pub fn with_grid(mut self, grid: Vec<GridParams>) -> Self {
        self.grid = grid;
        self
    }

    pub fn run(&self) -> Result<TrainingReport, TrainingError> {
        let dataset = HistoricalDataset::load(&self.data_path)?;
        let trained = self.fit(&dataset)?;

        let model_json = serde_json::to_string_pretty(&trained.artifact)?;
        let metadata_json = serde_json::to_string_pretty(&trained.report.metadata)?;
        commit_files(&[
            (model_json, self.model_path.as_path()),
            (metadata_json, self.metadata_path.as_path()),
        ])?;
        info!(
            "Model saved to {}, metadata to {}",
            self.model_path.display(),
            self.metadata_path.display()
        );
        Ok(trained.report)
    }

    /// Every step of the run except the file I/O.
    pub fn fit(&self, dataset: &HistoricalDataset) -> Result<TrainedModel, TrainingError> {
        let n = dataset.len();
        let (train_idx, test_idx) = train_test_split_indices(n, self.test_size, self.seed);
        if train_idx.len() < MIN_TRAIN_ROWS.max(self.cv_folds) || test_idx.len() < MIN_TEST_ROWS {
            return Err(TrainingError::InsufficientRows {
                have: n,
                required: MIN_TRAIN_ROWS.max(self.cv_folds) + MIN_TEST_ROWS,
            });
        }
        info!("Split {} rows into {} train / {} test", n, train_idx.len(), test_idx.len());

        let train_rows = select_rows(dataset.rows(), &train_idx);
        let test_rows = select_rows(dataset.rows(), &test_idx);
        let y_train = select_rows(dataset.targets(), &train_idx);
        let y_test = select_rows(dataset.targets(), &test_idx);

        let (imputer, x_train) = MeanImputer::fit_transform(&train_rows)?;
        let x_test = imputer.transform(&test_rows)?;

        let search = grid_search(&self.grid, &x_train, &y_train, &KFold::new(self.cv_folds))?;
        info!(
            "Best params: {:?} (cv neg rmse {:.4})",
            search.best_params, search.best_score
        );

        let mut regressor = GradientBoostingRegressor::new(search.best_params.boosting_params());
        regressor.fit(&x_train, &y_train)?;

        let predictions = regressor.predict(&x_test);
        let test_rmse = rmse(&y_test, &predictions);
        let test_r2 = r2_score(&y_test, &predictions);
        info!("Held-out RMSE: {:.2}, R2: {:.2}", test_rmse, test_r2);

        let features = dataset.features().to_vec();
        let metadata = ModelMetadata {
            timestamp: metadata_timestamp(),
            model_type: MODEL_TYPE.to_string(),
            features: features.clone(),
            target: TARGET_COLUMN.to_string(),
            params: search.best_params,
            rmse: test_rmse,
            r2_score: test_r2,
        };

        Ok(TrainedModel {
            artifact: ModelArtifact {
                features,
                imputer,
                regressor,
            },
            report: TrainingReport {
                metadata,
                n_train: train_idx.len(),
                n_test: test_idx.len(),
                skipped_rows: dataset.skipped_rows(),
                cv_score: search.best_score,
            },
        })
    }
}

/// Trains with the default grid using the paths from `config`.
pub fn train_model(config: &AppConfig) -> Result<TrainingReport, TrainingError> {
    TrainingPipeline::from_config(config).run()
}
