// model_selection.rs
//
// Seeded train/test split, K-fold splitting and the exhaustive
// hyperparameter grid search that picks the boosting configuration.

use crate::error::TrainingError;
use crate::global_variables::{GRID_LEARNING_RATE, GRID_MAX_DEPTH, GRID_N_ESTIMATORS};
use crate::regressor::{BoostingParams, GradientBoostingRegressor};
use crate::trainer::metrics::rmse;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Shuffled row indices split into (train, test). The test share is rounded
/// up, so any non-empty dataset with at least two rows keeps a test row.
pub fn train_test_split_indices(
    n_samples: usize,
    test_size: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n_samples);
    let test = indices.split_off(n_samples - n_test);
    (indices, test)
}

pub fn select_rows<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

/// Contiguous, unshuffled K-fold splitter. The first `n % k` folds get one
/// extra sample.
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits: n_splits.max(2),
        }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn split(&self, n_samples: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for i in 0..self.n_splits {
            let size = if i < remainder { fold_size + 1 } else { fold_size };
            let end = start + size;
            let test: Vec<usize> = (start..end).collect();
            let train: Vec<usize> = (0..start).chain(end..n_samples).collect();
            folds.push((train, test));
            start = end;
        }
        folds
    }
}

/// One point of the hyperparameter grid, serialized into the metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub learning_rate: f64,
    pub max_depth: usize,
    pub n_estimators: usize,
}

impl GridParams {
    pub fn boosting_params(&self) -> BoostingParams {
        BoostingParams::new(self.n_estimators, self.learning_rate, self.max_depth)
    }
}

/// Every combination of the tuning grid, ordered by learning rate, then max
/// depth, then tree count (the last varying fastest).
pub fn parameter_grid() -> Vec<GridParams> {
    let mut grid = Vec::new();
    for &learning_rate in &GRID_LEARNING_RATE {
        for &max_depth in &GRID_MAX_DEPTH {
            for &n_estimators in &GRID_N_ESTIMATORS {
                grid.push(GridParams {
                    learning_rate,
                    max_depth,
                    n_estimators,
                });
            }
        }
    }
    grid
}

#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub params: GridParams,
    /// Mean negative RMSE over the folds (higher is better).
    pub mean_score: f64,
    pub fold_scores: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_params: GridParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
}

/// Negative RMSE of each fold for one parameter set.
pub fn cross_val_neg_rmse(
    params: &BoostingParams,
    x: &[Vec<f64>],
    y: &[f64],
    cv: &KFold,
) -> Result<Vec<f64>, TrainingError> {
    cv.split(y.len())
        .into_iter()
        .map(|(train_idx, test_idx)| {
            let mut model = GradientBoostingRegressor::new(*params);
            model.fit(&select_rows(x, &train_idx), &select_rows(y, &train_idx))?;
            let predictions = model.predict(&select_rows(x, &test_idx));
            Ok(-rmse(&select_rows(y, &test_idx), &predictions))
        })
        .collect()
}

/// Evaluates every candidate with K-fold cross-validation and keeps the one
/// with the highest mean negative RMSE. Ties keep the earlier candidate.
pub fn grid_search(
    grid: &[GridParams],
    x: &[Vec<f64>],
    y: &[f64],
    cv: &KFold,
) -> Result<GridSearchResult, TrainingError> {
    if y.len() < cv.n_splits() {
        return Err(TrainingError::InsufficientRows {
            have: y.len(),
            required: cv.n_splits(),
        });
    }
    if grid.is_empty() {
        return Err(TrainingError::EmptyGrid);
    }

    info!(
        "Grid search: {} candidates x {} folds",
        grid.len(),
        cv.n_splits()
    );

    let candidates = grid
        .par_iter()
        .map(|params| {
            let fold_scores = cross_val_neg_rmse(&params.boosting_params(), x, y, cv)?;
            let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            debug!("{:?}: mean neg rmse {:.4}", params, mean_score);
            Ok(CandidateScore {
                params: *params,
                mean_score,
                fold_scores,
            })
        })
        .collect::<Result<Vec<_>, TrainingError>>()?;

    let mut best = &candidates[0];
    for candidate in &candidates[1..] {
        if candidate.mean_score > best.mean_score {
            best = candidate;
        }
    }
    let (best_params, best_score) = (best.params, best.mean_score);

    Ok(GridSearchResult {
        best_params,
        best_score,
        candidates,
    })
}
