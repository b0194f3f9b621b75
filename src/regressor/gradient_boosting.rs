//! Gradient boosted regression trees with a squared-error objective.
//!
//! Training starts from the mean target and adds one tree per round, each
//! fitted to the current residuals and shrunk by the learning rate.

use super::regression_tree::{RegressionTree, TreeParams};
use crate::error::{PredictionError, TrainingError};
use log::debug;
use serde::{Deserialize, Serialize};

/// Hyperparameters of the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub reg_lambda: f64,
    pub min_child_weight: f64,
}

impl BoostingParams {
    /// Tuned parameters with the default regularisation (λ = 1, min child weight = 1).
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth,
            ..Self::default()
        }
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            reg_lambda: self.reg_lambda,
            min_child_weight: self.min_child_weight,
        }
    }
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    params: BoostingParams,
    base_score: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    pub fn new(params: BoostingParams) -> Self {
        Self {
            params,
            base_score: 0.0,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    /// Fits the ensemble on a fully populated feature matrix.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), TrainingError> {
        if x.len() != y.len() {
            return Err(TrainingError::LengthMismatch {
                rows: x.len(),
                targets: y.len(),
            });
        }
        if x.is_empty() {
            return Err(TrainingError::InsufficientRows {
                have: 0,
                required: 1,
            });
        }
        let n_features = x[0].len();
        if let Some((row, bad)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(TrainingError::RowWidth {
                row,
                expected: n_features,
                got: bad.len(),
            });
        }

        let base_score = y.iter().sum::<f64>() / y.len() as f64;
        let mut predictions = vec![base_score; y.len()];
        let tree_params = self.params.tree_params();
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for round in 0..self.params.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(&predictions)
                .map(|(target, pred)| target - pred)
                .collect();

            let tree = RegressionTree::fit(x, &residuals, &tree_params);
            for (pred, row) in predictions.iter_mut().zip(x) {
                *pred += self.params.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);

            if round % 50 == 0 {
                debug!(
                    "boosting round {}: train rmse {:.4}",
                    round,
                    crate::trainer::metrics::rmse(y, &predictions)
                );
            }
        }

        self.base_score = base_score;
        self.n_features = n_features;
        self.trees = trees;
        Ok(())
    }

    /// Predicts one fully populated row, checking its width against the
    /// width the model was fitted on.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, PredictionError> {
        if row.len() != self.n_features {
            return Err(PredictionError::RowWidth {
                expected: self.n_features,
                got: row.len(),
            });
        }
        Ok(self.raw_predict(row))
    }

    /// Batch prediction for rows already known to have the fitted width.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.raw_predict(row)).collect()
    }

    fn raw_predict(&self, row: &[f64]) -> f64 {
        self.trees.iter().fold(self.base_score, |acc, tree| {
            acc + self.params.learning_rate * tree.predict_row(row)
        })
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// True when no tree refers to a feature beyond the fitted width. Used to
    /// reject hand-edited or corrupted artifacts at load time.
    pub fn is_consistent(&self) -> bool {
        self.trees
            .iter()
            .filter_map(RegressionTree::max_feature_index)
            .all(|idx| idx < self.n_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainer::metrics::rmse;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64, (i % 7) as f64])
            .collect();
        let y = x.iter().map(|r| 3.0 * r[0] + 2.0 * r[1] + 5.0).collect();
        (x, y)
    }

    #[test]
    fn boosting_reduces_training_error() {
        let (x, y) = linear_data(60);
        let mut model = GradientBoostingRegressor::new(BoostingParams::new(100, 0.1, 3));
        model.fit(&x, &y).expect("fit");

        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let baseline = rmse(&y, &vec![mean; y.len()]);
        let fitted = rmse(&y, &model.predict(&x));
        assert!(fitted < baseline * 0.1, "fitted {} vs baseline {}", fitted, baseline);
        assert_eq!(model.n_trees(), 100);
        assert!(model.is_consistent());
    }

    #[test]
    fn constant_target_predicts_the_constant() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![137.0; 10];
        let mut model = GradientBoostingRegressor::new(BoostingParams::new(20, 0.1, 3));
        model.fit(&x, &y).expect("fit");
        let pred = model.predict_row(&[4.0, 1.0]).expect("width matches");
        assert!((pred - 137.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_mismatched_inputs() {
        let mut model = GradientBoostingRegressor::new(BoostingParams::default());
        assert!(matches!(
            model.fit(&[vec![1.0]], &[1.0, 2.0]),
            Err(TrainingError::LengthMismatch { .. })
        ));
        assert!(matches!(
            model.fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]),
            Err(TrainingError::RowWidth { row: 1, .. })
        ));
    }

    #[test]
    fn prediction_checks_row_width() {
        let (x, y) = linear_data(20);
        let mut model = GradientBoostingRegressor::new(BoostingParams::new(5, 0.1, 2));
        model.fit(&x, &y).expect("fit");
        assert!(matches!(
            model.predict_row(&[1.0]),
            Err(PredictionError::RowWidth { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn survives_a_json_round_trip() {
        let (x, y) = linear_data(20);
        let mut model = GradientBoostingRegressor::new(BoostingParams::new(10, 0.1, 3));
        model.fit(&x, &y).expect("fit");
        let json = serde_json::to_string(&model).expect("serialize");
        let restored: GradientBoostingRegressor = serde_json::from_str(&json).expect("deserialize");
        for (a, b) in restored.predict(&x).iter().zip(model.predict(&x)) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
