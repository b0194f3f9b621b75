// traffic_predictor.rs
//
// Online inference: route summary + wall-clock time -> traffic level 0..=100.
// The loaded artifact is immutable and shared, so a predictor can be cloned
// into concurrent request handlers.

use crate::artifact::{load_json, ModelArtifact, ModelMetadata};
use crate::error::PredictionError;
use crate::feature_pipeline::{build_feature_row, is_known_feature, InferenceConditions};
use crate::shared_data::{RouteSummary, TrafficEstimate, TrafficLevel};
use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TrafficPredictor {
    artifact: Arc<ModelArtifact>,
    metadata: Arc<ModelMetadata>,
    conditions: InferenceConditions,
}

impl TrafficPredictor {
    pub fn load(model_path: &Path, metadata_path: &Path) -> Result<Self, PredictionError> {
        let artifact: ModelArtifact = load_json(model_path)?;
        let metadata: ModelMetadata = load_json(metadata_path)?;
        let predictor = Self::from_parts(artifact, metadata)?;
        info!(
            "Loaded {} trained on {} (features: {:?})",
            predictor.metadata.model_type,
            predictor.metadata.timestamp,
            predictor.metadata.features
        );
        Ok(predictor)
    }

    /// Validates that artifact and metadata describe the same feature schema.
    pub fn from_parts(artifact: ModelArtifact, metadata: ModelMetadata) -> Result<Self, PredictionError> {
        validate_schema(&artifact, &metadata)?;
        Ok(Self {
            artifact: Arc::new(artifact),
            metadata: Arc::new(metadata),
            conditions: InferenceConditions::fixed(),
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn features(&self) -> &[String] {
        &self.artifact.features
    }

    pub fn try_predict_traffic_level(
        &self,
        summary: &RouteSummary,
        at: &NaiveDateTime,
    ) -> Result<TrafficLevel, PredictionError> {
        let row = build_feature_row(summary, at, &self.conditions);
        let values = row.reindex(&self.artifact.features)?;
        let imputed = self.artifact.imputer.transform_row(&values)?;
        let raw = self.artifact.regressor.predict_row(&imputed)?;
        TrafficLevel::from_raw_prediction(raw).ok_or(PredictionError::NonFiniteOutput(raw))
    }

    /// Never fails: any error is logged and reported as level 0.
    pub fn predict_traffic_level(&self, summary: &RouteSummary, at: &NaiveDateTime) -> TrafficLevel {
        self.estimate_traffic(summary, at).level()
    }

    /// Like `predict_traffic_level`, but keeps a failed prediction apart from
    /// a genuine zero.
    pub fn estimate_traffic(&self, summary: &RouteSummary, at: &NaiveDateTime) -> TrafficEstimate {
        match self.try_predict_traffic_level(summary, at) {
            Ok(level) => TrafficEstimate::Predicted(level),
            Err(e) => {
                warn!("Traffic prediction failed: {}", e);
                TrafficEstimate::Unavailable { reason: e.to_string() }
            }
        }
    }

    pub fn estimate_traffic_now(&self, summary: &RouteSummary) -> TrafficEstimate {
        self.estimate_traffic(summary, &Local::now().naive_local())
    }
}

fn validate_schema(artifact: &ModelArtifact, metadata: &ModelMetadata) -> Result<(), PredictionError> {
    let features = &artifact.features;
    if features != &metadata.features {
        return Err(PredictionError::SchemaMismatch(format!(
            "model features {:?} differ from metadata features {:?}",
            features, metadata.features
        )));
    }
    if let Some(unknown) = features.iter().find(|f| !is_known_feature(f)) {
        return Err(PredictionError::UnknownFeature(unknown.clone()));
    }
    if artifact.imputer.width() != features.len() {
        return Err(PredictionError::SchemaMismatch(format!(
            "imputer holds {} means for {} features",
            artifact.imputer.width(),
            features.len()
        )));
    }
    let regressor = &artifact.regressor;
    if regressor.n_features() != features.len() || !regressor.is_consistent() {
        return Err(PredictionError::SchemaMismatch(format!(
            "regressor expects {} features, schema has {}",
            regressor.n_features(),
            features.len()
        )));
    }
    Ok(())
}
