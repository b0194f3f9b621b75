// feature_builder.rs
//
// Turns a route summary and a wall-clock time into the fixed feature schema
// consumed by the regressor. Values the route does not carry are recorded as
// missing and left for the imputer.

use crate::error::PredictionError;
use crate::global_variables::{FEATURE_CANDIDATES, INFERENCE_RAIN, INFERENCE_TEMPERATURE};
use crate::shared_data::RouteSummary;
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Named feature values in canonical order. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: Vec<(String, Option<f64>)>,
}

impl FeatureRow {
    /// A row holding every canonical feature, all missing.
    pub fn empty() -> Self {
        Self {
            values: FEATURE_CANDIDATES
                .iter()
                .map(|name| (name.to_string(), None))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| *v)
    }

    pub fn set(&mut self, name: &str, value: Option<f64>) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// Reorders the row to `features`. Known features the row lacks come back
    /// as `None`; a name outside the canonical schema is an error.
    pub fn reindex(&self, features: &[String]) -> Result<Vec<Option<f64>>, PredictionError> {
        features
            .iter()
            .map(|name| {
                if !is_known_feature(name) {
                    return Err(PredictionError::UnknownFeature(name.clone()));
                }
                Ok(self.get(name))
            })
            .collect()
    }
}

pub fn is_known_feature(name: &str) -> bool {
    FEATURE_CANDIDATES.contains(&name)
}

/// Externally supplied conditions that the route itself does not describe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceConditions {
    pub temperature: Option<f64>,
    pub rain: Option<f64>,
}

impl InferenceConditions {
    /// The constant conditions used for live predictions.
    pub fn fixed() -> Self {
        Self {
            temperature: Some(INFERENCE_TEMPERATURE),
            rain: Some(INFERENCE_RAIN),
        }
    }
}

/// Hour of day (0–23) and weekday (Monday = 0) of a timestamp.
pub fn time_features(at: &NaiveDateTime) -> (f64, f64) {
    (at.hour() as f64, at.weekday().num_days_from_monday() as f64)
}

pub fn build_feature_row(
    summary: &RouteSummary,
    at: &NaiveDateTime,
    conditions: &InferenceConditions,
) -> FeatureRow {
    let (hour, weekday) = time_features(at);
    let mut row = FeatureRow::empty();
    row.set("distance_km", summary.distance_m.map(|m| m / 1000.0));
    row.set("num_segments", summary.num_segments().map(|n| n as f64));
    row.set("hour", Some(hour));
    row.set("weekday", Some(weekday));
    row.set("temperature", conditions.temperature);
    row.set("rain", conditions.rain);
    row
}
