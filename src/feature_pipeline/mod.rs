pub mod feature_builder;
pub mod imputer;

pub use feature_builder::{build_feature_row, is_known_feature, time_features, FeatureRow, InferenceConditions};
pub use imputer::MeanImputer;
