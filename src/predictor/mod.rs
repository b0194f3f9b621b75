pub mod duration_adjustment;
pub mod traffic_predictor;

pub use duration_adjustment::{adjust_duration, adjust_geojson_duration};
pub use traffic_predictor::TrafficPredictor;
