use crate::global_variables::TRAFFIC_DELAY_DIVISOR;
use crate::shared_data::TrafficLevel;
use log::warn;
use serde_json::Value;

/// Inflates a travel time by half the traffic percentage: level 100 adds 50%.
pub fn adjust_duration(base_seconds: f64, level: TrafficLevel) -> f64 {
    base_seconds + base_seconds * level.value() as f64 / TRAFFIC_DELAY_DIVISOR
}

/// Rewrites `features[0].properties.summary.duration` of a routing GeoJSON
/// response. Returns the adjusted duration, or `None` if the route carries
/// no duration.
pub fn adjust_geojson_duration(geojson: &mut Value, level: TrafficLevel) -> Option<f64> {
    let duration = geojson
        .pointer_mut("/features/0/properties/summary/duration")
        .filter(|d| d.is_number());
    let Some(duration) = duration else {
        warn!("Route has no duration to adjust");
        return None;
    };
    let adjusted = adjust_duration(duration.as_f64()?, level);
    *duration = Value::from(adjusted);
    Some(adjusted)
}
