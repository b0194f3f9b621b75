use crate::shared_data::TrafficEstimate;
use log::warn;
use serde_json::Value;

const ERROR_PLACEHOLDER: &str = "Error";

/// Display strings for one route's duration and distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMetrics {
    pub duration: String,
    pub distance: String,
}

impl RouteMetrics {
    /// Reads `features[0].properties.summary`. Absent values count as zero;
    /// a response without a first feature yields the "Error" placeholders.
    pub fn extract(route: &Value) -> Self {
        let Some(props) = route.pointer("/features/0/properties") else {
            warn!("Failed to extract route metrics: no route feature");
            return Self::error();
        };
        let summary = props.get("summary");
        let number = |key: &str| {
            summary
                .and_then(|s| s.get(key))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        Self {
            duration: format!("{:.1} min", number("duration") / 60.0),
            distance: format!("{:.2} km", number("distance") / 1000.0),
        }
    }

    pub fn error() -> Self {
        Self {
            duration: ERROR_PLACEHOLDER.to_string(),
            distance: ERROR_PLACEHOLDER.to_string(),
        }
    }

    /// Appends the traffic annotation to the duration column. A missing
    /// prediction is marked as such rather than shown as a plain 0%.
    pub fn with_traffic(mut self, traffic: &TrafficEstimate) -> Self {
        self.duration = format!("{} (Traffic: {})", self.duration, traffic);
        self
    }
}
