// src/shared_data.rs

use crate::global_variables::MAX_TRAFFIC_LEVEL;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the map, stored in routing-service order (longitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn as_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Parses user input of the form `lng,lat`.
    pub fn parse(input: &str) -> Option<Self> {
        let (lng, lat) = input.trim().split_once(',')?;
        let lng = lng.trim().parse::<f64>().ok()?;
        let lat = lat.trim().parse::<f64>().ok()?;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some(Self { lng, lat })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lng, self.lat)
    }
}

/// Route preference passed to the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePreference {
    Fastest,
    Shortest,
}

impl RoutePreference {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            RoutePreference::Fastest => "fastest",
            RoutePreference::Shortest => "shortest",
        }
    }

    /// Label shown to the user for the route requested with this preference.
    pub fn label(&self) -> &'static str {
        match self {
            RoutePreference::Fastest => "Fastest",
            RoutePreference::Shortest => "Traffic-free alternative",
        }
    }
}

/// One leg of a computed route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSegment {
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

/// Distance, duration and path segmentation of a single computed route.
/// Fields the routing service did not report stay `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub segments: Option<Vec<RouteSegment>>,
    pub geometry: Vec<Coordinate>,
}

impl RouteSummary {
    pub fn num_segments(&self) -> Option<usize> {
        self.segments.as_ref().map(Vec::len)
    }
}

/// Predicted congestion severity, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TrafficLevel(u8);

impl TrafficLevel {
    pub const ZERO: TrafficLevel = TrafficLevel(0);

    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_TRAFFIC_LEVEL).then_some(Self(value))
    }

    /// Truncates a raw regressor output toward zero and clamps it to 0..=100.
    /// Returns `None` for NaN or infinite input.
    pub fn from_raw_prediction(raw: f64) -> Option<Self> {
        if !raw.is_finite() {
            return None;
        }
        let clamped = raw.trunc().clamp(0.0, MAX_TRAFFIC_LEVEL as f64);
        Some(Self(clamped as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / MAX_TRAFFIC_LEVEL as f64
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Outcome of a traffic prediction for one route. `Unavailable` is a
/// low-confidence default, not a measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum TrafficEstimate {
    Predicted(TrafficLevel),
    Unavailable { reason: String },
}

impl TrafficEstimate {
    /// Level used for duration adjustment; `Unavailable` counts as no congestion.
    pub fn level(&self) -> TrafficLevel {
        match self {
            TrafficEstimate::Predicted(level) => *level,
            TrafficEstimate::Unavailable { .. } => TrafficLevel::ZERO,
        }
    }

    pub fn is_predicted(&self) -> bool {
        matches!(self, TrafficEstimate::Predicted(_))
    }
}

impl fmt::Display for TrafficEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrafficEstimate::Predicted(level) => write!(f, "{}", level),
            TrafficEstimate::Unavailable { .. } => write!(f, "{} (no prediction)", TrafficLevel::ZERO),
        }
    }
}
