// session.rs
//
// Per-user planning state: the chosen endpoints and the last pair of
// computed routes. A search either stores both routes or nothing.

use crate::error::RouteError;
use crate::predictor::{adjust_duration, adjust_geojson_duration, TrafficPredictor};
use crate::route_services::{parse_route_summary, RouteProvider};
use crate::shared_data::{Coordinate, RoutePreference, RouteSummary, TrafficEstimate};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde_json::Value;

/// One computed route after traffic adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub preference: RoutePreference,
    /// Routing response with `summary.duration` already adjusted.
    pub geojson: Value,
    pub summary: RouteSummary,
    pub base_duration: Option<f64>,
    pub traffic: TrafficEstimate,
}

impl PlannedRoute {
    fn plan(
        preference: RoutePreference,
        mut geojson: Value,
        predictor: &TrafficPredictor,
        at: &NaiveDateTime,
    ) -> Result<Self, RouteError> {
        let mut summary = parse_route_summary(&geojson)?;
        let traffic = predictor.estimate_traffic(&summary, at);
        let base_duration = summary.duration_s;

        match base_duration {
            Some(base) => {
                summary.duration_s = Some(adjust_duration(base, traffic.level()));
                adjust_geojson_duration(&mut geojson, traffic.level());
            }
            None => warn!("{} route has no duration, leaving it unadjusted", preference.label()),
        }

        Ok(Self {
            preference,
            geojson,
            summary,
            base_duration,
            traffic,
        })
    }

    pub fn label(&self) -> &'static str {
        self.preference.label()
    }

    pub fn adjusted_duration(&self) -> Option<f64> {
        self.summary.duration_s
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteComparison {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub fastest: PlannedRoute,
    pub alternative: PlannedRoute,
}

impl RouteComparison {
    pub fn route(&self, preference: RoutePreference) -> &PlannedRoute {
        match preference {
            RoutePreference::Fastest => &self.fastest,
            RoutePreference::Shortest => &self.alternative,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteSession {
    points: Vec<Coordinate>,
    routes: Option<RouteComparison>,
}

impl RouteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint. Returns false once origin and destination are set.
    pub fn add_point(&mut self, point: Coordinate) -> bool {
        if self.points.len() >= 2 {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.routes = None;
    }

    pub fn is_ready(&self) -> bool {
        self.points.len() == 2
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn routes(&self) -> Option<&RouteComparison> {
        self.routes.as_ref()
    }

    /// Requests the fastest and shortest routes, predicts traffic on each and
    /// inflates their durations. The previous result is cleared first and is
    /// only replaced when both routes succeed.
    pub async fn search_routes(
        &mut self,
        provider: &dyn RouteProvider,
        predictor: &TrafficPredictor,
        at: &NaiveDateTime,
    ) -> Result<&RouteComparison, RouteError> {
        self.routes = None;
        if !self.is_ready() {
            return Err(RouteError::InsufficientCoordinates(self.points.len()));
        }
        let coords = self.points.clone();

        let (fastest, shortest) = tokio::join!(
            provider.get_route(&coords, RoutePreference::Fastest),
            provider.get_route(&coords, RoutePreference::Shortest)
        );
        let fastest = fastest
            .and_then(|geojson| PlannedRoute::plan(RoutePreference::Fastest, geojson, predictor, at))
            .map_err(|e| with_preference(e, RoutePreference::Fastest))?;
        let alternative = shortest
            .and_then(|geojson| PlannedRoute::plan(RoutePreference::Shortest, geojson, predictor, at))
            .map_err(|e| with_preference(e, RoutePreference::Shortest))?;

        info!(
            "Routes found: fastest traffic {}, alternative traffic {}",
            fastest.traffic, alternative.traffic
        );
        Ok(&*self.routes.insert(RouteComparison {
            origin: coords[0],
            destination: coords[1],
            fastest,
            alternative,
        }))
    }
}

fn with_preference(source: RouteError, preference: RoutePreference) -> RouteError {
    RouteError::Preference {
        preference: preference.as_api_str(),
        source: Box::new(source),
    }
}
