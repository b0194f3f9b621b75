// routing_client.rs
//
// OpenRouteService directions client. Responses are kept as raw GeoJSON so
// the planner can export them unchanged; `parse_route_summary` pulls out the
// fields the predictor needs.

use crate::error::RouteError;
use crate::global_variables::{HTTP_TIMEOUT_SECS, ROUTING_API_URL, ROUTING_PROFILE};
use crate::shared_data::{Coordinate, RoutePreference, RouteSegment, RouteSummary};
use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Anything that can compute a route between coordinates.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn get_route(
        &self,
        coords: &[Coordinate],
        preference: RoutePreference,
    ) -> Result<Value, RouteError>;
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
    preference: &'static str,
    instructions: bool,
}

pub struct OrsRoutingClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OrsRoutingClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, RouteError> {
        Self::with_base_url(api_key, ROUTING_API_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, RouteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    fn directions_url(&self) -> String {
        format!(
            "{}/{}/geojson",
            self.base_url.trim_end_matches('/'),
            ROUTING_PROFILE
        )
    }

    async fn request(&self, coords: &[Coordinate], preference: RoutePreference) -> Result<Value, RouteError> {
        let body = DirectionsRequest {
            coordinates: coords.iter().map(Coordinate::as_lng_lat).collect(),
            preference: preference.as_api_str(),
            instructions: false,
        };

        let response = self
            .client
            .post(self.directions_url())
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RouteError::Service {
                status: status.as_u16(),
                message: service_message(&text),
            });
        }

        let geojson: Value = response.json().await?;
        if geojson.pointer("/features/0").is_none() {
            return Err(RouteError::MalformedResponse("no features in response".into()));
        }
        Ok(geojson)
    }
}

#[async_trait]
impl RouteProvider for OrsRoutingClient {
    async fn get_route(
        &self,
        coords: &[Coordinate],
        preference: RoutePreference,
    ) -> Result<Value, RouteError> {
        if coords.len() < 2 {
            return Err(RouteError::InsufficientCoordinates(coords.len()));
        }
        info!("Requesting route with preference '{}'", preference.as_api_str());
        self.request(coords, preference).await.map_err(|e| {
            error!("Route request failed: {}", e);
            e
        })
    }
}

/// Extracts the service's own error message from an error body, falling back
/// to the raw text.
fn service_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .or_else(|| v.get("message"))
        })
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Reads distance, duration, segments and geometry of the first route
/// feature. Missing fields stay `None`; a response without any feature is an
/// error.
pub fn parse_route_summary(geojson: &Value) -> Result<RouteSummary, RouteError> {
    let feature = geojson
        .pointer("/features/0")
        .ok_or_else(|| RouteError::MalformedResponse("no features in response".into()))?;
    let summary = feature.pointer("/properties/summary");
    let number = |key: &str| summary.and_then(|s| s.get(key)).and_then(Value::as_f64);

    let segments = feature
        .pointer("/properties/segments")
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .map(|s| RouteSegment {
                    distance_m: s.get("distance").and_then(Value::as_f64),
                    duration_s: s.get("duration").and_then(Value::as_f64),
                })
                .collect()
        });

    let geometry = feature
        .pointer("/geometry/coordinates")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter_map(|p| {
                    let lng = p.get(0)?.as_f64()?;
                    let lat = p.get(1)?.as_f64()?;
                    Some(Coordinate::new(lng, lat))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RouteSummary {
        distance_m: number("distance"),
        duration_s: number("duration"),
        segments,
        geometry,
    })
}
