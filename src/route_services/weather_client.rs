// weather_client.rs
//
// OpenWeatherMap current-weather lookup. Shown next to the route results
// only; live predictions do not use it.

use crate::error::WeatherError;
use crate::global_variables::{HTTP_TIMEOUT_SECS, WEATHER_API_URL};
use crate::shared_data::Coordinate;
use log::warn;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConditions {
    pub city: String,
    pub description: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReport {
    Conditions(WeatherConditions),
    Unavailable { message: String },
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WeatherReport::Conditions(c) => write!(
                f,
                "{}: {}, {}°C, humidity {}%, wind {} m/s",
                c.city, c.description, c.temperature_c, c.humidity_pct, c.wind_speed_ms
            ),
            WeatherReport::Unavailable { message } => write!(f, "Weather unavailable: {}", message),
        }
    }
}

pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: WEATHER_API_URL.to_string(),
        })
    }

    /// Never fails; errors are logged and returned as `Unavailable`.
    pub async fn get_weather(&self, at: &Coordinate) -> WeatherReport {
        match self.try_get_weather(at).await {
            Ok(conditions) => WeatherReport::Conditions(conditions),
            Err(e) => {
                warn!("Weather lookup failed: {}", e);
                WeatherReport::Unavailable { message: e.to_string() }
            }
        }
    }

    pub async fn try_get_weather(&self, at: &Coordinate) -> Result<WeatherConditions, WeatherError> {
        let lat = at.lat.to_string();
        let lon = at.lng.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WeatherError::Service(service_message(status, &text)));
        }
        let body: Value = response.json().await?;
        parse_weather(&body)
    }
}

/// The service's own `message` when the error body is JSON, otherwise the
/// HTTP status.
fn service_message(status: StatusCode, text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("weather service returned {}", status))
}

pub fn parse_weather(body: &Value) -> Result<WeatherConditions, WeatherError> {
    let field = |pointer: &str| {
        body.pointer(pointer)
            .and_then(Value::as_f64)
            .ok_or_else(|| WeatherError::MalformedResponse(format!("missing {}", pointer)))
    };
    let description = body
        .pointer("/weather/0/description")
        .and_then(Value::as_str)
        .ok_or_else(|| WeatherError::MalformedResponse("missing /weather/0/description".into()))?;

    Ok(WeatherConditions {
        city: body
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or("-")
            .to_string(),
        description: capitalize(description),
        temperature_c: field("/main/temp")?,
        humidity_pct: field("/main/humidity")?,
        wind_speed_ms: field("/wind/speed")?,
    })
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
