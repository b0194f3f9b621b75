use smart_route::config::AppConfig;
use smart_route::predictor::TrafficPredictor;
use smart_route::route_planner::{run_cli, PlannerApp};
use smart_route::route_services::{OrsRoutingClient, WeatherClient};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = AppConfig::from_env();
    let predictor = TrafficPredictor::load(&config.model_path, &config.metadata_path)?;
    let routing = OrsRoutingClient::new(config.require_routing_key()?)?;
    let weather = match config.weather_api_key.as_deref() {
        Some(key) => Some(WeatherClient::new(key)?),
        None => {
            log::warn!("OPENWEATHER_API_KEY not set, weather lookups disabled");
            None
        }
    };

    let mut app = PlannerApp::new(Box::new(routing), predictor, weather);
    run_cli(&mut app).await;
    Ok(())
}
