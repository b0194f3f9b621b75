pub mod route_metrics;
pub mod routing_client;
pub mod weather_client;

pub use route_metrics::RouteMetrics;
pub use routing_client::{parse_route_summary, OrsRoutingClient, RouteProvider};
pub use weather_client::{WeatherClient, WeatherConditions, WeatherReport};
