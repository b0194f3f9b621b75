// Artifact locations (relative to the working directory)
pub const DATA_PATH: &str = "model/traffic_data.csv";
pub const MODEL_PATH: &str = "model/traffic_model.json";
pub const METADATA_PATH: &str = "model/model_metadata.json";

// Service endpoints
pub const ROUTING_API_URL: &str = "https://api.openrouteservice.org/v2/directions";
pub const ROUTING_PROFILE: &str = "driving-car";
pub const WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Dataset schema
pub const TARGET_COLUMN: &str = "traffic_level";
pub const DATETIME_COLUMN: &str = "datetime";
pub const FEATURE_CANDIDATES: [&str; 6] = [
    "distance_km",
    "num_segments",
    "hour",
    "weekday",
    "temperature",
    "rain",
];
pub const MIN_FEATURE_COLUMNS: usize = 2;

// Training
pub const RANDOM_STATE: u64 = 42;
pub const TEST_SIZE: f64 = 0.2;
pub const CV_FOLDS: usize = 3;
pub const GRID_N_ESTIMATORS: [usize; 2] = [100, 200];
pub const GRID_LEARNING_RATE: [f64; 2] = [0.05, 0.1];
pub const GRID_MAX_DEPTH: [usize; 3] = [3, 5, 7];
pub const MODEL_TYPE: &str = "Gradient Boosted Tree Regressor";

// Live inference conditions. Not taken from the weather lookup.
pub const INFERENCE_TEMPERATURE: f64 = 30.0;
pub const INFERENCE_RAIN: f64 = 0.0;

// Traffic level bounds and duration inflation divisor
pub const MAX_TRAFFIC_LEVEL: u8 = 100;
pub const TRAFFIC_DELAY_DIVISOR: f64 = 200.0;

// Default map centre (Bengkulu), as (lat, lng)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (-3.7932, 102.2651);
