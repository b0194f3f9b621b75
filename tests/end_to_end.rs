use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use smart_route::artifact::ModelMetadata;
use smart_route::config::AppConfig;
use smart_route::error::{PredictionError, RouteError};
use smart_route::global_variables::FEATURE_CANDIDATES;
use smart_route::predictor::TrafficPredictor;
use smart_route::route_planner::RouteSession;
use smart_route::route_services::RouteProvider;
use smart_route::shared_data::{Coordinate, RoutePreference, RouteSegment, RouteSummary};
use smart_route::trainer::train_model;

const HEADER: &str = "distance_km,num_segments,hour,weekday,temperature,rain,traffic_level\n";

fn varied_rows(n: usize) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..n {
        let distance = 5.0 + (i % 6) as f64;
        let hour = (8 + i) % 24;
        let level = (distance * 5.0 + if (7..=9).contains(&hour) { 20.0 } else { 0.0 }).min(100.0);
        writeln!(csv, "{},{},{},{},30,0,{}", distance, 1 + i % 4, hour, i % 7, level).expect("write");
    }
    csv
}

fn constant_rows(n: usize, level: f64) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..n {
        writeln!(csv, "{},3,8,1,30,0,{}", 5.0 + (i % 3) as f64, level).expect("write");
    }
    csv
}

fn config_in(dir: &Path) -> AppConfig {
    AppConfig {
        data_path: dir.join("traffic_data.csv"),
        model_path: dir.join("traffic_model.json"),
        metadata_path: dir.join("model_metadata.json"),
        ..AppConfig::default()
    }
}

fn train_on(dir: &Path, csv: &str) -> TrafficPredictor {
    let config = config_in(dir);
    fs::write(&config.data_path, csv).expect("write dataset");
    train_model(&config).expect("train");
    TrafficPredictor::load(&config.model_path, &config.metadata_path).expect("load")
}

fn tuesday_eight_am() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid date")
}

fn five_km_route() -> RouteSummary {
    RouteSummary {
        distance_m: Some(5000.0),
        duration_s: Some(600.0),
        segments: Some(vec![RouteSegment::default(); 3]),
        geometry: Vec::new(),
    }
}

#[test]
fn training_writes_metadata_with_the_canonical_features() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    fs::write(&config.data_path, varied_rows(40)).expect("write dataset");

    let report = train_model(&config).expect("train");
    assert_eq!(report.n_test, 8);

    let metadata: ModelMetadata =
        serde_json::from_str(&fs::read_to_string(&config.metadata_path).expect("read")).expect("parse");
    assert_eq!(metadata.features, FEATURE_CANDIDATES.to_vec());
    assert_eq!(metadata.target, "traffic_level");
    assert!(metadata.rmse.is_finite());
    assert!(metadata.r2_score.is_finite());

    let predictor = TrafficPredictor::load(&config.model_path, &config.metadata_path).expect("load");
    let level = predictor.predict_traffic_level(&five_km_route(), &tuesday_eight_am());
    assert!(level.value() <= 100);
}

#[test]
fn prediction_above_one_hundred_is_clamped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = train_on(dir.path(), &constant_rows(20, 137.0));
    let level = predictor
        .try_predict_traffic_level(&five_km_route(), &tuesday_eight_am())
        .expect("predict");
    assert_eq!(level.value(), 100);
}

#[test]
fn negative_prediction_reports_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = train_on(dir.path(), &constant_rows(20, -12.0));
    assert_eq!(
        predictor.predict_traffic_level(&five_km_route(), &tuesday_eight_am()).value(),
        0
    );
}

#[test]
fn metadata_feature_mismatch_fails_at_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    fs::write(&config.data_path, varied_rows(20)).expect("write dataset");
    train_model(&config).expect("train");

    let mut metadata: Value =
        serde_json::from_str(&fs::read_to_string(&config.metadata_path).expect("read")).expect("parse");
    metadata["features"] = json!(["distance_km", "hour"]);
    fs::write(&config.metadata_path, metadata.to_string()).expect("write");

    assert!(matches!(
        TrafficPredictor::load(&config.model_path, &config.metadata_path),
        Err(PredictionError::SchemaMismatch(_))
    ));
}

/// Serves canned routes; the shortest route is longer and slower.
struct FakeProvider {
    fail: Option<RoutePreference>,
}

#[async_trait]
impl RouteProvider for FakeProvider {
    async fn get_route(
        &self,
        coords: &[Coordinate],
        preference: RoutePreference,
    ) -> Result<Value, RouteError> {
        if coords.len() < 2 {
            return Err(RouteError::InsufficientCoordinates(coords.len()));
        }
        if self.fail == Some(preference) {
            return Err(RouteError::MalformedResponse("no route found".into()));
        }
        let (distance, duration) = match preference {
            RoutePreference::Fastest => (5000.0, 600.0),
            RoutePreference::Shortest => (4200.0, 840.0),
        };
        let path: Vec<[f64; 2]> = coords.iter().map(Coordinate::as_lng_lat).collect();
        Ok(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "summary": {"distance": distance, "duration": duration},
                    "segments": [{"distance": distance, "duration": duration}]
                },
                "geometry": {"type": "LineString", "coordinates": path}
            }]
        }))
    }
}

fn ready_session() -> RouteSession {
    let mut session = RouteSession::new();
    session.add_point(Coordinate::new(102.2651, -3.7932));
    session.add_point(Coordinate::new(102.3, -3.8));
    session
}

#[tokio::test]
async fn search_keeps_fastest_and_shortest_distinct() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = train_on(dir.path(), &constant_rows(20, 50.0));
    let mut session = ready_session();

    let routes = session
        .search_routes(&FakeProvider { fail: None }, &predictor, &tuesday_eight_am())
        .await
        .expect("routes");

    assert_eq!(routes.fastest.preference, RoutePreference::Fastest);
    assert_eq!(routes.alternative.preference, RoutePreference::Shortest);
    assert_ne!(routes.fastest.summary, routes.alternative.summary);

    // Level 50 adds a quarter to each duration.
    assert_eq!(routes.fastest.base_duration, Some(600.0));
    assert_eq!(routes.fastest.adjusted_duration(), Some(750.0));
    assert_eq!(routes.alternative.adjusted_duration(), Some(1050.0));
    assert_eq!(
        routes.fastest.geojson["features"][0]["properties"]["summary"]["duration"],
        750.0
    );
}

#[tokio::test]
async fn failed_preference_stores_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = train_on(dir.path(), &constant_rows(20, 50.0));
    let mut session = ready_session();

    session
        .search_routes(&FakeProvider { fail: None }, &predictor, &tuesday_eight_am())
        .await
        .expect("first search");

    let result = session
        .search_routes(
            &FakeProvider {
                fail: Some(RoutePreference::Shortest),
            },
            &predictor,
            &tuesday_eight_am(),
        )
        .await;
    assert!(matches!(
        result,
        Err(RouteError::Preference { preference: "shortest", .. })
    ));
    assert!(session.routes().is_none());
}

#[tokio::test]
async fn search_needs_two_points() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = train_on(dir.path(), &constant_rows(20, 50.0));
    let mut session = RouteSession::new();
    session.add_point(Coordinate::new(102.2651, -3.7932));

    let result = session
        .search_routes(&FakeProvider { fail: None }, &predictor, &tuesday_eight_am())
        .await;
    assert!(matches!(result, Err(RouteError::InsufficientCoordinates(1))));
}
