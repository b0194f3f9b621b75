use chrono::NaiveDate;
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};

use smart_route::artifact::{ModelArtifact, ModelMetadata};
use smart_route::feature_pipeline::MeanImputer;
use smart_route::global_variables::FEATURE_CANDIDATES;
use smart_route::predictor::TrafficPredictor;
use smart_route::regressor::{BoostingParams, GradientBoostingRegressor};
use smart_route::shared_data::{RouteSegment, RouteSummary};
use smart_route::trainer::model_selection::GridParams;

/// Fits a model on synthetic rows over the six canonical features.
fn build_predictor(n_estimators: usize) -> TrafficPredictor {
    let x: Vec<Vec<f64>> = (0..200)
        .map(|i| {
            vec![
                1.0 + (i % 15) as f64,
                (1 + i % 5) as f64,
                (i % 24) as f64,
                (i % 7) as f64,
                25.0 + (i % 8) as f64,
                (i % 2) as f64,
            ]
        })
        .collect();
    let y: Vec<f64> = x.iter().map(|r| (r[0] * 4.0 + r[2]).min(100.0)).collect();

    let params = BoostingParams::new(n_estimators, 0.1, 5);
    let mut regressor = GradientBoostingRegressor::new(params);
    regressor.fit(&x, &y).expect("fit");

    let features: Vec<String> = FEATURE_CANDIDATES.iter().map(|s| s.to_string()).collect();
    let artifact = ModelArtifact {
        features: features.clone(),
        imputer: MeanImputer::from_means(vec![8.0, 3.0, 11.5, 3.0, 28.5, 0.5]),
        regressor,
    };
    let metadata = ModelMetadata {
        timestamp: "2024-01-02T08:00:00.000000".into(),
        model_type: "Gradient Boosted Tree Regressor".into(),
        features,
        target: "traffic_level".into(),
        params: GridParams {
            learning_rate: 0.1,
            max_depth: 5,
            n_estimators,
        },
        rmse: 0.0,
        r2_score: 1.0,
    };
    TrafficPredictor::from_parts(artifact, metadata).expect("schema")
}

fn bench_predict(c: &mut Criterion) {
    let at = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid date");
    let route = RouteSummary {
        distance_m: Some(5000.0),
        duration_s: Some(600.0),
        segments: Some(vec![RouteSegment::default(); 3]),
        geometry: Vec::new(),
    };

    let mut group = c.benchmark_group("Predict_Traffic_Level");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    for &n_estimators in [100usize, 200].iter() {
        let predictor = build_predictor(n_estimators);
        group.bench_with_input(
            BenchmarkId::new("predict_traffic_level", n_estimators),
            &n_estimators,
            |b, &_n| {
                b.iter(|| black_box(predictor.predict_traffic_level(black_box(&route), &at)));
            },
        );
        // Missing distance and segments go through the imputer.
        let sparse = RouteSummary::default();
        group.bench_with_input(
            BenchmarkId::new("predict_with_imputation", n_estimators),
            &n_estimators,
            |b, &_n| {
                b.iter(|| black_box(predictor.predict_traffic_level(black_box(&sparse), &at)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
