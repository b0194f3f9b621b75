use smart_route::config::AppConfig;
use smart_route::trainer::train_model;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

// Usage: train_model_main [data.csv] [model.json] [metadata.json]
fn main() -> ExitCode {
    env_logger::init();

    let mut config = AppConfig::from_env();
    let mut args = env::args().skip(1);
    if let Some(path) = args.next() {
        config.data_path = PathBuf::from(path);
    }
    if let Some(path) = args.next() {
        config.model_path = PathBuf::from(path);
    }
    if let Some(path) = args.next() {
        config.metadata_path = PathBuf::from(path);
    }

    match train_model(&config) {
        Ok(report) => {
            println!(
                "Trained on {} rows ({} held out). RMSE: {:.2}, R2: {:.2}",
                report.n_train, report.n_test, report.metadata.rmse, report.metadata.r2_score
            );
            println!("Best params: {:?}", report.metadata.params);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Training failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
