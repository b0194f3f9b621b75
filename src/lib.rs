pub mod artifact;
pub mod config;
pub mod error;
pub mod feature_pipeline;
pub mod global_variables;
pub mod predictor;
pub mod regressor;
pub mod route_planner;
pub mod route_services;
pub mod shared_data;
pub mod trainer;
