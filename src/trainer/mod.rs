pub mod dataset;
pub mod metrics;
pub mod model_selection;
pub mod training_pipeline;

pub use dataset::HistoricalDataset;
pub use training_pipeline::{train_model, TrainedModel, TrainingPipeline, TrainingReport};
