pub mod config;
pub mod db;
pub mod detect;
pub mod imaging;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use config::AppConfig;
pub use detect::{PredictError, PredictService};
pub use imaging::{ConcatError, Direction, FilterError, Img};
pub use models::{Label, PredictionSummary};
pub use pipeline::{DebugConfig, FilterStep, Pipeline, PipelineContext};
pub use storage::{FsObjectStore, ObjectStore};
