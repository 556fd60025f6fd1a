mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from filtersnap for tests
pub use filtersnap::config::AppConfig;
pub use filtersnap::db::{PredictionDb, PredictionRepository};
pub use filtersnap::detect::labels::ClassNames;
pub use filtersnap::detect::{PredictError, PredictService};
pub use filtersnap::storage::{FsObjectStore, ObjectStore};
pub use filtersnap::{Img, Label, PredictionSummary};
