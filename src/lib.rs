pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::{HttpPredictionClient, DEFAULT_ENDPOINT};
pub use config::{toml_config::TomlConfig, Settings};
pub use crate::core::controller::{Settlement, SubmissionController, SubmissionState, ViewState};
pub use crate::core::validation::{ValidationEngine, ValidationPolicy, Verdict};
pub use domain::model::{CustomerRecord, FieldId, PredictionOutcome};
pub use utils::error::{ChurnError, PredictionError, Result};
