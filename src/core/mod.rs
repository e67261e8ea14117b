pub mod controller;
pub mod validation;

pub use crate::domain::model::{CustomerRecord, FieldId, PredictionOutcome};
pub use crate::domain::ports::{ConfigProvider, PredictionClient};
pub use crate::utils::error::Result;
