use crate::core::validation::ValidationPolicy;
use crate::domain::model::{CustomerRecord, PredictionOutcome};
use crate::utils::error::PredictionError;
use async_trait::async_trait;
use std::time::Duration;

/// 預測服務的呼叫介面。每次呼叫只發出一個外部請求，不重試也不快取。
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(
        &self,
        record: &CustomerRecord,
    ) -> std::result::Result<PredictionOutcome, PredictionError>;
}

#[async_trait]
impl<T: PredictionClient + ?Sized> PredictionClient for std::sync::Arc<T> {
    async fn predict(
        &self,
        record: &CustomerRecord,
    ) -> std::result::Result<PredictionOutcome, PredictionError> {
        (**self).predict(record).await
    }
}

pub trait ConfigProvider: Send + Sync {
    fn prediction_endpoint(&self) -> &str;
    /// `None` 代表不設逾時
    fn request_timeout(&self) -> Option<Duration>;
    fn validation_policy(&self) -> ValidationPolicy;
}
