use crate::adapters::wire::{parse_health, parse_prediction, PredictionRequest};
use crate::domain::model::{CustomerRecord, PredictionOutcome};
use crate::domain::ports::{ConfigProvider, PredictionClient};
use crate::utils::error::{ChurnError, PredictionError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";

/// 透過 HTTP POST 呼叫預測服務
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    endpoint: Url,
}

impl HttpPredictionClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        validate_url("endpoint", endpoint)?;
        let endpoint = Url::parse(endpoint).map_err(|e| ChurnError::InvalidConfigValueError {
            field: "endpoint".to_string(),
            value: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            tracing::debug!("Prediction requests time out after {:?}", timeout);
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ChurnError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        Self::with_client(client, config.prediction_endpoint())
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// 呼叫服務根路徑 `GET /`，回傳服務的狀態訊息
    pub async fn health(&self) -> std::result::Result<String, PredictionError> {
        let url = self
            .endpoint
            .join("/")
            .map_err(|e| PredictionError::decode(e.to_string()))?;

        tracing::debug!("Making health check request to: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PredictionError::transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| PredictionError::transport(&e))?;
        parse_health(&body)
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(
        &self,
        record: &CustomerRecord,
    ) -> std::result::Result<PredictionOutcome, PredictionError> {
        let payload = PredictionRequest::from_record(record);

        tracing::debug!(
            "Making prediction request to: {} ({} fields)",
            self.endpoint,
            payload.len()
        );
        // `.json()` 會加上 Content-Type: application/json
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| PredictionError::transport(&e))?;

        let status = response.status();
        tracing::debug!("Prediction response status: {}", status);
        if !status.is_success() {
            return Err(PredictionError::status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PredictionError::transport(&e))?;
        parse_prediction(&body)
    }
}
