#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::core::validation::ValidationPolicy;
use crate::domain::model::CustomerRecord;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::time::Duration;

/// 合併命令列與設定檔後的最終設定
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub policy: ValidationPolicy,
    /// 啟動時要填入的欄位
    pub record: CustomerRecord,
}

impl ConfigProvider for Settings {
    fn prediction_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn validation_policy(&self) -> ValidationPolicy {
        self.policy
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_url("endpoint", &self.endpoint)?;
        if let Some(timeout) = self.timeout {
            crate::utils::validation::validate_positive_number(
                "timeout_seconds",
                timeout.as_secs(),
                1,
            )?;
        }
        Ok(())
    }
}
