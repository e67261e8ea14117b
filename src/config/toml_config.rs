use crate::adapters::http::DEFAULT_ENDPOINT;
use crate::core::validation::ValidationPolicy;
use crate::domain::model::{CustomerRecord, FieldId};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ChurnError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    /// 欄位名稱 → 值，名稱可用 wire key 或 snake_case
    #[serde(default)]
    pub customer: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub policy: Option<ValidationPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ChurnError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ChurnError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CHURN_API_HOST})，未設定的變數回傳 MissingConfigError
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ChurnError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let mut unset: Option<String> = None;
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    unset.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = unset {
            tracing::warn!("Environment variable {} is not set", var_name);
            return Err(ChurnError::MissingConfigError {
                field: format!("${{{}}}", var_name),
            });
        }

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(endpoint) = &self.service.endpoint {
            crate::utils::validation::validate_url("service.endpoint", endpoint)?;
        }

        if let Some(timeout) = self.service.timeout_seconds {
            crate::utils::validation::validate_positive_number(
                "service.timeout_seconds",
                timeout,
                1,
            )?;
        }

        // 欄位名稱與值的型別在這裡就檢查，避免送出時才發現
        self.customer_record().map(|_| ())
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.validation.policy.unwrap_or_default()
    }

    /// 把 `[customer]` 表轉成客戶紀錄；數字會轉成字串
    pub fn customer_record(&self) -> Result<CustomerRecord> {
        let mut record = CustomerRecord::new();
        for (name, value) in &self.customer {
            let field: FieldId = name.parse()?;
            let text = match value {
                toml::Value::String(text) => text.clone(),
                toml::Value::Integer(number) => number.to_string(),
                toml::Value::Float(number) => number.to_string(),
                other => {
                    return Err(ChurnError::InvalidFieldValue {
                        field,
                        value: other.to_string(),
                        reason: "expected a string or a number".to_string(),
                    })
                }
            };
            record.set(field, text);
        }
        Ok(record)
    }
}

impl ConfigProvider for TomlConfig {
    fn prediction_endpoint(&self) -> &str {
        self.service.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.service.timeout_seconds.map(Duration::from_secs)
    }

    fn validation_policy(&self) -> ValidationPolicy {
        self.policy()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
