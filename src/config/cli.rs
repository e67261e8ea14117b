use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::core::validation::ValidationPolicy;
use crate::domain::model::FieldId;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "churn-predict")]
#[command(about = "Submit a customer record to the churn prediction service")]
pub struct CliConfig {
    /// Prediction endpoint (overrides the config file)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set a customer field, e.g. --set tenure=12 --set Contract="One year"
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(FieldId, String)>,

    /// Refuse to submit records with missing or malformed fields
    #[arg(long)]
    pub strict: bool,

    /// Request deadline in seconds (no deadline by default)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Only check that the prediction service is up
    #[arg(long)]
    pub health_check: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

fn parse_assignment(raw: &str) -> std::result::Result<(FieldId, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    let field: FieldId = name.parse().map_err(|e| format!("{}", e))?;
    Ok((field, value.to_string()))
}

impl CliConfig {
    /// 命令列 > 設定檔 > 預設值
    pub fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                file
            }
            None => TomlConfig::default(),
        };

        let mut record = file.customer_record()?;
        for (field, value) in &self.assignments {
            record.set(*field, value.clone());
        }

        let policy = if self.strict {
            ValidationPolicy::Strict
        } else {
            file.validation_policy()
        };

        let settings = Settings {
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| file.prediction_endpoint().to_string()),
            timeout: self
                .timeout_seconds
                .map(Duration::from_secs)
                .or_else(|| file.request_timeout()),
            policy,
            record,
        };
        settings.validate()?;
        Ok(settings)
    }
}
