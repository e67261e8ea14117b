use crate::domain::model::FieldId;
use thiserror::Error;

/// 預測請求失敗的底層原因，只用於日誌，不影響錯誤種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Transport(detail) => write!(f, "transport error: {}", detail),
            FailureCause::Status(code) => write!(f, "service responded with HTTP {}", code),
            FailureCause::Decode(detail) => write!(f, "response body is not JSON: {}", detail),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("Something went wrong with the API request")]
    RequestFailed { cause: FailureCause },
}

impl PredictionError {
    pub fn transport(err: &reqwest::Error) -> Self {
        PredictionError::RequestFailed {
            cause: FailureCause::Transport(err.to_string()),
        }
    }

    pub fn status(code: u16) -> Self {
        PredictionError::RequestFailed {
            cause: FailureCause::Status(code),
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        PredictionError::RequestFailed {
            cause: FailureCause::Decode(detail.into()),
        }
    }

    pub fn cause(&self) -> &FailureCause {
        match self {
            PredictionError::RequestFailed { cause } => cause,
        }
    }
}

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("A prediction request is already in flight")]
    SubmissionInFlight,

    #[error("Customer record is incomplete, missing: {}", join_fields(.missing))]
    IncompleteRecord { missing: Vec<FieldId> },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidFieldValue {
        field: FieldId,
        value: String,
        reason: String,
    },

    #[error("Unknown customer field: {name}")]
    UnknownField { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

fn join_fields(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(|f| f.wire_key())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ChurnError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChurnError::Prediction(_) | ChurnError::SubmissionInFlight => ErrorCategory::Network,
            ChurnError::IncompleteRecord { .. }
            | ChurnError::InvalidFieldValue { .. }
            | ChurnError::UnknownField { .. } => ErrorCategory::Input,
            ChurnError::ConfigError { .. }
            | ChurnError::MissingConfigError { .. }
            | ChurnError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ChurnError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChurnError::SubmissionInFlight => ErrorSeverity::Low,
            // 服務暫時不可用，可重試
            ChurnError::Prediction(_) => ErrorSeverity::Medium,
            ChurnError::IncompleteRecord { .. }
            | ChurnError::InvalidFieldValue { .. }
            | ChurnError::UnknownField { .. }
            | ChurnError::ConfigError { .. }
            | ChurnError::MissingConfigError { .. }
            | ChurnError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ChurnError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ChurnError::Prediction(_) => "Unable to get prediction".to_string(),
            ChurnError::SubmissionInFlight => {
                "A prediction is already being computed, please wait".to_string()
            }
            ChurnError::IncompleteRecord { missing } => format!(
                "{} customer field(s) still need a value: {}",
                missing.len(),
                join_fields(missing)
            ),
            ChurnError::InvalidFieldValue { field, value, .. } => {
                format!("'{}' is not a valid value for {}", value, field.wire_key())
            }
            ChurnError::UnknownField { name } => format!("'{}' is not a customer field", name),
            ChurnError::IoError(e) => format!("File access failed: {}", e),
            ChurnError::ConfigError { message } => format!("Configuration problem: {}", message),
            ChurnError::MissingConfigError { field } => {
                format!("Configuration value '{}' is not set", field)
            }
            ChurnError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ChurnError::Prediction(_) => {
                "Check that the prediction service is running and reachable, then retry".to_string()
            }
            ChurnError::SubmissionInFlight => {
                "Wait for the current prediction to settle before submitting again".to_string()
            }
            ChurnError::IncompleteRecord { .. } => {
                "Set the missing fields with --set FIELD=VALUE or in the [customer] table".to_string()
            }
            ChurnError::InvalidFieldValue { field, .. } => match field.kind().choices() {
                Some(choices) => format!("Use one of: {}", choices.join(", ")),
                None => "Use a non-negative number".to_string(),
            },
            ChurnError::UnknownField { .. } => format!(
                "Known fields: {}",
                join_fields(&FieldId::ALL)
            ),
            ChurnError::IoError(_) => "Check the file path and permissions".to_string(),
            ChurnError::MissingConfigError { field } => {
                format!("Export the environment variable referenced by {}", field)
            }
            ChurnError::ConfigError { .. }
            | ChurnError::InvalidConfigValueError { .. } => {
                "Review the command line flags and the TOML configuration file".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ChurnError>;
