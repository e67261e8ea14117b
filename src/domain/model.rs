use crate::utils::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const YES_NO: &[&str] = &["Yes", "No"];
const YES_NO_PHONE: &[&str] = &["Yes", "No", "No phone service"];
const YES_NO_INTERNET: &[&str] = &["Yes", "No", "No internet service"];

/// 欄位值的種類：列舉選項或非負數字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Choice(&'static [&'static str]),
    /// 非負整數 (月數)
    Count,
    /// 非負金額
    Amount,
}

impl FieldKind {
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match *self {
            FieldKind::Choice(choices) => Some(choices),
            FieldKind::Count | FieldKind::Amount => None,
        }
    }
}

/// 客戶紀錄的 19 個欄位，順序與預測服務的欄位順序一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldId {
    SeniorCitizen,
    MonthlyCharges,
    TotalCharges,
    Gender,
    Partner,
    Dependents,
    PhoneService,
    MultipleLines,
    InternetService,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTv,
    StreamingMovies,
    Contract,
    PaperlessBilling,
    PaymentMethod,
    Tenure,
}

impl FieldId {
    pub const ALL: [FieldId; 19] = [
        FieldId::SeniorCitizen,
        FieldId::MonthlyCharges,
        FieldId::TotalCharges,
        FieldId::Gender,
        FieldId::Partner,
        FieldId::Dependents,
        FieldId::PhoneService,
        FieldId::MultipleLines,
        FieldId::InternetService,
        FieldId::OnlineSecurity,
        FieldId::OnlineBackup,
        FieldId::DeviceProtection,
        FieldId::TechSupport,
        FieldId::StreamingTv,
        FieldId::StreamingMovies,
        FieldId::Contract,
        FieldId::PaperlessBilling,
        FieldId::PaymentMethod,
        FieldId::Tenure,
    ];

    /// 預測服務要求的 JSON key
    pub fn wire_key(self) -> &'static str {
        match self {
            FieldId::SeniorCitizen => "SeniorCitizen",
            FieldId::MonthlyCharges => "MonthlyCharges",
            FieldId::TotalCharges => "TotalCharges",
            FieldId::Gender => "gender",
            FieldId::Partner => "Partner",
            FieldId::Dependents => "Dependents",
            FieldId::PhoneService => "PhoneService",
            FieldId::MultipleLines => "MultipleLines",
            FieldId::InternetService => "InternetService",
            FieldId::OnlineSecurity => "OnlineSecurity",
            FieldId::OnlineBackup => "OnlineBackup",
            FieldId::DeviceProtection => "DeviceProtection",
            FieldId::TechSupport => "TechSupport",
            FieldId::StreamingTv => "StreamingTV",
            FieldId::StreamingMovies => "StreamingMovies",
            FieldId::Contract => "Contract",
            FieldId::PaperlessBilling => "PaperlessBilling",
            FieldId::PaymentMethod => "PaymentMethod",
            FieldId::Tenure => "tenure",
        }
    }

    /// 命令列與設定檔使用的 snake_case 名稱
    pub fn name(self) -> &'static str {
        match self {
            FieldId::SeniorCitizen => "senior_citizen",
            FieldId::MonthlyCharges => "monthly_charges",
            FieldId::TotalCharges => "total_charges",
            FieldId::Gender => "gender",
            FieldId::Partner => "partner",
            FieldId::Dependents => "dependents",
            FieldId::PhoneService => "phone_service",
            FieldId::MultipleLines => "multiple_lines",
            FieldId::InternetService => "internet_service",
            FieldId::OnlineSecurity => "online_security",
            FieldId::OnlineBackup => "online_backup",
            FieldId::DeviceProtection => "device_protection",
            FieldId::TechSupport => "tech_support",
            FieldId::StreamingTv => "streaming_tv",
            FieldId::StreamingMovies => "streaming_movies",
            FieldId::Contract => "contract",
            FieldId::PaperlessBilling => "paperless_billing",
            FieldId::PaymentMethod => "payment_method",
            FieldId::Tenure => "tenure",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::SeniorCitizen => FieldKind::Choice(&["0", "1"]),
            FieldId::Gender => FieldKind::Choice(&["Male", "Female"]),
            FieldId::Partner
            | FieldId::Dependents
            | FieldId::PhoneService
            | FieldId::PaperlessBilling => FieldKind::Choice(YES_NO),
            FieldId::MultipleLines => FieldKind::Choice(YES_NO_PHONE),
            FieldId::InternetService => FieldKind::Choice(&["DSL", "Fiber optic", "No"]),
            FieldId::OnlineSecurity
            | FieldId::OnlineBackup
            | FieldId::DeviceProtection
            | FieldId::TechSupport
            | FieldId::StreamingTv
            | FieldId::StreamingMovies => FieldKind::Choice(YES_NO_INTERNET),
            FieldId::Contract => FieldKind::Choice(&["Month-to-month", "One year", "Two year"]),
            FieldId::PaymentMethod => FieldKind::Choice(&[
                "Electronic check",
                "Mailed check",
                "Bank transfer (automatic)",
                "Credit card (automatic)",
            ]),
            FieldId::Tenure => FieldKind::Count,
            FieldId::MonthlyCharges | FieldId::TotalCharges => FieldKind::Amount,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

impl FromStr for FieldId {
    type Err = ChurnError;

    /// 接受 wire key、snake_case 或 camelCase，不分大小寫
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        FieldId::ALL
            .into_iter()
            .find(|field| field.wire_key().to_ascii_lowercase() == wanted)
            .ok_or_else(|| ChurnError::UnknownField {
                name: s.to_string(),
            })
    }
}

/// 單一客戶的屬性。未設定的欄位以 `None` 表示，與空字串不同。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    values: BTreeMap<FieldId, String>,
}

impl CustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 覆寫欄位值 (last-write-wins)
    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn unset(&mut self, field: FieldId) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn is_set(&self, field: FieldId) -> bool {
        self.values.contains_key(&field)
    }

    pub fn set_count(&self) -> usize {
        self.values.len()
    }

    /// 依欄位順序列出所有欄位及其值
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, Option<&str>)> + '_ {
        FieldId::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }
}

/// 預測服務回傳的結果，內容視為不透明的顯示文字
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub label: String,
    pub confidence: String,
}

impl PredictionOutcome {
    pub const ERROR_LABEL: &'static str = "Error: Unable to get prediction";

    pub fn new(label: impl Into<String>, confidence: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.into(),
        }
    }

    /// 請求失敗時顯示的固定結果
    pub fn unavailable() -> Self {
        Self::new(Self::ERROR_LABEL, "")
    }
}
