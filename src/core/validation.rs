use crate::domain::model::{CustomerRecord, FieldId, FieldKind};
use crate::utils::error::ChurnError;
use serde::{Deserialize, Serialize};

/// 送出前的檢查強度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// 只回報缺少的欄位，仍然送出；格式錯誤交給預測服務處理
    #[default]
    Permissive,
    /// 缺少或格式錯誤的欄位會阻止送出
    Strict,
}

impl std::str::FromStr for ValidationPolicy {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(ValidationPolicy::Permissive),
            "strict" => Ok(ValidationPolicy::Strict),
            other => Err(ChurnError::InvalidConfigValueError {
                field: "validation.policy".to_string(),
                value: other.to_string(),
                reason: "expected 'permissive' or 'strict'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: FieldId,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing: Vec<FieldId>,
    /// 僅在 Strict 模式下檢查
    pub malformed: Vec<FieldIssue>,
}

impl ValidationReport {
    /// 轉成錯誤，缺少欄位優先回報
    pub fn into_error(self) -> ChurnError {
        match self.malformed.into_iter().next() {
            Some(issue) if self.missing.is_empty() => ChurnError::InvalidFieldValue {
                field: issue.field,
                value: issue.value,
                reason: issue.reason,
            },
            _ => ChurnError::IncompleteRecord {
                missing: self.missing,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(ValidationReport),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn into_result(self) -> Result<(), ChurnError> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::Invalid(report) => Err(report.into_error()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine {
    policy: ValidationPolicy,
}

impl ValidationEngine {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// 檢查紀錄，不會修改紀錄本身
    pub fn check(&self, record: &CustomerRecord) -> Verdict {
        let mut report = ValidationReport::default();

        for (field, value) in record.iter() {
            match value {
                None => report.missing.push(field),
                Some(value) if self.policy == ValidationPolicy::Strict => {
                    if let Err(reason) = check_value(field, value) {
                        report.malformed.push(FieldIssue {
                            field,
                            value: value.to_string(),
                            reason,
                        });
                    }
                }
                Some(_) => {}
            }
        }

        if report.missing.is_empty() && report.malformed.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Invalid(report)
        }
    }
}

fn check_value(field: FieldId, value: &str) -> Result<(), String> {
    match field.kind() {
        FieldKind::Choice(choices) => {
            if choices.contains(&value) {
                Ok(())
            } else {
                Err(format!("expected one of: {}", choices.join(", ")))
            }
        }
        // 檢查的是實際送出的字串，不做 trim
        FieldKind::Count => {
            if !is_digits(value) {
                return Err("expected a non-negative whole number".to_string());
            }
            if value.parse::<u32>().map_or(true, |months| months > 72) {
                tracing::debug!("{} = {} is beyond the usual 72 months", field, value);
            }
            Ok(())
        }
        FieldKind::Amount => {
            let valid = match value.split_once('.') {
                Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
                None => is_digits(value),
            };
            if valid {
                Ok(())
            } else {
                Err("expected a non-negative amount such as 70.50".to_string())
            }
        }
    }
}

/// 非空且只含 ASCII 數字
fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
