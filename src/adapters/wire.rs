use crate::domain::model::{CustomerRecord, FieldId, PredictionOutcome};
use crate::utils::error::PredictionError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// 預測服務的請求內容：19 個欄位，全部是字串。未設定的欄位送出空字串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    fields: Vec<(FieldId, String)>,
}

impl PredictionRequest {
    pub fn from_record(record: &CustomerRecord) -> Self {
        let fields = record
            .iter()
            .map(|(field, value)| (field, value.unwrap_or_default().to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for PredictionRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.wire_key(), value)?;
        }
        map.end()
    }
}

/// 解析成功回應。欄位缺少或型別不符都不算錯誤，只有非 JSON 的內容會失敗。
pub fn parse_prediction(body: &[u8]) -> Result<PredictionOutcome, PredictionError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| PredictionError::decode(e.to_string()))?;

    if let Some(error) = value.get("error") {
        tracing::warn!("Prediction service reported an error: {}", display_text(Some(error)));
    }
    if !value.is_object() {
        tracing::debug!("Prediction response is not a JSON object, using empty outcome");
    }

    Ok(PredictionOutcome::new(
        display_text(value.get("result")),
        display_text(value.get("confidence")),
    ))
}

/// 解析健康檢查回應中的 `message`
pub fn parse_health(body: &[u8]) -> Result<String, PredictionError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| PredictionError::decode(e.to_string()))?;
    Ok(display_text(value.get("message")))
}

fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FailureCause;

    const WIRE_KEYS: [&str; 19] = [
        "SeniorCitizen",
        "MonthlyCharges",
        "TotalCharges",
        "gender",
        "Partner",
        "Dependents",
        "PhoneService",
        "MultipleLines",
        "InternetService",
        "OnlineSecurity",
        "OnlineBackup",
        "DeviceProtection",
        "TechSupport",
        "StreamingTV",
        "StreamingMovies",
        "Contract",
        "PaperlessBilling",
        "PaymentMethod",
        "tenure",
    ];

    #[test]
    fn test_empty_record_serializes_all_keys_as_empty_strings() {
        let request = PredictionRequest::from_record(&CustomerRecord::new());
        let json = serde_json::to_value(&request).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 19);
        for key in WIRE_KEYS {
            assert_eq!(object.get(key), Some(&Value::String(String::new())), "{}", key);
        }
    }

    #[test]
    fn test_numbers_stay_strings() {
        let mut record = CustomerRecord::new();
        record.set(FieldId::Tenure, "12");
        record.set(FieldId::MonthlyCharges, "70.50");

        let request = PredictionRequest::from_record(&record);
        assert_eq!(request.get(FieldId::Tenure), Some("12"));
        assert_eq!(request.get(FieldId::Gender), Some(""));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tenure"], Value::String("12".to_string()));
        assert_eq!(json["MonthlyCharges"], Value::String("70.50".to_string()));
    }

    #[test]
    fn test_serialization_is_deterministic_and_ordered() {
        let mut record = CustomerRecord::new();
        record.set(FieldId::Gender, "Male");
        record.set(FieldId::PaymentMethod, "Mailed check");

        let first = serde_json::to_string(&PredictionRequest::from_record(&record)).unwrap();
        let second = serde_json::to_string(&PredictionRequest::from_record(&record)).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with(r#"{"SeniorCitizen":"","#));
        assert!(first.ends_with(r#""tenure":""}"#));
    }

    #[test]
    fn test_parse_prediction_reads_result_and_confidence() {
        let outcome = parse_prediction(br#"{"result":"Churn","confidence":"0.82"}"#).unwrap();
        assert_eq!(outcome, PredictionOutcome::new("Churn", "0.82"));
    }

    #[test]
    fn test_parse_prediction_is_lenient() {
        let outcome = parse_prediction(br#"{"success":true}"#).unwrap();
        assert_eq!(outcome, PredictionOutcome::default());

        let outcome = parse_prediction(br#"{"result":"Stay","confidence":0.12}"#).unwrap();
        assert_eq!(outcome.confidence, "0.12");

        let outcome = parse_prediction(b"[1, 2, 3]").unwrap();
        assert_eq!(outcome, PredictionOutcome::default());
    }

    #[test]
    fn test_parse_prediction_rejects_non_json() {
        let err = parse_prediction(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err.cause(), FailureCause::Decode(_)));

        let err = parse_prediction(b"").unwrap_err();
        assert!(matches!(err, PredictionError::RequestFailed { .. }));
    }

    #[test]
    fn test_parse_health_message() {
        let message = parse_health(br#"{"message":"Churn Prediction API is running!"}"#).unwrap();
        assert_eq!(message, "Churn Prediction API is running!");
    }
}
