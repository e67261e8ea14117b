use anyhow::Result;
use churn_predict::{
    CustomerRecord, FieldId, HttpPredictionClient, PredictionError, Settlement,
    SubmissionController, SubmissionState,
};
use httpmock::prelude::*;
use std::time::Duration;

fn fill_complete_record<C: churn_predict::domain::ports::PredictionClient>(
    controller: &SubmissionController<C>,
) {
    let values = [
        (FieldId::SeniorCitizen, "0"),
        (FieldId::MonthlyCharges, "70.50"),
        (FieldId::TotalCharges, "846.00"),
        (FieldId::Gender, "Female"),
        (FieldId::Partner, "Yes"),
        (FieldId::Dependents, "No"),
        (FieldId::PhoneService, "Yes"),
        (FieldId::MultipleLines, "No"),
        (FieldId::InternetService, "Fiber optic"),
        (FieldId::OnlineSecurity, "No"),
        (FieldId::OnlineBackup, "No"),
        (FieldId::DeviceProtection, "No"),
        (FieldId::TechSupport, "No"),
        (FieldId::StreamingTv, "Yes"),
        (FieldId::StreamingMovies, "Yes"),
        (FieldId::Contract, "Month-to-month"),
        (FieldId::PaperlessBilling, "Yes"),
        (FieldId::PaymentMethod, "Electronic check"),
        (FieldId::Tenure, "12"),
    ];
    for (field, value) in values {
        controller.set_field(field, value);
    }
}

/// 完整紀錄送出後顯示服務回傳的結果
#[tokio::test]
async fn test_complete_record_settles_with_service_verdict() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/predict")
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "SeniorCitizen": "0",
                "MonthlyCharges": "70.50",
                "TotalCharges": "846.00",
                "gender": "Female",
                "Partner": "Yes",
                "Dependents": "No",
                "PhoneService": "Yes",
                "MultipleLines": "No",
                "InternetService": "Fiber optic",
                "OnlineSecurity": "No",
                "OnlineBackup": "No",
                "DeviceProtection": "No",
                "TechSupport": "No",
                "StreamingTV": "Yes",
                "StreamingMovies": "Yes",
                "Contract": "Month-to-month",
                "PaperlessBilling": "Yes",
                "PaymentMethod": "Electronic check",
                "tenure": "12"
            }));
        then.status(200)
            .json_body(serde_json::json!({"result": "Churn", "confidence": "0.82"}));
    });

    let client = HttpPredictionClient::new(&server.url("/predict"))?;
    let controller = SubmissionController::new(client);
    fill_complete_record(&controller);

    let settlement = controller.submit().await?;

    api_mock.assert();
    assert!(!settlement.is_failure());
    let outcome = controller.view().last_outcome.expect("outcome after settle");
    assert_eq!(outcome.label, "Churn");
    assert_eq!(outcome.confidence, "0.82");
    Ok(())
}

/// 服務無法連線時顯示固定的錯誤文字
#[tokio::test]
async fn test_unreachable_service_shows_placeholder() -> Result<()> {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };

    let client = HttpPredictionClient::new(&format!("http://127.0.0.1:{}/predict", port))?;
    let controller = SubmissionController::new(client);
    fill_complete_record(&controller);

    let settlement = controller.submit().await?;

    assert!(matches!(
        settlement,
        Settlement::Failed(PredictionError::RequestFailed { .. })
    ));
    let outcome = controller.view().last_outcome.expect("outcome after settle");
    assert_eq!(outcome.label, "Error: Unable to get prediction");
    assert_eq!(outcome.confidence, "");
    assert!(matches!(controller.state(), SubmissionState::Settled { .. }));
    Ok(())
}

/// HTTP 500 與無法連線的顯示結果相同
#[tokio::test]
async fn test_server_error_matches_unreachable_outcome() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/predict");
        then.status(500);
    });

    let client = HttpPredictionClient::new(&server.url("/predict"))?;
    let controller = SubmissionController::new(client);
    fill_complete_record(&controller);

    let settlement = controller.submit().await?;

    api_mock.assert();
    assert!(settlement.is_failure());
    assert_eq!(
        settlement.outcome(),
        churn_predict::PredictionOutcome::unavailable()
    );
    Ok(())
}

/// 全部未設定時仍送出 19 個空字串欄位
#[tokio::test]
async fn test_unset_record_sends_nineteen_empty_strings() -> Result<()> {
    let server = MockServer::start();
    let empty_body: serde_json::Map<String, serde_json::Value> = FieldId::ALL
        .iter()
        .map(|field| (field.wire_key().to_string(), serde_json::Value::from("")))
        .collect();

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/predict")
            .json_body(serde_json::Value::Object(empty_body));
        then.status(400)
            .json_body(serde_json::json!({"error": "Missing or invalid input"}));
    });

    let client = HttpPredictionClient::new(&server.url("/predict"))?;
    let controller = SubmissionController::new(client);
    assert_eq!(controller.record(), CustomerRecord::new());

    let settlement = controller.submit().await?;

    api_mock.assert();
    assert!(settlement.is_failure());
    Ok(())
}

/// 請求進行中再次送出不會產生第二個請求
#[tokio::test]
async fn test_concurrent_submit_is_single_flight() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/predict");
        then.status(200)
            .delay(Duration::from_millis(300))
            .json_body(serde_json::json!({"result": "Stay", "confidence": "0.10"}));
    });

    let client = HttpPredictionClient::new(&server.url("/predict"))?;
    let controller = SubmissionController::new(client);
    fill_complete_record(&controller);

    let (first, second) = tokio::join!(controller.submit(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.submit().await
    });

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(churn_predict::ChurnError::SubmissionInFlight)
    ));
    api_mock.assert_hits(1);

    // 結算後可以再次送出
    controller.submit().await?;
    api_mock.assert_hits(2);
    Ok(())
}

/// 呼叫端的期限到期後，控制器可以再次送出
#[tokio::test]
async fn test_submit_after_caller_deadline_reaches_service() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/predict");
        then.status(200)
            .delay(Duration::from_millis(300))
            .json_body(serde_json::json!({"result": "Churn", "confidence": "0.82"}));
    });

    let client = HttpPredictionClient::new(&server.url("/predict"))?;
    let controller = SubmissionController::new(client);
    fill_complete_record(&controller);

    let timed_out = tokio::time::timeout(Duration::from_millis(50), controller.submit()).await;
    assert!(timed_out.is_err());
    assert_eq!(controller.state(), SubmissionState::Idle);

    let settlement = controller.submit().await?;

    assert_eq!(settlement.outcome().label, "Churn");
    assert!(api_mock.hits() >= 2);
    Ok(())
}

/// 健康檢查呼叫服務根路徑
#[tokio::test]
async fn test_health_check_reads_service_message() -> Result<()> {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .json_body(serde_json::json!({"message": "Churn Prediction API is running!"}));
    });

    let client = HttpPredictionClient::new(&server.url("/predict"))?;
    let message = client.health().await?;

    health_mock.assert();
    assert_eq!(message, "Churn Prediction API is running!");
    Ok(())
}
