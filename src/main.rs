use churn_predict::domain::ports::ConfigProvider;
use churn_predict::utils::error::ErrorSeverity;
use churn_predict::utils::logger;
use churn_predict::{
    ChurnError, CliConfig, HttpPredictionClient, PredictionOutcome, Settlement,
    SubmissionController,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting churn-predict CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    let client = match HttpPredictionClient::from_config(&settings) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };

    if cli.health_check {
        match client.health().await {
            Ok(message) => {
                println!("✅ {} is up: {}", client.endpoint(), message);
                return Ok(());
            }
            Err(e) => exit_with(&ChurnError::from(e)),
        }
    }

    let controller =
        SubmissionController::with_policy(client, settings.validation_policy());
    for (field, value) in settings.record.iter() {
        if let Some(value) = value {
            controller.set_field(field, value);
        }
    }

    match controller.submit().await {
        Ok(Settlement::Predicted(outcome)) => {
            println!("🔮 {}", outcome.label);
            if !outcome.confidence.is_empty() {
                println!("📊 {}", outcome.confidence);
            }
            Ok(())
        }
        Ok(Settlement::Failed(err)) => {
            println!("❌ {}", PredictionOutcome::unavailable().label);
            exit_with(&ChurnError::from(err))
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &ChurnError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    if let ChurnError::Prediction(inner) = e {
        tracing::error!("Cause: {}", inner.cause());
    }

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
