use validate_etl::core::reporter;
use validate_etl::utils::error::ErrorSeverity;
use validate_etl::utils::{logger, validation::Validate};
use validate_etl::EtlConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let config = match EtlConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.logging.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.logging.verbose);
    }

    tracing::info!("Starting validate-etl");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match validate_etl::app::run_batch(&config).await {
        Ok(report) => {
            let payload = reporter::format(&report)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
