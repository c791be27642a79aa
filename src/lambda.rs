#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::Deserialize;
#[cfg(feature = "lambda")]
use validate_etl::adapters::dynamodb::DynamoDbStore;
#[cfg(feature = "lambda")]
use std::time::Instant;
#[cfg(feature = "lambda")]
use validate_etl::adapters::input::{CsvSource, VecSource};
#[cfg(feature = "lambda")]
use validate_etl::core::RecordSource;
#[cfg(feature = "lambda")]
use validate_etl::core::dispatch::DirectDispatcher;
#[cfg(feature = "lambda")]
use validate_etl::core::reporter;
#[cfg(feature = "lambda")]
use validate_etl::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use validate_etl::{BatchOrchestrator, LambdaConfig, Persister, ResponsePayload, S3Storage};

#[cfg(feature = "lambda")]
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct Request {
    pub input_bucket: Option<String>,
    pub input_key: Option<String>,
    pub table: Option<String>,
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<ResponsePayload, Error> {
    tracing::info!("Starting validate-etl Lambda function");

    let mut config = LambdaConfig::from_env()?;

    if let Some(bucket) = event.payload.input_bucket {
        config.input_bucket = bucket;
    }
    if let Some(key) = event.payload.input_key {
        config.input_key = key;
    }
    if let Some(table) = event.payload.table {
        config.table = table;
    }
    config.validate()?;

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let s3_client = S3Client::new(&shared);

    let started = Instant::now();
    let records = CsvSource::new(
        S3Storage::new(s3_client, config.input_bucket.clone()),
        config.input_key.clone(),
    )
    .with_window(config.window)
    .load()
    .await?;

    let store = DynamoDbStore::connect(
        &config.region,
        None,
        config.table.clone(),
        config.key_attribute.clone(),
    )
    .await;
    let dispatcher = DirectDispatcher::new(Persister::new(store, config.key_scheme));

    let report = BatchOrchestrator::new(VecSource::new(records), dispatcher)
        .with_window(config.window)
        .started_at(started)
        .run()
        .await?;

    tracing::info!("validate-etl Lambda function completed");
    Ok(reporter::format(&report)?)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_json_logger();
    run(service_fn(function_handler)).await
}
