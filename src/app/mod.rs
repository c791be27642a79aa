//! Wires configuration into a concrete batch run.

use crate::adapters::input::{CsvSource, VecSource};
use crate::adapters::store::{ConfiguredStore, JsonLinesStore, MemoryStore};
use crate::config::cli::LocalStorage;
use crate::config::{DispatchMode, EtlConfig, StoreBackend};
use crate::core::dispatch::{DirectDispatcher, NarratedDispatcher, ToolTranscriptNarrator};
use crate::core::orchestrator::BatchOrchestrator;
use crate::core::persister::Persister;
use crate::core::{BatchReport, Dispatcher, RecordSource};
use crate::utils::error::Result;
use std::time::Instant;

/// Opens the configured store once for the whole run.
pub async fn build_store(config: &EtlConfig) -> Result<ConfiguredStore> {
    let store = &config.store;
    match store.backend {
        StoreBackend::Memory => Ok(ConfiguredStore::Memory(MemoryStore::new())),
        StoreBackend::Jsonl => Ok(ConfiguredStore::JsonLines(JsonLinesStore::open(
            &store.output_path,
        )?)),
        #[cfg(feature = "aws")]
        StoreBackend::Dynamodb => Ok(ConfiguredStore::DynamoDb(
            crate::adapters::dynamodb::DynamoDbStore::connect(
                &store.region,
                store.endpoint_url.as_deref(),
                store.table.clone(),
                store.key_attribute.clone(),
            )
            .await,
        )),
        #[cfg(not(feature = "aws"))]
        StoreBackend::Dynamodb => Err(crate::utils::error::EtlError::ConfigError {
            message: "dynamodb backend requires the `aws` feature".to_string(),
        }),
    }
}

/// Reads the input before opening the store, so a missing input file
/// leaves no trace in the store.
pub async fn run_batch(config: &EtlConfig) -> Result<BatchReport> {
    let started = Instant::now();
    let records = CsvSource::new(LocalStorage::new(".".to_string()), config.input.path.clone())
        .with_window(config.input.window)
        .load()
        .await?;

    let store = build_store(config).await?;
    let persister = Persister::new(store, config.store.key_scheme);
    let source = VecSource::new(records);

    match config.dispatch.mode {
        DispatchMode::Direct => {
            run_with(source, DirectDispatcher::new(persister), config, started).await
        }
        DispatchMode::Narrated => {
            let narrator = ToolTranscriptNarrator::new(config.store.table.clone());
            run_with(
                source,
                NarratedDispatcher::new(narrator, persister),
                config,
                started,
            )
            .await
        }
    }
}

async fn run_with<D: Dispatcher>(
    source: VecSource,
    dispatcher: D,
    config: &EtlConfig,
    started: Instant,
) -> Result<BatchReport> {
    BatchOrchestrator::new(source, dispatcher)
        .with_window(config.input.window)
        .started_at(started)
        .run()
        .await
}
