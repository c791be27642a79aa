pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, EtlConfig};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use crate::core::orchestrator::BatchOrchestrator;
pub use crate::core::persister::{KeyScheme, Persister};
pub use domain::model::{BatchReport, Record, ResponsePayload, StoredItem, Verdict};
pub use utils::error::{EtlError, PersistError, Result};
