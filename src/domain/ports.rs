use crate::domain::model::{DispatchOutcome, Record, StoredItem, Verdict};
use crate::utils::error::{PersistError, Result};
use async_trait::async_trait;

/// Raw byte access to wherever the input file lives.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Ordered, already-windowed input records.
pub trait RecordSource: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send;
}

/// Durable key-value store with a single put-style write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_item(&self, key: &str, item: &StoredItem) -> std::result::Result<(), PersistError>;
}

/// The two capability hooks a dispatch step may invoke.
#[async_trait]
pub trait RecordTools: Send + Sync {
    fn validate_record(&self, record: &Record) -> Verdict;
    async fn write_db(&self, record: &Record) -> std::result::Result<StoredItem, PersistError>;
}

/// One decision step per record.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, index: usize, record: &Record) -> Result<DispatchOutcome>;
}

/// Free-text collaborator that drives the tools and describes what it did.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, record: &Record, tools: &dyn RecordTools) -> Result<String>;
}
