use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_test::assert_ok;
use validate_etl::adapters::input::{CsvSource, VecSource};
use validate_etl::adapters::store::MemoryStore;
use validate_etl::core::dispatch::{DirectDispatcher, NarratedDispatcher, ToolTranscriptNarrator};
use validate_etl::core::reporter;
use validate_etl::core::{DispatchOutcome, Dispatcher, RecordStore};
use validate_etl::utils::error::EtlError;
use validate_etl::{
    BatchOrchestrator, BatchReport, KeyScheme, LocalStorage, PersistError, Persister, Record,
    StoredItem,
};

/// Store that refuses writes for selected names.
#[derive(Clone, Default)]
struct FlakyStore {
    fail_names: HashSet<String>,
    written: Arc<Mutex<Vec<StoredItem>>>,
}

impl FlakyStore {
    fn failing_for(names: &[&str]) -> Self {
        Self {
            fail_names: names.iter().map(|n| n.to_string()).collect(),
            written: Arc::default(),
        }
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn put_item(&self, _key: &str, item: &StoredItem) -> Result<(), PersistError> {
        if self.fail_names.contains(&item.name) {
            return Err(PersistError::new("ThrottlingException: rate exceeded"));
        }
        self.written.lock().await.push(item.clone());
        Ok(())
    }
}

/// Dispatcher that errors out on one index and defers to another otherwise.
struct BrokenAt<D: Dispatcher> {
    index: usize,
    inner: D,
}

#[async_trait]
impl<D: Dispatcher> Dispatcher for BrokenAt<D> {
    async fn dispatch(&self, index: usize, record: &Record) -> validate_etl::Result<DispatchOutcome> {
        if index == self.index {
            return Err(EtlError::DispatchError {
                message: "collaborator timed out".to_string(),
            });
        }
        self.inner.dispatch(index, record).await
    }
}

fn person(i: usize) -> Record {
    Record::new()
        .with("name", format!("Person{}", i))
        .with("age", (20 + i).to_string())
        .with("city", "Reno")
}

fn people(n: usize) -> Vec<Record> {
    (0..n).map(person).collect()
}

fn assert_invariants(report: &BatchReport) {
    assert_eq!(
        report.valid_records() + report.invalid_records(),
        report.records_inspected()
    );
    assert!(report.records_written() <= report.valid_records());
    assert!(report.execution_time() >= 0.0);
}

#[tokio::test]
async fn test_all_valid_records_are_written() {
    let store = MemoryStore::new();
    let dispatcher = DirectDispatcher::new(Persister::new(store.clone(), KeyScheme::Content));
    let report = assert_ok!(
        BatchOrchestrator::new(VecSource::new(people(15)), dispatcher)
            .run()
            .await
    );

    assert_eq!(report.records_inspected(), 15);
    assert_eq!(report.valid_records(), 15);
    assert_eq!(report.invalid_records(), 0);
    assert_eq!(report.records_written(), 15);
    assert_eq!(store.items().await.len(), 15);
    assert_invariants(&report);
}

#[tokio::test]
async fn test_bad_age_is_counted_invalid() {
    let mut records = people(15);
    records[7] = records[7].clone().with("age", "notanumber");

    let store = MemoryStore::new();
    let dispatcher = DirectDispatcher::new(Persister::new(store.clone(), KeyScheme::Content));
    let report = BatchOrchestrator::new(VecSource::new(records), dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.invalid_records(), 1);
    assert_eq!(report.valid_records(), 14);
    assert_eq!(report.records_written(), 14);
    assert!(store
        .items()
        .await
        .iter()
        .all(|(_, item)| item.name != "Person7"));
    assert_invariants(&report);
}

#[tokio::test]
async fn test_store_failure_counts_valid_but_not_written() {
    let store = FlakyStore::failing_for(&["Person3"]);
    let dispatcher = DirectDispatcher::new(Persister::new(store.clone(), KeyScheme::Content));
    let report = BatchOrchestrator::new(VecSource::new(people(15)), dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.valid_records(), 15);
    assert_eq!(report.invalid_records(), 0);
    assert_eq!(report.records_written(), 14);
    assert_eq!(store.written.lock().await.len(), 14);
    assert_invariants(&report);
}

#[tokio::test]
async fn test_dispatch_failure_counts_invalid_and_batch_continues() {
    let store = MemoryStore::new();
    let dispatcher = BrokenAt {
        index: 2,
        inner: DirectDispatcher::new(Persister::new(store.clone(), KeyScheme::Content)),
    };
    let report = BatchOrchestrator::new(VecSource::new(people(5)), dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.records_inspected(), 5);
    assert_eq!(report.invalid_records(), 1);
    assert_eq!(report.records_written(), 4);
    assert_eq!(store.items().await.len(), 4);
    assert_invariants(&report);
}

#[tokio::test]
async fn test_fewer_records_than_window() {
    let dispatcher = DirectDispatcher::new(Persister::new(MemoryStore::new(), KeyScheme::Content));
    let report = BatchOrchestrator::new(VecSource::new(people(4)), dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.records_inspected(), 4);
    assert_invariants(&report);
}

#[tokio::test]
async fn test_empty_input() {
    let dispatcher = DirectDispatcher::new(Persister::new(MemoryStore::new(), KeyScheme::Content));
    let report = BatchOrchestrator::new(VecSource::new(Vec::new()), dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.records_inspected(), 0);
    assert_eq!(report.records_written(), 0);
}

#[tokio::test]
async fn test_orchestrator_keeps_most_recent_window() {
    let store = MemoryStore::new();
    let dispatcher = DirectDispatcher::new(Persister::new(store.clone(), KeyScheme::Content));
    let report = BatchOrchestrator::new(VecSource::new(people(20)), dispatcher)
        .with_window(15)
        .run()
        .await
        .unwrap();

    assert_eq!(report.records_inspected(), 15);
    let items = store.items().await;
    assert_eq!(items.first().map(|(_, i)| i.name.as_str()), Some("Person5"));
    assert_eq!(items.last().map(|(_, i)| i.name.as_str()), Some("Person19"));
}

#[tokio::test]
async fn test_narrated_dispatch_counts_like_direct() {
    let mut records = people(6);
    records[0] = records[0].clone().with("name", "   ");
    records[4] = records[4].clone().with("age", "30.5");

    let store = FlakyStore::failing_for(&["Person2"]);
    let dispatcher = NarratedDispatcher::new(
        ToolTranscriptNarrator::new("ETLDB"),
        Persister::new(store, KeyScheme::Content),
    );
    let report = BatchOrchestrator::new(VecSource::new(records), dispatcher)
        .run()
        .await
        .unwrap();

    assert_eq!(report.invalid_records(), 2);
    assert_eq!(report.valid_records(), 4);
    assert_eq!(report.records_written(), 3);
    assert_invariants(&report);
}

#[tokio::test]
async fn test_csv_file_to_response() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from("name,age,city\n");
    for i in 0..18 {
        let age = if i == 10 { "abc".to_string() } else { (30 + i).to_string() };
        writeln!(content, "Person{},{},Reno", i, age).unwrap();
    }
    std::fs::write(dir.path().join("test_data.csv"), content).unwrap();

    let source = CsvSource::new(
        LocalStorage::new(dir.path().to_str().unwrap().to_string()),
        "test_data.csv",
    );
    let dispatcher = DirectDispatcher::new(Persister::new(MemoryStore::new(), KeyScheme::Content));
    let report = BatchOrchestrator::new(source, dispatcher).run().await.unwrap();

    let payload = reporter::format(&report).unwrap();
    assert_eq!(payload.status_code, 200);

    let body: serde_json::Value = serde_json::from_str(&payload.body).unwrap();
    assert_eq!(body["message"], "Success");
    assert_eq!(body["data"]["records_inspected"], 15);
    assert_eq!(body["data"]["valid_records"], 14);
    assert_eq!(body["data"]["invalid_records"], 1);
    assert_eq!(body["data"]["records_written"], 14);
}

#[tokio::test]
async fn test_missing_input_aborts_before_dispatch() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let source = CsvSource::new(
        LocalStorage::new(dir.path().to_str().unwrap().to_string()),
        "missing.csv",
    );
    let dispatcher = DirectDispatcher::new(Persister::new(store.clone(), KeyScheme::Content));

    let err = BatchOrchestrator::new(source, dispatcher).run().await.unwrap_err();
    assert!(matches!(err, EtlError::InputLoadError { .. }));
    assert!(store.items().await.is_empty());
}
