use crate::core::{RecordStore, StoredItem};
use crate::utils::error::{EtlError, PersistError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps written items in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<Vec<(String, StoredItem)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn items(&self) -> Vec<(String, StoredItem)> {
        self.items.lock().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put_item(&self, key: &str, item: &StoredItem) -> std::result::Result<(), PersistError> {
        self.items.lock().await.push((key.to_string(), item.clone()));
        Ok(())
    }
}

#[derive(Serialize)]
struct KeyedItem<'a> {
    key: &'a str,
    #[serde(flatten)]
    item: &'a StoredItem,
}

/// Appends one JSON object per item to a local file.
///
/// The file is opened once for the run and flushed after every write.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: String,
    file: Mutex<File>,
}

impl JsonLinesStore {
    /// Opening failures surface as [`EtlError::PersistError`] and abort the run.
    pub fn open(path: &str) -> Result<Self> {
        let unavailable = |e: std::io::Error| {
            EtlError::from(PersistError::new(format!("Cannot open store {}: {}", path, e)))
        };

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(unavailable)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(unavailable)?;
        tracing::debug!("Opened JSON lines store at {}", path);
        Ok(Self {
            path: path.to_string(),
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl RecordStore for JsonLinesStore {
    async fn put_item(&self, key: &str, item: &StoredItem) -> std::result::Result<(), PersistError> {
        let mut line = serde_json::to_string(&KeyedItem { key, item })
            .map_err(|e| PersistError::new(format!("malformed item: {}", e)))?;
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| PersistError::new(format!("{}: {}", self.path, e)))
    }
}

/// Store chosen at runtime from configuration.
pub enum ConfiguredStore {
    Memory(MemoryStore),
    JsonLines(JsonLinesStore),
    #[cfg(feature = "aws")]
    DynamoDb(crate::adapters::dynamodb::DynamoDbStore),
}

#[async_trait]
impl RecordStore for ConfiguredStore {
    async fn put_item(&self, key: &str, item: &StoredItem) -> std::result::Result<(), PersistError> {
        match self {
            Self::Memory(store) => store.put_item(key, item).await,
            Self::JsonLines(store) => store.put_item(key, item).await,
            #[cfg(feature = "aws")]
            Self::DynamoDb(store) => store.put_item(key, item).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(name: &str, age: i64) -> StoredItem {
        StoredItem {
            name: name.to_string(),
            age,
            city: "Reno".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_keeps_order() {
        let store = MemoryStore::new();
        store.put_item("a", &item("A", 1)).await.unwrap();
        store.put_item("b", &item("B", 2)).await.unwrap();

        let items = store.items().await;
        assert_eq!(items[0].0, "a");
        assert_eq!(items[1].1.age, 2);
    }

    #[tokio::test]
    async fn test_json_lines_store_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("records.jsonl");
        let path = path.to_str().unwrap();

        let store = JsonLinesStore::open(path).unwrap();
        store.put_item("A#30#Reno", &item("A", 30)).await.unwrap();
        store.put_item("B#31#Reno", &item("B", 31)).await.unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["key"], "A#30#Reno");
        assert_eq!(lines[0]["age"], 30);
        assert_eq!(lines[1]["name"], "B");
    }

    #[test]
    fn test_json_lines_store_open_failure_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("records.jsonl");

        let err = JsonLinesStore::open(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, EtlError::PersistError(_)));
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Storage);
    }
}
