use crate::core::validator::{self, parse_age};
use crate::domain::model::{Record, StoredItem, Verdict};
use crate::domain::ports::{RecordStore, RecordTools};
use crate::utils::error::PersistError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_KEY_ATTRIBUTE: &str = "record_key";

/// How the store key is derived from a persisted item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// `name#age#city` with `#` and `\` escaped in each part.
    /// Re-running a batch overwrites the same items.
    #[default]
    Content,
    /// `name#<run id>#<sequence>`. Every write gets a fresh key.
    Sequenced,
}

/// Writes valid records into a [`RecordStore`].
///
/// The caller gates on a `Valid` verdict; the persister does not validate
/// again but still re-parses `age` before writing.
pub struct Persister<S: RecordStore> {
    store: S,
    scheme: KeyScheme,
    run_id: i64,
    sequence: AtomicUsize,
}

impl<S: RecordStore> Persister<S> {
    pub fn new(store: S, scheme: KeyScheme) -> Self {
        Self {
            store,
            scheme,
            run_id: chrono::Utc::now().timestamp_millis(),
            sequence: AtomicUsize::new(0),
        }
    }

    pub fn with_run_id(mut self, run_id: i64) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn normalize(record: &Record) -> Result<StoredItem, PersistError> {
        let name = record
            .get_str("name")
            .ok_or_else(|| PersistError::new("malformed item: 'name' is not a string"))?;
        let age = parse_age(record.get("age"))
            .ok_or_else(|| PersistError::new("malformed item: 'age' is not an integer"))?;
        let city = record
            .get_str("city")
            .ok_or_else(|| PersistError::new("malformed item: 'city' is not a string"))?;

        Ok(StoredItem {
            name: name.to_string(),
            age,
            city: city.to_string(),
        })
    }

    fn key_for(&self, item: &StoredItem) -> String {
        match self.scheme {
            KeyScheme::Content => format!(
                "{}#{}#{}",
                escape_key_part(&item.name),
                item.age,
                escape_key_part(&item.city)
            ),
            KeyScheme::Sequenced => {
                let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
                format!("{}#{}#{:06}", escape_key_part(&item.name), self.run_id, seq)
            }
        }
    }

    pub async fn persist(&self, record: &Record) -> Result<StoredItem, PersistError> {
        let item = Self::normalize(record)?;
        let key = self.key_for(&item);

        tracing::debug!("Writing item {} to store", key);
        self.store.put_item(&key, &item).await?;
        Ok(item)
    }
}

fn escape_key_part(part: &str) -> String {
    part.replace('\\', "\\\\").replace('#', "\\#")
}

#[async_trait]
impl<S: RecordStore> RecordTools for Persister<S> {
    fn validate_record(&self, record: &Record) -> Verdict {
        validator::validate(record)
    }

    async fn write_db(&self, record: &Record) -> Result<StoredItem, PersistError> {
        self.persist(record).await
    }
}
