use crate::core::orchestrator::DEFAULT_WINDOW;
use crate::core::{Record, RecordSource, Storage};
use crate::utils::error::{EtlError, Result};
use std::collections::VecDeque;

pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "age", "city"];

/// Reads a CSV file through a [`Storage`] and keeps only its last rows.
pub struct CsvSource<S: Storage> {
    storage: S,
    path: String,
    window: usize,
}

impl<S: Storage> CsvSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(EtlError::MissingColumnError {
                    column: column.to_string(),
                });
            }
        }

        let mut tail: VecDeque<Record> = VecDeque::with_capacity(self.window + 1);
        let mut total = 0usize;
        for row in reader.records() {
            let row = row?;
            total += 1;

            let mut record = Record::new();
            for (header, value) in headers.iter().zip(row.iter()) {
                record = record.with(header, value);
            }

            tail.push_back(record);
            if tail.len() > self.window {
                tail.pop_front();
            }
        }

        tracing::debug!(
            "Read {} rows from {}, keeping last {}",
            total,
            self.path,
            tail.len()
        );
        Ok(tail.into_iter().collect())
    }
}

impl<S: Storage> RecordSource for CsvSource<S> {
    async fn load(&self) -> Result<Vec<Record>> {
        let bytes = self
            .storage
            .read_file(&self.path)
            .await
            .map_err(|e| EtlError::input_load(&self.path, e.to_string()))?;
        self.parse(&bytes)
    }
}

/// Records already in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Record>,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for VecSource {
    async fn load(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}
