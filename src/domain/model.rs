use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One input row. Field values stay untyped until validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter used by readers and tests.
    pub fn with(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "VALID"),
            Verdict::Invalid(reason) => write!(f, "INVALID: {}", reason),
        }
    }
}

/// Normalized form written to the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub name: String,
    pub age: i64,
    pub city: String,
}

/// Structured result of dispatching one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Invalid { reason: String },
    Written,
    NotWritten { error: String },
}

/// Aggregate counts for one batch run. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    records_inspected: usize,
    valid_records: usize,
    invalid_records: usize,
    records_written: usize,
    execution_time: f64,
}

impl BatchReport {
    pub(crate) fn new(
        valid_records: usize,
        invalid_records: usize,
        records_written: usize,
        execution_time: f64,
    ) -> Self {
        debug_assert!(records_written <= valid_records);
        Self {
            records_inspected: valid_records + invalid_records,
            valid_records,
            invalid_records,
            records_written,
            execution_time: execution_time.max(0.0),
        }
    }

    pub fn records_inspected(&self) -> usize {
        self.records_inspected
    }

    pub fn valid_records(&self) -> usize {
        self.valid_records
    }

    pub fn invalid_records(&self) -> usize {
        self.invalid_records
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Elapsed wall-clock seconds, unrounded.
    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }
}

/// Lambda/API-Gateway shaped result printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}
