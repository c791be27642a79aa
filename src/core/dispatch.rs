//! Per-record decision step.
//!
//! [`DirectDispatcher`] calls the tools in sequence and returns a typed
//! outcome. [`NarratedDispatcher`] hands the record to a free-text
//! [`Narrator`] and recovers the outcome by substring matching, which is
//! kept for compatibility with narrating collaborators.

use crate::domain::model::{DispatchOutcome, Record, Verdict};
use crate::domain::ports::{Dispatcher, Narrator, RecordTools};
use crate::utils::error::Result;
use async_trait::async_trait;

pub struct DirectDispatcher<T: RecordTools> {
    tools: T,
}

impl<T: RecordTools> DirectDispatcher<T> {
    pub fn new(tools: T) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl<T: RecordTools> Dispatcher for DirectDispatcher<T> {
    async fn dispatch(&self, index: usize, record: &Record) -> Result<DispatchOutcome> {
        if let Verdict::Invalid(reason) = self.tools.validate_record(record) {
            tracing::info!("Record {} invalid: {}", index, reason);
            return Ok(DispatchOutcome::Invalid { reason });
        }

        match self.tools.write_db(record).await {
            Ok(item) => {
                tracing::info!("Record {} written ({})", index, item.name);
                Ok(DispatchOutcome::Written)
            }
            Err(e) => {
                tracing::warn!("Record {} valid but not written: {}", index, e);
                Ok(DispatchOutcome::NotWritten { error: e.message })
            }
        }
    }
}

/// Classifies a free-text outcome description.
///
/// Any mention of "invalid" or "cannot be written" (any case) counts as
/// invalid; otherwise the record is valid, and written only when the text
/// contains "successfully written" or the literal "SUCCESS".
pub fn classify_narration(text: &str) -> DispatchOutcome {
    let lower = text.to_lowercase();
    if lower.contains("invalid") || lower.contains("cannot be written") {
        return DispatchOutcome::Invalid {
            reason: text.to_string(),
        };
    }

    if text.contains("successfully written") || text.contains("SUCCESS") {
        DispatchOutcome::Written
    } else {
        DispatchOutcome::NotWritten {
            error: text.to_string(),
        }
    }
}

pub struct NarratedDispatcher<N: Narrator, T: RecordTools> {
    narrator: N,
    tools: T,
}

impl<N: Narrator, T: RecordTools> NarratedDispatcher<N, T> {
    pub fn new(narrator: N, tools: T) -> Self {
        Self { narrator, tools }
    }
}

#[async_trait]
impl<N: Narrator, T: RecordTools> Dispatcher for NarratedDispatcher<N, T> {
    async fn dispatch(&self, index: usize, record: &Record) -> Result<DispatchOutcome> {
        let text = self.narrator.narrate(record, &self.tools).await?;
        tracing::debug!("Record {} narration: {}", index, text);
        Ok(classify_narration(&text))
    }
}

/// Narrates by echoing the tool results in their classic wording.
pub struct ToolTranscriptNarrator {
    table: String,
}

impl ToolTranscriptNarrator {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

#[async_trait]
impl Narrator for ToolTranscriptNarrator {
    async fn narrate(&self, record: &Record, tools: &dyn RecordTools) -> Result<String> {
        let verdict = tools.validate_record(record);
        if !verdict.is_valid() {
            return Ok(format!("{}. The record cannot be written.", verdict));
        }

        let write = match tools.write_db(record).await {
            Ok(_) => format!("SUCCESS: Record written to {}", self.table),
            Err(e) => format!("ERROR: Failed to write to {} - {}", self.table, e),
        };
        Ok(format!("{}. {}", verdict, write))
    }
}
