use crate::domain::model::{BatchReport, DispatchOutcome, Record};
use crate::domain::ports::{Dispatcher, RecordSource};
use crate::utils::error::Result;
use std::time::Instant;

pub const DEFAULT_WINDOW: usize = 15;

/// Running counters; each record bumps exactly one of valid/invalid.
#[derive(Debug, Default)]
struct Tally {
    valid: usize,
    invalid: usize,
    written: usize,
}

impl Tally {
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Invalid { .. } => self.invalid += 1,
            DispatchOutcome::Written => {
                self.valid += 1;
                self.written += 1;
            }
            DispatchOutcome::NotWritten { .. } => self.valid += 1,
        }
    }
}

/// Drives one batch: load, dispatch every record in order, report.
pub struct BatchOrchestrator<R: RecordSource, D: Dispatcher> {
    source: R,
    dispatcher: D,
    window: usize,
    started: Option<Instant>,
}

impl<R: RecordSource, D: Dispatcher> BatchOrchestrator<R, D> {
    pub fn new(source: R, dispatcher: D) -> Self {
        Self {
            source,
            dispatcher,
            window: DEFAULT_WINDOW,
            started: None,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Counts elapsed time from `started` instead of from `run`, for callers
    /// that read the input before building the dispatcher.
    pub fn started_at(mut self, started: Instant) -> Self {
        self.started = Some(started);
        self
    }

    /// Runs the batch. Only a load failure aborts; per-record failures are
    /// absorbed into the counts.
    pub async fn run(&self) -> Result<BatchReport> {
        let started = self.started.unwrap_or_else(Instant::now);
        tracing::info!("Starting batch run (window {})", self.window);

        let records = self.load().await?;
        tracing::info!("Loaded {} records", records.len());

        let mut tally = Tally::default();
        for (index, record) in records.iter().enumerate() {
            let outcome = match self.dispatcher.dispatch(index, record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("Dispatch failed for record {}: {}", index, e);
                    DispatchOutcome::Invalid {
                        reason: e.to_string(),
                    }
                }
            };
            tally.record(&outcome);
        }

        let report = BatchReport::new(
            tally.valid,
            tally.invalid,
            tally.written,
            started.elapsed().as_secs_f64(),
        );

        tracing::info!(
            "Batch finished: {} inspected, {} valid, {} invalid, {} written in {:.2}s",
            report.records_inspected(),
            report.valid_records(),
            report.invalid_records(),
            report.records_written(),
            report.execution_time()
        );
        Ok(report)
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let mut records = self.source.load().await?;
        if records.len() > self.window {
            let excess = records.len() - self.window;
            records.drain(..excess);
        }
        Ok(records)
    }
}
