use crate::domain::model::{BatchReport, ResponsePayload};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
struct Body<'a> {
    message: &'a str,
    data: Data,
}

#[derive(Serialize)]
struct Data {
    records_inspected: usize,
    valid_records: usize,
    invalid_records: usize,
    records_written: usize,
    execution_time: f64,
}

fn round2(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Shapes a report into the response printed at the end of a run.
/// The status is always 200, however many records failed.
pub fn format(report: &BatchReport) -> Result<ResponsePayload> {
    let body = Body {
        message: "Success",
        data: Data {
            records_inspected: report.records_inspected(),
            valid_records: report.valid_records(),
            invalid_records: report.invalid_records(),
            records_written: report.records_written(),
            execution_time: round2(report.execution_time()),
        },
    };

    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    Ok(ResponsePayload {
        status_code: 200,
        headers,
        body: serde_json::to_string(&body)?,
        is_base64_encoded: false,
    })
}
