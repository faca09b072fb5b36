//! AWS Lambda handler for producing premium reports
//!
//! Accepts a batch of contract events as JSON and returns the monthly
//! portfolio report. Supports Lambda Function URLs for direct HTTP access.

use premium_reporting::{report_for_events, ContractSummaries, PolicyEvent, ProjectionConfig, Report};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};

/// Input for a report run
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Contract events, in any order
    pub events: Vec<PolicyEvent>,

    /// Reject events outside this calendar year
    #[serde(default)]
    pub reporting_year: Option<i32>,

    /// Include per-contract monthly summaries in the response
    #[serde(default)]
    pub include_summaries: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub contract_count: usize,
    pub event_count: usize,
    pub reports: Vec<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<ContractSummaries>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?;
    Ok(response)
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    json_response(status, &ErrorBody { error: message })
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        let response = Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?;
        return Ok(response);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => r#"{"events":[]}"#.to_string(),
    };

    let request: ReportRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    if request.events.iter().any(|e| e.contract_id().trim().is_empty()) {
        return error_response(400, "Every event needs a non-empty contractId");
    }

    let config = ProjectionConfig {
        reporting_year: request.reporting_year,
        ..Default::default()
    };

    let run = match report_for_events(&request.events, config) {
        Ok(run) => run,
        Err(e) => {
            log::warn!("Rejected {} events: {}", request.events.len(), e);
            return error_response(422, &e.to_string());
        }
    };

    let response = ReportResponse {
        contract_count: run.summaries.len(),
        event_count: request.events.len(),
        reports: run.reports,
        summaries: request.include_summaries.then_some(run.summaries),
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    json_response(200, &response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
