//! Portfolio aggregation of contract summaries into monthly reports

mod report;
pub mod output;

pub use report::{Report, ReportError, aggregate};
pub use output::{write_reports_csv, write_summaries_csv, format_report_table};

use crate::events::PolicyEvent;
use crate::projection::{ContractSummaries, ProjectionConfig, ProjectionEngine};

/// Summaries and reports produced from one batch of events
#[derive(Debug, Clone)]
pub struct ReportRun {
    pub summaries: ContractSummaries,
    pub reports: Vec<Report>,
}

/// Project `events` with `config` and aggregate the result
pub fn report_for_events(events: &[PolicyEvent], config: ProjectionConfig) -> Result<ReportRun, ReportError> {
    let summaries = ProjectionEngine::new(config).project_year(events)?;
    let reports = aggregate(summaries.values().flatten())?;
    Ok(ReportRun { summaries, reports })
}
