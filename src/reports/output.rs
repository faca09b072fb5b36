//! Report output: CSV files and console tables

use super::Report;
use crate::projection::PolicySummary;
use chrono::Month;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ReportCsvRow {
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Contracts")]
    contracts: u64,
    #[serde(rename = "ActualGrossPremium")]
    actual_gross_premium: i64,
    #[serde(rename = "ExpectedGrossPremium")]
    expected_gross_premium: i64,
}

#[derive(Debug, Serialize)]
struct SummaryCsvRow<'a> {
    #[serde(rename = "ContractId")]
    contract_id: &'a str,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "CurrentPremium")]
    current_premium: i64,
    #[serde(rename = "AGWP")]
    actual_to_date: i64,
    #[serde(rename = "EGWP")]
    expected: i64,
    #[serde(rename = "TerminatedOn")]
    terminated_on: String,
}

/// Write report rows as CSV with a header line
pub fn write_reports_csv<W: Write>(writer: W, reports: &[Report]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for report in reports {
        csv_writer.serialize(ReportCsvRow {
            month: report.month,
            contracts: report.contracts,
            actual_gross_premium: report.actual_gross_premium,
            expected_gross_premium: report.expected_gross_premium,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write per-contract monthly summaries as CSV
pub fn write_summaries_csv<'a, W, I>(writer: W, summaries: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a PolicySummary>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(SummaryCsvRow {
            contract_id: &summary.contract_id,
            month: summary.month,
            current_premium: summary.current_premium,
            actual_to_date: summary.actual_gross_written_premium_to_date,
            expected: summary.expected_gross_written_premium,
            terminated_on: summary.terminated_on.map(|d| d.to_string()).unwrap_or_default(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("?", |m| m.name())
}

/// Render report rows as a fixed-width console table
pub fn format_report_table(reports: &[Report]) -> String {
    let mut out = format!(
        "{:<10} {:>10} {:>14} {:>14}\n{}\n",
        "Month",
        "Contracts",
        "Actual GWP",
        "Expected GWP",
        "-".repeat(51)
    );

    for report in reports {
        out.push_str(&format!(
            "{:<10} {:>10} {:>14} {:>14}\n",
            month_name(report.month),
            report.contracts,
            report.actual_gross_premium,
            report.expected_gross_premium,
        ));
    }
    out
}
