//! Portfolio-level monthly report rows

use crate::events::EventError;
use crate::projection::PolicySummary;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregated results across all contracts for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub month: u32,

    /// Contracts in force, including those terminated during this month
    pub contracts: u64,

    /// Sum of actual gross written premium to date
    pub actual_gross_premium: i64,

    /// Sum of expected gross written premium
    pub expected_gross_premium: i64,
}

/// Failures while producing reports from events
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("premium totals overflow in month {month}")]
    Overflow { month: u32 },
}

impl Report {
    fn add(&mut self, summary: &PolicySummary) -> Result<(), ReportError> {
        let overflow = ReportError::Overflow { month: self.month };

        if summary.is_active_in(self.month) {
            self.contracts += 1;
        }
        self.actual_gross_premium = self
            .actual_gross_premium
            .checked_add(summary.actual_gross_written_premium_to_date)
            .ok_or_else(|| overflow.clone())?;
        self.expected_gross_premium = self
            .expected_gross_premium
            .checked_add(summary.expected_gross_written_premium)
            .ok_or(overflow)?;
        Ok(())
    }
}

/// Roll summaries spanning any set of months into one report per month,
/// ordered by month
pub fn aggregate<'a, I>(summaries: I) -> Result<Vec<Report>, ReportError>
where
    I: IntoIterator<Item = &'a PolicySummary>,
{
    let mut by_month: BTreeMap<u32, Report> = BTreeMap::new();

    for summary in summaries {
        by_month
            .entry(summary.month)
            .or_insert_with(|| Report { month: summary.month, ..Default::default() })
            .add(summary)?;
    }

    Ok(by_month.into_values().collect())
}
