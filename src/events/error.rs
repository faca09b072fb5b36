//! Errors raised when events cannot be folded into a contract's summaries

use std::fmt;

/// Why an event was rejected as arriving out of order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderViolation {
    /// The contract's earliest event is not a creation
    MissingCreation,
    /// A creation event arrived for a contract that already exists
    RepeatedCreation,
    /// The contract has already been terminated
    Terminated,
    /// The event is not effective in the month being projected
    NotNextMonth,
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OrderViolation::MissingCreation => "first event is not a contract creation",
            OrderViolation::RepeatedCreation => "contract has already been created",
            OrderViolation::Terminated => "contract has already been terminated",
            OrderViolation::NotNextMonth => "event is not effective in the following month",
        };
        f.write_str(text)
    }
}

/// Validation failures for a contract's event stream
///
/// None of these are retriable; any one of them rejects the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("contract {contract_id}: cannot receive multiple events in month {month}")]
    DuplicateEvent { contract_id: String, month: u32 },

    #[error("contract {contract_id}: event cannot be applied in this order ({reason})")]
    OutOfOrder { contract_id: String, reason: OrderViolation },

    #[error("contract {contract_id}: projection cannot advance past December")]
    YearBoundary { contract_id: String },

    #[error("contract {contract_id}: event dated {year} falls outside reporting year {reporting_year}")]
    OutsideReportingYear { contract_id: String, year: i32, reporting_year: i32 },

    #[error("contract {contract_id}: premium amounts overflow")]
    PremiumOverflow { contract_id: String },
}

impl EventError {
    pub fn contract_id(&self) -> &str {
        match self {
            EventError::DuplicateEvent { contract_id, .. }
            | EventError::OutOfOrder { contract_id, .. }
            | EventError::YearBoundary { contract_id }
            | EventError::PremiumOverflow { contract_id }
            | EventError::OutsideReportingYear { contract_id, .. } => contract_id,
        }
    }

    pub(crate) fn out_of_order(contract_id: &str, reason: OrderViolation) -> Self {
        EventError::OutOfOrder { contract_id: contract_id.to_string(), reason }
    }

    pub(crate) fn overflow(contract_id: &str) -> Self {
        EventError::PremiumOverflow { contract_id: contract_id.to_string() }
    }

    pub(crate) fn duplicate(contract_id: &str, month: u32) -> Self {
        EventError::DuplicateEvent { contract_id: contract_id.to_string(), month }
    }
}
