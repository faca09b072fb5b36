//! Premium Reporting - monthly premium projection for contract portfolios
//!
//! This library provides:
//! - Contract lifecycle events (creation, price changes, termination) and their loaders
//! - Month-by-month projection of each contract's written and expected premium
//! - Annual unroll of a contract from its creation month to December
//! - Portfolio aggregation into monthly report rows

pub mod events;
pub mod projection;
pub mod reports;

// Re-export commonly used types
pub use events::{PolicyEvent, EventError, OrderViolation};
pub use projection::{PolicySummary, ProjectionEngine, ProjectionConfig, ContractSummaries, project_year};
pub use reports::{Report, ReportError, ReportRun, aggregate, report_for_events};
