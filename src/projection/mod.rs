//! Monthly projection of contract summaries through the reporting year

mod summary;
mod engine;

pub use summary::{PolicySummary, next_month, DECEMBER};
pub use engine::{ProjectionEngine, ProjectionConfig, ContractSummaries, project_year};
