//! Contract lifecycle events, their errors, and event file loading

mod data;
mod error;
pub mod loader;

pub use data::{PolicyEvent, EventKind};
pub use error::{EventError, OrderViolation};
pub use loader::{load_events, load_events_from_reader, load_events_json, load_events_json_from_reader, LoadError};
