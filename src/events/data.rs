//! Event data structures matching the contract event feed

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single lifecycle event for a contract
///
/// Serialized with a `type` tag and camelCase fields, e.g.
/// `{"type":"ContractCreated","contractId":"1","premium":100,"startDate":"2020-01-01"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum PolicyEvent {
    /// Contract starts paying `premium` every month from `start_date`
    ContractCreated {
        contract_id: String,
        premium: i64,
        start_date: NaiveDate,
    },
    /// Monthly premium goes up by `premium_increase`
    PriceIncreased {
        contract_id: String,
        premium_increase: i64,
        at_date: NaiveDate,
    },
    /// Monthly premium goes down by `premium_reduction` (no floor)
    PriceDecreased {
        contract_id: String,
        premium_reduction: i64,
        at_date: NaiveDate,
    },
    /// Contract stops paying after its final month
    ContractTerminated {
        contract_id: String,
        termination_date: NaiveDate,
    },
}

/// Discriminant of a [`PolicyEvent`], used for logging and loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ContractCreated,
    PriceIncreased,
    PriceDecreased,
    ContractTerminated,
}

impl EventKind {
    /// Parse the kind column of an event file
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "ContractCreated" | "Created" => Some(EventKind::ContractCreated),
            "PriceIncreased" => Some(EventKind::PriceIncreased),
            "PriceDecreased" => Some(EventKind::PriceDecreased),
            "ContractTerminated" | "Terminated" => Some(EventKind::ContractTerminated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ContractCreated => "ContractCreated",
            EventKind::PriceIncreased => "PriceIncreased",
            EventKind::PriceDecreased => "PriceDecreased",
            EventKind::ContractTerminated => "ContractTerminated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PolicyEvent {
    /// Identifier of the contract this event belongs to
    pub fn contract_id(&self) -> &str {
        match self {
            PolicyEvent::ContractCreated { contract_id, .. }
            | PolicyEvent::PriceIncreased { contract_id, .. }
            | PolicyEvent::PriceDecreased { contract_id, .. }
            | PolicyEvent::ContractTerminated { contract_id, .. } => contract_id,
        }
    }

    /// Effective date of the event
    pub fn date(&self) -> NaiveDate {
        match self {
            PolicyEvent::ContractCreated { start_date, .. } => *start_date,
            PolicyEvent::PriceIncreased { at_date, .. } => *at_date,
            PolicyEvent::PriceDecreased { at_date, .. } => *at_date,
            PolicyEvent::ContractTerminated { termination_date, .. } => *termination_date,
        }
    }

    /// Calendar month (1-12) the event takes effect in
    pub fn month(&self) -> u32 {
        self.date().month()
    }

    pub fn year(&self) -> i32 {
        self.date().year()
    }

    pub fn kind(&self) -> EventKind {
        match self {
            PolicyEvent::ContractCreated { .. } => EventKind::ContractCreated,
            PolicyEvent::PriceIncreased { .. } => EventKind::PriceIncreased,
            PolicyEvent::PriceDecreased { .. } => EventKind::PriceDecreased,
            PolicyEvent::ContractTerminated { .. } => EventKind::ContractTerminated,
        }
    }

    pub fn is_creation(&self) -> bool {
        matches!(self, PolicyEvent::ContractCreated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_event_date_for_every_kind() {
        let expected = date(2020, 1, 1);
        let events = [
            PolicyEvent::ContractCreated { contract_id: "1".into(), premium: 100, start_date: expected },
            PolicyEvent::PriceIncreased { contract_id: "1".into(), premium_increase: 100, at_date: expected },
            PolicyEvent::PriceDecreased { contract_id: "1".into(), premium_reduction: 100, at_date: expected },
            PolicyEvent::ContractTerminated { contract_id: "1".into(), termination_date: expected },
        ];

        for event in &events {
            assert_eq!(event.date(), expected);
            assert_eq!(event.month(), 1);
            assert_eq!(event.year(), 2020);
            assert_eq!(event.contract_id(), "1");
        }
    }

    #[test]
    fn test_event_kind() {
        let event = PolicyEvent::ContractTerminated {
            contract_id: "7".into(),
            termination_date: date(2020, 4, 30),
        };
        assert_eq!(event.kind(), EventKind::ContractTerminated);
        assert_eq!(event.month(), 4);
        assert!(!event.is_creation());

        assert_eq!(EventKind::parse("Created"), Some(EventKind::ContractCreated));
        assert_eq!(EventKind::parse(" PriceDecreased "), Some(EventKind::PriceDecreased));
        assert_eq!(EventKind::parse("Renewed"), None);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"type":"PriceIncreased","contractId":"42","premiumIncrease":25,"atDate":"2020-03-15"}"#;
        let event: PolicyEvent = serde_json::from_str(json).unwrap();

        assert_eq!(
            event,
            PolicyEvent::PriceIncreased {
                contract_id: "42".into(),
                premium_increase: 25,
                at_date: date(2020, 3, 15),
            }
        );
    }
}
