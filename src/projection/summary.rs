//! Monthly summary of a single contract and its month-to-month transition

use crate::events::{EventError, OrderViolation, PolicyEvent};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Last month of the reporting year
pub const DECEMBER: u32 = 12;

/// State of a contract at the end of one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    /// Calendar month this snapshot represents (1-12)
    pub month: u32,

    pub contract_id: String,

    /// Monthly premium in force as of `month` (0 once terminated)
    pub current_premium: i64,

    /// Premium actually written from creation through `month`
    pub actual_gross_written_premium_to_date: i64,

    /// Forecast of the written premium at year end, assuming
    /// `current_premium` holds for every remaining month
    pub expected_gross_written_premium: i64,

    /// Date of termination, carried forward once set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminated_on: Option<NaiveDate>,
}

/// Month following `month`, wrapping December to January
pub fn next_month(month: u32) -> u32 {
    if month >= DECEMBER { 1 } else { month + 1 }
}

/// Expected year-end premium: written to date through `month`, plus `rate`
/// for each month left after it. `None` on overflow.
fn expected_premium(month: u32, actual_to_date: i64, rate: i64) -> Option<i64> {
    i64::from(DECEMBER - month).checked_mul(rate)?.checked_add(actual_to_date)
}

impl PolicySummary {
    /// Summary for a contract that has not been terminated
    pub fn new(
        month: u32,
        contract_id: impl Into<String>,
        current_premium: i64,
        actual_gross_written_premium_to_date: i64,
        expected_gross_written_premium: i64,
    ) -> Self {
        Self {
            month,
            contract_id: contract_id.into(),
            current_premium,
            actual_gross_written_premium_to_date,
            expected_gross_written_premium,
            terminated_on: None,
        }
    }

    /// Initial summary built from a creation event
    ///
    /// The creation month's premium counts immediately, so a contract
    /// created in month M expects `premium * (13 - M)` by year end.
    pub fn from_creation(event: &PolicyEvent) -> Result<Self, EventError> {
        match event {
            PolicyEvent::ContractCreated { contract_id, premium, start_date } => {
                let month = start_date.month();
                let expected = expected_premium(month, *premium, *premium)
                    .ok_or_else(|| EventError::overflow(contract_id))?;
                Ok(Self::new(month, contract_id.as_str(), *premium, *premium, expected))
            }
            other => Err(EventError::out_of_order(other.contract_id(), OrderViolation::MissingCreation)),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated_on.is_some()
    }

    pub fn termination_month(&self) -> Option<u32> {
        self.terminated_on.map(|date| date.month())
    }

    /// Whether the contract counts as active in `month`: not terminated, or
    /// terminated during that very month
    pub fn is_active_in(&self, month: u32) -> bool {
        self.termination_month().map_or(true, |terminated| terminated == month)
    }

    /// Project this summary into the next calendar month, applying `event`
    /// if one takes effect in that month.
    ///
    /// Returns a new summary; `self` is left untouched. Projection never
    /// crosses a year boundary, so a December summary cannot advance.
    pub fn next_period(&self, event: Option<&PolicyEvent>) -> Result<Self, EventError> {
        if self.month >= DECEMBER {
            return Err(EventError::YearBoundary { contract_id: self.contract_id.clone() });
        }

        let event = match event {
            None => return self.same(),
            Some(event) => event,
        };

        if event.month() == self.month {
            return Err(EventError::duplicate(&self.contract_id, self.month));
        }
        if self.is_terminated() {
            return Err(EventError::out_of_order(&self.contract_id, OrderViolation::Terminated));
        }

        match event {
            PolicyEvent::ContractCreated { .. } => {
                Err(EventError::out_of_order(&self.contract_id, OrderViolation::RepeatedCreation))
            }
            _ if event.month() != next_month(self.month) => {
                Err(EventError::out_of_order(&self.contract_id, OrderViolation::NotNextMonth))
            }
            PolicyEvent::PriceIncreased { premium_increase, .. } => {
                let next_premium = self.current_premium.checked_add(*premium_increase).ok_or_else(|| self.overflow())?;
                self.reprice(next_premium)
            }
            PolicyEvent::PriceDecreased { premium_reduction, .. } => {
                let next_premium = self.current_premium.checked_sub(*premium_reduction).ok_or_else(|| self.overflow())?;
                self.reprice(next_premium)
            }
            PolicyEvent::ContractTerminated { termination_date, .. } => self.terminate(*termination_date),
        }
    }

    fn overflow(&self) -> EventError {
        EventError::overflow(&self.contract_id)
    }

    // Written to date plus one more month at `premium`, and the matching forecast
    fn written_through(&self, month: u32, premium: i64, rate: i64) -> Result<(i64, i64), EventError> {
        let actual = self
            .actual_gross_written_premium_to_date
            .checked_add(premium)
            .ok_or_else(|| self.overflow())?;
        let expected = expected_premium(month, actual, rate).ok_or_else(|| self.overflow())?;
        Ok((actual, expected))
    }

    // Carry the contract into the next month at the premium already in force
    fn same(&self) -> Result<Self, EventError> {
        let month = next_month(self.month);
        let (actual, expected) = self.written_through(month, self.current_premium, self.current_premium)?;
        Ok(Self {
            month,
            actual_gross_written_premium_to_date: actual,
            expected_gross_written_premium: expected,
            ..self.clone()
        })
    }

    fn reprice(&self, next_premium: i64) -> Result<Self, EventError> {
        let month = next_month(self.month);
        let (actual, expected) = self.written_through(month, next_premium, next_premium)?;
        Ok(Self {
            month,
            current_premium: next_premium,
            actual_gross_written_premium_to_date: actual,
            expected_gross_written_premium: expected,
            ..self.clone()
        })
    }

    // Final month is paid at the old rate, then nothing more is expected
    fn terminate(&self, termination_date: NaiveDate) -> Result<Self, EventError> {
        let month = next_month(self.month);
        let (actual, expected) = self.written_through(month, self.current_premium, 0)?;
        Ok(Self {
            month,
            current_premium: 0,
            actual_gross_written_premium_to_date: actual,
            expected_gross_written_premium: expected,
            terminated_on: Some(termination_date),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, month, day).unwrap()
    }

    // A contract created in January at 100 a month
    fn simple_policy() -> PolicySummary {
        PolicySummary::new(1, "c-1", 100, 100, 1200)
    }

    fn every_kind(contract_id: &str, at: NaiveDate) -> Vec<PolicyEvent> {
        vec![
            PolicyEvent::ContractCreated { contract_id: contract_id.into(), premium: 100, start_date: at },
            PolicyEvent::PriceIncreased { contract_id: contract_id.into(), premium_increase: 100, at_date: at },
            PolicyEvent::PriceDecreased { contract_id: contract_id.into(), premium_reduction: 100, at_date: at },
            PolicyEvent::ContractTerminated { contract_id: contract_id.into(), termination_date: at },
        ]
    }

    #[test]
    fn test_next_month_wraps() {
        assert_eq!(next_month(1), 2);
        assert_eq!(next_month(11), 12);
        assert_eq!(next_month(12), 1);
    }

    #[test]
    fn test_no_event_progresses_month() {
        let next = simple_policy().next_period(None).unwrap();
        assert_eq!(next, PolicySummary::new(2, "c-1", 100, 200, 1200));
    }

    #[test]
    fn test_december_cannot_advance() {
        let december = PolicySummary::new(12, "c-1", 100, 1200, 1200);
        let err = december.next_period(None).unwrap_err();
        assert!(matches!(err, EventError::YearBoundary { .. }));
    }

    #[test]
    fn test_same_month_event_is_duplicate_for_every_kind() {
        let initial = simple_policy();
        for event in every_kind(&initial.contract_id, date(1, 1)) {
            let err = initial.next_period(Some(&event)).unwrap_err();
            assert_eq!(err, EventError::duplicate("c-1", 1), "{:?}", event.kind());
        }
    }

    #[test]
    fn test_terminated_policy_rejects_every_kind() {
        let initial = PolicySummary {
            terminated_on: Some(date(1, 1)),
            ..PolicySummary::new(1, "c-1", 0, 0, 0)
        };

        for event in every_kind(&initial.contract_id, date(2, 1)) {
            let err = initial.next_period(Some(&event)).unwrap_err();
            assert_eq!(err, EventError::out_of_order("c-1", OrderViolation::Terminated));
        }
    }

    #[test]
    fn test_creation_as_transition_is_out_of_order() {
        let event = PolicyEvent::ContractCreated { contract_id: "c-1".into(), premium: 100, start_date: date(2, 1) };
        let err = simple_policy().next_period(Some(&event)).unwrap_err();
        assert_eq!(err, EventError::out_of_order("c-1", OrderViolation::RepeatedCreation));
    }

    #[test]
    fn test_event_must_be_for_next_month() {
        let event = PolicyEvent::PriceIncreased { contract_id: "c-1".into(), premium_increase: 10, at_date: date(4, 1) };
        let err = simple_policy().next_period(Some(&event)).unwrap_err();
        assert_eq!(err, EventError::out_of_order("c-1", OrderViolation::NotNextMonth));
    }

    #[test]
    fn test_price_increase() {
        let event = PolicyEvent::PriceIncreased { contract_id: "c-1".into(), premium_increase: 100, at_date: date(2, 1) };
        let next = simple_policy().next_period(Some(&event)).unwrap();
        assert_eq!(next, PolicySummary::new(2, "c-1", 200, 300, 2300));
    }

    #[test]
    fn test_price_decrease() {
        let event = PolicyEvent::PriceDecreased { contract_id: "c-1".into(), premium_reduction: 50, at_date: date(2, 1) };
        let next = simple_policy().next_period(Some(&event)).unwrap();
        assert_eq!(next, PolicySummary::new(2, "c-1", 50, 150, 650));
    }

    #[test]
    fn test_price_decrease_below_zero_is_not_floored() {
        let event = PolicyEvent::PriceDecreased { contract_id: "c-1".into(), premium_reduction: 150, at_date: date(2, 1) };
        let next = simple_policy().next_period(Some(&event)).unwrap();
        assert_eq!(next.current_premium, -50);
        assert_eq!(next.actual_gross_written_premium_to_date, 50);
    }

    #[test]
    fn test_termination_pays_final_month() {
        let event = PolicyEvent::ContractTerminated { contract_id: "c-1".into(), termination_date: date(2, 1) };
        let next = simple_policy().next_period(Some(&event)).unwrap();

        let expected = PolicySummary {
            terminated_on: Some(date(2, 1)),
            ..PolicySummary::new(2, "c-1", 0, 200, 200)
        };
        assert_eq!(next, expected);
    }

    #[test]
    fn test_terminated_policy_stays_flat() {
        let terminated = PolicySummary {
            terminated_on: Some(date(2, 1)),
            ..PolicySummary::new(2, "c-1", 0, 200, 200)
        };

        let next = terminated.next_period(None).unwrap();
        assert_eq!(next.month, 3);
        assert_eq!(next.current_premium, 0);
        assert_eq!(next.actual_gross_written_premium_to_date, 200);
        assert_eq!(next.expected_gross_written_premium, 200);
        assert_eq!(next.terminated_on, Some(date(2, 1)));
    }

    #[test]
    fn test_from_creation() {
        let event = PolicyEvent::ContractCreated { contract_id: "c-1".into(), premium: 100, start_date: date(4, 10) };
        let summary = PolicySummary::from_creation(&event).unwrap();
        assert_eq!(summary, PolicySummary::new(4, "c-1", 100, 100, 900));

        let event = PolicyEvent::PriceIncreased { contract_id: "c-1".into(), premium_increase: 100, at_date: date(4, 10) };
        let err = PolicySummary::from_creation(&event).unwrap_err();
        assert_eq!(err, EventError::out_of_order("c-1", OrderViolation::MissingCreation));
    }

    #[test]
    fn test_huge_creation_premium_overflows() {
        let event = PolicyEvent::ContractCreated {
            contract_id: "c-1".into(),
            premium: i64::MAX / 2,
            start_date: date(1, 1),
        };
        let err = PolicySummary::from_creation(&event).unwrap_err();
        assert_eq!(err, EventError::overflow("c-1"));
    }

    #[test]
    fn test_transitions_report_overflow() {
        let large = PolicySummary::new(10, "c-1", i64::MAX / 2, i64::MAX - 10, i64::MAX - 10);
        assert_eq!(large.next_period(None).unwrap_err(), EventError::overflow("c-1"));

        let event = PolicyEvent::PriceIncreased { contract_id: "c-1".into(), premium_increase: i64::MAX, at_date: date(2, 1) };
        assert_eq!(simple_policy().next_period(Some(&event)).unwrap_err(), EventError::overflow("c-1"));

        let event = PolicyEvent::PriceDecreased { contract_id: "c-1".into(), premium_reduction: i64::MIN, at_date: date(2, 1) };
        assert_eq!(simple_policy().next_period(Some(&event)).unwrap_err(), EventError::overflow("c-1"));

        let event = PolicyEvent::ContractTerminated { contract_id: "c-1".into(), termination_date: date(11, 1) };
        assert_eq!(large.next_period(Some(&event)).unwrap_err(), EventError::overflow("c-1"));
    }

    #[test]
    fn test_active_in_termination_month_only() {
        let terminated = PolicySummary {
            terminated_on: Some(date(3, 30)),
            ..PolicySummary::new(3, "c-1", 0, 300, 300)
        };
        assert!(terminated.is_active_in(3));
        assert!(!terminated.is_active_in(4));
        assert!(simple_policy().is_active_in(7));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn creation_expects_remaining_months(premium in 0i64..1_000_000, month in 1u32..=12) {
                let event = PolicyEvent::ContractCreated {
                    contract_id: "p".into(),
                    premium,
                    start_date: NaiveDate::from_ymd_opt(2021, month, 1).unwrap(),
                };
                let summary = PolicySummary::from_creation(&event).unwrap();
                prop_assert_eq!(summary.expected_gross_written_premium, premium * i64::from(13 - month));
            }

            #[test]
            fn quiet_month_adds_current_premium(
                premium in -10_000i64..10_000,
                actual in 0i64..1_000_000,
                month in 1u32..12,
            ) {
                let summary = PolicySummary::new(month, "p", premium, actual, 0);
                let next = summary.next_period(None).unwrap();

                prop_assert_eq!(next.month, month + 1);
                prop_assert_eq!(next.actual_gross_written_premium_to_date, actual + premium);
                prop_assert_eq!(
                    next.expected_gross_written_premium,
                    actual + premium + i64::from(12 - (month + 1)) * premium
                );
            }
        }
    }
}
