//! Core projection engine: unrolls each contract's events into monthly summaries

use crate::events::{EventError, OrderViolation, PolicyEvent};
use super::summary::{PolicySummary, DECEMBER};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Monthly summaries for every contract, keyed by contract id
pub type ContractSummaries = BTreeMap<String, Vec<PolicySummary>>;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Calendar year every event must fall in. When unset, each contract
    /// is projected through the year it was created in.
    pub reporting_year: Option<i32>,

    /// Fold contracts on the rayon thread pool
    pub parallel: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            reporting_year: None,
            parallel: true,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project every contract in `events` from its creation month to December.
    ///
    /// Any invalid contract rejects the whole batch. When several contracts
    /// are invalid, the error reported is the one for the lowest contract id.
    pub fn project_year(&self, events: &[PolicyEvent]) -> Result<ContractSummaries, EventError> {
        let groups: Vec<(&str, Vec<&PolicyEvent>)> = group_by_contract(events).into_iter().collect();

        let results: Vec<Result<Vec<PolicySummary>, EventError>> = if self.config.parallel {
            groups
                .par_iter()
                .map(|(contract_id, contract_events)| self.project_contract(contract_id, contract_events))
                .collect()
        } else {
            groups
                .iter()
                .map(|(contract_id, contract_events)| self.project_contract(contract_id, contract_events))
                .collect()
        };

        let summaries = groups
            .iter()
            .zip(results)
            .map(|((contract_id, _), result)| result.map(|rows| (contract_id.to_string(), rows)))
            .collect::<Result<ContractSummaries, EventError>>()
            .inspect_err(|err| warn!("Rejected event batch: {}", err))?;

        info!(
            "Projected {} contracts from {} events",
            summaries.len(),
            events.len()
        );
        Ok(summaries)
    }

    /// Project a single contract's events, in any order, into one summary
    /// per month from its creation month through December
    pub fn project_contract(
        &self,
        contract_id: &str,
        events: &[&PolicyEvent],
    ) -> Result<Vec<PolicySummary>, EventError> {
        if let Some(reporting_year) = self.config.reporting_year {
            if let Some(stray) = events.iter().find(|e| e.year() != reporting_year) {
                return Err(EventError::OutsideReportingYear {
                    contract_id: contract_id.to_string(),
                    year: stray.year(),
                    reporting_year,
                });
            }
        }

        // Stable, so ties keep input order and are reported deterministically.
        // Sorting on the year first keeps a later-year event from looking
        // like it precedes the creation or shares its month.
        let mut ordered = events.to_vec();
        ordered.sort_by_key(|e| (e.year(), e.month()));

        if let Some(pair) = ordered
            .windows(2)
            .find(|pair| (pair[0].year(), pair[0].month()) == (pair[1].year(), pair[1].month()))
        {
            return Err(EventError::duplicate(contract_id, pair[0].month()));
        }

        let (creation, later) = ordered
            .split_first()
            .ok_or_else(|| EventError::out_of_order(contract_id, OrderViolation::MissingCreation))?;
        let initial = PolicySummary::from_creation(creation)?;

        let year = creation.year();
        if let Some(stray) = later.iter().find(|e| e.year() != year) {
            return Err(EventError::OutsideReportingYear {
                contract_id: contract_id.to_string(),
                year: stray.year(),
                reporting_year: year,
            });
        }

        debug!(
            "Contract {}: created {} at premium {}, {} later events",
            contract_id,
            creation.date(),
            initial.current_premium,
            later.len()
        );

        // Nothing left to project in the creation year
        if initial.month == DECEMBER {
            return Ok(vec![initial]);
        }

        let events_by_month: HashMap<u32, &PolicyEvent> =
            later.iter().map(|event| (event.month(), *event)).collect();

        let mut summaries = Vec::with_capacity((DECEMBER - initial.month + 1) as usize);
        let mut current = initial;

        for month in (current.month + 1)..=DECEMBER {
            let event = events_by_month.get(&month).copied();
            let next = current.next_period(event)?;
            trace!(
                "Contract {} month {:>2}: premium={} actual={} expected={}",
                contract_id,
                next.month,
                next.current_premium,
                next.actual_gross_written_premium_to_date,
                next.expected_gross_written_premium
            );
            summaries.push(std::mem::replace(&mut current, next));
        }
        summaries.push(current);

        Ok(summaries)
    }
}

/// Project a batch of events with the default configuration
pub fn project_year(events: &[PolicyEvent]) -> Result<ContractSummaries, EventError> {
    ProjectionEngine::default().project_year(events)
}

// Input order is kept within each contract
fn group_by_contract(events: &[PolicyEvent]) -> BTreeMap<&str, Vec<&PolicyEvent>> {
    let mut groups: BTreeMap<&str, Vec<&PolicyEvent>> = BTreeMap::new();
    for event in events {
        groups.entry(event.contract_id()).or_default().push(event);
    }
    groups
}
