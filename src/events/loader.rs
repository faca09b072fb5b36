//! Load contract events from CSV or JSON files

use super::{EventKind, PolicyEvent};
use chrono::NaiveDate;
use csv::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Failures while reading an event file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read event file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV event row: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON events: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: unknown event kind '{kind}'")]
    UnknownKind { row: usize, kind: String },

    #[error("row {row}: {kind} event requires an amount")]
    MissingAmount { row: usize, kind: EventKind },

    #[error("row {row}: contract id is empty")]
    EmptyContractId { row: usize },
}

/// Raw CSV row, columns `Event,ContractId,Amount,Date`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Event")]
    event: String,
    #[serde(rename = "ContractId")]
    contract_id: String,
    #[serde(rename = "Amount")]
    amount: Option<i64>,
    #[serde(rename = "Date")]
    date: NaiveDate,
}

impl CsvRow {
    fn to_event(self, row: usize) -> Result<PolicyEvent, LoadError> {
        let kind = EventKind::parse(&self.event)
            .ok_or_else(|| LoadError::UnknownKind { row, kind: self.event.clone() })?;

        let contract_id = self.contract_id.trim().to_string();
        if contract_id.is_empty() {
            return Err(LoadError::EmptyContractId { row });
        }

        let amount = || self.amount.ok_or(LoadError::MissingAmount { row, kind });

        let event = match kind {
            EventKind::ContractCreated => PolicyEvent::ContractCreated {
                premium: amount()?,
                contract_id,
                start_date: self.date,
            },
            EventKind::PriceIncreased => PolicyEvent::PriceIncreased {
                premium_increase: amount()?,
                contract_id,
                at_date: self.date,
            },
            EventKind::PriceDecreased => PolicyEvent::PriceDecreased {
                premium_reduction: amount()?,
                contract_id,
                at_date: self.date,
            },
            EventKind::ContractTerminated => PolicyEvent::ContractTerminated {
                contract_id,
                termination_date: self.date,
            },
        };

        Ok(event)
    }
}

/// Load all events from a CSV file
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<Vec<PolicyEvent>, LoadError> {
    let file = File::open(path)?;
    load_events_from_reader(BufReader::new(file))
}

/// Load events from any CSV reader (e.g., string buffer, request body)
pub fn load_events_from_reader<R: Read>(reader: R) -> Result<Vec<PolicyEvent>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut events = Vec::new();

    for (index, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Data rows are numbered from 1, after the header
        events.push(row.to_event(index + 1)?);
    }

    log::debug!("Loaded {} events from CSV", events.len());
    Ok(events)
}

/// Load events from a JSON file holding an array of tagged events
pub fn load_events_json<P: AsRef<Path>>(path: P) -> Result<Vec<PolicyEvent>, LoadError> {
    let file = File::open(path)?;
    load_events_json_from_reader(BufReader::new(file))
}

pub fn load_events_json_from_reader<R: Read>(reader: R) -> Result<Vec<PolicyEvent>, LoadError> {
    let events: Vec<PolicyEvent> = serde_json::from_reader(reader)?;

    if let Some(row) = events.iter().position(|e| e.contract_id().trim().is_empty()) {
        return Err(LoadError::EmptyContractId { row: row + 1 });
    }

    log::debug!("Loaded {} events from JSON", events.len());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLLER_COASTER: &str = "\
Event,ContractId,Amount,Date
ContractCreated,1,100,2020-01-01
PriceIncreased,1,100,2020-02-01
PriceDecreased,1,100,2020-03-01
ContractTerminated,1,,2020-04-30
";

    #[test]
    fn test_load_events_from_csv() {
        let events = load_events_from_reader(ROLLER_COASTER.as_bytes()).expect("Failed to load events");
        assert_eq!(events.len(), 4);

        assert_eq!(
            events[0],
            PolicyEvent::ContractCreated {
                contract_id: "1".into(),
                premium: 100,
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            }
        );
        assert_eq!(events[3].kind(), EventKind::ContractTerminated);
        assert_eq!(events[3].month(), 4);
    }

    #[test]
    fn test_missing_amount() {
        let csv = "Event,ContractId,Amount,Date\nPriceIncreased,1,,2020-02-01\n";
        let err = load_events_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingAmount { row: 1, kind: EventKind::PriceIncreased }));
    }

    #[test]
    fn test_unknown_kind_and_empty_id() {
        let csv = "Event,ContractId,Amount,Date\nContractCreated,1,100,2020-01-01\nRenewed,1,,2020-02-01\n";
        let err = load_events_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownKind { row: 2, .. }));

        let csv = "Event,ContractId,Amount,Date\nContractCreated, ,100,2020-01-01\n";
        let err = load_events_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyContractId { row: 1 }));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let csv = "Event,ContractId,Amount,Date\nContractCreated,1,100,2020-13-01\n";
        assert!(matches!(load_events_from_reader(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_load_events_from_json() {
        let json = r#"[
            {"type":"ContractCreated","contractId":"1","premium":100,"startDate":"2020-01-01"},
            {"type":"ContractTerminated","contractId":"1","terminationDate":"2020-03-30"}
        ]"#;
        let events = load_events_json_from_reader(json.as_bytes()).expect("Failed to load events");
        assert_eq!(events.len(), 2);
        assert!(events[0].is_creation());
        assert_eq!(events[1].month(), 3);
    }

    #[test]
    fn test_load_sample_files() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");

        let csv_events = load_events(dir.join("sample_events.csv")).expect("Failed to load CSV sample");
        let json_events = load_events_json(dir.join("sample_events.json")).expect("Failed to load JSON sample");
        assert_eq!(csv_events, json_events);
    }
}
