use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

/// Failure talking to the upstream data source. Never retried; the run aborts.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("data source request failed: {0}")]
    Transport(String),
    #[error("malformed data source response: {0}")]
    Malformed(String),
}

/// A typed field value from one day record. Anything the source reports with
/// a type we do not understand becomes `Other` and never counts as completed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Checkbox(bool),
    Number(f64),
    Select(Option<String>),
    Other,
}

impl FieldValue {
    pub fn is_completed(&self) -> bool {
        match self {
            FieldValue::Checkbox(checked) => *checked,
            FieldValue::Number(value) => *value > 0.0,
            FieldValue::Select(choice) => choice.is_some(),
            FieldValue::Other => false,
        }
    }
}

/// One raw record from the tracking database: a date and its named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub fields: BTreeMap<String, FieldValue>,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Logical collections whose modification times gate a display update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// The per-day tracking database.
    Tracking,
    /// The optional habit-definition database.
    Definitions,
}

/// Narrow contract of the upstream data source. One implementation talks to
/// the remote API; tests use in-memory fakes.
pub trait HabitDataSource {
    /// The record for one date, if any exists.
    fn record_for(&self, date: NaiveDate) -> Result<Option<DayRecord>, SourceError>;

    /// All records in `[start, end]`, fetched in a single call.
    fn records_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayRecord>, SourceError>;

    /// Timestamp of the most recently modified record in a collection, or an
    /// empty string when the collection has no records.
    fn latest_edit(&self, collection: Collection) -> Result<String, SourceError>;

    /// Collections whose edits should trigger a refresh.
    fn tracked_collections(&self) -> Vec<Collection> {
        vec![Collection::Tracking]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_maps_directly() {
        assert!(FieldValue::Checkbox(true).is_completed());
        assert!(!FieldValue::Checkbox(false).is_completed());
    }

    #[test]
    fn number_completes_only_above_zero() {
        assert!(FieldValue::Number(0.5).is_completed());
        assert!(!FieldValue::Number(0.0).is_completed());
        assert!(!FieldValue::Number(-2.0).is_completed());
    }

    #[test]
    fn select_completes_when_a_choice_is_present() {
        assert!(FieldValue::Select(Some("4L".to_string())).is_completed());
        assert!(!FieldValue::Select(None).is_completed());
    }

    #[test]
    fn unrecognized_values_never_complete() {
        assert!(!FieldValue::Other.is_completed());
    }
}
