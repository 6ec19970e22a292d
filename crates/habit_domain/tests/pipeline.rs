use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use tempfile::tempdir;

use habit_domain::day::DaySummary;
use habit_domain::habit::HabitDefinition;
use habit_domain::source::{Collection, DayRecord, FieldValue, HabitDataSource, SourceError};
use habit_domain::HabitService;

/// In-memory stand-in for the remote tracking database. Counts fetches so
/// tests can assert the batching contract.
struct FakeSource {
    records: BTreeMap<NaiveDate, DayRecord>,
    tracking_edit: String,
    definitions_edit: Option<String>,
    range_fetches: RefCell<u32>,
}

impl FakeSource {
    fn new(records: Vec<DayRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.date, r)).collect(),
            tracking_edit: "2026-08-26T07:00:00Z".to_string(),
            definitions_edit: None,
            range_fetches: RefCell::new(0),
        }
    }
}

impl HabitDataSource for FakeSource {
    fn record_for(&self, date: NaiveDate) -> Result<Option<DayRecord>, SourceError> {
        Ok(self.records.get(&date).cloned())
    }

    fn records_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayRecord>, SourceError> {
        *self.range_fetches.borrow_mut() += 1;
        Ok(self
            .records
            .range(start..=end)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn latest_edit(&self, collection: Collection) -> Result<String, SourceError> {
        match collection {
            Collection::Tracking => Ok(self.tracking_edit.clone()),
            Collection::Definitions => Ok(self.definitions_edit.clone().unwrap_or_default()),
        }
    }

    fn tracked_collections(&self) -> Vec<Collection> {
        if self.definitions_edit.is_some() {
            vec![Collection::Tracking, Collection::Definitions]
        } else {
            vec![Collection::Tracking]
        }
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
}

fn habits() -> Vec<HabitDefinition> {
    ["Read", "Exercise", "Notes"]
        .iter()
        .map(|key| HabitDefinition {
            name: key.to_uppercase(),
            field_key: key.to_string(),
            icon: key.to_lowercase(),
            start_date: None,
            deactivated_date: None,
        })
        .collect()
}

fn full_day(d: u32) -> DayRecord {
    DayRecord::new(date(d))
        .with_field("Read", FieldValue::Checkbox(true))
        .with_field("Exercise", FieldValue::Checkbox(true))
        .with_field("Notes", FieldValue::Checkbox(true))
}

#[test]
fn streak_counts_through_an_in_progress_today() {
    let dir = tempdir().unwrap();
    // Today is 2/3, the five days before are complete, the one before that isn't.
    let today = DayRecord::new(date(26))
        .with_field("Read", FieldValue::Checkbox(true))
        .with_field("Exercise", FieldValue::Checkbox(true))
        .with_field("Notes", FieldValue::Checkbox(false));
    let mut records = vec![today];
    for d in 21..=25 {
        records.push(full_day(d));
    }

    let service = HabitService::new(FakeSource::new(records), habits(), dir.path().join("state"));
    assert_eq!(service.streak(date(26)).unwrap(), 5);
}

#[test]
fn streak_counts_completed_run_ending_today() {
    let dir = tempdir().unwrap();
    let records = vec![full_day(24), full_day(25), full_day(26)];
    let service = HabitService::new(FakeSource::new(records), habits(), dir.path().join("state"));
    assert_eq!(service.streak(date(26)).unwrap(), 3);
}

#[test]
fn date_range_issues_exactly_one_batched_fetch() {
    let dir = tempdir().unwrap();
    let source = FakeSource::new(vec![full_day(3), full_day(10)]);
    let service = HabitService::new(source, habits(), dir.path().join("state"));

    let summaries: Vec<DaySummary> = service.date_range(date(1), date(26)).unwrap();
    assert_eq!(summaries.len(), 26);
    assert!(summaries.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(*service.source().range_fetches.borrow(), 1);
}

#[test]
fn change_detection_round_trips_through_the_state_file() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("state");

    let mut service = HabitService::new(FakeSource::new(Vec::new()), habits(), &state);
    assert!(service.has_changes().unwrap(), "first run always updates");
    service.save_last_edited().unwrap();
    assert!(!service.has_changes().unwrap(), "token unchanged");

    // A new edit timestamp in any tracked collection flips the result.
    let mut source = FakeSource::new(Vec::new());
    source.tracking_edit = "2026-08-26T09:30:00Z".to_string();
    let mut service = HabitService::new(source, habits(), &state);
    assert!(service.has_changes().unwrap());
}

#[test]
fn forced_persist_without_detection_recomputes_the_token() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("state");

    let mut service = HabitService::new(FakeSource::new(Vec::new()), habits(), &state);
    service.save_last_edited().unwrap();

    let written = std::fs::read_to_string(&state).unwrap();
    assert_eq!(written, "2026-08-26T07:00:00Z");
}
