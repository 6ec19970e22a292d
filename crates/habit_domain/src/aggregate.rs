use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::day::{DaySnapshot, DaySummary};
use crate::habit::{HabitDefinition, HabitStatus};
use crate::source::DayRecord;

/// Resolve one habit's completion from a day record by its field key.
/// Absent fields are not completed.
pub fn resolve_status(record: &DayRecord, habit: &HabitDefinition) -> HabitStatus {
    let completed = record
        .field(&habit.field_key)
        .map(|value| value.is_completed())
        .unwrap_or(false);
    HabitStatus {
        name: habit.name.clone(),
        icon: habit.icon.clone(),
        completed,
    }
}

/// Build the full per-habit snapshot for one day. Only habits active on
/// `date` are included; without a record every active habit is incomplete.
pub fn day_snapshot(
    date: NaiveDate,
    habits: &[HabitDefinition],
    record: Option<&DayRecord>,
) -> DaySnapshot {
    let statuses = habits
        .iter()
        .filter(|habit| habit.is_active_on(date))
        .map(|habit| match record {
            Some(record) => resolve_status(record, habit),
            None => HabitStatus {
                name: habit.name.clone(),
                icon: habit.icon.clone(),
                completed: false,
            },
        })
        .collect();
    DaySnapshot::new(date, statuses)
}

/// Aggregate a pre-fetched batch of records into one summary per day of the
/// inclusive range, in ascending date order. Days with no record or no
/// active habit get `completed = 0`.
pub fn summarize_range(
    start: NaiveDate,
    end: NaiveDate,
    habits: &[HabitDefinition],
    records: &[DayRecord],
) -> Vec<DaySummary> {
    let by_date: BTreeMap<NaiveDate, &DayRecord> =
        records.iter().map(|record| (record.date, record)).collect();

    let mut summaries = Vec::new();
    let mut current = start;
    while current <= end {
        let active: Vec<&HabitDefinition> = habits
            .iter()
            .filter(|habit| habit.is_active_on(current))
            .collect();
        let total_count = active.len();

        let completed_count = match by_date.get(&current) {
            Some(record) if total_count > 0 => active
                .iter()
                .filter(|habit| resolve_status(record, habit).completed)
                .count(),
            _ => 0,
        };

        summaries.push(DaySummary {
            date: current,
            completed_count,
            total_count,
        });
        current += Duration::days(1);
    }
    summaries
}
