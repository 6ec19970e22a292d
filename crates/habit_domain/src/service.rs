use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::{
    aggregate,
    changes::{join_token, ChangeDetector},
    day::{DaySnapshot, DaySummary},
    habit::HabitDefinition,
    source::HabitDataSource,
    streak,
};

/// Composes the data source, habit definitions and change detection into the
/// operations the display pipeline needs. One instance per run.
pub struct HabitService<S: HabitDataSource> {
    source: S,
    habits: Vec<HabitDefinition>,
    detector: ChangeDetector,
}

impl<S: HabitDataSource> HabitService<S> {
    pub fn new(source: S, habits: Vec<HabitDefinition>, state_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            habits,
            detector: ChangeDetector::new(state_path),
        }
    }

    pub fn habits(&self) -> &[HabitDefinition] {
        &self.habits
    }

    /// Swap in definitions fetched from the remote definition database.
    pub fn replace_habits(&mut self, habits: Vec<HabitDefinition>) {
        info!(count = habits.len(), "using dynamic habit definitions");
        self.habits = habits;
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Per-habit snapshot for one date.
    pub fn day(&self, date: NaiveDate) -> Result<DaySnapshot> {
        let record = self
            .source
            .record_for(date)
            .with_context(|| format!("fetching record for {date}"))?;
        Ok(aggregate::day_snapshot(date, &self.habits, record.as_ref()))
    }

    pub fn today(&self) -> Result<DaySnapshot> {
        self.day(Local::now().date_naive())
    }

    /// One summary per day of the inclusive range, from a single batched fetch.
    pub fn date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DaySummary>> {
        let records = self
            .source
            .records_in_range(start, end)
            .with_context(|| format!("fetching records in [{start}, {end}]"))?;
        debug!(
            records = records.len(),
            %start,
            %end,
            "aggregating date range"
        );
        Ok(aggregate::summarize_range(
            start,
            end,
            &self.habits,
            &records,
        ))
    }

    /// Consecutive fully-completed days ending at (or just before) `reference`.
    pub fn streak(&self, reference: NaiveDate) -> Result<u32> {
        streak::calculate_streak(reference, |date| Ok(self.day(date)?.all_completed()))
    }

    /// Whether any tracked collection changed since the last persisted token.
    /// At most one latest-edit lookup per collection.
    pub fn has_changes(&mut self) -> Result<bool> {
        let token = join_token(&self.collect_timestamps()?);
        Ok(self.detector.has_changes(&token))
    }

    /// Persist the change token after a successful update cycle.
    pub fn save_last_edited(&mut self) -> Result<()> {
        let source = &self.source;
        let timestamps = || -> Result<String> {
            let mut out = Vec::new();
            for collection in source.tracked_collections() {
                out.push(
                    source
                        .latest_edit(collection)
                        .context("fetching latest edit timestamp")?,
                );
            }
            Ok(join_token(&out))
        };
        self.detector.persist(timestamps)
    }

    fn collect_timestamps(&self) -> Result<Vec<String>> {
        let mut timestamps = Vec::new();
        for collection in self.source.tracked_collections() {
            timestamps.push(
                self.source
                    .latest_edit(collection)
                    .context("fetching latest edit timestamp")?,
            );
        }
        Ok(timestamps)
    }
}
