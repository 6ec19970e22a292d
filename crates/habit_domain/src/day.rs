use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::HabitStatus;

/// Full per-habit detail for one day, as shown on the display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub habits: Vec<HabitStatus>,
    pub completed_count: usize,
    pub total_count: usize,
}

impl DaySnapshot {
    /// Counts are derived from the status list, never supplied by the caller.
    pub fn new(date: NaiveDate, habits: Vec<HabitStatus>) -> Self {
        let completed_count = habits.iter().filter(|h| h.completed).count();
        let total_count = habits.len();
        Self {
            date,
            habits,
            completed_count,
            total_count,
        }
    }

    pub fn all_completed(&self) -> bool {
        self.completed_count == self.total_count
    }
}

/// Aggregated completed/total counts for one day, used by the calendar view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub completed_count: usize,
    pub total_count: usize,
}

impl DaySummary {
    pub fn completion_ratio(&self) -> f32 {
        if self.total_count > 0 {
            self.completed_count as f32 / self.total_count as f32
        } else {
            0.0
        }
    }

    pub fn all_completed(&self) -> bool {
        self.completed_count == self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(completed: bool) -> HabitStatus {
        HabitStatus {
            name: "WATER".to_string(),
            icon: "water".to_string(),
            completed,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 26).unwrap()
    }

    #[test]
    fn snapshot_derives_counts() {
        let snapshot = DaySnapshot::new(date(), vec![status(true), status(false), status(true)]);
        assert_eq!(snapshot.completed_count, 2);
        assert_eq!(snapshot.total_count, 3);
        assert!(!snapshot.all_completed());
    }

    #[test]
    fn empty_snapshot_counts_as_fully_completed() {
        // 0 == 0 under the source's definition; pinned on purpose, see DESIGN.md.
        let snapshot = DaySnapshot::new(date(), Vec::new());
        assert!(snapshot.all_completed());
    }

    #[test]
    fn completion_ratio_stays_in_unit_interval() {
        for completed in 0..=4 {
            let summary = DaySummary {
                date: date(),
                completed_count: completed,
                total_count: 4,
            };
            let ratio = summary.completion_ratio();
            assert!((0.0..=1.0).contains(&ratio));
        }
    }

    #[test]
    fn zero_total_has_zero_ratio() {
        let summary = DaySummary {
            date: date(),
            completed_count: 0,
            total_count: 0,
        };
        assert_eq!(summary.completion_ratio(), 0.0);
        assert!(summary.all_completed());
    }
}
