use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tracked habit as configured, either statically or fetched from the
/// remote definition database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitDefinition {
    /// Name shown on the display.
    pub name: String,
    /// Key of the field holding this habit's value in a day record.
    pub field_key: String,
    /// Icon identifier, resolved by the renderer.
    pub icon: String,
    /// First date the habit is tracked (inclusive). Unset means always.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Date the habit was retired (exclusive from that date on).
    #[serde(default)]
    pub deactivated_date: Option<NaiveDate>,
}

impl HabitDefinition {
    /// Whether the habit's tracking window includes `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(deactivated) = self.deactivated_date {
            if date >= deactivated {
                return false;
            }
        }
        true
    }

    /// Window invariant: a retirement date never precedes the start date.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(deactivated)) = (self.start_date, self.deactivated_date) {
            if deactivated < start {
                return Err(format!(
                    "habit `{}` deactivated ({deactivated}) before it starts ({start})",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

/// Completion state of one habit on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitStatus {
    pub name: String,
    pub icon: String,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit(start: Option<(i32, u32, u32)>, deactivated: Option<(i32, u32, u32)>) -> HabitDefinition {
        HabitDefinition {
            name: "READ".to_string(),
            field_key: "Read".to_string(),
            icon: "book".to_string(),
            start_date: start.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            deactivated_date: deactivated.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unbounded_habit_is_always_active() {
        let h = habit(None, None);
        assert!(h.is_active_on(date(1970, 1, 1)));
        assert!(h.is_active_on(date(2099, 12, 31)));
    }

    #[test]
    fn inactive_before_start_date() {
        let h = habit(Some((2026, 3, 10)), None);
        assert!(!h.is_active_on(date(2026, 3, 9)));
        assert!(h.is_active_on(date(2026, 3, 10)));
        assert!(h.is_active_on(date(2026, 3, 11)));
    }

    #[test]
    fn deactivation_date_is_exclusive() {
        let h = habit(None, Some((2026, 5, 1)));
        assert!(h.is_active_on(date(2026, 4, 30)));
        assert!(!h.is_active_on(date(2026, 5, 1)));
        assert!(!h.is_active_on(date(2026, 5, 2)));
    }

    #[test]
    fn window_is_monotonic_at_both_ends() {
        let h = habit(Some((2026, 2, 1)), Some((2026, 6, 1)));
        // Once inactive before the start, every earlier day is inactive too.
        let mut d = date(2026, 1, 31);
        for _ in 0..40 {
            assert!(!h.is_active_on(d));
            d = d.pred_opt().unwrap();
        }
        // Once retired, every later day stays inactive.
        let mut d = date(2026, 6, 1);
        for _ in 0..40 {
            assert!(!h.is_active_on(d));
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let h = habit(Some((2026, 6, 1)), Some((2026, 2, 1)));
        assert!(h.validate().is_err());
        let h = habit(Some((2026, 2, 1)), Some((2026, 2, 1)));
        assert!(h.validate().is_ok());
    }
}
