use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use habit_domain::day::{DaySnapshot, DaySummary};
use habit_domain::habit::HabitStatus;

const DEMO_SEED: u64 = 42;
pub const DEMO_STREAK: u32 = 7;

/// A fixed day of sample habits plus a seeded month of history, for
/// previewing layouts without any remote data.
pub fn demo_data(today: NaiveDate) -> (DaySnapshot, u32, Vec<DaySummary>) {
    let statuses = vec![
        status("DRINK WATER", "water", false),
        status("PLAY CHESS", "chess", true),
        status("WRITE NOTES", "notes", true),
        status("WALK THE DOG", "dog", true),
        status("EXERCISE", "exercise", false),
        status("READ A BOOK", "book", true),
    ];
    let snapshot = DaySnapshot::new(today, statuses);
    let history = demo_history(today);
    (snapshot, DEMO_STREAK, history)
}

fn status(name: &str, icon: &str, completed: bool) -> HabitStatus {
    HabitStatus {
        name: name.to_string(),
        icon: icon.to_string(),
        completed,
    }
}

/// Seeded so the preview image is identical on every run.
fn demo_history(today: NaiveDate) -> Vec<DaySummary> {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let total_count = 6_usize;
    let first = today.with_day(1).unwrap_or(today);
    first
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| {
            let completed_count = if date == today {
                4
            } else {
                rng.gen_range(0..=total_count)
            };
            DaySummary {
                date,
                completed_count,
                total_count,
            }
        })
        .collect()
}
