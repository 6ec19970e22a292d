use anyhow::Result;
use chrono::{Duration, NaiveDate};

/// Upper bound on backward steps, so the walk always terminates.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Count consecutive fully-completed days walking backward from `reference`.
///
/// The reference day itself gets one concession: if it is not fully completed
/// and nothing has been counted yet, the walk skips it and continues from the
/// previous day. An in-progress "today" must not zero an existing streak.
///
/// `day_provider` answers whether a given date was fully completed; a
/// provider failure aborts the calculation.
pub fn calculate_streak<F>(reference: NaiveDate, mut day_provider: F) -> Result<u32>
where
    F: FnMut(NaiveDate) -> Result<bool>,
{
    let mut streak = 0u32;
    let mut current = reference;

    for _ in 0..MAX_LOOKBACK_DAYS {
        if day_provider(current)? {
            streak += 1;
            current -= Duration::days(1);
        } else if current == reference && streak == 0 {
            current -= Duration::days(1);
        } else {
            break;
        }
    }

    Ok(streak)
}
