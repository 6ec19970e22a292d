use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
};

use habit_domain::day::DaySummary;

use crate::canvas::Canvas;
use crate::layout::{
    CALENDAR_CELL_GAP, CALENDAR_CELL_SIZE, CALENDAR_COLS, CALENDAR_MARGIN_TOP, CALENDAR_WIDTH,
    FONT_CALENDAR, FONT_CALENDAR_TITLE, HEADER_HEIGHT, MARGIN,
};
use crate::text::{draw_text, draw_text_centered};

/// Discrete visual density of one calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillTier {
    /// No data: outline only.
    Outline,
    /// Below half done: sparse single-direction diagonal hatch.
    SparseHatch,
    /// Half or more, not finished: dense two-direction crosshatch.
    CrossHatch,
    /// Everything done: solid fill inset 1px from the border.
    Solid,
}

impl FillTier {
    /// Tiers are exhaustive and mutually exclusive over [0, 1].
    pub fn for_ratio(ratio: f32) -> Self {
        if ratio <= 0.0 {
            FillTier::Outline
        } else if ratio < 0.5 {
            FillTier::SparseHatch
        } else if ratio < 1.0 {
            FillTier::CrossHatch
        } else {
            FillTier::Solid
        }
    }
}

/// Sunday-first column index for a date.
pub fn sunday_first_weekday(date: NaiveDate) -> i32 {
    (date.weekday().num_days_from_monday() as i32 + 1) % 7
}

/// (row, column) of a date's cell within its month grid.
pub fn cell_position(date: NaiveDate) -> (i32, i32) {
    let first_of_month = date.with_day(1).unwrap_or(date);
    let first_col = sunday_first_weekday(first_of_month);
    let days_since_first = (date - first_of_month).num_days() as i32;
    ((first_col + days_since_first) / 7, sunday_first_weekday(date))
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 1)
}

/// Draw one day cell with a fill pattern for its completion ratio.
pub fn draw_cell(canvas: &mut Canvas, x: i32, y: i32, size: i32, ratio: f32) {
    canvas.draw(
        &Rectangle::with_corners(Point::new(x, y), Point::new(x + size - 1, y + size - 1))
            .into_styled(stroke()),
    );

    match FillTier::for_ratio(ratio) {
        FillTier::Outline => {}
        FillTier::SparseHatch => {
            // 45° hatch, bottom-left to top-right, stride 3.
            let mut i = 0;
            while i < size * 2 {
                let x1 = x + (i - size).max(0);
                let y1 = y + i.min(size - 1);
                let x2 = x + i.min(size - 1);
                let y2 = y + (i - size).max(0);
                canvas.draw(&Line::new(Point::new(x1, y1), Point::new(x2, y2)).into_styled(stroke()));
                i += 3;
            }
        }
        FillTier::CrossHatch => {
            let mut i = 0;
            while i < size * 2 {
                // Bottom-left to top-right.
                let x1 = x + (i - size).max(0);
                let y1 = y + i.min(size - 1);
                let x2 = x + i.min(size - 1);
                let y2 = y + (i - size).max(0);
                canvas.draw(&Line::new(Point::new(x1, y1), Point::new(x2, y2)).into_styled(stroke()));
                // Top-left to bottom-right.
                let x1 = x + (i - size).max(0);
                let y1 = y + (size - 1 - i).max(0);
                let x2 = x + i.min(size - 1);
                let y2 = y + size - 1 - i.min(size - 1) + (i - size).max(0);
                canvas.draw(&Line::new(Point::new(x1, y1), Point::new(x2, y2)).into_styled(stroke()));
                i += 2;
            }
        }
        FillTier::Solid => {
            canvas.draw(
                &Rectangle::with_corners(
                    Point::new(x + 1, y + 1),
                    Point::new(x + size - 2, y + size - 2),
                )
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On)),
            );
        }
    }
}

/// Monthly grid for the month containing `anchor`: title and weekday
/// initials above, one patterned cell per day, LESS/MORE legend below. All
/// elements center on the calendar section.
pub fn draw_calendar(canvas: &mut Canvas, anchor: NaiveDate, history: &[DaySummary]) {
    let cell_step = CALENDAR_CELL_SIZE + CALENDAR_CELL_GAP;
    let grid_width = CALENDAR_COLS * cell_step - CALENDAR_CELL_GAP;

    let section_center = MARGIN + CALENDAR_WIDTH / 2;
    let grid_start_x = section_center - grid_width / 2;
    let grid_start_y = CALENDAR_MARGIN_TOP + 20;

    let month_title = anchor.format("%B %Y").to_string().to_uppercase();
    draw_text_centered(
        canvas,
        &month_title,
        section_center,
        HEADER_HEIGHT + 30,
        FONT_CALENDAR_TITLE,
    );

    let header_y = grid_start_y - 18;
    for (col, initial) in ["S", "M", "T", "W", "T", "F", "S"].iter().enumerate() {
        let header_x = grid_start_x + col as i32 * cell_step + CALENDAR_CELL_SIZE / 2 - 3;
        draw_text(canvas, initial, header_x, header_y, FONT_CALENDAR);
    }

    let completion_by_date: HashMap<NaiveDate, f32> = history
        .iter()
        .map(|summary| (summary.date, summary.completion_ratio()))
        .collect();

    let first_of_month = anchor.with_day(1).unwrap_or(anchor);
    let days_in_month = days_in_month(first_of_month);
    let first_day_col = sunday_first_weekday(first_of_month);

    for day_offset in 0..days_in_month {
        let date = first_of_month + Duration::days(day_offset as i64);
        let (row, col) = cell_position(date);
        let cell_x = grid_start_x + col * cell_step;
        let cell_y = grid_start_y + row * cell_step;
        let ratio = completion_by_date.get(&date).copied().unwrap_or(0.0);
        draw_cell(canvas, cell_x, cell_y, CALENDAR_CELL_SIZE, ratio);
    }

    // Legend sits below the last week row.
    let last_week_row = (first_day_col + days_in_month - 1) / 7;
    let legend_y = grid_start_y + (last_week_row + 1) * cell_step + 25;

    let legend_cell_size = 14;
    let legend_cell_step = legend_cell_size + 4;
    let less_width = 35;
    let more_width = 35;
    let cells_width = 4 * legend_cell_step;
    let total_legend_width = less_width + cells_width + more_width;

    let legend_start_x = section_center - total_legend_width / 2;
    draw_text(canvas, "LESS", legend_start_x, legend_y, FONT_CALENDAR);

    let cells_start_x = legend_start_x + less_width;
    for (i, ratio) in [0.0f32, 0.25, 0.75, 1.0].iter().enumerate() {
        draw_cell(
            canvas,
            cells_start_x + i as i32 * legend_cell_step,
            legend_y - 2,
            legend_cell_size,
            *ratio,
        );
    }
    draw_text(
        canvas,
        "MORE",
        cells_start_x + cells_width,
        legend_y,
        FONT_CALENDAR,
    );
}

fn days_in_month(first_of_month: NaiveDate) -> i32 {
    let (year, month) = (first_of_month.year(), first_of_month.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(next) => (next - first_of_month).num_days() as i32,
        None => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tiers_cover_the_unit_interval_exactly_once() {
        let mut r = 0.0f32;
        while r <= 1.0 {
            let tier = FillTier::for_ratio(r);
            let expected = if r == 0.0 {
                FillTier::Outline
            } else if r < 0.5 {
                FillTier::SparseHatch
            } else if r < 1.0 {
                FillTier::CrossHatch
            } else {
                FillTier::Solid
            };
            assert_eq!(tier, expected, "ratio {r}");
            r += 0.01;
        }
        assert_eq!(FillTier::for_ratio(0.5), FillTier::CrossHatch);
        assert_eq!(FillTier::for_ratio(1.0), FillTier::Solid);
    }

    #[test]
    fn month_starting_wednesday_places_day_one_in_column_three() {
        // April 2026 starts on a Wednesday.
        assert_eq!(cell_position(date(2026, 4, 1)), (0, 3));
    }

    #[test]
    fn day_k_lands_at_the_expected_row_and_column() {
        // August 2026 starts on a Saturday (column 6).
        let first_col = sunday_first_weekday(date(2026, 8, 1));
        assert_eq!(first_col, 6);
        for k in 1..=31i32 {
            let (row, col) = cell_position(date(2026, 8, k as u32));
            assert_eq!(row, (first_col + k - 1) / 7);
            assert_eq!(col, (first_col + k - 1) % 7);
        }
    }

    #[test]
    fn outline_cell_has_only_border_ink() {
        let mut canvas = Canvas::new();
        draw_cell(&mut canvas, 100, 100, 30, 0.0);
        assert!(canvas.is_ink(100, 100));
        assert!(canvas.is_ink(129, 129));
        assert!(!canvas.is_ink(115, 115), "interior stays empty");
    }

    #[test]
    fn solid_cell_fills_inset_interior() {
        let mut canvas = Canvas::new();
        draw_cell(&mut canvas, 100, 100, 30, 1.0);
        assert!(canvas.is_ink(115, 115));
        assert!(canvas.is_ink(101, 101));
        assert!(canvas.is_ink(128, 128));
    }

    #[test]
    fn hatch_densities_are_ordered() {
        let mut sparse = Canvas::new();
        draw_cell(&mut sparse, 0, 0, 30, 0.25);
        let mut cross = Canvas::new();
        draw_cell(&mut cross, 0, 0, 30, 0.75);
        let mut solid = Canvas::new();
        draw_cell(&mut solid, 0, 0, 30, 1.0);
        assert!(sparse.ink_count() < cross.ink_count());
        assert!(cross.ink_count() < solid.ink_count());
    }

    #[test]
    fn full_month_grid_renders_every_day() {
        let mut canvas = Canvas::new();
        let summaries: Vec<DaySummary> = (1..=26)
            .map(|d| DaySummary {
                date: date(2026, 8, d),
                completed_count: (d % 4) as usize,
                total_count: 3,
            })
            .collect();
        draw_calendar(&mut canvas, date(2026, 8, 26), &summaries);
        assert!(canvas.ink_count() > 1000);
    }
}
