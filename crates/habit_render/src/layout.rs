use std::path::Path;

use chrono::NaiveDate;
use embedded_graphics::{
    mono_font::{ascii, iso_8859_1, MonoFont},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
};
use tracing::debug;

use habit_domain::day::{DaySnapshot, DaySummary};
use habit_domain::habit::HabitStatus;

use crate::calendar::draw_calendar;
use crate::canvas::{Canvas, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::icons::{IconCache, ICON_SIZE};
use crate::text::{draw_text, draw_text_centered, text_width};

pub(crate) const MARGIN: i32 = 20;
pub(crate) const HEADER_HEIGHT: i32 = 60;
pub(crate) const FOOTER_HEIGHT: i32 = 80;
pub(crate) const HABIT_ROW_HEIGHT: i32 = 50;

pub(crate) const CALENDAR_WIDTH: i32 = 340;
pub(crate) const DIVIDER_X: i32 = CALENDAR_WIDTH + MARGIN;
pub(crate) const HABITS_AREA_X: i32 = DIVIDER_X + 10;

pub(crate) const CALENDAR_CELL_SIZE: i32 = 30;
pub(crate) const CALENDAR_CELL_GAP: i32 = 4;
pub(crate) const CALENDAR_COLS: i32 = 7;
pub(crate) const CALENDAR_MARGIN_TOP: i32 = 110;

const WIDTH: i32 = DISPLAY_WIDTH as i32;
const HEIGHT: i32 = DISPLAY_HEIGHT as i32;
const PROGRESS_BAR_WIDTH: i32 = 350;
const PROGRESS_BAR_HEIGHT: i32 = 16;

pub(crate) const FONT_TITLE: &MonoFont<'static> = &ascii::FONT_10X20;
pub(crate) const FONT_DATE: &MonoFont<'static> = &iso_8859_1::FONT_7X13;
pub(crate) const FONT_HABIT: &MonoFont<'static> = &ascii::FONT_7X13;
pub(crate) const FONT_PROGRESS: &MonoFont<'static> = &ascii::FONT_6X10;
pub(crate) const FONT_STREAK: &MonoFont<'static> = &ascii::FONT_6X10;
pub(crate) const FONT_CALENDAR: &MonoFont<'static> = &ascii::FONT_5X8;
pub(crate) const FONT_CALENDAR_TITLE: &MonoFont<'static> = &ascii::FONT_6X10;

/// Row height for a habit list: rows compress to fit the available space
/// but never grow past the default.
pub fn row_height(default: i32, available_height: i32, habit_count: usize) -> i32 {
    default.min(available_height / habit_count.max(1) as i32)
}

fn stroke(width: u32) -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, width)
}

fn inner_stroke(width: u32) -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyleBuilder::new()
        .stroke_color(BinaryColor::On)
        .stroke_width(width)
        .stroke_alignment(StrokeAlignment::Inside)
        .build()
}

/// Turns aggregated habit data into the finished 800×480 frame. Owns the
/// icon cache for its lifetime; one instance per run.
pub struct Renderer {
    icons: IconCache,
}

impl Renderer {
    /// `assets_dir` holds an `icons/` directory with one PNG per icon id.
    pub fn new(assets_dir: impl AsRef<Path>) -> Self {
        Self {
            icons: IconCache::new(assets_dir.as_ref().join("icons")),
        }
    }

    /// Compose the full frame. A non-empty `history` selects the split
    /// layout with the monthly calendar; this is the only branch point.
    pub fn render(
        &mut self,
        snapshot: &DaySnapshot,
        streak: u32,
        history: Option<&[DaySummary]>,
    ) -> Canvas {
        let mut canvas = Canvas::new();
        draw_border(&mut canvas);

        match history {
            Some(history) if !history.is_empty() => {
                debug!(days = history.len(), "rendering split layout");
                self.render_split(&mut canvas, snapshot, streak, history);
            }
            _ => {
                debug!("rendering full layout");
                self.render_full(&mut canvas, snapshot, streak);
            }
        }
        canvas
    }

    fn render_full(&mut self, canvas: &mut Canvas, snapshot: &DaySnapshot, streak: u32) {
        draw_header(canvas, snapshot.date);

        let habits_start_y = HEADER_HEIGHT + 30;
        let available_height = HEIGHT - habits_start_y - FOOTER_HEIGHT - 20;
        if !snapshot.habits.is_empty() {
            let row = row_height(HABIT_ROW_HEIGHT, available_height, snapshot.habits.len());
            for (i, habit) in snapshot.habits.iter().enumerate() {
                self.draw_habit_row(
                    canvas,
                    habits_start_y + i as i32 * row,
                    habit,
                    MARGIN + 30,
                    WIDTH - MARGIN,
                );
            }
        }

        let footer_y = HEIGHT - FOOTER_HEIGHT;
        draw_footer_separator(canvas, footer_y);

        let progress_y = footer_y + 15;
        draw_progress_bar(
            canvas,
            progress_y,
            snapshot.completed_count,
            snapshot.total_count,
            WIDTH / 2,
        );
        draw_streak(canvas, progress_y + 42, streak, WIDTH / 2);
    }

    fn render_split(
        &mut self,
        canvas: &mut Canvas,
        snapshot: &DaySnapshot,
        streak: u32,
        history: &[DaySummary],
    ) {
        draw_header(canvas, snapshot.date);

        canvas.draw(
            &Line::new(
                Point::new(DIVIDER_X, HEADER_HEIGHT + 5),
                Point::new(DIVIDER_X, HEIGHT - FOOTER_HEIGHT - 5),
            )
            .into_styled(stroke(2)),
        );

        draw_calendar(canvas, snapshot.date, history);

        let habits_start_x = HABITS_AREA_X;
        let habits_end_x = WIDTH - MARGIN - 20;
        let habits_start_y = HEADER_HEIGHT + 15;
        let available_height = HEIGHT - habits_start_y - FOOTER_HEIGHT - 10;
        if !snapshot.habits.is_empty() {
            let row = row_height(HABIT_ROW_HEIGHT - 5, available_height, snapshot.habits.len());
            for (i, habit) in snapshot.habits.iter().enumerate() {
                self.draw_habit_row(
                    canvas,
                    habits_start_y + i as i32 * row,
                    habit,
                    habits_start_x,
                    habits_end_x,
                );
            }
        }

        // Footer elements stay centered across the full canvas width, not
        // within the habit region.
        let footer_y = HEIGHT - FOOTER_HEIGHT;
        draw_footer_separator(canvas, footer_y);

        let progress_y = footer_y + 15;
        draw_progress_bar(
            canvas,
            progress_y,
            snapshot.completed_count,
            snapshot.total_count,
            WIDTH / 2,
        );
        draw_streak(canvas, progress_y + 42, streak, WIDTH / 2);
    }

    fn draw_habit_row(
        &mut self,
        canvas: &mut Canvas,
        y: i32,
        habit: &HabitStatus,
        start_x: i32,
        end_x: i32,
    ) {
        let icon_y = y + (HABIT_ROW_HEIGHT - ICON_SIZE as i32) / 2;
        self.icons.get(&habit.icon).paste(canvas, start_x, icon_y);

        let text_x = start_x + ICON_SIZE as i32 + 15;
        let text_y = y + (HABIT_ROW_HEIGHT - 12) / 2;
        draw_text(canvas, &habit.name, text_x, text_y, FONT_HABIT);

        let checkbox_y = y + (HABIT_ROW_HEIGHT - 28) / 2;
        draw_checkbox(canvas, end_x - 40, checkbox_y, habit.completed);
    }
}

fn draw_border(canvas: &mut Canvas) {
    canvas.draw(
        &Rectangle::with_corners(Point::new(4, 4), Point::new(WIDTH - 5, HEIGHT - 5))
            .into_styled(inner_stroke(2)),
    );
    canvas.draw(
        &Rectangle::with_corners(Point::new(10, 10), Point::new(WIDTH - 11, HEIGHT - 11))
            .into_styled(inner_stroke(1)),
    );
}

fn draw_header(canvas: &mut Canvas, date: NaiveDate) {
    let header_y = 20;
    draw_text(canvas, "* DAILY QUESTS *", MARGIN + 40, header_y, FONT_TITLE);

    // FONT_DATE covers ISO-8859-1 only, which has no bullet (U+2022); the
    // middle dot is the nearest separator the font can actually draw.
    let date_str = date.format("%a \u{b7} %b %d \u{b7} %Y").to_string().to_uppercase();
    let date_x = WIDTH - MARGIN - text_width(FONT_DATE, &date_str) - 40;
    draw_text(canvas, &date_str, date_x, header_y + 4, FONT_DATE);

    canvas.draw(
        &Line::new(
            Point::new(MARGIN, header_y + 40),
            Point::new(WIDTH - MARGIN, header_y + 40),
        )
        .into_styled(stroke(2)),
    );
}

fn draw_checkbox(canvas: &mut Canvas, x: i32, y: i32, checked: bool) {
    let box_size = 28;
    canvas.draw(
        &Rectangle::with_corners(Point::new(x, y), Point::new(x + box_size, y + box_size))
            .into_styled(inner_stroke(2)),
    );
    if checked {
        canvas.draw(
            &Line::new(Point::new(x + 6, y + 14), Point::new(x + 11, y + 20))
                .into_styled(stroke(3)),
        );
        canvas.draw(
            &Line::new(Point::new(x + 11, y + 20), Point::new(x + 22, y + 8))
                .into_styled(stroke(3)),
        );
    }
}

fn draw_progress_bar(canvas: &mut Canvas, y: i32, completed: usize, total: usize, center_x: i32) {
    let label = format!("QUEST PROGRESS  {completed}/{total} DONE");
    draw_text_centered(canvas, &label, center_x, y, FONT_PROGRESS);

    let bar_x = center_x - PROGRESS_BAR_WIDTH / 2;
    let bar_y = y + 18;
    canvas.draw(
        &Rectangle::with_corners(
            Point::new(bar_x, bar_y),
            Point::new(bar_x + PROGRESS_BAR_WIDTH, bar_y + PROGRESS_BAR_HEIGHT),
        )
        .into_styled(inner_stroke(2)),
    );

    if total == 0 {
        return;
    }
    // Blocky fill: quantized into 4px segments rather than one smooth run.
    let fill_width = ((completed as f32 / total as f32) * (PROGRESS_BAR_WIDTH - 4) as f32) as i32;
    let mut i = 0;
    while i < fill_width {
        let segment_width = (fill_width - i).min(4);
        canvas.draw(
            &Rectangle::with_corners(
                Point::new(bar_x + 2 + i, bar_y + 2),
                Point::new(bar_x + 2 + i + segment_width - 1, bar_y + PROGRESS_BAR_HEIGHT - 2),
            )
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On)),
        );
        i += 4;
    }
}

fn draw_streak(canvas: &mut Canvas, y: i32, streak: u32, center_x: i32) {
    let text = format!("* STREAK: {streak} DAYS *");
    draw_text_centered(canvas, &text, center_x, y, FONT_STREAK);
}

fn draw_footer_separator(canvas: &mut Canvas, y: i32) {
    canvas.draw(
        &Line::new(Point::new(MARGIN, y), Point::new(WIDTH - MARGIN, y)).into_styled(stroke(2)),
    );
}
