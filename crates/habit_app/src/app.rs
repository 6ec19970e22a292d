use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use tracing::{info, warn};

use habit_domain::day::DaySummary;
use habit_domain::habit::HabitDefinition;
use habit_domain::source::SourceError;
use habit_domain::HabitService;
use habit_render::{Canvas, Renderer};

use crate::config::Config;
use crate::display::{self, DisplaySink, PreviewSink, Rotation};
use crate::{demo, notion::NotionClient};

/// Token file sitting next to the binary; deleting it forces a refresh.
pub const STATE_FILE: &str = ".last_notion_edit";

/// Update the attached display, skipping the refresh entirely when nothing
/// changed upstream. `force` bypasses the change check.
pub fn run_display(config: &Config, force: bool) -> Result<()> {
    let mut service = build_service(config);

    if force {
        info!("forced refresh, skipping change detection");
    } else if !service.has_changes().context("checking for changes")? {
        info!("no changes since last refresh, leaving display untouched");
        return Ok(());
    }

    // Only after the change gate: a no-change run must not query the
    // definition database at all.
    refresh_habits(&mut service, config)?;

    let today = Local::now().date_naive();
    let canvas = compose_frame(&service, config, today)?;

    let mut sink = display::detect(&config.display);
    push_frame(sink.as_mut(), &canvas)?;

    service
        .save_last_edited()
        .context("persisting change token")?;
    info!("display updated");
    Ok(())
}

/// Render to a PNG without touching any panel. With `use_demo` the frame is
/// built from fixed sample data and needs no credentials.
pub fn run_preview(config: &Config, output: Option<&Path>, use_demo: bool) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.display.output.clone());
    let today = Local::now().date_naive();

    let canvas = if use_demo {
        demo_frame(config, today)
    } else {
        let mut service = build_service(config);
        refresh_habits(&mut service, config)?;
        compose_frame(&service, config, today)?
    };

    let rotation = Rotation::from_degrees(config.display.rotation).unwrap_or(Rotation::None);
    let mut sink = PreviewSink::new(output, rotation);
    sink.show(&canvas)
}

fn build_service(config: &Config) -> HabitService<NotionClient> {
    let client = NotionClient::new(&config.notion);
    HabitService::new(client, config.habits.clone(), state_path())
}

/// Swap in definitions from the remote definition database when one is
/// configured. A fetch failure aborts the run; the configured habits may
/// legitimately be empty, so rendering without fresh definitions would put
/// a blank board on the panel.
fn refresh_habits(service: &mut HabitService<NotionClient>, config: &Config) -> Result<()> {
    if !config.has_dynamic_habits() {
        return Ok(());
    }
    let fetched = service.source().fetch_habit_definitions();
    if let Some(habits) = dynamic_habits(fetched).context("fetching habit definitions")? {
        service.replace_habits(habits);
    }
    Ok(())
}

fn dynamic_habits(
    fetched: Result<Vec<HabitDefinition>, SourceError>,
) -> Result<Option<Vec<HabitDefinition>>, SourceError> {
    match fetched {
        Ok(habits) if !habits.is_empty() => Ok(Some(habits)),
        Ok(_) => {
            warn!("habit database returned no definitions, keeping configured habits");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn compose_frame(
    service: &HabitService<NotionClient>,
    config: &Config,
    today: NaiveDate,
) -> Result<Canvas> {
    let snapshot = service.day(today).context("fetching today's habits")?;
    info!(
        completed = snapshot.completed_count,
        total = snapshot.total_count,
        "fetched today's snapshot"
    );

    let streak = if config.streak.enabled {
        service.streak(today).context("calculating streak")?
    } else {
        0
    };

    let history = if config.calendar.enabled {
        Some(month_history(service, today)?)
    } else {
        None
    };

    let mut renderer = Renderer::new(&config.display.assets_dir);
    Ok(renderer.render(&snapshot, streak, history.as_deref()))
}

fn demo_frame(config: &Config, today: NaiveDate) -> Canvas {
    let (snapshot, streak, history) = demo::demo_data(today);
    let history = config.calendar.enabled.then_some(history.as_slice());
    let mut renderer = Renderer::new(&config.display.assets_dir);
    renderer.render(&snapshot, streak, history)
}

/// Month-to-date summaries feeding the calendar, in one batched fetch.
fn month_history(
    service: &HabitService<NotionClient>,
    today: NaiveDate,
) -> Result<Vec<DaySummary>> {
    let month_start = today.with_day(1).unwrap_or(today);
    service
        .date_range(month_start, today)
        .context("fetching month history")
}

fn push_frame(sink: &mut dyn DisplaySink, canvas: &Canvas) -> Result<()> {
    sink.init().context("initializing display")?;
    let result = sink.show(canvas).context("pushing frame to display");
    // Always try to park the panel, even after a failed refresh.
    let parked = sink
        .sleep()
        .and_then(|_| sink.release())
        .context("releasing display");
    result.and(parked)
}

fn state_path() -> PathBuf {
    PathBuf::from(STATE_FILE)
}
