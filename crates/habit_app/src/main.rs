use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use habit_app::{app, config::Config};

/// Habit status board for a two-color e-paper panel.
#[derive(Debug, Parser)]
#[command(name = "questboard", version, about)]
struct Cli {
    /// Render to a PNG instead of the panel
    #[arg(long)]
    preview: bool,

    /// Use fixed sample data, no credentials needed
    #[arg(long)]
    demo: bool,

    /// Preview output path (defaults to the configured one)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file path (defaults to config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Refresh even when no upstream change is detected
    #[arg(short, long)]
    force: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        // Demo mode renders sample data and never talks to the API.
        Err(_) if cli.demo && cli.config.is_none() => Config::demo_defaults(),
        Err(err) => return Err(err.into()),
    };

    if cli.preview || cli.demo {
        app::run_preview(&config, cli.output.as_deref(), cli.demo)
    } else {
        app::run_display(&config, cli.force)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
