use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;

use tuneup::commands::Context;
use tuneup::config;
use tuneup::console::Terminal;
use tuneup::executor::ShellExecutor;
use tuneup::interrupt::InterruptFlags;
use tuneup::{logging, menu, platform};

#[derive(Parser)]
#[command(name = "tuneup", version, about = "Interactive system maintenance for macOS and Windows")]
struct Cli {
    /// Path to config file (default: <config dir>/tuneup/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Diagnostic log file (overrides config)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(path) = cli.log_file {
        settings.log_file = Some(path);
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }
    logging::init(&settings);

    let platform = platform::detect();
    info!(%platform, version = env!("CARGO_PKG_VERSION"), "tuneup starting");

    let interrupt = InterruptFlags::install().context("installing interrupt handler")?;

    let executor = ShellExecutor::new();
    let mut terminal = Terminal::new(interrupt);
    let mut ctx = Context {
        platform,
        settings: &settings,
        executor: &executor,
        console: &mut terminal,
    };
    menu::run(&mut ctx)?;

    info!("tuneup finished");
    Ok(())
}
