//! Catalog list - Entry Point

use catalog_list::config::{self, ResolvedConfig};
use catalog_list::console::{self, ConsoleRenderer};
use catalog_list::gateway::fixture::Catalog;
use catalog_list::gateway::FixtureGateway;
use catalog_list::model::{AppError, Source};
use catalog_list::registry::{InMemoryQuickSearchRegistry, InMemorySearchHistory};
use catalog_list::screen::{LaunchMode, ListScreen, ScreenOptions};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// How long the prompt waits for a fetch beyond its simulated latency.
const SETTLE_MARGIN: Duration = Duration::from_secs(5);

/// Catalog list - interactive searchable, paginated catalog browser
#[derive(Parser, Debug)]
#[command(name = "catalog-list")]
#[command(version)]
#[command(about = "Browse a paginated catalog with a multi-mode search bar")]
pub struct Args {
    /// JSON catalog to serve (uses the built-in sample if not provided)
    pub catalog: Option<PathBuf>,

    /// Backend variant: standard reports page counts, lofi only flags the last page
    #[arg(long, value_parser = parse_source)]
    pub source: Option<Source>,

    /// Entries per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Simulated latency of each fetch, in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Open on the popular listing instead of the homepage
    #[arg(short, long)]
    pub popular: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_source(value: &str) -> Result<Source, String> {
    Source::from_name(value).ok_or_else(|| format!("unknown source '{value}' (standard, lofi)"))
}

/// Defaults → Config File → Env Vars → CLI Args
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged)?;
    Ok(config::apply_cli_overrides(
        with_env,
        args.source,
        args.page_size.map(|n| n as usize),
        args.latency_ms,
        args.catalog.clone(),
    ))
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    catalog_list::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    info!(entries = catalog.len(), "Catalog loaded");

    let (gateway, completions) =
        FixtureGateway::new(catalog, config.page_size, config.fetch_latency());
    let mut screen = ListScreen::new(
        gateway,
        completions,
        InMemoryQuickSearchRegistry::new(),
        InMemorySearchHistory::new(config.history_capacity),
        ConsoleRenderer::new(io::stdout()),
        ScreenOptions {
            source: config.source,
            exit_interval: config.exit_interval(),
        },
    );

    let launch = if args.popular {
        LaunchMode::Popular
    } else {
        LaunchMode::Homepage
    };
    screen.open(launch);

    let settle = config.fetch_latency() + SETTLE_MARGIN;
    screen.wait_idle(settle);
    let result = console::run(&mut screen, io::stdin().lock(), settle);

    screen.destroy();
    info!("Exiting");
    result
}
