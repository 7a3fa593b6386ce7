use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use benchwatch::config::{Config, ConfigOverrides};
use benchwatch::fetch::HttpPageFetcher;
use benchwatch::history::HistoryStore;
use benchwatch::monitor::{CycleOutcome, Monitor};
use benchwatch::notify::{NotifySink, PushoverSink, StdoutSink};
use benchwatch::output::{render_changes_table, render_json, render_snapshot_table};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "benchwatch",
    about = "Leaderboard change monitor for the Artificial Analysis benchmark indices"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    url: Option<String>,
    /// Only ranks within this band are reported.
    #[arg(long = "top-n")]
    top_n: Option<usize>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a single check cycle and exit.
    Once,
    /// Run check cycles on an interval.
    Watch {
        #[arg(long = "interval-mins")]
        interval_mins: Option<u64>,
        /// Stop after this many cycles instead of running forever.
        #[arg(long)]
        iterations: Option<u32>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        url: cli.url.clone(),
        top_n: cli.top_n,
        interval_minutes: None,
    });

    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }

    let sinks = build_sinks(&config).await?;
    let store = HistoryStore::load(
        config.resolved_history_path(),
        config.resolved_data_path(),
    );
    let fetcher = HttpPageFetcher::new(config.resolved_page_dump());
    let mut monitor = Monitor::new(
        Box::new(fetcher),
        sinks,
        store,
        config.source.url.clone(),
        config.monitor.top_n,
    );

    match cli.command {
        Commands::Once => {
            let outcome = monitor.run_cycle().await?;
            print_outcome(&outcome, cli.output, config.monitor.top_n)?;
        }
        Commands::Watch {
            interval_mins,
            iterations,
        } => {
            let minutes = interval_mins.unwrap_or(config.monitor.interval_minutes).max(1);
            info!("watching every {minutes} minutes");
            monitor
                .run_watch(Duration::from_secs(minutes * 60), iterations)
                .await;
        }
        Commands::Config { .. } => unreachable!("config command handled before dispatch"),
    }

    Ok(())
}

/// Stdout is optional; Pushover joins when both credentials resolve and
/// validate. Credentials that fail validation are a startup error, not a
/// silent no-op.
async fn build_sinks(config: &Config) -> Result<Vec<Box<dyn NotifySink>>> {
    let mut sinks: Vec<Box<dyn NotifySink>> = Vec::new();
    if config.notify.enable_stdout {
        sinks.push(Box::new(StdoutSink));
    }
    match config.notify.pushover_credentials()? {
        Some((user_key, api_token)) => {
            let sink = PushoverSink::new(api_token, user_key);
            sink.validate()
                .await
                .context("Pushover credential validation failed")?;
            info!("pushover credentials validated");
            sinks.push(Box::new(sink));
        }
        None => warn!("pushover credentials not configured; notifications go to stdout only"),
    }
    Ok(sinks)
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &PathBuf,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_outcome(outcome: &CycleOutcome, format: OutputFormat, top_n: usize) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", render_json(outcome)?);
        return Ok(());
    }
    match outcome {
        CycleOutcome::Skipped => {
            println!("No data extracted; nothing to compare.");
        }
        CycleOutcome::Baseline { snapshot } => {
            println!("Baseline established; changes will be reported from the next run.");
            println!("{}", render_snapshot_table(snapshot, top_n));
        }
        CycleOutcome::Checked { snapshot, changes } => {
            println!("{}", render_snapshot_table(snapshot, top_n));
            if changes.iter().all(|c| c.is_empty()) {
                println!("No ranking changes.");
            } else {
                println!("{}", render_changes_table(changes));
            }
        }
    }
    Ok(())
}
