//! LeagueBot - fantasy football league reports for Sleeper leagues
//!
//! A CLI and long-running service that reads a league from the Sleeper
//! read-only API and renders standings, matchups, awards and more, either
//! on demand or as scheduled Discord posts.
//!
//! Exit codes:
//!   0 - Success (including "nothing to report")
//!   1 - Runtime error (configuration, startup, server)
//!   2 - The league command failed (data unavailable, team not found, bad argument)

mod analysis;
mod cli;
mod commands;
mod config;
mod delivery;
mod error;
mod health;
mod identity;
mod models;
mod report;
mod scheduler;
mod source;

use anyhow::{Context, Result};
use cli::{Args, CliCommand, OutputFormat};
use commands::{Command, LeagueService};
use config::{Config, DEFAULT_CONFIG_FILE};
use delivery::{DeliverySink, DiscordWebhook, StdoutSink};
use health::{HealthServer, HealthState};
use scheduler::{Job, Scheduler};
use source::SleeperClient;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("LeagueBot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("LeagueBot failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .leaguebot.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set [league] id, then adjust report limits and the post schedule.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load config, wire collaborators, and dispatch the subcommand.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let source = SleeperClient::new(
        &config.league.api_url,
        &config.league.id,
        config.league.timeout_seconds,
    )?;
    let service = Arc::new(LeagueService::new(
        Arc::new(source),
        config.reports.clone(),
        config.league.current_week,
    ));

    let Some(command) = args.command.clone() else {
        return Ok(0);
    };

    match command {
        CliCommand::Serve => serve(service, &config).await,
        CliCommand::Job { job } => run_scheduled_job(&service, &config, job, args.format).await,
        other => match other.to_command() {
            Some(cmd) => run_command(&service, &cmd, args.format).await,
            None => Ok(0),
        },
    }
}

/// Run one league command. All pipeline failures stop here.
async fn run_command(service: &LeagueService, command: &Command, format: OutputFormat) -> Result<i32> {
    match service.run(command).await {
        Ok(report) => {
            let output = match format {
                OutputFormat::Json => report::generate_json_report(&report)?,
                OutputFormat::Text => report::generate_text_report(&report),
            };
            println!("{}", output);
            Ok(0)
        }
        Err(e) => {
            warn!("Command {} failed: {}", command.name(), e);
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "error": e.to_string(), "message": e.user_message() })
                ),
                OutputFormat::Text => eprintln!("{}", e.user_message()),
            }
            Ok(2)
        }
    }
}

/// Run a scheduled post once. With `--format json` the digest is printed
/// instead of delivered.
async fn run_scheduled_job(
    service: &LeagueService,
    config: &Config,
    job: Job,
    format: OutputFormat,
) -> Result<i32> {
    let outcome = match format {
        OutputFormat::Json => scheduler::build_digest(service, job).await.map(|digest| {
            match digest {
                Some(d) => match report::generate_json_report(&d) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Failed to encode digest: {}", e),
                },
                None => println!("null"),
            }
        }),
        OutputFormat::Text => {
            let sink = build_sink(config)?;
            scheduler::run_job(service, sink.as_ref(), job)
                .await
                .map(|delivered| {
                    if !delivered {
                        println!("Nothing to post for {} right now.", job);
                    }
                })
        }
    };

    match outcome {
        Ok(()) => Ok(0),
        Err(e) => {
            error!("Job {} failed: {}", job, e);
            eprintln!("{}", e.user_message());
            Ok(2)
        }
    }
}

/// Run the scheduler and the health endpoints until one of them stops.
async fn serve(service: Arc<LeagueService>, config: &Config) -> Result<i32> {
    let mut tasks = Vec::new();

    if config.server.enabled {
        let state = Arc::new(HealthState::new(config.league.id.clone()));
        let server = HealthServer::new(state, config.server.port);
        tasks.push(tokio::spawn(async move { server.run().await }));
    }

    if config.schedule.enabled {
        let sink = build_sink(config)?;
        let scheduler = Scheduler::new(service, sink, config.schedule.clone());
        tasks.push(tokio::spawn(scheduler.start()));
    }

    if tasks.is_empty() {
        warn!("Both the scheduler and the HTTP server are disabled; nothing to serve");
        return Ok(0);
    }

    println!("🏈 LeagueBot serving league {}", config.league.id);

    for result in futures::future::join_all(tasks).await {
        result.context("Service task panicked")??;
    }

    Ok(0)
}

/// Webhook delivery when configured, stdout otherwise.
fn build_sink(config: &Config) -> Result<Arc<dyn DeliverySink>> {
    match config.delivery.webhook_url {
        Some(ref url) => {
            let hook = DiscordWebhook::new(url.clone(), config.league.timeout_seconds)?;
            Ok(Arc::new(hook))
        }
        None => {
            info!("No webhook configured, scheduled posts go to stdout");
            Ok(Arc::new(StdoutSink))
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
