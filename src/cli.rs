//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::commands::{Command, MAX_WEEK};
use crate::scheduler::Job;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LeagueBot - fantasy football league reports for Sleeper leagues
///
/// Standings, matchups, rosters, awards and more, straight from the
/// Sleeper API. Run `serve` to post weekly recaps, previews and daily
/// news to a Discord channel.
///
/// Examples:
///   leaguebot --league-id 1048... standings
///   leaguebot matchup --week 3
///   leaguebot h2h alice bob --format json
///   leaguebot job preview
///   leaguebot serve
///   leaguebot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Sleeper league id
    #[arg(long, global = true, value_name = "ID", env = "SLEEPER_LEAGUE_ID")]
    pub league_id: Option<String>,

    /// Base URL of the Sleeper API
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Pin the current week instead of asking the API
    #[arg(long, global = true, value_name = "WEEK")]
    pub current_week: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Discord webhook for scheduled posts
    ///
    /// When unset, scheduled posts are printed to stdout.
    #[arg(long, global = true, value_name = "URL", env = "DISCORD_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Port for the health endpoints when running `serve`
    #[arg(long, global = true, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .leaguebot.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .leaguebot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show current league standings
    Standings,
    /// Show matchups for a week (defaults to the current week)
    Matchup {
        /// Week number (1-18)
        #[arg(short, long)]
        week: Option<u32>,
    },
    /// Show a team's roster
    Roster {
        /// Part of the team owner's name
        #[arg(short, long)]
        team: Option<String>,
    },
    /// Show recent trades
    Trades,
    /// Show recent waiver and free-agent moves
    Waivers,
    /// Best, worst and average scores for a week
    Performances {
        /// Week number (1-18)
        #[arg(short, long)]
        week: Option<u32>,
    },
    /// Season awards so far
    Awards,
    /// Rank teams by recent scoring
    PowerRankings {
        /// Number of recent weeks to analyze
        #[arg(short, long)]
        weeks: Option<u32>,
    },
    /// Who is in and who is out of the playoffs
    Playoffs,
    /// All-time record between two teams
    H2h {
        /// Part of the first owner's name
        team_a: String,
        /// Part of the second owner's name
        team_b: String,
    },
    /// Injured players on league rosters
    Injuries,
    /// Trending players nobody has rostered
    Targets {
        /// Maximum number of players to list
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Call out the bottom of the standings
    Roast {
        /// Number of teams to roast
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Run a scheduled post once and deliver it now
    Job {
        #[arg(value_enum)]
        job: Job,
    },
    /// Run the scheduler and the health endpoints
    Serve,
}

impl CliCommand {
    /// The league command this invocation maps to, if it is one.
    pub fn to_command(&self) -> Option<Command> {
        let command = match self {
            CliCommand::Standings => Command::Standings,
            CliCommand::Matchup { week } => Command::Matchups { week: *week },
            CliCommand::Roster { team } => Command::Roster { team: team.clone() },
            CliCommand::Trades => Command::Trades,
            CliCommand::Waivers => Command::Waivers,
            CliCommand::Performances { week } => Command::Performances { week: *week },
            CliCommand::Awards => Command::Awards,
            CliCommand::PowerRankings { weeks } => Command::PowerRankings { weeks: *weeks },
            CliCommand::Playoffs => Command::Playoffs,
            CliCommand::H2h { team_a, team_b } => Command::HeadToHead {
                team_a: team_a.clone(),
                team_b: team_b.clone(),
            },
            CliCommand::Injuries => Command::Injuries,
            CliCommand::Targets { limit } => Command::Targets { limit: *limit },
            CliCommand::Roast { count } => Command::Roast { count: *count },
            CliCommand::Job { .. } | CliCommand::Serve => return None,
        };
        Some(command)
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Chat-style text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("No command given. Run with --help to see available commands".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(week) = self.current_week {
            if !(1..=MAX_WEEK).contains(&week) {
                return Err(format!("Current week must be between 1 and {}", MAX_WEEK));
            }
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
