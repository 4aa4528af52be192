//! Configuration file handling.
//!
//! This module handles loading, validating, and merging configuration from
//! `.leaguebot.toml` files.

use crate::commands::MAX_WEEK;
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".leaguebot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// League and data source settings.
    #[serde(default)]
    pub league: LeagueConfig,

    /// Report caps and windows.
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Scheduled post times.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Where scheduled posts go.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Health endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// League and data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Sleeper league id.
    #[serde(default)]
    pub id: String,

    /// Sleeper API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Pin the current week instead of asking the API.
    #[serde(default)]
    pub current_week: Option<u32>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
            current_week: None,
        }
    }
}

fn default_api_url() -> String {
    crate::source::sleeper::SLEEPER_API.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Report tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Most recent trades to show.
    #[serde(default = "default_trade_limit")]
    pub trade_limit: usize,

    /// Most recent waiver/free-agent moves to show.
    #[serde(default = "default_waiver_limit")]
    pub waiver_limit: usize,

    /// Available trending targets to show.
    #[serde(default = "default_target_limit")]
    pub target_limit: usize,

    /// Trending feed lookback window.
    #[serde(default = "default_lookback_hours")]
    pub trending_lookback_hours: u32,

    /// Entries requested from the trending feed before filtering.
    #[serde(default = "default_trending_fetch_limit")]
    pub trending_fetch_limit: u32,

    /// Weeks feeding power rankings.
    #[serde(default = "default_power_weeks")]
    pub power_weeks: u32,

    /// Teams roasted when no count is given.
    #[serde(default = "default_roast_count")]
    pub roast_count: usize,

    /// Add-count a trending target needs to make the daily news.
    #[serde(default = "default_news_min_adds")]
    pub news_min_adds: u32,

    /// Standings rows included in the weekly preview.
    #[serde(default = "default_preview_standings")]
    pub preview_standings: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            trade_limit: default_trade_limit(),
            waiver_limit: default_waiver_limit(),
            target_limit: default_target_limit(),
            trending_lookback_hours: default_lookback_hours(),
            trending_fetch_limit: default_trending_fetch_limit(),
            power_weeks: default_power_weeks(),
            roast_count: default_roast_count(),
            news_min_adds: default_news_min_adds(),
            preview_standings: default_preview_standings(),
        }
    }
}

fn default_trade_limit() -> usize {
    5
}

fn default_waiver_limit() -> usize {
    10
}

fn default_target_limit() -> usize {
    10
}

fn default_lookback_hours() -> u32 {
    24
}

fn default_trending_fetch_limit() -> u32 {
    50
}

fn default_power_weeks() -> u32 {
    3
}

fn default_roast_count() -> usize {
    1
}

fn default_news_min_adds() -> u32 {
    1000
}

fn default_preview_standings() -> usize {
    3
}

/// Scheduled post times, in the host's local time zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Run scheduled jobs under `serve`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_weekly_day")]
    pub recap_day: String,

    #[serde(default = "default_recap_time")]
    pub recap_time: String,

    #[serde(default = "default_weekly_day")]
    pub preview_day: String,

    #[serde(default = "default_preview_time")]
    pub preview_time: String,

    #[serde(default = "default_news_time")]
    pub news_time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recap_day: default_weekly_day(),
            recap_time: default_recap_time(),
            preview_day: default_weekly_day(),
            preview_time: default_preview_time(),
            news_time: default_news_time(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_weekly_day() -> String {
    "tue".to_string()
}

fn default_recap_time() -> String {
    "08:00".to_string()
}

fn default_preview_time() -> String {
    "10:00".to_string()
}

fn default_news_time() -> String {
    "09:00".to_string()
}

impl ScheduleConfig {
    pub fn recap(&self) -> Result<(Weekday, NaiveTime)> {
        Ok((parse_weekday(&self.recap_day)?, parse_time(&self.recap_time)?))
    }

    pub fn preview(&self) -> Result<(Weekday, NaiveTime)> {
        Ok((
            parse_weekday(&self.preview_day)?,
            parse_time(&self.preview_time)?,
        ))
    }

    pub fn news(&self) -> Result<NaiveTime> {
        parse_time(&self.news_time)
    }
}

fn parse_weekday(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| anyhow!("Invalid weekday '{}'", s))
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", s))
}

/// Scheduled post destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Discord webhook URL. Scheduled posts print to stdout when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Health endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their environment fallbacks) take precedence over
    /// config file settings, but only when actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref id) = args.league_id {
            self.league.id = id.clone();
        }
        if let Some(ref url) = args.api_url {
            self.league.api_url = url.clone();
        }
        if let Some(week) = args.current_week {
            self.league.current_week = Some(week);
        }
        if let Some(timeout) = args.timeout {
            self.league.timeout_seconds = timeout;
        }
        if let Some(ref webhook) = args.webhook_url {
            self.delivery.webhook_url = Some(webhook.clone());
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
    }

    /// Check settings that would otherwise fail at first use.
    pub fn validate(&self) -> Result<()> {
        if self.league.id.trim().is_empty() {
            return Err(anyhow!(
                "No league id configured. Set SLEEPER_LEAGUE_ID, pass --league-id, or add [league] id to {}",
                DEFAULT_CONFIG_FILE
            ));
        }
        if !self.league.api_url.starts_with("http://") && !self.league.api_url.starts_with("https://")
        {
            return Err(anyhow!("API URL must start with 'http://' or 'https://'"));
        }
        if self.league.timeout_seconds == 0 {
            return Err(anyhow!("Timeout must be at least 1 second"));
        }
        if let Some(week) = self.league.current_week {
            if !(1..=MAX_WEEK).contains(&week) {
                return Err(anyhow!("Current week must be between 1 and {}", MAX_WEEK));
            }
        }
        if self.reports.power_weeks == 0 {
            return Err(anyhow!("Power ranking window must be at least 1 week"));
        }
        self.schedule.recap()?;
        self.schedule.preview()?;
        self.schedule.news()?;
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
