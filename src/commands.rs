//! Command pipelines.
//!
//! Each command fetches what it needs (independent resources concurrently),
//! resolves owner names, runs one aggregation, and returns a structured
//! [`Report`]. Collaborators are injected through [`LeagueService::new`];
//! nothing is cached between invocations.

use crate::analysis::{
    self, Awards, HeadToHead, InjuredPlayer, MatchupPair, Performances, PlayoffPicture, PowerRow,
    RosterDetail, StandingRow, TransactionSummary, TrendingTarget,
};
use crate::config::ReportsConfig;
use crate::error::{BotError, Result};
use crate::identity::{self, OwnerNames, UserNames};
use crate::models::{Roster, TransactionKind};
use crate::source::{self, LeagueSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Last regular-season-plus-playoffs week the API serves.
pub const MAX_WEEK: u32 = 18;

/// One invocation of the command surface, with its optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Standings,
    Matchups { week: Option<u32> },
    Roster { team: Option<String> },
    Trades,
    Waivers,
    Performances { week: Option<u32> },
    Awards,
    PowerRankings { weeks: Option<u32> },
    Playoffs,
    HeadToHead { team_a: String, team_b: String },
    Injuries,
    Targets { limit: Option<usize> },
    Roast { count: Option<usize> },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Standings => "standings",
            Command::Matchups { .. } => "matchup",
            Command::Roster { .. } => "roster",
            Command::Trades => "trades",
            Command::Waivers => "waivers",
            Command::Performances { .. } => "performances",
            Command::Awards => "awards",
            Command::PowerRankings { .. } => "power-rankings",
            Command::Playoffs => "playoffs",
            Command::HeadToHead { .. } => "h2h",
            Command::Injuries => "injuries",
            Command::Targets { .. } => "targets",
            Command::Roast { .. } => "roast",
        }
    }
}

/// Which transaction feed a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFeed {
    Trades,
    Waivers,
}

/// Structured result of a command, ready for the presenter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Standings {
        league: String,
        rows: Vec<StandingRow>,
    },
    Matchups {
        week: u32,
        pairs: Vec<MatchupPair>,
    },
    Roster {
        detail: RosterDetail,
    },
    Transactions {
        feed: TransactionFeed,
        week: u32,
        items: Vec<TransactionSummary>,
    },
    Performances {
        week: u32,
        summary: Performances,
    },
    Awards {
        through_week: u32,
        awards: Awards,
        missing_weeks: Vec<u32>,
    },
    PowerRankings {
        first_week: u32,
        last_week: u32,
        rows: Vec<PowerRow>,
        missing_weeks: Vec<u32>,
    },
    Playoffs {
        league: String,
        picture: PlayoffPicture,
    },
    HeadToHead {
        through_week: u32,
        result: HeadToHead,
        missing_weeks: Vec<u32>,
    },
    Injuries {
        by_status: BTreeMap<String, Vec<InjuredPlayer>>,
    },
    Targets {
        lookback_hours: u32,
        targets: Vec<TrendingTarget>,
    },
    Roast {
        targets: Vec<StandingRow>,
    },
    /// The command succeeded but found nothing to show.
    Empty {
        message: String,
    },
}

impl Report {
    fn empty(message: impl Into<String>) -> Self {
        Report::Empty {
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Report::Empty { .. })
    }
}

/// Runs commands against an injected league source.
pub struct LeagueService {
    source: Arc<dyn LeagueSource>,
    reports: ReportsConfig,
    pinned_week: Option<u32>,
}

impl LeagueService {
    pub fn new(
        source: Arc<dyn LeagueSource>,
        reports: ReportsConfig,
        pinned_week: Option<u32>,
    ) -> Self {
        Self {
            source,
            reports,
            pinned_week,
        }
    }

    pub fn reports_config(&self) -> &ReportsConfig {
        &self.reports
    }

    fn src(&self) -> &dyn LeagueSource {
        self.source.as_ref()
    }

    /// The week in progress, always within 1..=MAX_WEEK. Falls back to
    /// week 1 when the state resource cannot be read.
    pub async fn current_week(&self) -> u32 {
        if let Some(week) = self.pinned_week {
            return week.clamp(1, MAX_WEEK);
        }
        match source::nfl_week(self.src()).await {
            Ok(week) => week.clamp(1, MAX_WEEK),
            Err(e) => {
                warn!("Could not read current week, assuming week 1: {}", e);
                1
            }
        }
    }

    /// Dispatch a command to its pipeline.
    pub async fn run(&self, command: &Command) -> Result<Report> {
        info!("Running command: {}", command.name());
        let report = match command {
            Command::Standings => self.standings().await,
            Command::Matchups { week } => self.matchups(*week).await,
            Command::Roster { team } => self.roster(team.as_deref()).await,
            Command::Trades => self.transactions(TransactionFeed::Trades).await,
            Command::Waivers => self.transactions(TransactionFeed::Waivers).await,
            Command::Performances { week } => self.performances(*week).await,
            Command::Awards => self.awards().await,
            Command::PowerRankings { weeks } => self.power_rankings(*weeks).await,
            Command::Playoffs => self.playoffs().await,
            Command::HeadToHead { team_a, team_b } => self.head_to_head(team_a, team_b).await,
            Command::Injuries => self.injuries().await,
            Command::Targets { limit } => self.targets(*limit).await,
            Command::Roast { count } => self.roast(*count).await,
        }?;
        debug!("Command {} finished (empty: {})", command.name(), report.is_empty());
        Ok(report)
    }

    async fn resolve_week(&self, week: Option<u32>) -> Result<u32> {
        match week {
            Some(w) if (1..=MAX_WEEK).contains(&w) => Ok(w),
            Some(w) => Err(BotError::InvalidArgument(format!(
                "week {} is out of range (1-{})",
                w, MAX_WEEK
            ))),
            None => Ok(self.current_week().await),
        }
    }

    /// Rosters plus both name lookups.
    async fn league_members(&self) -> Result<(Vec<Roster>, UserNames, OwnerNames)> {
        let (rosters, users) =
            tokio::try_join!(source::rosters(self.src()), source::users(self.src()))?;
        let users = identity::resolve_users(&users);
        let owners = identity::resolve_roster_owners(&rosters, &users);
        debug!("Resolved owners for {} rosters", owners.len());
        Ok((rosters, users, owners))
    }

    pub async fn standings(&self) -> Result<Report> {
        let (league, rosters, users) = tokio::try_join!(
            source::league(self.src()),
            source::rosters(self.src()),
            source::users(self.src())
        )?;
        if rosters.is_empty() {
            return Ok(Report::empty("No teams in this league yet."));
        }
        let owners = identity::resolve_roster_owners(&rosters, &identity::resolve_users(&users));

        Ok(Report::Standings {
            league: league.name,
            rows: analysis::standings(&rosters, &owners),
        })
    }

    pub async fn matchups(&self, week: Option<u32>) -> Result<Report> {
        let week = self.resolve_week(week).await?;
        let (entries, (_, _, owners)) =
            tokio::try_join!(source::matchups(self.src(), week), self.league_members())?;

        let pairs = analysis::matchups(&entries, &owners);
        if pairs.is_empty() {
            return Ok(Report::empty("No matchups found for this week."));
        }
        Ok(Report::Matchups { week, pairs })
    }

    pub async fn roster(&self, team: Option<&str>) -> Result<Report> {
        let ((rosters, users, owners), catalog) =
            tokio::try_join!(self.league_members(), source::players(self.src()))?;

        match analysis::select_roster(&rosters, &users, team) {
            Some(roster) => Ok(Report::Roster {
                detail: analysis::roster_detail(roster, &owners, &catalog),
            }),
            None => match team {
                Some(q) => Err(BotError::NotFound(format!("team '{}' not found!", q))),
                None => Ok(Report::empty("No teams in this league yet.")),
            },
        }
    }

    pub async fn transactions(&self, feed: TransactionFeed) -> Result<Report> {
        let week = self.current_week().await;
        let (transactions, (_, _, owners)) = tokio::try_join!(
            source::transactions(self.src(), week),
            self.league_members()
        )?;

        let (kinds, cap, none_message) = match feed {
            TransactionFeed::Trades => (
                vec![TransactionKind::Trade],
                self.reports.trade_limit,
                "No recent trades found!",
            ),
            TransactionFeed::Waivers => (
                vec![TransactionKind::Waiver, TransactionKind::FreeAgent],
                self.reports.waiver_limit,
                "No recent waiver activity!",
            ),
        };

        let items = analysis::recent_transactions(&transactions, &kinds, cap, &owners);
        if items.is_empty() {
            return Ok(Report::empty(none_message));
        }
        Ok(Report::Transactions { feed, week, items })
    }

    pub async fn performances(&self, week: Option<u32>) -> Result<Report> {
        let week = self.resolve_week(week).await?;
        let (entries, (_, _, owners)) =
            tokio::try_join!(source::matchups(self.src(), week), self.league_members())?;

        match analysis::performances(&entries, &owners) {
            Some(summary) => Ok(Report::Performances { week, summary }),
            None => Ok(Report::empty(format!(
                "No scores recorded for week {} yet.",
                week
            ))),
        }
    }

    pub async fn awards(&self) -> Result<Report> {
        let (week, members) = tokio::join!(self.current_week(), self.league_members());
        let (rosters, _, owners) = members?;
        let scan = source::scan_matchups(self.src(), 1..=week).await;

        let awards = analysis::awards(&scan.weeks, &rosters, &owners);
        if awards.highest_week.is_none() {
            return Ok(Report::empty("No completed weeks to hand out awards for yet."));
        }
        Ok(Report::Awards {
            through_week: week,
            awards,
            missing_weeks: scan.gaps,
        })
    }

    pub async fn power_rankings(&self, weeks: Option<u32>) -> Result<Report> {
        let k = weeks.unwrap_or(self.reports.power_weeks);
        if k == 0 || k > MAX_WEEK {
            return Err(BotError::InvalidArgument(format!(
                "weeks to analyze must be between 1 and {}",
                MAX_WEEK
            )));
        }

        let (current, members) = tokio::join!(self.current_week(), self.league_members());
        let (rosters, _, owners) = members?;
        let window = analysis::power_window(current, k);
        let scan = source::scan_matchups(self.src(), window.clone()).await;

        let rows = analysis::power_rankings(&scan.weeks, &window, &rosters, &owners);
        if rows.iter().all(|r| r.games_counted == 0) {
            return Ok(Report::empty("No scored games in the ranking window yet."));
        }
        Ok(Report::PowerRankings {
            first_week: *window.start(),
            last_week: *window.end(),
            rows,
            missing_weeks: scan.gaps,
        })
    }

    pub async fn playoffs(&self) -> Result<Report> {
        let (league, (rosters, _, owners)) =
            tokio::try_join!(source::league(self.src()), self.league_members())?;
        if rosters.is_empty() {
            return Ok(Report::empty("No teams in this league yet."));
        }

        let table = analysis::standings(&rosters, &owners);
        Ok(Report::Playoffs {
            league: league.name,
            picture: analysis::playoff_picture(table, league.playoff_teams),
        })
    }

    pub async fn head_to_head(&self, team_a: &str, team_b: &str) -> Result<Report> {
        let (week, members) = tokio::join!(self.current_week(), self.league_members());
        let (rosters, users, owners) = members?;

        let a = identity::find_roster_by_owner_substring(&rosters, &users, team_a);
        let b = identity::find_roster_by_owner_substring(&rosters, &users, team_b);
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            (a, b) => {
                let missing: Vec<&str> = [(a.is_none(), team_a), (b.is_none(), team_b)]
                    .into_iter()
                    .filter_map(|(missing, q)| missing.then_some(q))
                    .collect();
                return Err(BotError::NotFound(format!(
                    "team(s) not found: {}.",
                    missing.join(", ")
                )));
            }
        };
        if a.id == b.id {
            return Err(BotError::InvalidArgument(format!(
                "'{}' and '{}' both match {}",
                team_a,
                team_b,
                owners.name(a.id)
            )));
        }

        let scan = source::scan_matchups(self.src(), 1..=week).await;
        Ok(Report::HeadToHead {
            through_week: week,
            result: analysis::head_to_head(&scan.weeks, a, b, &owners),
            missing_weeks: scan.gaps,
        })
    }

    pub async fn injuries(&self) -> Result<Report> {
        let ((rosters, _, owners), catalog) =
            tokio::try_join!(self.league_members(), source::players(self.src()))?;

        let by_status = analysis::injury_report(&rosters, &owners, &catalog);
        if by_status.is_empty() {
            return Ok(Report::empty("No injured players on any roster."));
        }
        Ok(Report::Injuries { by_status })
    }

    pub async fn targets(&self, limit: Option<usize>) -> Result<Report> {
        let cap = limit.unwrap_or(self.reports.target_limit);
        let lookback_hours = self.reports.trending_lookback_hours;
        let (trending, rosters, catalog) = tokio::try_join!(
            source::trending_adds(self.src(), lookback_hours, self.reports.trending_fetch_limit),
            source::rosters(self.src()),
            source::players(self.src())
        )?;

        let targets = analysis::available_targets(&trending, &catalog, &rosters, cap);
        if targets.is_empty() {
            return Ok(Report::empty("No available trending players right now."));
        }
        Ok(Report::Targets {
            lookback_hours,
            targets,
        })
    }

    pub async fn roast(&self, count: Option<usize>) -> Result<Report> {
        let count = count.unwrap_or(self.reports.roast_count);
        if count == 0 {
            return Err(BotError::InvalidArgument(
                "roast count must be at least 1".to_string(),
            ));
        }

        let (rosters, _, owners) = self.league_members().await?;
        let table = analysis::standings(&rosters, &owners);
        let targets = analysis::roast_targets(&table, count);
        if targets.is_empty() {
            return Ok(Report::empty("No teams to roast. Lucky them."));
        }
        Ok(Report::Roast { targets })
    }
}
