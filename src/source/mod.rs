//! Read-only access to league resources.
//!
//! [`LeagueSource`] is the seam between the aggregation pipeline and the
//! outside world: it returns raw JSON for a [`Resource`]. The typed helpers
//! in this module fetch and validate in one step. There is no caching and no
//! retry; every command re-fetches what it needs.

pub mod payload;
pub mod sleeper;

#[cfg(test)]
pub mod fake;

use crate::error::Result;
use crate::models::{
    LeagueInfo, MatchupEntry, PlayerCatalog, Roster, Transaction, TrendingEntry, User,
};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

pub use sleeper::SleeperClient;

/// A named resource exposed by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    League,
    Rosters,
    Users,
    Matchups { week: u32 },
    Transactions { week: u32 },
    Players,
    TrendingAdds { lookback_hours: u32, limit: u32 },
    NflState,
}

impl Resource {
    /// Path relative to the API base URL.
    pub fn path(&self, league_id: &str) -> String {
        match self {
            Resource::League => format!("league/{}", league_id),
            Resource::Rosters => format!("league/{}/rosters", league_id),
            Resource::Users => format!("league/{}/users", league_id),
            Resource::Matchups { week } => format!("league/{}/matchups/{}", league_id, week),
            Resource::Transactions { week } => {
                format!("league/{}/transactions/{}", league_id, week)
            }
            Resource::Players => "players/nfl".to_string(),
            Resource::TrendingAdds {
                lookback_hours,
                limit,
            } => format!(
                "players/nfl/trending/add?lookback_hours={}&limit={}",
                lookback_hours, limit
            ),
            Resource::NflState => "state/nfl".to_string(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::League => write!(f, "league"),
            Resource::Rosters => write!(f, "rosters"),
            Resource::Users => write!(f, "users"),
            Resource::Matchups { week } => write!(f, "matchups (week {})", week),
            Resource::Transactions { week } => write!(f, "transactions (week {})", week),
            Resource::Players => write!(f, "players"),
            Resource::TrendingAdds { .. } => write!(f, "trending adds"),
            Resource::NflState => write!(f, "nfl state"),
        }
    }
}

/// Read-only data source for league resources.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    /// Fetch the raw JSON body of a resource.
    ///
    /// Fails with `SourceUnavailable` on transport errors, non-success
    /// statuses, or bodies that are not JSON.
    async fn fetch(&self, resource: Resource) -> Result<Value>;
}

pub async fn league(source: &dyn LeagueSource) -> Result<LeagueInfo> {
    payload::parse_league(source.fetch(Resource::League).await?)
}

pub async fn rosters(source: &dyn LeagueSource) -> Result<Vec<Roster>> {
    payload::parse_rosters(source.fetch(Resource::Rosters).await?)
}

pub async fn users(source: &dyn LeagueSource) -> Result<Vec<User>> {
    payload::parse_users(source.fetch(Resource::Users).await?)
}

pub async fn matchups(source: &dyn LeagueSource, week: u32) -> Result<Vec<MatchupEntry>> {
    payload::parse_matchups(week, source.fetch(Resource::Matchups { week }).await?)
}

pub async fn transactions(source: &dyn LeagueSource, week: u32) -> Result<Vec<Transaction>> {
    payload::parse_transactions(week, source.fetch(Resource::Transactions { week }).await?)
}

pub async fn players(source: &dyn LeagueSource) -> Result<PlayerCatalog> {
    let catalog = payload::parse_players(source.fetch(Resource::Players).await?)?;
    debug!("Loaded player catalog with {} entries", catalog.len());
    Ok(catalog)
}

pub async fn trending_adds(
    source: &dyn LeagueSource,
    lookback_hours: u32,
    limit: u32,
) -> Result<Vec<TrendingEntry>> {
    payload::parse_trending(
        source
            .fetch(Resource::TrendingAdds {
                lookback_hours,
                limit,
            })
            .await?,
    )
}

pub async fn nfl_week(source: &dyn LeagueSource) -> Result<u32> {
    payload::parse_nfl_state(source.fetch(Resource::NflState).await?)
}

/// Outcome of a best-effort scan over a range of weeks.
#[derive(Debug, Clone, Default)]
pub struct WeekScan {
    /// Weeks that fetched and validated, in ascending order.
    pub weeks: Vec<(u32, Vec<MatchupEntry>)>,
    /// Weeks whose fetch failed and were skipped.
    pub gaps: Vec<u32>,
}

/// Fetch matchups for each week in `range`, one week at a time.
///
/// A failing week is logged and recorded as a gap; it never fails the scan.
pub async fn scan_matchups(source: &dyn LeagueSource, range: RangeInclusive<u32>) -> WeekScan {
    let mut scan = WeekScan::default();

    for week in range {
        match matchups(source, week).await {
            Ok(entries) => scan.weeks.push((week, entries)),
            Err(e) => {
                warn!("Skipping week {}: {}", week, e);
                scan.gaps.push(week);
            }
        }
    }

    if !scan.gaps.is_empty() {
        debug!(
            "Week scan finished with {} gap(s): {:?}",
            scan.gaps.len(),
            scan.gaps
        );
    }

    scan
}
