//! Raw Sleeper payloads and their validation into league records.
//!
//! Each `parse_*` function takes the JSON body of one resource and either
//! returns fully-populated records or a `SourceUnavailable` error naming the
//! resource. Nothing downstream sees an `Option` that means "the API left
//! this out".

use crate::error::{BotError, Result};
use crate::models::{
    LeagueInfo, MatchupEntry, PlayerCatalog, PlayerRecord, Roster, Transaction, TransactionKind,
    TrendingEntry, User, UNKNOWN_OWNER,
};
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Playoff slots assumed when league settings omit them.
pub const DEFAULT_PLAYOFF_TEAMS: usize = 6;

#[derive(Debug, Deserialize)]
struct RawLeague {
    name: String,
    #[serde(default)]
    settings: Option<RawLeagueSettings>,
}

#[derive(Debug, Deserialize)]
struct RawLeagueSettings {
    #[serde(default)]
    playoff_teams: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    user_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRoster {
    roster_id: u32,
    #[serde(default)]
    owner_id: Option<String>,
    settings: RawRosterSettings,
    #[serde(default)]
    starters: Option<Vec<String>>,
    #[serde(default)]
    players: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawRosterSettings {
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
    #[serde(default)]
    ties: u32,
    #[serde(default)]
    fpts: f64,
    /// Hundredths of a point, reported separately from `fpts`.
    #[serde(default)]
    fpts_decimal: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMatchup {
    roster_id: u32,
    #[serde(default)]
    matchup_id: Option<u32>,
    #[serde(default)]
    points: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(rename = "type")]
    kind: String,
    status_updated: i64,
    #[serde(default)]
    roster_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    injury_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrending {
    player_id: String,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct RawNflState {
    week: u32,
}

fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| BotError::source_unavailable(resource, e))
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

pub fn parse_league(value: Value) -> Result<LeagueInfo> {
    let raw: RawLeague = decode("league", value)?;
    let playoff_teams = raw
        .settings
        .and_then(|s| s.playoff_teams)
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PLAYOFF_TEAMS);

    Ok(LeagueInfo {
        name: raw.name,
        playoff_teams,
    })
}

pub fn parse_users(value: Value) -> Result<Vec<User>> {
    let raw: Vec<RawUser> = decode("users", value)?;
    Ok(raw
        .into_iter()
        .map(|u| {
            // A member with neither name set still owns a roster
            let display_name = non_empty(u.display_name)
                .or_else(|| non_empty(u.username))
                .unwrap_or_else(|| UNKNOWN_OWNER.to_string());
            User {
                id: u.user_id,
                display_name,
            }
        })
        .collect())
}

pub fn parse_rosters(value: Value) -> Result<Vec<Roster>> {
    let raw: Vec<RawRoster> = decode("rosters", value)?;
    Ok(raw
        .into_iter()
        .map(|r| {
            let decimal = r.settings.fpts_decimal.unwrap_or(0.0) / 100.0;
            Roster {
                id: r.roster_id,
                owner_id: non_empty(r.owner_id),
                wins: r.settings.wins,
                losses: r.settings.losses,
                ties: r.settings.ties,
                points_for: r.settings.fpts + decimal,
                // "0" marks an empty lineup slot
                starters: r
                    .starters
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|id| id != "0")
                    .collect(),
                players: r.players.unwrap_or_default(),
            }
        })
        .collect())
}

pub fn parse_matchups(week: u32, value: Value) -> Result<Vec<MatchupEntry>> {
    let raw: Vec<RawMatchup> = decode(&format!("matchups (week {})", week), value)?;
    Ok(raw
        .into_iter()
        .map(|m| MatchupEntry {
            roster_id: m.roster_id,
            pairing_id: m.matchup_id,
            points: m.points,
        })
        .collect())
}

pub fn parse_transactions(week: u32, value: Value) -> Result<Vec<Transaction>> {
    let resource = format!("transactions (week {})", week);
    let raw: Vec<RawTransaction> = decode(&resource, value)?;
    raw.into_iter()
        .map(|t| {
            let timestamp = DateTime::from_timestamp_millis(t.status_updated).ok_or_else(|| {
                BotError::source_unavailable(
                    resource.as_str(),
                    format!("timestamp {} out of range", t.status_updated),
                )
            })?;
            Ok(Transaction {
                kind: TransactionKind::from(t.kind.as_str()),
                timestamp,
                roster_ids: t.roster_ids,
            })
        })
        .collect()
}

pub fn parse_players(value: Value) -> Result<PlayerCatalog> {
    let raw: HashMap<String, RawPlayer> = decode("players", value)?;
    Ok(PlayerCatalog::new(
        raw.into_iter()
            .map(|(id, p)| {
                let record = PlayerRecord {
                    id: id.clone(),
                    first_name: p.first_name.unwrap_or_default(),
                    last_name: p.last_name.unwrap_or_default(),
                    position: non_empty(p.position),
                    team: non_empty(p.team),
                    injury_status: non_empty(p.injury_status),
                };
                (id, record)
            })
            .collect(),
    ))
}

pub fn parse_trending(value: Value) -> Result<Vec<TrendingEntry>> {
    let raw: Vec<RawTrending> = decode("trending adds", value)?;
    Ok(raw
        .into_iter()
        .map(|t| TrendingEntry {
            player_id: t.player_id,
            count: t.count,
        })
        .collect())
}

pub fn parse_nfl_state(value: Value) -> Result<u32> {
    let raw: RawNflState = decode("nfl state", value)?;
    Ok(raw.week)
}
