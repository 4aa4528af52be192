//! Validated league records.
//!
//! These are the internal shapes every aggregation works on. They are built
//! from raw API payloads by [`crate::source::payload`] and never carry
//! missing-field ambiguity: absent values have already been resolved to
//! explicit defaults or rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Roster identifier, unique within a league.
pub type RosterId = u32;
/// Platform user identifier.
pub type UserId = String;
/// Player identifier in the player catalog.
pub type PlayerId = String;

/// Placeholder used whenever an owner cannot be resolved.
pub const UNKNOWN_OWNER: &str = "Unknown";

/// League metadata snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub name: String,
    /// Number of playoff slots.
    pub playoff_teams: usize,
}

/// A league member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name, or the secondary handle when no display name is set.
    pub display_name: String,
}

/// One participant's team entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub id: RosterId,
    /// Owning user, absent for orphaned rosters.
    pub owner_id: Option<UserId>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Season total points-for.
    pub points_for: f64,
    /// Active lineup in slot order.
    pub starters: Vec<PlayerId>,
    /// Every rostered player.
    pub players: Vec<PlayerId>,
}

impl Roster {
    /// Rostered players that are not starting, in roster order.
    ///
    /// This is a set difference, not an index difference: a player listed in
    /// `starters` never appears here regardless of position.
    pub fn bench(&self) -> Vec<PlayerId> {
        let starters: BTreeSet<&str> = self.starters.iter().map(String::as_str).collect();
        self.players
            .iter()
            .filter(|p| !starters.contains(p.as_str()))
            .cloned()
            .collect()
    }

    /// Union of starters and rostered players, deduplicated.
    pub fn all_player_ids(&self) -> BTreeSet<PlayerId> {
        self.starters
            .iter()
            .chain(self.players.iter())
            .cloned()
            .collect()
    }

    /// Win-loss record, with ties appended only when present.
    pub fn record(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }
}

/// One roster's entry for a single week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupEntry {
    pub roster_id: RosterId,
    /// Entries sharing a pairing id in the same week are opponents.
    pub pairing_id: Option<u32>,
    /// Absent until the week has been scored.
    pub points: Option<f64>,
}

impl MatchupEntry {
    /// Points if the week has produced a positive score.
    pub fn scored(&self) -> Option<f64> {
        self.points.filter(|p| *p > 0.0)
    }
}

/// Transaction category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Trade,
    Waiver,
    FreeAgent,
    Other(String),
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Trade => write!(f, "Trade"),
            TransactionKind::Waiver => write!(f, "Waiver"),
            TransactionKind::FreeAgent => write!(f, "Free Agent"),
            TransactionKind::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for TransactionKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trade" => TransactionKind::Trade,
            "waiver" => TransactionKind::Waiver,
            "free_agent" => TransactionKind::FreeAgent,
            other => TransactionKind::Other(other.to_string()),
        }
    }
}

/// A league transaction. Detail fields are opaque to aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub roster_ids: Vec<RosterId>,
}

/// A player in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub team: Option<String>,
    pub injury_status: Option<String>,
}

impl PlayerRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Injury designation, `None` when absent or "Healthy".
    pub fn injury(&self) -> Option<&str> {
        self.injury_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("healthy"))
    }
}

/// The full player catalog keyed by player id.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: HashMap<PlayerId, PlayerRecord>,
}

impl PlayerCatalog {
    pub fn new(players: HashMap<PlayerId, PlayerRecord>) -> Self {
        Self { players }
    }

    pub fn get(&self, id: &str) -> Option<&PlayerRecord> {
        self.players.get(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// "First Last (POS)" or "Unknown (id)" when the id is not in the catalog.
    pub fn describe(&self, id: &str) -> String {
        match self.get(id) {
            Some(p) => format!("{} ({})", p.full_name(), p.position.as_deref().unwrap_or("?")),
            None => format!("Unknown ({})", id),
        }
    }
}

impl FromIterator<PlayerRecord> for PlayerCatalog {
    fn from_iter<I: IntoIterator<Item = PlayerRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

/// A player's add-count over the trending lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub player_id: PlayerId,
    pub count: u32,
}
