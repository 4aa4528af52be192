//! In-memory source for pipeline tests.

use super::{LeagueSource, Resource};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned payloads; any resource not registered is unavailable.
#[derive(Default)]
pub struct FakeSource {
    payloads: HashMap<Resource, Value>,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: Resource, body: Value) -> Self {
        self.payloads.insert(resource, body);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// A four-team league three weeks into the season.
///
/// Standings: Alice 2-1, Bob 2-1 (fewer points), Carol 1-2, roster 4 is
/// orphaned at 1-2. Alice and Bob met in weeks 1 and 3; week 2 is missing
/// from the source entirely.
pub fn sample_league() -> FakeSource {
    FakeSource::new()
        .with(Resource::NflState, json!({"week": 3, "season": "2025"}))
        .with(
            Resource::League,
            json!({"name": "Gridiron Legends", "settings": {"playoff_teams": 2}}),
        )
        .with(
            Resource::Users,
            json!([
                {"user_id": "u1", "display_name": "Alice"},
                {"user_id": "u2", "display_name": "Bob"},
                {"user_id": "u3", "username": "carol_c"}
            ]),
        )
        .with(
            Resource::Rosters,
            json!([
                {"roster_id": 1, "owner_id": "u1",
                 "settings": {"wins": 2, "losses": 1, "fpts": 350, "fpts_decimal": 50},
                 "starters": ["qb1", "wr1"], "players": ["qb1", "wr1", "rb9"]},
                {"roster_id": 2, "owner_id": "u2",
                 "settings": {"wins": 2, "losses": 1, "fpts": 330},
                 "starters": ["qb2"], "players": ["qb2", "te2"]},
                {"roster_id": 3, "owner_id": "u3",
                 "settings": {"wins": 1, "losses": 2, "fpts": 300},
                 "starters": ["qb3"], "players": ["qb3"]},
                {"roster_id": 4, "owner_id": null,
                 "settings": {"wins": 1, "losses": 2, "fpts": 280},
                 "starters": [], "players": []}
            ]),
        )
        .with(
            Resource::Matchups { week: 1 },
            json!([
                {"roster_id": 1, "matchup_id": 1, "points": 120.5},
                {"roster_id": 2, "matchup_id": 1, "points": 100.0},
                {"roster_id": 3, "matchup_id": 2, "points": 95.0},
                {"roster_id": 4, "matchup_id": 2, "points": 90.0}
            ]),
        )
        .with(
            Resource::Matchups { week: 3 },
            json!([
                {"roster_id": 1, "matchup_id": 1, "points": 110.0},
                {"roster_id": 2, "matchup_id": 1, "points": 130.0},
                {"roster_id": 3, "matchup_id": 2, "points": 70.0},
                {"roster_id": 4, "matchup_id": 2, "points": 105.0}
            ]),
        )
        .with(
            Resource::Transactions { week: 3 },
            json!([
                {"type": "trade", "status_updated": 1_700_000_000_000i64, "roster_ids": [1, 3]},
                {"type": "waiver", "status_updated": 1_700_000_100_000i64, "roster_ids": [2]},
                {"type": "free_agent", "status_updated": 1_700_000_200_000i64, "roster_ids": [4]}
            ]),
        )
        .with(
            Resource::Players,
            json!({
                "qb1": {"first_name": "Josh", "last_name": "Allen", "position": "QB", "team": "BUF"},
                "wr1": {"first_name": "Tyreek", "last_name": "Hill", "position": "WR", "team": "MIA",
                        "injury_status": "Questionable"},
                "rb9": {"first_name": "Zack", "last_name": "Moss", "position": "RB", "team": "CIN",
                        "injury_status": "Healthy"},
                "qb2": {"first_name": "Jalen", "last_name": "Hurts", "position": "QB", "team": "PHI"},
                "te2": {"first_name": "Mark", "last_name": "Andrews", "position": "TE", "team": "BAL",
                        "injury_status": "Out"},
                "qb3": {"first_name": "Joe", "last_name": "Burrow", "position": "QB", "team": "CIN"},
                "wr7": {"first_name": "Puka", "last_name": "Nacua", "position": "WR", "team": "LAR"},
                "rb5": {"first_name": "Kyren", "last_name": "Williams", "position": "RB", "team": "LAR"}
            }),
        )
        .with(
            Resource::TrendingAdds {
                lookback_hours: 24,
                limit: 50,
            },
            json!([
                {"player_id": "wr7", "count": 2400},
                {"player_id": "qb1", "count": 1800},
                {"player_id": "rb5", "count": 300}
            ]),
        )
}

#[async_trait]
impl LeagueSource for FakeSource {
    async fn fetch(&self, resource: Resource) -> Result<Value> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .get(&resource)
            .cloned()
            .ok_or_else(|| BotError::source_unavailable(resource.to_string(), "HTTP 404"))
    }
}
