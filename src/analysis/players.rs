//! Reports that join rosters against the player catalog.

use crate::identity::{find_roster_by_owner_substring, OwnerNames, UserNames};
use crate::models::{PlayerCatalog, PlayerId, Roster, RosterId, TrendingEntry};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A single team's roster, split into starters and bench.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterDetail {
    pub roster_id: RosterId,
    pub owner: String,
    pub record: String,
    pub points: f64,
    pub starters: Vec<String>,
    pub bench: Vec<String>,
}

/// Pick the roster a lookup refers to.
///
/// With a query, the owner-substring match (lowest roster id on ties);
/// without one, the lowest roster id in the league.
pub fn select_roster<'a>(
    rosters: &'a [Roster],
    users: &UserNames,
    query: Option<&str>,
) -> Option<&'a Roster> {
    match query {
        Some(q) => find_roster_by_owner_substring(rosters, users, q),
        None => rosters.iter().min_by_key(|r| r.id),
    }
}

pub fn roster_detail(roster: &Roster, owners: &OwnerNames, catalog: &PlayerCatalog) -> RosterDetail {
    let describe =
        |ids: &[PlayerId]| -> Vec<String> { ids.iter().map(|id| catalog.describe(id)).collect() };

    RosterDetail {
        roster_id: roster.id,
        owner: owners.name(roster.id).to_string(),
        record: roster.record(),
        points: roster.points_for,
        starters: describe(&roster.starters),
        bench: describe(&roster.bench()),
    }
}

/// A rostered player carrying an injury designation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuredPlayer {
    pub player_id: PlayerId,
    pub player: String,
    pub position: String,
    pub team: String,
    pub owner: String,
}

/// Rostered players with a non-healthy injury status, grouped by status.
///
/// Players missing from the catalog are skipped. Within a status, players
/// are ordered by owner then name.
pub fn injury_report(
    rosters: &[Roster],
    owners: &OwnerNames,
    catalog: &PlayerCatalog,
) -> BTreeMap<String, Vec<InjuredPlayer>> {
    let mut report: BTreeMap<String, Vec<InjuredPlayer>> = BTreeMap::new();

    for roster in rosters {
        for id in roster.all_player_ids() {
            let Some(player) = catalog.get(&id) else {
                continue;
            };
            let Some(status) = player.injury() else {
                continue;
            };

            report
                .entry(status.to_string())
                .or_default()
                .push(InjuredPlayer {
                    player: player.full_name(),
                    position: player.position.clone().unwrap_or_else(|| "?".to_string()),
                    team: player.team.clone().unwrap_or_else(|| "FA".to_string()),
                    owner: owners.name(roster.id).to_string(),
                    player_id: id,
                });
        }
    }

    for players in report.values_mut() {
        players.sort_by(|a, b| a.owner.cmp(&b.owner).then_with(|| a.player.cmp(&b.player)));
    }

    report
}

/// Every player id on any roster in the league.
pub fn rostered_player_ids(rosters: &[Roster]) -> HashSet<PlayerId> {
    rosters.iter().flat_map(|r| r.all_player_ids()).collect()
}

/// A trending player nobody in the league has rostered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingTarget {
    pub player_id: PlayerId,
    pub player: String,
    pub add_count: u32,
}

/// Trending adds that are still available in this league, in feed order,
/// capped at `cap`.
pub fn available_targets(
    trending: &[TrendingEntry],
    catalog: &PlayerCatalog,
    rosters: &[Roster],
    cap: usize,
) -> Vec<TrendingTarget> {
    let rostered = rostered_player_ids(rosters);

    trending
        .iter()
        .filter(|t| !rostered.contains(&t.player_id))
        .take(cap)
        .map(|t| TrendingTarget {
            player_id: t.player_id.clone(),
            player: catalog.describe(&t.player_id),
            add_count: t.count,
        })
        .collect()
}
