//! Season-long reports built from a multi-week matchup scan.
//!
//! Inputs are `(week, entries)` pairs as produced by
//! [`crate::source::scan_matchups`]; a week that failed to load is simply
//! absent and contributes nothing.

use super::aggregator::{mean, standings, StandingRow, TeamScore};
use crate::identity::OwnerNames;
use crate::models::{MatchupEntry, Roster, RosterId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Matchup entries keyed by week.
pub type WeekEntries = (u32, Vec<MatchupEntry>);

/// Population standard deviation (divides by n). `None` for no samples.
pub fn population_std_dev(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let m = mean(samples.iter().copied());
    let variance = samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// A single team's score in a specific week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekScore {
    pub week: u32,
    pub roster_id: RosterId,
    pub owner: String,
    pub points: f64,
}

/// The lowest-variance scorer over the season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consistency {
    pub roster_id: RosterId,
    pub owner: String,
    pub std_dev: f64,
    pub average: f64,
    pub weeks: usize,
}

/// Season awards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Awards {
    pub highest_week: Option<WeekScore>,
    pub lowest_week: Option<WeekScore>,
    pub most_consistent: Option<Consistency>,
    pub current_leader: Option<StandingRow>,
    pub points_leader: Option<TeamScore>,
    pub weeks_counted: usize,
}

/// Minimum scored weeks before a team can be called consistent.
const CONSISTENCY_MIN_WEEKS: usize = 2;

pub fn awards(weeks: &[WeekEntries], rosters: &[Roster], owners: &OwnerNames) -> Awards {
    let mut highest: Option<WeekScore> = None;
    let mut lowest: Option<WeekScore> = None;
    let mut per_team: BTreeMap<RosterId, Vec<f64>> = BTreeMap::new();

    for (week, entries) in weeks {
        for entry in entries {
            let Some(points) = entry.scored() else {
                continue;
            };
            per_team.entry(entry.roster_id).or_default().push(points);

            let score = || WeekScore {
                week: *week,
                roster_id: entry.roster_id,
                owner: owners.name(entry.roster_id).to_string(),
                points,
            };
            if highest.as_ref().map_or(true, |h| points > h.points) {
                highest = Some(score());
            }
            if lowest.as_ref().map_or(true, |l| points < l.points) {
                lowest = Some(score());
            }
        }
    }

    let most_consistent = per_team
        .iter()
        .filter(|(_, scores)| scores.len() >= CONSISTENCY_MIN_WEEKS)
        .filter_map(|(roster_id, scores)| {
            population_std_dev(scores).map(|std_dev| Consistency {
                roster_id: *roster_id,
                owner: owners.name(*roster_id).to_string(),
                std_dev,
                average: mean(scores.iter().copied()),
                weeks: scores.len(),
            })
        })
        // BTreeMap iteration keeps the lowest roster id on ties
        .fold(None, |best: Option<Consistency>, c| match best {
            Some(b) if b.std_dev <= c.std_dev => Some(b),
            _ => Some(c),
        });

    let current_leader = standings(rosters, owners).into_iter().next();

    let points_leader = rosters
        .iter()
        .max_by(|a, b| {
            a.points_for
                .total_cmp(&b.points_for)
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|r| TeamScore {
            roster_id: r.id,
            owner: owners.name(r.id).to_string(),
            points: r.points_for,
        });

    Awards {
        highest_week: highest,
        lowest_week: lowest,
        most_consistent,
        current_leader,
        points_leader,
        weeks_counted: weeks.len(),
    }
}

/// Weeks that feed power rankings: the last `k` weeks up to `current_week`.
pub fn power_window(current_week: u32, k: u32) -> RangeInclusive<u32> {
    let k = k.max(1);
    let start = current_week.saturating_sub(k - 1).max(1);
    start..=current_week.max(1)
}

/// One row of the power rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerRow {
    pub rank: usize,
    pub roster_id: RosterId,
    pub owner: String,
    pub recent_avg: f64,
    pub record: String,
    pub games_counted: usize,
}

/// Rank every roster by its mean scored points inside `window`.
///
/// Weeks outside the window are ignored even if present in `weeks`. Teams
/// with no scored games in the window average 0.0 and sort last.
pub fn power_rankings(
    weeks: &[WeekEntries],
    window: &RangeInclusive<u32>,
    rosters: &[Roster],
    owners: &OwnerNames,
) -> Vec<PowerRow> {
    let mut per_team: BTreeMap<RosterId, Vec<f64>> = BTreeMap::new();

    for (_, entries) in weeks.iter().filter(|(w, _)| window.contains(w)) {
        for entry in entries {
            if let Some(points) = entry.scored() {
                per_team.entry(entry.roster_id).or_default().push(points);
            }
        }
    }

    let mut rows: Vec<PowerRow> = rosters
        .iter()
        .map(|r| {
            let scores = per_team.get(&r.id).map(Vec::as_slice).unwrap_or(&[]);
            PowerRow {
                rank: 0,
                roster_id: r.id,
                owner: owners.name(r.id).to_string(),
                recent_avg: mean(scores.iter().copied()),
                record: r.record(),
                games_counted: scores.len(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.recent_avg
            .total_cmp(&a.recent_avg)
            .then_with(|| a.roster_id.cmp(&b.roster_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    rows
}

/// Result of one head-to-head meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    WinA,
    WinB,
    Tie,
    /// Paired, but neither side has scored yet.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHeadGame {
    pub week: u32,
    pub points_a: f64,
    pub points_b: f64,
    pub outcome: GameOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub roster_a: RosterId,
    pub roster_b: RosterId,
    pub team_a: String,
    pub team_b: String,
    pub wins_a: u32,
    pub wins_b: u32,
    pub ties: u32,
    pub games: Vec<HeadToHeadGame>,
}

/// Every week in which `a` and `b` shared a pairing id.
pub fn head_to_head(
    weeks: &[WeekEntries],
    a: &Roster,
    b: &Roster,
    owners: &OwnerNames,
) -> HeadToHead {
    let mut result = HeadToHead {
        roster_a: a.id,
        roster_b: b.id,
        team_a: owners.name(a.id).to_string(),
        team_b: owners.name(b.id).to_string(),
        wins_a: 0,
        wins_b: 0,
        ties: 0,
        games: Vec::new(),
    };

    for (week, entries) in weeks {
        let find = |id: RosterId| entries.iter().find(|e| e.roster_id == id);
        let (Some(ea), Some(eb)) = (find(a.id), find(b.id)) else {
            continue;
        };
        if ea.pairing_id.is_none() || ea.pairing_id != eb.pairing_id {
            continue;
        }

        let points_a = ea.points.unwrap_or(0.0);
        let points_b = eb.points.unwrap_or(0.0);
        let outcome = if points_a == 0.0 && points_b == 0.0 {
            GameOutcome::Pending
        } else if points_a > points_b {
            result.wins_a += 1;
            GameOutcome::WinA
        } else if points_b > points_a {
            result.wins_b += 1;
            GameOutcome::WinB
        } else {
            result.ties += 1;
            GameOutcome::Tie
        };

        result.games.push(HeadToHeadGame {
            week: *week,
            points_a,
            points_b,
            outcome,
        });
    }

    result
}
