//! Single-snapshot reports: standings, weekly matchups, performances,
//! playoff picture, roast selection, and transaction feeds.
//!
//! Every function here is pure. Inputs are already-fetched records plus the
//! resolved owner names; outputs are structured rows, never formatted text.

use crate::identity::OwnerNames;
use crate::models::{MatchupEntry, Roster, RosterId, Transaction, TransactionKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub rank: usize,
    pub roster_id: RosterId,
    pub owner: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points: f64,
}

/// Compare two rosters in standings order: wins desc, points desc, roster id asc.
pub fn standings_cmp(a: &Roster, b: &Roster) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.points_for.total_cmp(&a.points_for))
        .then_with(|| a.id.cmp(&b.id))
}

/// Rosters sorted into standings order.
pub fn standings_order(rosters: &[Roster]) -> Vec<&Roster> {
    let mut sorted: Vec<&Roster> = rosters.iter().collect();
    sorted.sort_by(|a, b| standings_cmp(a, b));
    sorted
}

/// Ranked standings table.
pub fn standings(rosters: &[Roster], owners: &OwnerNames) -> Vec<StandingRow> {
    standings_order(rosters)
        .into_iter()
        .enumerate()
        .map(|(i, r)| StandingRow {
            rank: i + 1,
            roster_id: r.id,
            owner: owners.name(r.id).to_string(),
            wins: r.wins,
            losses: r.losses,
            ties: r.ties,
            points: r.points_for,
        })
        .collect()
}

/// Two rosters paired against each other in one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupPair {
    pub pairing_id: u32,
    pub roster_a: RosterId,
    pub roster_b: RosterId,
    pub team_a: String,
    pub team_b: String,
    pub points_a: f64,
    pub points_b: f64,
}

/// Group a week's entries by pairing id. Entries without a pairing are dropped.
pub fn group_by_pairing(entries: &[MatchupEntry]) -> BTreeMap<u32, Vec<&MatchupEntry>> {
    let mut grouped: BTreeMap<u32, Vec<&MatchupEntry>> = BTreeMap::new();

    for entry in entries {
        if let Some(pairing) = entry.pairing_id {
            grouped.entry(pairing).or_default().push(entry);
        }
    }

    grouped
}

/// Displayable matchups for one week, ordered by pairing id.
///
/// Only pairings shared by exactly two entries form a matchup; absent points
/// read as 0.0.
pub fn matchups(entries: &[MatchupEntry], owners: &OwnerNames) -> Vec<MatchupPair> {
    group_by_pairing(entries)
        .into_iter()
        .filter_map(|(pairing_id, group)| match group.as_slice() {
            [a, b] => Some(MatchupPair {
                pairing_id,
                roster_a: a.roster_id,
                roster_b: b.roster_id,
                team_a: owners.name(a.roster_id).to_string(),
                team_b: owners.name(b.roster_id).to_string(),
                points_a: a.points.unwrap_or(0.0),
                points_b: b.points.unwrap_or(0.0),
            }),
            _ => None,
        })
        .collect()
}

/// A team's score in a single week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScore {
    pub roster_id: RosterId,
    pub owner: String,
    pub points: f64,
}

/// Weekly scoring summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performances {
    pub best: TeamScore,
    pub worst: TeamScore,
    pub average: f64,
    /// Highest three, present when at least six teams scored.
    pub top3: Option<Vec<TeamScore>>,
    /// Lowest three, worst first, present when at least six teams scored.
    pub bottom3: Option<Vec<TeamScore>>,
    pub teams_scored: usize,
}

/// Minimum number of scored entries before top/bottom three are reported.
const PODIUM_MIN_ENTRIES: usize = 6;

/// Summarize a week's scoring. Entries without a positive score are left
/// out entirely; returns `None` when nothing has been scored.
pub fn performances(entries: &[MatchupEntry], owners: &OwnerNames) -> Option<Performances> {
    let mut scores: Vec<TeamScore> = entries
        .iter()
        .filter_map(|e| {
            e.scored().map(|points| TeamScore {
                roster_id: e.roster_id,
                owner: owners.name(e.roster_id).to_string(),
                points,
            })
        })
        .collect();

    if scores.is_empty() {
        return None;
    }

    scores.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| a.roster_id.cmp(&b.roster_id))
    });

    let average = mean(scores.iter().map(|s| s.points));
    let n = scores.len();
    let (top3, bottom3) = if n >= PODIUM_MIN_ENTRIES {
        let top = scores[..3].to_vec();
        let bottom = scores[n - 3..].iter().rev().cloned().collect();
        (Some(top), Some(bottom))
    } else {
        (None, None)
    };

    Some(Performances {
        best: scores[0].clone(),
        worst: scores[n - 1].clone(),
        average,
        top3,
        bottom3,
        teams_scored: n,
    })
}

/// Arithmetic mean; 0.0 for an empty sequence.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Standings split at the playoff line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayoffPicture {
    pub slots: usize,
    pub in_playoffs: Vec<StandingRow>,
    pub out_playoffs: Vec<StandingRow>,
}

pub fn playoff_picture(standings: Vec<StandingRow>, slots: usize) -> PlayoffPicture {
    let cut = slots.min(standings.len());
    let mut in_playoffs = standings;
    let out_playoffs = in_playoffs.split_off(cut);

    PlayoffPicture {
        slots,
        in_playoffs,
        out_playoffs,
    }
}

/// The bottom `count` teams of the standings, worst first.
pub fn roast_targets(standings: &[StandingRow], count: usize) -> Vec<StandingRow> {
    standings.iter().rev().take(count).cloned().collect()
}

/// A transaction with its participants resolved to owner names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub teams: Vec<String>,
}

/// Transactions of the given kinds, most recent first, capped at `cap`.
pub fn recent_transactions(
    transactions: &[Transaction],
    kinds: &[TransactionKind],
    cap: usize,
    owners: &OwnerNames,
) -> Vec<TransactionSummary> {
    let mut matching: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| kinds.contains(&t.kind))
        .collect();

    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matching.truncate(cap);

    matching
        .into_iter()
        .map(|t| TransactionSummary {
            kind: t.kind.clone(),
            timestamp: t.timestamp,
            teams: t
                .roster_ids
                .iter()
                .map(|id| owners.name(*id).to_string())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{resolve_roster_owners, resolve_users};
    use crate::models::User;

    fn roster(id: RosterId, owner: &str, wins: u32, losses: u32, points: f64) -> Roster {
        Roster {
            id,
            owner_id: Some(owner.to_string()),
            wins,
            losses,
            ties: 0,
            points_for: points,
            starters: vec![],
            players: vec![],
        }
    }

    fn owners_for(rosters: &[Roster]) -> OwnerNames {
        let users: Vec<User> = rosters
            .iter()
            .filter_map(|r| r.owner_id.clone())
            .map(|id| User {
                display_name: id.to_uppercase(),
                id,
            })
            .collect();
        resolve_roster_owners(rosters, &resolve_users(&users))
    }

    fn entry(roster_id: RosterId, pairing: Option<u32>, points: Option<f64>) -> MatchupEntry {
        MatchupEntry {
            roster_id,
            pairing_id: pairing,
            points,
        }
    }

    #[test]
    fn test_standings_points_tie_break() {
        let rosters = vec![
            roster(3, "c", 4, 3, 700.0),
            roster(2, "b", 5, 2, 600.1),
            roster(1, "a", 5, 2, 650.4),
        ];
        let owners = owners_for(&rosters);
        let table = standings(&rosters, &owners);

        let names: Vec<_> = table.iter().map(|r| r.owner.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(table[0].rank, 1);
        assert_eq!(table[2].rank, 3);
    }

    #[test]
    fn test_standings_order_is_stable_and_total() {
        let rosters = vec![
            roster(4, "d", 2, 5, 500.0),
            roster(2, "b", 2, 5, 500.0),
            roster(1, "a", 6, 1, 400.0),
            roster(3, "c", 2, 5, 510.0),
        ];
        let once: Vec<RosterId> = standings_order(&rosters).iter().map(|r| r.id).collect();

        let mut reversed = rosters.clone();
        reversed.reverse();
        let twice: Vec<RosterId> = standings_order(&reversed).iter().map(|r| r.id).collect();

        assert_eq!(once, twice);
        assert_eq!(once, vec![1, 3, 2, 4]);

        for pair in standings_order(&rosters).windows(2) {
            assert!(pair[0].wins >= pair[1].wins);
            if pair[0].wins == pair[1].wins {
                assert!(pair[0].points_for >= pair[1].points_for);
            }
        }
    }

    #[test]
    fn test_matchups_only_pairs_of_two() {
        let rosters = vec![
            roster(1, "a", 0, 0, 0.0),
            roster(2, "b", 0, 0, 0.0),
            roster(3, "c", 0, 0, 0.0),
        ];
        let owners = owners_for(&rosters);
        let entries = vec![
            entry(1, Some(10), Some(101.2)),
            entry(2, Some(10), Some(95.0)),
            entry(3, Some(11), Some(88.0)),
        ];

        let pairs = matchups(&entries, &owners);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].team_a, "A");
        assert_eq!(pairs[0].team_b, "B");
        assert_eq!(pairs[0].points_a, 101.2);
    }

    #[test]
    fn test_matchups_skip_oversized_and_default_points() {
        let owners = OwnerNames::default();
        let entries = vec![
            entry(1, Some(1), None),
            entry(2, Some(1), None),
            entry(3, Some(2), Some(10.0)),
            entry(4, Some(2), Some(11.0)),
            entry(5, Some(2), Some(12.0)),
            entry(6, None, Some(50.0)),
        ];

        let pairs = matchups(&entries, &owners);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].pairing_id, 1);
        assert_eq!(pairs[0].points_a, 0.0);
        assert_eq!(pairs[0].points_b, 0.0);
        assert_eq!(pairs[0].team_a, "Unknown");
    }

    #[test]
    fn test_performances_excludes_unscored() {
        let owners = OwnerNames::default();
        let entries = vec![
            entry(1, Some(1), Some(120.0)),
            entry(2, Some(1), Some(80.0)),
            entry(3, Some(2), None),
            entry(4, Some(2), Some(0.0)),
        ];

        let perf = performances(&entries, &owners).unwrap();
        assert_eq!(perf.best.roster_id, 1);
        assert_eq!(perf.worst.roster_id, 2);
        assert_eq!(perf.average, 100.0);
        assert_eq!(perf.teams_scored, 2);
        assert!(perf.top3.is_none());
    }

    #[test]
    fn test_performances_podium_with_six_teams() {
        let owners = OwnerNames::default();
        let entries: Vec<_> = (1..=6)
            .map(|i| entry(i, Some(i), Some(i as f64 * 10.0)))
            .collect();

        let perf = performances(&entries, &owners).unwrap();
        let top: Vec<_> = perf.top3.unwrap().iter().map(|s| s.roster_id).collect();
        let bottom: Vec<_> = perf.bottom3.unwrap().iter().map(|s| s.roster_id).collect();
        assert_eq!(top, vec![6, 5, 4]);
        assert_eq!(bottom, vec![1, 2, 3]);
        assert_eq!(perf.average, 35.0);
    }

    #[test]
    fn test_performances_none_when_unscored() {
        let entries = vec![entry(1, Some(1), None)];
        assert!(performances(&entries, &OwnerNames::default()).is_none());
    }

    #[test]
    fn test_playoff_picture_split() {
        let rosters: Vec<_> = (1..=8)
            .map(|i| roster(i, "x", 8 - i, i, 100.0))
            .collect();
        let table = standings(&rosters, &owners_for(&rosters));

        let picture = playoff_picture(table.clone(), 6);
        assert_eq!(picture.in_playoffs.len(), 6);
        assert_eq!(picture.out_playoffs.len(), 2);
        assert_eq!(picture.out_playoffs[0].roster_id, 7);

        let everyone = playoff_picture(table, 12);
        assert_eq!(everyone.in_playoffs.len(), 8);
        assert!(everyone.out_playoffs.is_empty());
    }

    #[test]
    fn test_roast_targets_worst_first() {
        let rosters = vec![
            roster(1, "a", 6, 1, 700.0),
            roster(2, "b", 1, 6, 400.0),
            roster(3, "c", 3, 4, 500.0),
        ];
        let table = standings(&rosters, &owners_for(&rosters));
        let roasted = roast_targets(&table, 2);
        assert_eq!(roasted[0].roster_id, 2);
        assert_eq!(roasted[1].roster_id, 3);
        assert_eq!(roast_targets(&table, 10).len(), 3);
    }

    #[test]
    fn test_recent_transactions_filter_and_cap() {
        let owners = owners_for(&[roster(1, "a", 0, 0, 0.0), roster(2, "b", 0, 0, 0.0)]);
        let at = |secs: i64| DateTime::from_timestamp(secs, 0).unwrap();
        let txs = vec![
            Transaction {
                kind: TransactionKind::Trade,
                timestamp: at(100),
                roster_ids: vec![1, 2],
            },
            Transaction {
                kind: TransactionKind::Waiver,
                timestamp: at(300),
                roster_ids: vec![1],
            },
            Transaction {
                kind: TransactionKind::FreeAgent,
                timestamp: at(200),
                roster_ids: vec![2],
            },
            Transaction {
                kind: TransactionKind::Trade,
                timestamp: at(400),
                roster_ids: vec![2, 1],
            },
        ];

        let trades = recent_transactions(&txs, &[TransactionKind::Trade], 5, &owners);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].timestamp, at(400));
        assert_eq!(trades[0].teams, vec!["B", "A"]);

        let moves = recent_transactions(
            &txs,
            &[TransactionKind::Waiver, TransactionKind::FreeAgent],
            1,
            &owners,
        );
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].kind, TransactionKind::Waiver);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert_eq!(mean(vec![1.0, 2.0, 3.0]), 2.0);
    }
}
