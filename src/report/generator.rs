//! Chat message generation.
//!
//! Messages use the Markdown subset Discord renders. Points are always shown
//! to one decimal place.

use crate::analysis::{
    Awards, HeadToHead, InjuredPlayer, MatchupPair, Performances, PlayoffPicture, PowerRow,
    RosterDetail, StandingRow, TeamScore, TransactionSummary, TrendingTarget,
};
use crate::commands::{Report, TransactionFeed};
use crate::scheduler::Digest;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Generate the chat message for a command result.
pub fn generate_text_report(report: &Report) -> String {
    match report {
        Report::Standings { league, rows } => generate_standings(league, rows),
        Report::Matchups { week, pairs } => {
            let mut output = format!("**Week {} Matchups**\n\n", week);
            output.push_str(&generate_matchup_lines(pairs));
            output
        }
        Report::Roster { detail } => generate_roster(detail),
        Report::Transactions { feed, items, .. } => generate_transactions(*feed, items),
        Report::Performances { week, summary } => {
            let mut output = format!("**Week {} Performances**\n\n", week);
            output.push_str(&generate_performance_lines(summary));
            output
        }
        Report::Awards {
            through_week,
            awards,
            missing_weeks,
        } => {
            let mut output = generate_awards(*through_week, awards);
            output.push_str(&generate_gaps_note(missing_weeks));
            output
        }
        Report::PowerRankings {
            first_week,
            last_week,
            rows,
            missing_weeks,
        } => {
            let mut output = generate_power_rankings(*first_week, *last_week, rows);
            output.push_str(&generate_gaps_note(missing_weeks));
            output
        }
        Report::Playoffs { league, picture } => generate_playoffs(league, picture),
        Report::HeadToHead {
            through_week,
            result,
            missing_weeks,
        } => {
            let mut output = generate_head_to_head(*through_week, result);
            output.push_str(&generate_gaps_note(missing_weeks));
            output
        }
        Report::Injuries { by_status } => {
            let mut output = String::from("**Injury Report**\n\n");
            output.push_str(&generate_injury_lines(by_status));
            output
        }
        Report::Targets {
            lookback_hours,
            targets,
        } => {
            let mut output = format!("**Trending Pickups** (last {}h)\n\n", lookback_hours);
            output.push_str(&generate_target_lines(targets));
            output
        }
        Report::Roast { targets } => generate_roast(targets),
        Report::Empty { message } => message.clone(),
    }
}

/// Generate the message for a scheduled post.
pub fn generate_digest(digest: &Digest) -> String {
    let mut output = String::new();

    match digest {
        Digest::Preview {
            week,
            pairs,
            leaders,
        } => {
            output.push_str(&format!("🏈 **Week {} Preview**\n", week));
            output.push_str("New week is here! This week's matchups:\n\n");
            output.push_str(&generate_matchup_lines(pairs));
            if !leaders.is_empty() {
                output.push_str("\n**Top of the table**\n");
                for row in leaders {
                    output.push_str(&format!(
                        "{}. {} ({})\n",
                        row.rank,
                        row.owner,
                        record_text(row.wins, row.losses, row.ties)
                    ));
                }
            }
        }
        Digest::Recap {
            week,
            pairs,
            summary,
        } => {
            output.push_str(&format!("📊 **Week {} Results**\n\n", week));
            output.push_str(&generate_matchup_lines(pairs));
            output.push('\n');
            output.push_str(&generate_performance_lines(summary));
        }
        Digest::News { injuries, targets } => {
            output.push_str("📰 **Daily League News**\n\n");
            if !injuries.is_empty() {
                output.push_str("**Injuries on rosters**\n");
                output.push_str(&generate_injury_lines(injuries));
            }
            if !targets.is_empty() {
                output.push_str("**Hot waiver targets**\n");
                output.push_str(&generate_target_lines(targets));
            }
        }
    }

    output
}

/// Generate a pretty-printed JSON document for any serializable result.
pub fn generate_json_report<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

fn pts(points: f64) -> String {
    format!("{:.1}", points)
}

fn record_text(wins: u32, losses: u32, ties: u32) -> String {
    if ties > 0 {
        format!("{}-{}-{}", wins, losses, ties)
    } else {
        format!("{}-{}", wins, losses)
    }
}

fn generate_standings(league: &str, rows: &[StandingRow]) -> String {
    let mut section = format!("**{} - Standings**\n\n", league);

    for row in rows {
        section.push_str(&format!("**{}.** {}\n", row.rank, row.owner));
        section.push_str(&format!(
            "{} • {} pts\n\n",
            record_text(row.wins, row.losses, row.ties),
            pts(row.points)
        ));
    }

    section
}

fn generate_matchup_lines(pairs: &[MatchupPair]) -> String {
    let mut lines = String::new();

    for pair in pairs {
        lines.push_str(&format!(
            "{} ({}) vs {} ({})\n",
            pair.team_a,
            pts(pair.points_a),
            pair.team_b,
            pts(pair.points_b)
        ));
    }

    lines
}

fn generate_roster(detail: &RosterDetail) -> String {
    let mut section = format!("**{}'s Roster**\n", detail.owner);
    section.push_str(&format!(
        "Record: {} • {} points\n\n",
        detail.record,
        pts(detail.points)
    ));

    for (title, players) in [("🏈 **Starters**", &detail.starters), ("🪑 **Bench**", &detail.bench)] {
        section.push_str(title);
        section.push('\n');
        if players.is_empty() {
            section.push_str("None\n");
        } else {
            section.push_str(&players.join("\n"));
            section.push('\n');
        }
        section.push('\n');
    }

    section
}

fn generate_transactions(feed: TransactionFeed, items: &[TransactionSummary]) -> String {
    let mut section = String::new();

    match feed {
        TransactionFeed::Trades => {
            section.push_str("**Recent Trades**\n\n");
            for (i, trade) in items.iter().enumerate() {
                section.push_str(&format!(
                    "**Trade {}** ({})\n{}\n\n",
                    i + 1,
                    trade.timestamp.format("%Y-%m-%d"),
                    trade.teams.join(" ↔ ")
                ));
            }
        }
        TransactionFeed::Waivers => {
            section.push_str("**Recent Waiver Activity**\n");
            section.push_str(&format!("{} recent moves found\n\n", items.len()));
            for item in items {
                section.push_str(&format!(
                    "- {}: {} ({})\n",
                    item.kind,
                    item.teams.join(", "),
                    item.timestamp.format("%Y-%m-%d")
                ));
            }
        }
    }

    section
}

fn score_line(label: &str, score: &TeamScore) -> String {
    format!("{} {} with {}\n", label, score.owner, pts(score.points))
}

fn generate_performance_lines(summary: &Performances) -> String {
    let mut lines = String::new();

    lines.push_str(&score_line("🔥 Top score:", &summary.best));
    lines.push_str(&score_line("🧊 Low score:", &summary.worst));
    lines.push_str(&format!(
        "📈 League average: {} across {} teams\n",
        pts(summary.average),
        summary.teams_scored
    ));

    if let Some(ref top) = summary.top3 {
        lines.push_str("\n**Top 3**\n");
        for (i, s) in top.iter().enumerate() {
            lines.push_str(&format!("{}. {} ({})\n", i + 1, s.owner, pts(s.points)));
        }
    }
    if let Some(ref bottom) = summary.bottom3 {
        lines.push_str("\n**Bottom 3**\n");
        for (i, s) in bottom.iter().enumerate() {
            lines.push_str(&format!("{}. {} ({})\n", i + 1, s.owner, pts(s.points)));
        }
    }

    lines
}

fn generate_awards(through_week: u32, awards: &Awards) -> String {
    let mut section = format!("🏆 **Season Awards** (through week {})\n\n", through_week);

    if let Some(ref high) = awards.highest_week {
        section.push_str(&format!(
            "🚀 Highest week: {} with {} (week {})\n",
            high.owner,
            pts(high.points),
            high.week
        ));
    }
    if let Some(ref low) = awards.lowest_week {
        section.push_str(&format!(
            "🪫 Lowest week: {} with {} (week {})\n",
            low.owner,
            pts(low.points),
            low.week
        ));
    }
    if let Some(ref steady) = awards.most_consistent {
        section.push_str(&format!(
            "🎯 Most consistent: {} (±{} over {} weeks, {} avg)\n",
            steady.owner,
            pts(steady.std_dev),
            steady.weeks,
            pts(steady.average)
        ));
    }
    if let Some(ref leader) = awards.current_leader {
        section.push_str(&format!(
            "👑 League leader: {} ({})\n",
            leader.owner,
            record_text(leader.wins, leader.losses, leader.ties)
        ));
    }
    if let Some(ref scorer) = awards.points_leader {
        section.push_str(&score_line("💰 Points leader:", scorer));
    }

    section
}

fn generate_power_rankings(first_week: u32, last_week: u32, rows: &[PowerRow]) -> String {
    let mut section = if first_week == last_week {
        format!("⚡ **Power Rankings** (week {})\n\n", last_week)
    } else {
        format!(
            "⚡ **Power Rankings** (weeks {}-{})\n\n",
            first_week, last_week
        )
    };

    for row in rows {
        section.push_str(&format!(
            "**{}.** {}: {} avg • {}\n",
            row.rank,
            row.owner,
            pts(row.recent_avg),
            row.record
        ));
    }

    section
}

fn generate_playoffs(league: &str, picture: &PlayoffPicture) -> String {
    let mut section = format!(
        "**{} - Playoff Picture** ({} spots)\n\n",
        league, picture.slots
    );

    let rows = |title: &str, rows: &[StandingRow]| -> String {
        let mut block = format!("{}\n", title);
        for row in rows {
            block.push_str(&format!(
                "{}. {} ({}, {} pts)\n",
                row.rank,
                row.owner,
                record_text(row.wins, row.losses, row.ties),
                pts(row.points)
            ));
        }
        block
    };

    section.push_str(&rows("✅ **In**", picture.in_playoffs.as_slice()));
    if !picture.out_playoffs.is_empty() {
        section.push('\n');
        section.push_str(&rows("❌ **Out**", picture.out_playoffs.as_slice()));
    }

    section
}

fn generate_head_to_head(through_week: u32, h2h: &HeadToHead) -> String {
    let mut section = format!("⚔️ **{} vs {}**\n", h2h.team_a, h2h.team_b);

    if h2h.games.is_empty() {
        section.push_str(&format!(
            "These teams have not met through week {}.\n",
            through_week
        ));
        return section;
    }

    section.push_str(&format!(
        "Series: {} {} - {} {}",
        h2h.team_a, h2h.wins_a, h2h.wins_b, h2h.team_b
    ));
    if h2h.ties > 0 {
        section.push_str(&format!(" ({} tied)", h2h.ties));
    }
    section.push_str("\n\n");

    for game in &h2h.games {
        section.push_str(&format!(
            "Week {}: {} - {}\n",
            game.week,
            pts(game.points_a),
            pts(game.points_b)
        ));
    }

    section
}

fn generate_injury_lines(by_status: &BTreeMap<String, Vec<InjuredPlayer>>) -> String {
    let mut lines = String::new();

    for (status, players) in by_status {
        lines.push_str(&format!("**{}**\n", status));
        for p in players {
            lines.push_str(&format!(
                "- {} ({}, {}) - {}\n",
                p.player, p.position, p.team, p.owner
            ));
        }
        lines.push('\n');
    }

    lines
}

fn generate_target_lines(targets: &[TrendingTarget]) -> String {
    let mut lines = String::new();

    for (i, t) in targets.iter().enumerate() {
        lines.push_str(&format!("{}. {} - {} adds\n", i + 1, t.player, t.add_count));
    }

    lines
}

fn generate_roast(targets: &[StandingRow]) -> String {
    let mut section = String::from("🔥 **Roast Corner**\n\n");

    for row in targets {
        section.push_str(&format!(
            "{} sits at #{} with a {} record and {} points. Maybe try setting a lineup?\n",
            row.owner,
            row.rank,
            record_text(row.wins, row.losses, row.ties),
            pts(row.points)
        ));
    }

    section
}

/// Note listing weeks that could not be loaded, or nothing.
fn generate_gaps_note(missing_weeks: &[u32]) -> String {
    if missing_weeks.is_empty() {
        return String::new();
    }
    let weeks: Vec<String> = missing_weeks.iter().map(u32::to_string).collect();
    format!("\n_Missing data for week(s): {}_\n", weeks.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{GameOutcome, HeadToHeadGame};

    fn row(rank: usize, roster_id: u32, owner: &str, wins: u32, points: f64) -> StandingRow {
        StandingRow {
            rank,
            roster_id,
            owner: owner.to_string(),
            wins,
            losses: 3 - wins,
            ties: 0,
            points,
        }
    }

    fn pair(a: &str, pa: f64, b: &str, pb: f64) -> MatchupPair {
        MatchupPair {
            pairing_id: 1,
            roster_a: 1,
            roster_b: 2,
            team_a: a.to_string(),
            team_b: b.to_string(),
            points_a: pa,
            points_b: pb,
        }
    }

    #[test]
    fn test_generate_standings() {
        let report = Report::Standings {
            league: "Gridiron Legends".to_string(),
            rows: vec![row(1, 1, "Alice", 2, 350.5), row(2, 2, "Bob", 2, 330.0)],
        };
        let text = generate_text_report(&report);

        assert!(text.starts_with("**Gridiron Legends - Standings**"));
        assert!(text.contains("**1.** Alice\n2-1 • 350.5 pts"));
        assert!(text.contains("330.0 pts"));
    }

    #[test]
    fn test_points_one_decimal() {
        let report = Report::Matchups {
            week: 3,
            pairs: vec![pair("Alice", 101.234, "Bob", 95.0)],
        };
        let text = generate_text_report(&report);
        assert!(text.contains("Alice (101.2) vs Bob (95.0)"));
    }

    #[test]
    fn test_empty_report_is_its_message() {
        let report = Report::Empty {
            message: "No recent trades found!".to_string(),
        };
        assert_eq!(generate_text_report(&report), "No recent trades found!");
    }

    #[test]
    fn test_roster_without_bench() {
        let report = Report::Roster {
            detail: RosterDetail {
                roster_id: 1,
                owner: "Alice".to_string(),
                record: "2-1".to_string(),
                points: 350.5,
                starters: vec!["Josh Allen (QB)".to_string()],
                bench: vec![],
            },
        };
        let text = generate_text_report(&report);
        assert!(text.contains("**Alice's Roster**"));
        assert!(text.contains("Josh Allen (QB)"));
        assert!(text.contains("🪑 **Bench**\nNone"));
    }

    #[test]
    fn test_head_to_head_series() {
        let report = Report::HeadToHead {
            through_week: 3,
            result: HeadToHead {
                roster_a: 1,
                roster_b: 2,
                team_a: "Alice".to_string(),
                team_b: "Bob".to_string(),
                wins_a: 1,
                wins_b: 1,
                ties: 0,
                games: vec![HeadToHeadGame {
                    week: 1,
                    points_a: 120.5,
                    points_b: 100.0,
                    outcome: GameOutcome::WinA,
                }],
            },
            missing_weeks: vec![2],
        };
        let text = generate_text_report(&report);
        assert!(text.contains("Series: Alice 1 - 1 Bob"));
        assert!(text.contains("Week 1: 120.5 - 100.0"));
        assert!(text.contains("Missing data for week(s): 2"));
    }

    #[test]
    fn test_json_report_is_tagged() {
        let report = Report::Standings {
            league: "L".to_string(),
            rows: vec![row(1, 1, "Alice", 2, 350.5)],
        };
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["report"], "standings");
        assert_eq!(value["rows"][0]["owner"], "Alice");
    }

    #[test]
    fn test_preview_digest() {
        let digest = Digest::Preview {
            week: 4,
            pairs: vec![pair("Alice", 0.0, "Bob", 0.0)],
            leaders: vec![row(1, 1, "Alice", 3, 400.0)],
        };
        let text = generate_digest(&digest);
        assert!(text.contains("**Week 4 Preview**"));
        assert!(text.contains("Alice (0.0) vs Bob (0.0)"));
        assert!(text.contains("1. Alice (3-0)"));
    }

    #[test]
    fn test_news_digest_omits_empty_sections() {
        let digest = Digest::News {
            injuries: BTreeMap::new(),
            targets: vec![TrendingTarget {
                player_id: "wr7".to_string(),
                player: "Puka Nacua (WR)".to_string(),
                add_count: 2400,
            }],
        };
        let text = generate_digest(&digest);
        assert!(!text.contains("Injuries"));
        assert!(text.contains("1. Puka Nacua (WR) - 2400 adds"));
    }
}
