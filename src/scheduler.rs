//! Scheduled posts: weekly recap, weekly preview, daily news.
//!
//! Each job builds a [`Digest`] from the same command pipelines the CLI uses,
//! renders it, and hands it to the injected delivery sink. A job with nothing
//! notable to say yields no digest and posts nothing. Job failures are logged
//! and never stop the loop.

use crate::analysis::{InjuredPlayer, MatchupPair, Performances, StandingRow, TrendingTarget};
use crate::commands::{LeagueService, Report};
use crate::config::ScheduleConfig;
use crate::delivery::DeliverySink;
use crate::error::Result;
use crate::report;
use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime, Weekday};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// A scheduled report generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Job {
    /// Current week's pairings plus the top of the standings
    Preview,
    /// Previous week's results and scoring summary
    Recap,
    /// Injuries and trending pickups
    News,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Preview => write!(f, "preview"),
            Job::Recap => write!(f, "recap"),
            Job::News => write!(f, "news"),
        }
    }
}

/// When a job fires, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Weekly(Weekday, NaiveTime),
    Daily(NaiveTime),
}

/// The first instant strictly after `now` at which `trigger` fires.
pub fn next_fire(trigger: Trigger, now: NaiveDateTime) -> NaiveDateTime {
    match trigger {
        Trigger::Daily(at) => {
            let today = now.date().and_time(at);
            if today > now {
                today
            } else {
                today + ChronoDuration::days(1)
            }
        }
        Trigger::Weekly(day, at) => {
            let days_ahead = (7 + day.num_days_from_monday() as i64
                - now.weekday().num_days_from_monday() as i64)
                % 7;
            let candidate = (now.date() + ChronoDuration::days(days_ahead)).and_time(at);
            if candidate > now {
                candidate
            } else {
                candidate + ChronoDuration::weeks(1)
            }
        }
    }
}

/// Content of one scheduled post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "digest", rename_all = "snake_case")]
pub enum Digest {
    Preview {
        week: u32,
        pairs: Vec<MatchupPair>,
        leaders: Vec<StandingRow>,
    },
    Recap {
        week: u32,
        pairs: Vec<MatchupPair>,
        summary: Performances,
    },
    News {
        injuries: BTreeMap<String, Vec<InjuredPlayer>>,
        targets: Vec<TrendingTarget>,
    },
}

/// Build the digest for `job`, or `None` when there is nothing worth posting.
pub async fn build_digest(service: &LeagueService, job: Job) -> Result<Option<Digest>> {
    match job {
        Job::Preview => preview(service).await,
        Job::Recap => recap(service).await,
        Job::News => news(service).await,
    }
}

async fn preview(service: &LeagueService) -> Result<Option<Digest>> {
    let (matchups, standings) = tokio::try_join!(service.matchups(None), service.standings())?;

    let Report::Matchups { week, pairs } = matchups else {
        return Ok(None);
    };
    let leaders = match standings {
        Report::Standings { rows, .. } => rows
            .into_iter()
            .take(service.reports_config().preview_standings)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Some(Digest::Preview {
        week,
        pairs,
        leaders,
    }))
}

async fn recap(service: &LeagueService) -> Result<Option<Digest>> {
    let current = service.current_week().await;
    if current <= 1 {
        info!("Week {} has no previous week to recap", current);
        return Ok(None);
    }
    let week = current - 1;

    let (matchups, performances) = tokio::try_join!(
        service.matchups(Some(week)),
        service.performances(Some(week))
    )?;

    match (matchups, performances) {
        (Report::Matchups { pairs, .. }, Report::Performances { summary, .. }) => {
            Ok(Some(Digest::Recap {
                week,
                pairs,
                summary,
            }))
        }
        _ => Ok(None),
    }
}

async fn news(service: &LeagueService) -> Result<Option<Digest>> {
    let (injuries, targets) = tokio::try_join!(service.injuries(), service.targets(None))?;

    let injuries = match injuries {
        Report::Injuries { by_status } => by_status,
        _ => BTreeMap::new(),
    };
    let min_adds = service.reports_config().news_min_adds;
    let targets: Vec<TrendingTarget> = match targets {
        Report::Targets { targets, .. } => targets
            .into_iter()
            .filter(|t| t.add_count >= min_adds)
            .collect(),
        _ => Vec::new(),
    };

    if injuries.is_empty() && targets.is_empty() {
        return Ok(None);
    }
    Ok(Some(Digest::News { injuries, targets }))
}

/// Run a job once. Returns whether anything was delivered.
pub async fn run_job(service: &LeagueService, sink: &dyn DeliverySink, job: Job) -> Result<bool> {
    match build_digest(service, job).await? {
        Some(digest) => {
            sink.deliver(&report::generate_digest(&digest)).await?;
            info!("Posted {} via {}", job, sink.name());
            Ok(true)
        }
        None => {
            info!("Nothing to post for {}, skipping", job);
            Ok(false)
        }
    }
}

/// Runs every job on its trigger until the process exits.
pub struct Scheduler {
    service: Arc<LeagueService>,
    sink: Arc<dyn DeliverySink>,
    schedule: ScheduleConfig,
}

impl Scheduler {
    pub fn new(
        service: Arc<LeagueService>,
        sink: Arc<dyn DeliverySink>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            service,
            sink,
            schedule,
        }
    }

    pub fn triggers(&self) -> anyhow::Result<Vec<(Job, Trigger)>> {
        let (recap_day, recap_at) = self.schedule.recap()?;
        let (preview_day, preview_at) = self.schedule.preview()?;
        Ok(vec![
            (Job::Recap, Trigger::Weekly(recap_day, recap_at)),
            (Job::Preview, Trigger::Weekly(preview_day, preview_at)),
            (Job::News, Trigger::Daily(self.schedule.news()?)),
        ])
    }

    /// Spawn one task per job and wait on all of them.
    pub async fn start(self) -> anyhow::Result<()> {
        let triggers = self.triggers()?;
        info!("Starting scheduler with {} jobs", triggers.len());

        let handles: Vec<_> = triggers
            .into_iter()
            .map(|(job, trigger)| {
                let service = Arc::clone(&self.service);
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move {
                    Self::run_job_loop(service, sink, job, trigger).await;
                })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!("Scheduler task ended unexpectedly: {}", e);
            }
        }
        Ok(())
    }

    async fn run_job_loop(
        service: Arc<LeagueService>,
        sink: Arc<dyn DeliverySink>,
        job: Job,
        trigger: Trigger,
    ) {
        loop {
            let now = Local::now().naive_local();
            let fire_at = next_fire(trigger, now);
            let wait = (fire_at - now)
                .to_std()
                .unwrap_or(Duration::from_secs(60));

            info!("Next {} scheduled for {}", job, fire_at);
            sleep(wait).await;

            if let Err(e) = run_job(&service, sink.as_ref(), job).await {
                error!("Scheduled {} failed: {}", job, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportsConfig;
    use crate::source::fake::{sample_league, FakeSource};
    use crate::source::Resource;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Mutex;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        async fn deliver(&self, message: &str) -> Result<()> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn service(source: FakeSource, reports: ReportsConfig) -> LeagueService {
        LeagueService::new(Arc::new(source), reports, None)
    }

    #[test]
    fn test_next_fire_daily() {
        // 2025-09-16 is a Tuesday
        let trigger = Trigger::Daily(hm(9, 0));
        assert_eq!(next_fire(trigger, at(2025, 9, 16, 8, 30)), at(2025, 9, 16, 9, 0));
        assert_eq!(next_fire(trigger, at(2025, 9, 16, 9, 0)), at(2025, 9, 17, 9, 0));
    }

    #[test]
    fn test_next_fire_weekly() {
        let trigger = Trigger::Weekly(Weekday::Tue, hm(10, 0));
        // Sunday evening -> Tuesday morning
        assert_eq!(next_fire(trigger, at(2025, 9, 14, 20, 0)), at(2025, 9, 16, 10, 0));
        // Same Tuesday before the slot
        assert_eq!(next_fire(trigger, at(2025, 9, 16, 7, 0)), at(2025, 9, 16, 10, 0));
        // Same Tuesday after the slot -> next week
        assert_eq!(next_fire(trigger, at(2025, 9, 16, 11, 0)), at(2025, 9, 23, 10, 0));
    }

    #[test]
    fn test_default_triggers() {
        let scheduler = Scheduler::new(
            Arc::new(service(FakeSource::new(), ReportsConfig::default())),
            Arc::new(RecordingSink::default()),
            ScheduleConfig::default(),
        );
        let triggers = scheduler.triggers().unwrap();
        assert_eq!(
            triggers[0],
            (Job::Recap, Trigger::Weekly(Weekday::Tue, hm(8, 0)))
        );
        assert_eq!(triggers[2], (Job::News, Trigger::Daily(hm(9, 0))));
    }

    #[tokio::test]
    async fn test_preview_digest() {
        let reports = ReportsConfig {
            preview_standings: 2,
            ..ReportsConfig::default()
        };
        let digest = build_digest(&service(sample_league(), reports), Job::Preview)
            .await
            .unwrap()
            .unwrap();

        let Digest::Preview {
            week,
            pairs,
            leaders,
        } = digest
        else {
            panic!("expected preview");
        };
        assert_eq!(week, 3);
        assert_eq!(pairs.len(), 2);
        assert_eq!(leaders.len(), 2);
        assert_eq!(leaders[0].owner, "Alice");
    }

    #[tokio::test]
    async fn test_recap_fails_when_previous_week_missing() {
        // Week 2 is absent from the sample league
        let result = build_digest(&service(sample_league(), ReportsConfig::default()), Job::Recap).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recap_skipped_in_week_one() {
        let source = sample_league().with(Resource::NflState, json!({"week": 1}));
        let digest = build_digest(&service(source, ReportsConfig::default()), Job::Recap)
            .await
            .unwrap();
        assert!(digest.is_none());
    }

    #[tokio::test]
    async fn test_recap_skipped_when_nothing_scored() {
        let source = sample_league().with(
            Resource::Matchups { week: 2 },
            json!([
                {"roster_id": 1, "matchup_id": 1, "points": 0},
                {"roster_id": 2, "matchup_id": 1, "points": 0}
            ]),
        );
        let digest = build_digest(&service(source, ReportsConfig::default()), Job::Recap)
            .await
            .unwrap();
        assert!(digest.is_none());
    }

    #[tokio::test]
    async fn test_news_filters_targets_by_add_count() {
        let digest = build_digest(&service(sample_league(), ReportsConfig::default()), Job::News)
            .await
            .unwrap()
            .unwrap();

        let Digest::News { injuries, targets } = digest else {
            panic!("expected news");
        };
        assert_eq!(injuries.len(), 2);
        // rb5 trends with only 300 adds
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].player_id, "wr7");
    }

    #[tokio::test]
    async fn test_news_skipped_when_quiet() {
        let source = sample_league()
            .with(
                Resource::Players,
                json!({"qb1": {"first_name": "Josh", "last_name": "Allen", "position": "QB"}}),
            )
            .with(
                Resource::TrendingAdds {
                    lookback_hours: 24,
                    limit: 50,
                },
                json!([]),
            );
        let svc = service(source, ReportsConfig::default());
        let sink = RecordingSink::default();

        let delivered = run_job(&svc, &sink, Job::News).await.unwrap();
        assert!(!delivered);
        assert!(sink.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_job_delivers_rendered_digest() {
        let svc = service(sample_league(), ReportsConfig::default());
        let sink = RecordingSink::default();

        assert!(run_job(&svc, &sink, Job::Preview).await.unwrap());
        let messages = sink.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Week 3 Preview"));
    }
}
