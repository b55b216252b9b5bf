use std::time::Duration;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::MatchStore;
use crate::error::Result;
use crate::ingest;
use crate::sampler::{self, MetricsSource};
use crate::source::BlockSource;
use crate::types::{MatchRecord, MatchStatus, MatchUpdate};

use super::{scheduler, state_machine, state_machine::Transition};

/// Pure per-record evaluation: run the state machine, apply the resulting
/// transition, and compute the next re-check deadline for the (possibly
/// new) status. Every evaluation stamps `last_checked_at` and bumps the
/// check counter, transition or not.
pub fn evaluate_record(
    record: &MatchRecord,
    now: DateTime<Utc>,
    policy: &crate::config::SchedulerPolicy,
) -> MatchUpdate {
    let transition = state_machine::evaluate(record, now, policy);

    let mut status = record.status;
    let mut home_score = record.home_score;
    let mut away_score = record.away_score;
    let mut completed_at = record.completed_at;

    match transition {
        Transition::ToLive => {
            status = MatchStatus::Live;
            home_score.get_or_insert(0);
            away_score.get_or_insert(0);
        }
        Transition::ToCompleted => {
            status = MatchStatus::Completed;
            completed_at.get_or_insert(now);
        }
        Transition::None => {}
    }

    MatchUpdate {
        match_id: record.match_id.clone(),
        status,
        is_live: status == MatchStatus::Live,
        home_score,
        away_score,
        next_check_at: scheduler::next_check_at(
            status,
            &record.date,
            &record.kickoff_time,
            now,
            policy,
        ),
        last_checked_at: now,
        completed_at,
        check_count: record.check_count + 1,
    }
}

/// The orchestrating loop. One sequential task owns both cadences: the
/// per-tick re-check cycle and the once-daily wholesale ingest, which are
/// therefore naturally serialized — no tick ever reads a half-replaced
/// dataset.
pub struct PollingEngine<S, M> {
    cfg: Config,
    store: MatchStore,
    source: S,
    metrics: M,
    last_ingest: Option<NaiveDate>,
}

impl<S: BlockSource, M: MetricsSource> PollingEngine<S, M> {
    pub fn new(cfg: Config, store: MatchStore, source: S, metrics: M, bootstrapped: bool) -> Self {
        let last_ingest = bootstrapped.then(|| Utc::now().date_naive());
        Self { cfg, store, source, metrics, last_ingest }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.tick_interval_secs));
        ticker.tick().await; // skip immediate first tick — bootstrap already ran

        loop {
            ticker.tick().await;
            let now = Utc::now();

            if self.ingest_due(now) {
                match ingest::run_ingest(&self.source, &self.store, &self.cfg.policy).await {
                    Ok(_) => self.last_ingest = Some(now.date_naive()),
                    Err(e) => {
                        // Existing dataset stays in place; retried on a later tick.
                        error!("Ingest failed, keeping previous dataset: {e}");
                    }
                }
            }

            if let Err(e) = self.tick(now).await {
                // The whole tick is discarded; deadlines are recomputed next
                // time around since the clock has moved on.
                error!("Tick failed, batch discarded: {e}");
            }
        }
    }

    /// Once per calendar day, when the tick clock enters the ingest hour.
    fn ingest_due(&self, now: DateTime<Utc>) -> bool {
        now.hour() == self.cfg.ingest_hour_utc && self.last_ingest != Some(now.date_naive())
    }

    async fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        let selected = self.store.due_or_live(now).await?;
        if selected.is_empty() {
            return Ok(());
        }

        let mut updates = Vec::with_capacity(selected.len());
        let mut went_live = 0usize;
        let mut completed = 0usize;

        for record in &selected {
            let update = evaluate_record(record, now, &self.cfg.policy);
            if update.status != record.status {
                info!(
                    match_id = %record.match_id,
                    from = %record.status,
                    to = %update.status,
                    "{} vs {}: {} → {}",
                    record.home_team, record.away_team, record.status, update.status,
                );
                match update.status {
                    MatchStatus::Live => went_live += 1,
                    MatchStatus::Completed => completed += 1,
                    MatchStatus::Upcoming => {}
                }
            }
            updates.push(update);
        }

        self.store.apply_batch(&updates).await?;

        // Sampling happens over the post-commit live set and never fails
        // the tick — the batch is already durable.
        let live = self.store.live_matches().await?;
        if !live.is_empty() {
            if let Err(e) = sampler::sample_live(&self.metrics, &self.store, &live, now).await {
                warn!("Stats sampling failed: {e}");
            }
        }

        info!(
            checked = selected.len(),
            went_live,
            completed,
            live = live.len(),
            "Tick complete",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerPolicy;
    use crate::types::Odds;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 31, 14, 0, 0).unwrap()
    }

    fn record(status: MatchStatus, kickoff_time: &str) -> MatchRecord {
        MatchRecord {
            match_id: "abc123def456".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            date: "31/08".to_string(),
            kickoff_time: kickoff_time.to_string(),
            odds: Odds::UNOBSERVED,
            status,
            is_live: status == MatchStatus::Live,
            home_score: None,
            away_score: None,
            next_check_at: now(),
            last_checked_at: None,
            completed_at: None,
            scraped_at: now(),
            check_count: 3,
        }
    }

    #[test]
    fn evaluation_stamps_bookkeeping_without_transition() {
        let rec = record(MatchStatus::Upcoming, "20:00");
        let upd = evaluate_record(&rec, now(), &SchedulerPolicy::default());

        assert_eq!(upd.status, MatchStatus::Upcoming);
        assert!(!upd.is_live);
        assert_eq!(upd.last_checked_at, now());
        assert_eq!(upd.check_count, 4);
        // Kickoff 20:00 → deadline 19:55.
        assert_eq!(upd.next_check_at, now() + ChronoDuration::hours(6) - ChronoDuration::minutes(5));
    }

    #[test]
    fn kickoff_one_minute_ago_goes_live_with_zeroed_scores() {
        let rec = record(MatchStatus::Upcoming, "13:59");
        let upd = evaluate_record(&rec, now(), &SchedulerPolicy::default());

        assert_eq!(upd.status, MatchStatus::Live);
        assert!(upd.is_live);
        assert_eq!(upd.home_score, Some(0));
        assert_eq!(upd.away_score, Some(0));
        assert_eq!(upd.next_check_at, now() + ChronoDuration::minutes(2));
    }

    #[test]
    fn stale_live_completes_and_parks_a_day_out() {
        let mut rec = record(MatchStatus::Live, "10:00");
        rec.last_checked_at = Some(now() - ChronoDuration::hours(4));
        rec.home_score = Some(2);
        rec.away_score = Some(2);

        let upd = evaluate_record(&rec, now(), &SchedulerPolicy::default());
        assert_eq!(upd.status, MatchStatus::Completed);
        assert!(!upd.is_live);
        assert_eq!(upd.completed_at, Some(now()));
        assert_eq!(upd.next_check_at, now() + ChronoDuration::days(1));
        // Final score survives completion.
        assert_eq!(upd.home_score, Some(2));
    }

    #[test]
    fn completed_at_is_set_exactly_once() {
        let mut rec = record(MatchStatus::Completed, "10:00");
        let first_completion = now() - ChronoDuration::hours(5);
        rec.completed_at = Some(first_completion);
        rec.last_checked_at = Some(now() - ChronoDuration::hours(5));

        let upd = evaluate_record(&rec, now(), &SchedulerPolicy::default());
        assert_eq!(upd.completed_at, Some(first_completion));
        assert_eq!(upd.status, MatchStatus::Completed);
    }

    #[test]
    fn status_sequence_is_monotonic_over_time() {
        let policy = SchedulerPolicy::default();
        let mut rec = record(MatchStatus::Upcoming, "14:30");
        let mut statuses = vec![rec.status];

        // Walk forward in 30-minute steps, applying each update back onto
        // the record the way a committed batch would.
        for step in 1..=16 {
            let t = now() + ChronoDuration::minutes(30 * step);
            let upd = evaluate_record(&rec, t, &policy);
            rec.status = upd.status;
            rec.is_live = upd.is_live;
            rec.home_score = upd.home_score;
            rec.away_score = upd.away_score;
            rec.next_check_at = upd.next_check_at;
            rec.completed_at = upd.completed_at;
            rec.check_count = upd.check_count;
            // Only advance last_checked_at sometimes, to let staleness build up.
            if step % 8 != 0 {
                rec.last_checked_at = Some(t);
            }
            statuses.push(rec.status);
        }

        for pair in statuses.windows(2) {
            assert!(pair[0] <= pair[1], "status regressed: {:?}", statuses);
        }
        assert!(statuses.iter().any(|s| *s == MatchStatus::Live));
    }

    #[test]
    fn is_live_always_mirrors_status() {
        let policy = SchedulerPolicy::default();
        for (status, kickoff) in [
            (MatchStatus::Upcoming, "13:59"),
            (MatchStatus::Upcoming, "20:00"),
            (MatchStatus::Live, "13:00"),
            (MatchStatus::Completed, "10:00"),
        ] {
            let upd = evaluate_record(&record(status, kickoff), now(), &policy);
            assert_eq!(upd.is_live, upd.status == MatchStatus::Live);
        }
    }
}
