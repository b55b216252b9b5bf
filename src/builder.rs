use chrono::{DateTime, Utc};

use crate::config::SchedulerPolicy;
use crate::engine::scheduler;
use crate::identity;
use crate::types::{DraftMatch, MatchRecord, MatchStatus};

/// Composes a parser draft and its derived identity into a persistable
/// match record with initial scheduling fields. The record has never been
/// evaluated, so `last_checked_at` starts absent and the first re-check
/// deadline comes from the scheduler's initial mode over the raw fields.
pub fn build(draft: DraftMatch, now: DateTime<Utc>, policy: &SchedulerPolicy) -> MatchRecord {
    let match_id = identity::match_id(&draft.home_team, &draft.away_team, &draft.date);

    let status = if draft.is_live {
        MatchStatus::Live
    } else {
        MatchStatus::Upcoming
    };

    // Scores exist from the moment a match is live; 0-0 until the metrics
    // collaborator says otherwise.
    let (home_score, away_score) = if status == MatchStatus::Live {
        (Some(0), Some(0))
    } else {
        (None, None)
    };

    let next_check_at = scheduler::next_check_at(status, &draft.date, &draft.kickoff_time, now, policy);

    MatchRecord {
        match_id,
        home_team: draft.home_team,
        away_team: draft.away_team,
        league: draft.league,
        date: draft.date,
        kickoff_time: draft.kickoff_time,
        odds: draft.odds,
        status,
        is_live: status == MatchStatus::Live,
        home_score,
        away_score,
        next_check_at,
        last_checked_at: None,
        completed_at: None,
        scraped_at: now,
        check_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Odds;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 31, 14, 0, 0).unwrap()
    }

    fn draft(is_live: bool) -> DraftMatch {
        DraftMatch {
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            date: "31/08".to_string(),
            kickoff_time: "17:00".to_string(),
            odds: Odds { home: 2.10, draw: 3.40, away: 3.00 },
            is_live,
        }
    }

    #[test]
    fn upcoming_record_has_no_scores_and_prekickoff_deadline() {
        let rec = build(draft(false), now(), &SchedulerPolicy::default());
        assert_eq!(rec.status, MatchStatus::Upcoming);
        assert!(!rec.is_live);
        assert_eq!(rec.home_score, None);
        assert_eq!(rec.away_score, None);
        assert_eq!(rec.last_checked_at, None);
        assert_eq!(rec.check_count, 0);
        // Kickoff at 17:00 → next check at 16:55.
        assert_eq!(rec.next_check_at, now() + Duration::hours(3) - Duration::minutes(5));
    }

    #[test]
    fn live_flagged_record_starts_live_with_zero_scores() {
        let rec = build(draft(true), now(), &SchedulerPolicy::default());
        assert_eq!(rec.status, MatchStatus::Live);
        assert!(rec.is_live);
        assert_eq!(rec.home_score, Some(0));
        assert_eq!(rec.away_score, Some(0));
        assert_eq!(rec.next_check_at, now() + Duration::minutes(2));
    }

    #[test]
    fn same_draft_builds_same_identity() {
        let a = build(draft(false), now(), &SchedulerPolicy::default());
        let b = build(draft(false), now() + Duration::days(1), &SchedulerPolicy::default());
        assert_eq!(a.match_id, b.match_id);
    }
}
