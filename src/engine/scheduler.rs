use chrono::{DateTime, Utc};

use crate::config::{SchedulerPolicy, TIME_TBD};
use crate::types::MatchStatus;

use super::kickoff_datetime;

/// Computes the next re-check deadline for a match in the given (possibly
/// just-transitioned) status. Also used in "initial" mode at ingest, where
/// it runs over the freshly parsed fields before any evaluation.
///
/// live         → now + live_recheck (tight polling while in play)
/// upcoming/TBD → now + tbd_recheck
/// upcoming, kickoff ahead → kickoff − pre_kickoff (arrive just before the
///                           live window opens)
/// upcoming, kickoff past  → now + missed_kickoff_recheck (fast recovery)
/// unparsable date/time    → now + tbd_recheck (safe fallback)
/// completed    → now + completed_park (keeps history without re-selection)
pub fn next_check_at(
    status: MatchStatus,
    date: &str,
    kickoff_time: &str,
    now: DateTime<Utc>,
    policy: &SchedulerPolicy,
) -> DateTime<Utc> {
    match status {
        MatchStatus::Live => now + policy.live_recheck,
        MatchStatus::Completed => now + policy.completed_park,
        MatchStatus::Upcoming => {
            if kickoff_time == TIME_TBD {
                return now + policy.tbd_recheck;
            }
            match kickoff_datetime(date, kickoff_time, now) {
                Some(kickoff) if kickoff > now => kickoff - policy.pre_kickoff,
                Some(_) => now + policy.missed_kickoff_recheck,
                None => now + policy.tbd_recheck,
            }
        }
    }
}
