use chrono::{DateTime, Utc};

use crate::config::SchedulerPolicy;
use crate::types::{MatchRecord, MatchStatus};

use super::kickoff_datetime;

/// Outcome of one state evaluation. Transitions are monotonic:
/// upcoming may become live, live may become completed, completed is
/// terminal. Nothing ever moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    ToLive,
    ToCompleted,
}

/// Pure decision: given the record's current state and the current time,
/// does a transition fire?
///
/// upcoming → live fires when the kickoff time is resolved and now falls in
/// the half-open window [kickoff − pre_kickoff, kickoff + live_window_after).
/// live → completed fires when the match has not been re-evaluated for
/// longer than `stale_live_after` — a proxy for full time, since the source
/// emits no authoritative "finished" signal.
pub fn evaluate(record: &MatchRecord, now: DateTime<Utc>, policy: &SchedulerPolicy) -> Transition {
    match record.status {
        MatchStatus::Upcoming => {
            let Some(kickoff) = kickoff_datetime(&record.date, &record.kickoff_time, now) else {
                return Transition::None;
            };
            let window_open = kickoff - policy.pre_kickoff;
            let window_close = kickoff + policy.live_window_after;
            if now >= window_open && now < window_close {
                Transition::ToLive
            } else {
                Transition::None
            }
        }
        MatchStatus::Live => match record.last_checked_at {
            Some(last) if now - last > policy.stale_live_after => Transition::ToCompleted,
            _ => Transition::None,
        },
        MatchStatus::Completed => Transition::None,
    }
}
