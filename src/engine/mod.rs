//! The decision core: status state machine, re-check scheduler, and the
//! polling loop that drives both against the persisted match set.

pub mod poller;
pub mod scheduler;
pub mod state_machine;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::config::TIME_TBD;

/// Resolves the "D/M" + "H:MM" field pair into a concrete UTC datetime in
/// the current year. Returns None for the "TBD" sentinel or any field the
/// heuristics mangled — callers fall back to the safe re-check interval.
pub fn kickoff_datetime(date: &str, time: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if time == TIME_TBD {
        return None;
    }

    let (day, month) = date.split_once('/')?;
    let (hour, minute) = time.split_once(':')?;

    let date = NaiveDate::from_ymd_opt(
        now.year(),
        month.trim().parse().ok()?,
        day.trim().parse().ok()?,
    )?;
    let time = NaiveTime::from_hms_opt(hour.trim().parse().ok()?, minute.trim().parse().ok()?, 0)?;

    Some(DateTime::from_naive_utc_and_offset(date.and_time(time), Utc))
}
