use std::str::FromStr;

use chrono::Duration;

use crate::error::{AppError, Result};

/// Minimum number of non-empty lines a text block needs to carry enough
/// signal to be worth parsing. Shorter blocks are rejected outright.
pub const MIN_BLOCK_LINES: usize = 4;

/// Team name lines shorter than this are treated as layout noise, not candidates.
pub const MIN_TEAM_LINE_LEN: usize = 3;

/// Extracted team names are truncated to this many characters.
pub const TEAM_NAME_MAX: usize = 50;

/// Extracted league names are truncated to this many characters.
pub const LEAGUE_NAME_MAX: usize = 100;

/// Decimal odds outside this range are discarded as noise, not errors.
pub const ODDS_MIN: f64 = 1.0;
pub const ODDS_MAX: f64 = 100.0;

/// A line containing any of these (case-insensitive) is a league line,
/// never a team candidate.
pub const LEAGUE_KEYWORDS: &[&str] = &["league", "cup", "premier", "champions", "uefa"];

/// Sentinel kickoff time for fixtures whose start time could not be extracted.
pub const TIME_TBD: &str = "TBD";

/// Placeholder for an away team the parser could not resolve.
pub const UNKNOWN_TEAM: &str = "Unknown Team";

/// Placeholder league when no line carries a league keyword.
pub const UNKNOWN_LEAGUE: &str = "Unknown League";

// ---------------------------------------------------------------------------
// Scheduling policy defaults (minutes). These are policy, not derived truth —
// there is no authoritative end-of-match signal — so every one of them is
// overridable from the environment.
// ---------------------------------------------------------------------------

/// Re-check this long before kickoff; also the lower edge of the live window.
pub const PRE_KICKOFF_MINS: i64 = 5;

/// Upper edge of the live-transition window after kickoff.
pub const LIVE_WINDOW_AFTER_MINS: i64 = 120;

/// A live match not re-evaluated for this long is presumed finished.
pub const STALE_LIVE_MINS: i64 = 180;

/// Re-check interval while a match is in play.
pub const LIVE_RECHECK_MINS: i64 = 2;

/// Re-check interval when the kickoff time is still unknown ("TBD"),
/// and the fallback for unparsable date/time fields.
pub const TBD_RECHECK_MINS: i64 = 30;

/// Fast re-poll when kickoff has passed but the live window was missed.
pub const MISSED_KICKOFF_RECHECK_MINS: i64 = 5;

/// Completed matches are parked this far out so they never re-select.
pub const COMPLETED_PARK_MINS: i64 = 1440;

/// Polling engine tick interval (seconds).
pub const TICK_INTERVAL_SECS: u64 = 60;

/// UTC hour of day at which the wholesale re-ingest runs.
pub const INGEST_HOUR_UTC: u32 = 4;

/// HTTP timeout for fetching raw text blocks from the source (seconds).
pub const SOURCE_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// SchedulerPolicy
// ---------------------------------------------------------------------------

/// Named timing parameters shared by the state machine and the re-check
/// scheduler. Constructed once at startup and passed by reference into the
/// pure decision functions.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerPolicy {
    pub pre_kickoff: Duration,
    pub live_window_after: Duration,
    pub stale_live_after: Duration,
    pub live_recheck: Duration,
    pub tbd_recheck: Duration,
    pub missed_kickoff_recheck: Duration,
    pub completed_park: Duration,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            pre_kickoff: Duration::minutes(PRE_KICKOFF_MINS),
            live_window_after: Duration::minutes(LIVE_WINDOW_AFTER_MINS),
            stale_live_after: Duration::minutes(STALE_LIVE_MINS),
            live_recheck: Duration::minutes(LIVE_RECHECK_MINS),
            tbd_recheck: Duration::minutes(TBD_RECHECK_MINS),
            missed_kickoff_recheck: Duration::minutes(MISSED_KICKOFF_RECHECK_MINS),
            completed_park: Duration::minutes(COMPLETED_PARK_MINS),
        }
    }
}

impl SchedulerPolicy {
    fn from_env() -> Self {
        Self {
            pre_kickoff: Duration::minutes(env_or("PRE_KICKOFF_MINS", PRE_KICKOFF_MINS)),
            live_window_after: Duration::minutes(env_or(
                "LIVE_WINDOW_AFTER_MINS",
                LIVE_WINDOW_AFTER_MINS,
            )),
            stale_live_after: Duration::minutes(env_or("STALE_LIVE_MINS", STALE_LIVE_MINS)),
            live_recheck: Duration::minutes(env_or("LIVE_RECHECK_MINS", LIVE_RECHECK_MINS)),
            tbd_recheck: Duration::minutes(env_or("TBD_RECHECK_MINS", TBD_RECHECK_MINS)),
            missed_kickoff_recheck: Duration::minutes(env_or(
                "MISSED_KICKOFF_RECHECK_MINS",
                MISSED_KICKOFF_RECHECK_MINS,
            )),
            completed_park: Duration::minutes(env_or("COMPLETED_PARK_MINS", COMPLETED_PARK_MINS)),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// URL the text-block source fetches raw fixture text from (SOURCE_URL).
    pub source_url: String,
    /// Optional per-match stats endpoint (METRICS_URL). Unset means live
    /// samples carry the cached score only.
    pub metrics_url: Option<String>,
    pub source_timeout_secs: u64,
    pub tick_interval_secs: u64,
    pub ingest_hour_utc: u32,
    pub policy: SchedulerPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let source_url = std::env::var("SOURCE_URL")
            .map_err(|_| AppError::Config("SOURCE_URL must be set".to_string()))?;

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "tracker.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            source_url,
            metrics_url: std::env::var("METRICS_URL").ok(),
            source_timeout_secs: env_or("SOURCE_TIMEOUT_SECS", SOURCE_TIMEOUT_SECS),
            tick_interval_secs: env_or("TICK_INTERVAL_SECS", TICK_INTERVAL_SECS),
            ingest_hour_utc: env_or("INGEST_HOUR_UTC", INGEST_HOUR_UTC),
            policy: SchedulerPolicy::from_env(),
        })
    }
}

/// Env var parsed as T, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
