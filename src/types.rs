use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a tracked fixture. Transitions are monotonic:
/// upcoming → live → completed, never backwards. The derived `Ord` follows
/// that order so monotonicity can be asserted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Live,
    Completed,
}

impl MatchStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(MatchStatus::Upcoming),
            "live" => Some(MatchStatus::Live),
            "completed" => Some(MatchStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::Upcoming => "upcoming",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

/// Most recent observed 1X2 odds triple. `0.0` means "not observed",
/// never a real price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Odds {
    pub const UNOBSERVED: Odds = Odds { home: 0.0, draw: 0.0, away: 0.0 };

    /// Maps an ordered list of in-range odds values onto the (home, draw,
    /// away) triple. The source lays odds out home-draw-away, so with only
    /// two values the middle (draw) is the one missing.
    pub fn from_values(values: &[f64]) -> Odds {
        match values {
            [h, d, a, ..] => Odds { home: *h, draw: *d, away: *a },
            [h, a] => Odds { home: *h, draw: 0.0, away: *a },
            [h] => Odds { home: *h, draw: 0.0, away: 0.0 },
            [] => Odds::UNOBSERVED,
        }
    }
}

// ---------------------------------------------------------------------------
// DraftMatch — parser output, not yet persistable
// ---------------------------------------------------------------------------

/// Unvalidated draft produced by the text-block parser. Becomes a
/// `MatchRecord` once an identity and scheduling fields are attached.
#[derive(Debug, Clone)]
pub struct DraftMatch {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    /// Calendar date as "D/M" (source format, zero-padded).
    pub date: String,
    /// Local kickoff time as "H:MM", or the "TBD" sentinel.
    pub kickoff_time: String,
    pub odds: Odds,
    pub is_live: bool,
}

// ---------------------------------------------------------------------------
// MatchRecord — the persisted unit of state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    /// Stable identity derived from (home, away, date); immutable.
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: String,
    pub kickoff_time: String,
    pub odds: Odds,
    pub status: MatchStatus,
    /// Redundant cache of `status == live`, kept in sync by every transition.
    pub is_live: bool,
    /// Absent while upcoming; present (possibly 0-0) once live.
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    /// Re-check deadline: the record is due once now >= this.
    pub next_check_at: DateTime<Utc>,
    /// Most recent state evaluation, or None if never evaluated.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Set exactly once, at the live → completed transition.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the ingest pass that produced this record ran.
    pub scraped_at: DateTime<Utc>,
    /// Number of state evaluations this record has been through.
    pub check_count: i64,
}

// ---------------------------------------------------------------------------
// MatchUpdate — one record's share of a tick's atomic batch write
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MatchUpdate {
    pub match_id: String,
    pub status: MatchStatus,
    pub is_live: bool,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub next_check_at: DateTime<Utc>,
    pub last_checked_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub check_count: i64,
}

// ---------------------------------------------------------------------------
// StatsSample — append-only in-play observations
// ---------------------------------------------------------------------------

/// One observation of a live match's in-play metrics, keyed by
/// (match_id, sampled_at). Appended, never updated or deleted here.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSample {
    pub match_id: String,
    pub sampled_at: DateTime<Utc>,
    pub home_score: i64,
    pub away_score: i64,
    pub possession_home: Option<f64>,
    pub possession_away: Option<f64>,
    pub shots_home: Option<i64>,
    pub shots_away: Option<i64>,
    pub corners_home: Option<i64>,
    pub corners_away: Option<i64>,
}

/// In-play metrics as supplied by the scrape collaborator. Every field is
/// optional — the sampler never fabricates values it was not given.
#[derive(Debug, Clone, Default)]
pub struct LiveMetrics {
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub possession_home: Option<f64>,
    pub possession_away: Option<f64>,
    pub shots_home: Option<i64>,
    pub shots_away: Option<i64>,
    pub corners_home: Option<i64>,
    pub corners_away: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_order_is_lifecycle_order() {
        assert!(MatchStatus::Upcoming < MatchStatus::Live);
        assert!(MatchStatus::Live < MatchStatus::Completed);
    }

    #[test]
    fn status_display_round_trips() {
        for s in [MatchStatus::Upcoming, MatchStatus::Live, MatchStatus::Completed] {
            assert_eq!(MatchStatus::parse(&s.to_string()), Some(s));
        }
        assert_eq!(MatchStatus::parse("cancelled"), None);
    }

    #[test]
    fn odds_from_three_values() {
        let odds = Odds::from_values(&[2.10, 3.40, 3.00]);
        assert_eq!(odds, Odds { home: 2.10, draw: 3.40, away: 3.00 });
    }

    #[test]
    fn odds_from_two_values_skips_draw() {
        let odds = Odds::from_values(&[2.10, 3.00]);
        assert_eq!(odds, Odds { home: 2.10, draw: 0.0, away: 3.00 });
    }

    #[test]
    fn odds_from_one_value() {
        let odds = Odds::from_values(&[2.10]);
        assert_eq!(odds, Odds { home: 2.10, draw: 0.0, away: 0.0 });
    }

    #[test]
    fn odds_from_nothing_is_unobserved() {
        assert_eq!(Odds::from_values(&[]), Odds::UNOBSERVED);
    }
}
