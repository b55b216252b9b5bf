//! Row types for the `matches` and `match_stats` tables and their mapping
//! to the in-memory record types. Timestamps are stored as Unix seconds.

use chrono::{DateTime, Utc};

use crate::types::{MatchRecord, MatchStatus, Odds};

pub fn to_ts(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

pub fn from_ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[derive(Debug, sqlx::FromRow)]
pub struct MatchRow {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: String,
    pub kickoff_time: String,
    pub home_odds: f64,
    pub draw_odds: f64,
    pub away_odds: f64,
    pub status: String,
    pub is_live: i64,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub next_check_at: i64,
    pub last_checked_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub scraped_at: i64,
    pub check_count: i64,
}

impl MatchRow {
    pub fn into_record(self) -> MatchRecord {
        // This crate is the only writer of the status column.
        let status = MatchStatus::parse(&self.status).unwrap_or(MatchStatus::Upcoming);
        MatchRecord {
            match_id: self.match_id,
            home_team: self.home_team,
            away_team: self.away_team,
            league: self.league,
            date: self.date,
            kickoff_time: self.kickoff_time,
            odds: Odds {
                home: self.home_odds,
                draw: self.draw_odds,
                away: self.away_odds,
            },
            status,
            is_live: self.is_live != 0,
            home_score: self.home_score,
            away_score: self.away_score,
            next_check_at: from_ts(self.next_check_at),
            last_checked_at: self.last_checked_at.map(from_ts),
            completed_at: self.completed_at.map(from_ts),
            scraped_at: from_ts(self.scraped_at),
            check_count: self.check_count,
        }
    }
}
