use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::types::{MatchRecord, MatchStatus, MatchUpdate, StatsSample};

use super::models::{to_ts, MatchRow};

/// Persistence handle for the two collections: `matches` (one row per
/// tracked fixture, unique on match_id) and `match_stats` (append-only
/// in-play samples). Wholesale replacement and the per-tick batch update
/// each run inside a single transaction, so readers only ever observe a
/// fully-old or fully-new dataset and a tick either applies completely or
/// not at all.
#[derive(Clone)]
pub struct MatchStore {
    pool: SqlitePool,
}

impl MatchStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                match_id        TEXT PRIMARY KEY,
                home_team       TEXT NOT NULL,
                away_team       TEXT NOT NULL,
                league          TEXT NOT NULL,
                date            TEXT NOT NULL,
                kickoff_time    TEXT NOT NULL,
                home_odds       REAL NOT NULL,
                draw_odds       REAL NOT NULL,
                away_odds       REAL NOT NULL,
                status          TEXT NOT NULL,
                is_live         INTEGER NOT NULL,
                home_score      INTEGER,
                away_score      INTEGER,
                next_check_at   INTEGER NOT NULL,
                last_checked_at INTEGER,
                completed_at    INTEGER,
                scraped_at      INTEGER NOT NULL,
                check_count     INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_matches_next_check ON matches (next_check_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_status ON matches (status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS match_stats (
                match_id        TEXT NOT NULL,
                sampled_at      INTEGER NOT NULL,
                home_score      INTEGER NOT NULL,
                away_score      INTEGER NOT NULL,
                possession_home REAL,
                possession_away REAL,
                shots_home      INTEGER,
                shots_away      INTEGER,
                corners_home    INTEGER,
                corners_away    INTEGER,
                PRIMARY KEY (match_id, sampled_at)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Wholesale dataset replacement: clear + insert in one transaction.
    /// Samples are untouched — retention there is an external concern.
    pub async fn replace_all(&self, records: &[MatchRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM matches").execute(&mut *tx).await?;

        for rec in records {
            sqlx::query(
                r#"
                INSERT INTO matches (
                    match_id, home_team, away_team, league, date, kickoff_time,
                    home_odds, draw_odds, away_odds,
                    status, is_live, home_score, away_score,
                    next_check_at, last_checked_at, completed_at, scraped_at, check_count
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&rec.match_id)
            .bind(&rec.home_team)
            .bind(&rec.away_team)
            .bind(&rec.league)
            .bind(&rec.date)
            .bind(&rec.kickoff_time)
            .bind(rec.odds.home)
            .bind(rec.odds.draw)
            .bind(rec.odds.away)
            .bind(rec.status.to_string())
            .bind(i64::from(rec.is_live))
            .bind(rec.home_score)
            .bind(rec.away_score)
            .bind(to_ts(rec.next_check_at))
            .bind(rec.last_checked_at.map(to_ts))
            .bind(rec.completed_at.map(to_ts))
            .bind(to_ts(rec.scraped_at))
            .bind(rec.check_count)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(records.len())
    }

    /// Tick selection: every record whose deadline has elapsed, plus every
    /// live record regardless of deadline.
    pub async fn due_or_live(&self, now: DateTime<Utc>) -> Result<Vec<MatchRecord>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE next_check_at <= ? OR status = 'live' ORDER BY next_check_at",
        )
        .bind(to_ts(now))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRow::into_record).collect())
    }

    pub async fn live_matches(&self) -> Result<Vec<MatchRecord>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM matches WHERE status = 'live' ORDER BY match_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRow::into_record).collect())
    }

    pub async fn matches_by_status(
        &self,
        status: Option<MatchStatus>,
        limit: i64,
    ) -> Result<Vec<MatchRecord>> {
        let rows = match status {
            Some(s) => {
                sqlx::query_as::<_, MatchRow>(
                    "SELECT * FROM matches WHERE status = ? ORDER BY next_check_at LIMIT ?",
                )
                .bind(s.to_string())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MatchRow>(
                    "SELECT * FROM matches ORDER BY next_check_at LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(MatchRow::into_record).collect())
    }

    /// Applies a tick's updates as one atomic batch. Any statement failing,
    /// or targeting a match_id not in the store, rolls the whole batch back.
    pub async fn apply_batch(&self, updates: &[MatchUpdate]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for upd in updates {
            let result = sqlx::query(
                r#"
                UPDATE matches SET
                    status = ?, is_live = ?, home_score = ?, away_score = ?,
                    next_check_at = ?, last_checked_at = ?, completed_at = ?,
                    check_count = ?
                WHERE match_id = ?
                "#,
            )
            .bind(upd.status.to_string())
            .bind(i64::from(upd.is_live))
            .bind(upd.home_score)
            .bind(upd.away_score)
            .bind(to_ts(upd.next_check_at))
            .bind(to_ts(upd.last_checked_at))
            .bind(upd.completed_at.map(to_ts))
            .bind(upd.check_count)
            .bind(&upd.match_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back everything applied so far.
                return Err(AppError::Batch(format!(
                    "match {} vanished mid-batch",
                    upd.match_id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Append-only sample insert. A duplicate (match_id, sampled_at) key is
    /// skipped, never overwritten. Returns the number of rows actually
    /// inserted, which can be lower than `samples.len()` on duplicates.
    pub async fn append_samples(&self, samples: &[StatsSample]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted: u64 = 0;

        for s in samples {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO match_stats (
                    match_id, sampled_at, home_score, away_score,
                    possession_home, possession_away,
                    shots_home, shots_away, corners_home, corners_away
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&s.match_id)
            .bind(to_ts(s.sampled_at))
            .bind(s.home_score)
            .bind(s.away_score)
            .bind(s.possession_home)
            .bind(s.possession_away)
            .bind(s.shots_home)
            .bind(s.shots_away)
            .bind(s.corners_home)
            .bind(s.corners_away)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted as usize)
    }

    pub async fn count_by_status(&self, status: MatchStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn match_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn sample_count(&self, match_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM match_stats WHERE match_id = ?")
                .bind(match_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
