//! Read-only status surface. These endpoints observe committed state and
//! never touch scheduling internals.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::MatchStore;
use crate::error::AppError;
use crate::types::{MatchRecord, MatchStatus};

/// Upper bound on the `limit` query param.
const MAX_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct ApiState {
    pub store: MatchStore,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/matches", get(get_matches))
        .route("/matches/live", get(get_live_matches))
        .route("/stats/summary", get(get_summary))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct MatchesQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: String,
    pub kickoff_time: String,
    pub status: String,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub next_check_at: i64,
    pub check_count: i64,
}

impl From<MatchRecord> for MatchResponse {
    fn from(r: MatchRecord) -> Self {
        Self {
            match_id: r.match_id,
            home_team: r.home_team,
            away_team: r.away_team,
            league: r.league,
            date: r.date,
            kickoff_time: r.kickoff_time,
            status: r.status.to_string(),
            home_score: r.home_score,
            away_score: r.away_score,
            next_check_at: r.next_check_at.timestamp(),
            check_count: r.check_count,
        }
    }
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub total_matches: i64,
    pub upcoming: i64,
    pub live: i64,
    pub completed: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_matches(
    State(state): State<ApiState>,
    Query(params): Query<MatchesQuery>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    let status = params.status.as_deref().and_then(MatchStatus::parse);
    // Clamped before it reaches SQLite, where a negative LIMIT means unlimited.
    let limit = params.limit.unwrap_or(100).clamp(0, MAX_LIMIT);

    let matches = state.store.matches_by_status(status, limit).await?;
    Ok(Json(matches.into_iter().map(MatchResponse::from).collect()))
}

async fn get_live_matches(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    let live = state.store.live_matches().await?;
    Ok(Json(live.into_iter().map(MatchResponse::from).collect()))
}

async fn get_summary(State(state): State<ApiState>) -> Result<Json<SummaryResponse>, AppError> {
    Ok(Json(SummaryResponse {
        total_matches: state.store.match_count().await?,
        upcoming: state.store.count_by_status(MatchStatus::Upcoming).await?,
        live: state.store.count_by_status(MatchStatus::Live).await?,
        completed: state.store.count_by_status(MatchStatus::Completed).await?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchRecord, MatchStatus, Odds};
    use chrono::{TimeZone, Utc};

    async fn seeded_state() -> ApiState {
        // One connection: every pooled connection to :memory: would
        // otherwise get its own private database.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = MatchStore::new(pool);
        store.init_schema().await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 8, 31, 14, 0, 0).unwrap();
        let records: Vec<MatchRecord> = (0..3)
            .map(|i| MatchRecord {
                match_id: format!("m{i:011}"),
                home_team: "Arsenal".to_string(),
                away_team: "Chelsea".to_string(),
                league: "Premier League".to_string(),
                date: "31/08".to_string(),
                kickoff_time: "17:00".to_string(),
                odds: Odds::UNOBSERVED,
                status: MatchStatus::Upcoming,
                is_live: false,
                home_score: None,
                away_score: None,
                next_check_at: now,
                last_checked_at: None,
                completed_at: None,
                scraped_at: now,
                check_count: 0,
            })
            .collect();
        store.replace_all(&records).await.unwrap();

        ApiState { store }
    }

    #[tokio::test]
    async fn negative_limit_is_clamped_to_zero() {
        let state = seeded_state().await;

        let Json(matches) = get_matches(
            State(state),
            Query(MatchesQuery { status: None, limit: Some(-1) }),
        )
        .await
        .unwrap();

        assert!(matches.is_empty(), "negative limit must not mean unlimited");
    }

    #[tokio::test]
    async fn default_limit_returns_the_dataset() {
        let state = seeded_state().await;

        let Json(matches) = get_matches(
            State(state),
            Query(MatchesQuery { status: None, limit: None }),
        )
        .await
        .unwrap();

        assert_eq!(matches.len(), 3);
    }
}
