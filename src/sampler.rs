use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::db::MatchStore;
use crate::error::{AppError, Result};
use crate::types::{LiveMetrics, MatchRecord, StatsSample};

/// Supplies in-play metrics for a live match. The scrape collaborator sits
/// behind this seam; when it has nothing, the sampler records the last
/// known score with placeholder metrics rather than inventing play.
pub trait MetricsSource: Send + Sync {
    fn fetch(
        &self,
        match_id: &str,
    ) -> impl std::future::Future<Output = Option<LiveMetrics>> + Send;
}

/// Metrics source that never has anything — every sample falls back to the
/// record's last known score.
pub struct NoMetrics;

impl MetricsSource for NoMetrics {
    async fn fetch(&self, _match_id: &str) -> Option<LiveMetrics> {
        None
    }
}

/// Fetches per-match in-play stats as JSON from `{base_url}/{match_id}`.
/// Any failure — transport, bad status, malformed body — downgrades to
/// "no metrics", so one flaky endpoint never stalls the sampling pass.
pub struct HttpMetricsSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMetricsSource {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { base_url, client })
    }

    async fn fetch_metrics(&self, match_id: &str) -> Result<LiveMetrics> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), match_id);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Source(format!(
                "stats endpoint returned {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;
        let v: serde_json::Value = serde_json::from_str(&body)?;
        Ok(parse_metrics(&v))
    }
}

impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self, match_id: &str) -> Option<LiveMetrics> {
        match self.fetch_metrics(match_id).await {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(match_id, "stats fetch failed, sampling cached score: {e}");
                None
            }
        }
    }
}

/// Pulls the known stat fields out of a JSON payload. Anything missing or
/// mistyped stays `None`, and the sampler falls back per field.
pub fn parse_metrics(v: &serde_json::Value) -> LiveMetrics {
    LiveMetrics {
        home_score: v.get("home_score").and_then(|x| x.as_i64()),
        away_score: v.get("away_score").and_then(|x| x.as_i64()),
        possession_home: v.get("possession_home").and_then(|x| x.as_f64()),
        possession_away: v.get("possession_away").and_then(|x| x.as_f64()),
        shots_home: v.get("shots_home").and_then(|x| x.as_i64()),
        shots_away: v.get("shots_away").and_then(|x| x.as_i64()),
        corners_home: v.get("corners_home").and_then(|x| x.as_i64()),
        corners_away: v.get("corners_away").and_then(|x| x.as_i64()),
    }
}

/// Builds one sample per live match, pure over its inputs so the fallback
/// behavior is testable without a store.
pub fn build_sample(record: &MatchRecord, metrics: Option<LiveMetrics>, now: DateTime<Utc>) -> StatsSample {
    let m = metrics.unwrap_or_default();
    StatsSample {
        match_id: record.match_id.clone(),
        sampled_at: now,
        home_score: m.home_score.or(record.home_score).unwrap_or(0),
        away_score: m.away_score.or(record.away_score).unwrap_or(0),
        possession_home: m.possession_home,
        possession_away: m.possession_away,
        shots_home: m.shots_home,
        shots_away: m.shots_away,
        corners_home: m.corners_home,
        corners_away: m.corners_away,
    }
}

/// Appends one timestamped sample for every currently live match. Runs
/// after the tick's batch commit, over the post-update live set.
pub async fn sample_live<M: MetricsSource>(
    metrics: &M,
    store: &MatchStore,
    live: &[MatchRecord],
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut samples = Vec::with_capacity(live.len());
    for record in live {
        let fetched = metrics.fetch(&record.match_id).await;
        samples.push(build_sample(record, fetched, now));
    }

    let appended = store.append_samples(&samples).await?;
    debug!(appended, "stats samples appended");
    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchStatus, Odds};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 31, 15, 0, 0).unwrap()
    }

    fn live_record() -> MatchRecord {
        MatchRecord {
            match_id: "abc123def456".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            date: "31/08".to_string(),
            kickoff_time: "14:00".to_string(),
            odds: Odds::UNOBSERVED,
            status: MatchStatus::Live,
            is_live: true,
            home_score: Some(2),
            away_score: Some(1),
            next_check_at: now(),
            last_checked_at: Some(now()),
            completed_at: None,
            scraped_at: now(),
            check_count: 5,
        }
    }

    #[test]
    fn no_metrics_falls_back_to_last_known_score() {
        let sample = build_sample(&live_record(), None, now());
        assert_eq!(sample.home_score, 2);
        assert_eq!(sample.away_score, 1);
        assert_eq!(sample.possession_home, None);
        assert_eq!(sample.shots_home, None);
    }

    #[test]
    fn metrics_override_the_cached_score() {
        let metrics = LiveMetrics {
            home_score: Some(3),
            away_score: Some(1),
            possession_home: Some(61.0),
            possession_away: Some(39.0),
            ..LiveMetrics::default()
        };
        let sample = build_sample(&live_record(), Some(metrics), now());
        assert_eq!(sample.home_score, 3);
        assert_eq!(sample.possession_home, Some(61.0));
        assert_eq!(sample.corners_home, None);
    }

    #[test]
    fn sample_is_keyed_by_match_and_timestamp() {
        let sample = build_sample(&live_record(), None, now());
        assert_eq!(sample.match_id, "abc123def456");
        assert_eq!(sample.sampled_at, now());
    }

    #[test]
    fn parse_metrics_reads_known_fields() {
        let v: serde_json::Value = serde_json::from_str(
            r#"{
                "home_score": 2, "away_score": 0,
                "possession_home": 58.5, "possession_away": 41.5,
                "shots_home": 9, "corners_away": 3
            }"#,
        )
        .unwrap();

        let m = parse_metrics(&v);
        assert_eq!(m.home_score, Some(2));
        assert_eq!(m.possession_home, Some(58.5));
        assert_eq!(m.shots_home, Some(9));
        assert_eq!(m.shots_away, None, "absent field stays unset");
        assert_eq!(m.corners_away, Some(3));
    }

    #[test]
    fn parse_metrics_ignores_mistyped_fields() {
        let v: serde_json::Value =
            serde_json::from_str(r#"{"home_score": "two", "possession_home": true}"#).unwrap();
        let m = parse_metrics(&v);
        assert_eq!(m.home_score, None);
        assert_eq!(m.possession_home, None);
    }

    #[test]
    fn malformed_payload_surfaces_as_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Json(_)));
    }
}
