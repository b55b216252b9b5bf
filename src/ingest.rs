use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::builder;
use crate::config::SchedulerPolicy;
use crate::db::MatchStore;
use crate::error::Result;
use crate::parser::{self, ParseReject};
use crate::source::BlockSource;
use crate::types::MatchRecord;

#[derive(Debug, Default)]
pub struct IngestStats {
    pub blocks_total: usize,
    pub rejected_too_short: usize,
    pub rejected_no_teams: usize,
    pub duplicates: usize,
    pub ingested: usize,
    pub live: usize,
    pub upcoming: usize,
}

/// One full ingest cycle: fetch raw blocks, parse each into a record, and
/// replace the entire match dataset in one atomic step. Per-block rejects
/// are logged and skipped; only a source failure aborts the cycle, leaving
/// the previous dataset in place.
pub async fn run_ingest<S: BlockSource>(
    source: &S,
    store: &MatchStore,
    policy: &SchedulerPolicy,
) -> Result<IngestStats> {
    let blocks = source.fetch_blocks().await?;
    let now = Utc::now();

    let mut stats = IngestStats { blocks_total: blocks.len(), ..Default::default() };
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut records: Vec<MatchRecord> = Vec::with_capacity(blocks.len());

    for (index, block) in blocks.iter().enumerate() {
        let draft = match parser::parse_block(block, now) {
            Ok(draft) => draft,
            Err(reject) => {
                match reject {
                    ParseReject::TooFewLines(_) => stats.rejected_too_short += 1,
                    ParseReject::NoTeamCandidates => stats.rejected_no_teams += 1,
                }
                debug!(block = index, "block rejected: {reject}");
                continue;
            }
        };

        let record = builder::build(draft, now, policy);

        // Repeated observations of the same fixture collapse onto one
        // identity; the first occurrence wins within a cycle.
        if !seen_ids.insert(record.match_id.clone()) {
            stats.duplicates += 1;
            continue;
        }

        if record.is_live {
            stats.live += 1;
        } else {
            stats.upcoming += 1;
        }
        records.push(record);
    }

    stats.ingested = store.replace_all(&records).await?;

    info!(
        total = stats.blocks_total,
        ingested = stats.ingested,
        live = stats.live,
        upcoming = stats.upcoming,
        rejected = stats.rejected_too_short + stats.rejected_no_teams,
        duplicates = stats.duplicates,
        "Ingest complete: dataset replaced",
    );
    for record in records.iter().take(3) {
        info!(
            "  {} vs {} | {} {} | {}",
            record.home_team, record.away_team, record.date, record.kickoff_time, record.league,
        );
    }

    Ok(stats)
}
