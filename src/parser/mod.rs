//! Best-effort normalization of one raw text block into a draft match
//! record. The source gives no format guarantee beyond "line-oriented,
//! human-readable", so everything here is heuristic over classified lines
//! and a rejected block only ever skips that block, never the batch.

pub mod classifier;

use chrono::{DateTime, Utc};

use crate::config::{MIN_BLOCK_LINES, TIME_TBD, UNKNOWN_LEAGUE, UNKNOWN_TEAM};
use crate::types::{DraftMatch, Odds};

use classifier::{classify_line, has_league_keyword, LineClass};

/// Why a block was rejected. Rejections are logged and skipped — they are
/// expected steady-state behavior, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseReject {
    /// Fewer than `MIN_BLOCK_LINES` non-empty lines: insufficient signal.
    TooFewLines(usize),
    /// No line survived the candidate filters, so the home team is unresolved.
    NoTeamCandidates,
}

impl std::fmt::Display for ParseReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseReject::TooFewLines(n) => write!(f, "too few lines ({n})"),
            ParseReject::NoTeamCandidates => write!(f, "no team candidates"),
        }
    }
}

/// Parse one text block into a draft record. `now` supplies the default
/// calendar date when the block carries none.
pub fn parse_block(block: &str, now: DateTime<Utc>) -> Result<DraftMatch, ParseReject> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < MIN_BLOCK_LINES {
        return Err(ParseReject::TooFewLines(lines.len()));
    }

    let classes: Vec<LineClass> = lines.iter().map(|l| classify_line(l)).collect();

    let (home_team, away_team) = extract_teams(&classes)?;
    let league = extract_league(&lines);
    let (date, kickoff_time) = extract_datetime(&classes, now);
    let odds = extract_odds(&classes);

    // The source tags in-play fixtures with a LIVE badge somewhere in the
    // block; a plain substring check matches it wherever it lands.
    let is_live = block.to_uppercase().contains("LIVE");

    Ok(DraftMatch {
        home_team,
        away_team,
        league,
        date,
        kickoff_time,
        odds,
        is_live,
    })
}

/// First candidate line is the home team, second the away team. With only
/// one candidate the away side gets an explicit placeholder; with none the
/// block is unusable.
fn extract_teams(classes: &[LineClass]) -> Result<(String, String), ParseReject> {
    let mut candidates = classes.iter().filter_map(|c| match c {
        LineClass::Candidate(name) => Some(name.clone()),
        _ => None,
    });

    let home = candidates.next().ok_or(ParseReject::NoTeamCandidates)?;
    let away = candidates.next().unwrap_or_else(|| UNKNOWN_TEAM.to_string());
    Ok((home, away))
}

/// First line containing a league keyword, truncated; else a placeholder.
fn extract_league(lines: &[&str]) -> String {
    lines
        .iter()
        .find(|l| has_league_keyword(l))
        .map(|l| l.chars().take(crate::config::LEAGUE_NAME_MAX).collect())
        .unwrap_or_else(|| UNKNOWN_LEAGUE.to_string())
}

/// A combined "D/M, H:MM" hit wins outright. Failing that, standalone
/// "H:MM" lines set the time only (last one seen wins, since the scan keeps
/// looking for a combined hit). Date defaults to today, time to "TBD".
fn extract_datetime(classes: &[LineClass], now: DateTime<Utc>) -> (String, String) {
    let mut date = now.format("%d/%m").to_string();
    let mut time = TIME_TBD.to_string();

    for class in classes {
        match class {
            LineClass::DateTime { date: d, time: t } => {
                date = d.clone();
                time = t.clone();
                break;
            }
            LineClass::TimeOnly(t) => {
                time = t.clone();
            }
            _ => {}
        }
    }

    (date, time)
}

/// In-range odds values in line order, mapped onto (home, draw, away).
fn extract_odds(classes: &[LineClass]) -> Odds {
    let values: Vec<f64> = classes
        .iter()
        .filter_map(|c| match c {
            LineClass::Odds(v) => Some(*v),
            _ => None,
        })
        .collect();
    Odds::from_values(&values)
}
