use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{
    LEAGUE_KEYWORDS, MIN_TEAM_LINE_LEN, ODDS_MAX, ODDS_MIN, TEAM_NAME_MAX,
};

/// Decimal odds line: digits, a dot, 1-2 fractional digits, nothing else.
static ODDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d{1,2}$").unwrap());

/// Compact combined date-time: "D/M, H:MM" anywhere in the line.
static DATE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}/\d{1,2})\s*,\s*(\d{1,2}:\d{2})").unwrap());

/// Standalone time-of-day line: "H:MM", nothing else.
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());

/// Tagged classification of one trimmed, non-empty line of a text block.
/// The block parser is built entirely on top of this, so the fragile
/// line-shape heuristics stay in one testable place.
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    /// In-range decimal price.
    Odds(f64),
    /// Combined "D/M, H:MM" capture.
    DateTime { date: String, time: String },
    /// Standalone "H:MM" line.
    TimeOnly(String),
    /// Contains a league keyword; excluded from team candidates.
    LeagueKeyword,
    /// Plausible team name, truncated to `TEAM_NAME_MAX` characters.
    Candidate(String),
    /// Recognized shape but unusable (e.g. out-of-range odds), or too short.
    Other,
}

pub fn classify_line(line: &str) -> LineClass {
    if ODDS_RE.is_match(line) {
        // Odds-shaped lines are never team candidates even when the value
        // is out of range — out-of-range prices are layout noise.
        return match line.parse::<f64>() {
            Ok(v) if (ODDS_MIN..=ODDS_MAX).contains(&v) => LineClass::Odds(v),
            _ => LineClass::Other,
        };
    }

    if let Some(caps) = DATE_TIME_RE.captures(line) {
        return LineClass::DateTime {
            date: caps[1].to_string(),
            time: caps[2].to_string(),
        };
    }

    if TIME_RE.is_match(line) {
        return LineClass::TimeOnly(line.to_string());
    }

    if has_league_keyword(line) {
        return LineClass::LeagueKeyword;
    }

    if line.chars().count() >= MIN_TEAM_LINE_LEN {
        return LineClass::Candidate(line.chars().take(TEAM_NAME_MAX).collect());
    }

    LineClass::Other
}

pub fn has_league_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    LEAGUE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
