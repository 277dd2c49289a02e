//! Core data model for the match aggregation pipeline.
//!
//! Everything here is transient: one aggregation call owns one set of these
//! values and nothing survives into the next poll cycle.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One upstream match record, already normalized out of whatever JSON
/// envelope the provider variant used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatch {
    /// Provider match key (e.g. "OUTER_GM_OSID_TS" on the live screen feed)
    pub id: String,
    /// League display name
    pub league: String,
    /// Home team display name
    pub home: String,
    /// Away team display name
    pub away: String,
    /// Provider date/time string, either packed 14-digit or locale-formatted
    pub start_raw: String,
    /// Win odds; `None` means the market is not offered (upstream `0` sentinel)
    pub win_odds: Option<f64>,
    /// Draw odds
    pub draw_odds: Option<f64>,
    /// Lose odds
    pub lose_odds: Option<f64>,
    /// Handicap line for handicap markets, if any
    pub handicap: Option<f64>,
}

/// A historical odds record for one match, used to show up/down movement
/// against the current odds. Values are already scaled to decimal odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsSnapshot {
    /// Match key this snapshot concerns
    pub match_id: String,
    /// Change timestamp as packed digits; equal-length strings compare
    /// correctly as strings
    pub changed_at: String,
    /// Pre-change win odds
    pub win_odds: Option<f64>,
    /// Pre-change draw odds
    pub draw_odds: Option<f64>,
    /// Pre-change lose odds
    pub lose_odds: Option<f64>,
}

/// One upstream fetch's worth of records for a query window.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub matches: Vec<RawMatch>,
    pub snapshots: Vec<OddsSnapshot>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.snapshots.is_empty()
    }
}

/// A surviving match annotated with its canonical instant and the latest
/// prior-odds snapshot values (all `None` when no snapshot matched).
#[derive(Debug, Clone)]
pub struct AggregatedMatch {
    pub raw: RawMatch,
    /// Close time in the board's fixed zone
    pub starts_at: DateTime<Tz>,
    pub prev_win_odds: Option<f64>,
    pub prev_draw_odds: Option<f64>,
    pub prev_lose_odds: Option<f64>,
}

/// Matches sharing one betting-close time, under their display label.
#[derive(Debug, Clone)]
pub struct MatchGroup {
    /// Display label and grouping key, e.g. "06.19(목) 22:00 마감"
    pub key: String,
    pub matches: Vec<AggregatedMatch>,
}

/// Ordered grouping result. Group order follows ascending close time;
/// this is deliberately a sequence of pairs, never a map with undefined
/// iteration order.
#[derive(Debug, Clone, Default)]
pub struct GroupedMatches {
    pub groups: Vec<MatchGroup>,
}

impl GroupedMatches {
    /// True when no matches survived filtering (a legitimate state, not an
    /// error; the presenter shows "no matches").
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total match count across all groups.
    pub fn total_matches(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }
}
