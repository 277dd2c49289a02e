//! Upstream JSON envelope normalization.
//!
//! The match-information API exists in several variants that all carry the
//! same information under different envelopes and field spellings:
//!
//! 1. `{ "dl_data": [...] }` — live screen feed, flat, upper-case record
//!    fields, packed 14-digit `MCH_DTM`, decimal odds carried verbatim
//! 2. `{ "data": { "dl_data": [...] } }` — same records, nested once
//! 3. `{ "data": { "schedulesList": [...], "tooltipList": [...] } }` —
//!    schedule feed, camelCase fields, locale-formatted `matchDate`, odds
//!    stored as integers scaled x100 upstream (divided back down here)
//!
//! Each shape gets one adapter mapping it to the canonical [`ResultSet`];
//! a new upstream variant means a new adapter, the aggregator never sees
//! the difference. In every shape the odds value `0` is a sentinel for
//! "market not offered" and maps to `None`, distinct from a real line.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::types::{OddsSnapshot, RawMatch, ResultSet};

/// Upstream prior-odds values are stored as integers scaled x100.
const ODDS_SCALE: f64 = 100.0;

/// Normalize one upstream response body into a `ResultSet`.
///
/// An unrecognized envelope yields an empty set with a warning rather than
/// an error: the window degrades, the sibling window still renders.
pub fn extract_result_set(body: &Value) -> ResultSet {
    if let Some(records) = body.get("dl_data").and_then(Value::as_array) {
        return live_screen_records(records);
    }
    if let Some(data) = body.get("data") {
        if let Some(records) = data.get("dl_data").and_then(Value::as_array) {
            return live_screen_records(records);
        }
        if data.get("schedulesList").is_some() || data.get("tooltipList").is_some() {
            return schedule_records(data);
        }
    }

    warn!(
        event = "unknown_envelope",
        keys = ?top_level_keys(body),
        "Unrecognized upstream envelope shape, treating result set as empty"
    );
    ResultSet::default()
}

fn top_level_keys(body: &Value) -> Vec<String> {
    body.as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Live screen feed (shapes 1 and 2)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LiveScreenRecord {
    #[serde(rename = "OUTER_GM_OSID_TS")]
    id: Option<Value>,
    #[serde(rename = "LEAG_NM")]
    league: Option<String>,
    #[serde(rename = "HOME_NM")]
    home: Option<String>,
    #[serde(rename = "AWAY_NM")]
    away: Option<String>,
    #[serde(rename = "MCH_DTM")]
    match_dtm: Option<Value>,
    #[serde(rename = "WIN_ALLOT")]
    win_allot: Option<f64>,
    #[serde(rename = "DRAW_ALLOT")]
    draw_allot: Option<f64>,
    #[serde(rename = "LOSE_ALLOT")]
    lose_allot: Option<f64>,
    #[serde(rename = "HANDICAP_VAL")]
    handicap: Option<f64>,
}

fn live_screen_records(records: &[Value]) -> ResultSet {
    let mut matches = Vec::with_capacity(records.len());
    for record in records {
        let parsed: LiveScreenRecord = match serde_json::from_value(record.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(event = "record_decode_failed", error = %e, "Skipping malformed live screen record");
                continue;
            }
        };

        let (Some(id), Some(start_raw)) = (
            parsed.id.as_ref().and_then(key_string),
            parsed.match_dtm.as_ref().and_then(key_string),
        ) else {
            warn!(event = "record_missing_key_fields", "Skipping live screen record without id or date");
            continue;
        };

        matches.push(RawMatch {
            id,
            league: parsed.league.unwrap_or_default(),
            home: parsed.home.unwrap_or_default(),
            away: parsed.away.unwrap_or_default(),
            start_raw,
            // Live screen odds are already decimal
            win_odds: offered(parsed.win_allot),
            draw_odds: offered(parsed.draw_allot),
            lose_odds: offered(parsed.lose_allot),
            handicap: parsed.handicap,
        });
    }
    ResultSet {
        matches,
        snapshots: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Schedule feed (shape 3)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScheduleRecord {
    id: Option<Value>,
    #[serde(rename = "leagueName")]
    league_name: Option<String>,
    #[serde(rename = "homeName")]
    home_name: Option<String>,
    #[serde(rename = "awayName")]
    away_name: Option<String>,
    #[serde(rename = "matchDate")]
    match_date: Option<String>,
    #[serde(rename = "winAllot")]
    win_allot: Option<f64>,
    #[serde(rename = "drawAllot")]
    draw_allot: Option<f64>,
    #[serde(rename = "loseAllot")]
    lose_allot: Option<f64>,
    handicap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TooltipRecord {
    #[serde(rename = "matchId")]
    match_id: Option<Value>,
    #[serde(rename = "changeDate")]
    change_date: Option<Value>,
    #[serde(rename = "winAllot")]
    win_allot: Option<f64>,
    #[serde(rename = "drawAllot")]
    draw_allot: Option<f64>,
    #[serde(rename = "loseAllot")]
    lose_allot: Option<f64>,
}

fn schedule_records(data: &Value) -> ResultSet {
    let schedules = data
        .get("schedulesList")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let tooltips = data
        .get("tooltipList")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut matches = Vec::with_capacity(schedules.len());
    for record in schedules {
        let parsed: ScheduleRecord = match serde_json::from_value(record.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(event = "record_decode_failed", error = %e, "Skipping malformed schedule record");
                continue;
            }
        };

        let (Some(id), Some(start_raw)) = (
            parsed.id.as_ref().and_then(key_string),
            parsed.match_date.clone(),
        ) else {
            warn!(event = "record_missing_key_fields", "Skipping schedule record without id or date");
            continue;
        };

        matches.push(RawMatch {
            id,
            league: parsed.league_name.unwrap_or_default(),
            home: parsed.home_name.unwrap_or_default(),
            away: parsed.away_name.unwrap_or_default(),
            start_raw,
            win_odds: scaled(parsed.win_allot),
            draw_odds: scaled(parsed.draw_allot),
            lose_odds: scaled(parsed.lose_allot),
            handicap: parsed.handicap.map(|h| h / ODDS_SCALE),
        });
    }

    let mut snapshots = Vec::with_capacity(tooltips.len());
    for record in tooltips {
        let parsed: TooltipRecord = match serde_json::from_value(record.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(event = "record_decode_failed", error = %e, "Skipping malformed tooltip record");
                continue;
            }
        };

        let (Some(match_id), Some(changed_at)) = (
            parsed.match_id.as_ref().and_then(key_string),
            parsed.change_date.as_ref().and_then(key_string),
        ) else {
            continue;
        };

        snapshots.push(OddsSnapshot {
            match_id,
            changed_at,
            win_odds: scaled(parsed.win_allot),
            draw_odds: scaled(parsed.draw_allot),
            lose_odds: scaled(parsed.lose_allot),
        });
    }

    ResultSet { matches, snapshots }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Provider keys arrive as strings or bare numbers depending on the variant.
fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Map the `0` "market not offered" sentinel to `None`, keep real odds.
fn offered(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Sentinel mapping plus the x100 scale correction of the schedule feed.
fn scaled(value: Option<f64>) -> Option<f64> {
    offered(value).map(|v| v / ODDS_SCALE)
}
