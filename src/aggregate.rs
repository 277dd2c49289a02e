//! Match aggregation: fetch, filter, sort, group, attach prior odds.
//!
//! One aggregation call fetches the "today" and "tomorrow" windows
//! concurrently, merges whatever arrived, and runs the pure pipeline over
//! the combined records. A failed or timed-out window degrades to empty so
//! the sibling window still renders; the call itself never fails — an empty
//! board is a legitimate result, not an error.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::client::MatchSource;
use crate::config::BoardConfig;
use crate::snapshot::OddsSnapshotIndex;
use crate::timestamp::parse_instant;
use crate::types::{AggregatedMatch, GroupedMatches, MatchGroup, RawMatch, ResultSet};

/// Korean weekday abbreviations, indexed from Sunday.
const KR_WEEKDAYS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Orchestrates upstream fetches and the grouping pipeline.
pub struct MatchAggregator<S> {
    source: Arc<S>,
    zone: Tz,
    fetch_timeout: Duration,
}

impl<S: MatchSource> MatchAggregator<S> {
    pub fn new(source: Arc<S>, config: &BoardConfig) -> Self {
        Self {
            source,
            zone: config.zone,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// Aggregate upcoming matches as of `now`.
    ///
    /// `now` is captured once here and used for both the query-window
    /// derivation and the started-match filter, so the filter is consistent
    /// across the whole call and tests can pin a synthetic clock.
    pub async fn aggregate(&self, now: DateTime<Utc>) -> GroupedMatches {
        let today = now.with_timezone(&self.zone).date_naive();
        let tomorrow = today + chrono::Duration::days(1);

        info!(
            event = "aggregation_start",
            today = %today,
            tomorrow = %tomorrow,
            zone = %self.zone,
            "Fetching match windows"
        );

        // Independent fetches joined at one barrier; neither blocks or
        // fails the other.
        let (today_set, tomorrow_set) = tokio::join!(
            self.fetch_window(Some(today)),
            self.fetch_window(Some(tomorrow)),
        );

        // Window order fixed: today's records before tomorrow's, so ties at
        // the same instant keep their window-relative order.
        let mut matches = today_set.matches;
        matches.extend(tomorrow_set.matches);
        let mut snapshots = today_set.snapshots;
        snapshots.extend(tomorrow_set.snapshots);

        let index = OddsSnapshotIndex::build(&snapshots);
        let grouped = group_matches(&matches, &index, now, self.zone);

        info!(
            event = "aggregation_complete",
            fetched = matches.len(),
            surviving = grouped.total_matches(),
            groups = grouped.groups.len(),
            "Aggregation finished"
        );
        grouped
    }

    /// Fetch one window, downgrading any failure to an empty result set.
    async fn fetch_window(&self, window: Option<NaiveDate>) -> ResultSet {
        let label = window.map(|d| d.to_string()).unwrap_or_else(|| "default".to_string());
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch_result_set(window)).await
        {
            Ok(Ok(set)) => {
                info!(
                    event = "window_fetched",
                    window = %label,
                    matches = set.matches.len(),
                    snapshots = set.snapshots.len(),
                    "Window fetch succeeded"
                );
                set
            }
            Ok(Err(e)) => {
                warn!(
                    event = "window_fetch_failed",
                    window = %label,
                    error = %e,
                    "Window fetch failed, continuing with empty result set"
                );
                ResultSet::default()
            }
            Err(_) => {
                warn!(
                    event = "window_fetch_timeout",
                    window = %label,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "Window fetch timed out, continuing with empty result set"
                );
                ResultSet::default()
            }
        }
    }
}

/// The pure pipeline: parse close times, drop started and unparsable
/// matches, stable-sort ascending, group by close-time key, attach the
/// latest prior odds per match.
///
/// Grouping is a partition of the surviving matches: the sort guarantees
/// equal instants are adjacent, so appending to the last group whenever the
/// key repeats yields groups in ascending close-time order with no empties.
pub fn group_matches(
    matches: &[RawMatch],
    snapshots: &OddsSnapshotIndex,
    now: DateTime<Utc>,
    zone: Tz,
) -> GroupedMatches {
    let cutoff = now.with_timezone(&zone);

    let mut upcoming: Vec<AggregatedMatch> = Vec::with_capacity(matches.len());
    for raw in matches {
        let starts_at = match parse_instant(&raw.start_raw, zone) {
            Ok(dt) => dt,
            Err(e) => {
                warn!(
                    event = "match_dropped",
                    match_id = %raw.id,
                    raw = %raw.start_raw,
                    error = %e,
                    "Dropping match with unparsable close time"
                );
                continue;
            }
        };

        // Strictly after now; a match closing exactly at the cutoff is gone.
        if starts_at <= cutoff {
            continue;
        }

        let snap = snapshots.get(&raw.id);
        upcoming.push(AggregatedMatch {
            raw: raw.clone(),
            starts_at,
            prev_win_odds: snap.and_then(|s| s.win_odds),
            prev_draw_odds: snap.and_then(|s| s.draw_odds),
            prev_lose_odds: snap.and_then(|s| s.lose_odds),
        });
    }

    // Stable: matches at the identical instant keep their input order.
    upcoming.sort_by_key(|m| m.starts_at);

    let mut groups: Vec<MatchGroup> = Vec::new();
    for m in upcoming {
        let key = close_group_key(&m.starts_at);
        match groups.last_mut() {
            Some(group) if group.key == key => group.matches.push(m),
            _ => groups.push(MatchGroup {
                key,
                matches: vec![m],
            }),
        }
    }

    GroupedMatches { groups }
}

/// Close-time display label and grouping key: `MM.DD(요일) HH:mm 마감`.
/// Equal instants always yield byte-identical keys.
pub fn close_group_key(instant: &DateTime<Tz>) -> String {
    let weekday = KR_WEEKDAYS[instant.weekday().num_days_from_sunday() as usize];
    format!(
        "{:02}.{:02}({}) {:02}:{:02} 마감",
        instant.month(),
        instant.day(),
        weekday,
        instant.hour(),
        instant.minute()
    )
}
