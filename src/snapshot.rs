//! Prior-odds snapshot lookup.
//!
//! The upstream tooltip feed carries zero or more historical odds records
//! per match; only the most recent one matters for rendering up/down change
//! indicators. The index is rebuilt from scratch on every poll cycle, so it
//! never accumulates stale entries.

use std::collections::HashMap;

use crate::types::OddsSnapshot;

/// Mapping from match identifier to its latest prior-odds snapshot.
#[derive(Debug, Clone, Default)]
pub struct OddsSnapshotIndex {
    latest: HashMap<String, OddsSnapshot>,
}

impl OddsSnapshotIndex {
    /// Build the index from a snapshot sequence. For each match id the
    /// snapshot with the maximum change timestamp wins; on equal timestamps
    /// the record seen later in input order wins. Never fails; empty input
    /// yields an empty index.
    pub fn build(snapshots: &[OddsSnapshot]) -> Self {
        let mut latest: HashMap<String, OddsSnapshot> = HashMap::new();
        for snap in snapshots {
            match latest.get(&snap.match_id) {
                Some(existing) if snap.changed_at < existing.changed_at => {}
                _ => {
                    latest.insert(snap.match_id.clone(), snap.clone());
                }
            }
        }
        Self { latest }
    }

    /// Look up the latest snapshot for a match id.
    pub fn get(&self, match_id: &str) -> Option<&OddsSnapshot> {
        self.latest.get(match_id)
    }

    /// Number of matches with at least one snapshot.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(match_id: &str, changed_at: &str, win: f64) -> OddsSnapshot {
        OddsSnapshot {
            match_id: match_id.to_string(),
            changed_at: changed_at.to_string(),
            win_odds: Some(win),
            draw_odds: Some(3.20),
            lose_odds: Some(4.50),
        }
    }

    #[test]
    fn test_empty_input() {
        let index = OddsSnapshotIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.get("1001").is_none());
    }

    #[test]
    fn test_latest_by_change_timestamp() {
        let index = OddsSnapshotIndex::build(&[
            snap("1001", "20250619100000", 1.70),
            snap("1001", "20250619150000", 1.85),
            snap("1001", "20250619120000", 1.75),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1001").unwrap().win_odds, Some(1.85));
    }

    #[test]
    fn test_tie_resolves_to_later_input() {
        let index = OddsSnapshotIndex::build(&[
            snap("1001", "20250619150000", 1.70),
            snap("1001", "20250619150000", 1.95),
        ]);
        assert_eq!(index.get("1001").unwrap().win_odds, Some(1.95));
    }

    #[test]
    fn test_one_entry_per_match() {
        let index = OddsSnapshotIndex::build(&[
            snap("1001", "20250619100000", 1.70),
            snap("1002", "20250619110000", 2.10),
            snap("1001", "20250619090000", 1.60),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("1001").unwrap().win_odds, Some(1.70));
        assert_eq!(index.get("1002").unwrap().win_odds, Some(2.10));
    }
}
