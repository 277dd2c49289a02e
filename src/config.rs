//! Runtime configuration.
//!
//! Everything is env-var driven with safe defaults, including the display
//! zone: the board always renders close times in one fixed zone regardless
//! of where the process runs, but the zone is injected so tests can pin an
//! alternate one.
//!
//! Environment variables:
//! - MATCHBOARD_UPSTREAM_URL — match-information endpoint
//! - MATCHBOARD_ZONE — IANA zone identifier (default: Asia/Seoul)
//! - MATCHBOARD_FETCH_TIMEOUT_SECS — per-window fetch timeout (default: 10)
//! - MATCHBOARD_POLL_INTERVAL_SECS — poll loop interval (default: 60)

use std::str::FromStr;

use chrono_tz::Tz;

/// Default match-information endpoint (the betman live screen feed).
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://www.betman.co.kr/matchinfo/inqMainLivescreMchList.do";

/// Default display zone. Close times are wall-clock KST upstream.
pub const DEFAULT_ZONE: &str = "Asia/Seoul";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Board runtime configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Upstream match-information endpoint
    pub upstream_url: String,
    /// Fixed display zone for all timestamp interpretation
    pub zone: Tz,
    /// Overall timeout per window fetch; a timed-out window degrades to empty
    pub fetch_timeout_secs: u64,
    /// Re-poll interval for the board loop
    pub poll_interval_secs: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            zone: chrono_tz::Asia::Seoul,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl BoardConfig {
    /// Load configuration from environment variables with safe defaults.
    /// An unparseable zone falls back to the default with a warning rather
    /// than refusing to start.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let upstream_url =
            std::env::var("MATCHBOARD_UPSTREAM_URL").unwrap_or(defaults.upstream_url);

        let zone = match std::env::var("MATCHBOARD_ZONE") {
            Ok(name) => Tz::from_str(&name).unwrap_or_else(|_| {
                tracing::warn!(
                    zone = %name,
                    "Unknown zone identifier, falling back to {}",
                    DEFAULT_ZONE
                );
                defaults.zone
            }),
            Err(_) => defaults.zone,
        };

        let fetch_timeout_secs = std::env::var("MATCHBOARD_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.fetch_timeout_secs);

        let poll_interval_secs = std::env::var("MATCHBOARD_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.poll_interval_secs);

        Self {
            upstream_url,
            zone,
            fetch_timeout_secs,
            poll_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.zone, chrono_tz::Asia::Seoul);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.poll_interval_secs, 60);
        assert!(config.upstream_url.contains("betman"));
    }

    #[test]
    fn test_zone_parses_from_str() {
        assert_eq!(Tz::from_str("Asia/Seoul").unwrap(), chrono_tz::Asia::Seoul);
        assert!(Tz::from_str("Asia/Nowhere").is_err());
    }
}
