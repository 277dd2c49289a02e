//! Upcoming-match and betting-odds board.
//!
//! Polls the betman match-information API for today's and tomorrow's match
//! windows, normalizes provider timestamps into one fixed zone, drops
//! matches that already started, and groups the rest by betting-close time
//! with each match's latest prior-odds snapshot attached.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod retry;
pub mod snapshot;
pub mod timestamp;
pub mod types;
