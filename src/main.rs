//! Poll-loop binary: re-aggregates on an interval and renders the grouped
//! board as a plain text table. The table is a stand-in for whatever
//! presenter consumes the grouping in production.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use matchboard::aggregate::MatchAggregator;
use matchboard::client::BetmanClient;
use matchboard::config::BoardConfig;
use matchboard::logging;
use matchboard::types::GroupedMatches;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logging::init_logging();

    let config = BoardConfig::from_env();
    info!(
        upstream = %config.upstream_url,
        zone = %config.zone,
        poll_interval_secs = config.poll_interval_secs,
        "Starting match board"
    );

    let client = Arc::new(BetmanClient::new(&config)?);
    let aggregator = MatchAggregator::new(client, &config);

    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let board = aggregator.aggregate(Utc::now()).await;
        render_board(&board);
    }
}

fn render_board(board: &GroupedMatches) {
    if board.is_empty() {
        println!("현재 진행 중이거나 마감된 경기가 없습니다.");
        return;
    }

    for group in &board.groups {
        println!();
        println!("== {} ==", group.key);
        for m in &group.matches {
            println!(
                "{:>12}  {:<14} {:<12} {:<12} 승 {:>5} 무 {:>5} 패 {:>5}",
                m.raw.id,
                m.raw.league,
                m.raw.home,
                m.raw.away,
                odds_cell(m.raw.win_odds),
                odds_cell(m.raw.draw_odds),
                odds_cell(m.raw.lose_odds),
            );
        }
    }
}

/// `None` renders as "-": market not offered, distinct from any real line.
fn odds_cell(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}
