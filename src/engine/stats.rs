use crate::models::stats::JournalStats;
use crate::models::trade::{Outcome, Trade};

/// Fold the trade list into aggregate statistics.
///
/// Pure and recomputed on every read; there is no cached state to drift.
pub fn calculate_stats(trades: &[Trade]) -> JournalStats {
    if trades.is_empty() {
        return JournalStats::empty();
    }

    let mut wins = 0usize;
    let mut losses = 0usize;
    let mut breakeven = 0usize;
    let mut net_pnl = 0.0f64;

    for trade in trades {
        match trade.outcome {
            Outcome::Win => wins += 1,
            Outcome::Loss => losses += 1,
            Outcome::Breakeven => breakeven += 1,
        }
        net_pnl += trade.pnl;
    }

    let total = trades.len();
    let win_rate_pct = round_one_decimal(wins as f64 / total as f64 * 100.0);

    JournalStats {
        total_trades: total,
        wins,
        losses,
        breakeven,
        net_pnl,
        win_rate_pct,
    }
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
