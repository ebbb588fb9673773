use serde::{Deserialize, Serialize};

/// Aggregate journal statistics. Derived on demand from the current trade
/// list, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub net_pnl: f64,
    /// Percentage of wins out of all trades, rounded to one decimal place.
    pub win_rate_pct: f64,
}

impl JournalStats {
    pub fn empty() -> Self {
        JournalStats {
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            net_pnl: 0.0,
            win_rate_pct: 0.0,
        }
    }
}
