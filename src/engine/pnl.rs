use crate::models::trade::Outcome;

/// Units per lot. Raw export quantities divide by this to obtain lot counts.
pub const CONTRACT_SIZE: f64 = 75.0;

/// Flat brokerage charged per round trip, in currency units.
pub const FLAT_BROKERAGE: f64 = 42.0;

/// Monetary P&L for a closed round trip.
///
/// The payoff is long-style (profit when exit > entry) regardless of which
/// leg opened the position. Short round trips are scored as if they were
/// long; that matches the journal this engine reconciles against and must
/// not be corrected here without a direction field on the fill data.
pub fn calculate_pnl(entry_price: f64, exit_price: f64, lots: f64) -> f64 {
    (exit_price - entry_price) * lots * CONTRACT_SIZE - FLAT_BROKERAGE
}

/// Classify a closed trade. Zero P&L counts as a win.
pub fn classify(pnl: f64) -> Outcome {
    if pnl >= 0.0 {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

/// P&L and outcome for a trade that may still be open.
/// No exit price means nothing is realized yet: pnl 0, breakeven.
pub fn evaluate(entry_price: f64, exit_price: Option<f64>, lots: f64) -> (f64, Outcome) {
    match exit_price {
        Some(exit) => {
            let pnl = calculate_pnl(entry_price, exit, lots);
            (pnl, classify(pnl))
        }
        None => (0.0, Outcome::Breakeven),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pnl_worked_example() {
        // BUY @100, SELL @120, 1 lot: (120-100)*1*75 - 42 = 1458
        let pnl = calculate_pnl(100.0, 120.0, 1.0);
        assert!((pnl - 1458.0).abs() < 1e-9);
        assert_eq!(classify(pnl), Outcome::Win);
    }

    #[test]
    fn test_pnl_loss() {
        let pnl = calculate_pnl(120.0, 100.0, 1.0);
        assert!((pnl - (-1542.0)).abs() < 1e-9);
        assert_eq!(classify(pnl), Outcome::Loss);
    }

    #[test]
    fn test_zero_pnl_counts_as_win() {
        assert_eq!(classify(0.0), Outcome::Win);
    }

    #[test]
    fn test_brokerage_alone_is_a_loss() {
        // Flat exit at entry still pays brokerage.
        let (pnl, outcome) = evaluate(100.0, Some(100.0), 1.0);
        assert!((pnl - (-42.0)).abs() < 1e-9);
        assert_eq!(outcome, Outcome::Loss);
    }

    #[test]
    fn test_open_trade_is_breakeven() {
        let (pnl, outcome) = evaluate(200.0, None, 2.0);
        assert_eq!(pnl, 0.0);
        assert_eq!(outcome, Outcome::Breakeven);
    }

    #[test]
    fn test_pnl_is_deterministic() {
        let a = calculate_pnl(101.25, 99.5, 3.0);
        let b = calculate_pnl(101.25, 99.5, 3.0);
        assert_eq!(a, b);
    }
}
