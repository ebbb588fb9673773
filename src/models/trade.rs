use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Instrument class, derived from substring matching on the raw export name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentKind {
    BankIndex,
    FinIndex,
    Index,
}

impl InstrumentKind {
    /// Classify an instrument by its raw name. "BANK" is checked before "FIN".
    pub fn classify(name: &str) -> Self {
        if name.contains("BANK") {
            InstrumentKind::BankIndex
        } else if name.contains("FIN") {
            InstrumentKind::FinIndex
        } else {
            InstrumentKind::Index
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::BankIndex => "bank-index",
            InstrumentKind::FinIndex => "fin-index",
            InstrumentKind::Index => "index",
        }
    }
}

impl std::str::FromStr for InstrumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank-index" => Ok(InstrumentKind::BankIndex),
            "fin-index" => Ok(InstrumentKind::FinIndex),
            "index" => Ok(InstrumentKind::Index),
            other => Err(format!("Unknown instrument kind: {}", other)),
        }
    }
}

/// Win/loss classification of a trade.
/// Breakeven is reserved for open trades (no exit price); a closed trade with
/// pnl exactly 0 counts as a win.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Breakeven => "breakeven",
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            "breakeven" => Ok(Outcome::Breakeven),
            other => Err(format!("Unknown outcome: {}", other)),
        }
    }
}

/// A reconciled round trip (or a manually journaled trade). Immutable once
/// produced; the journal only ever inserts and deletes whole trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub instrument: String,
    pub kind: InstrumentKind,
    pub entry_price: f64,
    /// Absent for manually entered trades that are still open.
    pub exit_price: Option<f64>,
    /// Quantity in lots (raw quantity / contract size).
    pub lots: f64,
    pub date: NaiveDate,
    pub pnl: f64,
    pub outcome: Outcome,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_name_substring() {
        assert_eq!(
            InstrumentKind::classify("BANKNIFTY24JUN48000CE"),
            InstrumentKind::BankIndex
        );
        assert_eq!(
            InstrumentKind::classify("FINNIFTY24JUN21500PE"),
            InstrumentKind::FinIndex
        );
        assert_eq!(
            InstrumentKind::classify("NIFTY24JUN23500CE"),
            InstrumentKind::Index
        );
    }

    #[test]
    fn test_classify_bank_wins_over_fin() {
        assert_eq!(
            InstrumentKind::classify("BANKFIN-HYBRID"),
            InstrumentKind::BankIndex
        );
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            InstrumentKind::BankIndex,
            InstrumentKind::FinIndex,
            InstrumentKind::Index,
        ] {
            assert_eq!(kind.as_str().parse::<InstrumentKind>().unwrap(), kind);
        }
    }
}
