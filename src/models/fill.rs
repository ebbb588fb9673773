use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Which side of the market a fill executed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_opposite(&self, other: Side) -> bool {
        *self != other
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("Unknown side: {}", other)),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// A single broker execution (one leg of a round trip), as validated by the
/// import parser. Instrument names are kept exactly as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub instrument: String,
    pub side: Side,
    pub price: f64,
    /// Raw contract quantity as exported (not lots).
    pub quantity: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// 1-based row number in the source file. Tie-break for identical
    /// timestamps: fills sort by (date, time, row_index).
    pub row_index: usize,
}

impl Fill {
    pub fn executed_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}
