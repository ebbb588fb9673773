use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::errors::AppError;
use crate::models::trade::{InstrumentKind, Outcome, Trade};

/// Persistent home of confirmed trades. The pairing engine never sees this;
/// callers hand a store to the journal layer explicitly.
pub trait TradeStore {
    /// Insert a batch of trades. Returns how many were written.
    fn insert(&mut self, trades: &[Trade]) -> Result<usize, AppError>;

    /// All trades, ordered by date then id.
    fn all(&self) -> Result<Vec<Trade>, AppError>;

    /// Delete one trade. `NotFound` if the id is absent.
    fn delete(&mut self, id: &str) -> Result<(), AppError>;
}

// ── SQLite ──

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS trades (
    id          TEXT PRIMARY KEY,
    instrument  TEXT NOT NULL,
    kind        TEXT NOT NULL,
    entry_price REAL NOT NULL,
    exit_price  REAL,
    lots        REAL NOT NULL,
    trade_date  TEXT NOT NULL,
    pnl         REAL NOT NULL,
    outcome     TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_trades_date ON trades(trade_date);
";

/// SQLite-backed trade store.
pub struct SqliteTradeStore {
    conn: Connection,
}

impl SqliteTradeStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!("Journal database ready at {}", path.display());
        Ok(SqliteTradeStore { conn })
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteTradeStore { conn })
    }
}

impl TradeStore for SqliteTradeStore {
    fn insert(&mut self, trades: &[Trade]) -> Result<usize, AppError> {
        let tx = self.conn.transaction()?;
        for trade in trades {
            tx.execute(
                "INSERT INTO trades
                   (id, instrument, kind, entry_price, exit_price, lots, trade_date, pnl, outcome, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    trade.id,
                    trade.instrument,
                    trade.kind.as_str(),
                    trade.entry_price,
                    trade.exit_price,
                    trade.lots,
                    trade.date.format("%Y-%m-%d").to_string(),
                    trade.pnl,
                    trade.outcome.as_str(),
                    trade.notes,
                ],
            )?;
        }
        tx.commit()?;
        Ok(trades.len())
    }

    fn all(&self) -> Result<Vec<Trade>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, instrument, kind, entry_price, exit_price, lots, trade_date, pnl, outcome, notes
             FROM trades ORDER BY trade_date, id",
        )?;

        struct Row {
            id: String,
            instrument: String,
            kind: String,
            entry_price: f64,
            exit_price: Option<f64>,
            lots: f64,
            trade_date: String,
            pnl: f64,
            outcome: String,
            notes: String,
        }

        let rows = stmt
            .query_map([], |row| {
                Ok(Row {
                    id: row.get(0)?,
                    instrument: row.get(1)?,
                    kind: row.get(2)?,
                    entry_price: row.get(3)?,
                    exit_price: row.get(4)?,
                    lots: row.get(5)?,
                    trade_date: row.get(6)?,
                    pnl: row.get(7)?,
                    outcome: row.get(8)?,
                    notes: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<Row>, _>>()?;

        rows.into_iter()
            .map(|r| {
                let kind: InstrumentKind = r.kind.parse().map_err(AppError::Database)?;
                let outcome: Outcome = r.outcome.parse().map_err(AppError::Database)?;
                let date = NaiveDate::parse_from_str(&r.trade_date, "%Y-%m-%d")
                    .map_err(|e| AppError::Database(format!("Bad trade_date: {}", e)))?;
                Ok(Trade {
                    id: r.id,
                    instrument: r.instrument,
                    kind,
                    entry_price: r.entry_price,
                    exit_price: r.exit_price,
                    lots: r.lots,
                    date,
                    pnl: r.pnl,
                    outcome,
                    notes: r.notes,
                })
            })
            .collect()
    }

    fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let affected = self
            .conn
            .execute("DELETE FROM trades WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

// ── In-memory ──

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTradeStore {
    trades: Vec<Trade>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        MemoryTradeStore::default()
    }
}

impl TradeStore for MemoryTradeStore {
    fn insert(&mut self, trades: &[Trade]) -> Result<usize, AppError> {
        self.trades.extend_from_slice(trades);
        Ok(trades.len())
    }

    fn all(&self) -> Result<Vec<Trade>, AppError> {
        let mut trades = self.trades.clone();
        trades.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        Ok(trades)
    }

    fn delete(&mut self, id: &str) -> Result<(), AppError> {
        let before = self.trades.len();
        self.trades.retain(|t| t.id != id);
        if self.trades.len() == before {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(id: &str, date: &str, pnl: f64) -> Trade {
        Trade {
            id: id.to_string(),
            instrument: "NIFTY24JUNCE".to_string(),
            kind: InstrumentKind::Index,
            entry_price: 100.0,
            exit_price: Some(120.0),
            lots: 1.0,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            pnl,
            outcome: if pnl >= 0.0 { Outcome::Win } else { Outcome::Loss },
            notes: "scalp".to_string(),
        }
    }

    #[test]
    fn test_sqlite_round_trip() {
        let mut store = SqliteTradeStore::open_in_memory().unwrap();
        let trades = vec![
            sample_trade("b", "2024-06-21", -500.0),
            sample_trade("a", "2024-06-20", 1458.0),
        ];
        assert_eq!(store.insert(&trades).unwrap(), 2);

        let loaded = store.all().unwrap();
        assert_eq!(loaded.len(), 2);
        // Ordered by date.
        assert_eq!(loaded[0].id, "a");
        assert_eq!(loaded[0].pnl, 1458.0);
        assert_eq!(loaded[0].exit_price, Some(120.0));
        assert_eq!(loaded[0].outcome, Outcome::Win);
        assert_eq!(loaded[1].outcome, Outcome::Loss);
        assert_eq!(loaded[0].notes, "scalp");
    }

    #[test]
    fn test_sqlite_preserves_open_trades() {
        let mut store = SqliteTradeStore::open_in_memory().unwrap();
        let mut trade = sample_trade("open", "2024-06-20", 0.0);
        trade.exit_price = None;
        trade.outcome = Outcome::Breakeven;
        store.insert(&[trade]).unwrap();

        let loaded = store.all().unwrap();
        assert_eq!(loaded[0].exit_price, None);
        assert_eq!(loaded[0].outcome, Outcome::Breakeven);
    }

    #[test]
    fn test_sqlite_delete() {
        let mut store = SqliteTradeStore::open_in_memory().unwrap();
        store.insert(&[sample_trade("a", "2024-06-20", 1.0)]).unwrap();
        store.delete("a").unwrap();
        assert!(store.all().unwrap().is_empty());
        assert!(matches!(store.delete("a"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_memory_store_matches_sqlite_behavior() {
        let mut store = MemoryTradeStore::new();
        store
            .insert(&[
                sample_trade("b", "2024-06-21", 1.0),
                sample_trade("a", "2024-06-20", 2.0),
            ])
            .unwrap();
        let loaded = store.all().unwrap();
        assert_eq!(loaded[0].id, "a");
        assert!(matches!(store.delete("zzz"), Err(AppError::NotFound(_))));
        store.delete("a").unwrap();
        assert_eq!(store.all().unwrap().len(), 1);
    }
}
