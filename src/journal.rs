use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::data::import::{self, SkippedRow};
use crate::data::storage::TradeStore;
use crate::engine::pairing::{self, MatchStrategy};
use crate::engine::{pnl, stats};
use crate::errors::AppError;
use crate::models::fill::Fill;
use crate::models::stats::JournalStats;
use crate::models::trade::{InstrumentKind, Trade};

/// The result of parsing and reconciling an export, held in memory until the
/// caller confirms or discards it. Nothing is persisted until `confirm`.
#[derive(Debug)]
pub struct ImportReview {
    pub trades: Vec<Trade>,
    pub unmatched: Vec<Fill>,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReview {
    /// Merge the reviewed trades into the store. Returns how many were written.
    pub fn confirm(self, store: &mut dyn TradeStore) -> Result<usize, AppError> {
        let written = store.insert(&self.trades)?;
        info!("Import confirmed: {} trades merged", written);
        Ok(written)
    }

    /// Drop the pending trades. Returns how many were discarded.
    pub fn discard(self) -> usize {
        let dropped = self.trades.len();
        info!("Import discarded: {} trades dropped", dropped);
        dropped
    }
}

/// A manually journaled trade, entered without going through pairing.
/// Exit price may be absent while the position is still open.
#[derive(Debug, Clone)]
pub struct ManualTrade {
    pub instrument: String,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub lots: f64,
    pub date: NaiveDate,
    pub notes: String,
}

/// The journal: a store plus the operations the reviewing caller gets.
pub struct Journal<S: TradeStore> {
    store: S,
}

impl<S: TradeStore> Journal<S> {
    pub fn new(store: S) -> Self {
        Journal { store }
    }

    /// Parse an export file and reconcile it into a pending review.
    /// Does not touch the store.
    pub fn review_import(
        &self,
        path: &Path,
        strategy: &dyn MatchStrategy,
    ) -> Result<ImportReview, AppError> {
        let parsed = import::parse_file(path)?;
        let report = pairing::reconcile(parsed.fills, strategy);
        Ok(ImportReview {
            trades: report.trades,
            unmatched: report.unmatched,
            skipped: parsed.skipped,
        })
    }

    /// Merge a reviewed import into the journal.
    pub fn confirm_import(&mut self, review: ImportReview) -> Result<usize, AppError> {
        review.confirm(&mut self.store)
    }

    /// Journal a manually entered trade. P&L follows the same formula as
    /// paired trades; a missing exit price journals an open (breakeven) one.
    pub fn add_manual(&mut self, input: ManualTrade) -> Result<Trade, AppError> {
        if input.instrument.trim().is_empty() {
            return Err(AppError::InvalidTrade("Instrument name is empty".into()));
        }
        if !input.entry_price.is_finite() || input.entry_price <= 0.0 {
            return Err(AppError::InvalidTrade(format!(
                "Entry price must be positive, got {}",
                input.entry_price
            )));
        }
        if let Some(exit) = input.exit_price {
            if !exit.is_finite() || exit <= 0.0 {
                return Err(AppError::InvalidTrade(format!(
                    "Exit price must be positive, got {}",
                    exit
                )));
            }
        }
        if !input.lots.is_finite() || input.lots <= 0.0 {
            return Err(AppError::InvalidTrade(format!(
                "Lots must be positive, got {}",
                input.lots
            )));
        }

        let (pnl, outcome) = pnl::evaluate(input.entry_price, input.exit_price, input.lots);
        let trade = Trade {
            id: uuid::Uuid::new_v4().to_string(),
            kind: InstrumentKind::classify(&input.instrument),
            instrument: input.instrument,
            entry_price: input.entry_price,
            exit_price: input.exit_price,
            lots: input.lots,
            date: input.date,
            pnl,
            outcome,
            notes: input.notes,
        };
        self.store.insert(std::slice::from_ref(&trade))?;
        info!("Manual trade journaled: {} ({})", trade.instrument, trade.id);
        Ok(trade)
    }

    pub fn trades(&self) -> Result<Vec<Trade>, AppError> {
        self.store.all()
    }

    /// Aggregate statistics over the current trade list.
    pub fn stats(&self) -> Result<JournalStats, AppError> {
        Ok(stats::calculate_stats(&self.store.all()?))
    }

    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        self.store.delete(id)
    }
}
