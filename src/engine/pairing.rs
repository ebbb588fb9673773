use std::collections::BTreeMap;

use tracing::debug;

use crate::models::fill::{Fill, Side};
use crate::models::trade::{InstrumentKind, Trade};

use super::pnl::{self, CONTRACT_SIZE};

/// Result of one reconciliation pass over an import.
#[derive(Debug, Clone)]
pub struct PairingReport {
    pub trades: Vec<Trade>,
    /// Fills that could not be paired into a round trip. Surfaced to the
    /// caller for review, never silently dropped.
    pub unmatched: Vec<Fill>,
}

impl PairingReport {
    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }
}

/// Index pairs produced by a matching strategy over one sorted partition.
#[derive(Debug, Default)]
pub struct Matches {
    pub pairs: Vec<(usize, usize)>,
    pub unmatched: Vec<usize>,
}

/// How fills within one instrument partition are matched into round trips.
/// Implementations receive the partition already sorted by
/// (date, time, row_index) ascending.
pub trait MatchStrategy {
    fn pair(&self, fills: &[Fill]) -> Matches;
}

/// Greedy adjacent pairing: walk the sorted partition, pair each fill with
/// its neighbor when their sides are opposite, skip it otherwise.
///
/// This models the common one-open-one-close session. With more than two
/// fills per instrument per session it can mispair; that behavior is kept
/// deliberately so imported results match the journal this replaces. A
/// FIFO/LIFO lot matcher can be slotted in here without touching callers.
pub struct GreedyAdjacent;

impl MatchStrategy for GreedyAdjacent {
    fn pair(&self, fills: &[Fill]) -> Matches {
        let mut matches = Matches::default();
        let mut i = 0;
        while i + 1 < fills.len() {
            if fills[i].side.is_opposite(fills[i + 1].side) {
                matches.pairs.push((i, i + 1));
                i += 2;
            } else {
                matches.unmatched.push(i);
                i += 1;
            }
        }
        if i < fills.len() {
            matches.unmatched.push(i);
        }
        matches
    }
}

/// Partition fills by exact raw instrument name and sort each partition
/// chronologically. Ties on (date, time) fall back to the original row
/// index, so identical timestamps keep their input order.
pub fn group_fills(fills: Vec<Fill>) -> BTreeMap<String, Vec<Fill>> {
    let mut partitions: BTreeMap<String, Vec<Fill>> = BTreeMap::new();
    for fill in fills {
        partitions
            .entry(fill.instrument.clone())
            .or_default()
            .push(fill);
    }
    for partition in partitions.values_mut() {
        partition.sort_by_key(|f| (f.executed_at(), f.row_index));
    }
    partitions
}

/// Reconcile a batch of fills into round-trip trades.
///
/// Pure: same fills and strategy always produce the same report. Partitions
/// are processed in instrument-name order, so output order is deterministic.
pub fn reconcile(fills: Vec<Fill>, strategy: &dyn MatchStrategy) -> PairingReport {
    let total = fills.len();
    let mut trades = Vec::new();
    let mut unmatched = Vec::new();

    for (instrument, partition) in group_fills(fills) {
        let matches = strategy.pair(&partition);
        debug!(
            "Paired {}: {} fills -> {} trades, {} unmatched",
            instrument,
            partition.len(),
            matches.pairs.len(),
            matches.unmatched.len()
        );
        for (a, b) in matches.pairs {
            trades.push(make_trade(&partition[a], &partition[b]));
        }
        for idx in matches.unmatched {
            unmatched.push(partition[idx].clone());
        }
    }

    debug!(
        "Reconciled {} fills: {} trades, {} unmatched",
        total,
        trades.len(),
        unmatched.len()
    );
    PairingReport { trades, unmatched }
}

/// Build one Trade from an opposite-side leg pair.
///
/// Entry is always the BUY leg's price and exit the SELL leg's, whichever
/// came first: a same-day option round trip may open with either leg. Lots
/// come from the BUY leg's quantity; the trade date from the earlier leg.
fn make_trade(first: &Fill, second: &Fill) -> Trade {
    let (buy, sell) = match first.side {
        Side::Buy => (first, second),
        Side::Sell => (second, first),
    };
    let lots = buy.quantity / CONTRACT_SIZE;
    let (pnl, outcome) = pnl::evaluate(buy.price, Some(sell.price), lots);

    Trade {
        id: uuid::Uuid::new_v4().to_string(),
        instrument: first.instrument.clone(),
        kind: InstrumentKind::classify(&first.instrument),
        entry_price: buy.price,
        exit_price: Some(sell.price),
        lots,
        date: first.date,
        pnl,
        outcome,
        notes: String::new(),
    }
}
