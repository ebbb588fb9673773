use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trade_journal::data::storage::SqliteTradeStore;
use trade_journal::engine::pairing::GreedyAdjacent;
use trade_journal::journal::{ImportReview, Journal, ManualTrade};
use trade_journal::models::trade::Trade;
use trade_journal::utils::export;

#[derive(Parser)]
#[command(
    name = "trade-journal",
    about = "Reconcile broker exports into a trade journal",
    version
)]
struct Cli {
    /// Path to the journal database.
    #[arg(long, default_value = "journal.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a broker export (CSV or JSON) and preview the reconciled trades.
    Import {
        /// Export file to reconcile.
        file: PathBuf,
        /// Merge the reconciled trades into the journal. Without this flag
        /// the import is previewed and discarded.
        #[arg(long)]
        commit: bool,
    },
    /// Journal a manually entered trade.
    Add {
        #[arg(long)]
        instrument: String,
        #[arg(long)]
        entry: f64,
        /// Exit price; omit to journal an open position.
        #[arg(long)]
        exit: Option<f64>,
        #[arg(long, default_value_t = 1.0)]
        lots: f64,
        /// Trade date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List journaled trades.
    List,
    /// Show aggregate statistics.
    Stats,
    /// Export the journal to a CSV file.
    Export {
        out: PathBuf,
        /// Also write a key-value statistics report to this path.
        #[arg(long)]
        stats: Option<PathBuf>,
    },
    /// Delete a trade by id.
    Delete { id: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = SqliteTradeStore::open(&cli.db)
        .with_context(|| format!("opening journal database {}", cli.db.display()))?;
    let mut journal = Journal::new(store);

    match cli.command {
        Command::Import { file, commit } => {
            let review = journal
                .review_import(&file, &GreedyAdjacent)
                .with_context(|| format!("importing {}", file.display()))?;
            print_review(&review);

            if commit {
                let written = journal.confirm_import(review)?;
                println!("\nMerged {} trades into the journal.", written);
            } else {
                let dropped = review.discard();
                println!(
                    "\nPreview only: {} trades discarded. Re-run with --commit to merge.",
                    dropped
                );
            }
        }
        Command::Add {
            instrument,
            entry,
            exit,
            lots,
            date,
            notes,
        } => {
            let trade = journal.add_manual(ManualTrade {
                instrument,
                entry_price: entry,
                exit_price: exit,
                lots,
                date,
                notes,
            })?;
            println!("Journaled {} ({})", trade.instrument, trade.id);
            print_trades(&[trade]);
        }
        Command::List => {
            let trades = journal.trades()?;
            if trades.is_empty() {
                println!("Journal is empty.");
            } else {
                print_trades(&trades);
            }
        }
        Command::Stats => {
            let stats = journal.stats()?;
            println!("Total trades : {}", stats.total_trades);
            println!("Wins         : {}", stats.wins);
            println!("Losses       : {}", stats.losses);
            println!("Breakeven    : {}", stats.breakeven);
            println!("Net P&L      : {:.2}", stats.net_pnl);
            println!("Win rate     : {:.1}%", stats.win_rate_pct);
        }
        Command::Export { out, stats } => {
            let trades = journal.trades()?;
            export::write_trades_csv(&trades, &out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Exported {} trades to {}", trades.len(), out.display());

            if let Some(stats_path) = stats {
                let summary = journal.stats()?;
                export::write_stats_csv(&summary, &stats_path)
                    .with_context(|| format!("writing {}", stats_path.display()))?;
                println!("Wrote statistics to {}", stats_path.display());
            }
        }
        Command::Delete { id } => {
            journal.delete(&id)?;
            println!("Deleted trade {}", id);
        }
    }

    Ok(())
}

fn print_review(review: &ImportReview) {
    println!("Reconciled trades:");
    print_trades(&review.trades);

    if !review.unmatched.is_empty() {
        println!("\nUnmatched fills ({}):", review.unmatched.len());
        for fill in &review.unmatched {
            println!(
                "  {} {} {} @ {} qty {} (row {})",
                fill.date, fill.time, fill.side, fill.price, fill.quantity, fill.row_index
            );
        }
    }

    if !review.skipped.is_empty() {
        println!("\nSkipped rows ({}):", review.skipped.len());
        for skipped in &review.skipped {
            println!("  row {}: {}", skipped.row, skipped.reason);
        }
    }
}

fn print_trades(trades: &[Trade]) {
    println!(
        "{:<12} {:<24} {:<11} {:>9} {:>9} {:>6} {:>10}  {}",
        "Date", "Instrument", "Class", "Entry", "Exit", "Lots", "P&L", "Result"
    );
    for t in trades {
        let exit = t
            .exit_price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<24} {:<11} {:>9.2} {:>9} {:>6.2} {:>10.2}  {}",
            t.date.to_string(),
            t.instrument,
            t.kind.as_str(),
            t.entry_price,
            exit,
            t.lots,
            t.pnl,
            t.outcome.as_str()
        );
    }
}
