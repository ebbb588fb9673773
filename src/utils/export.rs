use std::path::Path;

use crate::errors::AppError;
use crate::models::stats::JournalStats;
use crate::models::trade::Trade;

/// Write the trade list to a CSV file.
pub fn write_trades_csv(trades: &[Trade], path: &Path) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create CSV: {}", e)))?;

    wtr.write_record([
        "Id",
        "Instrument",
        "Class",
        "Date",
        "Entry Price",
        "Exit Price",
        "Lots",
        "P&L",
        "Result",
        "Notes",
    ])
    .map_err(|e| AppError::FileWrite(e.to_string()))?;

    for t in trades {
        let exit = t
            .exit_price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_default();
        wtr.write_record([
            t.id.as_str(),
            t.instrument.as_str(),
            t.kind.as_str(),
            &t.date.format("%Y-%m-%d").to_string(),
            &format!("{:.2}", t.entry_price),
            &exit,
            &format!("{:.2}", t.lots),
            &format!("{:.2}", t.pnl),
            t.outcome.as_str(),
            t.notes.as_str(),
        ])
        .map_err(|e| AppError::FileWrite(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}

/// Write aggregate statistics as a key-value CSV report.
pub fn write_stats_csv(stats: &JournalStats, path: &Path) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create CSV: {}", e)))?;

    wtr.write_record(["Metric", "Value"])
        .map_err(|e| AppError::FileWrite(e.to_string()))?;

    let rows: Vec<(&str, String)> = vec![
        ("Total Trades", stats.total_trades.to_string()),
        ("Wins", stats.wins.to_string()),
        ("Losses", stats.losses.to_string()),
        ("Breakeven", stats.breakeven.to_string()),
        ("Net P&L", format!("{:.2}", stats.net_pnl)),
        ("Win Rate %", format!("{:.1}", stats.win_rate_pct)),
    ];

    for (name, value) in &rows {
        wtr.write_record([*name, value.as_str()])
            .map_err(|e| AppError::FileWrite(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}
