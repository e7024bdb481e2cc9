//! CSV export of the ledger and profit-and-loss statement.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::core::{LedgerEntry, ProfitAndLoss};

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "io error: {e}"),
            ExportError::Csv(e) => write!(f, "csv error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Csv(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e)
    }
}

#[derive(Serialize)]
struct LedgerRow<'a> {
    date: String,
    kind: &'static str,
    description: &'a str,
    amount: String,
    currency: &'static str,
    source: &'static str,
    id: &'a str,
}

#[derive(Serialize)]
struct StatementRow<'a> {
    section: &'static str,
    line: &'a str,
    amount: String,
}

/// Writes one row per ledger entry, in the order given.
pub fn write_ledger_csv<W: Write>(w: W, entries: &[LedgerEntry]) -> Result<(), ExportError> {
    let mut wrt = WriterBuilder::new().from_writer(w);
    for e in entries {
        wrt.serialize(LedgerRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            kind: e.kind.label(),
            description: &e.description,
            amount: format!("{:.2}", e.amount),
            currency: e.currency.code(),
            source: e.source,
            id: &e.id,
        })?;
    }
    wrt.flush()?;
    Ok(())
}

/// Writes the statement as `section,line,amount` rows, subtotals included.
pub fn write_pnl_csv<W: Write>(w: W, pnl: &ProfitAndLoss) -> Result<(), ExportError> {
    let mut wrt = WriterBuilder::new().from_writer(w);
    let mut line = |section: &'static str, label: &str, amount: f64| {
        wrt.serialize(StatementRow {
            section,
            line: label,
            amount: format!("{amount:.2}"),
        })
    };
    for (category, amount) in &pnl.revenue {
        line("Revenue", category.label(), *amount)?;
    }
    line("Revenue", "Total Revenue", pnl.total_revenue)?;
    for (category, amount) in &pnl.cost_of_goods {
        line("Cost of Goods Sold", category.label(), *amount)?;
    }
    line("Cost of Goods Sold", "Total COGS", pnl.total_cogs)?;
    line("Summary", "Gross Profit", pnl.gross_profit)?;
    for (category, amount) in &pnl.operating_expenses {
        line("Operating Expenses", category.label(), *amount)?;
    }
    line(
        "Operating Expenses",
        "Total Operating Expenses",
        pnl.total_operating_expenses,
    )?;
    line("Summary", "Net Profit", pnl.net_profit)?;
    wrt.flush()?;
    Ok(())
}
