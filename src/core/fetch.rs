//! Sequential loading of the ledger source collections.

use tracing::info;

use super::records::{CashSale, CreditPurchase, CreditSale, Deposit, Expense};
use super::repository::fetch_range;
use super::{DateRange, LedgerError};
use crate::store::RecordStore;

/// Raw rows of every collection that feeds the ledger.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SourceRows {
    pub cash_sales: Vec<CashSale>,
    pub credit_sales: Vec<CreditSale>,
    pub deposits: Vec<Deposit>,
    pub expenses: Vec<Expense>,
    pub credit_purchases: Vec<CreditPurchase>,
}

impl SourceRows {
    pub fn len(&self) -> usize {
        self.cash_sales.len()
            + self.credit_sales.len()
            + self.deposits.len()
            + self.expenses.len()
            + self.credit_purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads all source collections within `range`, one query after another.
///
/// The first failing query aborts the whole fetch.
pub fn fetch_sources(
    store: &dyn RecordStore,
    range: &DateRange,
) -> Result<SourceRows, LedgerError> {
    info!(%range, "Fetching ledger sources");
    let rows = SourceRows {
        cash_sales: fetch_range(store, range)?,
        credit_sales: fetch_range(store, range)?,
        deposits: fetch_range(store, range)?,
        expenses: fetch_range(store, range)?,
        credit_purchases: fetch_range(store, range)?,
    };
    info!(rows = rows.len(), "Fetched ledger sources");
    Ok(rows)
}
