//! Normalization of source rows into one chronological ledger.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fetch::SourceRows;
use super::records::{
    CashSale, Collection, CreditPurchase, CreditSale, Currency, Deposit, Expense, PaymentPurpose,
};

/// Type tag shown for every ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    CashSale,
    CreditPaymentCash,
    CreditIssued,
    Deposit,
    CreditPaymentDeposit,
    Expense,
    CreditPurchase,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::CashSale => "Cash Sale",
            EntryKind::CreditPaymentCash => "Credit Payment (Cash)",
            EntryKind::CreditIssued => "Credit Issued",
            EntryKind::Deposit => "Deposit",
            EntryKind::CreditPaymentDeposit => "Credit Payment (Deposit)",
            EntryKind::Expense => "Expense",
            EntryKind::CreditPurchase => "Credit Purchase",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only projection of one source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub kind: EntryKind,
    pub amount: f64,
    pub currency: Currency,
    /// Table the entry was read from.
    pub source: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerOptions {
    /// Show every expense in this currency instead of its own.
    pub expense_currency_override: Option<Currency>,
}

impl From<&CashSale> for LedgerEntry {
    fn from(sale: &CashSale) -> Self {
        let kind = match sale.purpose() {
            PaymentPurpose::CreditPayment => EntryKind::CreditPaymentCash,
            PaymentPurpose::Regular => EntryKind::CashSale,
        };
        let description = match sale.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => match &sale.customer_name {
                Some(name) => format!("{} ({name})", sale.item),
                None => sale.item.label().to_string(),
            },
        };
        Self {
            id: sale.id.clone(),
            date: sale.date,
            description,
            kind,
            amount: sale.amount,
            currency: sale.currency,
            source: CashSale::TABLE,
        }
    }
}

impl From<&CreditSale> for LedgerEntry {
    fn from(sale: &CreditSale) -> Self {
        Self {
            id: sale.id.clone(),
            date: sale.issue_date,
            description: format!("Credit sale to {} ({})", sale.customer_name, sale.item),
            kind: EntryKind::CreditIssued,
            amount: sale.original_amount,
            currency: sale.currency,
            source: CreditSale::TABLE,
        }
    }
}

impl From<&Deposit> for LedgerEntry {
    fn from(deposit: &Deposit) -> Self {
        let kind = match deposit.purpose() {
            PaymentPurpose::CreditPayment => EntryKind::CreditPaymentDeposit,
            PaymentPurpose::Regular => EntryKind::Deposit,
        };
        let description = match deposit.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => format!(
                "Deposit to {} by {} (ref {})",
                deposit.bank_name, deposit.depositor_name, deposit.reference_number
            ),
        };
        Self {
            id: deposit.id.clone(),
            date: deposit.date,
            description,
            kind,
            amount: deposit.amount,
            currency: deposit.currency,
            source: Deposit::TABLE,
        }
    }
}

impl From<&Expense> for LedgerEntry {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            date: expense.date,
            description: format!("{}: {}", expense.category, expense.description),
            kind: EntryKind::Expense,
            amount: expense.amount,
            currency: expense.currency,
            source: Expense::TABLE,
        }
    }
}

impl From<&CreditPurchase> for LedgerEntry {
    fn from(purchase: &CreditPurchase) -> Self {
        Self {
            id: purchase.id.clone(),
            date: purchase.purchase_date,
            description: format!(
                "Credit purchase from {}: {}",
                purchase.vendor_name, purchase.description
            ),
            kind: EntryKind::CreditPurchase,
            amount: purchase.original_amount,
            currency: purchase.currency,
            source: CreditPurchase::TABLE,
        }
    }
}

/// Normalizes every source row, in fetch order, without sorting.
pub fn normalize(sources: &SourceRows, options: &LedgerOptions) -> Vec<LedgerEntry> {
    let mut entries = Vec::with_capacity(sources.len());
    entries.extend(sources.cash_sales.iter().map(LedgerEntry::from));
    entries.extend(sources.credit_sales.iter().map(LedgerEntry::from));
    entries.extend(sources.deposits.iter().map(LedgerEntry::from));
    entries.extend(sources.expenses.iter().map(|e| {
        let mut entry = LedgerEntry::from(e);
        if let Some(currency) = options.expense_currency_override {
            entry.currency = currency;
        }
        entry
    }));
    entries.extend(sources.credit_purchases.iter().map(LedgerEntry::from));
    entries
}

/// Stable sort by date, newest first. Equal dates keep their input order.
pub fn merge_chronological(mut entries: Vec<LedgerEntry>) -> Vec<LedgerEntry> {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

/// Builds the unified ledger timeline.
pub fn build_ledger(sources: &SourceRows, options: &LedgerOptions) -> Vec<LedgerEntry> {
    merge_chronological(normalize(sources, options))
}
