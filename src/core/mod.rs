//! Domain records, ledger aggregation and the write operations that feed it.

pub mod dashboard;
pub mod fetch;
pub mod ledger;
pub mod pagination;
pub mod payments;
pub mod pnl;
pub mod range;
pub mod records;
pub mod repository;
pub mod screen;

pub use dashboard::{CurrencySummary, Dashboard, build_dashboard};
pub use fetch::{SourceRows, fetch_sources};
pub use ledger::{EntryKind, LedgerEntry, LedgerOptions, build_ledger, merge_chronological};
pub use pagination::{DEFAULT_PAGE_SIZE, Paginator};
pub use payments::{
    CashSaleReceipt, NewCashSale, NewCreditPurchase, NewExpense, PaymentMethod,
    record_cash_sale, record_credit_payment, record_credit_purchase, record_expense,
    record_purchase_payment, refresh_overdue,
};
pub use pnl::{ProfitAndLoss, profit_and_loss};
pub use range::{DateRange, ParseError};
pub use records::{
    Bank, CashSale, Collection, CreditPurchase, CreditSale, CreditStatus, Currency, Customer,
    Deposit, Expense, ExpenseCategory, ExpenseClass, InventoryItem, OpeningBalance,
    PaymentPurpose, RevenueCategory, Vendor,
};
pub use screen::{LedgerScreen, LoadState, ProfitAndLossScreen, RefreshTicket};

use crate::store::StoreError;

/// Errors raised before any write when input is not acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The amount provided is not positive.
    NonPositiveAmount,
    /// The tendered amount is negative.
    NegativeTender,
    /// A required field was left empty.
    MissingField(&'static str),
    /// No credit sale carries the given id.
    UnknownCreditSale(String),
    /// No credit purchase carries the given id.
    UnknownCreditPurchase(String),
    /// The credit has no balance left to pay.
    AlreadyPaid,
    /// The payment is larger than the remaining balance.
    ExceedsBalance { balance: f64, requested: f64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NonPositiveAmount => write!(f, "amount must be positive"),
            ValidationError::NegativeTender => write!(f, "tendered amount cannot be negative"),
            ValidationError::MissingField(field) => write!(f, "{field} is required"),
            ValidationError::UnknownCreditSale(id) => write!(f, "credit sale {id} not found"),
            ValidationError::UnknownCreditPurchase(id) => {
                write!(f, "credit purchase {id} not found")
            }
            ValidationError::AlreadyPaid => write!(f, "balance is already settled"),
            ValidationError::ExceedsBalance { balance, requested } => write!(
                f,
                "payment of {requested:.2} exceeds balance due of {balance:.2}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error for fetch, aggregation and write operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    Store(StoreError),
    /// A row could not be decoded into its record type.
    Decode { table: &'static str, message: String },
    Validation(ValidationError),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Store(e) => write!(f, "store error: {e}"),
            LedgerError::Decode { table, message } => {
                write!(f, "invalid row in {table}: {message}")
            }
            LedgerError::Validation(e) => write!(f, "validation failed: {e}"),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Store(e) => Some(e),
            LedgerError::Validation(e) => Some(e),
            LedgerError::Decode { .. } => None,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        LedgerError::Store(e)
    }
}

impl From<ValidationError> for LedgerError {
    fn from(e: ValidationError) -> Self {
        LedgerError::Validation(e)
    }
}
