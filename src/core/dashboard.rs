//! Per-currency dashboard totals and recent activity.

use chrono::NaiveDate;
use serde::Serialize;

use super::fetch::SourceRows;
use super::ledger::{LedgerEntry, LedgerOptions, build_ledger};
use super::records::{Currency, PaymentPurpose};

/// Totals for one currency. Nothing is converted between currencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencySummary {
    pub currency: Currency,
    pub cash_sales: f64,
    pub credit_payments: f64,
    pub credit_issued: f64,
    pub deposits: f64,
    pub expenses: f64,
    pub outstanding_receivables: f64,
    pub outstanding_payables: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub totals: Vec<CurrencySummary>,
    pub overdue_credit_sales: usize,
    pub recent: Vec<LedgerEntry>,
}

impl Dashboard {
    pub fn summary(&self, currency: Currency) -> Option<&CurrencySummary> {
        self.totals.iter().find(|s| s.currency == currency)
    }
}

fn slot(totals: &mut [CurrencySummary], currency: Currency) -> &mut CurrencySummary {
    let idx = Currency::ALL.iter().position(|c| *c == currency).unwrap_or(0);
    &mut totals[idx]
}

pub fn build_dashboard(
    sources: &SourceRows,
    as_of: NaiveDate,
    recent_limit: usize,
    options: &LedgerOptions,
) -> Dashboard {
    let mut totals: Vec<CurrencySummary> = Currency::ALL
        .iter()
        .map(|c| CurrencySummary {
            currency: *c,
            ..Default::default()
        })
        .collect();

    for sale in &sources.cash_sales {
        let s = slot(&mut totals, sale.currency);
        match sale.purpose() {
            PaymentPurpose::Regular => s.cash_sales += sale.amount,
            PaymentPurpose::CreditPayment => s.credit_payments += sale.amount,
        }
    }
    for deposit in &sources.deposits {
        let s = slot(&mut totals, deposit.currency);
        s.deposits += deposit.amount;
        if deposit.purpose() == PaymentPurpose::CreditPayment {
            s.credit_payments += deposit.amount;
        }
    }
    for sale in &sources.credit_sales {
        let s = slot(&mut totals, sale.currency);
        s.credit_issued += sale.original_amount;
        if !sale.is_settled() {
            s.outstanding_receivables += sale.balance_due;
        }
    }
    for expense in &sources.expenses {
        slot(&mut totals, expense.currency).expenses += expense.amount;
    }
    for purchase in &sources.credit_purchases {
        if !purchase.is_settled() {
            slot(&mut totals, purchase.currency).outstanding_payables += purchase.balance_due;
        }
    }

    let overdue_credit_sales = sources
        .credit_sales
        .iter()
        .filter(|s| s.is_overdue(as_of))
        .count();
    let mut recent = build_ledger(sources, options);
    recent.truncate(recent_limit);

    Dashboard {
        as_of,
        totals,
        overdue_credit_sales,
        recent,
    }
}
