//! Profit-and-loss aggregation per currency.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::fetch::SourceRows;
use super::records::{Currency, ExpenseCategory, ExpenseClass, PaymentPurpose, RevenueCategory};
use super::DateRange;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitAndLoss {
    pub currency: Currency,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Every revenue category in taxonomy order, zero when empty.
    pub revenue: Vec<(RevenueCategory, f64)>,
    pub cost_of_goods: Vec<(ExpenseCategory, f64)>,
    pub operating_expenses: Vec<(ExpenseCategory, f64)>,
    pub total_revenue: f64,
    pub total_cogs: f64,
    pub gross_profit: f64,
    pub total_operating_expenses: f64,
    pub net_profit: f64,
}

impl ProfitAndLoss {
    pub fn revenue_for(&self, category: RevenueCategory) -> f64 {
        lookup(&self.revenue, category)
    }

    pub fn expense_for(&self, category: ExpenseCategory) -> f64 {
        match category.class() {
            ExpenseClass::CostOfGoods => lookup(&self.cost_of_goods, category),
            ExpenseClass::Operating => lookup(&self.operating_expenses, category),
        }
    }
}

fn lookup<K: PartialEq>(buckets: &[(K, f64)], key: K) -> f64 {
    buckets
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(0.0)
}

fn add<K: PartialEq>(buckets: &mut [(K, f64)], key: K, amount: f64) {
    if let Some((_, total)) = buckets.iter_mut().find(|(k, _)| *k == key) {
        *total += amount;
    }
}

/// Buckets cash sales, credit sales and expenses of one currency within `range`.
///
/// Credit sales count at their original amount on their issue date. Cash
/// sales that settle a credit are excluded so the revenue is not counted twice.
pub fn profit_and_loss(
    sources: &SourceRows,
    currency: Currency,
    range: &DateRange,
) -> ProfitAndLoss {
    let mut revenue: Vec<(RevenueCategory, f64)> =
        RevenueCategory::ALL.iter().map(|c| (*c, 0.0)).collect();
    let mut cost_of_goods: Vec<(ExpenseCategory, f64)> = Vec::new();
    let mut operating_expenses: Vec<(ExpenseCategory, f64)> = Vec::new();
    for category in ExpenseCategory::ALL {
        match category.class() {
            ExpenseClass::CostOfGoods => cost_of_goods.push((category, 0.0)),
            ExpenseClass::Operating => operating_expenses.push((category, 0.0)),
        }
    }

    for sale in &sources.cash_sales {
        if sale.currency != currency
            || !range.contains(sale.date)
            || sale.purpose() == PaymentPurpose::CreditPayment
        {
            continue;
        }
        add(&mut revenue, sale.item, sale.amount);
    }
    for sale in &sources.credit_sales {
        if sale.currency != currency || !range.contains(sale.issue_date) {
            continue;
        }
        add(&mut revenue, sale.item, sale.original_amount);
    }
    for expense in &sources.expenses {
        if expense.currency != currency || !range.contains(expense.date) {
            continue;
        }
        match expense.category.class() {
            ExpenseClass::CostOfGoods => add(&mut cost_of_goods, expense.category, expense.amount),
            ExpenseClass::Operating => {
                add(&mut operating_expenses, expense.category, expense.amount)
            }
        }
    }

    let total_revenue: f64 = revenue.iter().map(|(_, v)| v).sum();
    let total_cogs: f64 = cost_of_goods.iter().map(|(_, v)| v).sum();
    let gross_profit = total_revenue - total_cogs;
    let total_operating_expenses: f64 = operating_expenses.iter().map(|(_, v)| v).sum();
    let net_profit = gross_profit - total_operating_expenses;
    debug!(%currency, total_revenue, net_profit, "Computed profit and loss");

    ProfitAndLoss {
        currency,
        start: range.start,
        end: range.end,
        revenue,
        cost_of_goods,
        operating_expenses,
        total_revenue,
        total_cogs,
        gross_profit,
        total_operating_expenses,
        net_profit,
    }
}
