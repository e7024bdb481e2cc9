//! Write operations that create ledger source rows.
//!
//! All validation happens before the first write. Multi-row operations are
//! not transactional: rows are written one after another.

use chrono::NaiveDate;
use tracing::info;

use super::records::{
    CENT_TOLERANCE, CashSale, CreditPurchase, CreditSale, CreditStatus, Currency, Deposit,
    Expense, ExpenseCategory, LEGACY_DEPOSIT_PAYMENT_PREFIX, PaymentPurpose, RevenueCategory,
    new_id,
};
use super::repository::{fetch_all, get, insert, or_empty, update};
use super::{LedgerError, ValidationError};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq)]
pub struct NewCashSale {
    pub date: NaiveDate,
    pub item: RevenueCategory,
    pub amount_due: f64,
    pub tendered: f64,
    pub currency: Currency,
    pub customer_name: Option<String>,
    pub description: Option<String>,
    /// Due date for the credit sale created from a shortfall.
    pub due_date: Option<NaiveDate>,
}

/// Rows written by [`record_cash_sale`].
#[derive(Debug, Clone, PartialEq)]
pub struct CashSaleReceipt {
    /// Absent when nothing was tendered.
    pub cash_sale: Option<CashSale>,
    /// Present when the tendered amount fell short.
    pub credit_sale: Option<CreditSale>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentMethod {
    Cash,
    Deposit {
        bank_name: String,
        reference_number: String,
        depositor_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: f64,
    pub currency: Currency,
    pub vendor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCreditPurchase {
    pub vendor_name: String,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub currency: Currency,
    pub purchase_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_positive(amount: f64) -> Result<(), ValidationError> {
    if amount > 0.0 && amount.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount)
    }
}

fn check_payment(amount: f64, balance: f64, settled: bool) -> Result<(), ValidationError> {
    require_positive(amount)?;
    if settled {
        return Err(ValidationError::AlreadyPaid);
    }
    if amount > balance + CENT_TOLERANCE {
        return Err(ValidationError::ExceedsBalance {
            balance,
            requested: amount,
        });
    }
    Ok(())
}

/// Returns `(paid, balance, settled)` after applying `amount`.
fn apply_payment(original: f64, paid: f64, amount: f64) -> (f64, f64, bool) {
    let paid = paid + amount;
    let balance = original - paid;
    if balance <= CENT_TOLERANCE {
        (original, 0.0, true)
    } else {
        (paid, balance, false)
    }
}

/// Records a cash sale. A shortfall becomes a pending credit sale for the customer.
pub fn record_cash_sale(
    store: &mut dyn RecordStore,
    sale: NewCashSale,
) -> Result<CashSaleReceipt, LedgerError> {
    require_positive(sale.amount_due)?;
    if sale.tendered < 0.0 || !sale.tendered.is_finite() {
        return Err(ValidationError::NegativeTender.into());
    }
    let collected = sale.tendered.min(sale.amount_due);
    let shortfall = sale.amount_due - collected;
    let customer = sale
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if shortfall > CENT_TOLERANCE && customer.is_none() {
        return Err(ValidationError::MissingField("customer name").into());
    }

    let credit_sale = if shortfall > CENT_TOLERANCE {
        let credit = CreditSale {
            id: new_id(),
            customer_name: customer.unwrap_or_default().to_string(),
            item: sale.item,
            original_amount: shortfall,
            paid_amount: 0.0,
            balance_due: shortfall,
            currency: sale.currency,
            issue_date: sale.date,
            due_date: sale.due_date,
            status: CreditStatus::Pending,
        };
        insert(store, &credit)?;
        info!(id = %credit.id, shortfall, "Recorded shortfall as credit sale");
        Some(credit)
    } else {
        None
    };

    let cash_sale = if collected > CENT_TOLERANCE {
        let cash = CashSale {
            id: new_id(),
            date: sale.date,
            item: sale.item,
            amount: collected,
            currency: sale.currency,
            customer_name: customer.map(str::to_string),
            credit_sale_id: credit_sale.as_ref().map(|c| c.id.clone()),
            description: sale.description,
            purpose: Some(PaymentPurpose::Regular),
        };
        insert(store, &cash)?;
        info!(id = %cash.id, amount = collected, "Recorded cash sale");
        Some(cash)
    } else {
        None
    };

    Ok(CashSaleReceipt {
        cash_sale,
        credit_sale,
    })
}

/// Records a payment against a credit sale and returns the updated sale.
pub fn record_credit_payment(
    store: &mut dyn RecordStore,
    credit_sale_id: &str,
    amount: f64,
    method: PaymentMethod,
    date: NaiveDate,
) -> Result<CreditSale, LedgerError> {
    require_positive(amount)?;
    if let PaymentMethod::Deposit {
        bank_name,
        reference_number,
        depositor_name,
    } = &method
    {
        require(bank_name, "bank name")?;
        require(reference_number, "reference number")?;
        require(depositor_name, "depositor name")?;
    }
    let mut sale: CreditSale = get(store, credit_sale_id)?
        .ok_or_else(|| ValidationError::UnknownCreditSale(credit_sale_id.to_string()))?;
    check_payment(amount, sale.balance_due, sale.is_settled())?;

    let description = format!("{LEGACY_DEPOSIT_PAYMENT_PREFIX} {}", sale.id);
    match method {
        PaymentMethod::Cash => {
            let cash = CashSale {
                id: new_id(),
                date,
                item: sale.item,
                amount,
                currency: sale.currency,
                customer_name: Some(sale.customer_name.clone()),
                credit_sale_id: Some(sale.id.clone()),
                description: Some(description),
                purpose: Some(PaymentPurpose::CreditPayment),
            };
            insert(store, &cash)?;
        }
        PaymentMethod::Deposit {
            bank_name,
            reference_number,
            depositor_name,
        } => {
            let deposit = Deposit {
                id: new_id(),
                date,
                amount,
                currency: sale.currency,
                bank_name,
                reference_number,
                depositor_name,
                description: Some(description),
                credit_sale_id: Some(sale.id.clone()),
                purpose: Some(PaymentPurpose::CreditPayment),
            };
            insert(store, &deposit)?;
        }
    }

    let (paid, balance, settled) = apply_payment(sale.original_amount, sale.paid_amount, amount);
    sale.paid_amount = paid;
    sale.balance_due = balance;
    if settled {
        sale.status = CreditStatus::Paid;
    }
    update(store, &sale)?;
    info!(id = %sale.id, amount, balance, "Recorded credit payment");
    Ok(sale)
}

pub fn record_expense(
    store: &mut dyn RecordStore,
    expense: NewExpense,
) -> Result<Expense, LedgerError> {
    require_positive(expense.amount)?;
    require(&expense.description, "description")?;
    let row = Expense {
        id: new_id(),
        date: expense.date,
        category: expense.category,
        description: expense.description,
        amount: expense.amount,
        currency: expense.currency,
        vendor_id: expense.vendor_id,
        from_cash_purchase: false,
    };
    insert(store, &row)?;
    info!(id = %row.id, category = %row.category, "Recorded expense");
    Ok(row)
}

pub fn record_credit_purchase(
    store: &mut dyn RecordStore,
    purchase: NewCreditPurchase,
) -> Result<CreditPurchase, LedgerError> {
    require_positive(purchase.amount)?;
    require(&purchase.vendor_name, "vendor name")?;
    require(&purchase.description, "description")?;
    let row = CreditPurchase {
        id: new_id(),
        vendor_name: purchase.vendor_name,
        description: purchase.description,
        category: purchase.category,
        original_amount: purchase.amount,
        paid_amount: 0.0,
        balance_due: purchase.amount,
        currency: purchase.currency,
        purchase_date: purchase.purchase_date,
        due_date: purchase.due_date,
        status: CreditStatus::Pending,
    };
    insert(store, &row)?;
    info!(id = %row.id, vendor = %row.vendor_name, "Recorded credit purchase");
    Ok(row)
}

/// Pays part of a credit purchase in cash, booking the payment as an expense.
pub fn record_purchase_payment(
    store: &mut dyn RecordStore,
    purchase_id: &str,
    amount: f64,
    date: NaiveDate,
) -> Result<CreditPurchase, LedgerError> {
    require_positive(amount)?;
    let mut purchase: CreditPurchase = get(store, purchase_id)?
        .ok_or_else(|| ValidationError::UnknownCreditPurchase(purchase_id.to_string()))?;
    check_payment(amount, purchase.balance_due, purchase.is_settled())?;

    let expense = Expense {
        id: new_id(),
        date,
        category: purchase.category,
        description: format!(
            "Payment to {} for {}",
            purchase.vendor_name, purchase.description
        ),
        amount,
        currency: purchase.currency,
        vendor_id: None,
        from_cash_purchase: true,
    };
    insert(store, &expense)?;

    let (paid, balance, settled) =
        apply_payment(purchase.original_amount, purchase.paid_amount, amount);
    purchase.paid_amount = paid;
    purchase.balance_due = balance;
    if settled {
        purchase.status = CreditStatus::Paid;
    }
    update(store, &purchase)?;
    info!(id = %purchase.id, amount, balance, "Recorded purchase payment");
    Ok(purchase)
}

/// Flags unpaid credit sales and purchases past their due date as overdue.
///
/// Returns the number of rows updated.
pub fn refresh_overdue(
    store: &mut dyn RecordStore,
    as_of: NaiveDate,
) -> Result<usize, LedgerError> {
    let past_due = |due: Option<NaiveDate>, status: CreditStatus| {
        status == CreditStatus::Pending && due.is_some_and(|d| d < as_of)
    };

    let mut updated = 0;
    let sales: Vec<CreditSale> = or_empty(fetch_all(store))?;
    for mut sale in sales {
        if !sale.is_settled() && past_due(sale.due_date, sale.status) {
            sale.status = CreditStatus::Overdue;
            update(store, &sale)?;
            updated += 1;
        }
    }
    let purchases: Vec<CreditPurchase> = or_empty(fetch_all(store))?;
    for mut purchase in purchases {
        if !purchase.is_settled() && past_due(purchase.due_date, purchase.status) {
            purchase.status = CreditStatus::Overdue;
            update(store, &purchase)?;
            updated += 1;
        }
    }
    info!(%as_of, updated, "Refreshed overdue statuses");
    Ok(updated)
}
