use chrono::NaiveDate;
use hotel_ledger::core::repository::{fetch_all, get};
use hotel_ledger::core::{
    CashSale, CreditPurchase, CreditSale, CreditStatus, Currency, DateRange, Deposit, EntryKind,
    Expense, ExpenseCategory, LedgerError, LedgerOptions, NewCashSale, NewCreditPurchase,
    NewExpense, PaymentMethod, PaymentPurpose, RevenueCategory, build_ledger, fetch_sources,
    profit_and_loss, record_cash_sale, record_credit_payment, record_credit_purchase,
    record_expense, record_purchase_payment, refresh_overdue,
};
use hotel_ledger::core::ValidationError;
use hotel_ledger::store::MemoryStore;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for table in ["cash_sales", "credit_sales", "deposits", "expenses", "credit_purchases"] {
        store.create_table(table);
    }
    store
}

fn sale(amount_due: f64, tendered: f64, customer: Option<&str>) -> NewCashSale {
    NewCashSale {
        date: day(2),
        item: RevenueCategory::ConferenceHall,
        amount_due,
        tendered,
        currency: Currency::Usd,
        customer_name: customer.map(Into::into),
        description: None,
        due_date: Some(day(20)),
    }
}

#[test]
fn shortfall_creates_linked_credit_sale() {
    let mut store = store();
    let receipt = record_cash_sale(&mut store, sale(300.0, 120.0, Some("Unity Church"))).unwrap();
    let cash = receipt.cash_sale.unwrap();
    let credit = receipt.credit_sale.unwrap();
    assert_eq!(cash.amount, 120.0);
    assert_eq!(credit.balance_due, 180.0);
    assert_eq!(credit.status, CreditStatus::Pending);
    assert_eq!(cash.credit_sale_id.as_deref(), Some(credit.id.as_str()));

    let stored: CreditSale = get(&store, &credit.id).unwrap().unwrap();
    assert_eq!(stored, credit);

    // Revenue is the full amount: cash part plus credit part.
    let sources = fetch_sources(&store, &DateRange::unbounded()).unwrap();
    let pnl = profit_and_loss(&sources, Currency::Usd, &DateRange::unbounded());
    assert_eq!(pnl.revenue_for(RevenueCategory::ConferenceHall), 300.0);
}

#[test]
fn nothing_tendered_writes_only_credit() {
    let mut store = store();
    let receipt = record_cash_sale(&mut store, sale(80.0, 0.0, Some("Guest"))).unwrap();
    assert!(receipt.cash_sale.is_none());
    assert_eq!(receipt.credit_sale.unwrap().original_amount, 80.0);
    assert!(fetch_all::<CashSale>(&store).unwrap().is_empty());
}

#[test]
fn overpayment_records_amount_due() {
    let mut store = store();
    let receipt = record_cash_sale(&mut store, sale(45.0, 50.0, None)).unwrap();
    assert_eq!(receipt.cash_sale.unwrap().amount, 45.0);
    assert!(receipt.credit_sale.is_none());
}

#[test]
fn shortfall_without_customer_is_rejected() {
    let mut store = store();
    let err = record_cash_sale(&mut store, sale(100.0, 10.0, Some("  "))).unwrap_err();
    assert_eq!(
        err,
        LedgerError::Validation(ValidationError::MissingField("customer name"))
    );
    assert!(fetch_all::<CashSale>(&store).unwrap().is_empty());
    assert!(fetch_all::<CreditSale>(&store).unwrap().is_empty());
}

#[test]
fn payment_exceeding_balance_writes_nothing() {
    let mut store = store();
    let credit = record_cash_sale(&mut store, sale(100.0, 0.0, Some("Guest")))
        .unwrap()
        .credit_sale
        .unwrap();
    let err = record_credit_payment(&mut store, &credit.id, 150.0, PaymentMethod::Cash, day(3))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::ExceedsBalance { .. })
    ));
    assert!(fetch_all::<CashSale>(&store).unwrap().is_empty());
    let unchanged: CreditSale = get(&store, &credit.id).unwrap().unwrap();
    assert_eq!(unchanged.balance_due, 100.0);
}

#[test]
fn unknown_credit_sale_is_rejected() {
    let mut store = store();
    let err =
        record_credit_payment(&mut store, "nope", 5.0, PaymentMethod::Cash, day(3)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::Validation(ValidationError::UnknownCreditSale("nope".into()))
    );
}

#[test]
fn deposit_payments_settle_credit() {
    let mut store = store();
    let credit = record_cash_sale(&mut store, sale(100.0, 0.0, Some("Guest")))
        .unwrap()
        .credit_sale
        .unwrap();
    let deposit = |amount| {
        (
            amount,
            PaymentMethod::Deposit {
                bank_name: "Equity Bank".into(),
                reference_number: "TRX-7".into(),
                depositor_name: "Guest".into(),
            },
        )
    };
    let (amount, method) = deposit(40.0);
    let partial = record_credit_payment(&mut store, &credit.id, amount, method, day(4)).unwrap();
    assert_eq!(partial.balance_due, 60.0);
    assert_eq!(partial.status, CreditStatus::Pending);

    let paid = record_credit_payment(&mut store, &credit.id, 60.0, PaymentMethod::Cash, day(5))
        .unwrap();
    assert_eq!(paid.balance_due, 0.0);
    assert_eq!(paid.paid_amount, 100.0);
    assert_eq!(paid.status, CreditStatus::Paid);

    let (amount, method) = deposit(1.0);
    let err = record_credit_payment(&mut store, &credit.id, amount, method, day(6)).unwrap_err();
    assert_eq!(err, LedgerError::Validation(ValidationError::AlreadyPaid));

    let deposits = fetch_all::<Deposit>(&store).unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].purpose, Some(PaymentPurpose::CreditPayment));
    assert_eq!(deposits[0].credit_sale_id.as_deref(), Some(credit.id.as_str()));

    let sources = fetch_sources(&store, &DateRange::unbounded()).unwrap();
    let kinds: Vec<_> = build_ledger(&sources, &LedgerOptions::default())
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            EntryKind::CreditPaymentCash,
            EntryKind::CreditPaymentDeposit,
            EntryKind::CreditIssued
        ]
    );
    // Payments do not add revenue on top of the credit sale.
    let pnl = profit_and_loss(&sources, Currency::Usd, &DateRange::unbounded());
    assert_eq!(pnl.total_revenue, 100.0);
}

#[test]
fn deposit_requires_bank_details() {
    let mut store = store();
    let credit = record_cash_sale(&mut store, sale(10.0, 0.0, Some("Guest")))
        .unwrap()
        .credit_sale
        .unwrap();
    let method = PaymentMethod::Deposit {
        bank_name: String::new(),
        reference_number: "r".into(),
        depositor_name: "d".into(),
    };
    let err = record_credit_payment(&mut store, &credit.id, 5.0, method, day(3)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::Validation(ValidationError::MissingField("bank name"))
    );
}

#[test]
fn expenses_and_purchase_payments() {
    let mut store = store();
    let err = record_expense(
        &mut store,
        NewExpense {
            date: day(1),
            category: ExpenseCategory::Rent,
            description: "May rent".into(),
            amount: -5.0,
            currency: Currency::Ssp,
            vendor_id: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, LedgerError::Validation(ValidationError::NonPositiveAmount));

    let purchase = record_credit_purchase(
        &mut store,
        NewCreditPurchase {
            vendor_name: "Juba Wholesale".into(),
            description: "Flour and rice".into(),
            category: ExpenseCategory::FoodSupplies,
            amount: 500.0,
            currency: Currency::Ssp,
            purchase_date: day(1),
            due_date: Some(day(15)),
        },
    )
    .unwrap();
    let updated = record_purchase_payment(&mut store, &purchase.id, 200.0, day(7)).unwrap();
    assert_eq!(updated.balance_due, 300.0);

    let expenses = fetch_all::<Expense>(&store).unwrap();
    assert_eq!(expenses.len(), 1);
    assert!(expenses[0].from_cash_purchase);
    assert_eq!(expenses[0].category, ExpenseCategory::FoodSupplies);

    let sources = fetch_sources(&store, &DateRange::unbounded()).unwrap();
    let pnl = profit_and_loss(&sources, Currency::Ssp, &DateRange::unbounded());
    assert_eq!(pnl.total_cogs, 200.0);
}

#[test]
fn refresh_overdue_flags_past_due_credits() {
    let mut store = store();
    let credit = record_cash_sale(&mut store, sale(50.0, 0.0, Some("Guest")))
        .unwrap()
        .credit_sale
        .unwrap();
    let settled = record_cash_sale(&mut store, sale(20.0, 0.0, Some("Other")))
        .unwrap()
        .credit_sale
        .unwrap();
    record_credit_payment(&mut store, &settled.id, 20.0, PaymentMethod::Cash, day(3)).unwrap();
    let purchase = record_credit_purchase(
        &mut store,
        NewCreditPurchase {
            vendor_name: "Nile Breweries".into(),
            description: "Crates".into(),
            category: ExpenseCategory::BeverageSupplies,
            amount: 90.0,
            currency: Currency::Usd,
            purchase_date: day(1),
            due_date: Some(day(10)),
        },
    )
    .unwrap();

    assert_eq!(refresh_overdue(&mut store, day(8)).unwrap(), 0);
    assert_eq!(refresh_overdue(&mut store, day(25)).unwrap(), 2);
    let credit: CreditSale = get(&store, &credit.id).unwrap().unwrap();
    assert_eq!(credit.status, CreditStatus::Overdue);
    let settled: CreditSale = get(&store, &settled.id).unwrap().unwrap();
    assert_eq!(settled.status, CreditStatus::Paid);
    let purchase: CreditPurchase = get(&store, &purchase.id).unwrap().unwrap();
    assert_eq!(purchase.status, CreditStatus::Overdue);
    assert_eq!(refresh_overdue(&mut store, day(25)).unwrap(), 0);
}
