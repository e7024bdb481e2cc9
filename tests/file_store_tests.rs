use std::path::PathBuf;

use chrono::NaiveDate;
use hotel_ledger::core::repository::{delete, fetch_all, get, insert, update};
use hotel_ledger::core::{
    Currency, DateRange, ExpenseCategory, NewExpense, Vendor, fetch_sources, record_expense,
};
use hotel_ledger::store::{FileStore, RecordStore, Select, StoreError};

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("hotel-ledger-{}", uuid::Uuid::new_v4()))
}

#[test]
fn rows_survive_reopening() {
    let dir = temp_dir();
    let mut store = FileStore::new(&dir);
    let expense = record_expense(
        &mut store,
        NewExpense {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            category: ExpenseCategory::Maintenance,
            description: "Pool pump".into(),
            amount: 75.0,
            currency: Currency::Usd,
            vendor_id: None,
        },
    )
    .unwrap();
    assert!(dir.join("expenses.json").exists());

    let reopened = FileStore::new(&dir);
    let sources = fetch_sources(&reopened, &DateRange::unbounded()).unwrap();
    assert_eq!(sources.expenses, vec![expense]);
    assert!(sources.cash_sales.is_empty());
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn crud_on_reference_tables() {
    let dir = temp_dir();
    let mut store = FileStore::new(&dir);
    let mut vendor = Vendor {
        id: "v1".into(),
        name: "Juba Wholesale".into(),
        phone: None,
        email: None,
    };
    insert(&mut store, &vendor).unwrap();
    vendor.email = Some("orders@example.com".into());
    update(&mut store, &vendor).unwrap();
    let loaded: Vendor = get(&store, "v1").unwrap().unwrap();
    assert_eq!(loaded, vendor);

    delete::<Vendor>(&mut store, "v1").unwrap();
    assert!(fetch_all::<Vendor>(&store).unwrap().is_empty());
    assert_eq!(
        store.delete("vendors", "v1").unwrap_err(),
        StoreError::RowNotFound
    );
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_directory_is_reported() {
    let store = FileStore::new(temp_dir());
    assert_eq!(
        store.select(&Select::from("cash_sales")).unwrap_err(),
        StoreError::TableNotFound
    );
}
