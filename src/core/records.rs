//! Typed records for every collection kept in the remote store.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Amounts closer than this are considered equal.
pub const CENT_TOLERANCE: f64 = 0.005;

/// Description prefix used by legacy cash rows recording a credit payment.
pub const LEGACY_CASH_PAYMENT_PREFIX: &str = "Payment for Credit";
/// Description prefix used by legacy deposit rows recording a credit payment.
pub const LEGACY_DEPOSIT_PAYMENT_PREFIX: &str = "Payment for Credit Sale ID:";

/// Generates an identifier for a new row.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A collection (table) in the remote store.
pub trait Collection: Serialize + DeserializeOwned {
    /// Table name.
    const TABLE: &'static str;
    /// Column used for date-range queries, if the collection is dated.
    const DATE_COLUMN: Option<&'static str> = None;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "SSP")]
    Ssp,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Ssp];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ssp => "SSP",
        }
    }

    /// Formats an amount with two decimals and the currency marker.
    pub fn format(self, amount: f64) -> String {
        match self {
            Currency::Usd => format!("${amount:.2}"),
            Currency::Ssp => format!("SSP {amount:.2}"),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "SSP" => Ok(Currency::Ssp),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Hotel revenue streams. Unknown or missing labels fall into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum RevenueCategory {
    Rooms,
    Restaurant,
    MainBar,
    ConferenceHall,
    Laundry,
    SwimmingPool,
    #[default]
    Other,
}

impl RevenueCategory {
    pub const ALL: [RevenueCategory; 7] = [
        RevenueCategory::Rooms,
        RevenueCategory::Restaurant,
        RevenueCategory::MainBar,
        RevenueCategory::ConferenceHall,
        RevenueCategory::Laundry,
        RevenueCategory::SwimmingPool,
        RevenueCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RevenueCategory::Rooms => "Rooms",
            RevenueCategory::Restaurant => "Restaurant",
            RevenueCategory::MainBar => "Main Bar",
            RevenueCategory::ConferenceHall => "Conference Hall",
            RevenueCategory::Laundry => "Laundry",
            RevenueCategory::SwimmingPool => "Swimming Pool",
            RevenueCategory::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }
}

impl From<Option<String>> for RevenueCategory {
    fn from(label: Option<String>) -> Self {
        label.map(|l| Self::from_label(&l)).unwrap_or_default()
    }
}

impl From<RevenueCategory> for String {
    fn from(c: RevenueCategory) -> Self {
        c.label().to_string()
    }
}

impl fmt::Display for RevenueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where an expense category lands on the profit-and-loss statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseClass {
    CostOfGoods,
    Operating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ExpenseCategory {
    FoodSupplies,
    BeverageSupplies,
    Salaries,
    Utilities,
    Maintenance,
    Rent,
    Marketing,
    Transport,
    OfficeSupplies,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 10] = [
        ExpenseCategory::FoodSupplies,
        ExpenseCategory::BeverageSupplies,
        ExpenseCategory::Salaries,
        ExpenseCategory::Utilities,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Rent,
        ExpenseCategory::Marketing,
        ExpenseCategory::Transport,
        ExpenseCategory::OfficeSupplies,
        ExpenseCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::FoodSupplies => "Food Supplies",
            ExpenseCategory::BeverageSupplies => "Beverage Supplies",
            ExpenseCategory::Salaries => "Salaries",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::OfficeSupplies => "Office Supplies",
            ExpenseCategory::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }

    pub fn class(self) -> ExpenseClass {
        match self {
            ExpenseCategory::FoodSupplies | ExpenseCategory::BeverageSupplies => {
                ExpenseClass::CostOfGoods
            }
            _ => ExpenseClass::Operating,
        }
    }
}

impl From<Option<String>> for ExpenseCategory {
    fn from(label: Option<String>) -> Self {
        label.map(|l| Self::from_label(&l)).unwrap_or_default()
    }
}

impl From<ExpenseCategory> for String {
    fn from(c: ExpenseCategory) -> Self {
        c.label().to_string()
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreditStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

/// Explicit discriminant written on cash sales and deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    #[default]
    Regular,
    CreditPayment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashSale {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub item: RevenueCategory,
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Credit sale this row pays, or the credit sale created for its shortfall.
    #[serde(default)]
    pub credit_sale_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub purpose: Option<PaymentPurpose>,
}

impl CashSale {
    /// Explicit purpose, or the legacy description prefix for rows without one.
    pub fn purpose(&self) -> PaymentPurpose {
        resolve_purpose(
            self.purpose,
            self.description.as_deref(),
            LEGACY_CASH_PAYMENT_PREFIX,
        )
    }
}

impl Collection for CashSale {
    const TABLE: &'static str = "cash_sales";
    const DATE_COLUMN: Option<&'static str> = Some("date");

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditSale {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub item: RevenueCategory,
    pub original_amount: f64,
    pub paid_amount: f64,
    pub balance_due: f64,
    pub currency: Currency,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: CreditStatus,
}

impl CreditSale {
    pub fn is_settled(&self) -> bool {
        self.status == CreditStatus::Paid || self.balance_due <= CENT_TOLERANCE
    }

    /// Unpaid and either flagged overdue or past its due date.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.is_settled()
            && (self.status == CreditStatus::Overdue || self.due_date.is_some_and(|d| d < as_of))
    }
}

impl Collection for CreditSale {
    const TABLE: &'static str = "credit_sales";
    const DATE_COLUMN: Option<&'static str> = Some("issue_date");

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: Currency,
    pub bank_name: String,
    pub reference_number: String,
    pub depositor_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub credit_sale_id: Option<String>,
    #[serde(default)]
    pub purpose: Option<PaymentPurpose>,
}

impl Deposit {
    pub fn purpose(&self) -> PaymentPurpose {
        resolve_purpose(
            self.purpose,
            self.description.as_deref(),
            LEGACY_DEPOSIT_PAYMENT_PREFIX,
        )
    }
}

impl Collection for Deposit {
    const TABLE: &'static str = "deposits";
    const DATE_COLUMN: Option<&'static str> = Some("date");

    fn id(&self) -> &str {
        &self.id
    }
}

fn resolve_purpose(
    explicit: Option<PaymentPurpose>,
    description: Option<&str>,
    legacy_prefix: &str,
) -> PaymentPurpose {
    match explicit {
        Some(p) => p,
        None if description.is_some_and(|d| d.starts_with(legacy_prefix)) => {
            PaymentPurpose::CreditPayment
        }
        None => PaymentPurpose::Regular,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: f64,
    pub currency: Currency,
    #[serde(default)]
    pub vendor_id: Option<String>,
    /// Set when the expense was generated by paying for a purchase.
    #[serde(default)]
    pub from_cash_purchase: bool,
}

impl Collection for Expense {
    const TABLE: &'static str = "expenses";
    const DATE_COLUMN: Option<&'static str> = Some("date");

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPurchase {
    pub id: String,
    pub vendor_name: String,
    pub description: String,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub original_amount: f64,
    pub paid_amount: f64,
    pub balance_due: f64,
    pub currency: Currency,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: CreditStatus,
}

impl CreditPurchase {
    pub fn is_settled(&self) -> bool {
        self.status == CreditStatus::Paid || self.balance_due <= CENT_TOLERANCE
    }
}

impl Collection for CreditPurchase {
    const TABLE: &'static str = "credit_purchases";
    const DATE_COLUMN: Option<&'static str> = Some("purchase_date");

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    pub name: String,
    pub account_number: String,
    pub currency: Currency,
}

impl Collection for Bank {
    const TABLE: &'static str = "banks";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Collection for Customer {
    const TABLE: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Collection for Vendor {
    const TABLE: &'static str = "vendors";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub currency: Currency,
}

impl Collection for InventoryItem {
    const TABLE: &'static str = "inventory";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub id: String,
    pub account_name: String,
    pub amount: f64,
    pub currency: Currency,
    pub as_of: NaiveDate,
}

impl Collection for OpeningBalance {
    const TABLE: &'static str = "opening_balances";
    const DATE_COLUMN: Option<&'static str> = Some("as_of");

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_labels_fall_back_to_other() {
        assert_eq!(RevenueCategory::from_label("Spa"), RevenueCategory::Other);
        assert_eq!(RevenueCategory::from_label("main bar"), RevenueCategory::MainBar);
        assert_eq!(ExpenseCategory::from_label(""), ExpenseCategory::Other);
    }

    #[test]
    fn categories_decode_from_stored_labels() {
        let sale: CashSale = serde_json::from_value(json!({
            "id": "c1",
            "date": "2024-01-05",
            "item": null,
            "amount": 10.0,
            "currency": "SSP"
        }))
        .unwrap();
        assert_eq!(sale.item, RevenueCategory::Other);
        assert_eq!(sale.currency, Currency::Ssp);
        assert_eq!(sale.purpose(), PaymentPurpose::Regular);

        let value = serde_json::to_value(ExpenseCategory::OfficeSupplies).unwrap();
        assert_eq!(value, json!("Office Supplies"));
    }

    #[test]
    fn explicit_purpose_overrides_description() {
        let deposit = Deposit {
            id: "d1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount: 5.0,
            currency: Currency::Usd,
            bank_name: "KCB".into(),
            reference_number: "r".into(),
            depositor_name: "front desk".into(),
            description: Some("Payment for Credit Sale ID: x".into()),
            credit_sale_id: None,
            purpose: Some(PaymentPurpose::Regular),
        };
        assert_eq!(deposit.purpose(), PaymentPurpose::Regular);
    }

    #[test]
    fn cost_of_goods_classes() {
        let cogs: Vec<_> = ExpenseCategory::ALL
            .into_iter()
            .filter(|c| c.class() == ExpenseClass::CostOfGoods)
            .collect();
        assert_eq!(
            cogs,
            vec![ExpenseCategory::FoodSupplies, ExpenseCategory::BeverageSupplies]
        );
    }
}
