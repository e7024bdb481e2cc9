//! Adapters for the remote row store that owns all business records.

pub mod file;
pub mod rest;
pub mod retry;

pub use file::FileStore;
pub use rest::RestStore;
pub use retry::RetryingStore;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;

/// A single row as stored remotely: a flat JSON object.
pub type Row = serde_json::Map<String, Value>;

/// Represents errors that can occur when talking to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested table does not exist.
    TableNotFound,
    /// No row carries the requested identifier.
    RowNotFound,
    /// A failure that may succeed when retried (network, 5xx).
    Transient(String),
    /// A failure that will not go away on its own.
    Permanent(String),
}

impl StoreError {
    /// Returns `true` if the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TableNotFound => write!(f, "table not found"),
            StoreError::RowNotFound => write!(f, "row not found"),
            StoreError::Transient(e) => write!(f, "transient store error: {e}"),
            StoreError::Permanent(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Row predicate understood by every store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    /// Inclusive lower bound.
    Gte(String, Value),
    /// Inclusive upper bound.
    Lte(String, Value),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::Lte(c, _) => c,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(self.column()) else {
            return false;
        };
        match self {
            Filter::Eq(_, expected) => compare_values(actual, expected) == Some(Ordering::Equal),
            Filter::Gte(_, bound) => matches!(
                compare_values(actual, bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::Lte(_, bound) => matches!(
                compare_values(actual, bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Sort order on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// A select statement against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
        });
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Applies filters and ordering to rows held locally.
    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        let mut out: Vec<Row> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        if let Some(order) = &self.order {
            out.sort_by(|a, b| {
                let ord = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                if order.descending { ord.reverse() } else { ord }
            });
        }
        out
    }
}

/// Strings compare lexicographically (ISO dates sort correctly), numbers numerically.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

/// Abstraction over the hosted relational store.
pub trait RecordStore {
    /// Returns all rows of `query.table` matching the filters, in the requested order.
    fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError>;
    /// Inserts a new row.
    fn insert(&mut self, table: &str, row: Row) -> Result<(), StoreError>;
    /// Merges `changes` into the row with the given id.
    fn update(&mut self, table: &str, id: &str, changes: Row) -> Result<(), StoreError>;
    /// Removes the row with the given id.
    fn delete(&mut self, table: &str, id: &str) -> Result<(), StoreError>;
    /// Inserts the row, or replaces the existing row with the same id.
    fn upsert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        let id = row_id(&row)
            .ok_or_else(|| StoreError::Permanent("row has no id".into()))?
            .to_string();
        match self.update(table, &id, row.clone()) {
            Err(StoreError::RowNotFound | StoreError::TableNotFound) => self.insert(table, row),
            other => other,
        }
    }
}

/// In-memory store. Tables are created on first insert.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes an empty table visible to `select`.
    pub fn create_table(&mut self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }
}

impl RecordStore for MemoryStore {
    fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        match self.tables.get(&query.table) {
            Some(rows) => Ok(query.apply(rows)),
            None => Err(StoreError::TableNotFound),
        }
    }

    fn insert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        self.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    fn update(&mut self, table: &str, id: &str, changes: Row) -> Result<(), StoreError> {
        let rows = self
            .tables
            .get_mut(table)
            .ok_or(StoreError::TableNotFound)?;
        let row = rows
            .iter_mut()
            .find(|r| row_id(r) == Some(id))
            .ok_or(StoreError::RowNotFound)?;
        row.extend(changes);
        Ok(())
    }

    fn delete(&mut self, table: &str, id: &str) -> Result<(), StoreError> {
        let rows = self
            .tables
            .get_mut(table)
            .ok_or(StoreError::TableNotFound)?;
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            Err(StoreError::RowNotFound)
        } else {
            Ok(())
        }
    }
}
