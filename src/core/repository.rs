//! Typed access to collections on top of a [`RecordStore`].

use serde_json::{Value, json};
use tracing::debug;

use super::records::Collection;
use super::{DateRange, LedgerError};
use crate::store::{Filter, RecordStore, Row, Select, StoreError};

pub fn to_row<T: Collection>(record: &T) -> Result<Row, LedgerError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(decode_error::<T>("record did not serialize to an object")),
        Err(e) => Err(decode_error::<T>(e)),
    }
}

pub fn from_row<T: Collection>(row: Row) -> Result<T, LedgerError> {
    serde_json::from_value(Value::Object(row)).map_err(decode_error::<T>)
}

fn decode_error<T: Collection>(message: impl ToString) -> LedgerError {
    LedgerError::Decode {
        table: T::TABLE,
        message: message.to_string(),
    }
}

/// Fetches every row whose date column lies in `range`, newest first.
///
/// Undated collections ignore the range.
pub fn fetch_range<T: Collection>(
    store: &dyn RecordStore,
    range: &DateRange,
) -> Result<Vec<T>, LedgerError> {
    let mut query = Select::from(T::TABLE);
    if let Some(column) = T::DATE_COLUMN {
        for filter in range.filters(column) {
            query = query.filter(filter);
        }
        query = query.order_by(column, true);
    }
    let rows = store.select(&query)?;
    debug!(table = T::TABLE, rows = rows.len(), "Decoding rows");
    rows.into_iter().map(from_row::<T>).collect()
}

pub fn fetch_all<T: Collection>(store: &dyn RecordStore) -> Result<Vec<T>, LedgerError> {
    fetch_range(store, &DateRange::unbounded())
}

pub fn get<T: Collection>(store: &dyn RecordStore, id: &str) -> Result<Option<T>, LedgerError> {
    let query = Select::from(T::TABLE).filter(Filter::Eq("id".into(), json!(id)));
    match store.select(&query)?.into_iter().next() {
        Some(row) => from_row(row).map(Some),
        None => Ok(None),
    }
}

pub fn insert<T: Collection>(store: &mut dyn RecordStore, record: &T) -> Result<(), LedgerError> {
    store.insert(T::TABLE, to_row(record)?)?;
    Ok(())
}

/// Overwrites every field of the stored row with the same id. `None` fields
/// are written as null, clearing what was stored.
pub fn update<T: Collection>(store: &mut dyn RecordStore, record: &T) -> Result<(), LedgerError> {
    store.update(T::TABLE, record.id(), to_row(record)?)?;
    Ok(())
}

pub fn upsert<T: Collection>(store: &mut dyn RecordStore, record: &T) -> Result<(), LedgerError> {
    store.upsert(T::TABLE, to_row(record)?)?;
    Ok(())
}

pub fn delete<T: Collection>(store: &mut dyn RecordStore, id: &str) -> Result<(), LedgerError> {
    store.delete(T::TABLE, id)?;
    Ok(())
}

/// Treats a missing table as an empty collection.
pub fn or_empty<T>(result: Result<Vec<T>, LedgerError>) -> Result<Vec<T>, LedgerError> {
    match result {
        Err(LedgerError::Store(StoreError::TableNotFound)) => Ok(Vec::new()),
        other => other,
    }
}
