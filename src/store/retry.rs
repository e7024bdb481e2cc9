use std::cell::RefCell;
use std::thread::sleep;
use std::time::Duration;

use tracing::warn;

use super::{RecordStore, Row, Select, StoreError};

/// Wrapper that retries transient store failures with exponential backoff.
///
/// The delay starts at `base_delay` and doubles after each failed attempt,
/// up to `max_retries` retries. Permanent errors are returned immediately.
pub struct RetryingStore<S> {
    inner: RefCell<S>,
    max_retries: u32,
    base_delay: Duration,
}

impl<S> RetryingStore<S> {
    pub fn new(inner: S, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner: RefCell::new(inner),
            max_retries,
            base_delay,
        }
    }

    /// Unwraps the underlying store.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    fn with_retry<T, F>(&self, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut(&mut S) -> Result<T, StoreError>,
    {
        let mut attempt = 0;
        loop {
            let result = op(&mut self.inner.borrow_mut());
            match result {
                Ok(val) => return Ok(val),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let factor = 2f64.powi(attempt as i32);
                    let delay = self.base_delay.mul_f64(factor);
                    warn!(attempt, ?delay, error = %e, "Retrying store operation");
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: RecordStore> RecordStore for RetryingStore<S> {
    fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        self.with_retry(|inner| inner.select(query))
    }

    fn insert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        self.with_retry(|inner| inner.insert(table, row.clone()))
    }

    fn update(&mut self, table: &str, id: &str, changes: Row) -> Result<(), StoreError> {
        self.with_retry(|inner| inner.update(table, id, changes.clone()))
    }

    fn delete(&mut self, table: &str, id: &str) -> Result<(), StoreError> {
        self.with_retry(|inner| inner.delete(table, id))
    }

    fn upsert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        self.with_retry(|inner| inner.upsert(table, row.clone()))
    }
}
