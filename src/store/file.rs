use std::path::PathBuf;

use tracing::debug;

use super::{RecordStore, Row, Select, StoreError, row_id};

/// Store that keeps each table as a JSON array in `{base_dir}/{table}.json`.
///
/// A table without a file reads as empty once `base_dir` exists.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.base_dir.join(format!("{table}.json"))
    }

    fn load(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(StoreError::TableNotFound);
        }
        let data =
            std::fs::read_to_string(&path).map_err(|e| StoreError::Transient(e.to_string()))?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|e| StoreError::Permanent(e.to_string()))
    }

    fn load_or_empty(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        match self.load(table) {
            Err(StoreError::TableNotFound) => Ok(Vec::new()),
            other => other,
        }
    }

    fn save(&self, table: &str, rows: &[Row]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| StoreError::Permanent(e.to_string()))?;
        let data =
            serde_json::to_string_pretty(rows).map_err(|e| StoreError::Permanent(e.to_string()))?;
        debug!(table, rows = rows.len(), "Writing table file");
        std::fs::write(self.table_path(table), data)
            .map_err(|e| StoreError::Transient(e.to_string()))
    }
}

impl RecordStore for FileStore {
    fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        if !self.base_dir.is_dir() {
            return Err(StoreError::TableNotFound);
        }
        let rows = self.load_or_empty(&query.table)?;
        Ok(query.apply(&rows))
    }

    fn insert(&mut self, table: &str, row: Row) -> Result<(), StoreError> {
        let mut rows = self.load_or_empty(table)?;
        rows.push(row);
        self.save(table, &rows)
    }

    fn update(&mut self, table: &str, id: &str, changes: Row) -> Result<(), StoreError> {
        let mut rows = self.load(table)?;
        let row = rows
            .iter_mut()
            .find(|r| row_id(r) == Some(id))
            .ok_or(StoreError::RowNotFound)?;
        row.extend(changes);
        self.save(table, &rows)
    }

    fn delete(&mut self, table: &str, id: &str) -> Result<(), StoreError> {
        let mut rows = self.load(table)?;
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            return Err(StoreError::RowNotFound);
        }
        self.save(table, &rows)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}
