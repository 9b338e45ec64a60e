//! In-memory storage used by the CLI and tests.

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::executor::{PhysicalOperator, TableScanOperator};
use crate::storage::{StorageEngine, Table};
use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable table of tuple rows
#[derive(Debug)]
pub struct MemoryTable {
    name: String,
    field_types: IndexMap<String, ExprType>,
    rows: Arc<Vec<ExprValue>>,
}

impl MemoryTable {
    pub fn new(
        name: impl Into<String>,
        field_types: IndexMap<String, ExprType>,
        rows: Vec<ExprValue>,
    ) -> Self {
        Self {
            name: name.into(),
            field_types,
            rows: Arc::new(rows),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_types(&self) -> &IndexMap<String, ExprType> {
        &self.field_types
    }

    fn scan(&self) -> Box<dyn PhysicalOperator> {
        Box::new(TableScanOperator::new(self.name.clone(), Arc::clone(&self.rows)))
    }
}

/// Table registry guarded by a read-write lock so tables can be added
/// while other threads plan queries.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Arc<MemoryTable>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any table of the same name.
    pub fn add_table(&self, table: MemoryTable) {
        debug!("register table {} with {} rows", table.name, table.row_count());
        self.tables
            .write()
            .insert(table.name.clone(), Arc::new(table));
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl StorageEngine for MemoryStorage {
    fn get_table(&self, name: &str) -> QueryResult<Arc<dyn Table>> {
        let table: Arc<dyn Table> = self
            .tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| QueryError::semantic(format!("no such table: {}", name)))?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn logs() -> MemoryTable {
        let mut schema = IndexMap::new();
        schema.insert("response".to_string(), ExprType::Integer);
        MemoryTable::new(
            "logs",
            schema,
            vec![
                ExprValue::tuple([("response", ExprValue::from(200))]),
                ExprValue::tuple([("response", ExprValue::from(404))]),
            ],
        )
    }

    #[test]
    fn test_scan_table() -> anyhow::Result<()> {
        let storage = MemoryStorage::new();
        storage.add_table(logs());

        let table = storage.get_table("logs")?;
        assert_eq!(table.name(), "logs");
        assert_eq!(table.field_types().get("response"), Some(&ExprType::Integer));

        let mut scan = table.scan();
        scan.init()?;
        let mut count = 0;
        while scan.next()?.is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
        Ok(())
    }

    #[test]
    fn test_unknown_table() {
        let storage = MemoryStorage::new();
        let err = storage.get_table("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SemanticCheck);
        assert_eq!(err.to_string(), "no such table: nope");
    }

    #[test]
    fn test_table_names_sorted() {
        let storage = MemoryStorage::new();
        storage.add_table(MemoryTable::new("b", IndexMap::new(), vec![]));
        storage.add_table(MemoryTable::new("a", IndexMap::new(), vec![]));
        assert_eq!(storage.table_names(), vec!["a", "b"]);
    }
}
