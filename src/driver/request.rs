//! JSON query request: inline tables plus the plan to run against them.

use crate::ast::UnresolvedPlan;
use crate::data::ExprType;
use crate::driver::json::row_from_json;
use crate::error::QueryResult;
use crate::storage::{MemoryStorage, MemoryTable};
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TableDefinition {
    pub schema: IndexMap<String, ExprType>,
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub tables: IndexMap<String, TableDefinition>,
    pub query: UnresolvedPlan,
}

impl QueryRequest {
    /// Load every declared table into a fresh in-memory storage.
    pub fn load_storage(&self) -> QueryResult<MemoryStorage> {
        let storage = MemoryStorage::new();
        for (name, table) in &self.tables {
            let rows = table
                .rows
                .iter()
                .map(|row| row_from_json(row, &table.schema))
                .collect::<QueryResult<Vec<_>>>()?;
            storage.add_table(MemoryTable::new(name.as_str(), table.schema.clone(), rows));
        }
        Ok(storage)
    }
}
