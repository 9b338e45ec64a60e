//! Leaf operator over rows held by a storage table.

use crate::data::ExprValue;
use crate::error::QueryResult;
use crate::executor::{not_initialized, PhysicalOperator};
use log::trace;
use std::sync::Arc;

/// Sequential scan of an in-memory row set
pub struct TableScanOperator {
    table_name: String,
    rows: Arc<Vec<ExprValue>>,
    position: usize,
    initialized: bool,
}

impl TableScanOperator {
    pub fn new(table_name: impl Into<String>, rows: Arc<Vec<ExprValue>>) -> Self {
        Self {
            table_name: table_name.into(),
            rows,
            position: 0,
            initialized: false,
        }
    }
}

impl PhysicalOperator for TableScanOperator {
    fn init(&mut self) -> QueryResult<()> {
        trace!("scan table {}", self.table_name);
        self.position = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        if !self.initialized {
            return Err(not_initialized());
        }
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }
}
