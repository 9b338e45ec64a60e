//! Storage collaborator contracts.
//!
//! The core never reads data itself. A `StorageEngine` hands out tables,
//! and each table produces the leaf scan operator of a physical plan.

pub mod memory;

pub use memory::{MemoryStorage, MemoryTable};

use crate::data::ExprType;
use crate::error::QueryResult;
use crate::executor::{AggregationOperator, PhysicalOperator};
use crate::expression::{NamedAggregator, NamedExpression};
use indexmap::IndexMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Catalog of tables
pub trait StorageEngine: Send + Sync {
    /// Look up a table; unknown names are a semantic error.
    fn get_table(&self, name: &str) -> QueryResult<Arc<dyn Table>>;
}

pub trait Table: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Declared field types in schema order
    fn field_types(&self) -> &IndexMap<String, ExprType>;

    /// Operator producing every row of the table.
    fn scan(&self) -> Box<dyn PhysicalOperator>;

    /// Operator producing the aggregated rows of the table. Tables able to
    /// aggregate natively override this; the default folds a plain scan.
    fn scan_with_aggregation(
        &self,
        aggregators: Vec<NamedAggregator>,
        group_by: Vec<NamedExpression>,
    ) -> Box<dyn PhysicalOperator> {
        Box::new(AggregationOperator::new(self.scan(), aggregators, group_by))
    }
}
