//! Executor layer for query execution.
//!
//! This module implements the Volcano-style iterator model for executing
//! physical plans. Each operator produces rows one at a time via `next()`,
//! pulling from its inputs on demand. Operators are stateful and single
//! use: a plan is built, initialized, drained and dropped.

use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};

pub mod aggregate;
pub mod filter;
pub mod nested_loop_join;
pub mod projection;
pub mod rename;
pub mod scan;
pub mod sort;
pub mod window;

pub use aggregate::AggregationOperator;
pub use filter::FilterOperator;
pub use nested_loop_join::NestedLoopJoinOperator;
pub use projection::ProjectOperator;
pub use rename::RenameOperator;
pub use scan::TableScanOperator;
pub use sort::SortOperator;
pub use window::WindowOperator;

/// Trait for all physical operators
pub trait PhysicalOperator: Send {
    /// Initialize the operator and its inputs. Must be called before `next()`.
    fn init(&mut self) -> QueryResult<()>;

    /// Get the next row. Returns None once the operator is exhausted.
    fn next(&mut self) -> QueryResult<Option<ExprValue>>;
}

/// Initialize `operator` and pull every row out of it.
pub fn collect_rows(operator: &mut dyn PhysicalOperator) -> QueryResult<Vec<ExprValue>> {
    operator.init()?;
    let mut rows = Vec::new();
    while let Some(row) = operator.next()? {
        rows.push(row);
    }
    Ok(rows)
}

pub(crate) fn not_initialized() -> QueryError {
    QueryError::evaluation("operator not initialized, call init() first")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Mock operator producing a fixed set of rows
    pub struct MockOperator {
        rows: Vec<ExprValue>,
        current: usize,
        initialized: bool,
    }

    impl MockOperator {
        pub fn new(rows: Vec<ExprValue>) -> Self {
            Self {
                rows,
                current: 0,
                initialized: false,
            }
        }

        pub fn boxed(rows: Vec<ExprValue>) -> Box<dyn PhysicalOperator> {
            Box::new(Self::new(rows))
        }
    }

    impl PhysicalOperator for MockOperator {
        fn init(&mut self) -> QueryResult<()> {
            self.initialized = true;
            self.current = 0;
            Ok(())
        }

        fn next(&mut self) -> QueryResult<Option<ExprValue>> {
            if !self.initialized {
                return Err(not_initialized());
            }
            let row = self.rows.get(self.current).cloned();
            self.current += 1;
            Ok(row)
        }
    }

    /// Rows with a single integer field; `None` leaves the field out.
    pub fn int_rows(field: &str, values: &[Option<i32>]) -> Vec<ExprValue> {
        values
            .iter()
            .map(|value| match value {
                Some(v) => ExprValue::tuple([(field, ExprValue::from(*v))]),
                None => ExprValue::tuple(Vec::<(String, ExprValue)>::new()),
            })
            .collect()
    }
}
