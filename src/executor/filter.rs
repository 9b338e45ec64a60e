//! Filter operator implementation.
//!
//! Pulls rows from its input until one satisfies the condition. A NULL or
//! MISSING condition value does not match and is not an error.

use crate::data::ExprValue;
use crate::error::QueryResult;
use crate::executor::{not_initialized, PhysicalOperator};
use crate::expression::Expression;

pub struct FilterOperator {
    input: Box<dyn PhysicalOperator>,
    condition: Expression,
    initialized: bool,
}

impl FilterOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, condition: Expression) -> Self {
        Self {
            input,
            condition,
            initialized: false,
        }
    }
}

impl PhysicalOperator for FilterOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        if !self.initialized {
            return Err(not_initialized());
        }
        while let Some(row) = self.input.next()? {
            if self.condition.value_of(&row)?.is_true() {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}
