use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::expression::window::WindowDefinition;
use crate::expression::Expression;

/// Frame made of the current row plus the row before it.
///
/// Input must already be ordered by partition keys and then sort keys.
#[derive(Debug)]
pub struct CurrentRowWindowFrame {
    definition: WindowDefinition,
    previous: Option<ExprValue>,
    current: Option<ExprValue>,
}

impl CurrentRowWindowFrame {
    pub fn new(definition: WindowDefinition) -> Self {
        Self {
            definition,
            previous: None,
            current: None,
        }
    }

    pub fn definition(&self) -> &WindowDefinition {
        &self.definition
    }

    /// Advance to the next row.
    pub fn load(&mut self, row: ExprValue) {
        self.previous = self.current.take();
        self.current = Some(row);
    }

    pub fn current(&self) -> QueryResult<&ExprValue> {
        self.current
            .as_ref()
            .ok_or_else(|| QueryError::evaluation("window frame has no current row"))
    }

    /// True for the first row, or when the partition key differs from the
    /// previous row's.
    pub fn is_new_partition(&self) -> QueryResult<bool> {
        let Some(previous) = &self.previous else {
            return Ok(true);
        };
        let partition_by = &self.definition.partition_by;
        Ok(evaluate(partition_by.iter(), previous)? != evaluate(partition_by.iter(), self.current()?)?)
    }

    /// True when the sort key differs from the previous row's.
    pub fn is_sort_key_changed(&self) -> QueryResult<bool> {
        let Some(previous) = &self.previous else {
            return Ok(false);
        };
        let sort_keys = || self.definition.sort_list.iter().map(|(_, expr)| expr);
        Ok(evaluate(sort_keys(), previous)? != evaluate(sort_keys(), self.current()?)?)
    }
}

fn evaluate<'a>(
    exprs: impl Iterator<Item = &'a Expression>,
    row: &ExprValue,
) -> QueryResult<Vec<ExprValue>> {
    exprs.map(|expr| expr.value_of(row)).collect()
}
