use crate::data::ExprValue;
use crate::error::QueryResult;
use crate::expression::aggregation::AggregationState;

/// Number of present values. Never NULL.
#[derive(Debug, Default)]
pub struct CountState {
    count: i64,
}

impl CountState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AggregationState for CountState {
    fn update(&mut self, _value: &ExprValue) -> QueryResult<()> {
        self.count += 1;
        Ok(())
    }

    fn finalize(&self) -> QueryResult<ExprValue> {
        Ok(ExprValue::Long(self.count))
    }
}
