use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::expression::aggregation::AggregationState;

/// Arithmetic mean, always DOUBLE
#[derive(Debug, Default)]
pub struct AvgState {
    count: u64,
    total: f64,
}

impl AvgState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AggregationState for AvgState {
    fn update(&mut self, value: &ExprValue) -> QueryResult<()> {
        if !value.is_numeric() {
            return Err(QueryError::evaluation(format!(
                "unexpected type [{}] in avg aggregation",
                value.expr_type()
            )));
        }
        self.count += 1;
        self.total += value.double_value()?;
        Ok(())
    }

    fn finalize(&self) -> QueryResult<ExprValue> {
        if self.count == 0 {
            return Ok(ExprValue::Null);
        }
        Ok(ExprValue::Double(self.total / self.count as f64))
    }
}
