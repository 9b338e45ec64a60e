use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::expression::window::{CurrentRowWindowFrame, WindowState};
use crate::expression::Aggregator;

/// Aggregator re-evaluated over every row seen so far in the partition.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateWindowFunction {
    aggregator: Aggregator,
}

impl AggregateWindowFunction {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub(super) fn evaluate(
        &self,
        frame: &CurrentRowWindowFrame,
        state: &mut WindowState,
    ) -> QueryResult<ExprValue> {
        let WindowState::Aggregate(accumulator) = state else {
            return Err(QueryError::evaluation(format!(
                "invalid state for window function {}",
                self.aggregator
            )));
        };
        if frame.is_new_partition()? {
            *accumulator = None;
        }
        let accumulator = accumulator.get_or_insert_with(|| self.aggregator.create());
        self.aggregator.iterate(frame.current()?, accumulator.as_mut())?;
        self.aggregator.terminate(accumulator.as_ref())
    }
}
