//! Grouped aggregation operator.
//!
//! Blocking: the whole input is consumed in `init()` before the first row
//! is produced. Groups are emitted in the order their key was first seen.

use crate::data::{ExprValue, Row};
use crate::error::QueryResult;
use crate::executor::{not_initialized, PhysicalOperator};
use crate::expression::{AggregationState, NamedAggregator, NamedExpression};
use indexmap::IndexMap;
use log::debug;
use std::vec;

pub struct AggregationOperator {
    input: Box<dyn PhysicalOperator>,
    aggregators: Vec<NamedAggregator>,
    group_by: Vec<NamedExpression>,
    output: Option<vec::IntoIter<ExprValue>>,
}

impl AggregationOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        aggregators: Vec<NamedAggregator>,
        group_by: Vec<NamedExpression>,
    ) -> Self {
        Self {
            input,
            aggregators,
            group_by,
            output: None,
        }
    }

    fn group_key(&self, row: &ExprValue) -> QueryResult<Vec<ExprValue>> {
        self.group_by.iter().map(|expr| expr.value_of(row)).collect()
    }

    fn aggregate(&mut self) -> QueryResult<Vec<ExprValue>> {
        let mut groups: IndexMap<Vec<ExprValue>, Vec<Box<dyn AggregationState>>> = IndexMap::new();
        while let Some(row) = self.input.next()? {
            let key = self.group_key(&row)?;
            let states = groups.entry(key).or_insert_with(|| {
                self.aggregators
                    .iter()
                    .map(|named| named.aggregator.create())
                    .collect()
            });
            for (named, state) in self.aggregators.iter().zip(states.iter_mut()) {
                named.aggregator.iterate(&row, state.as_mut())?;
            }
        }
        debug!("aggregation produced {} groups", groups.len());

        let mut rows = Vec::with_capacity(groups.len());
        for (key, states) in groups {
            let mut output = Row::new();
            for (expr, value) in self.group_by.iter().zip(key) {
                output.insert(expr.name_or_alias().to_string(), value);
            }
            for (named, state) in self.aggregators.iter().zip(&states) {
                output.insert(named.name.clone(), named.aggregator.terminate(state.as_ref())?);
            }
            rows.push(ExprValue::Tuple(output));
        }
        Ok(rows)
    }
}

impl PhysicalOperator for AggregationOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        let rows = self.aggregate()?;
        self.output = Some(rows.into_iter());
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        match &mut self.output {
            Some(rows) => Ok(rows.next()),
            None => Err(not_initialized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExprType;
    use crate::error::ErrorKind;
    use crate::executor::collect_rows;
    use crate::executor::testing::{int_rows, MockOperator};
    use crate::expression::Dsl;

    fn request(action: &str, response: i32) -> ExprValue {
        ExprValue::tuple([
            ("action", ExprValue::from(action)),
            ("response", ExprValue::from(response)),
        ])
    }

    #[test]
    fn test_avg_group_by() -> anyhow::Result<()> {
        let dsl = Dsl::default();
        let rows = vec![request("GET", 200), request("POST", 350), request("GET", 336)];
        let avg = dsl.named_aggregator("avg", Dsl::reference("response", ExprType::Integer))?;
        let group_by = vec![Dsl::named("action", Dsl::reference("action", ExprType::String))];

        let mut operator = AggregationOperator::new(MockOperator::boxed(rows), vec![avg], group_by);
        let result = collect_rows(&mut operator)?;
        assert_eq!(
            result,
            vec![
                ExprValue::tuple([
                    ("action", ExprValue::from("GET")),
                    ("avg(cast_to_double(response))", ExprValue::from(268.0)),
                ]),
                ExprValue::tuple([
                    ("action", ExprValue::from("POST")),
                    ("avg(cast_to_double(response))", ExprValue::from(350.0)),
                ]),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_sum_skips_missing_values() -> anyhow::Result<()> {
        let dsl = Dsl::default();
        let rows = int_rows("value", &[Some(1), None, Some(2), Some(3), None, Some(4)]);
        let sum = dsl.named_aggregator("sum", Dsl::reference("value", ExprType::Integer))?;
        let mut operator = AggregationOperator::new(MockOperator::boxed(rows), vec![sum], vec![]);
        assert_eq!(
            collect_rows(&mut operator)?,
            vec![ExprValue::tuple([("sum(value)", ExprValue::from(10))])]
        );
        Ok(())
    }

    #[test]
    fn test_sum_of_only_absent_values_is_null() -> anyhow::Result<()> {
        let dsl = Dsl::default();
        let mut rows = int_rows("value", &[None, None]);
        rows.push(ExprValue::tuple([("value", ExprValue::Null)]));
        let sum = dsl.named_aggregator("sum", Dsl::reference("value", ExprType::Integer))?;
        let mut operator = AggregationOperator::new(MockOperator::boxed(rows), vec![sum], vec![]);
        assert_eq!(
            collect_rows(&mut operator)?,
            vec![ExprValue::tuple([("sum(value)", ExprValue::Null)])]
        );
        Ok(())
    }

    #[test]
    fn test_empty_input_without_groups_emits_nothing() -> anyhow::Result<()> {
        let dsl = Dsl::default();
        let count = dsl.named_aggregator("count", Dsl::reference("value", ExprType::Integer))?;
        let mut operator = AggregationOperator::new(MockOperator::boxed(vec![]), vec![count], vec![]);
        assert!(collect_rows(&mut operator)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_incompatible_value_fails_at_iterate() -> anyhow::Result<()> {
        let dsl = Dsl::default();
        // Declared INTEGER, but the data holds a string
        let rows = vec![ExprValue::tuple([("value", ExprValue::from("abc"))])];
        let sum = dsl.named_aggregator("sum", Dsl::reference("value", ExprType::Integer))?;
        let mut operator = AggregationOperator::new(MockOperator::boxed(rows), vec![sum], vec![]);
        let err = operator.init().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExpressionEvaluation);
        assert_eq!(err.to_string(), "unexpected type [STRING] in sum aggregation");
        Ok(())
    }
}
