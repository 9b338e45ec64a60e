use crate::data::ExprValue;
use crate::error::QueryResult;
use crate::expression::aggregation::AggregationState;
use std::cmp::Ordering;

/// Smallest or largest value seen, in the value's own type.
#[derive(Debug)]
pub struct MinMaxState {
    keep: Ordering,
    current: Option<ExprValue>,
}

impl MinMaxState {
    pub fn min() -> Self {
        Self {
            keep: Ordering::Less,
            current: None,
        }
    }

    pub fn max() -> Self {
        Self {
            keep: Ordering::Greater,
            current: None,
        }
    }
}

impl AggregationState for MinMaxState {
    fn update(&mut self, value: &ExprValue) -> QueryResult<()> {
        let replace = match &self.current {
            None => true,
            Some(current) => value.compare(current)? == self.keep,
        };
        if replace {
            self.current = Some(value.clone());
        }
        Ok(())
    }

    fn finalize(&self) -> QueryResult<ExprValue> {
        Ok(self.current.clone().unwrap_or(ExprValue::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_strings() -> anyhow::Result<()> {
        let mut min = MinMaxState::min();
        let mut max = MinMaxState::max();
        for name in ["bob", "alice", "carol"] {
            min.update(&ExprValue::from(name))?;
            max.update(&ExprValue::from(name))?;
        }
        assert_eq!(min.finalize()?, ExprValue::from("alice"));
        assert_eq!(max.finalize()?, ExprValue::from("carol"));
        Ok(())
    }
}
