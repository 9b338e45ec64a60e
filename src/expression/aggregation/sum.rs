use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::aggregation::AggregationState;

/// Running total that keeps the declared result type.
#[derive(Debug)]
pub struct SumState {
    return_type: ExprType,
    integral: i64,
    floating: f64,
    is_empty: bool,
}

impl SumState {
    pub fn new(return_type: ExprType) -> Self {
        Self {
            return_type,
            integral: 0,
            floating: 0.0,
            is_empty: true,
        }
    }
}

impl AggregationState for SumState {
    fn update(&mut self, value: &ExprValue) -> QueryResult<()> {
        match value {
            ExprValue::Byte(_) | ExprValue::Short(_) | ExprValue::Integer(_) | ExprValue::Long(_) => {
                let v = value.long_value()?;
                self.integral = self.integral.wrapping_add(v);
                self.floating += v as f64;
            }
            ExprValue::Float(_) | ExprValue::Double(_) => {
                self.floating += value.double_value()?;
            }
            other => {
                return Err(QueryError::evaluation(format!(
                    "unexpected type [{}] in sum aggregation",
                    other.expr_type()
                )))
            }
        }
        self.is_empty = false;
        Ok(())
    }

    fn finalize(&self) -> QueryResult<ExprValue> {
        if self.is_empty {
            return Ok(ExprValue::Null);
        }
        Ok(match self.return_type {
            ExprType::Integer => ExprValue::Integer(self.integral as i32),
            ExprType::Long => ExprValue::Long(self.integral),
            ExprType::Float => ExprValue::Float(self.floating as f32),
            _ => ExprValue::Double(self.floating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_sum() -> anyhow::Result<()> {
        let mut state = SumState::new(ExprType::Double);
        state.update(&ExprValue::from(1.5))?;
        state.update(&ExprValue::from(2.0))?;
        assert_eq!(state.finalize()?, ExprValue::from(3.5));
        Ok(())
    }

    #[test]
    fn test_empty_sum_is_null() -> anyhow::Result<()> {
        assert_eq!(SumState::new(ExprType::Integer).finalize()?, ExprValue::Null);
        Ok(())
    }
}
