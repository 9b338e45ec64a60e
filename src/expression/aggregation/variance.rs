use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::expression::aggregation::AggregationState;

/// Variance or standard deviation using Welford's online update.
#[derive(Debug)]
pub struct VarianceState {
    sample: bool,
    stddev: bool,
    count: u64,
    mean: f64,
    m2: f64,
}

impl VarianceState {
    /// `sample` selects the n-1 denominator, `stddev` takes the square root.
    pub fn new(sample: bool, stddev: bool) -> Self {
        Self {
            sample,
            stddev,
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }
}

impl AggregationState for VarianceState {
    fn update(&mut self, value: &ExprValue) -> QueryResult<()> {
        if !value.is_numeric() {
            return Err(QueryError::evaluation(format!(
                "unexpected type [{}] in variance aggregation",
                value.expr_type()
            )));
        }
        let x = value.double_value()?;
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        Ok(())
    }

    fn finalize(&self) -> QueryResult<ExprValue> {
        if self.count == 0 {
            return Ok(ExprValue::Null);
        }
        let variance = if self.sample {
            // Undefined for a single sample
            if self.count == 1 {
                return Ok(ExprValue::Null);
            }
            self.m2 / (self.count - 1) as f64
        } else {
            self.m2 / self.count as f64
        };
        let result = if self.stddev {
            variance.sqrt()
        } else {
            variance
        };
        Ok(ExprValue::Double(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(mut state: VarianceState, values: &[f64]) -> anyhow::Result<f64> {
        for v in values {
            state.update(&ExprValue::from(*v))?;
        }
        Ok(state.finalize()?.double_value()?)
    }

    #[test]
    fn test_population_and_sample() -> anyhow::Result<()> {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((feed(VarianceState::new(false, false), &values)? - 4.0).abs() < 1e-9);
        assert!((feed(VarianceState::new(false, true), &values)? - 2.0).abs() < 1e-9);
        assert!((feed(VarianceState::new(true, false), &values)? - 32.0 / 7.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_single_sample() -> anyhow::Result<()> {
        for stddev in [false, true] {
            let mut state = VarianceState::new(true, stddev);
            state.update(&ExprValue::from(3.0))?;
            assert_eq!(state.finalize()?, ExprValue::Null);
        }
        assert_eq!(feed(VarianceState::new(false, false), &[3.0])?, 0.0);
        Ok(())
    }
}
