//! Aggregate functions.
//!
//! An `Aggregator` is an immutable expression node describing the
//! computation. The running state lives in a separate `AggregationState`
//! created per group by `Aggregator::create`, so one compiled aggregator can
//! serve any number of groups and executions.

pub mod avg;
pub mod count;
pub mod min_max;
pub mod sum;
pub mod variance;

use crate::data::{ExprType, ExprValue};
use crate::error::QueryResult;
use crate::expression::function::operators::ordered_types;
use crate::expression::function::{FunctionBuilder, FunctionRepository};
use crate::expression::Expression;
use std::collections::HashSet;
use std::fmt;

pub use avg::AvgState;
pub use count::CountState;
pub use min_max::MinMaxState;
pub use sum::SumState;
pub use variance::VarianceState;

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    Avg,
    Sum,
    Count,
    Min,
    Max,
    VarSamp,
    VarPop,
    StddevSamp,
    StddevPop,
}

/// Map a user supplied aggregate name to the registered one.
/// Matching is case-insensitive; `variance`, `stddev` and `std` are aliases
/// of the population variants.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "avg" => Some("avg"),
        "sum" => Some("sum"),
        "count" => Some("count"),
        "min" => Some("min"),
        "max" => Some("max"),
        "var_samp" => Some("var_samp"),
        "var_pop" | "variance" => Some("var_pop"),
        "stddev_samp" => Some("stddev_samp"),
        "stddev_pop" | "stddev" | "std" => Some("stddev_pop"),
        _ => None,
    }
}

pub(crate) fn register(repository: &mut FunctionRepository) {
    let aggregate = |kind, return_type| FunctionBuilder::Aggregate { kind, return_type };

    repository.register(
        "avg",
        vec![ExprType::Double],
        aggregate(AggregationKind::Avg, ExprType::Double),
    );
    for ty in [
        ExprType::Integer,
        ExprType::Long,
        ExprType::Float,
        ExprType::Double,
    ] {
        repository.register("sum", vec![ty], aggregate(AggregationKind::Sum, ty));
    }
    for ty in ExprType::core_types() {
        repository.register(
            "count",
            vec![*ty],
            aggregate(AggregationKind::Count, ExprType::Long),
        );
    }
    for ty in ordered_types() {
        repository.register("min", vec![ty], aggregate(AggregationKind::Min, ty));
        repository.register("max", vec![ty], aggregate(AggregationKind::Max, ty));
    }
    for (name, kind) in [
        ("var_samp", AggregationKind::VarSamp),
        ("var_pop", AggregationKind::VarPop),
        ("stddev_samp", AggregationKind::StddevSamp),
        ("stddev_pop", AggregationKind::StddevPop),
    ] {
        repository.register(name, vec![ExprType::Double], aggregate(kind, ExprType::Double));
    }
}

/// Accumulator for one group
pub trait AggregationState: Send + fmt::Debug {
    /// Fold one present value into the state
    fn update(&mut self, value: &ExprValue) -> QueryResult<()>;

    /// Final value of the aggregation
    fn finalize(&self) -> QueryResult<ExprValue>;
}

/// Skips values already folded into the wrapped state.
#[derive(Debug)]
pub struct DistinctState {
    seen: HashSet<ExprValue>,
    inner: Box<dyn AggregationState>,
}

impl DistinctState {
    pub fn new(inner: Box<dyn AggregationState>) -> Self {
        Self {
            seen: HashSet::new(),
            inner,
        }
    }
}

impl AggregationState for DistinctState {
    fn update(&mut self, value: &ExprValue) -> QueryResult<()> {
        if self.seen.insert(value.clone()) {
            self.inner.update(value)?;
        }
        Ok(())
    }

    fn finalize(&self) -> QueryResult<ExprValue> {
        self.inner.finalize()
    }
}

/// Compiled aggregate function call
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
    name: String,
    kind: AggregationKind,
    args: Vec<Expression>,
    return_type: ExprType,
    distinct: bool,
    condition: Option<Box<Expression>>,
}

impl Aggregator {
    pub fn new(
        name: impl Into<String>,
        kind: AggregationKind,
        args: Vec<Expression>,
        return_type: ExprType,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            args,
            return_type,
            distinct: false,
            condition: None,
        }
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Only rows for which `condition` is TRUE are folded.
    pub fn with_condition(mut self, condition: Expression) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AggregationKind {
        self.kind
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub fn return_type(&self) -> ExprType {
        self.return_type
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn condition(&self) -> Option<&Expression> {
        self.condition.as_deref()
    }

    /// Fresh accumulator.
    pub fn create(&self) -> Box<dyn AggregationState> {
        let state: Box<dyn AggregationState> = match self.kind {
            AggregationKind::Avg => Box::new(AvgState::new()),
            AggregationKind::Sum => Box::new(SumState::new(self.return_type)),
            AggregationKind::Count => Box::new(CountState::new()),
            AggregationKind::Min => Box::new(MinMaxState::min()),
            AggregationKind::Max => Box::new(MinMaxState::max()),
            AggregationKind::VarSamp => Box::new(VarianceState::new(true, false)),
            AggregationKind::VarPop => Box::new(VarianceState::new(false, false)),
            AggregationKind::StddevSamp => Box::new(VarianceState::new(true, true)),
            AggregationKind::StddevPop => Box::new(VarianceState::new(false, true)),
        };
        if self.distinct {
            Box::new(DistinctState::new(state))
        } else {
            state
        }
    }

    /// Fold one row. Rows failing the condition and NULL/MISSING values are
    /// skipped.
    pub fn iterate(&self, row: &ExprValue, state: &mut dyn AggregationState) -> QueryResult<()> {
        if let Some(condition) = &self.condition {
            if !condition.value_of(row)?.is_true() {
                return Ok(());
            }
        }
        let value = match self.args.first() {
            Some(arg) => arg.value_of(row)?,
            None => return Ok(()),
        };
        if value.is_null_or_missing() {
            return Ok(());
        }
        state.update(&value)
    }

    pub fn terminate(&self, state: &dyn AggregationState) -> QueryResult<ExprValue> {
        state.finalize()
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Aggregator with its output field name
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAggregator {
    pub name: String,
    pub aggregator: Aggregator,
}

impl NamedAggregator {
    pub fn new(name: impl Into<String>, aggregator: Aggregator) -> Self {
        Self {
            name: name.into(),
            aggregator,
        }
    }
}

impl fmt::Display for NamedAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.aggregator.to_string() {
            write!(f, "{}", self.aggregator)
        } else {
            write!(f, "{} AS {}", self.aggregator, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    fn compile(name: &str, arg: Expression) -> anyhow::Result<Aggregator> {
        let repository = FunctionRepository::with_builtins();
        match repository.compile(name, vec![arg])? {
            Expression::Aggregator(aggregator) => Ok(aggregator),
            other => anyhow::bail!("not an aggregator: {}", other),
        }
    }

    fn rows(values: Vec<ExprValue>) -> Vec<ExprValue> {
        values
            .into_iter()
            .map(|value| match value {
                ExprValue::Missing => ExprValue::tuple(Vec::<(String, ExprValue)>::new()),
                value => ExprValue::tuple([("value", value)]),
            })
            .collect()
    }

    fn run(aggregator: &Aggregator, rows: &[ExprValue]) -> QueryResult<ExprValue> {
        let mut state = aggregator.create();
        for row in rows {
            aggregator.iterate(row, state.as_mut())?;
        }
        aggregator.terminate(state.as_ref())
    }

    fn field(ty: ExprType) -> Expression {
        Expression::reference("value", ty)
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_name("AVG"), Some("avg"));
        assert_eq!(canonical_name("variance"), Some("var_pop"));
        assert_eq!(canonical_name("STD"), Some("stddev_pop"));
        assert_eq!(canonical_name("median"), None);
    }

    #[test]
    fn test_sum_skips_missing() -> anyhow::Result<()> {
        let sum = compile("sum", field(ExprType::Integer))?;
        let input = rows(vec![
            ExprValue::from(1),
            ExprValue::Missing,
            ExprValue::from(2),
            ExprValue::Null,
            ExprValue::from(3),
            ExprValue::from(4),
        ]);
        assert_eq!(run(&sum, &input)?, ExprValue::from(10));
        Ok(())
    }

    #[test]
    fn test_all_null_is_null() -> anyhow::Result<()> {
        let input = rows(vec![ExprValue::Null, ExprValue::Missing]);
        for name in ["sum", "avg", "min", "max", "var_pop", "stddev_samp"] {
            let aggregator = compile(name, field(ExprType::Integer))?;
            assert_eq!(run(&aggregator, &input)?, ExprValue::Null, "{}", name);
        }
        let count = compile("count", field(ExprType::Integer))?;
        assert_eq!(run(&count, &input)?, ExprValue::from(0i64));
        Ok(())
    }

    #[test]
    fn test_count_all_fields() -> anyhow::Result<()> {
        let count = compile("count", Expression::literal("*"))?;
        let input = rows(vec![ExprValue::Null, ExprValue::Missing, ExprValue::from(1)]);
        assert_eq!(run(&count, &input)?, ExprValue::from(3i64));
        assert_eq!(count.return_type(), ExprType::Long);
        Ok(())
    }

    #[test]
    fn test_distinct_and_condition() -> anyhow::Result<()> {
        let input = rows(vec![
            ExprValue::from(1),
            ExprValue::from(1),
            ExprValue::from(2),
            ExprValue::from(5),
        ]);
        let distinct = compile("count", field(ExprType::Integer))?.with_distinct(true);
        assert_eq!(run(&distinct, &input)?, ExprValue::from(3i64));
        assert_eq!(distinct.to_string(), "count(DISTINCT value)");

        let repository = FunctionRepository::with_builtins();
        let condition = repository.compile(
            "<",
            vec![field(ExprType::Integer), Expression::literal(5)],
        )?;
        let filtered = compile("sum", field(ExprType::Integer))?.with_condition(condition);
        assert_eq!(run(&filtered, &input)?, ExprValue::from(4));
        Ok(())
    }

    #[test]
    fn test_sum_rejects_strings_at_iterate() -> anyhow::Result<()> {
        let sum = Aggregator::new(
            "sum",
            AggregationKind::Sum,
            vec![field(ExprType::Integer)],
            ExprType::Integer,
        );
        let err = run(&sum, &rows(vec![ExprValue::from("a")])).unwrap_err();
        assert_eq!(
            err,
            QueryError::evaluation("unexpected type [STRING] in sum aggregation")
        );
        Ok(())
    }

    #[test]
    fn test_aggregator_is_not_a_scalar() -> anyhow::Result<()> {
        let sum = compile("sum", Expression::reference("integer_value", ExprType::Integer))?;
        assert_eq!(sum.to_string(), "sum(integer_value)");
        let err = Expression::Aggregator(sum)
            .value_of(&ExprValue::Null)
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::evaluation("can't evaluate on aggregator: sum")
        );
        Ok(())
    }

    #[test]
    fn test_avg_min_max() -> anyhow::Result<()> {
        let input = rows(vec![ExprValue::from(200), ExprValue::from(336), ExprValue::Null]);
        assert_eq!(run(&compile("avg", field(ExprType::Integer))?, &input)?, ExprValue::from(268.0));
        assert_eq!(run(&compile("min", field(ExprType::Integer))?, &input)?, ExprValue::from(200));
        assert_eq!(run(&compile("max", field(ExprType::Integer))?, &input)?, ExprValue::from(336));
        Ok(())
    }

    #[test]
    fn test_sum_widens_long() -> anyhow::Result<()> {
        let sum = compile("sum", field(ExprType::Long))?;
        assert_eq!(sum.return_type(), ExprType::Long);
        let input = rows(vec![ExprValue::from(i64::MAX / 2), ExprValue::from(1i64)]);
        assert_eq!(run(&sum, &input)?, ExprValue::from(i64::MAX / 2 + 1));
        Ok(())
    }
}
