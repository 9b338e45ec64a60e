//! Shorthand for building typed expressions directly, bypassing the analyzer.

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::aggregation::{Aggregator, NamedAggregator};
use crate::expression::function::FunctionRepository;
use crate::expression::{Expression, NamedExpression};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Dsl {
    repository: Arc<FunctionRepository>,
}

impl Dsl {
    pub fn new(repository: Arc<FunctionRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<FunctionRepository> {
        &self.repository
    }

    pub fn literal(value: impl Into<ExprValue>) -> Expression {
        Expression::literal(value)
    }

    pub fn reference(name: &str, ty: ExprType) -> Expression {
        Expression::reference(name, ty)
    }

    pub fn named(name: &str, expr: Expression) -> NamedExpression {
        NamedExpression::new(name, expr)
    }

    pub fn call(&self, name: &str, args: Vec<Expression>) -> QueryResult<Expression> {
        self.repository.compile(name, args)
    }

    pub fn and(&self, left: Expression, right: Expression) -> QueryResult<Expression> {
        self.call("and", vec![left, right])
    }

    pub fn or(&self, left: Expression, right: Expression) -> QueryResult<Expression> {
        self.call("or", vec![left, right])
    }

    pub fn not(&self, expr: Expression) -> QueryResult<Expression> {
        self.call("not", vec![expr])
    }

    pub fn equal(&self, left: Expression, right: Expression) -> QueryResult<Expression> {
        self.call("=", vec![left, right])
    }

    pub fn less(&self, left: Expression, right: Expression) -> QueryResult<Expression> {
        self.call("<", vec![left, right])
    }

    pub fn greater(&self, left: Expression, right: Expression) -> QueryResult<Expression> {
        self.call(">", vec![left, right])
    }

    pub fn add(&self, left: Expression, right: Expression) -> QueryResult<Expression> {
        self.call("+", vec![left, right])
    }

    /// Compile an aggregate call such as `sum(x)`.
    pub fn aggregator(&self, name: &str, arg: Expression) -> QueryResult<Aggregator> {
        match self.call(name, vec![arg])? {
            Expression::Aggregator(aggregator) => Ok(aggregator),
            other => Err(QueryError::semantic(format!(
                "{} is not an aggregation function",
                other
            ))),
        }
    }

    /// Aggregator named after its own display form, e.g. `avg(response)`.
    pub fn named_aggregator(&self, name: &str, arg: Expression) -> QueryResult<NamedAggregator> {
        let aggregator = self.aggregator(name, arg)?;
        Ok(NamedAggregator::new(aggregator.to_string(), aggregator))
    }
}

impl Default for Dsl {
    fn default() -> Self {
        Self::new(Arc::new(FunctionRepository::with_builtins()))
    }
}
