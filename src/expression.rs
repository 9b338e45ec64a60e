//! Typed expression tree.
//!
//! This module provides:
//! - The `Expression` node set produced by the analyzer
//! - Row evaluation against tuple values
//! - The builtin function registry and its overload resolution
//! - Aggregators and window functions
//!
//! Nodes are immutable once built. Evaluating a node against the same row
//! always gives the same value, so a compiled tree can be shared by any
//! number of executing plans. Mutable accumulator state lives outside the
//! tree (see `aggregation::AggregationState` and `window::WindowState`).

pub mod aggregation;
pub mod conditional;
pub mod dsl;
pub mod function;
pub mod window;

pub use aggregation::{AggregationKind, AggregationState, Aggregator, NamedAggregator};
pub use conditional::{CaseClause, WhenClause};
pub use dsl::Dsl;
pub use function::{FunctionExpression, FunctionRepository};
pub use window::{WindowDefinition, WindowFunction};

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use std::fmt;

/// Typed expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant value. Its type is the value's type.
    Literal(ExprValue),

    /// Field of the current row
    Reference(ReferenceExpression),

    /// Resolved builtin call
    Function(FunctionExpression),

    /// Per-group accumulator; only valid inside an aggregation operator
    Aggregator(Aggregator),

    /// Ranking or running-aggregate function; only valid inside a window operator
    Window(WindowFunction),

    Case(CaseClause),
}

impl Expression {
    pub fn literal(value: impl Into<ExprValue>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn reference(attr: impl Into<String>, ty: ExprType) -> Self {
        Expression::Reference(ReferenceExpression::new(attr, ty))
    }

    /// Evaluate against a row.
    pub fn value_of(&self, row: &ExprValue) -> QueryResult<ExprValue> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Reference(reference) => Ok(reference.resolve(row)),
            Expression::Function(function) => function.value_of(row),
            Expression::Aggregator(aggregator) => Err(QueryError::evaluation(format!(
                "can't evaluate on aggregator: {}",
                aggregator.name()
            ))),
            Expression::Window(function) => Err(QueryError::evaluation(format!(
                "can't evaluate on window function: {}",
                function
            ))),
            Expression::Case(case) => case.value_of(row),
        }
    }

    /// Statically determined result type.
    pub fn type_of(&self) -> ExprType {
        match self {
            Expression::Literal(value) => value.expr_type(),
            Expression::Reference(reference) => reference.ty,
            Expression::Function(function) => function.return_type(),
            Expression::Aggregator(aggregator) => aggregator.return_type(),
            Expression::Window(function) => function.type_of(),
            Expression::Case(case) => case.type_of(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Reference(reference) => write!(f, "{}", reference.attr),
            Expression::Function(function) => write!(f, "{}", function),
            Expression::Aggregator(aggregator) => write!(f, "{}", aggregator),
            Expression::Window(function) => write!(f, "{}", function),
            Expression::Case(case) => write!(f, "{}", case),
        }
    }
}

/// Reference to a (possibly dotted) field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceExpression {
    pub attr: String,
    pub ty: ExprType,
}

impl ReferenceExpression {
    pub fn new(attr: impl Into<String>, ty: ExprType) -> Self {
        Self {
            attr: attr.into(),
            ty,
        }
    }

    /// Look the field up in `row`. An exact key wins over a nested path;
    /// anything that cannot be found is MISSING.
    pub fn resolve(&self, row: &ExprValue) -> ExprValue {
        let ExprValue::Tuple(fields) = row else {
            return ExprValue::Missing;
        };
        if let Some(value) = fields.get(&self.attr) {
            return value.clone();
        }

        let mut current = row;
        for part in self.attr.split('.') {
            match current {
                ExprValue::Tuple(fields) => match fields.get(part) {
                    Some(value) => current = value,
                    None => return ExprValue::Missing,
                },
                _ => return ExprValue::Missing,
            }
        }
        current.clone()
    }
}

/// Expression with an output name, e.g. a projection column.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedExpression {
    /// Name derived from the query text
    pub name: String,
    pub delegated: Expression,
    /// User supplied alias, takes precedence over `name`
    pub alias: Option<String>,
}

impl NamedExpression {
    pub fn new(name: impl Into<String>, delegated: Expression) -> Self {
        Self {
            name: name.into(),
            delegated,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name_or_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn value_of(&self, row: &ExprValue) -> QueryResult<ExprValue> {
        self.delegated.value_of(row)
    }

    pub fn type_of(&self) -> ExprType {
        self.delegated.type_of()
    }
}

impl fmt::Display for NamedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.delegated, alias),
            None => write!(f, "{}", self.delegated),
        }
    }
}
