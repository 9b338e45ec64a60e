//! Builtin function registry.
//!
//! Every function name maps to an ordered list of signatures, each paired
//! with a builder. Resolution is first-match: the first signature (in
//! registration order) whose parameter types are all compatible with the
//! argument types wins. Arguments that need widening are then wrapped in the
//! matching `cast_to_<type>` call, so casts are ordinary function calls.

pub mod cast;
pub mod datetime;
pub mod math;
pub mod operators;
pub mod predicates;
pub mod text;

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::aggregation::{AggregationKind, Aggregator};
use crate::expression::window::{RankingFunction, RankingKind, WindowFunction};
use crate::expression::Expression;
use std::collections::HashMap;
use std::fmt;

/// Implementation of a scalar builtin over already evaluated arguments.
pub type ScalarFn = fn(&[ExprValue]) -> QueryResult<ExprValue>;

/// How NULL and MISSING arguments are treated before the body runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullHandling {
    /// Any MISSING argument yields MISSING, otherwise any NULL yields NULL.
    /// The body only sees present values.
    Propagate,
    /// The body receives the raw arguments.
    Custom,
    /// Like `Custom`, but when the first argument evaluates to this boolean
    /// it is the result and the remaining arguments are never evaluated.
    ShortCircuit(bool),
}

/// Compiled call of a scalar builtin
#[derive(Clone)]
pub struct FunctionExpression {
    name: String,
    args: Vec<Expression>,
    return_type: ExprType,
    null_handling: NullHandling,
    body: ScalarFn,
}

impl FunctionExpression {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub fn return_type(&self) -> ExprType {
        self.return_type
    }

    pub fn value_of(&self, row: &ExprValue) -> QueryResult<ExprValue> {
        let mut values = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let value = arg.value_of(row)?;
            if let NullHandling::ShortCircuit(decisive) = self.null_handling {
                if values.is_empty() && matches!(value, ExprValue::Boolean(b) if b == decisive) {
                    return Ok(value);
                }
            }
            values.push(value);
        }

        if self.null_handling == NullHandling::Propagate {
            if values.iter().any(ExprValue::is_missing) {
                return Ok(ExprValue::Missing);
            }
            if values.iter().any(ExprValue::is_null) {
                return Ok(ExprValue::Null);
            }
        }
        (self.body)(&values)
    }

    fn is_infix(&self) -> bool {
        self.args.len() == 2
            && (matches!(self.name.as_str(), "and" | "or" | "xor" | "like")
                || !self.name.chars().any(|c| c.is_ascii_alphanumeric()))
    }
}

impl fmt::Debug for FunctionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionExpression")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("return_type", &self.return_type)
            .finish()
    }
}

// Name, arguments and return type identify the implementation.
impl PartialEq for FunctionExpression {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.return_type == other.return_type && self.args == other.args
    }
}

impl fmt::Display for FunctionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infix() {
            return write!(f, "{} {} {}", self.args[0], self.name, self.args[1]);
        }
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Positional parameter types of one overload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub param_types: Vec<ExprType>,
}

impl FunctionSignature {
    pub fn new(param_types: Vec<ExprType>) -> Self {
        Self { param_types }
    }

    /// True if every parameter accepts the corresponding argument type.
    pub fn accepts(&self, arg_types: &[ExprType]) -> bool {
        self.param_types.len() == arg_types.len()
            && self
                .param_types
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| param.is_compatible(*arg))
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_types(&self.param_types))
    }
}

fn format_types(types: &[ExprType]) -> String {
    let names: Vec<&str> = types.iter().map(ExprType::type_name).collect();
    format!("[{}]", names.join(","))
}

/// Produces the compiled node once a signature has been chosen
#[derive(Debug, Clone, Copy)]
pub enum FunctionBuilder {
    Scalar {
        return_type: ExprType,
        null_handling: NullHandling,
        body: ScalarFn,
    },
    Aggregate {
        kind: AggregationKind,
        return_type: ExprType,
    },
    Ranking(RankingKind),
}

impl FunctionBuilder {
    fn build(&self, name: &str, args: Vec<Expression>) -> Expression {
        match *self {
            FunctionBuilder::Scalar {
                return_type,
                null_handling,
                body,
            } => Expression::Function(FunctionExpression {
                name: name.to_string(),
                args,
                return_type,
                null_handling,
                body,
            }),
            FunctionBuilder::Aggregate { kind, return_type } => {
                Expression::Aggregator(Aggregator::new(name, kind, args, return_type))
            }
            FunctionBuilder::Ranking(kind) => {
                Expression::Window(WindowFunction::Ranking(RankingFunction::new(kind)))
            }
        }
    }
}

/// All overloads registered under one name
#[derive(Debug, Clone)]
struct FunctionResolver {
    name: String,
    overloads: Vec<(FunctionSignature, FunctionBuilder)>,
}

impl FunctionResolver {
    fn resolve(&self, arg_types: &[ExprType]) -> QueryResult<&(FunctionSignature, FunctionBuilder)> {
        self.overloads
            .iter()
            .find(|(signature, _)| signature.accepts(arg_types))
            .ok_or_else(|| {
                let expected: Vec<String> = self
                    .overloads
                    .iter()
                    .map(|(signature, _)| signature.to_string())
                    .collect();
                QueryError::semantic(format!(
                    "{} function expected {{{}}}, but get {}",
                    self.name,
                    expected.join(","),
                    format_types(arg_types)
                ))
            })
    }
}

/// Registry of builtin functions.
///
/// Built once and shared read-only (usually behind an `Arc`) by the
/// analyzer and the optimizer rules.
#[derive(Debug, Clone)]
pub struct FunctionRepository {
    resolvers: HashMap<String, FunctionResolver>,
}

impl FunctionRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Create a repository holding every builtin
    pub fn with_builtins() -> Self {
        let mut repository = Self::new();
        operators::register(&mut repository);
        predicates::register(&mut repository);
        math::register(&mut repository);
        text::register(&mut repository);
        datetime::register(&mut repository);
        cast::register(&mut repository);
        crate::expression::aggregation::register(&mut repository);
        crate::expression::window::register(&mut repository);
        repository
    }

    /// Append an overload. Order of registration is resolution order.
    pub fn register(&mut self, name: &str, param_types: Vec<ExprType>, builder: FunctionBuilder) {
        let name = name.to_ascii_lowercase();
        self.resolvers
            .entry(name.clone())
            .or_insert_with(|| FunctionResolver {
                name,
                overloads: Vec::new(),
            })
            .overloads
            .push((FunctionSignature::new(param_types), builder));
    }

    /// Register a scalar function with NULL/MISSING propagation.
    pub fn register_scalar(
        &mut self,
        name: &str,
        param_types: Vec<ExprType>,
        return_type: ExprType,
        body: ScalarFn,
    ) {
        self.register(
            name,
            param_types,
            FunctionBuilder::Scalar {
                return_type,
                null_handling: NullHandling::Propagate,
                body,
            },
        );
    }

    /// Register a scalar function that inspects NULL/MISSING itself.
    pub fn register_custom(
        &mut self,
        name: &str,
        param_types: Vec<ExprType>,
        return_type: ExprType,
        body: ScalarFn,
    ) {
        self.register(
            name,
            param_types,
            FunctionBuilder::Scalar {
                return_type,
                null_handling: NullHandling::Custom,
                body,
            },
        );
    }

    /// Register a custom function that stops at a decisive first argument.
    pub fn register_short_circuit(
        &mut self,
        name: &str,
        param_types: Vec<ExprType>,
        return_type: ExprType,
        decisive: bool,
        body: ScalarFn,
    ) {
        self.register(
            name,
            param_types,
            FunctionBuilder::Scalar {
                return_type,
                null_handling: NullHandling::ShortCircuit(decisive),
                body,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(&name.to_ascii_lowercase())
    }

    /// Resolve `name` against the static types of `args` and build the node.
    pub fn compile(&self, name: &str, args: Vec<Expression>) -> QueryResult<Expression> {
        let resolver = self
            .resolvers
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| QueryError::semantic(format!("unsupported function name: {}", name)))?;

        let arg_types: Vec<ExprType> = args.iter().map(Expression::type_of).collect();
        let (signature, builder) = resolver.resolve(&arg_types)?;

        let args = args
            .into_iter()
            .zip(&signature.param_types)
            .map(|(arg, param)| {
                let ty = arg.type_of();
                if ty != ExprType::Undefined && ty.should_cast(*param) {
                    self.cast(arg, *param)
                } else {
                    Ok(arg)
                }
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(builder.build(&resolver.name, args))
    }

    /// Wrap `expr` in the cast function for `target`.
    pub fn cast(&self, expr: Expression, target: ExprType) -> QueryResult<Expression> {
        let name = cast::cast_function_name(target).ok_or_else(|| {
            QueryError::semantic(format!("unsupported cast target type: {}", target))
        })?;
        self.compile(name, vec![expr])
    }
}

impl Default for FunctionRepository {
    fn default() -> Self {
        Self::with_builtins()
    }
}
