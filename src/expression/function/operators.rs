//! Arithmetic, comparison and logical operators.

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::function::FunctionRepository;
use std::cmp::Ordering;

use ExprType::{Boolean, Double, Float, Integer, Long, String as Str};

pub(super) fn register(repository: &mut FunctionRepository) {
    for ty in [Integer, Long, Float, Double] {
        repository.register_scalar("+", vec![ty, ty], ty, add);
        repository.register_scalar("-", vec![ty, ty], ty, subtract);
        repository.register_scalar("*", vec![ty, ty], ty, multiply);
        repository.register_scalar("/", vec![ty, ty], ty, divide);
        repository.register_scalar("%", vec![ty, ty], ty, modulus);
    }

    for ty in ExprType::core_types() {
        repository.register_scalar("=", vec![*ty, *ty], Boolean, equal);
        repository.register_scalar("!=", vec![*ty, *ty], Boolean, not_equal);
    }
    for ty in ordered_types() {
        repository.register_scalar("<", vec![ty, ty], Boolean, less);
        repository.register_scalar("<=", vec![ty, ty], Boolean, less_or_equal);
        repository.register_scalar(">", vec![ty, ty], Boolean, greater);
        repository.register_scalar(">=", vec![ty, ty], Boolean, greater_or_equal);
    }

    repository.register_short_circuit("and", vec![Boolean, Boolean], Boolean, false, and);
    repository.register_short_circuit("or", vec![Boolean, Boolean], Boolean, true, or);
    repository.register_scalar("xor", vec![Boolean, Boolean], Boolean, xor);
    repository.register_scalar("not", vec![Boolean], Boolean, not);
    repository.register_scalar("like", vec![Str, Str], Boolean, like);
}

/// Core types that have a total order.
pub(crate) fn ordered_types() -> impl Iterator<Item = ExprType> {
    ExprType::core_types()
        .iter()
        .copied()
        .filter(|ty| !matches!(ty, ExprType::Struct | ExprType::Array))
}

/// Apply a binary numeric operator to two operands of the same kind.
/// `None` from the operator (division by zero, overflow) becomes NULL.
fn arithmetic(
    args: &[ExprValue],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> Option<f64>,
) -> QueryResult<ExprValue> {
    let result = match (&args[0], &args[1]) {
        (ExprValue::Integer(a), ExprValue::Integer(b)) => {
            int_op(*a as i64, *b as i64).map(|v| ExprValue::Integer(v as i32))
        }
        (ExprValue::Long(a), ExprValue::Long(b)) => int_op(*a, *b).map(ExprValue::Long),
        (ExprValue::Float(a), ExprValue::Float(b)) => {
            float_op(*a as f64, *b as f64).map(|v| ExprValue::Float(v as f32))
        }
        (ExprValue::Double(a), ExprValue::Double(b)) => float_op(*a, *b).map(ExprValue::Double),
        (a, b) => {
            return Err(QueryError::evaluation(format!(
                "unexpected operand types [{}, {}]",
                a.expr_type(),
                b.expr_type()
            )))
        }
    };
    Ok(result.unwrap_or(ExprValue::Null))
}

fn add(args: &[ExprValue]) -> QueryResult<ExprValue> {
    arithmetic(args, |a, b| Some(a.wrapping_add(b)), |a, b| Some(a + b))
}

fn subtract(args: &[ExprValue]) -> QueryResult<ExprValue> {
    arithmetic(args, |a, b| Some(a.wrapping_sub(b)), |a, b| Some(a - b))
}

fn multiply(args: &[ExprValue]) -> QueryResult<ExprValue> {
    arithmetic(args, |a, b| Some(a.wrapping_mul(b)), |a, b| Some(a * b))
}

fn divide(args: &[ExprValue]) -> QueryResult<ExprValue> {
    arithmetic(
        args,
        |a, b| a.checked_div(b),
        |a, b| if b == 0.0 { None } else { Some(a / b) },
    )
}

pub(super) fn modulus(args: &[ExprValue]) -> QueryResult<ExprValue> {
    arithmetic(
        args,
        |a, b| a.checked_rem(b),
        |a, b| if b == 0.0 { None } else { Some(a % b) },
    )
}

fn values_equal(left: &ExprValue, right: &ExprValue) -> QueryResult<bool> {
    match (left, right) {
        (ExprValue::Tuple(_), _) | (ExprValue::Collection(_), _) => Ok(left == right),
        _ => Ok(left.compare(right)? == Ordering::Equal),
    }
}

fn equal(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(values_equal(&args[0], &args[1])?))
}

fn not_equal(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(!values_equal(&args[0], &args[1])?))
}

fn less(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(args[0].compare(&args[1])?.is_lt()))
}

fn less_or_equal(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(args[0].compare(&args[1])?.is_le()))
}

fn greater(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(args[0].compare(&args[1])?.is_gt()))
}

fn greater_or_equal(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(args[0].compare(&args[1])?.is_ge()))
}

// FALSE dominates, then MISSING, then NULL.
fn and(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let (left, right) = (&args[0], &args[1]);
    if matches!(left, ExprValue::Boolean(false)) || matches!(right, ExprValue::Boolean(false)) {
        return Ok(ExprValue::Boolean(false));
    }
    if left.is_missing() || right.is_missing() {
        return Ok(ExprValue::Missing);
    }
    if left.is_null() || right.is_null() {
        return Ok(ExprValue::Null);
    }
    Ok(ExprValue::Boolean(left.boolean_value()? && right.boolean_value()?))
}

// TRUE dominates, then MISSING, then NULL.
fn or(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let (left, right) = (&args[0], &args[1]);
    if left.is_true() || right.is_true() {
        return Ok(ExprValue::Boolean(true));
    }
    if left.is_missing() || right.is_missing() {
        return Ok(ExprValue::Missing);
    }
    if left.is_null() || right.is_null() {
        return Ok(ExprValue::Null);
    }
    Ok(ExprValue::Boolean(left.boolean_value()? || right.boolean_value()?))
}

fn xor(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(
        args[0].boolean_value()? != args[1].boolean_value()?,
    ))
}

fn not(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(!args[0].boolean_value()?))
}

fn like(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let text: Vec<char> = args[0].string_value()?.to_lowercase().chars().collect();
    let pattern: Vec<char> = args[1].string_value()?.to_lowercase().chars().collect();
    Ok(ExprValue::Boolean(like_match(&text, &pattern)))
}

/// `%` matches any run of characters, `_` exactly one, `\` escapes.
fn like_match(text: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('%', rest)) => (0..=text.len()).any(|skip| like_match(&text[skip..], rest)),
        Some(('_', rest)) => !text.is_empty() && like_match(&text[1..], rest),
        Some(('\\', rest)) if !rest.is_empty() => {
            text.first() == Some(&rest[0]) && like_match(&text[1..], &rest[1..])
        }
        Some((c, rest)) => text.first() == Some(c) && like_match(&text[1..], rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    fn eval(name: &str, args: Vec<ExprValue>) -> QueryResult<ExprValue> {
        let repository = FunctionRepository::with_builtins();
        let args = args.into_iter().map(Expression::Literal).collect();
        repository.compile(name, args)?.value_of(&ExprValue::Null)
    }

    fn t() -> ExprValue {
        ExprValue::from(true)
    }

    fn f() -> ExprValue {
        ExprValue::from(false)
    }

    #[test]
    fn test_and_truth_table() -> anyhow::Result<()> {
        assert_eq!(eval("and", vec![t(), t()])?, t());
        assert_eq!(eval("and", vec![t(), f()])?, f());
        assert_eq!(eval("and", vec![f(), ExprValue::Missing])?, f());
        assert_eq!(eval("and", vec![ExprValue::Null, f()])?, f());
        assert_eq!(eval("and", vec![t(), ExprValue::Null])?, ExprValue::Null);
        assert_eq!(eval("and", vec![ExprValue::Null, ExprValue::Missing])?, ExprValue::Missing);
        Ok(())
    }

    #[test]
    fn test_or_truth_table() -> anyhow::Result<()> {
        assert_eq!(eval("or", vec![f(), f()])?, f());
        assert_eq!(eval("or", vec![ExprValue::Missing, t()])?, t());
        assert_eq!(eval("or", vec![ExprValue::Null, t()])?, t());
        assert_eq!(eval("or", vec![f(), ExprValue::Null])?, ExprValue::Null);
        assert_eq!(eval("or", vec![ExprValue::Missing, ExprValue::Null])?, ExprValue::Missing);
        Ok(())
    }

    #[test]
    fn test_decisive_first_argument_skips_second() -> anyhow::Result<()> {
        let repository = FunctionRepository::with_builtins();
        // Fails whenever it is evaluated
        let failing = || {
            repository
                .compile("cast_to_boolean", vec![Expression::literal("maybe")])
        };
        assert!(failing()?.value_of(&ExprValue::Null).is_err());

        let and = repository.compile("and", vec![Expression::Literal(f()), failing()?])?;
        assert_eq!(and.value_of(&ExprValue::Null)?, f());
        let or = repository.compile("or", vec![Expression::Literal(t()), failing()?])?;
        assert_eq!(or.value_of(&ExprValue::Null)?, t());

        // A non-decisive first argument still evaluates the second
        let and = repository.compile("and", vec![Expression::Literal(t()), failing()?])?;
        assert!(and.value_of(&ExprValue::Null).is_err());
        Ok(())
    }

    #[test]
    fn test_xor_and_not_propagate() -> anyhow::Result<()> {
        assert_eq!(eval("xor", vec![t(), f()])?, t());
        assert_eq!(eval("xor", vec![t(), ExprValue::Null])?, ExprValue::Null);
        assert_eq!(eval("not", vec![ExprValue::Missing])?, ExprValue::Missing);
        assert_eq!(eval("not", vec![f()])?, t());
        Ok(())
    }

    #[test]
    fn test_arithmetic() -> anyhow::Result<()> {
        assert_eq!(eval("+", vec![ExprValue::from(1), ExprValue::from(2)])?, ExprValue::from(3));
        assert_eq!(eval("-", vec![ExprValue::from(1i64), ExprValue::from(2)])?, ExprValue::from(-1i64));
        assert_eq!(eval("*", vec![ExprValue::from(1.5), ExprValue::from(2)])?, ExprValue::from(3.0));
        assert_eq!(eval("/", vec![ExprValue::from(7), ExprValue::from(2)])?, ExprValue::from(3));
        assert_eq!(eval("%", vec![ExprValue::from(7), ExprValue::from(2)])?, ExprValue::from(1));
        Ok(())
    }

    #[test]
    fn test_division_by_zero_is_null() -> anyhow::Result<()> {
        assert_eq!(eval("/", vec![ExprValue::from(1), ExprValue::from(0)])?, ExprValue::Null);
        assert_eq!(eval("%", vec![ExprValue::from(1), ExprValue::from(0)])?, ExprValue::Null);
        assert_eq!(eval("/", vec![ExprValue::from(1.0), ExprValue::from(0.0)])?, ExprValue::Null);
        Ok(())
    }

    #[test]
    fn test_comparison() -> anyhow::Result<()> {
        assert_eq!(eval("=", vec![ExprValue::from(404), ExprValue::from(404)])?, t());
        assert_eq!(eval("!=", vec![ExprValue::from("a"), ExprValue::from("b")])?, t());
        assert_eq!(eval("<", vec![ExprValue::from(1), ExprValue::from(2.5)])?, t());
        assert_eq!(eval(">=", vec![ExprValue::from("a"), ExprValue::from("b")])?, f());
        assert_eq!(eval("=", vec![ExprValue::Null, ExprValue::from(1)])?, ExprValue::Null);
        assert_eq!(eval("<", vec![ExprValue::Missing, ExprValue::from(1)])?, ExprValue::Missing);
        Ok(())
    }

    #[test]
    fn test_like() -> anyhow::Result<()> {
        assert_eq!(eval("like", vec![ExprValue::from("Seattle"), ExprValue::from("sea%")])?, t());
        assert_eq!(eval("like", vec![ExprValue::from("abc"), ExprValue::from("a_c")])?, t());
        assert_eq!(eval("like", vec![ExprValue::from("abc"), ExprValue::from("a_")])?, f());
        assert_eq!(eval("like", vec![ExprValue::from("50%"), ExprValue::from("50\\%")])?, t());
        Ok(())
    }
}
