//! NULL predicates and conditional functions.

use crate::data::{ExprType, ExprValue};
use crate::error::QueryResult;
use crate::expression::function::FunctionRepository;

pub(super) fn register(repository: &mut FunctionRepository) {
    for ty in ExprType::core_types() {
        let ty = *ty;
        repository.register_custom("is null", vec![ty], ExprType::Boolean, is_null);
        repository.register_custom("is not null", vec![ty], ExprType::Boolean, is_not_null);
        repository.register_custom("ifnull", vec![ty, ty], ty, if_null);
        repository.register_scalar("nullif", vec![ty, ty], ty, null_if);
        repository.register_custom("if", vec![ExprType::Boolean, ty, ty], ty, if_function);
    }
}

fn is_null(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(args[0].is_null_or_missing()))
}

fn is_not_null(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Boolean(!args[0].is_null_or_missing()))
}

fn if_null(args: &[ExprValue]) -> QueryResult<ExprValue> {
    if args[0].is_null_or_missing() {
        Ok(args[1].clone())
    } else {
        Ok(args[0].clone())
    }
}

fn null_if(args: &[ExprValue]) -> QueryResult<ExprValue> {
    if args[0] == args[1] {
        Ok(ExprValue::Null)
    } else {
        Ok(args[0].clone())
    }
}

// A NULL or MISSING condition picks the else branch.
fn if_function(args: &[ExprValue]) -> QueryResult<ExprValue> {
    if args[0].is_true() {
        Ok(args[1].clone())
    } else {
        Ok(args[2].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    fn eval(name: &str, args: Vec<ExprValue>) -> anyhow::Result<ExprValue> {
        let repository = FunctionRepository::with_builtins();
        let args = args.into_iter().map(Expression::Literal).collect();
        Ok(repository.compile(name, args)?.value_of(&ExprValue::Null)?)
    }

    #[test]
    fn test_is_null() -> anyhow::Result<()> {
        assert_eq!(eval("is null", vec![ExprValue::Null])?, ExprValue::from(true));
        assert_eq!(eval("is null", vec![ExprValue::Missing])?, ExprValue::from(true));
        assert_eq!(eval("is null", vec![ExprValue::from(1)])?, ExprValue::from(false));
        assert_eq!(eval("is not null", vec![ExprValue::from("a")])?, ExprValue::from(true));
        Ok(())
    }

    #[test]
    fn test_if_null_and_null_if() -> anyhow::Result<()> {
        assert_eq!(
            eval("ifnull", vec![ExprValue::Null, ExprValue::from(5)])?,
            ExprValue::from(5)
        );
        assert_eq!(
            eval("ifnull", vec![ExprValue::from(1), ExprValue::from(5)])?,
            ExprValue::from(1)
        );
        assert_eq!(
            eval("nullif", vec![ExprValue::from(5), ExprValue::from(5)])?,
            ExprValue::Null
        );
        assert_eq!(
            eval("nullif", vec![ExprValue::from(4), ExprValue::from(5)])?,
            ExprValue::from(4)
        );
        Ok(())
    }

    #[test]
    fn test_if() -> anyhow::Result<()> {
        assert_eq!(
            eval("if", vec![ExprValue::from(true), ExprValue::from("a"), ExprValue::from("b")])?,
            ExprValue::from("a")
        );
        assert_eq!(
            eval("if", vec![ExprValue::Null, ExprValue::from("a"), ExprValue::from("b")])?,
            ExprValue::from("b")
        );
        Ok(())
    }
}
