//! CASE expression in its searched form.
//!
//! The simple form (`CASE x WHEN 1 THEN ..`) is rewritten into searched
//! form by the analyzer, so only one evaluation path exists here.

use crate::data::{ExprType, ExprValue};
use crate::error::QueryResult;
use crate::expression::Expression;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expression,
    pub result: Expression,
}

impl WhenClause {
    pub fn new(condition: Expression, result: Expression) -> Self {
        Self { condition, result }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub whens: Vec<WhenClause>,
    pub default: Option<Box<Expression>>,
}

impl CaseClause {
    pub fn new(whens: Vec<WhenClause>, default: Option<Expression>) -> Self {
        Self {
            whens,
            default: default.map(Box::new),
        }
    }

    /// First WHEN whose condition is TRUE wins. NULL and MISSING conditions
    /// do not match. Without a match the default (or NULL) is returned.
    pub fn value_of(&self, row: &ExprValue) -> QueryResult<ExprValue> {
        for when in &self.whens {
            if when.condition.value_of(row)?.is_true() {
                return when.result.value_of(row);
            }
        }
        match &self.default {
            Some(default) => default.value_of(row),
            None => Ok(ExprValue::Null),
        }
    }

    /// Branch result types, WHEN results first then the default. Untyped
    /// NULL branches are left out.
    pub fn result_types(&self) -> Vec<ExprType> {
        self.whens
            .iter()
            .map(|when| &when.result)
            .chain(self.default.as_deref())
            .map(Expression::type_of)
            .filter(|ty| *ty != ExprType::Undefined)
            .collect()
    }

    pub fn type_of(&self) -> ExprType {
        self.result_types()
            .first()
            .copied()
            .unwrap_or(ExprType::Undefined)
    }
}

impl fmt::Display for CaseClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CASE")?;
        for when in &self.whens {
            write!(f, " WHEN {} THEN {}", when.condition, when.result)?;
        }
        if let Some(default) = &self.default {
            write!(f, " ELSE {}", default)?;
        }
        write!(f, " END")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::FunctionRepository;

    fn case() -> anyhow::Result<CaseClause> {
        let repository = FunctionRepository::with_builtins();
        let age = Expression::reference("age", ExprType::Integer);
        let young = repository.compile("<", vec![age.clone(), Expression::literal(30)])?;
        let old = repository.compile(">=", vec![age, Expression::literal(60)])?;
        Ok(CaseClause::new(
            vec![
                WhenClause::new(young, Expression::literal("young")),
                WhenClause::new(old, Expression::literal("old")),
            ],
            Some(Expression::literal("middle")),
        ))
    }

    #[test]
    fn test_first_true_branch_wins() -> anyhow::Result<()> {
        let case = case()?;
        let row = |age: i32| ExprValue::tuple([("age", ExprValue::from(age))]);
        assert_eq!(case.value_of(&row(20))?, ExprValue::from("young"));
        assert_eq!(case.value_of(&row(70))?, ExprValue::from("old"));
        assert_eq!(case.value_of(&row(45))?, ExprValue::from("middle"));
        assert_eq!(case.type_of(), ExprType::String);
        Ok(())
    }

    #[test]
    fn test_null_condition_does_not_match() -> anyhow::Result<()> {
        let case = case()?;
        let row = ExprValue::tuple([("age", ExprValue::Null)]);
        assert_eq!(case.value_of(&row)?, ExprValue::from("middle"));
        let missing = ExprValue::tuple(Vec::<(String, ExprValue)>::new());
        assert_eq!(case.value_of(&missing)?, ExprValue::from("middle"));
        Ok(())
    }

    #[test]
    fn test_no_default_yields_null() -> anyhow::Result<()> {
        let case = CaseClause::new(
            vec![WhenClause::new(Expression::literal(false), Expression::literal(1))],
            None,
        );
        assert_eq!(case.value_of(&ExprValue::Null)?, ExprValue::Null);
        assert_eq!(case.to_string(), "CASE WHEN false THEN 1 END");
        Ok(())
    }

    #[test]
    fn test_result_types_skip_null_branches() {
        let case = CaseClause::new(
            vec![WhenClause::new(
                Expression::literal(true),
                Expression::Literal(ExprValue::Null),
            )],
            Some(Expression::literal(2)),
        );
        assert_eq!(case.result_types(), vec![ExprType::Integer]);
        assert_eq!(case.type_of(), ExprType::Integer);
    }
}
