//! Unresolved expression to typed `Expression`.

use crate::analysis::context::AnalysisContext;
use crate::analysis::qualifier::QualifierAnalyzer;
use crate::analysis::symbol::Symbol;
use crate::ast::{Literal, UnresolvedExpression};
use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::aggregation::{self, Aggregator};
use crate::expression::conditional::{CaseClause, WhenClause};
use crate::expression::window::{AggregateWindowFunction, WindowFunction};
use crate::expression::{Expression, FunctionRepository, NamedExpression};
use std::sync::Arc;

/// Resolves names against the context's type environment and function
/// calls against the shared repository. Every node kind yields exactly one
/// expression or an error.
#[derive(Debug, Clone)]
pub struct ExpressionAnalyzer {
    repository: Arc<FunctionRepository>,
}

impl ExpressionAnalyzer {
    pub fn new(repository: Arc<FunctionRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<FunctionRepository> {
        &self.repository
    }

    pub fn analyze(
        &self,
        expr: &UnresolvedExpression,
        context: &AnalysisContext,
    ) -> QueryResult<Expression> {
        match expr {
            UnresolvedExpression::Literal { value } => Ok(Expression::Literal(literal_value(value)?)),
            UnresolvedExpression::QualifiedName { parts } => self.analyze_name(parts, context),
            UnresolvedExpression::AllFields => Ok(Expression::literal("*")),
            UnresolvedExpression::Alias { expression, .. } => self.analyze(expression, context),
            UnresolvedExpression::And { left, right } => self.call("and", &[left, right], context),
            UnresolvedExpression::Or { left, right } => self.call("or", &[left, right], context),
            UnresolvedExpression::Xor { left, right } => self.call("xor", &[left, right], context),
            UnresolvedExpression::Not { expression } => self.call("not", &[expression], context),
            UnresolvedExpression::EqualTo { left, right } => self.call("=", &[left, right], context),
            UnresolvedExpression::Compare {
                operator,
                left,
                right,
            } => self.call(operator, &[left, right], context),
            UnresolvedExpression::Function { name, args } => {
                let args: Vec<&UnresolvedExpression> = args.iter().collect();
                self.call(name, &args, context)
            }
            UnresolvedExpression::Cast {
                expression,
                data_type,
            } => {
                let target = ExprType::from_cast_target(data_type).ok_or_else(|| {
                    QueryError::semantic(format!("unsupported cast target type: {}", data_type))
                })?;
                let expression = self.analyze(expression, context)?;
                self.repository.cast(expression, target)
            }
            UnresolvedExpression::AggregateFunction {
                name,
                field,
                distinct,
                condition,
            } => {
                let aggregator = self.analyze_aggregator(name, field, context)?;
                let mut aggregator = aggregator.with_distinct(*distinct);
                if let Some(condition) = condition {
                    aggregator = aggregator.with_condition(self.analyze(condition, context)?);
                }
                Ok(Expression::Aggregator(aggregator))
            }
            UnresolvedExpression::WindowFunction { function, .. } => {
                match self.analyze(function, context)? {
                    Expression::Aggregator(aggregator) => Ok(Expression::Window(
                        WindowFunction::Aggregate(AggregateWindowFunction::new(aggregator)),
                    )),
                    ranking @ Expression::Window(_) => Ok(ranking),
                    other => Err(QueryError::semantic(format!(
                        "{} is not a window function",
                        other
                    ))),
                }
            }
            UnresolvedExpression::Case {
                case_value,
                whens,
                else_clause,
            } => self.analyze_case(case_value.as_deref(), whens, else_clause.as_deref(), context),
        }
    }

    /// Analyze a projection item. Aliased items keep their name and alias;
    /// anything else is named after its query text.
    pub fn analyze_named(
        &self,
        expr: &UnresolvedExpression,
        context: &AnalysisContext,
    ) -> QueryResult<NamedExpression> {
        match expr {
            UnresolvedExpression::Alias {
                name,
                expression,
                alias,
            } => {
                let named = NamedExpression::new(name.as_str(), self.analyze(expression, context)?);
                Ok(match alias {
                    Some(alias) => named.with_alias(alias.as_str()),
                    None => named,
                })
            }
            other => Ok(NamedExpression::new(
                other.to_string(),
                self.analyze(other, context)?,
            )),
        }
    }

    fn analyze_name(&self, parts: &[String], context: &AnalysisContext) -> QueryResult<Expression> {
        let name = QualifierAnalyzer::new(context).unqualified(parts)?;
        let ty = context.peek().resolve(&Symbol::field(name.as_str()))?;
        if ty == ExprType::Array {
            return Err(QueryError::syntax(format!(
                "Identifier [{}] of type [{}] is not supported yet",
                name, ty
            )));
        }
        Ok(Expression::reference(name, ty))
    }

    fn call(
        &self,
        name: &str,
        args: &[&UnresolvedExpression],
        context: &AnalysisContext,
    ) -> QueryResult<Expression> {
        let args = args
            .iter()
            .map(|arg| self.analyze(arg, context))
            .collect::<QueryResult<Vec<_>>>()?;
        self.repository.compile(name, args)
    }

    fn analyze_aggregator(
        &self,
        name: &str,
        field: &UnresolvedExpression,
        context: &AnalysisContext,
    ) -> QueryResult<Aggregator> {
        let canonical = aggregation::canonical_name(name).ok_or_else(|| {
            QueryError::semantic(format!("Unsupported aggregation function {}", name))
        })?;
        let arg = self.analyze(field, context)?;
        match self.repository.compile(canonical, vec![arg])? {
            Expression::Aggregator(aggregator) => Ok(aggregator),
            other => Err(QueryError::semantic(format!(
                "{} is not an aggregation function",
                other
            ))),
        }
    }

    fn analyze_case(
        &self,
        case_value: Option<&UnresolvedExpression>,
        whens: &[crate::ast::When],
        else_clause: Option<&UnresolvedExpression>,
        context: &AnalysisContext,
    ) -> QueryResult<Expression> {
        let mut clauses = Vec::with_capacity(whens.len());
        for when in whens {
            // Simple CASE compares the operand with each label
            let condition = match case_value {
                Some(value) => UnresolvedExpression::equal_to(value.clone(), when.condition.clone()),
                None => when.condition.clone(),
            };
            clauses.push(WhenClause::new(
                self.analyze(&condition, context)?,
                self.analyze(&when.result, context)?,
            ));
        }
        let default = else_clause
            .map(|default| self.analyze(default, context))
            .transpose()?;

        let case = CaseClause::new(clauses, default);
        let types = case.result_types();
        if types.windows(2).any(|pair| pair[0] != pair[1]) {
            let names: Vec<&str> = types.iter().map(ExprType::type_name).collect();
            return Err(QueryError::semantic(format!(
                "All result types of CASE clause must be the same, but found [{}]",
                names.join(", ")
            )));
        }
        Ok(Expression::Case(case))
    }
}

fn literal_value(literal: &Literal) -> QueryResult<ExprValue> {
    Ok(match literal {
        Literal::Null => ExprValue::Null,
        Literal::Boolean(v) => ExprValue::Boolean(*v),
        Literal::Integer(v) => ExprValue::Integer(*v),
        Literal::Long(v) => ExprValue::Long(*v),
        Literal::Float(v) => ExprValue::Float(*v),
        Literal::Double(v) => ExprValue::Double(*v),
        Literal::String(v) => ExprValue::String(v.clone()),
        Literal::Date(v) => ExprValue::Date(ExprValue::parse_date(v)?),
        Literal::Time(v) => ExprValue::Time(ExprValue::parse_time(v)?),
        Literal::Timestamp(v) => ExprValue::Timestamp(ExprValue::parse_datetime(v)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::When;
    use crate::error::ErrorKind;
    use UnresolvedExpression as U;

    fn context() -> AnalysisContext {
        let mut context = AnalysisContext::new();
        let env = context.peek_mut();
        env.define(&Symbol::index("logs"), ExprType::Struct);
        env.define(&Symbol::field("response"), ExprType::Integer);
        env.define(&Symbol::field("action"), ExprType::String);
        env.define(&Symbol::field("balance"), ExprType::Double);
        env.define(&Symbol::field("tags"), ExprType::Array);
        context
    }

    fn analyzer() -> ExpressionAnalyzer {
        ExpressionAnalyzer::new(Arc::new(FunctionRepository::with_builtins()))
    }

    #[test]
    fn test_qualified_reference() -> anyhow::Result<()> {
        let expr = analyzer().analyze(&U::field("logs.response"), &context())?;
        assert_eq!(expr, Expression::reference("response", ExprType::Integer));
        Ok(())
    }

    #[test]
    fn test_unknown_field_is_semantic_error() {
        let err = analyzer().analyze(&U::field("status"), &context()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SemanticCheck);
    }

    #[test]
    fn test_array_reference_is_syntax_error() {
        let err = analyzer().analyze(&U::field("tags"), &context()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxCheck);
        assert_eq!(
            err.to_string(),
            "Identifier [tags] of type [ARRAY] is not supported yet"
        );
    }

    #[test]
    fn test_comparison_widens_argument() -> anyhow::Result<()> {
        let expr = analyzer().analyze(
            &U::compare(">", U::field("response"), U::Literal { value: Literal::Double(1.5) }),
            &context(),
        )?;
        assert_eq!(expr.type_of(), ExprType::Boolean);
        assert_eq!(expr.to_string(), "cast_to_double(response) > 1.5");
        Ok(())
    }

    #[test]
    fn test_cast() -> anyhow::Result<()> {
        let expr = analyzer().analyze(
            &U::Cast {
                expression: Box::new(U::field("action")),
                data_type: "int".to_string(),
            },
            &context(),
        )?;
        assert_eq!(expr.type_of(), ExprType::Integer);
        Ok(())
    }

    #[test]
    fn test_aggregate_with_distinct_and_filter() -> anyhow::Result<()> {
        let expr = analyzer().analyze(
            &U::AggregateFunction {
                name: "COUNT".to_string(),
                field: Box::new(U::field("action")),
                distinct: true,
                condition: Some(Box::new(U::equal_to(U::field("response"), U::int(200)))),
            },
            &context(),
        )?;
        let Expression::Aggregator(aggregator) = expr else {
            panic!("expected aggregator");
        };
        assert_eq!(aggregator.name(), "count");
        assert!(aggregator.is_distinct());
        assert!(aggregator.condition().is_some());
        assert_eq!(aggregator.return_type(), ExprType::Long);
        Ok(())
    }

    #[test]
    fn test_count_all_fields() -> anyhow::Result<()> {
        let expr = analyzer().analyze(&U::aggregate("count", U::AllFields), &context())?;
        assert_eq!(expr.to_string(), "count(\"*\")");
        Ok(())
    }

    #[test]
    fn test_unsupported_aggregate() {
        let err = analyzer()
            .analyze(&U::aggregate("median", U::field("response")), &context())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SemanticCheck);
        assert_eq!(err.to_string(), "Unsupported aggregation function median");
    }

    #[test]
    fn test_window_wraps_aggregator() -> anyhow::Result<()> {
        let window = |function| U::WindowFunction {
            function: Box::new(function),
            partition_by: vec![],
            sort_list: vec![],
        };
        let expr = analyzer().analyze(
            &window(U::aggregate("sum", U::field("response"))),
            &context(),
        )?;
        assert!(matches!(expr, Expression::Window(WindowFunction::Aggregate(_))));

        let expr = analyzer().analyze(&window(U::function("rank", vec![])), &context())?;
        assert!(matches!(expr, Expression::Window(WindowFunction::Ranking(_))));
        assert_eq!(expr.type_of(), ExprType::Integer);
        Ok(())
    }

    #[test]
    fn test_simple_case_is_rewritten() -> anyhow::Result<()> {
        let expr = analyzer().analyze(
            &U::Case {
                case_value: Some(Box::new(U::field("response"))),
                whens: vec![
                    When {
                        condition: U::int(200),
                        result: U::string("ok"),
                    },
                    When {
                        condition: U::int(404),
                        result: U::string("not found"),
                    },
                ],
                else_clause: Some(Box::new(U::null())),
            },
            &context(),
        )?;
        assert_eq!(expr.type_of(), ExprType::String);
        let row = ExprValue::tuple([("response", ExprValue::from(404))]);
        assert_eq!(expr.value_of(&row)?, ExprValue::from("not found"));
        let row = ExprValue::tuple([("response", ExprValue::from(500))]);
        assert_eq!(expr.value_of(&row)?, ExprValue::Null);
        Ok(())
    }

    #[test]
    fn test_case_result_types_must_match() {
        let err = analyzer()
            .analyze(
                &U::Case {
                    case_value: None,
                    whens: vec![
                        When {
                            condition: U::equal_to(U::field("response"), U::int(200)),
                            result: U::string("ok"),
                        },
                        When {
                            condition: U::equal_to(U::field("response"), U::int(404)),
                            result: U::string("not found"),
                        },
                    ],
                    else_clause: Some(Box::new(U::int(0))),
                },
                &context(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SemanticCheck);
        assert_eq!(
            err.to_string(),
            "All result types of CASE clause must be the same, but found [STRING, STRING, INTEGER]"
        );
    }

    #[test]
    fn test_analyze_named() -> anyhow::Result<()> {
        let analyzer = analyzer();
        let named = analyzer.analyze_named(&U::aggregate("avg", U::field("response")), &context())?;
        assert_eq!(named.name_or_alias(), "avg(response)");

        let named = analyzer.analyze_named(
            &U::Alias {
                name: "response".to_string(),
                expression: Box::new(U::field("response")),
                alias: Some("code".to_string()),
            },
            &context(),
        )?;
        assert_eq!(named.name_or_alias(), "code");
        Ok(())
    }
}
