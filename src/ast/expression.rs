//! Unresolved expression nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal constant as written in the query. Date and time literals are
/// kept as text and parsed during analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(String),
    Time(String),
    Timestamp(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnresolvedExpression {
    Literal {
        value: Literal,
    },
    /// Possibly qualified field name, e.g. `["logs", "response"]`.
    QualifiedName {
        parts: Vec<String>,
    },
    /// `*`, as in `COUNT(*)`.
    AllFields,
    /// Expression with an output name, as found in projection lists.
    Alias {
        name: String,
        expression: Box<UnresolvedExpression>,
        #[serde(default)]
        alias: Option<String>,
    },
    And {
        left: Box<UnresolvedExpression>,
        right: Box<UnresolvedExpression>,
    },
    Or {
        left: Box<UnresolvedExpression>,
        right: Box<UnresolvedExpression>,
    },
    Xor {
        left: Box<UnresolvedExpression>,
        right: Box<UnresolvedExpression>,
    },
    Not {
        expression: Box<UnresolvedExpression>,
    },
    EqualTo {
        left: Box<UnresolvedExpression>,
        right: Box<UnresolvedExpression>,
    },
    Compare {
        operator: String,
        left: Box<UnresolvedExpression>,
        right: Box<UnresolvedExpression>,
    },
    Function {
        name: String,
        #[serde(default)]
        args: Vec<UnresolvedExpression>,
    },
    Cast {
        expression: Box<UnresolvedExpression>,
        data_type: String,
    },
    AggregateFunction {
        name: String,
        field: Box<UnresolvedExpression>,
        #[serde(default)]
        distinct: bool,
        /// Optional `FILTER (WHERE ..)` condition.
        #[serde(default)]
        condition: Option<Box<UnresolvedExpression>>,
    },
    WindowFunction {
        function: Box<UnresolvedExpression>,
        #[serde(default)]
        partition_by: Vec<UnresolvedExpression>,
        #[serde(default)]
        sort_list: Vec<crate::ast::SortField>,
    },
    /// Simple CASE when `case_value` is set, searched CASE otherwise.
    Case {
        #[serde(default)]
        case_value: Option<Box<UnresolvedExpression>>,
        whens: Vec<When>,
        #[serde(default)]
        else_clause: Option<Box<UnresolvedExpression>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct When {
    pub condition: UnresolvedExpression,
    pub result: UnresolvedExpression,
}

// Shorthand constructors for building trees by hand.
impl UnresolvedExpression {
    pub fn field(name: &str) -> Self {
        UnresolvedExpression::QualifiedName {
            parts: name.split('.').map(str::to_string).collect(),
        }
    }

    pub fn literal(value: Literal) -> Self {
        UnresolvedExpression::Literal { value }
    }

    pub fn int(value: i32) -> Self {
        Self::literal(Literal::Integer(value))
    }

    pub fn string(value: &str) -> Self {
        Self::literal(Literal::String(value.to_string()))
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    pub fn alias(name: &str, expression: UnresolvedExpression) -> Self {
        UnresolvedExpression::Alias {
            name: name.to_string(),
            expression: Box::new(expression),
            alias: None,
        }
    }

    pub fn function(name: &str, args: Vec<UnresolvedExpression>) -> Self {
        UnresolvedExpression::Function {
            name: name.to_string(),
            args,
        }
    }

    pub fn aggregate(name: &str, field: UnresolvedExpression) -> Self {
        UnresolvedExpression::AggregateFunction {
            name: name.to_string(),
            field: Box::new(field),
            distinct: false,
            condition: None,
        }
    }

    pub fn equal_to(left: UnresolvedExpression, right: UnresolvedExpression) -> Self {
        UnresolvedExpression::EqualTo {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn compare(operator: &str, left: UnresolvedExpression, right: UnresolvedExpression) -> Self {
        UnresolvedExpression::Compare {
            operator: operator.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: UnresolvedExpression, right: UnresolvedExpression) -> Self {
        UnresolvedExpression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(v) => write!(f, "{}", v),
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Long(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Double(v) => write!(f, "{}", v),
            Literal::String(v) => write!(f, "'{}'", v),
            Literal::Date(v) => write!(f, "DATE '{}'", v),
            Literal::Time(v) => write!(f, "TIME '{}'", v),
            Literal::Timestamp(v) => write!(f, "TIMESTAMP '{}'", v),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[UnresolvedExpression]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Query text form, used to name output columns.
impl fmt::Display for UnresolvedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedExpression::Literal { value } => write!(f, "{}", value),
            UnresolvedExpression::QualifiedName { parts } => write!(f, "{}", parts.join(".")),
            UnresolvedExpression::AllFields => write!(f, "*"),
            UnresolvedExpression::Alias { name, alias, .. } => {
                write!(f, "{}", alias.as_deref().unwrap_or(name))
            }
            UnresolvedExpression::And { left, right } => write!(f, "{} AND {}", left, right),
            UnresolvedExpression::Or { left, right } => write!(f, "{} OR {}", left, right),
            UnresolvedExpression::Xor { left, right } => write!(f, "{} XOR {}", left, right),
            UnresolvedExpression::Not { expression } => write!(f, "NOT {}", expression),
            UnresolvedExpression::EqualTo { left, right } => write!(f, "{} = {}", left, right),
            UnresolvedExpression::Compare {
                operator,
                left,
                right,
            } => write!(f, "{} {} {}", left, operator, right),
            UnresolvedExpression::Function { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            UnresolvedExpression::Cast {
                expression,
                data_type,
            } => write!(f, "CAST({} AS {})", expression, data_type),
            UnresolvedExpression::AggregateFunction {
                name,
                field,
                distinct,
                ..
            } => {
                if *distinct {
                    write!(f, "{}(DISTINCT {})", name, field)
                } else {
                    write!(f, "{}({})", name, field)
                }
            }
            UnresolvedExpression::WindowFunction { function, .. } => write!(f, "{}", function),
            UnresolvedExpression::Case {
                case_value,
                whens,
                else_clause,
            } => {
                write!(f, "CASE")?;
                if let Some(value) = case_value {
                    write!(f, " {}", value)?;
                }
                for when in whens {
                    write!(f, " WHEN {} THEN {}", when.condition, when.result)?;
                }
                if let Some(default) = else_clause {
                    write!(f, " ELSE {}", default)?;
                }
                write!(f, " END")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_nested_expression() -> anyhow::Result<()> {
        let json = r#"{
            "type": "equal_to",
            "left": {"type": "qualified_name", "parts": ["response"]},
            "right": {"type": "literal", "value": {"type": "integer", "value": 404}}
        }"#;
        let expr: UnresolvedExpression = serde_json::from_str(json)?;
        assert_eq!(
            expr,
            UnresolvedExpression::equal_to(
                UnresolvedExpression::field("response"),
                UnresolvedExpression::int(404)
            )
        );
        Ok(())
    }

    #[test]
    fn test_deserialize_aggregate_defaults() -> anyhow::Result<()> {
        let json = r#"{"type": "aggregate_function", "name": "COUNT", "field": {"type": "all_fields"}}"#;
        let expr: UnresolvedExpression = serde_json::from_str(json)?;
        assert_eq!(
            expr,
            UnresolvedExpression::aggregate("COUNT", UnresolvedExpression::AllFields)
        );
        Ok(())
    }

    #[test]
    fn test_null_literal() -> anyhow::Result<()> {
        let expr: UnresolvedExpression =
            serde_json::from_str(r#"{"type": "literal", "value": {"type": "null"}}"#)?;
        assert_eq!(expr, UnresolvedExpression::null());
        Ok(())
    }

    #[test]
    fn test_display_names_columns() {
        let avg = UnresolvedExpression::aggregate("avg", UnresolvedExpression::field("response"));
        assert_eq!(avg.to_string(), "avg(response)");
        let count = UnresolvedExpression::aggregate("COUNT", UnresolvedExpression::AllFields);
        assert_eq!(count.to_string(), "COUNT(*)");
        let cond = UnresolvedExpression::compare(
            ">",
            UnresolvedExpression::field("logs.age"),
            UnresolvedExpression::string("x"),
        );
        assert_eq!(cond.to_string(), "logs.age > 'x'");
    }

    #[test]
    fn test_field_splits_qualifier() {
        assert_eq!(
            UnresolvedExpression::field("logs.response"),
            UnresolvedExpression::QualifiedName {
                parts: vec!["logs".to_string(), "response".to_string()]
            }
        );
    }
}
