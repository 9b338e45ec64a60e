//! Unresolved plan nodes

use crate::ast::UnresolvedExpression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Placement of NULL and MISSING keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullOrder {
    First,
    Last,
}

/// Ordering of one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortOption {
    #[serde(default)]
    pub order: SortOrder,
    /// Explicit NULL placement; derived from `order` when absent.
    #[serde(default)]
    pub null_order: Option<NullOrder>,
}

impl SortOption {
    pub const ASC: SortOption = SortOption {
        order: SortOrder::Asc,
        null_order: None,
    };

    pub const DESC: SortOption = SortOption {
        order: SortOrder::Desc,
        null_order: None,
    };

    pub fn with_null_order(order: SortOrder, null_order: NullOrder) -> Self {
        Self {
            order,
            null_order: Some(null_order),
        }
    }

    /// NULLs first for ASC and last for DESC unless set explicitly.
    pub fn null_order(&self) -> NullOrder {
        self.null_order.unwrap_or(match self.order {
            SortOrder::Asc => NullOrder::First,
            SortOrder::Desc => NullOrder::Last,
        })
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let nulls = match self.null_order() {
            NullOrder::First => "NULLS FIRST",
            NullOrder::Last => "NULLS LAST",
        };
        write!(f, "{} {}", order, nulls)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    pub field: UnresolvedExpression,
    #[serde(default)]
    pub option: SortOption,
}

impl SortField {
    pub fn new(field: UnresolvedExpression, option: SortOption) -> Self {
        Self { field, option }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameField {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnresolvedPlan {
    Relation {
        table_name: String,
        #[serde(default)]
        alias: Option<String>,
    },
    Filter {
        input: Box<UnresolvedPlan>,
        condition: UnresolvedExpression,
    },
    Aggregation {
        input: Box<UnresolvedPlan>,
        aggregators: Vec<UnresolvedExpression>,
        #[serde(default)]
        group_by: Vec<UnresolvedExpression>,
    },
    Project {
        input: Box<UnresolvedPlan>,
        projections: Vec<UnresolvedExpression>,
    },
    Rename {
        input: Box<UnresolvedPlan>,
        mapping: Vec<RenameField>,
    },
    Sort {
        input: Box<UnresolvedPlan>,
        sort_list: Vec<SortField>,
    },
    /// Appends one window function column to every input row.
    Window {
        input: Box<UnresolvedPlan>,
        function: UnresolvedExpression,
    },
    Join {
        left: Box<UnresolvedPlan>,
        right: Box<UnresolvedPlan>,
        #[serde(default)]
        join_type: JoinType,
        #[serde(default)]
        condition: Option<UnresolvedExpression>,
    },
}

impl UnresolvedPlan {
    pub fn relation(table_name: &str) -> Self {
        UnresolvedPlan::Relation {
            table_name: table_name.to_string(),
            alias: None,
        }
    }

    pub fn filter(self, condition: UnresolvedExpression) -> Self {
        UnresolvedPlan::Filter {
            input: Box::new(self),
            condition,
        }
    }

    pub fn aggregation(
        self,
        aggregators: Vec<UnresolvedExpression>,
        group_by: Vec<UnresolvedExpression>,
    ) -> Self {
        UnresolvedPlan::Aggregation {
            input: Box::new(self),
            aggregators,
            group_by,
        }
    }

    pub fn project(self, projections: Vec<UnresolvedExpression>) -> Self {
        UnresolvedPlan::Project {
            input: Box::new(self),
            projections,
        }
    }

    pub fn sort(self, sort_list: Vec<SortField>) -> Self {
        UnresolvedPlan::Sort {
            input: Box::new(self),
            sort_list,
        }
    }

    pub fn window(self, function: UnresolvedExpression) -> Self {
        UnresolvedPlan::Window {
            input: Box::new(self),
            function,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_null_order() {
        assert_eq!(SortOption::ASC.null_order(), NullOrder::First);
        assert_eq!(SortOption::DESC.null_order(), NullOrder::Last);
        assert_eq!(
            SortOption::with_null_order(SortOrder::Asc, NullOrder::Last).null_order(),
            NullOrder::Last
        );
    }

    #[test]
    fn test_deserialize_plan() -> anyhow::Result<()> {
        let json = r#"{
            "type": "filter",
            "input": {"type": "relation", "table_name": "logs"},
            "condition": {
                "type": "compare",
                "operator": ">",
                "left": {"type": "qualified_name", "parts": ["response"]},
                "right": {"type": "literal", "value": {"type": "integer", "value": 200}}
            }
        }"#;
        let plan: UnresolvedPlan = serde_json::from_str(json)?;
        assert_eq!(
            plan,
            UnresolvedPlan::relation("logs").filter(UnresolvedExpression::compare(
                ">",
                UnresolvedExpression::field("response"),
                UnresolvedExpression::int(200)
            ))
        );
        Ok(())
    }

    #[test]
    fn test_deserialize_sort_defaults() -> anyhow::Result<()> {
        let field: SortField =
            serde_json::from_str(r#"{"field": {"type": "qualified_name", "parts": ["age"]}}"#)?;
        assert_eq!(field.option, SortOption::ASC);
        Ok(())
    }
}
