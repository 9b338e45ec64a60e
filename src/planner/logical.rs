//! Logical query plan representation.
//!
//! Logical plans are produced by the plan analyzer and rewritten by the
//! optimizer. Nodes are immutable: every rewrite builds a new tree.

use crate::ast::{JoinType, SortOption};
use crate::error::QueryResult;
use crate::expression::window::WindowDefinition;
use crate::expression::{Expression, NamedAggregator, NamedExpression};

/// Logical plan node
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    /// Scan every row of a table
    Relation { table_name: String },

    /// Table scan whose aggregation is computed by the storage layer
    RelationAggregation {
        table_name: String,
        aggregators: Vec<NamedAggregator>,
        group_by: Vec<NamedExpression>,
    },

    /// Keep rows whose condition is TRUE
    Filter {
        input: Box<LogicalPlan>,
        condition: Expression,
    },

    /// Group rows and fold aggregators per group
    Aggregation {
        input: Box<LogicalPlan>,
        aggregators: Vec<NamedAggregator>,
        group_by: Vec<NamedExpression>,
    },

    /// Evaluate the projection list per row
    Project {
        input: Box<LogicalPlan>,
        projections: Vec<NamedExpression>,
    },

    /// Rename fields (old name, new name)
    Rename {
        input: Box<LogicalPlan>,
        mapping: Vec<(String, String)>,
    },

    /// Append a window function column; input is sorted by the definition
    Window {
        input: Box<LogicalPlan>,
        function: NamedExpression,
        definition: WindowDefinition,
    },

    Sort {
        input: Box<LogicalPlan>,
        sort_list: Vec<(SortOption, Expression)>,
    },

    /// Nested loop join. `right_fields` lists the right side's output
    /// fields, used to pad unmatched rows of a LEFT join.
    Join {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
        join_type: JoinType,
        condition: Option<Expression>,
        right_fields: Vec<String>,
    },
}

/// Node kind, used by optimizer patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKind {
    Relation,
    RelationAggregation,
    Filter,
    Aggregation,
    Project,
    Rename,
    Window,
    Sort,
    Join,
}

impl LogicalPlan {
    pub fn kind(&self) -> PlanKind {
        match self {
            LogicalPlan::Relation { .. } => PlanKind::Relation,
            LogicalPlan::RelationAggregation { .. } => PlanKind::RelationAggregation,
            LogicalPlan::Filter { .. } => PlanKind::Filter,
            LogicalPlan::Aggregation { .. } => PlanKind::Aggregation,
            LogicalPlan::Project { .. } => PlanKind::Project,
            LogicalPlan::Rename { .. } => PlanKind::Rename,
            LogicalPlan::Window { .. } => PlanKind::Window,
            LogicalPlan::Sort { .. } => PlanKind::Sort,
            LogicalPlan::Join { .. } => PlanKind::Join,
        }
    }

    /// Direct children, left to right
    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Relation { .. } | LogicalPlan::RelationAggregation { .. } => vec![],
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Aggregation { input, .. }
            | LogicalPlan::Project { input, .. }
            | LogicalPlan::Rename { input, .. }
            | LogicalPlan::Window { input, .. }
            | LogicalPlan::Sort { input, .. } => vec![&**input],
            LogicalPlan::Join { left, right, .. } => vec![&**left, &**right],
        }
    }

    /// The single input of a unary node
    pub fn input(&self) -> Option<&LogicalPlan> {
        match self.children().as_slice() {
            [input] => Some(*input),
            _ => None,
        }
    }

    /// Rebuild this node with every child replaced by `f(child)`.
    pub fn map_children<F>(self, mut f: F) -> QueryResult<LogicalPlan>
    where
        F: FnMut(LogicalPlan) -> QueryResult<LogicalPlan>,
    {
        let mut apply = |input: Box<LogicalPlan>| f(*input).map(Box::new);
        let plan = match self {
            LogicalPlan::Relation { .. } | LogicalPlan::RelationAggregation { .. } => self,
            LogicalPlan::Filter { input, condition } => LogicalPlan::Filter {
                input: apply(input)?,
                condition,
            },
            LogicalPlan::Aggregation {
                input,
                aggregators,
                group_by,
            } => LogicalPlan::Aggregation {
                input: apply(input)?,
                aggregators,
                group_by,
            },
            LogicalPlan::Project { input, projections } => LogicalPlan::Project {
                input: apply(input)?,
                projections,
            },
            LogicalPlan::Rename { input, mapping } => LogicalPlan::Rename {
                input: apply(input)?,
                mapping,
            },
            LogicalPlan::Window {
                input,
                function,
                definition,
            } => LogicalPlan::Window {
                input: apply(input)?,
                function,
                definition,
            },
            LogicalPlan::Sort { input, sort_list } => LogicalPlan::Sort {
                input: apply(input)?,
                sort_list,
            },
            LogicalPlan::Join {
                left,
                right,
                join_type,
                condition,
                right_fields,
            } => {
                let left = apply(left)?;
                let right = apply(right)?;
                LogicalPlan::Join {
                    left,
                    right,
                    join_type,
                    condition,
                    right_fields,
                }
            }
        };
        Ok(plan)
    }

    /// Get a human-readable explanation of this plan
    pub fn explain(&self, indent_level: usize) -> String {
        let indent = "  ".repeat(indent_level);
        let header = match self {
            LogicalPlan::Relation { table_name } => format!("Relation: {}", table_name),
            LogicalPlan::RelationAggregation {
                table_name,
                aggregators,
                group_by,
            } => format!(
                "RelationAggregation: {} aggregators=[{}] group_by=[{}]",
                table_name,
                join(aggregators),
                join(group_by)
            ),
            LogicalPlan::Filter { condition, .. } => format!("Filter: {}", condition),
            LogicalPlan::Aggregation {
                aggregators,
                group_by,
                ..
            } => format!(
                "Aggregation: aggregators=[{}] group_by=[{}]",
                join(aggregators),
                join(group_by)
            ),
            LogicalPlan::Project { projections, .. } => {
                format!("Project: [{}]", join(projections))
            }
            LogicalPlan::Rename { mapping, .. } => {
                let pairs: Vec<String> = mapping
                    .iter()
                    .map(|(from, to)| format!("{} -> {}", from, to))
                    .collect();
                format!("Rename: [{}]", pairs.join(", "))
            }
            LogicalPlan::Window {
                function,
                definition,
                ..
            } => format!("Window: {} OVER ({})", function, definition),
            LogicalPlan::Sort { sort_list, .. } => {
                let keys: Vec<String> = sort_list
                    .iter()
                    .map(|(option, expr)| format!("{} {}", expr, option))
                    .collect();
                format!("Sort: [{}]", keys.join(", "))
            }
            LogicalPlan::Join {
                join_type,
                condition,
                ..
            } => {
                let on = condition
                    .as_ref()
                    .map(|c| format!(" ON {}", c))
                    .unwrap_or_default();
                format!("Join: {:?}{}", join_type, on)
            }
        };

        let mut result = format!("{}{}", indent, header);
        for child in self.children() {
            result.push('\n');
            result.push_str(&child.explain(indent_level + 1));
        }
        result
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
