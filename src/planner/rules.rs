//! Optimizer rule catalogue.

use crate::error::{QueryError, QueryResult};
use crate::expression::FunctionRepository;
use crate::planner::logical::{LogicalPlan, PlanKind};
use crate::planner::optimizer::{Captures, Pattern, Rule};
use std::sync::Arc;

fn unexpected(rule: &str, plan: &LogicalPlan) -> QueryError {
    QueryError::semantic(format!(
        "rule {} can't be applied to {:?} node",
        rule,
        plan.kind()
    ))
}

/// Aggregation directly over a relation becomes a relation scan with the
/// aggregation pushed down to storage.
pub struct MergeAggAndRelation {
    pattern: Pattern,
}

impl MergeAggAndRelation {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::of(PlanKind::Aggregation)
                .with_source(Pattern::of(PlanKind::Relation).captured_as("relation")),
        }
    }
}

impl Default for MergeAggAndRelation {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MergeAggAndRelation {
    fn name(&self) -> &'static str {
        "MergeAggAndRelation"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, plan: LogicalPlan, captures: &Captures) -> QueryResult<LogicalPlan> {
        let Some(LogicalPlan::Relation { table_name }) = captures.get("relation") else {
            return Err(unexpected(self.name(), &plan));
        };
        match plan {
            LogicalPlan::Aggregation {
                aggregators,
                group_by,
                ..
            } => Ok(LogicalPlan::RelationAggregation {
                table_name: table_name.clone(),
                aggregators,
                group_by,
            }),
            other => Err(unexpected(self.name(), &other)),
        }
    }
}

/// Two adjacent filters become one whose condition is the AND of both,
/// inner condition first.
pub struct MergeFilterAndFilter {
    pattern: Pattern,
    repository: Arc<FunctionRepository>,
}

impl MergeFilterAndFilter {
    pub fn new(repository: Arc<FunctionRepository>) -> Self {
        Self {
            pattern: Pattern::of(PlanKind::Filter)
                .with_source(Pattern::of(PlanKind::Filter).captured_as("child")),
            repository,
        }
    }
}

impl Rule for MergeFilterAndFilter {
    fn name(&self) -> &'static str {
        "MergeFilterAndFilter"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, plan: LogicalPlan, captures: &Captures) -> QueryResult<LogicalPlan> {
        let Some(LogicalPlan::Filter {
            input,
            condition: inner,
        }) = captures.get("child")
        else {
            return Err(unexpected(self.name(), &plan));
        };
        let condition = match plan {
            LogicalPlan::Filter { condition, .. } => condition,
            other => return Err(unexpected(self.name(), &other)),
        };
        let merged = self
            .repository
            .compile("and", vec![inner.clone(), condition])?;
        Ok(LogicalPlan::Filter {
            input: input.clone(),
            condition: merged,
        })
    }
}

/// Filter above a sort moves below it so fewer rows are sorted.
pub struct PushFilterUnderSort {
    pattern: Pattern,
}

impl PushFilterUnderSort {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::of(PlanKind::Filter)
                .with_source(Pattern::of(PlanKind::Sort).captured_as("sort")),
        }
    }
}

impl Default for PushFilterUnderSort {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PushFilterUnderSort {
    fn name(&self) -> &'static str {
        "PushFilterUnderSort"
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, plan: LogicalPlan, captures: &Captures) -> QueryResult<LogicalPlan> {
        let Some(LogicalPlan::Sort { input, sort_list }) = captures.get("sort") else {
            return Err(unexpected(self.name(), &plan));
        };
        let condition = match plan {
            LogicalPlan::Filter { condition, .. } => condition,
            other => return Err(unexpected(self.name(), &other)),
        };
        Ok(LogicalPlan::Sort {
            input: Box::new(LogicalPlan::Filter {
                input: input.clone(),
                condition,
            }),
            sort_list: sort_list.clone(),
        })
    }
}
