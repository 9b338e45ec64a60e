//! Window functions.
//!
//! A window function is evaluated once per input row against a
//! `CurrentRowWindowFrame`, which knows the previous and current row and
//! can tell whether the partition or the sort key changed between them.
//! Per-execution counters live in a `WindowState` owned by the operator.

pub mod aggregate;
pub mod frame;
pub mod ranking;

pub use aggregate::AggregateWindowFunction;
pub use frame::CurrentRowWindowFrame;
pub use ranking::{RankingFunction, RankingKind};

use crate::ast::SortOption;
use crate::data::{ExprType, ExprValue};
use crate::error::QueryResult;
use crate::expression::aggregation::AggregationState;
use crate::expression::function::{FunctionBuilder, FunctionRepository};
use crate::expression::Expression;
use std::fmt;

pub(crate) fn register(repository: &mut FunctionRepository) {
    for kind in [RankingKind::RowNumber, RankingKind::Rank, RankingKind::DenseRank] {
        repository.register(kind.name(), vec![], FunctionBuilder::Ranking(kind));
    }
}

/// Partitioning and ordering of a window
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowDefinition {
    pub partition_by: Vec<Expression>,
    pub sort_list: Vec<(SortOption, Expression)>,
}

impl WindowDefinition {
    pub fn new(partition_by: Vec<Expression>, sort_list: Vec<(SortOption, Expression)>) -> Self {
        Self {
            partition_by,
            sort_list,
        }
    }
}

impl fmt::Display for WindowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partitions: Vec<String> = self.partition_by.iter().map(|e| e.to_string()).collect();
        let sorts: Vec<String> = self
            .sort_list
            .iter()
            .map(|(option, e)| format!("{} {}", e, option))
            .collect();
        write!(
            f,
            "PARTITION BY [{}] ORDER BY [{}]",
            partitions.join(", "),
            sorts.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowFunction {
    Ranking(RankingFunction),
    /// Any aggregator evaluated as a running aggregate
    Aggregate(AggregateWindowFunction),
}

/// Mutable per-execution state of a window function
#[derive(Debug)]
pub enum WindowState {
    Ranking { rank: i32, total: i32 },
    Aggregate(Option<Box<dyn AggregationState>>),
}

impl WindowFunction {
    pub fn type_of(&self) -> ExprType {
        match self {
            WindowFunction::Ranking(_) => ExprType::Integer,
            WindowFunction::Aggregate(function) => function.aggregator().return_type(),
        }
    }

    pub fn create_state(&self) -> WindowState {
        match self {
            WindowFunction::Ranking(_) => WindowState::Ranking { rank: 0, total: 0 },
            WindowFunction::Aggregate(_) => WindowState::Aggregate(None),
        }
    }

    /// Value for the frame's current row.
    pub fn evaluate(
        &self,
        frame: &CurrentRowWindowFrame,
        state: &mut WindowState,
    ) -> QueryResult<ExprValue> {
        match self {
            WindowFunction::Ranking(function) => function.evaluate(frame, state),
            WindowFunction::Aggregate(function) => function.evaluate(frame, state),
        }
    }
}

impl fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowFunction::Ranking(function) => write!(f, "{}", function),
            WindowFunction::Aggregate(function) => write!(f, "{}", function.aggregator()),
        }
    }
}
