//! Logical plan to physical operator tree.

use crate::error::QueryResult;
use crate::executor::{
    AggregationOperator, FilterOperator, NestedLoopJoinOperator, PhysicalOperator,
    ProjectOperator, RenameOperator, SortOperator, WindowOperator,
};
use crate::planner::logical::LogicalPlan;
use crate::storage::StorageEngine;
use log::debug;
use std::sync::Arc;

/// Compiles logical plans into operators. Leaf scans come from storage.
pub struct PhysicalPlanner {
    storage: Arc<dyn StorageEngine>,
}

impl PhysicalPlanner {
    pub fn new(storage: Arc<dyn StorageEngine>) -> Self {
        Self { storage }
    }

    /// Build the operator tree for `plan`. The result is single use.
    pub fn implement(&self, plan: LogicalPlan) -> QueryResult<Box<dyn PhysicalOperator>> {
        debug!("implement {:?} node", plan.kind());
        let operator: Box<dyn PhysicalOperator> = match plan {
            LogicalPlan::Relation { table_name } => self.storage.get_table(&table_name)?.scan(),
            LogicalPlan::RelationAggregation {
                table_name,
                aggregators,
                group_by,
            } => self
                .storage
                .get_table(&table_name)?
                .scan_with_aggregation(aggregators, group_by),
            LogicalPlan::Filter { input, condition } => {
                Box::new(FilterOperator::new(self.implement(*input)?, condition))
            }
            LogicalPlan::Aggregation {
                input,
                aggregators,
                group_by,
            } => Box::new(AggregationOperator::new(
                self.implement(*input)?,
                aggregators,
                group_by,
            )),
            LogicalPlan::Project { input, projections } => {
                Box::new(ProjectOperator::new(self.implement(*input)?, projections))
            }
            LogicalPlan::Rename { input, mapping } => {
                Box::new(RenameOperator::new(self.implement(*input)?, mapping))
            }
            LogicalPlan::Window {
                input,
                function,
                definition,
            } => Box::new(WindowOperator::new(
                self.implement(*input)?,
                function,
                definition,
            )?),
            LogicalPlan::Sort { input, sort_list } => {
                Box::new(SortOperator::new(self.implement(*input)?, sort_list))
            }
            LogicalPlan::Join {
                left,
                right,
                join_type,
                condition,
                right_fields,
            } => Box::new(NestedLoopJoinOperator::new(
                self.implement(*left)?,
                self.implement(*right)?,
                join_type,
                condition,
                right_fields,
            )),
        };
        Ok(operator)
    }
}
