//! End-to-end query driver.
//!
//! `QueryEngine` wires the stages together: analyze the unresolved plan,
//! optimize the logical plan, compile it into physical operators and pull
//! every row.

pub mod json;
pub mod request;

pub use json::{row_from_json, value_from_json, value_to_json};
pub use request::{QueryRequest, TableDefinition};

use crate::analysis::{AnalysisContext, ExpressionAnalyzer, PlanAnalyzer};
use crate::ast::UnresolvedPlan;
use crate::data::ExprValue;
use crate::error::QueryResult;
use crate::executor::collect_rows;
use crate::expression::FunctionRepository;
use crate::planner::{LogicalPlan, LogicalPlanOptimizer, PhysicalPlanner};
use crate::storage::StorageEngine;
use log::{debug, info};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run the rule-based optimizer between analysis and execution.
    pub optimize: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { optimize: true }
    }
}

pub struct QueryEngine {
    analyzer: PlanAnalyzer,
    optimizer: LogicalPlanOptimizer,
    planner: PhysicalPlanner,
    config: EngineConfig,
}

impl QueryEngine {
    pub fn new(storage: Arc<dyn StorageEngine>, config: EngineConfig) -> Self {
        let repository = Arc::new(FunctionRepository::with_builtins());
        Self {
            analyzer: PlanAnalyzer::new(
                ExpressionAnalyzer::new(repository.clone()),
                storage.clone(),
            ),
            optimizer: LogicalPlanOptimizer::with_default_rules(repository),
            planner: PhysicalPlanner::new(storage),
            config,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Analyze and, when enabled, optimize.
    pub fn plan(&self, plan: &UnresolvedPlan) -> QueryResult<LogicalPlan> {
        let mut context = AnalysisContext::new();
        let logical = self.analyzer.analyze(plan, &mut context)?;
        debug!("analyzed plan:\n{}", logical.explain(0));
        if !self.config.optimize {
            return Ok(logical);
        }
        let optimized = self.optimizer.optimize(logical)?;
        debug!("optimized plan:\n{}", optimized.explain(0));
        Ok(optimized)
    }

    pub fn explain(&self, plan: &UnresolvedPlan) -> QueryResult<String> {
        Ok(self.plan(plan)?.explain(0))
    }

    pub fn execute(&self, plan: &UnresolvedPlan) -> QueryResult<Vec<ExprValue>> {
        let logical = self.plan(plan)?;
        self.execute_plan(logical)
    }

    pub fn execute_plan(&self, plan: LogicalPlan) -> QueryResult<Vec<ExprValue>> {
        let mut operator = self.planner.implement(plan)?;
        let rows = collect_rows(operator.as_mut())?;
        info!("query returned {} rows", rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::UnresolvedExpression as U;
    use crate::data::ExprType;
    use crate::storage::{MemoryStorage, MemoryTable};
    use indexmap::IndexMap;

    fn storage() -> Arc<MemoryStorage> {
        let storage = MemoryStorage::new();
        let schema: IndexMap<String, ExprType> = [
            ("action".to_string(), ExprType::String),
            ("response".to_string(), ExprType::Integer),
        ]
        .into_iter()
        .collect();
        let rows = vec![
            ExprValue::tuple([("action", ExprValue::from("GET")), ("response", ExprValue::from(200))]),
            ExprValue::tuple([("action", ExprValue::from("GET")), ("response", ExprValue::from(404))]),
            ExprValue::tuple([("action", ExprValue::from("POST")), ("response", ExprValue::from(200))]),
        ];
        storage.add_table(MemoryTable::new("logs", schema, rows));
        Arc::new(storage)
    }

    #[test]
    fn test_execute_filter_project() -> anyhow::Result<()> {
        let engine = QueryEngine::new(storage(), EngineConfig::default());
        let plan = UnresolvedPlan::relation("logs")
            .filter(U::equal_to(U::field("response"), U::int(200)))
            .project(vec![U::field("action")]);
        let rows = engine.execute(&plan)?;
        assert_eq!(
            rows,
            vec![
                ExprValue::tuple([("action", ExprValue::from("GET"))]),
                ExprValue::tuple([("action", ExprValue::from("POST"))]),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_optimizer_switch() -> anyhow::Result<()> {
        let plan = UnresolvedPlan::relation("logs")
            .aggregation(vec![U::aggregate("count", U::field("response"))], vec![]);

        let optimized = QueryEngine::new(storage(), EngineConfig::default()).plan(&plan)?;
        assert!(matches!(optimized, LogicalPlan::RelationAggregation { .. }));

        let raw = QueryEngine::new(storage(), EngineConfig { optimize: false }).plan(&plan)?;
        assert!(matches!(raw, LogicalPlan::Aggregation { .. }));
        Ok(())
    }
}
