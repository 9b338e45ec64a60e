//! Query planning.
//!
//! Analyzed queries arrive as a `LogicalPlan`. The planner then:
//! 1. Rewrites the logical plan with the rule-based optimizer
//! 2. Compiles the result into a tree of physical operators
//!
//! There is no cost model: rules fire whenever their pattern matches.

pub mod logical;
pub mod optimizer;
pub mod physical;
pub mod rules;

pub use logical::{LogicalPlan, PlanKind};
pub use optimizer::{Captures, LogicalPlanOptimizer, Pattern, Rule};
pub use physical::PhysicalPlanner;
pub use rules::{MergeAggAndRelation, MergeFilterAndFilter, PushFilterUnderSort};
