//! Rule-based logical plan optimizer.
//!
//! A rule pairs a structural `Pattern` with a pure rewrite. Matching a
//! pattern yields an immutable `Captures` record of the named subtrees; the
//! rule builds a new node from the matched one and its captures.
//!
//! The optimizer walks the plan top-down. At each node it applies the first
//! matching rule until none matches, recurses into the children, and then
//! re-checks the node since rewritten children may enable a rule above
//! them. Full passes repeat until a pass leaves the plan unchanged.

use crate::error::QueryResult;
use crate::expression::FunctionRepository;
use crate::planner::logical::{LogicalPlan, PlanKind};
use crate::planner::rules::{MergeAggAndRelation, MergeFilterAndFilter, PushFilterUnderSort};
use indexmap::IndexMap;
use log::{debug, warn};
use std::sync::Arc;

/// Upper bound on full passes; every shipped rule converges well before it.
const MAX_PASSES: usize = 16;

/// Structural pattern over node kinds
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    kind: PlanKind,
    capture: Option<&'static str>,
    source: Option<Box<Pattern>>,
}

impl Pattern {
    pub fn of(kind: PlanKind) -> Self {
        Self {
            kind,
            capture: None,
            source: None,
        }
    }

    /// Require the node's single input to match `source`.
    pub fn with_source(mut self, source: Pattern) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Record the matched node under `name`.
    pub fn captured_as(mut self, name: &'static str) -> Self {
        self.capture = Some(name);
        self
    }

    /// Match against `plan`, returning the captured subtrees on success.
    pub fn matches(&self, plan: &LogicalPlan) -> Option<Captures> {
        if plan.kind() != self.kind {
            return None;
        }
        let mut captures = match &self.source {
            Some(source) => source.matches(plan.input()?)?,
            None => Captures::default(),
        };
        if let Some(name) = self.capture {
            captures.bindings.insert(name, plan.clone());
        }
        Some(captures)
    }
}

/// Subtrees bound by a successful match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Captures {
    bindings: IndexMap<&'static str, LogicalPlan>,
}

impl Captures {
    pub fn get(&self, name: &str) -> Option<&LogicalPlan> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Plan rewrite rule
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    fn pattern(&self) -> &Pattern;

    /// Rewrite a node the pattern matched.
    fn apply(&self, plan: LogicalPlan, captures: &Captures) -> QueryResult<LogicalPlan>;
}

pub struct LogicalPlanOptimizer {
    rules: Vec<Box<dyn Rule>>,
}

impl LogicalPlanOptimizer {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Optimizer with the full rule catalogue.
    pub fn with_default_rules(repository: Arc<FunctionRepository>) -> Self {
        Self::new(vec![
            Box::new(MergeFilterAndFilter::new(repository)),
            Box::new(PushFilterUnderSort::new()),
            Box::new(MergeAggAndRelation::new()),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn optimize(&self, plan: LogicalPlan) -> QueryResult<LogicalPlan> {
        let mut current = plan;
        for pass in 1..=MAX_PASSES {
            let next = self.optimize_node(current.clone())?;
            if next == current {
                debug!("optimizer reached fixpoint after {} passes", pass);
                return Ok(next);
            }
            current = next;
        }
        warn!(
            "optimizer did not converge after {} passes, using last plan",
            MAX_PASSES
        );
        Ok(current)
    }

    fn optimize_node(&self, plan: LogicalPlan) -> QueryResult<LogicalPlan> {
        let plan = self.apply_rules(plan)?;
        let plan = plan.map_children(|child| self.optimize_node(child))?;
        self.apply_rules(plan)
    }

    fn apply_rules(&self, mut plan: LogicalPlan) -> QueryResult<LogicalPlan> {
        'rewrite: loop {
            for rule in &self.rules {
                if let Some(captures) = rule.pattern().matches(&plan) {
                    debug!("apply rule {} to {:?} node", rule.name(), plan.kind());
                    plan = rule.apply(plan, &captures)?;
                    continue 'rewrite;
                }
            }
            return Ok(plan);
        }
    }
}
