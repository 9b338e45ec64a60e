//! Unresolved plan to `LogicalPlan`.
//!
//! Walks the plan bottom-up. Each node first analyzes its input, which
//! leaves the input's output fields defined in the context, and then
//! resolves its own expressions against them. Nodes that change the row
//! shape (aggregation, projection, rename, window) update the innermost
//! scope to describe their output.

use crate::analysis::context::AnalysisContext;
use crate::analysis::expression_analyzer::ExpressionAnalyzer;
use crate::analysis::symbol::{Namespace, Symbol, SymbolTable};
use crate::ast::{JoinType, RenameField, SortField, SortOption, UnresolvedExpression, UnresolvedPlan};
use crate::data::ExprType;
use crate::error::{QueryError, QueryResult};
use crate::expression::window::WindowDefinition;
use crate::expression::{Expression, NamedAggregator, NamedExpression};
use crate::planner::LogicalPlan;
use crate::storage::StorageEngine;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

pub struct PlanAnalyzer {
    expression_analyzer: ExpressionAnalyzer,
    storage: Arc<dyn StorageEngine>,
}

impl PlanAnalyzer {
    pub fn new(expression_analyzer: ExpressionAnalyzer, storage: Arc<dyn StorageEngine>) -> Self {
        Self {
            expression_analyzer,
            storage,
        }
    }

    pub fn analyze(
        &self,
        plan: &UnresolvedPlan,
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        match plan {
            UnresolvedPlan::Relation { table_name, alias } => {
                self.analyze_relation(table_name, alias.as_deref(), context)
            }
            UnresolvedPlan::Filter { input, condition } => {
                let input = self.analyze(input, context)?;
                let condition = self.expression_analyzer.analyze(condition, context)?;
                Ok(LogicalPlan::Filter {
                    input: Box::new(input),
                    condition,
                })
            }
            UnresolvedPlan::Aggregation {
                input,
                aggregators,
                group_by,
            } => self.analyze_aggregation(input, aggregators, group_by, context),
            UnresolvedPlan::Project { input, projections } => {
                self.analyze_project(input, projections, context)
            }
            UnresolvedPlan::Rename { input, mapping } => {
                self.analyze_rename(input, mapping, context)
            }
            UnresolvedPlan::Sort { input, sort_list } => {
                let input = self.analyze(input, context)?;
                let sort_list = self.analyze_sort_list(sort_list, context)?;
                Ok(LogicalPlan::Sort {
                    input: Box::new(input),
                    sort_list,
                })
            }
            UnresolvedPlan::Window { input, function } => {
                self.analyze_window(input, function, context)
            }
            UnresolvedPlan::Join {
                left,
                right,
                join_type,
                condition,
            } => self.analyze_join(left, right, *join_type, condition.as_ref(), context),
        }
    }

    fn analyze_relation(
        &self,
        table_name: &str,
        alias: Option<&str>,
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        let table = self.storage.get_table(table_name)?;
        let env = context.peek_mut();
        for (name, ty) in table.field_types() {
            env.define(&Symbol::field(name.as_str()), *ty);
        }
        env.define(&Symbol::index(table_name), ExprType::Struct);
        if let Some(alias) = alias {
            env.define(&Symbol::index(alias), ExprType::Struct);
        }
        debug!(
            "relation {} defines {} fields",
            table_name,
            table.field_types().len()
        );
        Ok(LogicalPlan::Relation {
            table_name: table_name.to_string(),
        })
    }

    fn analyze_aggregation(
        &self,
        input: &UnresolvedPlan,
        aggregators: &[UnresolvedExpression],
        group_by: &[UnresolvedExpression],
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        let input = self.analyze(input, context)?;

        let mut named_aggregators = Vec::with_capacity(aggregators.len());
        for expr in aggregators {
            let named = self.expression_analyzer.analyze_named(expr, context)?;
            let name = named.name_or_alias().to_string();
            match named.delegated {
                Expression::Aggregator(aggregator) => {
                    named_aggregators.push(NamedAggregator::new(name, aggregator))
                }
                other => {
                    return Err(QueryError::semantic(format!(
                        "{} is not an aggregation function",
                        other
                    )))
                }
            }
        }
        let group_by = group_by
            .iter()
            .map(|expr| self.expression_analyzer.analyze_named(expr, context))
            .collect::<QueryResult<Vec<_>>>()?;

        let mut outputs = HashSet::new();
        let names = group_by
            .iter()
            .map(|expr| expr.name_or_alias())
            .chain(named_aggregators.iter().map(|named| named.name.as_str()));
        for name in names {
            if !outputs.insert(name) {
                return Err(QueryError::semantic(format!(
                    "Duplicate output name [{}] in aggregation",
                    name
                )));
            }
        }

        // Only group keys and aggregated values remain visible
        let env = context.peek_mut();
        env.clear();
        for expr in &group_by {
            env.define(&Symbol::field(expr.name_or_alias()), expr.type_of());
        }
        for named in &named_aggregators {
            env.define(
                &Symbol::field(named.name.as_str()),
                named.aggregator.return_type(),
            );
        }

        Ok(LogicalPlan::Aggregation {
            input: Box::new(input),
            aggregators: named_aggregators,
            group_by,
        })
    }

    fn analyze_project(
        &self,
        input: &UnresolvedPlan,
        projections: &[UnresolvedExpression],
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        let input = self.analyze(input, context)?;

        let mut named = Vec::with_capacity(projections.len());
        for expr in projections {
            match expr {
                UnresolvedExpression::AllFields => {
                    for (name, ty) in context.peek().lookup_all_fields(Namespace::FieldName) {
                        named.push(NamedExpression::new(
                            name.as_str(),
                            Expression::reference(name.as_str(), ty),
                        ));
                    }
                }
                other => named.push(self.expression_analyzer.analyze_named(other, context)?),
            }
        }

        let env = context.peek_mut();
        env.clear();
        for expr in &named {
            env.define(&Symbol::field(expr.name_or_alias()), expr.type_of());
        }

        Ok(LogicalPlan::Project {
            input: Box::new(input),
            projections: named,
        })
    }

    fn analyze_rename(
        &self,
        input: &UnresolvedPlan,
        mapping: &[RenameField],
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        let input = self.analyze(input, context)?;
        let env = context.peek_mut();
        let mut renames = Vec::with_capacity(mapping.len());
        for field in mapping {
            let from = Symbol::field(field.from.as_str());
            let ty = env.resolve(&from)?;
            if field.to != field.from && env.resolve(&Symbol::field(field.to.as_str())).is_ok() {
                return Err(QueryError::semantic(format!(
                    "Rename target [{}] of field [{}] collides with an existing field",
                    field.to, field.from
                )));
            }
            env.remove(&from);
            env.define(&Symbol::field(field.to.as_str()), ty);
            renames.push((field.from.clone(), field.to.clone()));
        }
        Ok(LogicalPlan::Rename {
            input: Box::new(input),
            mapping: renames,
        })
    }

    fn analyze_sort_list(
        &self,
        sort_list: &[SortField],
        context: &AnalysisContext,
    ) -> QueryResult<Vec<(SortOption, Expression)>> {
        sort_list
            .iter()
            .map(|field| {
                let expr = self.expression_analyzer.analyze(&field.field, context)?;
                Ok((field.option, expr))
            })
            .collect()
    }

    fn analyze_window(
        &self,
        input: &UnresolvedPlan,
        function: &UnresolvedExpression,
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        let input = self.analyze(input, context)?;

        let unaliased = match function {
            UnresolvedExpression::Alias { expression, .. } => expression.as_ref(),
            other => other,
        };
        let UnresolvedExpression::WindowFunction {
            partition_by,
            sort_list,
            ..
        } = unaliased
        else {
            return Err(QueryError::semantic(format!(
                "{} is not a window function",
                function
            )));
        };

        let named = self.expression_analyzer.analyze_named(function, context)?;
        let partition_by = partition_by
            .iter()
            .map(|expr| self.expression_analyzer.analyze(expr, context))
            .collect::<QueryResult<Vec<_>>>()?;
        let sort_list = self.analyze_sort_list(sort_list, context)?;
        let definition = WindowDefinition::new(partition_by, sort_list);

        // Rows must arrive grouped by partition and ordered within it
        let sort_keys: Vec<(SortOption, Expression)> = definition
            .partition_by
            .iter()
            .map(|expr| (SortOption::ASC, expr.clone()))
            .chain(definition.sort_list.iter().cloned())
            .collect();
        let input = if sort_keys.is_empty() {
            input
        } else {
            LogicalPlan::Sort {
                input: Box::new(input),
                sort_list: sort_keys,
            }
        };

        context
            .peek_mut()
            .define(&Symbol::field(named.name_or_alias()), named.type_of());

        Ok(LogicalPlan::Window {
            input: Box::new(input),
            function: named,
            definition,
        })
    }

    /// The right input is analyzed in its own scope. Fields defined by
    /// both inputs are renamed to `<qualifier>.<field>` on each side, where
    /// the qualifier is the side's alias or table name, so both columns
    /// reach the output. The condition is analyzed against the merged scope.
    fn analyze_join(
        &self,
        left: &UnresolvedPlan,
        right: &UnresolvedPlan,
        join_type: JoinType,
        condition: Option<&UnresolvedExpression>,
        context: &mut AnalysisContext,
    ) -> QueryResult<LogicalPlan> {
        let left = self.analyze(left, context)?;
        let left_types = context
            .peek()
            .symbol_table()
            .lookup_all_fields(Namespace::FieldName);
        let left_qualifier = qualifier_of(context.peek().symbol_table());

        context.push();
        let analyzed = self.analyze(right, context);
        let right_scope = context.pop();
        let right = analyzed?;
        let right_scope = right_scope
            .ok_or_else(|| QueryError::semantic("join right side lost its scope"))?;
        let right_table = right_scope.symbol_table();
        let right_types = right_table.lookup_all_fields(Namespace::FieldName);
        let right_qualifier = qualifier_of(right_table);

        let mut left_mapping = Vec::new();
        let mut right_mapping = Vec::new();
        for name in right_types.keys().filter(|name| left_types.contains_key(*name)) {
            let (Some(left_qualifier), Some(right_qualifier)) = (&left_qualifier, &right_qualifier)
            else {
                return Err(ambiguous(name));
            };
            if left_qualifier == right_qualifier {
                return Err(ambiguous(name));
            }
            left_mapping.push((name.clone(), format!("{}.{}", left_qualifier, name)));
            right_mapping.push((name.clone(), format!("{}.{}", right_qualifier, name)));
        }

        let env = context.peek_mut();
        for (from, to) in &left_mapping {
            if let Some(ty) = env.remove(&Symbol::field(from.as_str())) {
                env.define(&Symbol::field(to.as_str()), ty);
            }
        }
        let mut right_fields = Vec::with_capacity(right_types.len());
        for (name, ty) in &right_types {
            let output = right_mapping
                .iter()
                .find(|(from, _)| from == name)
                .map(|(_, to)| to.clone())
                .unwrap_or_else(|| name.clone());
            env.define(&Symbol::field(output.as_str()), *ty);
            right_fields.push(output);
        }
        for (name, _) in right_table.lookup_all_fields(Namespace::IndexName) {
            env.define(&Symbol::index(name), ExprType::Struct);
        }
        if !left_mapping.is_empty() {
            debug!("join qualifies shared fields {:?}", left_mapping);
        }

        let condition = match condition {
            Some(expr) => Some(self.expression_analyzer.analyze(expr, context)?),
            None => None,
        };

        Ok(LogicalPlan::Join {
            left: Box::new(renamed(left, left_mapping)),
            right: Box::new(renamed(right, right_mapping)),
            join_type,
            condition,
            right_fields,
        })
    }
}

/// Alias or table name of the most recently analyzed relation in `table`.
fn qualifier_of(table: &SymbolTable) -> Option<String> {
    table
        .lookup_all_fields(Namespace::IndexName)
        .into_keys()
        .last()
}

fn ambiguous(name: &str) -> QueryError {
    QueryError::semantic(format!(
        "Field [{}] is defined by both sides of the join, give each side a distinct table name or alias",
        name
    ))
}

fn renamed(plan: LogicalPlan, mapping: Vec<(String, String)>) -> LogicalPlan {
    if mapping.is_empty() {
        plan
    } else {
        LogicalPlan::Rename {
            input: Box::new(plan),
            mapping,
        }
    }
}
