//! Nested Loop Join operator implementation.
//!
//! The right input is materialized once in `init()`. For each left row it
//! walks every right row and emits the merged row whenever the join
//! condition is TRUE. A LEFT join emits an unmatched left row once, with
//! every right field set to NULL.
//!
//! The two inputs carry disjoint field names. Planning renames a field both
//! sides define to `<qualifier>.<field>` before it reaches this operator.

use crate::ast::JoinType;
use crate::data::{ExprValue, Row};
use crate::error::QueryResult;
use crate::executor::{not_initialized, PhysicalOperator};
use crate::expression::Expression;

pub struct NestedLoopJoinOperator {
    /// Left input, streamed
    left: Box<dyn PhysicalOperator>,
    /// Right input, materialized in `init()`
    right: Box<dyn PhysicalOperator>,
    join_type: JoinType,
    /// Without a condition every pair matches
    condition: Option<Expression>,
    /// Field names used to pad unmatched LEFT join rows
    right_fields: Vec<String>,
    right_rows: Vec<ExprValue>,
    current_left: Option<Row>,
    right_position: usize,
    matched: bool,
    initialized: bool,
}

impl NestedLoopJoinOperator {
    pub fn new(
        left: Box<dyn PhysicalOperator>,
        right: Box<dyn PhysicalOperator>,
        join_type: JoinType,
        condition: Option<Expression>,
        right_fields: Vec<String>,
    ) -> Self {
        Self {
            left,
            right,
            join_type,
            condition,
            right_fields,
            right_rows: Vec::new(),
            current_left: None,
            right_position: 0,
            matched: false,
            initialized: false,
        }
    }

    fn merge(left: &Row, right: &Row) -> ExprValue {
        let mut merged = left.clone();
        for (name, value) in right {
            merged.insert(name.clone(), value.clone());
        }
        ExprValue::Tuple(merged)
    }

    fn pad_right(&self, left: &Row) -> ExprValue {
        let mut padded = left.clone();
        for name in &self.right_fields {
            padded.insert(name.clone(), ExprValue::Null);
        }
        ExprValue::Tuple(padded)
    }

    fn matches(&self, row: &ExprValue) -> QueryResult<bool> {
        match &self.condition {
            Some(condition) => Ok(condition.value_of(row)?.is_true()),
            None => Ok(true),
        }
    }
}

impl PhysicalOperator for NestedLoopJoinOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.left.init()?;
        self.right.init()?;
        self.right_rows.clear();
        while let Some(row) = self.right.next()? {
            self.right_rows.push(row);
        }
        self.current_left = None;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        if !self.initialized {
            return Err(not_initialized());
        }
        loop {
            let left = match self.current_left.take() {
                Some(left) => left,
                None => match self.left.next()? {
                    Some(row) => {
                        self.right_position = 0;
                        self.matched = false;
                        row.tuple_value()?.clone()
                    }
                    None => return Ok(None),
                },
            };

            while self.right_position < self.right_rows.len() {
                let right = self.right_rows[self.right_position].tuple_value()?;
                self.right_position += 1;
                let merged = Self::merge(&left, right);
                if self.matches(&merged)? {
                    self.matched = true;
                    self.current_left = Some(left);
                    return Ok(Some(merged));
                }
            }

            if self.join_type == JoinType::Left && !self.matched {
                return Ok(Some(self.pad_right(&left)));
            }
        }
    }
}
