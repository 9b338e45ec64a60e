//! Window operator.
//!
//! Streams its input, which the planner has already sorted by partition
//! and sort keys, and appends the window function's value to each row.

use crate::data::ExprValue;
use crate::error::{QueryError, QueryResult};
use crate::executor::{not_initialized, PhysicalOperator};
use crate::expression::window::{CurrentRowWindowFrame, WindowDefinition, WindowState};
use crate::expression::{Expression, NamedExpression, WindowFunction};

pub struct WindowOperator {
    input: Box<dyn PhysicalOperator>,
    name: String,
    function: WindowFunction,
    frame: CurrentRowWindowFrame,
    state: Option<WindowState>,
}

impl WindowOperator {
    /// Fails if `function` does not wrap a window function.
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        function: NamedExpression,
        definition: WindowDefinition,
    ) -> QueryResult<Self> {
        let name = function.name_or_alias().to_string();
        let window_function = match function.delegated {
            Expression::Window(window_function) => window_function,
            other => {
                return Err(QueryError::semantic(format!(
                    "{} is not a window function",
                    other
                )))
            }
        };
        Ok(Self {
            input,
            name,
            function: window_function,
            frame: CurrentRowWindowFrame::new(definition),
            state: None,
        })
    }
}

impl PhysicalOperator for WindowOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        self.state = Some(self.function.create_state());
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        let Some(state) = self.state.as_mut() else {
            return Err(not_initialized());
        };
        let Some(row) = self.input.next()? else {
            return Ok(None);
        };
        self.frame.load(row);
        let value = self.function.evaluate(&self.frame, state)?;

        let mut output = self.frame.current()?.tuple_value()?.clone();
        output.insert(self.name.clone(), value);
        Ok(Some(ExprValue::Tuple(output)))
    }
}
