//! Projection operator implementation.

use crate::data::{ExprValue, Row};
use crate::error::QueryResult;
use crate::executor::{not_initialized, PhysicalOperator};
use crate::expression::NamedExpression;

/// Evaluates the projection list against each input row and emits a tuple
/// keyed by each item's name or alias.
pub struct ProjectOperator {
    input: Box<dyn PhysicalOperator>,
    projections: Vec<NamedExpression>,
    initialized: bool,
}

impl ProjectOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, projections: Vec<NamedExpression>) -> Self {
        Self {
            input,
            projections,
            initialized: false,
        }
    }
}

impl PhysicalOperator for ProjectOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        if !self.initialized {
            return Err(not_initialized());
        }
        let Some(row) = self.input.next()? else {
            return Ok(None);
        };
        let mut output = Row::with_capacity(self.projections.len());
        for projection in &self.projections {
            output.insert(
                projection.name_or_alias().to_string(),
                projection.value_of(&row)?,
            );
        }
        Ok(Some(ExprValue::Tuple(output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExprType;
    use crate::executor::collect_rows;
    use crate::executor::testing::MockOperator;
    use crate::expression::Dsl;

    #[test]
    fn test_project_and_alias() -> anyhow::Result<()> {
        let dsl = Dsl::default();
        let rows = vec![ExprValue::tuple([
            ("action", ExprValue::from("GET")),
            ("response", ExprValue::from(200)),
        ])];
        let projections = vec![
            Dsl::named("action", Dsl::reference("action", ExprType::String)),
            Dsl::named(
                "response + 1",
                dsl.add(Dsl::reference("response", ExprType::Integer), Dsl::literal(1))?,
            )
            .with_alias("next"),
        ];
        let mut project = ProjectOperator::new(MockOperator::boxed(rows), projections);
        assert_eq!(
            collect_rows(&mut project)?,
            vec![ExprValue::tuple([
                ("action", ExprValue::from("GET")),
                ("next", ExprValue::from(201)),
            ])]
        );
        Ok(())
    }

    #[test]
    fn test_absent_field_projects_missing() -> anyhow::Result<()> {
        let rows = vec![ExprValue::tuple([("action", ExprValue::from("GET"))])];
        let projections = vec![Dsl::named(
            "response",
            Dsl::reference("response", ExprType::Integer),
        )];
        let mut project = ProjectOperator::new(MockOperator::boxed(rows), projections);
        assert_eq!(
            collect_rows(&mut project)?,
            vec![ExprValue::tuple([("response", ExprValue::Missing)])]
        );
        Ok(())
    }
}
