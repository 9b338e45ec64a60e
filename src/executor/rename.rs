//! Field rename operator.

use crate::data::{ExprValue, Row};
use crate::error::QueryResult;
use crate::executor::{not_initialized, PhysicalOperator};
use std::collections::HashMap;

/// Renames tuple fields by an old name to new name mapping. Field order is
/// kept. Rows that are not tuples pass through unchanged.
pub struct RenameOperator {
    input: Box<dyn PhysicalOperator>,
    mapping: HashMap<String, String>,
    initialized: bool,
}

impl RenameOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, mapping: Vec<(String, String)>) -> Self {
        Self {
            input,
            mapping: mapping.into_iter().collect(),
            initialized: false,
        }
    }

    fn rename(&self, row: ExprValue) -> ExprValue {
        match row {
            ExprValue::Tuple(fields) => ExprValue::Tuple(
                fields
                    .into_iter()
                    .map(|(name, value)| match self.mapping.get(&name) {
                        Some(renamed) => (renamed.clone(), value),
                        None => (name, value),
                    })
                    .collect::<Row>(),
            ),
            other => other,
        }
    }
}

impl PhysicalOperator for RenameOperator {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()?;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<ExprValue>> {
        if !self.initialized {
            return Err(not_initialized());
        }
        Ok(self.input.next()?.map(|row| self.rename(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::collect_rows;
    use crate::executor::testing::MockOperator;

    #[test]
    fn test_rename_fields() -> anyhow::Result<()> {
        let rows = vec![ExprValue::tuple([
            ("ip", ExprValue::from("10.0.0.1")),
            ("action", ExprValue::from("GET")),
        ])];
        let mut rename = RenameOperator::new(
            MockOperator::boxed(rows),
            vec![("ip".to_string(), "host".to_string())],
        );
        let result = collect_rows(&mut rename)?;
        assert_eq!(
            result,
            vec![ExprValue::tuple([
                ("host", ExprValue::from("10.0.0.1")),
                ("action", ExprValue::from("GET")),
            ])]
        );
        Ok(())
    }

    #[test]
    fn test_scalar_rows_pass_through() -> anyhow::Result<()> {
        let mut rename = RenameOperator::new(
            MockOperator::boxed(vec![ExprValue::from(7)]),
            vec![("ip".to_string(), "host".to_string())],
        );
        assert_eq!(collect_rows(&mut rename)?, vec![ExprValue::from(7)]);
        Ok(())
    }
}
