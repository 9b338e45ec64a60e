//! Qualified name handling.

use crate::analysis::context::AnalysisContext;
use crate::analysis::symbol::Symbol;
use crate::error::{QueryError, QueryResult};

/// Strips a table name or alias qualifier from a field path.
///
/// `logs.response` becomes `response` when `logs` names a table in scope.
/// The path is kept as is when the whole path is a field (`a.id` after a
/// join qualified it) or when the first part is a field (`address.city`).
pub struct QualifierAnalyzer<'a> {
    context: &'a AnalysisContext,
}

impl<'a> QualifierAnalyzer<'a> {
    pub fn new(context: &'a AnalysisContext) -> Self {
        Self { context }
    }

    pub fn unqualified(&self, parts: &[String]) -> QueryResult<String> {
        let path = parts.join(".");
        if parts.len() > 1 && self.context.peek().resolve(&Symbol::field(path.as_str())).is_ok() {
            return Ok(path);
        }
        if parts.len() > 1 && self.is_qualifier_index_or_alias(parts)? {
            return Ok(parts[1..].join("."));
        }
        Ok(path)
    }

    fn is_qualifier_index_or_alias(&self, parts: &[String]) -> QueryResult<bool> {
        let qualifier = &parts[0];
        let env = self.context.peek();
        if env.resolve(&Symbol::field(qualifier.as_str())).is_ok() {
            return Ok(false);
        }
        env.resolve(&Symbol::index(qualifier.as_str())).map_err(|_| {
            QueryError::syntax(format!(
                "The qualifier [{}] of qualified name [{}] must be an field name, index name or its alias",
                qualifier,
                parts.join(".")
            ))
        })?;
        Ok(true)
    }
}
