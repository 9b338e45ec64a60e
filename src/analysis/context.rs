//! Scope stack threaded through one analysis call.

use crate::analysis::type_env::TypeEnvironment;
use log::trace;
use std::mem;

/// Scope stack for one analysis call.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    environment: TypeEnvironment,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(environment: TypeEnvironment) -> Self {
        Self { environment }
    }

    /// Innermost scope
    pub fn peek(&self) -> &TypeEnvironment {
        &self.environment
    }

    pub fn peek_mut(&mut self) -> &mut TypeEnvironment {
        &mut self.environment
    }

    /// Open a new, empty scope nested in the current one.
    pub fn push(&mut self) {
        trace!("push analysis scope");
        let current = mem::take(&mut self.environment);
        self.environment = TypeEnvironment::with_parent(current);
    }

    /// Close the innermost scope and return it, detached from its parent.
    /// The outermost scope is never popped.
    pub fn pop(&mut self) -> Option<TypeEnvironment> {
        let parent = self.environment.take_parent()?;
        trace!("pop analysis scope");
        Some(mem::replace(&mut self.environment, parent))
    }
}
