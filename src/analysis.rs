//! Semantic analysis.
//!
//! Turns the unresolved tree into typed expressions and a logical plan:
//! names are resolved against a scoped type environment, functions against
//! the builtin registry.

pub mod context;
pub mod expression_analyzer;
pub mod plan_analyzer;
pub mod qualifier;
pub mod symbol;
pub mod type_env;

pub use context::AnalysisContext;
pub use expression_analyzer::ExpressionAnalyzer;
pub use plan_analyzer::PlanAnalyzer;
pub use qualifier::QualifierAnalyzer;
pub use symbol::{Namespace, Symbol, SymbolTable};
pub use type_env::TypeEnvironment;
