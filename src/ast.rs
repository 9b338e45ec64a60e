//! Unresolved query tree handed over by the parser.
//!
//! Nothing in here is typed yet. The analysis layer turns these nodes into
//! `Expression`s and `LogicalPlan`s.

pub mod expression;
pub mod plan;

pub use expression::{Literal, UnresolvedExpression, When};
pub use plan::{JoinType, NullOrder, RenameField, SortField, SortOption, SortOrder, UnresolvedPlan};
