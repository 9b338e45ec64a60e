//! Type and value model.
//!
//! Static types (`ExprType`) drive analysis and overload resolution; runtime
//! values (`ExprValue`) flow through the physical operators.

pub mod types;
pub mod value;

pub use types::ExprType;
pub use value::{ExprValue, Row};
