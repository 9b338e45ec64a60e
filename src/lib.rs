pub mod analysis;
pub mod ast;
pub mod data;
pub mod driver;
pub mod error;
pub mod executor;
pub mod expression;
pub mod planner;
pub mod storage;
