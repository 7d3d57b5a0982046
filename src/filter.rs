//! Filter model for device list queries.
//!
//! This module provides:
//! - The clause representation (column, operator, value, value type)
//! - The closed set of clause operators
//! - Error types shared by the evaluator and the query compiler

pub mod clause;
pub mod error;
pub mod operator;

pub use clause::{Clause, ValueType};
pub use error::{FilterError, FilterResult};
pub use operator::ClauseOperator;
