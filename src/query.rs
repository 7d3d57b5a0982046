//! Device query construction.
//!
//! This module provides:
//! - Literal quoting and list formatting for the query dialect
//! - Compilation of clause lists into `SELECT ... FROM devices` queries
//! - The `FilterSet` facade dispatching to the compiler or the in-memory evaluator

pub mod compiler;
pub mod filter_set;
pub mod literal;

pub use compiler::{
    build_query, compile_clause, compile_condition, twin_property_path, QueryKind,
    DEVICES_COUNT_QUERY, DEVICES_QUERY,
};
pub use filter_set::{FilterSet, SortOrder};
pub use literal::{format_in_list, format_literal, is_quoted};
