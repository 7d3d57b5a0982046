//! Compilation of clauses into the device query dialect.
//!
//! Basic-mode filters are translated clause by clause and joined with `AND`.
//! Only comparison, membership and existence operators can be compiled; the
//! text-matching operators belong to the in-memory evaluator.

use crate::filter::{Clause, ClauseOperator, FilterError, FilterResult};
use crate::query::literal::{format_in_list, format_literal};
use log::trace;

/// Query selecting whole device documents
pub const DEVICES_QUERY: &str = "SELECT * FROM devices";

/// Query counting matching devices
pub const DEVICES_COUNT_QUERY: &str = "SELECT COUNT() AS total FROM devices";

/// Twin property sections that live under `properties.` in the query dialect
const TWIN_PROPERTY_SECTIONS: [&str; 2] = ["reported.", "desired."];

/// Projection a compiled query starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Select,
    Count,
}

impl QueryKind {
    pub fn base(&self) -> &'static str {
        match self {
            QueryKind::Select => DEVICES_QUERY,
            QueryKind::Count => DEVICES_COUNT_QUERY,
        }
    }
}

/// Column path as addressed by the query dialect
pub fn twin_property_path(column: &str) -> String {
    if TWIN_PROPERTY_SECTIONS
        .iter()
        .any(|section| column.starts_with(section))
    {
        format!("properties.{}", column)
    } else {
        column.to_string()
    }
}

/// Compile one clause into a condition
pub fn compile_clause(clause: &Clause) -> FilterResult<String> {
    let column = twin_property_path(clause.column_name.trim());

    let op = match clause.operator {
        ClauseOperator::Eq => "=",
        ClauseOperator::Ne => "!=",
        ClauseOperator::Lt => "<",
        ClauseOperator::Gt => ">",
        ClauseOperator::Le => "<=",
        ClauseOperator::Ge => ">=",
        ClauseOperator::In => {
            let list = format_in_list(&clause.value, clause.value_type)?;
            return Ok(format!("{} IN {}", column, list));
        }
        ClauseOperator::IsDefined => return Ok(format!("is_defined({})", column)),
        ClauseOperator::Status
        | ClauseOperator::ExactMatchCaseSensitive
        | ClauseOperator::ExactMatchCaseInsensitive
        | ClauseOperator::StartsWithCaseSensitive
        | ClauseOperator::StartsWithCaseInsensitive
        | ClauseOperator::ContainsCaseSensitive
        | ClauseOperator::ContainsCaseInsensitive => {
            return Err(FilterError::UnsupportedOperator {
                operator: clause.operator.to_string(),
                context: "query compiler",
            })
        }
    };

    Ok(format!(
        "{} {} {}",
        column,
        op,
        format_literal(&clause.value, clause.value_type)
    ))
}

/// Compile the active clauses into one AND-joined condition.
///
/// Returns an empty string when no clause names a column.
pub fn compile_condition(clauses: &[Clause]) -> FilterResult<String> {
    let mut conditions = Vec::with_capacity(clauses.len());
    for clause in clauses {
        if !clause.is_active() {
            trace!("Skipping clause without a column name");
            continue;
        }
        conditions.push(compile_clause(clause)?);
    }
    Ok(conditions.join(" AND "))
}

/// Attach a condition to a base query, omitting `WHERE` for blank conditions
pub fn build_query(kind: QueryKind, condition: &str) -> String {
    if condition.trim().is_empty() {
        kind.base().to_string()
    } else {
        format!("{} WHERE {}", kind.base(), condition)
    }
}
