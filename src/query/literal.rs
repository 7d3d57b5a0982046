//! Literal formatting for the device query dialect.

use crate::filter::{FilterError, FilterResult, ValueType};

/// Whether the value is already wrapped in single quotes
pub fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'')
}

/// Format a single literal according to its declared type.
///
/// Text values are wrapped in single quotes unless already quoted; numbers,
/// booleans and timestamps are emitted as given.
pub fn format_literal(value: &str, value_type: ValueType) -> String {
    if value_type.is_quoted() && !is_quoted(value) {
        format!("'{}'", value)
    } else {
        value.to_string()
    }
}

/// Format a bracketed, comma separated list such as `[a, b, c]`.
///
/// Each item is trimmed and formatted with [`format_literal`]; the result is
/// re-joined as `['a', 'b', 'c']`. A list with only one of its brackets, or
/// with brackets inside it, is rejected.
pub fn format_in_list(value: &str, value_type: ValueType) -> FilterResult<String> {
    let trimmed = value.trim();
    let opens = trimmed.starts_with('[');
    let closes = trimmed.ends_with(']');
    if opens != closes || (opens && trimmed.len() < 2) {
        return Err(malformed(value, "unbalanced brackets"));
    }

    let inner = if opens {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    if inner.contains(['[', ']']) {
        return Err(malformed(value, "nested or unbalanced brackets"));
    }
    if inner.trim().is_empty() {
        return Ok("[]".to_string());
    }

    let items: Vec<String> = inner
        .split(',')
        .map(|item| format_literal(item.trim(), value_type))
        .collect();
    Ok(format!("[{}]", items.join(", ")))
}

fn malformed(value: &str, reason: &str) -> FilterError {
    FilterError::MalformedValue {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
