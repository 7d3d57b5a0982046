//! Clause definitions.

use crate::filter::operator::ClauseOperator;
use serde::{Deserialize, Deserializer, Serialize};

/// Declared type of a clause value, which decides how it is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
    DateTime,
    Status,
}

impl ValueType {
    /// Whether literals of this type are emitted inside single quotes
    pub fn is_quoted(&self) -> bool {
        matches!(self, ValueType::String | ValueType::Status)
    }
}

/// One column/operator/value filter condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Field to filter on, matched case-insensitively (may be a dotted path)
    #[serde(rename = "ColumnName", default, deserialize_with = "null_as_default")]
    pub column_name: String,
    #[serde(rename = "ClauseType", default)]
    pub operator: ClauseOperator,
    /// Literal to compare against; a bracketed list for `IN`
    #[serde(rename = "ClauseValue", default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(rename = "ClauseDataType", default)]
    pub value_type: ValueType,
}

impl Clause {
    /// Create a clause over a string value
    pub fn new(
        column_name: impl Into<String>,
        operator: ClauseOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            operator,
            value: value.into(),
            value_type: ValueType::String,
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// A clause only participates in filtering when it names a column
    pub fn is_active(&self) -> bool {
        !self.column_name.trim().is_empty()
    }
}

/// Decode a JSON `null` as the type's default (empty string, empty list)
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
