//! Operator definitions for filter clauses.

use crate::filter::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operators a clause can carry.
///
/// The text-matching operators and `Status` are evaluated in memory; the
/// relational operators, `In` and `IsDefined` are compiled into the device
/// query dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClauseOperator {
    Status,
    ExactMatchCaseSensitive,
    ExactMatchCaseInsensitive,
    StartsWithCaseSensitive,
    StartsWithCaseInsensitive,
    ContainsCaseSensitive,
    ContainsCaseInsensitive,

    // Comparison
    #[default]
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "NE")]
    Ne,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "LE")]
    Le,
    #[serde(rename = "GE")]
    Ge,

    // Membership and existence
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "ISDEFINED")]
    IsDefined,
}

impl ClauseOperator {
    pub const ALL: [ClauseOperator; 15] = [
        ClauseOperator::Status,
        ClauseOperator::ExactMatchCaseSensitive,
        ClauseOperator::ExactMatchCaseInsensitive,
        ClauseOperator::StartsWithCaseSensitive,
        ClauseOperator::StartsWithCaseInsensitive,
        ClauseOperator::ContainsCaseSensitive,
        ClauseOperator::ContainsCaseInsensitive,
        ClauseOperator::Eq,
        ClauseOperator::Ne,
        ClauseOperator::Lt,
        ClauseOperator::Gt,
        ClauseOperator::Le,
        ClauseOperator::Ge,
        ClauseOperator::In,
        ClauseOperator::IsDefined,
    ];

    /// Get the stored name of this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseOperator::Status => "Status",
            ClauseOperator::ExactMatchCaseSensitive => "ExactMatchCaseSensitive",
            ClauseOperator::ExactMatchCaseInsensitive => "ExactMatchCaseInsensitive",
            ClauseOperator::StartsWithCaseSensitive => "StartsWithCaseSensitive",
            ClauseOperator::StartsWithCaseInsensitive => "StartsWithCaseInsensitive",
            ClauseOperator::ContainsCaseSensitive => "ContainsCaseSensitive",
            ClauseOperator::ContainsCaseInsensitive => "ContainsCaseInsensitive",
            ClauseOperator::Eq => "EQ",
            ClauseOperator::Ne => "NE",
            ClauseOperator::Lt => "LT",
            ClauseOperator::Gt => "GT",
            ClauseOperator::Le => "LE",
            ClauseOperator::Ge => "GE",
            ClauseOperator::In => "IN",
            ClauseOperator::IsDefined => "ISDEFINED",
        }
    }

    /// Whether the operator compares text, with or without case folding
    pub fn is_text_match(&self) -> bool {
        matches!(
            self,
            ClauseOperator::ExactMatchCaseSensitive
                | ClauseOperator::ExactMatchCaseInsensitive
                | ClauseOperator::StartsWithCaseSensitive
                | ClauseOperator::StartsWithCaseInsensitive
                | ClauseOperator::ContainsCaseSensitive
                | ClauseOperator::ContainsCaseInsensitive
        )
    }
}

impl fmt::Display for ClauseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseOperator {
    type Err = FilterError;

    /// Parse a stored operator name, ignoring case
    fn from_str(s: &str) -> FilterResult<Self> {
        let name = s.trim();
        ClauseOperator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| FilterError::UnsupportedOperator {
                operator: name.to_string(),
                context: "operator parser",
            })
    }
}
