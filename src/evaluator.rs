//! In-memory predicate evaluation.
//!
//! Decides whether a device record satisfies the AND of a list of clauses.
//! Missing or NULL fields never raise an error: they simply fail every
//! text-matching clause. The only clause that can match an absent value is
//! a status clause asking for `Pending`.

use crate::filter::{Clause, ClauseOperator, FilterError, FilterResult};
use crate::record::{FieldValue, Record};
use log::{debug, trace, warn};

/// Container under which column names are resolved by default
pub const DEFAULT_ROOT: &str = "DeviceProperties";

/// Nullable boolean field holding the hub enablement of a device
pub const STATUS_FIELD: &str = "HubEnabledState";

/// Column name that always selects status semantics
pub const STATUS_COLUMN: &str = "Status";

/// Status words derived from the hub enabled state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Pending,
    Running,
    Disabled,
}

impl DeviceStatus {
    pub fn from_enabled_state(state: Option<bool>) -> Self {
        match state {
            None => DeviceStatus::Pending,
            Some(true) => DeviceStatus::Running,
            Some(false) => DeviceStatus::Disabled,
        }
    }

    /// Parse a status word, ignoring case
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            DeviceStatus::Pending,
            DeviceStatus::Running,
            DeviceStatus::Disabled,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Pending => "Pending",
            DeviceStatus::Running => "Running",
            DeviceStatus::Disabled => "Disabled",
        }
    }
}

/// Evaluates clauses against records
#[derive(Debug, Clone)]
pub struct PredicateEvaluator {
    /// Optional container prefixed to every column path
    root: Option<String>,
}

impl Default for PredicateEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl PredicateEvaluator {
    /// Create an evaluator resolving columns under `DeviceProperties`
    pub fn new() -> Self {
        Self {
            root: Some(DEFAULT_ROOT.to_string()),
        }
    }

    /// Create an evaluator resolving columns under a custom container
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Create an evaluator resolving columns at the top level of the record
    pub fn without_root() -> Self {
        Self { root: None }
    }

    /// Full record path for a column name
    pub fn field_path(&self, column: &str) -> String {
        let column = column.trim();
        match &self.root {
            Some(root) => format!("{}.{}", root, column),
            None => column.to_string(),
        }
    }

    /// Check that every active clause can be evaluated in memory
    pub fn validate(&self, clauses: &[Clause]) -> FilterResult<()> {
        clauses
            .iter()
            .filter(|clause| clause.is_active())
            .try_for_each(|clause| effective_operator(clause).map(|_| ()))
    }

    /// True iff the record satisfies every active clause
    pub fn matches<R: Record + ?Sized>(&self, record: &R, clauses: &[Clause]) -> FilterResult<bool> {
        self.validate(clauses)?;
        self.matches_all(record, clauses)
    }

    /// Keep the records matching every active clause, preserving input order
    pub fn filter<'a, R: Record>(
        &self,
        records: &'a [R],
        clauses: &[Clause],
    ) -> FilterResult<Vec<&'a R>> {
        self.validate(clauses)?;

        let mut matched = Vec::new();
        for record in records {
            if self.matches_all(record, clauses)? {
                matched.push(record);
            }
        }

        debug!(
            "{} of {} records matched {} clause(s)",
            matched.len(),
            records.len(),
            clauses.iter().filter(|clause| clause.is_active()).count()
        );
        Ok(matched)
    }

    fn matches_all<R: Record + ?Sized>(&self, record: &R, clauses: &[Clause]) -> FilterResult<bool> {
        for clause in clauses.iter().filter(|clause| clause.is_active()) {
            if !self.matches_clause(record, clause)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn matches_clause<R: Record + ?Sized>(&self, record: &R, clause: &Clause) -> FilterResult<bool> {
        let operator = effective_operator(clause)?;
        let wanted = clause.value.as_str();
        let field = record.try_get_field(&self.field_path(&clause.column_name));
        let text = field.as_ref().and_then(FieldValue::as_text);
        if text.is_none() {
            trace!("Field '{}' is absent or NULL", clause.column_name);
        }

        let matched = match operator {
            ClauseOperator::ExactMatchCaseSensitive => text.is_some_and(|t| t == wanted),
            ClauseOperator::ExactMatchCaseInsensitive => {
                text.is_some_and(|t| fold_case(&t) == fold_case(wanted))
            }
            ClauseOperator::StartsWithCaseSensitive => text.is_some_and(|t| t.starts_with(wanted)),
            ClauseOperator::StartsWithCaseInsensitive => {
                text.is_some_and(|t| fold_case(&t).starts_with(&fold_case(wanted)))
            }
            ClauseOperator::ContainsCaseSensitive => text.is_some_and(|t| t.contains(wanted)),
            ClauseOperator::ContainsCaseInsensitive => {
                text.is_some_and(|t| fold_case(&t).contains(&fold_case(wanted)))
            }
            ClauseOperator::IsDefined => field.is_some_and(|value| !value.is_null()),
            ClauseOperator::Status => self.matches_status(record, wanted),
            ClauseOperator::Eq
            | ClauseOperator::Ne
            | ClauseOperator::Lt
            | ClauseOperator::Gt
            | ClauseOperator::Le
            | ClauseOperator::Ge
            | ClauseOperator::In => return Err(unsupported(operator)),
        };
        Ok(matched)
    }

    fn matches_status<R: Record + ?Sized>(&self, record: &R, wanted: &str) -> bool {
        if wanted.trim().is_empty() {
            return false;
        }
        let Some(expected) = DeviceStatus::parse(wanted) else {
            warn!("Unknown device status '{}' in filter", wanted);
            return false;
        };

        let state = record
            .try_get_field(&self.field_path(STATUS_FIELD))
            .and_then(|value| value.as_bool());
        DeviceStatus::from_enabled_state(state) == expected
    }
}

/// Operator a clause is evaluated with; the `Status` column implies status semantics
fn effective_operator(clause: &Clause) -> FilterResult<ClauseOperator> {
    if clause.column_name.trim().eq_ignore_ascii_case(STATUS_COLUMN) {
        return Ok(ClauseOperator::Status);
    }

    match clause.operator {
        ClauseOperator::Eq
        | ClauseOperator::Ne
        | ClauseOperator::Lt
        | ClauseOperator::Gt
        | ClauseOperator::Le
        | ClauseOperator::Ge
        | ClauseOperator::In => Err(unsupported(clause.operator)),
        operator => Ok(operator),
    }
}

fn unsupported(operator: ClauseOperator) -> FilterError {
    FilterError::UnsupportedOperator {
        operator: operator.to_string(),
        context: "in-memory evaluator",
    }
}

/// Simple per-character uppercase; characters whose uppercase form expands
/// (such as `ß`) are kept as they are, so lengths never change
fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .collect()
}
