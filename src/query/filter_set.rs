//! Filter sets: clauses plus mode, sort and paging directives for one request.

use crate::evaluator::PredicateEvaluator;
use crate::filter::clause::null_as_default;
use crate::filter::{Clause, FilterError, FilterResult};
use crate::query::compiler::{build_query, compile_condition, QueryKind};
use crate::record::Record;
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Requested sort direction, informational for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

impl FromStr for SortOrder {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ascending") || s == "0" {
            return Ok(SortOrder::Ascending);
        }
        if s.eq_ignore_ascii_case("descending") || s == "1" {
            return Ok(SortOrder::Descending);
        }
        Err(FilterError::InvalidDefinition(format!(
            "unknown sort order '{}'",
            s
        )))
    }
}

/// Clauses, mode flag and sort/paging directives for one device query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FilterSet {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Column-level conditions, combined with AND; `null` means no condition
    #[serde(deserialize_with = "null_as_default")]
    pub clauses: Vec<Clause>,
    /// Use `advanced_expression` verbatim instead of compiling `clauses`
    pub is_advanced: bool,
    /// Raw user-authored condition, trusted as-is in advanced mode
    #[serde(rename = "AdvancedClause", deserialize_with = "null_as_default")]
    pub advanced_expression: String,
    pub sort_column: Option<String>,
    pub sort_order: SortOrder,
    /// Paging directives, applied by the caller after filtering
    pub skip: usize,
    pub take: usize,
    pub is_temporary: bool,
}

impl FilterSet {
    /// Create a basic-mode filter set
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self {
            clauses,
            ..Self::default()
        }
    }

    /// Create an advanced-mode filter set from a raw condition
    pub fn advanced(expression: impl Into<String>) -> Self {
        Self {
            is_advanced: true,
            advanced_expression: expression.into(),
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_column = Some(column.into());
        self.sort_order = order;
        self
    }

    pub fn with_paging(mut self, skip: usize, take: usize) -> Self {
        self.skip = skip;
        self.take = take;
        self
    }

    /// Return a copy of this filter set with one more clause
    pub fn add_clause(&self, clause: Clause) -> Self {
        let mut filter = self.clone();
        filter.clauses.push(clause);
        filter
    }

    /// Whether the raw advanced expression is used instead of the clauses
    pub fn is_advanced_query(&self) -> bool {
        self.is_advanced
    }

    /// Clauses that name a column
    pub fn active_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|clause| clause.is_active())
    }

    /// The query condition without `SELECT`/`WHERE`
    pub fn condition(&self) -> FilterResult<String> {
        if self.is_advanced {
            Ok(self.advanced_expression.clone())
        } else {
            compile_condition(&self.clauses)
        }
    }

    /// Compile into `SELECT * FROM devices [WHERE <condition>]`
    pub fn compile(&self) -> FilterResult<String> {
        self.compile_as(QueryKind::Select)
    }

    /// Compile into a `SELECT COUNT()` query with the same condition
    pub fn compile_count(&self) -> FilterResult<String> {
        self.compile_as(QueryKind::Count)
    }

    fn compile_as(&self, kind: QueryKind) -> FilterResult<String> {
        let query = build_query(kind, &self.condition()?);
        debug!("Compiled device query: {}", query);
        Ok(query)
    }

    /// Whether one record satisfies the clauses
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> FilterResult<bool> {
        self.ensure_basic()?;
        PredicateEvaluator::new().matches(record, &self.clauses)
    }

    /// Filter an already fetched collection in memory, preserving order
    pub fn apply_to<'a, R: Record>(&self, records: &'a [R]) -> FilterResult<Vec<&'a R>> {
        self.apply_with(&PredicateEvaluator::new(), records)
    }

    /// Filter with a specific evaluator configuration
    pub fn apply_with<'a, R: Record>(
        &self,
        evaluator: &PredicateEvaluator,
        records: &'a [R],
    ) -> FilterResult<Vec<&'a R>> {
        self.ensure_basic()?;
        evaluator.filter(records, &self.clauses)
    }

    fn ensure_basic(&self) -> FilterResult<()> {
        if self.is_advanced {
            return Err(FilterError::UnsupportedMode(
                "advanced expressions can only be executed by the device query service"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ClauseOperator, ValueType};
    use serde_json::json;

    #[test]
    fn test_empty_filter_has_no_where() {
        assert_eq!(FilterSet::default().compile().unwrap(), "SELECT * FROM devices");
        assert_eq!(
            FilterSet::new(vec![Clause::default(), Clause::default()])
                .compile()
                .unwrap(),
            "SELECT * FROM devices"
        );
        assert_eq!(FilterSet::default().condition().unwrap(), "");
    }

    #[test]
    fn test_compile_basic_filter() {
        let filter = FilterSet::new(vec![
            Clause::new("DeviceID", ClauseOperator::Eq, "dev-1"),
            Clause::new("reported.Temperature", ClauseOperator::Ge, "30")
                .with_value_type(ValueType::Number),
        ]);
        assert_eq!(
            filter.compile().unwrap(),
            "SELECT * FROM devices WHERE DeviceID = 'dev-1' AND properties.reported.Temperature >= 30"
        );
        assert_eq!(
            filter.compile_count().unwrap(),
            "SELECT COUNT() AS total FROM devices WHERE DeviceID = 'dev-1' AND properties.reported.Temperature >= 30"
        );
    }

    #[test]
    fn test_advanced_mode() {
        let filter = FilterSet::advanced("tags.floor = 2 OR tags.floor = 3");
        assert!(filter.is_advanced_query());
        assert_eq!(
            filter.compile().unwrap(),
            "SELECT * FROM devices WHERE tags.floor = 2 OR tags.floor = 3"
        );
        assert_eq!(filter.condition().unwrap(), "tags.floor = 2 OR tags.floor = 3");

        // Clauses are ignored, even unsupported ones
        let filter = filter.add_clause(Clause::new("x", ClauseOperator::ContainsCaseInsensitive, "y"));
        assert!(filter.compile().is_ok());

        assert_eq!(
            FilterSet::advanced("   ").compile().unwrap(),
            "SELECT * FROM devices"
        );
        assert!(!FilterSet::default().is_advanced_query());
    }

    #[test]
    fn test_advanced_mode_not_evaluated_in_memory() {
        let filter = FilterSet::advanced("tags.floor = 2");
        let records = vec![json!({})];
        assert!(matches!(
            filter.apply_to(&records),
            Err(FilterError::UnsupportedMode(_))
        ));
        assert!(matches!(
            filter.matches(&records[0]),
            Err(FilterError::UnsupportedMode(_))
        ));
    }

    #[test]
    fn test_add_clause_leaves_original() {
        let filter = FilterSet::new(vec![Clause::new("tags.x", ClauseOperator::Eq, "1")]);
        let extended = filter.add_clause(Clause::new("tags.y", ClauseOperator::Ne, "2"));

        assert_eq!(filter.clauses.len(), 1);
        assert_eq!(extended.clauses.len(), 2);
        assert_eq!(
            extended.condition().unwrap(),
            "tags.x = '1' AND tags.y != '2'"
        );
    }

    #[test]
    fn test_compile_is_repeatable() {
        let filter = FilterSet::new(vec![
            Clause::new("tags.x", ClauseOperator::In, "[a, b]"),
            Clause::new("desired.y", ClauseOperator::Lt, "5"),
        ]);
        assert_eq!(filter.compile().unwrap(), filter.compile().unwrap());
    }

    #[test]
    fn test_apply_to_preserves_order() {
        let records = vec![
            json!({"DeviceProperties": {"DeviceID": "b-1"}}),
            json!({"DeviceProperties": {"DeviceID": "a-1"}}),
            json!({"DeviceProperties": {"DeviceID": "b-2"}}),
            json!({"DeviceProperties": null}),
        ];
        let filter = FilterSet::new(vec![Clause::new(
            "DeviceID",
            ClauseOperator::StartsWithCaseInsensitive,
            "B-",
        )])
        .with_sort("DeviceID", SortOrder::Descending)
        .with_paging(1, 1);

        let matched = filter.apply_to(&records).unwrap();
        assert_eq!(matched, vec![&records[0], &records[2]]);
        assert!(filter.matches(&records[2]).unwrap());
        assert!(!filter.matches(&records[3]).unwrap());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("ascending".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!(" DESCENDING ".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("0".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!("1".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert!("asc".parse::<SortOrder>().is_err());
        assert!("desc".parse::<SortOrder>().is_err());
        assert!("2".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_null_clauses_mean_no_condition() {
        let filter: FilterSet = serde_json::from_value(json!({
            "Name": "everything",
            "Clauses": null,
            "IsAdvanced": false
        }))
        .unwrap();
        assert!(filter.clauses.is_empty());
        assert_eq!(filter.compile().unwrap(), "SELECT * FROM devices");

        let records = vec![json!({"DeviceProperties": {"DeviceID": "a"}})];
        assert_eq!(filter.apply_to(&records).unwrap().len(), 1);
    }

    #[test]
    fn test_filter_set_json() {
        let filter: FilterSet = serde_json::from_value(json!({
            "Name": "hot devices",
            "Clauses": [
                {"ColumnName": "reported.Temperature", "ClauseType": "GT", "ClauseValue": "30", "ClauseDataType": "Number"}
            ],
            "AdvancedClause": null,
            "SortColumn": "DeviceID",
            "SortOrder": "Descending",
            "Take": 20
        }))
        .unwrap();

        assert_eq!(filter.name.as_deref(), Some("hot devices"));
        assert_eq!(filter.sort_order, SortOrder::Descending);
        assert_eq!(filter.take, 20);
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.advanced_expression, "");
        assert_eq!(
            filter.compile().unwrap(),
            "SELECT * FROM devices WHERE properties.reported.Temperature > 30"
        );
    }
}
