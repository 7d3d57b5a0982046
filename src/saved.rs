//! Stored filter definitions.
//!
//! Saved filters keep their clause list as a JSON string and their sort order
//! as free text, the way they are laid out in table storage. Persistence itself
//! is left to the caller; this module only converts between the stored layout
//! and [`FilterSet`].

use crate::filter::clause::null_as_default;
use crate::filter::{Clause, FilterError, FilterResult};
use crate::query::{FilterSet, SortOrder};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Longest key accepted by table storage
const MAX_TABLE_KEY_LEN: usize = 1024;

/// Filter definition as persisted in table storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    /// JSON-encoded clause list
    #[serde(deserialize_with = "null_as_default")]
    pub clauses: String,
    pub sort_column: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sort_order: String,
    #[serde(deserialize_with = "null_as_default")]
    pub advanced_clause: String,
    pub is_advanced: bool,
    pub is_temporary: bool,
}

impl SavedFilter {
    /// Encode a filter set for storage
    pub fn from_filter_set(filter: &FilterSet) -> FilterResult<Self> {
        let id = filter.id.clone().unwrap_or_default();
        let name = filter.name.clone().unwrap_or_default();
        if !is_allowed_table_key(&id) || !is_allowed_table_key(&name) {
            return Err(FilterError::InvalidDefinition(format!(
                "incorrect table keys: '{}', '{}'",
                id, name
            )));
        }

        let clauses = serde_json::to_string(&filter.clauses)
            .map_err(|e| FilterError::InvalidDefinition(format!("clauses: {}", e)))?;

        Ok(Self {
            id,
            name,
            clauses,
            sort_column: filter.sort_column.clone(),
            sort_order: filter.sort_order.as_str().to_string(),
            advanced_clause: filter.advanced_expression.clone(),
            is_advanced: filter.is_advanced,
            is_temporary: filter.is_temporary,
        })
    }

    /// Decode the stored layout into a filter set
    pub fn to_filter_set(&self) -> FilterResult<FilterSet> {
        // An empty string or a stored `null` both mean no clauses
        let clauses: Vec<Clause> = if self.clauses.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Option<Vec<Clause>>>(&self.clauses)
                .map_err(|e| {
                    FilterError::InvalidDefinition(format!(
                        "clauses of filter '{}' cannot be decoded: {}",
                        self.name, e
                    ))
                })?
                .unwrap_or_default()
        };

        let sort_order = self.sort_order.parse().unwrap_or_else(|_| {
            debug!(
                "Sort order '{}' not recognised, using descending",
                self.sort_order
            );
            SortOrder::Descending
        });

        Ok(FilterSet {
            id: non_empty(&self.id),
            name: non_empty(&self.name),
            clauses,
            is_advanced: self.is_advanced,
            advanced_expression: self.advanced_clause.clone(),
            sort_column: self.sort_column.clone(),
            sort_order,
            skip: 0,
            take: 0,
            is_temporary: self.is_temporary,
        })
    }

    pub fn from_json(text: &str) -> FilterResult<Self> {
        serde_json::from_str(text).map_err(|e| FilterError::InvalidDefinition(e.to_string()))
    }

    pub fn read_from(path: impl AsRef<Path>) -> FilterResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Parse either a stored filter (clauses as a JSON string) or a plain filter set
pub fn parse_filter_definition(text: &str) -> FilterResult<FilterSet> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| FilterError::InvalidDefinition(e.to_string()))?;

    if value.get("Clauses").is_some_and(|clauses| clauses.is_string()) {
        let saved: SavedFilter = serde_json::from_value(value)
            .map_err(|e| FilterError::InvalidDefinition(e.to_string()))?;
        saved.to_filter_set()
    } else {
        serde_json::from_value(value).map_err(|e| FilterError::InvalidDefinition(e.to_string()))
    }
}

/// Table keys must be non-empty and free of `/ \ # ?` and control characters
pub fn is_allowed_table_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().count() <= MAX_TABLE_KEY_LEN
        && !key
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '#' | '?') || c.is_control())
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ClauseOperator, ValueType};
    use std::io::Write;

    fn sample_filter() -> FilterSet {
        FilterSet {
            id: Some("f-001".to_string()),
            name: Some("Building 43".to_string()),
            ..FilterSet::new(vec![
                Clause::new("tags.building", ClauseOperator::Eq, "43"),
                Clause::new("reported.Temperature", ClauseOperator::Gt, "30")
                    .with_value_type(ValueType::Number),
            ])
        }
        .with_sort("DeviceID", SortOrder::Ascending)
    }

    #[test]
    fn test_saved_filter_keeps_query() {
        let filter = sample_filter();
        let saved = SavedFilter::from_filter_set(&filter).unwrap();

        assert_eq!(saved.id, "f-001");
        assert_eq!(saved.sort_order, "Ascending");
        assert!(saved.clauses.contains("\"ClauseType\":\"GT\""));

        let restored = saved.to_filter_set().unwrap();
        assert_eq!(restored.compile().unwrap(), filter.compile().unwrap());
        assert_eq!(restored.sort_column.as_deref(), Some("DeviceID"));
        assert_eq!(restored.sort_order, SortOrder::Ascending);
    }

    #[test]
    fn test_invalid_table_keys() {
        let mut filter = sample_filter();
        filter.name = Some("a/b".to_string());
        assert!(matches!(
            SavedFilter::from_filter_set(&filter),
            Err(FilterError::InvalidDefinition(_))
        ));

        filter.name = None;
        assert!(SavedFilter::from_filter_set(&filter).is_err());

        assert!(is_allowed_table_key("Building 43"));
        assert!(!is_allowed_table_key("what?"));
        assert!(!is_allowed_table_key("tab\there"));
        assert!(!is_allowed_table_key(&"k".repeat(1025)));
    }

    #[test]
    fn test_unknown_sort_order_falls_back() {
        let saved = SavedFilter {
            id: "f".to_string(),
            name: "n".to_string(),
            sort_order: "whatever".to_string(),
            ..SavedFilter::default()
        };
        let filter = saved.to_filter_set().unwrap();
        assert_eq!(filter.sort_order, SortOrder::Descending);
        assert!(filter.clauses.is_empty());
    }

    #[test]
    fn test_abbreviated_sort_order_falls_back() {
        for stored in ["asc", "ASC", "desc"] {
            let saved = SavedFilter {
                sort_order: stored.to_string(),
                ..SavedFilter::default()
            };
            assert_eq!(
                saved.to_filter_set().unwrap().sort_order,
                SortOrder::Descending,
                "{}",
                stored
            );
        }

        let saved = SavedFilter {
            sort_order: "ascending".to_string(),
            ..SavedFilter::default()
        };
        assert_eq!(saved.to_filter_set().unwrap().sort_order, SortOrder::Ascending);
    }

    #[test]
    fn test_null_clauses_decode_as_empty() {
        for stored in ["null", " null ", ""] {
            let saved = SavedFilter {
                clauses: stored.to_string(),
                ..SavedFilter::default()
            };
            let filter = saved.to_filter_set().unwrap();
            assert!(filter.clauses.is_empty());
            assert_eq!(filter.compile().unwrap(), "SELECT * FROM devices");
        }

        let plain = r#"{"Name": "x", "Clauses": null, "IsAdvanced": false}"#;
        let filter = parse_filter_definition(plain).unwrap();
        assert_eq!(filter.compile().unwrap(), "SELECT * FROM devices");
    }

    #[test]
    fn test_undecodable_clauses() {
        let saved = SavedFilter {
            clauses: "[{\"ColumnName\": 5}]".to_string(),
            ..SavedFilter::default()
        };
        assert!(matches!(
            saved.to_filter_set(),
            Err(FilterError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_parse_filter_definition() {
        let stored = r#"{
            "Id": "f-002",
            "Name": "advanced",
            "Clauses": "[]",
            "SortOrder": "descending",
            "AdvancedClause": "tags.floor = 2",
            "IsAdvanced": true
        }"#;
        let filter = parse_filter_definition(stored).unwrap();
        assert!(filter.is_advanced_query());
        assert_eq!(
            filter.compile().unwrap(),
            "SELECT * FROM devices WHERE tags.floor = 2"
        );

        let plain = r#"{"Clauses": [{"ColumnName": "desired.y", "ClauseType": "LT", "ClauseValue": "1"}]}"#;
        let filter = parse_filter_definition(plain).unwrap();
        assert_eq!(filter.condition().unwrap(), "properties.desired.y < '1'");

        assert!(parse_filter_definition("not json").is_err());
    }

    #[test]
    fn test_read_from_file() {
        let saved = SavedFilter::from_filter_set(&sample_filter()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&saved).unwrap().as_bytes())
            .unwrap();

        let loaded = SavedFilter::read_from(file.path()).unwrap();
        assert_eq!(loaded, saved);

        assert!(matches!(
            SavedFilter::read_from("/nonexistent/filter.json"),
            Err(FilterError::Io(_))
        ));
    }
}
