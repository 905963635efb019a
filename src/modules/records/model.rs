//! Store-facing query model.
//!
//! Everything a [`RecordStore`](super::RecordStore) needs to run a scoped read or write. Column
//! and table names are `&'static str` taken from the collection catalogue, so they are the only
//! identifiers ever interpolated into SQL; every value is bound.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored row rendered as a JSON object (soft-delete flag stripped)
pub type Record = Map<String, Value>;

/// A foreign key declared by a collection table
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    /// Referenced table (always keyed by `id`)
    pub references: &'static str,
    /// Human name of the referenced record, used in error messages
    pub label: &'static str,
}

impl ForeignKey {
    pub fn missing_parent(&self, id: i64) -> String {
        format!(
            "{} references {} {} which does not exist",
            self.column, self.label, id
        )
    }
}

/// Physical shape of a collection table
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub id_column: &'static str,
    /// Columns a client may write
    pub columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableDef {
    /// Writable columns present in `values`, in declaration order
    pub fn columns_in(&self, values: &Record) -> Vec<&'static str> {
        self.columns
            .iter()
            .copied()
            .filter(|column| values.contains_key(*column))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
    Boolean(bool),
}

impl FilterValue {
    /// Equality against a JSON-rendered column value
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FilterValue::Integer(expected), Value::Number(n)) => n.as_i64() == Some(*expected),
            (FilterValue::Text(expected), Value::String(s)) => s == expected,
            (FilterValue::Date(expected), Value::String(s)) => {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok() == Some(*expected)
            }
            (FilterValue::Boolean(expected), Value::Bool(b)) => b == expected,
            _ => false,
        }
    }
}

/// `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub column: &'static str,
    pub value: FilterValue,
}

/// Case-insensitive substring match of `term` over any of `columns`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub term: String,
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// A fully resolved listing request: every filter is ANDed, `sort` ends with the tie-breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    pub filters: Vec<FieldFilter>,
    pub search: Option<SearchFilter>,
    pub sort: Vec<SortKey>,
    pub limit: i64,
    pub offset: i64,
}

/// Requires a live parent row `table.id = id`, optionally linked to its own parent
/// through `link = (column, parent_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentGuard {
    pub table: &'static str,
    pub label: &'static str,
    pub id: i64,
    pub link: Option<(&'static str, i64)>,
}

/// Constraints a scoped request places on the rows it may touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeConstraints {
    /// Direct `column = id` filters on the target row
    pub filters: Vec<(&'static str, i64)>,
    /// Parent chain that must exist, outermost first
    pub guards: Vec<ParentGuard>,
}

impl ScopeConstraints {
    pub fn is_global(&self) -> bool {
        self.filters.is_empty() && self.guards.is_empty()
    }

    /// Whether a row satisfies the direct filters
    pub fn admits(&self, record: &Record) -> bool {
        self.filters
            .iter()
            .all(|(column, id)| record.get(*column).and_then(Value::as_i64) == Some(*id))
    }
}

/// Attachment metadata row; the bytes live in the blob store under `blob_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttachmentMeta {
    pub id: Uuid,
    pub owner_table: String,
    pub owner_id: i64,
    pub slot: String,
    pub blob_key: String,
    pub media_type: String,
    pub original_filename: String,
    pub size_bytes: i64,
    pub updated_at: DateTime<Utc>,
}

/// Metadata for a blob already written, to be swapped into a slot
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttachment {
    pub id: Uuid,
    pub slot: &'static str,
    pub blob_key: String,
    pub media_type: String,
    pub original_filename: String,
    pub size_bytes: i64,
}

/// Result of a committed write
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub record: Record,
    /// Attachment rows written by this transaction
    pub stored: Vec<AttachmentMeta>,
    /// Blob keys no longer referenced once the transaction committed
    pub released: Vec<String>,
}

/// Result of clearing one attachment slot
#[derive(Debug, Clone, PartialEq)]
pub enum Detached {
    OwnerMissing,
    SlotEmpty,
    Removed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_value_matches_json() {
        assert!(FilterValue::Integer(5).matches(&json!(5)));
        assert!(!FilterValue::Integer(5).matches(&json!("5")));
        assert!(FilterValue::Text("Active".into()).matches(&json!("Active")));
        assert!(!FilterValue::Text("Active".into()).matches(&json!("active")));
        assert!(FilterValue::Boolean(true).matches(&json!(true)));
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(FilterValue::Date(date).matches(&json!("2024-03-01")));
        assert!(!FilterValue::Date(date).matches(&Value::Null));
    }

    #[test]
    fn test_scope_admits_only_matching_rows() {
        let scope = ScopeConstraints {
            filters: vec![("aircraft_id", 5)],
            guards: vec![],
        };
        let inside = json!({"aircraft_id": 5}).as_object().cloned().unwrap();
        let outside = json!({"aircraft_id": 9}).as_object().cloned().unwrap();
        assert!(scope.admits(&inside));
        assert!(!scope.admits(&outside));
        assert!(ScopeConstraints::default().is_global());
    }
}
