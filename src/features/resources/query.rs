//! Listing queries: query-string parsing and the plan handed to the record store.

use chrono::NaiveDate;

use super::collection::{Collection, ColumnKind};
use super::scope::ResolvedScope;
use crate::core::error::{AppError, Result};
use crate::modules::records::{
    FieldFilter, FilterValue, ListPlan, SearchFilter, SortDirection, SortKey,
};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, STATUS_ALL};

const RESERVED_KEYS: &[&str] = &["limit", "page", "search", "status", "sort"];

/// A listing request as the caller sent it
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub limit: i64,
    pub page: i64,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    /// Every non-reserved key, in request order
    pub filters: Vec<(String, String)>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            page: 1,
            search: None,
            status: None,
            sort: None,
            filters: Vec::new(),
        }
    }
}

impl QuerySpec {
    /// Parse raw query pairs. `limit` and `page` are range-checked, never clamped.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut spec = QuerySpec::default();
        for (key, value) in pairs {
            match key.as_str() {
                "limit" => spec.limit = parse_bounded("limit", &value, 1, MAX_PAGE_SIZE)?,
                "page" => spec.page = parse_bounded("page", &value, 1, i64::MAX)?,
                "search" => {
                    let term = value.trim();
                    spec.search = (!term.is_empty()).then(|| term.to_string());
                }
                "status" => spec.status = Some(value),
                "sort" => spec.sort = Some(value),
                _ => spec.filters.push((key, value)),
            }
        }
        Ok(spec)
    }

    pub fn offset(&self) -> Result<i64> {
        (self.page - 1)
            .checked_mul(self.limit)
            .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))
    }
}

fn parse_bounded(name: &str, raw: &str, min: i64, max: i64) -> Result<i64> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        AppError::BadRequest(format!("{} must be an integer, got '{}'", name, raw))
    })?;
    if value < min || value > max {
        let range = if max == i64::MAX {
            format!(">= {}", min)
        } else {
            format!("between {} and {}", min, max)
        };
        return Err(AppError::BadRequest(format!(
            "{} must be {}, got {}",
            name, range, value
        )));
    }
    Ok(value)
}

fn parse_filter_value(column: &str, kind: ColumnKind, raw: &str) -> Result<FilterValue> {
    let invalid = |expected: &str| {
        AppError::BadRequest(format!(
            "Invalid value '{}' for filter {}: expected {}",
            raw, column, expected
        ))
    };
    match kind {
        ColumnKind::Integer => raw
            .trim()
            .parse()
            .map(FilterValue::Integer)
            .map_err(|_| invalid("an integer")),
        ColumnKind::Text => Ok(FilterValue::Text(raw.to_string())),
        ColumnKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(FilterValue::Date)
            .map_err(|_| invalid("a date (YYYY-MM-DD)")),
        ColumnKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(FilterValue::Boolean(true)),
            "false" | "0" => Ok(FilterValue::Boolean(false)),
            _ => Err(invalid("true or false")),
        },
    }
}

fn parse_sort(collection: &Collection, raw: &str) -> Result<Vec<SortKey>> {
    if raw.trim().is_empty() {
        return Ok(collection.default_sort.to_vec());
    }
    raw.split(',')
        .map(|element| {
            let element = element.trim();
            let (direction, field) = match element.strip_prefix('-') {
                Some(field) => (SortDirection::Desc, field),
                None => (
                    SortDirection::Asc,
                    element.strip_prefix('+').unwrap_or(element),
                ),
            };
            if field.is_empty() {
                return Err(AppError::BadRequest(format!(
                    "Invalid sort '{}': empty sort field",
                    raw
                )));
            }
            let column = collection
                .sortable
                .iter()
                .copied()
                .find(|allowed| *allowed == field)
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Cannot sort {} by '{}'. Allowed: {}",
                        collection.label,
                        field,
                        collection.sortable.join(", ")
                    ))
                })?;
            Ok(SortKey { column, direction })
        })
        .collect()
}

/// Turn a caller query into a store plan under `scope`.
///
/// Scope filters are ANDed with the caller's; a caller filter on a scoped column is dropped,
/// so the path value is the only one applied.
pub fn plan(collection: &Collection, query: &QuerySpec, scope: &ResolvedScope) -> Result<ListPlan> {
    let scoped = &scope.constraints.filters;
    let mut filters = Vec::new();

    for (key, raw) in &query.filters {
        let field = collection.filter(key).ok_or_else(|| {
            let allowed: Vec<&str> = collection.filterable.iter().map(|f| f.column).collect();
            AppError::BadRequest(format!(
                "Unknown filter '{}' for {}. Allowed: {}",
                key,
                collection.label,
                allowed.join(", ")
            ))
        })?;
        if scoped.iter().any(|(column, _)| *column == field.column) {
            continue;
        }
        filters.push(FieldFilter {
            column: field.column,
            value: parse_filter_value(field.column, field.kind, raw)?,
        });
    }

    if let Some(status) = query.status.as_deref().map(str::trim) {
        if !status.eq_ignore_ascii_case(STATUS_ALL) && !status.is_empty() {
            let column = collection.status_column.ok_or_else(|| {
                AppError::BadRequest(format!("{} has no status to filter on", collection.label))
            })?;
            filters.push(FieldFilter {
                column,
                value: FilterValue::Text(status.to_string()),
            });
        }
    }

    filters.extend(scoped.iter().map(|(column, id)| FieldFilter {
        column: *column,
        value: FilterValue::Integer(*id),
    }));

    let search = query.search.as_ref().map(|term| SearchFilter {
        term: term.clone(),
        columns: collection.searchable,
    });

    let mut sort = parse_sort(collection, query.sort.as_deref().unwrap_or(""))?;
    let id_column = collection.table.id_column;
    if !sort.iter().any(|key| key.column == id_column) {
        sort.push(SortKey {
            column: id_column,
            direction: SortDirection::Asc,
        });
    }

    Ok(ListPlan {
        filters,
        search,
        sort,
        limit: query.limit,
        offset: query.offset()?,
    })
}
