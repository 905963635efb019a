use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::scope::{ParentKind, ScopeDescriptor};
use crate::core::error::AppError;
use crate::features::files::dtos::FileSlot;
use crate::modules::records::{SortKey, TableDef};

/// How a query-string filter value is parsed before it is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    /// `YYYY-MM-DD`
    Date,
    Boolean,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub column: &'static str,
    pub kind: ColumnKind,
}

/// Column holding the id of a parent scope level
#[derive(Debug, Clone, Copy)]
pub struct ParentColumn {
    pub kind: ParentKind,
    pub column: &'static str,
}

/// Everything the router, the query engine and the OpenAPI generator know about a collection.
#[derive(Debug)]
pub struct Collection {
    /// Singular human name, used in messages and OpenAPI tags
    pub label: &'static str,
    /// Route segment of the global form
    pub segment: &'static str,
    /// Route segment below a parent scope
    pub nested_segment: &'static str,
    /// Path parameter name of the record id
    pub id_param: &'static str,
    pub table: TableDef,
    pub parents: &'static [ParentColumn],
    pub sortable: &'static [&'static str],
    pub default_sort: &'static [SortKey],
    /// Text columns matched by `search`
    pub searchable: &'static [&'static str],
    /// Columns accepted as equality filters in the query string
    pub filterable: &'static [FilterField],
    pub status_column: Option<&'static str>,
    /// Attachment slots; the first one is the target of `upload_file`
    pub slots: &'static [FileSlot],
}

impl Collection {
    pub fn parent_column(&self, kind: ParentKind) -> Option<&'static str> {
        self.parents
            .iter()
            .find(|parent| parent.kind == kind)
            .map(|parent| parent.column)
    }

    pub fn slot(&self, name: &str) -> Option<&'static FileSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn primary_slot(&self) -> Option<&'static FileSlot> {
        self.slots.first()
    }

    pub fn filter(&self, column: &str) -> Option<&FilterField> {
        self.filterable.iter().find(|field| field.column == column)
    }

    /// Route segment under `scope`
    pub fn segment_in(&self, scope: &ScopeDescriptor) -> &'static str {
        if scope.is_global() {
            self.segment
        } else {
            self.nested_segment
        }
    }

    pub fn not_found(&self, id: i64) -> AppError {
        AppError::NotFound(format!("{} {} not found", self.label, id))
    }
}

/// A collection exposed through the generic handlers.
///
/// `Create` and `Update` are the validated write shapes; `Update` has every field optional
/// and skips absent fields when serialized, which makes updates partial. `View` only
/// documents the read shape.
pub trait Resource: Send + Sync + 'static {
    type Create: DeserializeOwned + Serialize + Validate + ToSchema + Send;
    type Update: DeserializeOwned + Serialize + Validate + ToSchema + Send;
    type View: ToSchema;

    const COLLECTION: &'static Collection;

    /// Every route shape the collection is served under
    const SCOPES: &'static [ScopeDescriptor];
}
