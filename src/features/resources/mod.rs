//! Scoped collection access: one set of generic handlers serving every collection in its
//! global and nested route shapes.

pub mod collection;
pub mod docs;
pub mod handlers;
pub mod payload;
pub mod query;
pub mod routes;
pub mod scope;
pub mod service;

pub use collection::{Collection, ColumnKind, FilterField, ParentColumn, Resource};
pub use docs::{CollectionDoc, CollectionPaths};
pub use routes::collection_routes;
pub use scope::{ParentKind, ScopeDescriptor};
pub use service::ResourceService;
