//! Record store: keyed collection rows with soft delete, parent-scope checks and attachment
//! metadata.

#[cfg(test)]
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use model::*;
pub use postgres::PgRecordStore;
pub use store::RecordStore;
