//! Time-controlled component (TCC) maintenance per aircraft.

pub mod collection;
pub mod dtos;

pub use collection::{TccMaintenanceResource, COLLECTION};
