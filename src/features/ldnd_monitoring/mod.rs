//! Last done / next due (LDND) inspection tracking per aircraft.

pub mod collection;
pub mod dtos;

pub use collection::{LdndMonitoringResource, COLLECTION};
