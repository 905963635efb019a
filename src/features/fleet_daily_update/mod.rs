//! Daily fleet status board, one live entry per aircraft.

pub mod collection;
pub mod dtos;

pub use collection::{FleetDailyUpdateResource, COLLECTION};
