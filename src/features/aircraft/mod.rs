pub mod collection;
pub mod dtos;

pub use collection::{AircraftResource, COLLECTION};
