//! Aircraft technical log (ATL) entries.

pub mod collection;
pub mod dtos;

pub use collection::{TechnicalLogResource, COLLECTION};
