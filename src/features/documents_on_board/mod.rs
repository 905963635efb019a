pub mod collection;
pub mod dtos;

pub use collection::{DocumentOnBoardResource, COLLECTION};
