mod tcc_dto;

pub use tcc_dto::*;
