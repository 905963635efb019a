mod aircraft_dto;

pub use aircraft_dto::*;
