mod technical_log_dto;

pub use technical_log_dto::*;
