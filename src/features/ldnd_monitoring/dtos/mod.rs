mod ldnd_dto;

pub use ldnd_dto::*;
