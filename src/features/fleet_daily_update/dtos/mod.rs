mod fleet_daily_update_dto;

pub use fleet_daily_update_dto::*;
