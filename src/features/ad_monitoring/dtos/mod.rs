mod ad_monitoring_dto;
mod work_order_dto;

pub use ad_monitoring_dto::*;
pub use work_order_dto::*;
