//! Airworthiness-directive monitoring and the work orders recorded against it.

pub mod collection;
pub mod dtos;

pub use collection::{
    AdMonitoringResource, WorkOrderAdMonitoringResource, COLLECTION, WORK_ORDER_COLLECTION,
};
