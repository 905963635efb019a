use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum FleetStatus {
    #[default]
    Running,
    #[serde(rename = "Ongoing Maintenance")]
    OngoingMaintenance,
    /// Aircraft on ground
    #[serde(rename = "AOG")]
    Aog,
}

/// Request DTO for an aircraft's daily status entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFleetDailyUpdateDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    pub aircraft_fk: i64,

    #[serde(default)]
    pub status: FleetStatus,

    pub next_insp_due: Option<f64>,
    pub tach_time_due: Option<f64>,
    /// Tach time at end of day
    pub tach_time_eod: Option<f64>,
    pub remaining_time_before_next_isp: Option<f64>,
    pub remaining_time_before_engine: Option<f64>,
    pub remaining_time_before_propeller: Option<f64>,

    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFleetDailyUpdateDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_fk: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FleetStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_insp_due: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tach_time_due: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tach_time_eod: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time_before_next_isp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time_before_engine: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time_before_propeller: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FleetDailyUpdateResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateFleetDailyUpdateDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
