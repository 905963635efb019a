use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NatureOfFlight {
    /// Training
    Tr,
    Psf,
    Prf,
    Egr,
    Me,
    TrWithPirem,
    Void,
}

/// Request DTO for an aircraft technical log entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTechnicalLogDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    pub aircraft_fk: i64,

    #[validate(length(min = 1, max = 50, message = "Sequence number must be 1-50 characters"))]
    pub sequence_no: String,

    pub nature_of_flight: Option<NatureOfFlight>,

    #[validate(length(max = 100))]
    pub next_inspection_due: Option<String>,
    pub tach_time_due: Option<f64>,

    #[validate(length(max = 50))]
    pub origin_station: Option<String>,
    pub origin_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub destination_station: Option<String>,
    pub destination_date: Option<NaiveDate>,

    #[validate(range(min = 0, message = "Number of landings must not be negative"))]
    pub number_of_landings: Option<i32>,

    pub hobbs_meter_start: Option<f64>,
    pub hobbs_meter_end: Option<f64>,
    pub hobbs_meter_total: Option<f64>,
    pub tachometer_start: Option<f64>,
    pub tachometer_end: Option<f64>,
    pub tachometer_total: Option<f64>,

    pub remarks: Option<String>,
    pub actions_taken: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTechnicalLogDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_fk: Option<i64>,

    #[validate(length(min = 1, max = 50, message = "Sequence number must be 1-50 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_no: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nature_of_flight: Option<NatureOfFlight>,

    #[validate(length(max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_inspection_due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tach_time_due: Option<f64>,

    #[validate(length(max = 50))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_date: Option<NaiveDate>,

    #[validate(range(min = 0, message = "Number of landings must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_landings: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbs_meter_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbs_meter_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbs_meter_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tachometer_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tachometer_end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tachometer_total: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions_taken: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TechnicalLogResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateTechnicalLogDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
