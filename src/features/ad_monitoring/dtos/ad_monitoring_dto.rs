use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for creating an airworthiness-directive monitoring entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAdMonitoringDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    pub aircraft_fk: i64,

    #[validate(length(min = 1, max = 100, message = "AD number must be 1-100 characters"))]
    pub ad_number: String,

    #[validate(length(min = 1, max = 100, message = "Subject must be 1-100 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 100, message = "Inspection interval must be 1-100 characters"))]
    pub inspection_interval: String,

    /// Date of compliance
    pub compli_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAdMonitoringDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_fk: Option<i64>,

    #[validate(length(min = 1, max = 100, message = "AD number must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_number: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Subject must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Inspection interval must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_interval: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compli_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdMonitoringResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateAdMonitoringDto,
    pub document_url: Option<String>,
    pub document_is_image: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
