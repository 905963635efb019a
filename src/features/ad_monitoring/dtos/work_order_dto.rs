use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for recording a work order against an AD monitoring entry.
///
/// The aircraft is not stored on the work order; it is implied by the AD monitoring entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWorkOrderAdMonitoringDto {
    #[validate(range(min = 1, message = "ad_monitoring_fk must be a positive id"))]
    pub ad_monitoring_fk: i64,

    #[validate(length(min = 1, max = 50, message = "Work order number must be 1-50 characters"))]
    pub work_order_number: String,

    #[validate(range(min = 0.0))]
    pub last_done_actt: Option<f64>,
    #[validate(range(min = 0.0))]
    pub last_done_tach: Option<f64>,
    pub last_done_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub next_done_actt: Option<f64>,
    #[validate(range(min = 0.0))]
    pub tach: Option<f64>,

    /// Technical log reference
    #[validate(length(min = 1, max = 50, message = "ATL reference must be 1-50 characters"))]
    pub atl_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkOrderAdMonitoringDto {
    #[validate(range(min = 1, message = "ad_monitoring_fk must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_monitoring_fk: Option<i64>,

    #[validate(length(min = 1, max = 50, message = "Work order number must be 1-50 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_order_number: Option<String>,

    #[validate(range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_actt: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_tach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_done_actt: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tach: Option<f64>,

    #[validate(length(min = 1, max = 50, message = "ATL reference must be 1-50 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atl_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkOrderAdMonitoringResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateWorkOrderAdMonitoringDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_negative_counters_are_rejected() {
        let dto: UpdateWorkOrderAdMonitoringDto =
            serde_json::from_value(json!({"tach": -0.5})).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_aircraft_id_in_body_is_not_a_column() {
        let dto: CreateWorkOrderAdMonitoringDto = serde_json::from_value(json!({
            "ad_monitoring_fk": 12,
            "aircraft_id": 5,
            "work_order_number": "WO-001",
            "atl_ref": "ATL-9"
        }))
        .unwrap();
        let values = serde_json::to_value(&dto).unwrap();
        assert!(values.get("aircraft_id").is_none());
        assert_eq!(values["ad_monitoring_fk"], json!(12));
    }
}
