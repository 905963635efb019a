use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TccCategory {
    Powerplant,
    Airframe,
    #[serde(rename = "Inspection Servicing")]
    InspectionServicing,
}

/// How a component limit is complied with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MethodOfCompliance {
    Overhaul,
    Replacement,
    Inspection,
    /// Inspection and servicing
    #[serde(rename = "I&S")]
    InspectionAndServicing,
    #[serde(rename = "Operational Test")]
    OperationalTest,
    Calibration,
}

/// Request DTO for a TCC maintenance entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTccMaintenanceDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    pub aircraft_fk: i64,

    /// Technical log entry the work was recorded under
    #[validate(range(min = 1, message = "atl_ref must be a positive id"))]
    pub atl_ref: Option<i64>,

    pub category: Option<TccCategory>,

    #[validate(length(min = 1, max = 100, message = "Part number must be 1-100 characters"))]
    pub part_number: String,
    #[validate(length(max = 100))]
    pub serial_number: Option<String>,
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Component limit must not be negative"))]
    pub component_limit_years: Option<f64>,
    #[validate(range(min = 0.0, message = "Component limit must not be negative"))]
    pub component_limit_hours: Option<f64>,
    pub component_method_of_compliance: Option<MethodOfCompliance>,

    pub last_done_date: Option<NaiveDate>,
    pub last_done_tach: Option<f64>,
    pub last_done_aftt: Option<f64>,
    pub last_done_method_of_compliance: Option<MethodOfCompliance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTccMaintenanceDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_fk: Option<i64>,

    #[validate(range(min = 1, message = "atl_ref must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atl_ref: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TccCategory>,

    #[validate(length(min = 1, max = 100, message = "Part number must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[validate(length(max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Component limit must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_limit_years: Option<f64>,
    #[validate(range(min = 0.0, message = "Component limit must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_limit_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_method_of_compliance: Option<MethodOfCompliance>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_tach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_aftt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_method_of_compliance: Option<MethodOfCompliance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TccMaintenanceResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateTccMaintenanceDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compliance_wire_names() {
        let method: MethodOfCompliance = serde_json::from_value(json!("I&S")).unwrap();
        assert_eq!(method, MethodOfCompliance::InspectionAndServicing);
        assert_eq!(
            serde_json::to_value(MethodOfCompliance::OperationalTest).unwrap(),
            json!("Operational Test")
        );
        assert_eq!(
            serde_json::to_value(TccCategory::InspectionServicing).unwrap(),
            json!("Inspection Servicing")
        );
        assert!(serde_json::from_value::<TccCategory>(json!("Avionics")).is_err());
    }

    #[test]
    fn test_negative_limit_fails_validation() {
        let dto: CreateTccMaintenanceDto = serde_json::from_value(json!({
            "aircraft_fk": 5,
            "part_number": "MAG-4371",
            "component_limit_hours": -1.0
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }
}
