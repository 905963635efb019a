use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

/// Operational status of an aircraft. Input is matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum AircraftStatus {
    #[default]
    Active,
    Maintenance,
    Grounded,
}

impl AircraftStatus {
    pub const ALL: [AircraftStatus; 3] = [
        AircraftStatus::Active,
        AircraftStatus::Maintenance,
        AircraftStatus::Grounded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AircraftStatus::Active => "Active",
            AircraftStatus::Maintenance => "Maintenance",
            AircraftStatus::Grounded => "Grounded",
        }
    }
}

impl fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AircraftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "invalid aircraft status '{}', expected one of: Active, Maintenance, Grounded",
                    s
                )
            })
    }
}

impl<'de> Deserialize<'de> for AircraftStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Request DTO for registering an aircraft
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAircraftDto {
    #[validate(length(min = 1, max = 100, message = "Registration must be 1-100 characters"))]
    pub registration: String,

    #[validate(length(min = 1, max = 100, message = "Manufacturer must be 1-100 characters"))]
    pub manufacturer: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100, message = "Type must be 1-100 characters"))]
    pub aircraft_type: String,

    #[validate(length(min = 1, max = 100, message = "Model must be 1-100 characters"))]
    pub model: String,

    #[validate(length(min = 1, max = 100, message = "MSN must be 1-100 characters"))]
    pub msn: String,

    #[validate(length(min = 1, max = 100, message = "Registration number must be 1-100 characters"))]
    pub reg_no: String,

    #[validate(length(min = 1, max = 100, message = "Base must be 1-100 characters"))]
    pub base: String,

    #[validate(length(min = 1, max = 100, message = "Ownership must be 1-100 characters"))]
    pub ownership: String,

    #[serde(default)]
    pub status: AircraftStatus,

    pub report_description: Option<String>,

    #[validate(length(max = 255))]
    pub airframe_model: Option<String>,
    #[validate(length(max = 255))]
    pub airframe_service_manual: Option<String>,
    #[validate(length(max = 255))]
    pub airframe_serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub airframe_ipc: Option<String>,

    #[validate(length(max = 255))]
    pub engine_model: Option<String>,
    #[validate(length(max = 255))]
    pub engine_serial_number: Option<String>,

    #[validate(length(max = 255))]
    pub propeller_model: Option<String>,
    #[validate(length(max = 255))]
    pub propeller_serial_number: Option<String>,
}

/// Request DTO for a partial aircraft update
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAircraftDto {
    #[validate(length(min = 1, max = 100, message = "Registration must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Manufacturer must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Type must be 1-100 characters"))]
    pub aircraft_type: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Model must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[validate(length(min = 1, max = 100, message = "MSN must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msn: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Registration number must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_no: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Base must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Ownership must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AircraftStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_description: Option<String>,

    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airframe_model: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airframe_service_manual: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airframe_serial_number: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airframe_ipc: Option<String>,

    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_model: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_serial_number: Option<String>,

    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propeller_model: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propeller_serial_number: Option<String>,
}

/// Aircraft as returned by reads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AircraftResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateAircraftDto,
    /// Retrieval URL of the engine ARC, `null` when none is stored
    pub engine_arc_url: Option<String>,
    pub engine_arc_is_image: bool,
    /// Retrieval URL of the propeller ARC, `null` when none is stored
    pub propeller_arc_url: Option<String>,
    pub propeller_arc_is_image: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_is_case_insensitive() {
        let status: AircraftStatus = serde_json::from_value(json!("grounded")).unwrap();
        assert_eq!(status, AircraftStatus::Grounded);
        assert_eq!(serde_json::to_value(status).unwrap(), json!("Grounded"));
        assert!(serde_json::from_value::<AircraftStatus>(json!("Parked")).is_err());
    }

    #[test]
    fn test_create_defaults_status_and_renames_type() {
        let dto: CreateAircraftDto = serde_json::from_value(json!({
            "registration": "PK-ABC",
            "manufacturer": "Cessna",
            "type": "Fixed wing",
            "model": "172S",
            "msn": "172S-1001",
            "reg_no": "PK-ABC",
            "base": "Halim",
            "ownership": "Owned",
            "engine_arc_url": "/ignored"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.status, AircraftStatus::Active);

        let values = serde_json::to_value(&dto).unwrap();
        assert_eq!(values["type"], json!("Fixed wing"));
        assert!(values.get("engine_arc_url").is_none());
    }

    #[test]
    fn test_update_serializes_only_supplied_fields() {
        let dto: UpdateAircraftDto =
            serde_json::from_value(json!({"base": "Juanda", "status": "MAINTENANCE"})).unwrap();
        let values = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            values,
            json!({"base": "Juanda", "status": "Maintenance"})
        );
    }

    #[test]
    fn test_overlong_registration_fails_validation() {
        use fake::Fake;

        let registration: String = (101..200).fake();
        let dto: UpdateAircraftDto =
            serde_json::from_value(json!({ "registration": registration })).unwrap();
        assert!(dto.validate().is_err());

        let registration: String = (1..100).fake();
        let dto: UpdateAircraftDto =
            serde_json::from_value(json!({ "registration": registration })).unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_blank_required_field_fails_validation() {
        let dto: UpdateAircraftDto = serde_json::from_value(json!({"msn": ""})).unwrap();
        assert!(dto.validate().is_err());
    }
}
