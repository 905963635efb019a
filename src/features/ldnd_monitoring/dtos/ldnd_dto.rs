use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

/// Interval unit of an inspection; input is matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntervalUnit {
    #[default]
    Hrs,
    Cycles,
}

impl FromStr for IntervalUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HRS" => Ok(IntervalUnit::Hrs),
            "CYCLES" => Ok(IntervalUnit::Cycles),
            _ => Err(format!("invalid unit '{}', expected HRS or CYCLES", s)),
        }
    }
}

impl<'de> Deserialize<'de> for IntervalUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Request DTO for an LDND monitoring entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLdndMonitoringDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    pub aircraft_fk: i64,

    #[validate(length(min = 1, max = 100, message = "Inspection type must be 1-100 characters"))]
    pub inspection_type: String,

    #[serde(default)]
    pub unit: IntervalUnit,

    pub last_done_tach_due: Option<f64>,
    pub last_done_tach_done: Option<f64>,
    pub next_due_tach_hours: Option<f64>,

    pub performed_date_start: Option<NaiveDate>,
    pub performed_date_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateLdndMonitoringDto {
    #[validate(range(min = 1, message = "aircraft_fk must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_fk: Option<i64>,

    #[validate(length(min = 1, max = 100, message = "Inspection type must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<IntervalUnit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_tach_due: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done_tach_done: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_tach_hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_date_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_date_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LdndMonitoringResponseDto {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateLdndMonitoringDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_defaults_to_hours_and_ignores_case() {
        let dto: CreateLdndMonitoringDto = serde_json::from_value(json!({
            "aircraft_fk": 5,
            "inspection_type": "100 HRS"
        }))
        .unwrap();
        assert_eq!(dto.unit, IntervalUnit::Hrs);

        let unit: IntervalUnit = serde_json::from_value(json!(" cycles ")).unwrap();
        assert_eq!(unit, IntervalUnit::Cycles);
        assert_eq!(serde_json::to_value(IntervalUnit::Cycles).unwrap(), json!("CYCLES"));
        assert!(serde_json::from_value::<IntervalUnit>(json!("days")).is_err());
    }

    #[test]
    fn test_blank_inspection_type_fails_validation() {
        let dto: UpdateLdndMonitoringDto =
            serde_json::from_value(json!({"inspection_type": ""})).unwrap();
        assert!(dto.validate().is_err());
    }
}
