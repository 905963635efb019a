use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

/// Lifecycle status of an onboard document. Input is matched case-insensitively, and
/// `expiring_soon` is accepted for `Expiring Soon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum DocumentStatus {
    #[default]
    Active,
    Expired,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    Inactive,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Active,
        DocumentStatus::Expired,
        DocumentStatus::ExpiringSoon,
        DocumentStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Active => "Active",
            DocumentStatus::Expired => "Expired",
            DocumentStatus::ExpiringSoon => "Expiring Soon",
            DocumentStatus::Inactive => "Inactive",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                format!(
                    "invalid document status '{}', expected one of: Active, Expired, Expiring Soon, Inactive",
                    s
                )
            })
    }
}

impl<'de> Deserialize<'de> for DocumentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn default_warning_days() -> i32 {
    30
}

/// Request DTO for creating a document on board
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentOnBoardDto {
    #[validate(range(min = 1, message = "aircraft_id must be a positive id"))]
    pub aircraft_id: i64,

    #[validate(length(min = 1, max = 255, message = "Document name must be 1-255 characters"))]
    pub document_name: String,

    pub description: Option<String>,

    pub issue_date: NaiveDate,

    pub expiry_date: Option<NaiveDate>,

    /// Days before expiry a warning is raised
    #[serde(default = "default_warning_days")]
    #[validate(range(min = 0, message = "Warning days must not be negative"))]
    pub warning_days: i32,

    #[serde(default)]
    pub status: DocumentStatus,

    #[validate(url(message = "Web link must be a valid URL"))]
    pub web_link: Option<String>,

    #[serde(default)]
    pub is_aircraft_certificate: bool,
}

/// Request DTO for a partial document update
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentOnBoardDto {
    #[validate(range(min = 1, message = "aircraft_id must be a positive id"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_id: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Document name must be 1-255 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    #[validate(range(min = 0, message = "Warning days must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_days: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,

    #[validate(url(message = "Web link must be a valid URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_aircraft_certificate: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentOnBoardResponseDto {
    pub document_id: i64,
    #[serde(flatten)]
    pub fields: CreateDocumentOnBoardDto,
    pub document_url: Option<String>,
    pub document_is_image: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_accepts_spacing_variants() {
        for raw in ["Expiring Soon", "expiring soon", "EXPIRING_SOON"] {
            let status: DocumentStatus = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(status, DocumentStatus::ExpiringSoon);
        }
        assert_eq!(
            serde_json::to_value(DocumentStatus::ExpiringSoon).unwrap(),
            json!("Expiring Soon")
        );
    }

    #[test]
    fn test_create_defaults() {
        let dto: CreateDocumentOnBoardDto = serde_json::from_value(json!({
            "aircraft_id": 5,
            "document_name": "Certificate of Airworthiness",
            "issue_date": "2024-01-15"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.warning_days, 30);
        assert_eq!(dto.status, DocumentStatus::Active);
        assert!(!dto.is_aircraft_certificate);
    }

    #[test]
    fn test_invalid_web_link_and_negative_warning() {
        let dto: UpdateDocumentOnBoardDto =
            serde_json::from_value(json!({"web_link": "not a url"})).unwrap();
        assert!(dto.validate().is_err());

        let dto: UpdateDocumentOnBoardDto =
            serde_json::from_value(json!({"warning_days": -1})).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let result = serde_json::from_value::<CreateDocumentOnBoardDto>(json!({
            "aircraft_id": 5,
            "document_name": "CofA",
            "issue_date": "15/01/2024"
        }));
        assert!(result.is_err());
    }
}
