//! Write payload extractors.
//!
//! A record write is either a JSON object or a `multipart/form-data` form with the object in
//! a `json_data` text part and optional file parts named after slots.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde_json::Value;
use tracing::debug;

use super::collection::Collection;
use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::files::dtos::{
    FileSlot, UploadedFile, JSON_DATA_FIELD, SLOT_FILE_FIELD, UPLOAD_FILE_FIELD,
};
use crate::modules::records::Record;

/// Body of a create or update request
#[derive(Debug, Default)]
pub struct RecordPayload {
    pub body: Record,
    pub files: Vec<UploadedFile>,
}

impl RecordPayload {
    /// Assign every file part to a slot of `collection`
    pub fn into_parts(
        self,
        collection: &'static Collection,
    ) -> Result<(Record, Vec<(&'static FileSlot, UploadedFile)>)> {
        let mut assigned: Vec<(&'static FileSlot, UploadedFile)> = Vec::new();
        for file in self.files {
            let slot = if file.field_name == UPLOAD_FILE_FIELD {
                collection.primary_slot()
            } else {
                collection.slot(&file.field_name)
            };
            let slot = slot.ok_or_else(|| unexpected_file(collection, &file.field_name))?;
            if assigned.iter().any(|(taken, _)| taken.name == slot.name) {
                return Err(AppError::BadRequest(format!(
                    "More than one file supplied for slot '{}'",
                    slot.name
                )));
            }
            assigned.push((slot, file));
        }
        Ok((self.body, assigned))
    }
}

fn unexpected_file(collection: &Collection, field: &str) -> AppError {
    if collection.slots.is_empty() {
        return AppError::BadRequest(format!("{} does not accept files", collection.label));
    }
    let mut expected = vec![UPLOAD_FILE_FIELD];
    expected.extend(collection.slots.iter().map(|slot| slot.name));
    AppError::BadRequest(format!(
        "Unexpected file field '{}'. Expected one of: {}",
        field,
        expected.join(", ")
    ))
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn parse_object(raw: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest(format!(
            "{} must be a JSON object",
            JSON_DATA_FIELD
        ))),
        Err(e) => Err(AppError::BadRequest(format!(
            "Invalid JSON syntax in {}: {}",
            JSON_DATA_FIELD, e
        ))),
    }
}

/// Read every part of a form: `json_data` text (if any) and all file parts
async fn read_form(mut multipart: Multipart) -> Result<(Option<String>, Vec<UploadedFile>)> {
    let mut json_data = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file data: {}", e))
            })?;
            if data.is_empty() {
                debug!("Skipping empty file part {}", field_name);
                continue;
            }
            files.push(UploadedFile {
                field_name,
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else if field_name == JSON_DATA_FIELD {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read {} field: {}", JSON_DATA_FIELD, e))
            })?;
            json_data = Some(text);
        } else {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    Ok((json_data, files))
}

impl<S> FromRequest<S> for RecordPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        if !is_multipart(&req) {
            let AppJson(body) = AppJson::<Record>::from_request(req, state).await?;
            return Ok(RecordPayload {
                body,
                files: Vec::new(),
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let (json_data, files) = read_form(multipart).await?;
        let body = match json_data {
            Some(raw) if !raw.trim().is_empty() => parse_object(&raw)?,
            _ => Record::new(),
        };
        Ok(RecordPayload { body, files })
    }
}

/// The single `file` part of a slot upload
#[derive(Debug)]
pub struct SlotUpload(pub UploadedFile);

impl<S> FromRequest<S> for SlotUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let (_, files) = read_form(multipart).await?;

        let mut files = files.into_iter();
        match (files.next(), files.next()) {
            (Some(file), None) if file.field_name == SLOT_FILE_FIELD => Ok(SlotUpload(file)),
            (Some(file), None) => Err(AppError::BadRequest(format!(
                "Unexpected file field '{}'. Expected '{}'",
                file.field_name, SLOT_FILE_FIELD
            ))),
            (None, _) => Err(AppError::BadRequest("File is required".to_string())),
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "Exactly one file is expected".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{aircraft, technical_logs};

    fn file(field: &str) -> UploadedFile {
        UploadedFile {
            field_name: field.to_string(),
            file_name: "arc.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![1],
        }
    }

    #[test]
    fn test_upload_file_targets_primary_slot() {
        let payload = RecordPayload {
            body: Record::new(),
            files: vec![file("upload_file"), file("propeller-arc")],
        };
        let (_, files) = payload.into_parts(&aircraft::COLLECTION).unwrap();
        let slots: Vec<&str> = files.iter().map(|(slot, _)| slot.name).collect();
        assert_eq!(slots, vec!["engine-arc", "propeller-arc"]);
    }

    #[test]
    fn test_unknown_or_duplicate_file_fields_are_rejected() {
        let unknown = RecordPayload {
            body: Record::new(),
            files: vec![file("wing-arc")],
        };
        assert!(unknown.into_parts(&aircraft::COLLECTION).is_err());

        let duplicate = RecordPayload {
            body: Record::new(),
            files: vec![file("upload_file"), file("engine-arc")],
        };
        assert!(duplicate.into_parts(&aircraft::COLLECTION).is_err());

        let no_slots = RecordPayload {
            body: Record::new(),
            files: vec![file("upload_file")],
        };
        assert!(no_slots.into_parts(&technical_logs::COLLECTION).is_err());
    }

    #[test]
    fn test_json_data_must_be_an_object() {
        assert!(parse_object("[1, 2]").is_err());
        assert!(parse_object("{not json").is_err());
        assert_eq!(parse_object(r#"{"a": 1}"#).unwrap().len(), 1);
    }
}
