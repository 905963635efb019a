use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::records::{AttachmentMeta, Record};
use crate::shared::constants::API_PREFIX;
use crate::shared::validation::is_image_media_type;

/// Allowed MIME types for attachment uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Maximum attachment size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Multipart field carrying the record object on create/update
pub const JSON_DATA_FIELD: &str = "json_data";

/// Multipart file field targeting the collection's primary slot
pub const UPLOAD_FILE_FIELD: &str = "upload_file";

/// Multipart file field of a direct slot upload
pub const SLOT_FILE_FIELD: &str = "file";

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

/// A named attachment point on a record, e.g. `engine-arc` on an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSlot {
    /// Route segment and stored slot name
    pub name: &'static str,
    /// Prefix of the derived `<field>_url` / `<field>_is_image` record fields
    pub field: &'static str,
}

/// A file part read from a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(AppError::BadRequest(format!(
                "File '{}' is empty",
                self.file_name
            )));
        }
        if self.data.len() > MAX_FILE_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                MAX_FILE_SIZE,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        if !is_mime_type_allowed(&self.content_type) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                self.content_type,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }
        Ok(())
    }
}

/// How a stored file is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Forces a download (default)
    #[default]
    Attachment,
    /// Renders in place
    Inline,
}

impl Disposition {
    /// Absent means `attachment`; any value other than `inline`/`attachment` is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("attachment") => Ok(Disposition::Attachment),
            Some("inline") => Ok(Disposition::Inline),
            Some(other) => Err(AppError::BadRequest(format!(
                "Invalid disposition '{}'. Allowed: inline, attachment",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }

    /// `Content-Disposition` value with an ASCII fallback and an RFC 5987 UTF-8 filename
    pub fn header_value(&self, file_name: &str) -> String {
        let fallback: String = file_name
            .chars()
            .map(|c| {
                if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            self.as_str(),
            fallback,
            urlencoding::encode(file_name)
        )
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DownloadQuery {
    /// `inline` renders in place; absent or `attachment` forces a download
    pub disposition: Option<String>,
}

/// Raw file response
#[derive(Debug)]
pub struct FileDownload {
    pub data: Vec<u8>,
    pub media_type: String,
    pub file_name: String,
    pub disposition: Disposition,
}

impl IntoResponse for FileDownload {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.media_type.clone()),
                (
                    header::CONTENT_DISPOSITION,
                    self.disposition.header_value(&self.file_name),
                ),
            ],
            self.data,
        )
            .into_response()
    }
}

/// Attachment metadata as returned by slot uploads
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponseDto {
    pub id: Uuid,
    pub slot: String,
    pub media_type: String,
    pub size_bytes: i64,
    pub original_filename: String,
    pub is_image: bool,
    /// Retrieval URL of the slot
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

impl AttachmentResponseDto {
    pub fn from_meta(meta: AttachmentMeta, url: String) -> Self {
        Self {
            is_image: is_image_media_type(&meta.media_type),
            id: meta.id,
            slot: meta.slot,
            media_type: meta.media_type,
            size_bytes: meta.size_bytes,
            original_filename: meta.original_filename,
            url,
            updated_at: meta.updated_at,
        }
    }
}

/// Global-form retrieval URL of a slot
pub fn attachment_url(segment: &str, owner_id: i64, slot: &str) -> String {
    format!("{}/{}/{}/files/{}", API_PREFIX, segment, owner_id, slot)
}

/// Write the derived `<field>_url` and `<field>_is_image` fields of every slot.
///
/// Computed from stored metadata at read time; an empty slot yields `null` and `false`.
pub fn apply_slot_fields(
    record: &mut Record,
    segment: &str,
    owner_id: i64,
    slots: &[FileSlot],
    metas: &[&AttachmentMeta],
) {
    for slot in slots {
        let meta = metas.iter().find(|m| m.slot == slot.name);
        let url = meta
            .map(|_| Value::String(attachment_url(segment, owner_id, slot.name)))
            .unwrap_or(Value::Null);
        let is_image = meta
            .map(|m| is_image_media_type(&m.media_type))
            .unwrap_or(false);
        record.insert(format!("{}_url", slot.field), url);
        record.insert(format!("{}_is_image", slot.field), Value::Bool(is_image));
    }
}

/// Upload form for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadSlotDto {
    /// The file to store in the slot
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Multipart create/update form for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct RecordFormDto {
    /// The record object as JSON text
    pub json_data: String,
    /// Optional file for the collection's primary slot
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub upload_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(slot: &str, media_type: &str) -> AttachmentMeta {
        AttachmentMeta {
            id: Uuid::now_v7(),
            owner_table: "aircrafts".to_string(),
            owner_id: 5,
            slot: slot.to_string(),
            blob_key: "attachments/aircrafts/x".to_string(),
            media_type: media_type.to_string(),
            original_filename: "cert.png".to_string(),
            size_bytes: 3,
            updated_at: Utc::now(),
        }
    }

    const SLOTS: &[FileSlot] = &[
        FileSlot {
            name: "engine-arc",
            field: "engine_arc",
        },
        FileSlot {
            name: "propeller-arc",
            field: "propeller_arc",
        },
    ];

    #[test]
    fn test_disposition_parse() {
        assert_eq!(Disposition::parse(None).unwrap(), Disposition::Attachment);
        assert_eq!(Disposition::parse(Some("inline")).unwrap(), Disposition::Inline);
        assert_eq!(Disposition::parse(Some("INLINE")).unwrap(), Disposition::Inline);
        assert_eq!(
            Disposition::parse(Some("attachment")).unwrap(),
            Disposition::Attachment
        );
        assert!(Disposition::parse(Some("preview")).is_err());
    }

    #[test]
    fn test_disposition_header_value() {
        let inline = Disposition::Inline.header_value("cert.png");
        assert!(inline.starts_with("inline; filename=\"cert.png\""));

        let download = Disposition::Attachment.header_value("sertifikat \"é\".pdf");
        assert!(download.starts_with("attachment; filename=\"sertifikat ___.pdf\""));
        assert!(download.contains("filename*=UTF-8''sertifikat%20%22%C3%A9%22.pdf"));

        // one underscore per replaced char, not per byte
        let accented = Disposition::Inline.header_value("café.png");
        assert!(accented.starts_with("inline; filename=\"caf_.png\""));
        assert!(accented.ends_with("filename*=UTF-8''caf%C3%A9.png"));
    }

    #[test]
    fn test_slot_fields_follow_stored_media_type() {
        let engine = meta("engine-arc", "image/png");
        let mut record = Record::new();
        apply_slot_fields(&mut record, "aircraft", 5, SLOTS, &[&engine]);

        assert_eq!(
            record["engine_arc_url"],
            Value::String("/api/v1/aircraft/5/files/engine-arc".to_string())
        );
        assert_eq!(record["engine_arc_is_image"], Value::Bool(true));
        assert_eq!(record["propeller_arc_url"], Value::Null);
        assert_eq!(record["propeller_arc_is_image"], Value::Bool(false));

        let replaced = meta("engine-arc", "application/pdf");
        apply_slot_fields(&mut record, "aircraft", 5, SLOTS, &[&replaced]);
        assert_eq!(record["engine_arc_is_image"], Value::Bool(false));
    }

    #[test]
    fn test_uploaded_file_validation() {
        let file = UploadedFile {
            field_name: "file".to_string(),
            file_name: "x.exe".to_string(),
            content_type: "application/x-msdownload".to_string(),
            data: vec![1, 2, 3],
        };
        assert!(file.validate().is_err());

        let empty = UploadedFile {
            content_type: "image/png".to_string(),
            data: vec![],
            ..file.clone()
        };
        assert!(empty.validate().is_err());

        let ok = UploadedFile {
            content_type: "image/png".to_string(),
            ..file
        };
        assert!(ok.validate().is_ok());
    }
}
