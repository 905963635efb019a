use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::deadline::bounded;
use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{get_extension_from_content_type, UploadedFile};
use crate::modules::records::{AttachmentMeta, NewAttachment, RecordStore, TableDef};
use crate::modules::storage::BlobStore;

/// A payload read back together with the metadata it was served under
#[derive(Debug)]
pub struct StoredFile {
    pub meta: AttachmentMeta,
    pub data: Vec<u8>,
}

/// Blob side of attachment handling.
///
/// Bytes are always written under a fresh key before any metadata points at them, and a key
/// is deleted only after the metadata that referenced it is gone. A blob can be orphaned by a
/// failure between the two steps; a metadata row can never point at missing bytes.
pub struct AttachmentService {
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn RecordStore>,
    key_prefix: String,
    timeout: Duration,
}

impl AttachmentService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn RecordStore>,
        key_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            blobs,
            records,
            key_prefix: key_prefix.into(),
            timeout,
        }
    }

    fn blob_key(&self, table: &str, slot: &str, id: Uuid, content_type: &str) -> String {
        let extension = get_extension_from_content_type(content_type).unwrap_or("bin");
        format!("{}/{}/{}/{}.{}", self.key_prefix, table, slot, id, extension)
    }

    /// Validate `file` and write it under a new key; the result is ready to be swapped into `slot`.
    pub async fn stage(
        &self,
        table: &TableDef,
        slot: &'static str,
        file: UploadedFile,
    ) -> Result<NewAttachment> {
        file.validate()?;

        let id = Uuid::now_v7();
        let blob_key = self.blob_key(table.name, slot, id, &file.content_type);
        let size_bytes = file.data.len() as i64;

        bounded(
            self.timeout,
            "blob upload",
            self.blobs.put(&blob_key, file.data, &file.content_type),
        )
        .await?;

        debug!("Staged blob {} for {}.{}", blob_key, table.name, slot);

        Ok(NewAttachment {
            id,
            slot,
            blob_key,
            media_type: file.content_type,
            original_filename: file.file_name,
            size_bytes,
        })
    }

    /// Remove blobs staged for a write that did not commit
    pub async fn discard(&self, staged: &[NewAttachment]) {
        self.release(staged.iter().map(|a| a.blob_key.clone()).collect())
            .await;
    }

    /// Delete blobs no longer referenced by any metadata; failures only leave orphans behind.
    pub async fn release(&self, keys: Vec<String>) {
        for key in keys {
            match bounded(self.timeout, "blob delete", self.blobs.delete(&key)).await {
                Ok(()) => debug!("Released blob {}", key),
                Err(e) => warn!(blob_key = %key, "Failed to release blob: {}", e),
            }
        }
    }

    /// Read the current payload of a slot.
    ///
    /// A blob missing under the key just read means a concurrent replacement deleted it, so the
    /// metadata is read once more and the newer payload served. If the key did not move the
    /// payload is lost.
    pub async fn read(&self, table: &TableDef, owner_id: i64, slot: &str) -> Result<StoredFile> {
        let meta = self.metadata(table, owner_id, slot).await?;
        if let Some(data) = self.fetch_blob(&meta.blob_key).await? {
            return Ok(StoredFile { meta, data });
        }

        let latest = self.metadata(table, owner_id, slot).await?;
        if latest.blob_key != meta.blob_key {
            info!(
                "Attachment {}.{} of {} was replaced during read, serving {}",
                table.name, slot, owner_id, latest.blob_key
            );
            if let Some(data) = self.fetch_blob(&latest.blob_key).await? {
                return Ok(StoredFile { meta: latest, data });
            }
        }

        error!(
            data_loss_risk = true,
            blob_key = %latest.blob_key,
            owner_table = table.name,
            owner_id,
            slot,
            "Attachment metadata points at a missing blob"
        );
        Err(AppError::Internal(
            "Stored file content is unavailable".to_string(),
        ))
    }

    async fn metadata(&self, table: &TableDef, owner_id: i64, slot: &str) -> Result<AttachmentMeta> {
        bounded(
            self.timeout,
            "attachment lookup",
            self.records.attachment(table, owner_id, slot),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No file stored in slot '{}'", slot)))
    }

    async fn fetch_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        bounded(self.timeout, "blob download", self.blobs.get(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::records::memory::MemoryRecordStore;
    use crate::modules::records::ScopeConstraints;
    use crate::modules::storage::MemoryBlobStore;
    use serde_json::json;
    use std::sync::Mutex;

    static HANGARS: TableDef = TableDef {
        name: "hangars",
        id_column: "id",
        columns: &["name"],
        foreign_keys: &[],
    };

    fn png(data: &[u8]) -> UploadedFile {
        UploadedFile {
            field_name: "file".to_string(),
            file_name: "plan.png".to_string(),
            content_type: "image/png".to_string(),
            data: data.to_vec(),
        }
    }

    fn service() -> (AttachmentService, Arc<MemoryRecordStore>, Arc<MemoryBlobStore>) {
        let records = Arc::new(MemoryRecordStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = AttachmentService::new(
            blobs.clone(),
            records.clone(),
            "attachments",
            Duration::from_secs(5),
        );
        (service, records, blobs)
    }

    async fn attach(
        service: &AttachmentService,
        records: &MemoryRecordStore,
        owner: i64,
        data: &[u8],
    ) -> Vec<String> {
        let staged = service.stage(&HANGARS, "plan", png(data)).await.unwrap();
        records
            .update(
                &HANGARS,
                owner,
                &ScopeConstraints::default(),
                serde_json::Map::new(),
                vec![staged],
            )
            .await
            .unwrap()
            .unwrap()
            .released
    }

    #[tokio::test]
    async fn test_stage_writes_blob_under_fresh_key() {
        let (service, _, blobs) = service();
        let first = service.stage(&HANGARS, "plan", png(b"one")).await.unwrap();
        let second = service.stage(&HANGARS, "plan", png(b"one")).await.unwrap();

        assert_ne!(first.blob_key, second.blob_key);
        assert!(first.blob_key.starts_with("attachments/hangars/plan/"));
        assert!(first.blob_key.ends_with(".png"));
        assert_eq!(first.size_bytes, 3);
        assert_eq!(blobs.keys().len(), 2);
    }

    #[tokio::test]
    async fn test_stage_rejects_disallowed_type_without_writing() {
        let (service, _, blobs) = service();
        let mut file = png(b"MZ");
        file.content_type = "application/x-msdownload".to_string();

        let result = service.stage(&HANGARS, "plan", file).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(blobs.keys().is_empty());
    }

    #[tokio::test]
    async fn test_read_returns_current_payload() {
        let (service, records, blobs) = service();
        let owner = records.seed(&HANGARS, json!({"name": "North"}));

        attach(&service, &records, owner, b"first").await;
        let released = attach(&service, &records, owner, b"second").await;
        service.release(released).await;

        let file = service.read(&HANGARS, owner, "plan").await.unwrap();
        assert_eq!(file.data, b"second");
        assert_eq!(blobs.keys().len(), 1);
    }

    #[tokio::test]
    async fn test_read_empty_slot_is_not_found() {
        let (service, records, _) = service();
        let owner = records.seed(&HANGARS, json!({"name": "North"}));

        let result = service.read(&HANGARS, owner, "plan").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read_missing_blob_is_internal_error() {
        let (service, records, blobs) = service();
        let owner = records.seed(&HANGARS, json!({"name": "North"}));
        attach(&service, &records, owner, b"bytes").await;

        for key in blobs.keys() {
            blobs.remove_silently(&key);
        }

        let result = service.read(&HANGARS, owner, "plan").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    /// Commits a pending replacement and deletes the old blob the first time `old_key` is read,
    /// so the reader lands between its metadata lookup and its blob download.
    struct ReplaceDuringGet {
        inner: Arc<MemoryBlobStore>,
        records: Arc<MemoryRecordStore>,
        owner: i64,
        old_key: String,
        pending: Mutex<Option<NewAttachment>>,
    }

    impl ReplaceDuringGet {
        fn take_pending(&self) -> Option<NewAttachment> {
            self.pending.lock().unwrap().take()
        }
    }

    #[async_trait::async_trait]
    impl BlobStore for ReplaceDuringGet {
        async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
            self.inner.put(key, data, content_type).await
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            let pending = if key == self.old_key {
                self.take_pending()
            } else {
                None
            };
            if let Some(staged) = pending {
                let outcome = self
                    .records
                    .update(
                        &HANGARS,
                        self.owner,
                        &ScopeConstraints::default(),
                        serde_json::Map::new(),
                        vec![staged],
                    )
                    .await?
                    .unwrap();
                for released in outcome.released {
                    self.inner.delete(&released).await?;
                }
            }
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_read_racing_a_replacement_serves_new_payload() {
        let (service, records, blobs) = service();
        let owner = records.seed(&HANGARS, json!({"name": "North"}));
        attach(&service, &records, owner, b"old bytes").await;
        let old_key = blobs.keys().remove(0);
        let replacement = service.stage(&HANGARS, "plan", png(b"new bytes")).await.unwrap();
        let new_key = replacement.blob_key.clone();

        let racing = AttachmentService::new(
            Arc::new(ReplaceDuringGet {
                inner: blobs.clone(),
                records: records.clone(),
                owner,
                old_key: old_key.clone(),
                pending: Mutex::new(Some(replacement)),
            }),
            records.clone(),
            "attachments",
            Duration::from_secs(5),
        );

        let file = racing.read(&HANGARS, owner, "plan").await.unwrap();
        assert_eq!(file.data, b"new bytes");
        assert_eq!(file.meta.blob_key, new_key);
        assert_eq!(blobs.keys(), vec![new_key]);
    }

    #[tokio::test]
    async fn test_failed_put_leaves_nothing_behind() {
        let (service, _, blobs) = service();
        blobs.set_fail_puts(true);

        let result = service.stage(&HANGARS, "plan", png(b"x")).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
        assert!(blobs.keys().is_empty());
    }
}
