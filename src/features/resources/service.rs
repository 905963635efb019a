use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use validator::Validate;

use super::collection::{Collection, Resource};
use super::query::{self, QuerySpec};
use super::scope::ScopePath;
use crate::core::deadline::bounded;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    apply_slot_fields, attachment_url, AttachmentResponseDto, Disposition, FileDownload, FileSlot,
    UploadedFile,
};
use crate::features::files::AttachmentService;
use crate::modules::records::{Detached, NewAttachment, Record, RecordStore, WriteOutcome};
use crate::shared::types::Page;

/// Record operations of one collection, applied under a caller-declared scope.
///
/// Every record store call runs under the configured deadline. Writes reconcile the path scope
/// into the body before validation, and the store applies the scope checks, the row write and
/// any attachment swap in one transaction.
pub struct ResourceService<R: Resource> {
    records: Arc<dyn RecordStore>,
    attachments: Arc<AttachmentService>,
    timeout: Duration,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceService<R> {
    pub fn new(
        records: Arc<dyn RecordStore>,
        attachments: Arc<AttachmentService>,
        timeout: Duration,
    ) -> Self {
        Self {
            records,
            attachments,
            timeout,
            _resource: PhantomData,
        }
    }

    fn collection(&self) -> &'static Collection {
        R::COLLECTION
    }

    async fn store<T>(&self, what: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        bounded(self.timeout, what, call).await
    }

    pub async fn list_paged(
        &self,
        user: &AuthenticatedUser,
        scope: &ScopePath,
        query: QuerySpec,
    ) -> Result<Page<Value>> {
        let collection = self.collection();
        debug!(subject = %user.subject, "Listing {} in {:?}", collection.label, scope.elements);

        let resolved = scope.resolve(collection);
        let plan = query::plan(collection, &query, &resolved)?;
        let (rows, total) = self
            .store(
                "record list",
                self.records
                    .list(&collection.table, &resolved.constraints.guards, &plan),
            )
            .await?
            .ok_or_else(|| resolved.parent_not_found())?;

        let items = self.present(rows).await?;
        Ok(Page::new(items, total, query.page, query.limit))
    }

    pub async fn get(&self, user: &AuthenticatedUser, scope: &ScopePath, id: i64) -> Result<Value> {
        let collection = self.collection();
        debug!(subject = %user.subject, "Fetching {} {}", collection.label, id);

        let resolved = scope.resolve(collection);
        let record = self
            .store(
                "record fetch",
                self.records
                    .fetch(&collection.table, id, &resolved.constraints),
            )
            .await?
            .ok_or_else(|| collection.not_found(id))?;

        self.present_one(record).await
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        scope: &ScopePath,
        mut body: Record,
        files: Vec<(&'static FileSlot, UploadedFile)>,
    ) -> Result<Value> {
        let collection = self.collection();
        let resolved = scope.resolve(collection);
        resolved.reconcile(&mut body);
        let values = validated::<R::Create>(collection, body)?;

        let staged = self.stage_all(files).await?;
        let result = self
            .store(
                "record insert",
                self.records.insert(
                    &collection.table,
                    &resolved.constraints,
                    values,
                    staged.clone(),
                ),
            )
            .await;
        let outcome = self
            .settle(result, &staged)
            .await?
            .ok_or_else(|| resolved.parent_not_found())?;
        self.attachments.release(outcome.released).await;

        info!(
            subject = %user.subject,
            "{} {} created",
            collection.label,
            record_id(collection, &outcome.record)
        );
        self.present_one(outcome.record).await
    }

    /// Partial update; fields absent from `body` keep their stored values
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        scope: &ScopePath,
        id: i64,
        mut body: Record,
        files: Vec<(&'static FileSlot, UploadedFile)>,
    ) -> Result<Value> {
        let collection = self.collection();
        let resolved = scope.resolve(collection);
        resolved.reconcile(&mut body);
        let values = validated::<R::Update>(collection, body)?;

        let staged = self.stage_all(files).await?;
        let result = self
            .store(
                "record update",
                self.records.update(
                    &collection.table,
                    id,
                    &resolved.constraints,
                    values,
                    staged.clone(),
                ),
            )
            .await;
        let outcome = self
            .settle(result, &staged)
            .await?
            .ok_or_else(|| collection.not_found(id))?;
        self.attachments.release(outcome.released).await;

        info!(subject = %user.subject, "{} {} updated", collection.label, id);
        self.present_one(outcome.record).await
    }

    /// Soft delete; the record's attachments go with it
    pub async fn delete(&self, user: &AuthenticatedUser, scope: &ScopePath, id: i64) -> Result<()> {
        let collection = self.collection();
        let resolved = scope.resolve(collection);
        let released = self
            .store(
                "record delete",
                self.records
                    .soft_delete(&collection.table, id, &resolved.constraints),
            )
            .await?
            .ok_or_else(|| collection.not_found(id))?;
        self.attachments.release(released).await;

        info!(subject = %user.subject, "{} {} deleted", collection.label, id);
        Ok(())
    }

    pub async fn download(
        &self,
        user: &AuthenticatedUser,
        scope: &ScopePath,
        id: i64,
        slot: &str,
        disposition: Disposition,
    ) -> Result<FileDownload> {
        let collection = self.collection();
        let slot = slot_of(collection, slot)?;
        debug!(subject = %user.subject, "Reading {} {} slot {}", collection.label, id, slot.name);

        let resolved = scope.resolve(collection);
        self.store(
            "record fetch",
            self.records
                .fetch(&collection.table, id, &resolved.constraints),
        )
        .await?
        .ok_or_else(|| collection.not_found(id))?;

        let file = self.attachments.read(&collection.table, id, slot.name).await?;
        Ok(FileDownload {
            data: file.data,
            media_type: file.meta.media_type,
            file_name: file.meta.original_filename,
            disposition,
        })
    }

    /// Store or replace the file in one slot
    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        scope: &ScopePath,
        id: i64,
        slot: &str,
        file: UploadedFile,
    ) -> Result<AttachmentResponseDto> {
        let collection = self.collection();
        let slot = slot_of(collection, slot)?;
        let resolved = scope.resolve(collection);

        let staged = self.stage_all(vec![(slot, file)]).await?;
        let result = self
            .store(
                "attachment swap",
                self.records.update(
                    &collection.table,
                    id,
                    &resolved.constraints,
                    Record::new(),
                    staged.clone(),
                ),
            )
            .await;
        let outcome = self
            .settle(result, &staged)
            .await?
            .ok_or_else(|| collection.not_found(id))?;
        self.attachments.release(outcome.released).await;

        let meta = outcome
            .stored
            .into_iter()
            .find(|meta| meta.slot == slot.name)
            .ok_or_else(|| {
                AppError::Internal(format!("Slot {} was not written", slot.name))
            })?;

        info!(
            subject = %user.subject,
            "{} {} slot {} stored ({} bytes, {})",
            collection.label, id, slot.name, meta.size_bytes, meta.media_type
        );
        let url = attachment_url(collection.segment, id, slot.name);
        Ok(AttachmentResponseDto::from_meta(meta, url))
    }

    pub async fn remove_file(
        &self,
        user: &AuthenticatedUser,
        scope: &ScopePath,
        id: i64,
        slot: &str,
    ) -> Result<()> {
        let collection = self.collection();
        let slot = slot_of(collection, slot)?;
        let resolved = scope.resolve(collection);

        let detached = self
            .store(
                "attachment detach",
                self.records
                    .detach(&collection.table, id, &resolved.constraints, slot.name),
            )
            .await?;
        match detached {
            Detached::OwnerMissing => Err(collection.not_found(id)),
            Detached::SlotEmpty => Err(AppError::NotFound(format!(
                "No file stored in slot '{}'",
                slot.name
            ))),
            Detached::Removed(blob_key) => {
                self.attachments.release(vec![blob_key]).await;
                info!(subject = %user.subject, "{} {} slot {} cleared", collection.label, id, slot.name);
                Ok(())
            }
        }
    }

    /// Write every file's blob; on failure the blobs already written are removed again.
    async fn stage_all(
        &self,
        files: Vec<(&'static FileSlot, UploadedFile)>,
    ) -> Result<Vec<NewAttachment>> {
        let table = &self.collection().table;
        let mut staged = Vec::with_capacity(files.len());
        for (slot, file) in files {
            match self.attachments.stage(table, slot.name, file).await {
                Ok(attachment) => staged.push(attachment),
                Err(e) => {
                    self.attachments.discard(&staged).await;
                    return Err(e);
                }
            }
        }
        Ok(staged)
    }

    /// Clean up staged blobs when the write definitely did not commit.
    ///
    /// After a timeout or a lost connection the transaction may have committed, so the blobs
    /// stay in place; at worst they are orphans.
    async fn settle(
        &self,
        result: Result<Option<WriteOutcome>>,
        staged: &[NewAttachment],
    ) -> Result<Option<WriteOutcome>> {
        match result {
            Ok(Some(outcome)) => Ok(Some(outcome)),
            Ok(None) => {
                self.attachments.discard(staged).await;
                Ok(None)
            }
            Err(e) if e.is_indeterminate() => {
                if !staged.is_empty() {
                    warn!(
                        "Write outcome unknown ({}); keeping {} staged blob(s), possibly orphaned",
                        e,
                        staged.len()
                    );
                }
                Err(e)
            }
            Err(e) => {
                self.attachments.discard(staged).await;
                Err(e)
            }
        }
    }

    async fn present_one(&self, record: Record) -> Result<Value> {
        self.present(vec![record])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Record vanished while rendering".to_string()))
    }

    /// Add the derived slot fields from the stored attachment metadata
    async fn present(&self, rows: Vec<Record>) -> Result<Vec<Value>> {
        let collection = self.collection();
        if collection.slots.is_empty() {
            return Ok(rows.into_iter().map(Value::Object).collect());
        }

        let ids: Vec<i64> = rows.iter().map(|row| record_id(collection, row)).collect();
        let metas = self
            .store(
                "attachment lookup",
                self.records.attachments(&collection.table, &ids),
            )
            .await?;

        Ok(rows
            .into_iter()
            .zip(ids)
            .map(|(mut row, id)| {
                let owned: Vec<_> = metas.iter().filter(|meta| meta.owner_id == id).collect();
                apply_slot_fields(&mut row, collection.segment, id, collection.slots, &owned);
                Value::Object(row)
            })
            .collect())
    }
}

fn record_id(collection: &Collection, record: &Record) -> i64 {
    record
        .get(collection.table.id_column)
        .and_then(Value::as_i64)
        .unwrap_or_default()
}

fn slot_of(collection: &'static Collection, name: &str) -> Result<&'static FileSlot> {
    collection.slot(name).ok_or_else(|| {
        AppError::NotFound(format!(
            "{} has no file slot '{}'",
            collection.label, name
        ))
    })
}

/// Run `body` through the write DTO: typed parsing, field validation, and back to the
/// column map the store writes. Unknown fields are dropped here.
fn validated<D>(collection: &Collection, body: Record) -> Result<Record>
where
    D: DeserializeOwned + Serialize + Validate,
{
    let dto: D = serde_json::from_value(Value::Object(body)).map_err(|e| {
        AppError::BadRequest(format!("Invalid {} payload: {}", collection.label, e))
    })?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match serde_json::to_value(&dto) {
        Ok(Value::Object(values)) => Ok(values),
        Ok(_) => Err(AppError::Internal(format!(
            "{} payload did not serialize to an object",
            collection.label
        ))),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}
