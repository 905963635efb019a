use async_trait::async_trait;

use super::model::{
    AttachmentMeta, Detached, ListPlan, NewAttachment, ParentGuard, Record, ScopeConstraints,
    TableDef, WriteOutcome,
};
use crate::core::error::Result;

/// Durable keyed storage for collection records and their attachment metadata.
///
/// Every method returning `Option` uses `None` for "not found within the given scope": the
/// target row is missing, soft-deleted, outside `scope`, or a guard in the parent chain fails.
/// Callers fold all of these into a single NotFound.
///
/// Writes run the guard checks, foreign-key checks, the row write and any attachment swap in one
/// transaction.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// One page of live rows plus the filtered, unpaginated count
    async fn list(
        &self,
        table: &TableDef,
        guards: &[ParentGuard],
        plan: &ListPlan,
    ) -> Result<Option<(Vec<Record>, i64)>>;

    async fn fetch(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
    ) -> Result<Option<Record>>;

    async fn insert(
        &self,
        table: &TableDef,
        scope: &ScopeConstraints,
        values: Record,
        attachments: Vec<NewAttachment>,
    ) -> Result<Option<WriteOutcome>>;

    /// Partial update: only the writable columns present in `values` change
    async fn update(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
        values: Record,
        attachments: Vec<NewAttachment>,
    ) -> Result<Option<WriteOutcome>>;

    /// Soft delete; returns the blob keys of the attachments dropped with the row
    async fn soft_delete(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
    ) -> Result<Option<Vec<String>>>;

    /// Attachment rows of live owners among `owner_ids`
    async fn attachments(&self, table: &TableDef, owner_ids: &[i64])
        -> Result<Vec<AttachmentMeta>>;

    async fn attachment(
        &self,
        table: &TableDef,
        owner_id: i64,
        slot: &str,
    ) -> Result<Option<AttachmentMeta>>;

    async fn detach(
        &self,
        table: &TableDef,
        owner_id: i64,
        scope: &ScopeConstraints,
        slot: &str,
    ) -> Result<Detached>;
}
