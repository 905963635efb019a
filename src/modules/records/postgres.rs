//! PostgreSQL record store.
//!
//! Rows are read back as `to_jsonb(t)` and written through `jsonb_populate_record`, so one
//! implementation serves every collection table. All dynamic SQL is assembled with
//! [`QueryBuilder`]; only catalogue identifiers are pushed as text.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, error};

use super::model::{
    AttachmentMeta, Detached, FieldFilter, FilterValue, ListPlan, NewAttachment, ParentGuard,
    Record, ScopeConstraints, SearchFilter, TableDef, WriteOutcome,
};
use super::store::RecordStore;
use crate::core::error::{AppError, Result};

/// Row projection: the whole row as JSON without the soft-delete flag
const RECORD_JSON: &str = "to_jsonb(t) - 'is_deleted'";

const ATTACHMENT_COLUMNS: &str =
    "id, owner_table, owner_id, slot, blob_key, media_type, original_filename, size_bytes, updated_at";

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FieldFilter) {
    qb.push(" AND t.").push(filter.column).push(" = ");
    match &filter.value {
        FilterValue::Integer(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Text(v) => {
            qb.push_bind(v.clone());
        }
        FilterValue::Date(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Boolean(v) => {
            qb.push_bind(*v);
        }
    }
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, search: &SearchFilter) {
    let pattern = format!("%{}%", escape_like(&search.term));
    qb.push(" AND (");
    for (i, column) in search.columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push("t.")
            .push(*column)
            .push("::text ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\'");
    }
    qb.push(")");
}

fn push_plan(qb: &mut QueryBuilder<'_, Postgres>, plan: &ListPlan) {
    for filter in &plan.filters {
        push_filter(qb, filter);
    }
    if let Some(search) = &plan.search {
        push_search(qb, search);
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, plan: &ListPlan) {
    if plan.sort.is_empty() {
        return;
    }
    qb.push(" ORDER BY ");
    for (i, key) in plan.sort.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push("t.")
            .push(key.column)
            .push(" ")
            .push(key.direction.as_sql())
            .push(" NULLS LAST");
    }
}

fn push_scope_filters(qb: &mut QueryBuilder<'_, Postgres>, scope: &ScopeConstraints) {
    for (column, id) in &scope.filters {
        qb.push(" AND t.").push(*column).push(" = ").push_bind(*id);
    }
}

fn push_guard_predicate(qb: &mut QueryBuilder<'_, Postgres>, guard: &ParentGuard) {
    qb.push("SELECT 1 FROM ")
        .push(guard.table)
        .push(" p WHERE p.id = ")
        .push_bind(guard.id)
        .push(" AND NOT p.is_deleted");
    if let Some((column, parent_id)) = guard.link {
        qb.push(" AND p.").push(column).push(" = ").push_bind(parent_id);
    }
}

/// Scope filters plus the parent chain as correlated `EXISTS` checks
fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &ScopeConstraints) {
    push_scope_filters(qb, scope);
    for guard in &scope.guards {
        qb.push(" AND EXISTS (");
        push_guard_predicate(qb, guard);
        qb.push(")");
    }
}

/// Check the parent chain inside a transaction, optionally share-locking each parent row
/// until commit so it cannot be deleted underneath the write.
async fn parents_live(conn: &mut PgConnection, guards: &[ParentGuard], lock: bool) -> Result<bool> {
    for guard in guards {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_guard_predicate(&mut qb, guard);
        if lock {
            qb.push(" FOR SHARE");
        }
        let found: Option<i32> = qb.build_query_scalar().fetch_optional(&mut *conn).await?;
        if found.is_none() {
            debug!(
                "Scope guard failed: {} {} (link {:?})",
                guard.label, guard.id, guard.link
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// Every foreign key present in `values` must point at a live parent.
async fn check_references(conn: &mut PgConnection, table: &TableDef, values: &Record) -> Result<()> {
    for fk in table.foreign_keys {
        let Some(value) = values.get(fk.column) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let id = value
            .as_i64()
            .ok_or_else(|| AppError::BadRequest(format!("{} must be an integer", fk.column)))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM ");
        qb.push(fk.references)
            .push(" p WHERE p.id = ")
            .push_bind(id)
            .push(" AND NOT p.is_deleted FOR SHARE");
        let found: Option<i32> = qb.build_query_scalar().fetch_optional(&mut *conn).await?;
        if found.is_none() {
            return Err(AppError::ReferentialViolation(fk.missing_parent(id)));
        }
    }
    Ok(())
}

/// Map write failures, naming the column when a database foreign key fires.
fn write_error(table: &TableDef, err: sqlx::Error) -> AppError {
    let fired = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string);
    if let Some(constraint) = fired {
        if let Some(fk) = table
            .foreign_keys
            .iter()
            .find(|fk| constraint == format!("{}_{}_fkey", table.name, fk.column))
        {
            return AppError::ReferentialViolation(format!(
                "{} references a {} which does not exist",
                fk.column, fk.label
            ));
        }
    }
    AppError::from(err)
}

fn record_id(table: &TableDef, record: &Record) -> Result<i64> {
    record
        .get(table.id_column)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Row of {} has no integer {}",
                table.name, table.id_column
            ))
        })
}

/// Advisory lock key of one attachment slot
fn slot_lock_key(table: &TableDef, owner_id: i64, slot: &str) -> String {
    format!("attachments:{}:{}:{}", table.name, owner_id, slot)
}

/// Swap attachment rows for `owner_id`; returns the stored rows and the blob keys they replaced.
///
/// Each slot is locked for the rest of the transaction first, since `FOR UPDATE` locks nothing
/// while the slot is still empty.
async fn swap_attachments(
    conn: &mut PgConnection,
    table: &TableDef,
    owner_id: i64,
    attachments: Vec<NewAttachment>,
) -> Result<(Vec<AttachmentMeta>, Vec<String>)> {
    let mut stored = Vec::with_capacity(attachments.len());
    let mut released = Vec::new();

    for attachment in attachments {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(slot_lock_key(table, owner_id, attachment.slot))
            .execute(&mut *conn)
            .await?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT blob_key FROM attachments WHERE owner_table = $1 AND owner_id = $2 AND slot = $3 FOR UPDATE",
        )
        .bind(table.name)
        .bind(owner_id)
        .bind(attachment.slot)
        .fetch_optional(&mut *conn)
        .await?;

        let sql = format!(
            r#"
            INSERT INTO attachments (id, owner_table, owner_id, slot, blob_key, media_type, original_filename, size_bytes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (owner_table, owner_id, slot) DO UPDATE SET
                id = EXCLUDED.id,
                blob_key = EXCLUDED.blob_key,
                media_type = EXCLUDED.media_type,
                original_filename = EXCLUDED.original_filename,
                size_bytes = EXCLUDED.size_bytes,
                updated_at = NOW()
            RETURNING {}
            "#,
            ATTACHMENT_COLUMNS
        );
        let meta = sqlx::query_as::<_, AttachmentMeta>(&sql)
            .bind(attachment.id)
            .bind(table.name)
            .bind(owner_id)
            .bind(attachment.slot)
            .bind(&attachment.blob_key)
            .bind(&attachment.media_type)
            .bind(&attachment.original_filename)
            .bind(attachment.size_bytes)
            .fetch_one(&mut *conn)
            .await?;

        released.extend(previous);
        stored.push(meta);
    }

    Ok((stored, released))
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list(
        &self,
        table: &TableDef,
        guards: &[ParentGuard],
        plan: &ListPlan,
    ) -> Result<Option<(Vec<Record>, i64)>> {
        // Count and page must see the same snapshot
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        if !parents_live(&mut tx, guards, false).await? {
            return Ok(None);
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        count.push(table.name).push(" t WHERE NOT t.is_deleted");
        push_plan(&mut count, plan);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await.map_err(|e| {
            error!("Failed to count {}: {:?}", table.name, e);
            AppError::from(e)
        })?;

        let mut rows = QueryBuilder::<Postgres>::new("SELECT ");
        rows.push(RECORD_JSON)
            .push(" FROM ")
            .push(table.name)
            .push(" t WHERE NOT t.is_deleted");
        push_plan(&mut rows, plan);
        push_order(&mut rows, plan);
        rows.push(" LIMIT ")
            .push_bind(plan.limit)
            .push(" OFFSET ")
            .push_bind(plan.offset);

        let records: Vec<Json<Record>> =
            rows.build_query_scalar().fetch_all(&mut *tx).await.map_err(|e| {
                error!("Failed to list {}: {:?}", table.name, e);
                AppError::from(e)
            })?;
        tx.commit().await?;

        Ok(Some((records.into_iter().map(|r| r.0).collect(), total)))
    }

    async fn fetch(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
    ) -> Result<Option<Record>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(RECORD_JSON)
            .push(" FROM ")
            .push(table.name)
            .push(" t WHERE t.")
            .push(table.id_column)
            .push(" = ")
            .push_bind(id)
            .push(" AND NOT t.is_deleted");
        push_scope(&mut qb, scope);

        let record: Option<Json<Record>> = qb
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to fetch {} {}: {:?}", table.name, id, e);
                AppError::from(e)
            })?;
        Ok(record.map(|r| r.0))
    }

    async fn insert(
        &self,
        table: &TableDef,
        scope: &ScopeConstraints,
        values: Record,
        attachments: Vec<NewAttachment>,
    ) -> Result<Option<WriteOutcome>> {
        let columns = table.columns_in(&values);
        if columns.is_empty() {
            return Err(AppError::BadRequest("No writable fields supplied".to_string()));
        }
        let column_list = columns.join(", ");

        let mut tx = self.pool.begin().await?;
        if !parents_live(&mut tx, &scope.guards, true).await? {
            return Ok(None);
        }
        check_references(&mut tx, table, &values).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {table} AS t ({column_list}) SELECT {column_list} FROM jsonb_populate_record(NULL::{table}, ",
            table = table.name,
            column_list = column_list,
        ));
        qb.push_bind(Json(values))
            .push(") RETURNING ")
            .push(RECORD_JSON);

        let record: Json<Record> = qb
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| write_error(table, e))?;
        let record = record.0;

        let owner_id = record_id(table, &record)?;
        let (stored, released) = swap_attachments(&mut tx, table, owner_id, attachments).await?;
        tx.commit().await?;

        Ok(Some(WriteOutcome {
            record,
            stored,
            released,
        }))
    }

    async fn update(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
        values: Record,
        attachments: Vec<NewAttachment>,
    ) -> Result<Option<WriteOutcome>> {
        let columns = table.columns_in(&values);

        let mut tx = self.pool.begin().await?;
        if !parents_live(&mut tx, &scope.guards, true).await? {
            return Ok(None);
        }
        check_references(&mut tx, table, &values).await?;

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(table.name).push(" AS t SET ");
        for column in &columns {
            qb.push(*column).push(" = p.").push(*column).push(", ");
        }
        qb.push("updated_at = NOW() FROM jsonb_populate_record(NULL::")
            .push(table.name)
            .push(", ")
            .push_bind(Json(values))
            .push(") AS p WHERE t.")
            .push(table.id_column)
            .push(" = ")
            .push_bind(id)
            .push(" AND NOT t.is_deleted");
        push_scope_filters(&mut qb, scope);
        qb.push(" RETURNING ").push(RECORD_JSON);

        let record: Option<Json<Record>> = qb
            .build_query_scalar()
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| write_error(table, e))?;
        let Some(record) = record.map(|r| r.0) else {
            return Ok(None);
        };

        let (stored, released) = swap_attachments(&mut tx, table, id, attachments).await?;
        tx.commit().await?;

        Ok(Some(WriteOutcome {
            record,
            stored,
            released,
        }))
    }

    async fn soft_delete(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
    ) -> Result<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;
        if !parents_live(&mut tx, &scope.guards, true).await? {
            return Ok(None);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(table.name)
            .push(" AS t SET is_deleted = TRUE, updated_at = NOW() WHERE t.")
            .push(table.id_column)
            .push(" = ")
            .push_bind(id)
            .push(" AND NOT t.is_deleted");
        push_scope_filters(&mut qb, scope);
        qb.push(" RETURNING t.").push(table.id_column);

        let deleted: Option<i64> = qb.build_query_scalar().fetch_optional(&mut *tx).await?;
        if deleted.is_none() {
            return Ok(None);
        }

        let released: Vec<String> = sqlx::query_scalar(
            "DELETE FROM attachments WHERE owner_table = $1 AND owner_id = $2 RETURNING blob_key",
        )
        .bind(table.name)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Some(released))
    }

    async fn attachments(
        &self,
        table: &TableDef,
        owner_ids: &[i64],
    ) -> Result<Vec<AttachmentMeta>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM attachments WHERE owner_table = $1 AND owner_id = ANY($2) ORDER BY owner_id, slot",
            ATTACHMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, AttachmentMeta>(&sql)
            .bind(table.name)
            .bind(owner_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn attachment(
        &self,
        table: &TableDef,
        owner_id: i64,
        slot: &str,
    ) -> Result<Option<AttachmentMeta>> {
        let sql = format!(
            r#"
            SELECT a.id, a.owner_table, a.owner_id, a.slot, a.blob_key, a.media_type,
                   a.original_filename, a.size_bytes, a.updated_at
            FROM attachments a
            JOIN {table} o ON o.{id} = a.owner_id
            WHERE a.owner_table = $1 AND a.owner_id = $2 AND a.slot = $3 AND NOT o.is_deleted
            "#,
            table = table.name,
            id = table.id_column,
        );
        let meta = sqlx::query_as::<_, AttachmentMeta>(&sql)
            .bind(table.name)
            .bind(owner_id)
            .bind(slot)
            .fetch_optional(&self.pool)
            .await?;
        Ok(meta)
    }

    async fn detach(
        &self,
        table: &TableDef,
        owner_id: i64,
        scope: &ScopeConstraints,
        slot: &str,
    ) -> Result<Detached> {
        let mut tx = self.pool.begin().await?;
        if !parents_live(&mut tx, &scope.guards, true).await? {
            return Ok(Detached::OwnerMissing);
        }

        let mut owner = QueryBuilder::<Postgres>::new("UPDATE ");
        owner
            .push(table.name)
            .push(" AS t SET updated_at = NOW() WHERE t.")
            .push(table.id_column)
            .push(" = ")
            .push_bind(owner_id)
            .push(" AND NOT t.is_deleted");
        push_scope_filters(&mut owner, scope);
        owner.push(" RETURNING t.").push(table.id_column);
        let touched: Option<i64> = owner.build_query_scalar().fetch_optional(&mut *tx).await?;
        if touched.is_none() {
            return Ok(Detached::OwnerMissing);
        }

        let key: Option<String> = sqlx::query_scalar(
            "DELETE FROM attachments WHERE owner_table = $1 AND owner_id = $2 AND slot = $3 RETURNING blob_key",
        )
        .bind(table.name)
        .bind(owner_id)
        .bind(slot)
        .fetch_optional(&mut *tx)
        .await?;

        match key {
            Some(key) => {
                tx.commit().await?;
                Ok(Detached::Removed(key))
            }
            None => Ok(Detached::SlotEmpty),
        }
    }
}
