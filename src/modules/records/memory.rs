//! In-memory record store for router tests. Mirrors the Postgres semantics: soft deletes,
//! parent guards, foreign-key checks, NULLS LAST ordering and attachment swaps.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::model::{
    AttachmentMeta, Detached, ListPlan, NewAttachment, ParentGuard, Record, ScopeConstraints,
    SortDirection, TableDef, WriteOutcome,
};
use super::store::RecordStore;
use crate::core::error::{AppError, Result};

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Record>,
    deleted: Vec<i64>,
    next_id: i64,
}

#[derive(Default)]
struct State {
    tables: HashMap<&'static str, Table>,
    attachments: HashMap<(String, i64, String), AttachmentMeta>,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    state: Mutex<State>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw row, bypassing checks. Returns its id.
    pub fn seed(&self, table: &TableDef, values: serde_json::Value) -> i64 {
        let mut state = self.state.lock().unwrap();
        let values = values.as_object().cloned().unwrap_or_default();
        insert_row(&mut state, table, values)
    }

    pub fn is_soft_deleted(&self, table: &TableDef, id: i64) -> bool {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table.name)
            .map(|t| t.deleted.contains(&id))
            .unwrap_or(false)
    }

    pub fn attachment_count(&self) -> usize {
        self.state.lock().unwrap().attachments.len()
    }
}

fn insert_row(state: &mut State, table: &TableDef, mut values: Record) -> i64 {
    let t = state.tables.entry(table.name).or_default();
    t.next_id += 1;
    let id = t.next_id;
    values.insert(table.id_column.to_string(), Value::from(id));
    values.insert("created_at".to_string(), Value::from(Utc::now().to_rfc3339()));
    values.insert("updated_at".to_string(), Value::Null);
    t.rows.insert(id, values);
    id
}

fn live<'a>(state: &'a State, table: &str, id: i64) -> Option<&'a Record> {
    let t = state.tables.get(table)?;
    if t.deleted.contains(&id) {
        return None;
    }
    t.rows.get(&id)
}

fn guards_hold(state: &State, guards: &[ParentGuard]) -> bool {
    guards.iter().all(|guard| match live(state, guard.table, guard.id) {
        Some(row) => match guard.link {
            Some((column, parent_id)) => row.get(column).and_then(Value::as_i64) == Some(parent_id),
            None => true,
        },
        None => false,
    })
}

fn check_references(state: &State, table: &TableDef, values: &Record) -> Result<()> {
    for fk in table.foreign_keys {
        match values.get(fk.column) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let id = value.as_i64().ok_or_else(|| {
                    AppError::BadRequest(format!("{} must be an integer", fk.column))
                })?;
                if live(state, fk.references, id).is_none() {
                    return Err(AppError::ReferentialViolation(fk.missing_parent(id)));
                }
            }
        }
    }
    Ok(())
}

fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.to_lowercase()),
        other => Some(other.to_string().to_lowercase()),
    }
}

fn matches_plan(record: &Record, plan: &ListPlan) -> bool {
    let filtered = plan.filters.iter().all(|filter| {
        record
            .get(filter.column)
            .map(|v| filter.value.matches(v))
            .unwrap_or(false)
    });
    if !filtered {
        return false;
    }
    match &plan.search {
        None => true,
        Some(search) => {
            let needle = search.term.to_lowercase();
            search.columns.iter().any(|column| {
                record
                    .get(*column)
                    .and_then(searchable_text)
                    .map(|text| text.contains(&needle))
                    .unwrap_or(false)
            })
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// NULLS LAST in both directions
fn compare_records(a: &Record, b: &Record, plan: &ListPlan) -> Ordering {
    for key in &plan.sort {
        let left = a.get(key.column).filter(|v| !v.is_null());
        let right = b.get(key.column).filter(|v| !v.is_null());
        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let natural = compare_values(x, y);
                match key.direction {
                    SortDirection::Asc => natural,
                    SortDirection::Desc => natural.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn swap_attachments(
    state: &mut State,
    table: &TableDef,
    owner_id: i64,
    attachments: Vec<NewAttachment>,
) -> (Vec<AttachmentMeta>, Vec<String>) {
    let mut stored = Vec::new();
    let mut released = Vec::new();
    for attachment in attachments {
        let meta = AttachmentMeta {
            id: attachment.id,
            owner_table: table.name.to_string(),
            owner_id,
            slot: attachment.slot.to_string(),
            blob_key: attachment.blob_key,
            media_type: attachment.media_type,
            original_filename: attachment.original_filename,
            size_bytes: attachment.size_bytes,
            updated_at: Utc::now(),
        };
        let key = (table.name.to_string(), owner_id, meta.slot.clone());
        if let Some(previous) = state.attachments.insert(key, meta.clone()) {
            released.push(previous.blob_key);
        }
        stored.push(meta);
    }
    (stored, released)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(
        &self,
        table: &TableDef,
        guards: &[ParentGuard],
        plan: &ListPlan,
    ) -> Result<Option<(Vec<Record>, i64)>> {
        let state = self.state.lock().unwrap();
        if !guards_hold(&state, guards) {
            return Ok(None);
        }
        let mut rows: Vec<&Record> = match state.tables.get(table.name) {
            Some(t) => t
                .rows
                .iter()
                .filter(|(id, _)| !t.deleted.contains(*id))
                .map(|(_, row)| row)
                .filter(|row| matches_plan(row, plan))
                .collect(),
            None => Vec::new(),
        };
        rows.sort_by(|a, b| compare_records(a, b, plan));

        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(plan.offset.max(0) as usize)
            .take(plan.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(Some((page, total)))
    }

    async fn fetch(
        &self,
        table: &TableDef,
        id: i64,
        scope: &ScopeConstraints,
    ) -> Result<Option<Record>> {
        let state = self.state.lock().unwrap();
        if !guards_hold(&state, &scope.guards) {
            return Ok(None);
        }
        Ok(live(&state, table.name, id)
            .filter(|row| scope.admits(row))
            .cloned())
    }

    async fn insert(
        &self,
        table: &TableDef,
        scope: &ScopeConstraints,
        values: Record,
        attachments: Vec<NewAttachment>,
    ) -> Result<Option<WriteOutcome>> {
        let mut state = self.state.lock().unwrap();
        if table.columns_in(&values).is_empty() {
            return Err(AppError::BadRequest("No writable fields supplied".to_string()));
        }
        if !guards_hold(&state, &scope.guards) {
            return Ok(None);
        }
        check_references(&state, table, &values)?;

        let row: Record = values
            .into_iter()
            .filter(|(k, _)| table.columns.contains(&k.as_str()))
            .collect();
        let id = insert_row(&mut state, table, row);
        let (stored, released) = swap_attachments(&mut state, table, id, attachments);
        let record = live(&state, table.name, id).cloned().unwrap_or_default();

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
        let mut state = self.state.lock().unwrap();
        if !guards_hold(&state, &scope.guards) {
            return Ok(None);
        }
        if !live(&state, table.name, id)
            .map(|row| scope.admits(row))
            .unwrap_or(false)
        {
            return Ok(None);
        }
        check_references(&state, table, &values)?;

        if let Some(row) = state
            .tables
            .get_mut(table.name)
            .and_then(|t| t.rows.get_mut(&id))
        {
            for (key, value) in values {
                if table.columns.contains(&key.as_str()) {
                    row.insert(key, value);
                }
            }
            row.insert("updated_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        }
        let (stored, released) = swap_attachments(&mut state, table, id, attachments);
        let record = live(&state, table.name, id).cloned().unwrap_or_default();

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
        let mut state = self.state.lock().unwrap();
        if !guards_hold(&state, &scope.guards) {
            return Ok(None);
        }
        if !live(&state, table.name, id)
            .map(|row| scope.admits(row))
            .unwrap_or(false)
        {
            return Ok(None);
        }
        if let Some(t) = state.tables.get_mut(table.name) {
            t.deleted.push(id);
        }

        let owned: Vec<(String, i64, String)> = state
            .attachments
            .keys()
            .filter(|(owner_table, owner_id, _)| owner_table == table.name && *owner_id == id)
            .cloned()
            .collect();
        let released = owned
            .into_iter()
            .filter_map(|key| state.attachments.remove(&key))
            .map(|meta| meta.blob_key)
            .collect();
        Ok(Some(released))
    }

    async fn attachments(
        &self,
        table: &TableDef,
        owner_ids: &[i64],
    ) -> Result<Vec<AttachmentMeta>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<AttachmentMeta> = state
            .attachments
            .values()
            .filter(|meta| meta.owner_table == table.name && owner_ids.contains(&meta.owner_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.owner_id, &a.slot).cmp(&(b.owner_id, &b.slot)));
        Ok(rows)
    }

    async fn attachment(
        &self,
        table: &TableDef,
        owner_id: i64,
        slot: &str,
    ) -> Result<Option<AttachmentMeta>> {
        let state = self.state.lock().unwrap();
        if live(&state, table.name, owner_id).is_none() {
            return Ok(None);
        }
        Ok(state
            .attachments
            .get(&(table.name.to_string(), owner_id, slot.to_string()))
            .cloned())
    }

    async fn detach(
        &self,
        table: &TableDef,
        owner_id: i64,
        scope: &ScopeConstraints,
        slot: &str,
    ) -> Result<Detached> {
        let mut state = self.state.lock().unwrap();
        if !guards_hold(&state, &scope.guards)
            || !live(&state, table.name, owner_id)
                .map(|row| scope.admits(row))
                .unwrap_or(false)
        {
            return Ok(Detached::OwnerMissing);
        }
        Ok(
            match state
                .attachments
                .remove(&(table.name.to_string(), owner_id, slot.to_string()))
            {
                Some(meta) => Detached::Removed(meta.blob_key),
                None => Detached::SlotEmpty,
            },
        )
    }
}
