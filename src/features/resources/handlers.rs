//! Generic handlers shared by every collection and scope shape.
//!
//! The route state carries the collection's service and the [`ScopeDescriptor`] of the route
//! shape, so one handler per operation serves the global and every nested form.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::collection::Resource;
use super::payload::{RecordPayload, SlotUpload};
use super::query::QuerySpec;
use super::scope::{parse_id, ScopeDescriptor, ScopePath};
use super::service::ResourceService;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{AttachmentResponseDto, Disposition, DownloadQuery, FileDownload};
use crate::shared::types::Page;

pub struct ScopedResource<R: Resource> {
    pub service: Arc<ResourceService<R>>,
    pub scope: ScopeDescriptor,
}

impl<R: Resource> Clone for ScopedResource<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            scope: self.scope,
        }
    }
}

impl<R: Resource> ScopedResource<R> {
    fn scope_path(&self, params: &HashMap<String, String>) -> Result<ScopePath> {
        self.scope.extract(params)
    }

    fn record_id(&self, params: &HashMap<String, String>) -> Result<i64> {
        let name = R::COLLECTION.id_param;
        let raw = params
            .get(name)
            .ok_or_else(|| AppError::Internal(format!("Route is missing path parameter {}", name)))?;
        parse_id(name, raw)
    }
}

pub async fn list_paged<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Value>>> {
    let scope = state.scope_path(&params)?;
    let query = QuerySpec::from_pairs(pairs)?;
    let page = state.service.list_paged(&user, &scope, query).await?;
    Ok(Json(page))
}

pub async fn get_one<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let scope = state.scope_path(&params)?;
    let id = state.record_id(&params)?;
    Ok(Json(state.service.get(&user, &scope, id).await?))
}

pub async fn create<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
    payload: RecordPayload,
) -> Result<(StatusCode, Json<Value>)> {
    let scope = state.scope_path(&params)?;
    let (body, files) = payload.into_parts(R::COLLECTION)?;
    let record = state.service.create(&user, &scope, body, files).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
    payload: RecordPayload,
) -> Result<Json<Value>> {
    let scope = state.scope_path(&params)?;
    let id = state.record_id(&params)?;
    let (body, files) = payload.into_parts(R::COLLECTION)?;
    Ok(Json(
        state.service.update(&user, &scope, id, body, files).await?,
    ))
}

pub async fn delete_one<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<StatusCode> {
    let scope = state.scope_path(&params)?;
    let id = state.record_id(&params)?;
    state.service.delete(&user, &scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<DownloadQuery>,
) -> Result<FileDownload> {
    let scope = state.scope_path(&params)?;
    let id = state.record_id(&params)?;
    let disposition = Disposition::parse(query.disposition.as_deref())?;
    let slot = params.get("slot").map(String::as_str).unwrap_or_default();
    state
        .service
        .download(&user, &scope, id, slot, disposition)
        .await
}

pub async fn upload<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
    SlotUpload(file): SlotUpload,
) -> Result<Json<AttachmentResponseDto>> {
    let scope = state.scope_path(&params)?;
    let id = state.record_id(&params)?;
    let slot = params.get("slot").map(String::as_str).unwrap_or_default();
    Ok(Json(
        state.service.upload(&user, &scope, id, slot, file).await?,
    ))
}

pub async fn remove_file<R: Resource>(
    user: AuthenticatedUser,
    State(state): State<ScopedResource<R>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<StatusCode> {
    let scope = state.scope_path(&params)?;
    let id = state.record_id(&params)?;
    let slot = params.get("slot").map(String::as_str).unwrap_or_default();
    state.service.remove_file(&user, &scope, id, slot).await?;
    Ok(StatusCode::NO_CONTENT)
}
