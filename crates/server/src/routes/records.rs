use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, MatchedPath, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use models::{record::fields_from_value, Fields, Record};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use service::errors::ServiceError;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

type ApiResult<T> = Result<T, JsonApiError>;

#[derive(Debug, Deserialize)]
pub struct FieldQuery {
    pub field: Option<String>,
    pub q: Option<String>,
}

/// Last segment of a fixed route such as `/:resource/search`, read as a record id.
/// Hand-written files may hold ids that coincide with these words.
fn segment_id(matched: &MatchedPath) -> &str {
    matched.as_str().rsplit('/').next().unwrap_or_default()
}

/// The record whose id is `id`, or `None` when the collection has no such record.
async fn shadowed_record(state: &ServerState, resource: &str, id: &str) -> ApiResult<Option<Record>> {
    match state.registry.get(resource)?.get(id).await {
        Ok(record) => Ok(Some(record)),
        Err(ServiceError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn body_fields(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Fields> {
    let Json(value) = payload.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    fields_from_value(value).map_err(|e| JsonApiError::bad_request(e.to_string()))
}

pub async fn list(State(state): State<ServerState>, Path(resource): Path<String>) -> ApiResult<Json<Vec<Record>>> {
    let store = state.registry.get(&resource)?;
    let records = store.list().await?;
    info!(%resource, count = records.len(), "list records");
    Ok(Json(records))
}

pub async fn get_one(
    State(state): State<ServerState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let store = state.registry.get(&resource)?;
    Ok(Json(store.get(&id).await?))
}

pub async fn search_by_name(
    State(state): State<ServerState>,
    Path((resource, term)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Record>>> {
    let store = state.registry.get(&resource)?;
    Ok(Json(store.search(&term).await?))
}

/// `?field=name&q=joao`; both parameters are required.
/// Without either, a record whose id is `search` is returned when one exists.
pub async fn find_by_field(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    matched: MatchedPath,
    Query(query): Query<FieldQuery>,
) -> ApiResult<Response> {
    if query.field.is_none() && query.q.is_none() {
        if let Some(record) = shadowed_record(&state, &resource, segment_id(&matched)).await? {
            return Ok(Json(record).into_response());
        }
    }
    let store = state.registry.get(&resource)?;
    let (field, term) = match (query.field, query.q) {
        (Some(field), Some(term)) if !field.trim().is_empty() => (field, term),
        _ => return Err(JsonApiError::bad_request("query parameters `field` and `q` are required")),
    };
    Ok(Json(store.find_by_field(&field, &term).await?).into_response())
}

/// Serves `/data`, `/data/:start` and `/data/:start/:end`; missing bounds are a 400.
/// A bare `/data` returns the record whose id is `data` when one exists.
pub async fn find_by_date_range(
    State(state): State<ServerState>,
    Path(params): Path<HashMap<String, String>>,
    matched: MatchedPath,
) -> ApiResult<Response> {
    let resource = params.get("resource").map(String::as_str).unwrap_or_default();
    if params.len() == 1 {
        if let Some(record) = shadowed_record(&state, resource, segment_id(&matched)).await? {
            return Ok(Json(record).into_response());
        }
    }
    let store = state.registry.get(resource)?;
    let records = store
        .find_by_date_range(params.get("start").map(String::as_str), params.get("end").map(String::as_str))
        .await?;
    Ok(Json(records).into_response())
}

pub async fn create(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let store = state.registry.get(&resource)?;
    let fields = body_fields(payload)?;
    let record = store.create(fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Partial update: only the keys present in the body change.
pub async fn update(
    State(state): State<ServerState>,
    Path((resource, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let store = state.registry.get(&resource)?;
    let patch = body_fields(payload)?;
    Ok(Json(store.update(&id, patch).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let store = state.registry.get(&resource)?;
    Ok(Json(store.delete(&id).await?))
}

/// `GET` on a fixed route segment that is also a record id.
pub async fn get_by_segment(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    matched: MatchedPath,
) -> ApiResult<Json<Record>> {
    let store = state.registry.get(&resource)?;
    Ok(Json(store.get(segment_id(&matched)).await?))
}

pub async fn update_by_segment(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    matched: MatchedPath,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let store = state.registry.get(&resource)?;
    let patch = body_fields(payload)?;
    Ok(Json(store.update(segment_id(&matched), patch).await?))
}

pub async fn delete_by_segment(
    State(state): State<ServerState>,
    Path(resource): Path<String>,
    matched: MatchedPath,
) -> ApiResult<Json<Record>> {
    let store = state.registry.get(&resource)?;
    Ok(Json(store.delete(segment_id(&matched)).await?))
}
