//! The five CRUD handlers, generic over the resource.
//!
//! Every handler validates the identity before touching the store, so a
//! malformed id is always answered with 400 without a query being issued.

use axum::extract::{Path, State};
use serde_json::{Map, Value};
use tracing::info;

use crate::app::AppState;
use crate::database::Repository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequestBody};
use crate::models::Resource;

/// Strict integer parse of the `:id` path segment
pub fn parse_id<R: Resource>(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} ID", R::ID_LABEL)))
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::not_found(format!("{} not found", R::LABEL))
}

fn repository<R: Resource>(state: &AppState) -> Repository<R> {
    Repository::new(state.db.clone())
}

/// GET /api/{resource}
pub async fn list<R: Resource>(State(state): State<AppState>) -> ApiResult<Vec<R>> {
    let rows = repository::<R>(&state)
        .select_all()
        .await
        .map_err(|e| ApiError::from_store(e, format!("Failed to fetch {}", R::PLURAL)))?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/{resource}/:id
pub async fn get<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<R> {
    let id = parse_id::<R>(&id)?;

    let row = repository::<R>(&state)
        .select_one(id)
        .await
        .map_err(|e| ApiError::from_store(e, format!("Failed to fetch {}", R::SINGULAR)))?
        .ok_or_else(not_found::<R>)?;
    Ok(ApiResponse::success(row))
}

/// POST /api/{resource}
pub async fn create<R: Resource>(State(state): State<AppState>, body: RequestBody) -> ApiResult<R> {
    let payload: R::Create = body.parse()?;

    let missing = R::missing_fields(&payload);
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(missing));
    }

    let row = repository::<R>(&state)
        .insert(R::create_params(payload))
        .await
        .map_err(|e| ApiError::from_store(e, format!("Failed to create {}", R::SINGULAR)))?;
    info!(table = R::TABLE, "created {}", R::SINGULAR);
    Ok(ApiResponse::created(row))
}

/// PUT /api/{resource}/:id - fields absent from the body keep their stored value
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: RequestBody,
) -> ApiResult<R> {
    let id = parse_id::<R>(&id)?;
    let payload: R::Update = body.parse()?;

    let row = repository::<R>(&state)
        .update(id, R::update_params(payload))
        .await
        .map_err(|e| ApiError::from_store(e, format!("Failed to update {}", R::SINGULAR)))?
        .ok_or_else(not_found::<R>)?;
    Ok(ApiResponse::success(row))
}

/// DELETE /api/{resource}/:id - responds with a confirmation and the removed row
pub async fn delete<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id::<R>(&id)?;

    let row = repository::<R>(&state)
        .delete(id)
        .await
        .map_err(|e| ApiError::from_store(e, format!("Failed to delete {}", R::SINGULAR)))?
        .ok_or_else(not_found::<R>)?;
    info!(table = R::TABLE, id, "deleted {}", R::SINGULAR);

    let snapshot = serde_json::to_value(&row).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        ApiError::internal_server_error("Failed to format response")
    })?;

    let mut body = Map::new();
    body.insert(
        "message".into(),
        Value::String(format!("{} deleted successfully", R::LABEL)),
    );
    body.insert(R::DELETED_KEY.into(), snapshot);
    Ok(ApiResponse::success(Value::Object(body)))
}
