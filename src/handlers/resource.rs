use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::database::models::Entity;
use crate::database::repository::DynRepository;
use crate::error::ApiError;
use crate::filter::{ListQuery, QueryParams, Validator};
use crate::middleware::{ApiResponse, ApiResult};

/// Everything the CRUD handlers for one entity need.
pub struct ResourceState<T: Entity> {
    pub repo: DynRepository<T>,
    pub default_page_size: i64,
    pub debug_logging: bool,
}

impl<T: Entity> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            default_page_size: self.default_page_size,
            debug_logging: self.debug_logging,
        }
    }
}

/// Positive integer id from the path. Anything else is treated as a
/// missing record.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::resource_not_found()),
    }
}

fn check<T: Entity>(record: &T) -> Result<(), ApiError> {
    let mut v = Validator::new();
    record.validate(&mut v);
    if v.valid() {
        Ok(())
    } else {
        Err(ApiError::failed_validation(v.into_errors()))
    }
}

/// GET /api/v1/{entity}
pub async fn list<T: Entity>(
    State(state): State<ResourceState<T>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let qs = QueryParams::from(params);
    let mut v = Validator::new();
    let query = ListQuery::from_query(&qs, &T::LIST, state.default_page_size, &mut v);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }
    if state.debug_logging {
        tracing::debug!(table = T::LIST.table, ?query, "List query");
    }

    let page = state.repo.list(&query).await?;
    Ok(ApiResponse::envelope(T::ENVELOPE, page.items).with("metadata", page.metadata))
}

/// POST /api/v1/{entity}
pub async fn create<T: Entity>(
    State(state): State<ResourceState<T>>,
    payload: Result<Json<T::Input>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let record = T::from_input(input);
    check(&record)?;

    let stored = state.repo.insert(record).await?;
    tracing::info!(table = T::LIST.table, id = stored.id(), "Record created");
    Ok(ApiResponse::created(T::ENVELOPE, stored))
}

/// GET /api/v1/{entity}/:id
pub async fn show<T: Entity>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id)?;
    let record = state.repo.get(id).await?;
    Ok(ApiResponse::envelope(T::ENVELOPE, record))
}

/// PUT /api/v1/{entity}/:id
///
/// Only the fields present in the body change. The write is rejected with
/// 409 if the record was modified after it was read here.
pub async fn update<T: Entity>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<String>,
    payload: Result<Json<T::Patch>, JsonRejection>,
) -> ApiResult {
    let id = parse_id(&id)?;
    let mut record = state.repo.get(id).await?;
    let Json(patch) = payload?;

    record.apply_patch(patch);
    check(&record)?;

    let stored = state.repo.update(record).await?;
    Ok(ApiResponse::envelope(T::ENVELOPE, stored))
}

/// DELETE /api/v1/{entity}/:id
pub async fn remove<T: Entity>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id)?;
    state.repo.delete(id).await?;
    tracing::info!(table = T::LIST.table, id, "Record deleted");
    Ok(ApiResponse::message("success"))
}
