//! Generic REST handlers, instantiated once per catalog resource.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use models::Record;
use service::pagination::Window;
use service::resource::crud;
use service::{DeleteOutcome, Lookup, Resource, UpdateOutcome};

use super::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{Body, ResourceId};
use crate::negotiate::{render, render_list, Format};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub start: Option<u64>,
    pub max: Option<u64>,
}

/// `/{collection}` and `/{collection}/:id` for one resource.
pub fn routes<R: Resource>() -> Router<ServerState> {
    Router::new()
        .route(&format!("/{}", R::COLLECTION), get(list::<R>).post(create::<R>))
        .route(
            &format!("/{}/:id", R::COLLECTION),
            get(find::<R>).put(update::<R>).delete(remove::<R>),
        )
}

pub async fn create<R: Resource>(
    State(state): State<ServerState>,
    Body(payload): Body<R::Payload>,
) -> Result<Response, JsonApiError> {
    let model = crud::create::<R, _>(&state.db, payload).await?;
    let location = format!("/{}/{}", R::COLLECTION, model.id());
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

pub async fn find<R: Resource>(
    State(state): State<ServerState>,
    ResourceId(id): ResourceId,
    format: Format,
) -> Result<Response, JsonApiError> {
    match crud::find_by_id::<R, _>(&state.db, id).await? {
        Lookup::Found(view) => Ok(render(format, StatusCode::OK, R::NAME, &view)),
        Lookup::Absent => Err(JsonApiError::not_found()),
    }
}

pub async fn list<R: Resource>(
    State(state): State<ServerState>,
    format: Format,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, JsonApiError> {
    let Query(q) = query.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let views = crud::list_all::<R, _>(&state.db, Window::new(q.start, q.max)).await?;
    Ok(render_list(format, R::COLLECTION, R::NAME, &views))
}

/// 204 on success; 409 carries the stored state so the client can retry from it.
pub async fn update<R: Resource>(
    State(state): State<ServerState>,
    format: Option<Format>,
    ResourceId(id): ResourceId,
    Body(payload): Body<R::Payload>,
) -> Result<Response, JsonApiError> {
    match crud::update::<R, _>(&state.db, id, payload).await? {
        UpdateOutcome::Updated(_) => Ok(StatusCode::NO_CONTENT.into_response()),
        UpdateOutcome::Conflict(current) => {
            Ok(render(format.unwrap_or(Format::Json), StatusCode::CONFLICT, R::NAME, &current))
        }
        UpdateOutcome::Absent => Err(JsonApiError::not_found()),
    }
}

pub async fn remove<R: Resource>(
    State(state): State<ServerState>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, JsonApiError> {
    match crud::delete_by_id::<R, _>(&state.db, id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Absent => Err(JsonApiError::not_found()),
    }
}
