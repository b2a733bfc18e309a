use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::{AuthorDto, AuthorEntity};
use super::service::AuthorService;

type AuthorState = State<Arc<AuthorService>>;

pub fn router(service: Arc<AuthorService>) -> Router {
    Router::new()
        .route("/", post(create_author).get(list_authors))
        .route(
            "/{id}",
            get(get_author)
                .put(full_update_author)
                .patch(partial_update_author)
                .delete(delete_author),
        )
        .with_state(service)
}

/// `POST /authors`: the store assigns the id, any id in the body is ignored
async fn create_author(
    State(service): AuthorState,
    payload: Result<Json<AuthorDto>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthorDto>), AppError> {
    let Json(author) = payload?;
    let saved = service
        .save(AuthorEntity {
            id: None,
            ..AuthorEntity::from(author)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(saved.into())))
}

async fn list_authors(State(service): AuthorState) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let authors = service.find_all().await?;
    Ok(Json(authors.into_iter().map(AuthorDto::from).collect()))
}

async fn get_author(
    State(service): AuthorState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id?;

    Ok(match service.find_one(id).await? {
        Some(author) => Json(AuthorDto::from(author)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

async fn full_update_author(
    State(service): AuthorState,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AuthorDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id?;
    let Json(author) = payload?;

    if !service.is_exists(id).await? {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let saved = service.full_update(id, author.into()).await?;
    Ok(Json(AuthorDto::from(saved)).into_response())
}

async fn partial_update_author(
    State(service): AuthorState,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AuthorDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id?;
    let Json(author) = payload?;

    if !service.is_exists(id).await? {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let updated = service.partial_update(id, author.into()).await?;
    Ok(Json(AuthorDto::from(updated)).into_response())
}

/// Always `204`, whether or not the author existed
async fn delete_author(
    State(service): AuthorState,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
