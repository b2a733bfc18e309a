use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::BookDto;
use super::service::BookService;

type BookState = State<Arc<BookService>>;

pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route(
            "/{isbn}",
            get(get_book)
                .put(create_update_book)
                .patch(partial_update_book)
                .delete(delete_book),
        )
        .with_state(service)
}

/// `PUT /books/{isbn}`: `201` when the ISBN was new, `200` when it replaced a book
async fn create_update_book(
    State(service): BookState,
    isbn: Result<Path<String>, PathRejection>,
    payload: Result<Json<BookDto>, JsonRejection>,
) -> Result<(StatusCode, Json<BookDto>), AppError> {
    let Path(isbn) = isbn?;
    let Json(book) = payload?;

    let existed = service.is_exists(&isbn).await?;
    let saved = service.create_update(&isbn, book.into()).await?;

    let status = if existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(saved.into())))
}

async fn list_books(State(service): BookState) -> Result<Json<Vec<BookDto>>, AppError> {
    let books = service.find_all().await?;
    Ok(Json(books.into_iter().map(BookDto::from).collect()))
}

async fn get_book(
    State(service): BookState,
    isbn: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(isbn) = isbn?;

    Ok(match service.find_one(&isbn).await? {
        Some(book) => Json(BookDto::from(book)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

async fn partial_update_book(
    State(service): BookState,
    isbn: Result<Path<String>, PathRejection>,
    payload: Result<Json<BookDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(isbn) = isbn?;
    let Json(book) = payload?;

    if !service.is_exists(&isbn).await? {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let updated = service.partial_update(&isbn, book.into()).await?;
    Ok(Json(BookDto::from(updated)).into_response())
}

async fn delete_book(
    State(service): BookState,
    isbn: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(isbn) = isbn?;
    service.delete(&isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}
