//! HTTP handlers for `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use inout_http::{AppError, JsonBody};

use super::models::{coerce_id, Book, BookError, BookPayload};
use super::store::BookStore;

const ID_MUST_BE_A_NUMBER: &str = "id must be a number";
const BOOK_NOT_FOUND: &str = "book not found";

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::LockPoisoned => AppError::Internal(err.into()),
            other => AppError::validation(other.to_string()),
        }
    }
}

/// Book routes, relative to `/api`.
pub fn router(store: Arc<BookStore>) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

/// 400 unless the path id coerces to a number.
fn ensure_numeric(id: &str) -> Result<(), AppError> {
    coerce_id(id)
        .map(|_| ())
        .ok_or_else(|| AppError::validation(ID_MUST_BE_A_NUMBER))
}

async fn list_books(State(store): State<Arc<BookStore>>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(store.find_all()?))
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    ensure_numeric(&id)?;

    store
        .find_one(&id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))
}

async fn create_book(
    State(store): State<Arc<BookStore>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let payload = BookPayload::from_json(body.as_ref());
    let book = store.create(&payload)?;

    tracing::info!(book_id = book.id, title = %book.title, "book created");

    let location = format!("/api/books/{}", book.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<StatusCode, AppError> {
    let payload = BookPayload::from_json(body.as_ref());

    if !store.update(&id, &payload)? {
        return Err(AppError::not_found(BOOK_NOT_FOUND));
    }

    tracing::info!(book_id = %id, "book updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ensure_numeric(&id)?;

    if !store.remove(&id)? {
        return Err(AppError::not_found(BOOK_NOT_FOUND));
    }

    tracing::info!(book_id = %id, "book removed");
    Ok(StatusCode::NO_CONTENT)
}
