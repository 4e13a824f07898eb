//! HTTP handlers for `/books`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::error::{not_found, AppError};
use serde_json::{Map, Value};

use super::{
    models::{BookResponse, BooksResponse, MessageResponse},
    repository::BookRepository,
    validation::validate_book,
};

#[derive(Clone)]
pub struct BooksState {
    repo: BookRepository,
}

impl BooksState {
    pub fn new(repo: BookRepository) -> Self {
        Self { repo }
    }
}

/// Routes relative to the module mount point. Unsupported methods fall through
/// to the same JSON 404 as unmatched paths.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book).fallback(not_found))
        .route(
            "/{isbn}",
            get(get_book)
                .put(update_book)
                .delete(delete_book)
                .fallback(not_found),
        )
        .with_state(state)
}

fn no_such_book(isbn: &str) -> AppError {
    // Missing closing quote kept for client compatibility.
    AppError::not_found(format!("There is no book with an isbn '{isbn}"))
}

/// Request body as raw JSON. An empty body reads as `{}` so that it reaches the
/// validator and is reported field by field.
pub struct JsonPayload(pub Value);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::rejected(rejection.status(), rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonPayload(Value::Object(Map::new())));
        }

        serde_json::from_slice(&bytes)
            .map(JsonPayload)
            .map_err(|err| AppError::bad_request(format!("Malformed JSON body: {err}")))
    }
}

pub async fn list_books(State(state): State<BooksState>) -> Result<Json<BooksResponse>, AppError> {
    let books = state.repo.list_books().await?;

    Ok(Json(BooksResponse { books }))
}

pub async fn get_book(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = state
        .repo
        .get_book(&isbn)
        .await?
        .ok_or_else(|| no_such_book(&isbn))?;

    Ok(Json(BookResponse { book }))
}

pub async fn create_book(
    State(state): State<BooksState>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let book = validate_book(&payload).map_err(AppError::validation)?;
    let book = state.repo.create_book(&book).await?;

    tracing::info!(isbn = %book.isbn, "book created");

    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

/// Full replace keyed by the path isbn. The path is checked before the body, so an
/// unknown isbn is a 404 whatever the payload.
pub async fn update_book(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<BookResponse>, AppError> {
    if state.repo.get_book(&isbn).await?.is_none() {
        return Err(no_such_book(&isbn));
    }

    let changes = validate_book(&payload).map_err(AppError::validation)?;

    // The row may have been deleted between the lookup and the update.
    let book = state
        .repo
        .update_book(&isbn, &changes)
        .await?
        .ok_or_else(|| no_such_book(&isbn))?;

    tracing::info!(isbn = %book.isbn, "book updated");

    Ok(Json(BookResponse { book }))
}

pub async fn delete_book(
    State(state): State<BooksState>,
    Path(isbn): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.repo.delete_book(&isbn).await? {
        return Err(no_such_book(&isbn));
    }

    tracing::info!(%isbn, "book deleted");

    Ok(Json(MessageResponse {
        message: "Book deleted".to_string(),
    }))
}
