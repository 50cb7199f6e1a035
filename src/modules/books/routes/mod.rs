//! HTTP handlers for the books resource.

use axum::{extract::State, routing::get, Json, Router};
use bookshelf_http::{AppError, ValidJson, ValidPath, ValidQuery};

use super::models::{Book, CreateBook, ListParams};
use super::repository::BookStore;

/// Routes for `/books/`, with and without the trailing slash.
pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/", get(list_books).post(create_book))
        .route("/books/{book_id}", get(get_book))
        .with_state(store)
}

async fn create_book(
    State(store): State<BookStore>,
    ValidJson(payload): ValidJson<CreateBook>,
) -> Result<Json<Book>, AppError> {
    let mut session = store.session().await?;
    let book = session.create(&payload).await?;

    tracing::info!(book_id = book.id, "book created");
    Ok(Json(book))
}

async fn list_books(
    State(store): State<BookStore>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Vec<Book>>, AppError> {
    let mut session = store.session().await?;
    let books = session.list(params).await?;

    tracing::debug!(skip = params.skip, limit = params.limit, count = books.len(), "books listed");
    Ok(Json(books))
}

async fn get_book(
    State(store): State<BookStore>,
    ValidPath(book_id): ValidPath<i64>,
) -> Result<Json<Book>, AppError> {
    let mut session = store.session().await?;
    Ok(Json(session.get(book_id).await?))
}
