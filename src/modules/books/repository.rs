//! Data access for books.
//!
//! Handlers open one [`BookSession`] per request. The session owns a pooled
//! connection and hands it back to the pool when dropped, whichever way the
//! request ends.

use bookshelf_db::{Database, StoreError, StoreResult};
use sqlx::{pool::PoolConnection, Sqlite};

use super::models::{Book, CreateBook, ListParams};

const ENTITY: &str = "Book";

/// Store client shared by the books routes.
#[derive(Debug, Clone)]
pub struct BookStore {
    db: Database,
}

impl BookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Check out a connection for the duration of one request.
    pub async fn session(&self) -> StoreResult<BookSession> {
        let conn = self.db.acquire().await?;
        Ok(BookSession { conn })
    }
}

pub struct BookSession {
    conn: PoolConnection<Sqlite>,
}

impl BookSession {
    /// Insert a book and return it with its assigned id.
    pub async fn create(&mut self, book: &CreateBook) -> StoreResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, author, description) VALUES (?, ?, ?) \
             RETURNING id, title, author, description",
        )
        .bind(book.title.as_str())
        .bind(book.author.as_str())
        .bind(book.description.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(created)
    }

    /// Up to `limit` books after the first `skip`, by ascending id.
    pub async fn list(&mut self, params: ListParams) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description FROM books ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(i64::from(params.limit))
        .bind(i64::from(params.skip))
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(books)
    }

    pub async fn get(&mut self, id: i64) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, description FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    }
}
