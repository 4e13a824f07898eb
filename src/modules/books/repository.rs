use bookstore_http::error::AppError;
use sqlx::SqlitePool;
use thiserror::Error;

use super::models::Book;

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("a book with isbn '{0}' already exists")]
    Duplicate(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(isbn) => {
                AppError::conflict(format!("A book with isbn '{isbn}' already exists"))
            }
            RepositoryError::Database(_) => AppError::Internal(err.into()),
        }
    }
}

/// Data access for the `books` table.
///
/// "No such book" is `None` / `false`, never an `Err`.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All books ordered by title.
    pub async fn list_books(&self) -> Result<Vec<Book>, RepositoryError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn get_book(&self, isbn: &str) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    pub async fn create_book(&self, book: &Book) -> Result<Book, RepositoryError> {
        let result = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RepositoryError::Duplicate(book.isbn.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replace every non-key column of the row keyed by `isbn`; `book.isbn` is ignored.
    pub async fn update_book(&self, isbn: &str, book: &Book) -> Result<Option<Book>, RepositoryError> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET amazon_url = ?, author = ?, language = ?, pages = ?, publisher = ?, title = ?, year = ?
            WHERE isbn = ?
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Returns `false` when no row matched.
    pub async fn delete_book(&self, isbn: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
