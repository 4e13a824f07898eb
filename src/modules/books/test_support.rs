use bookstore_db::Database;
use bookstore_kernel::Module;

use super::{models::Book, BooksModule};

/// In-memory database with the books schema applied.
pub(crate) async fn test_database() -> Database {
    let db = Database::in_memory().await.unwrap();
    let migrations: Vec<(String, bookstore_kernel::Migration)> = BooksModule::new()
        .migrations()
        .into_iter()
        .map(|migration| ("books".to_string(), migration))
        .collect();
    db.apply_migrations(&migrations).await.unwrap();
    db
}

pub(crate) fn sample_book(isbn: &str, title: &str) -> Book {
    Book {
        isbn: isbn.to_string(),
        amazon_url: "http://test.com".to_string(),
        author: "test".to_string(),
        language: "english".to_string(),
        pages: 236,
        publisher: "test".to_string(),
        title: title.to_string(),
        year: 2023,
    }
}
