//! Book repository trait and SQLite implementation

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_db::Result;
use bookshelf_kernel::Migration;
use sqlx::{query, query_as, query_scalar, FromRow, SqlitePool};

use super::models::BookEntity;
use crate::modules::authors::models::AuthorEntity;
use crate::modules::authors::repository::attach_author;

pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE books (
            isbn      TEXT PRIMARY KEY NOT NULL,
            title     TEXT,
            author_id INTEGER REFERENCES authors (id) ON DELETE SET NULL
        );
        CREATE INDEX books_author_id ON books (author_id);
    "#,
}];

const SELECT_BOOKS: &str = r#"
    SELECT b.isbn, b.title, a.id AS author_id, a.name AS author_name, a.age AS author_age
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

/// Data access for books
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert or replace the book keyed by `book.isbn`.
    ///
    /// A present `author` is resolved first in the same transaction: a known
    /// id links to that row and merges the supplied fields, anything else
    /// inserts a new author. The returned book carries the stored author.
    async fn save(&self, book: BookEntity) -> Result<BookEntity>;

    async fn find_by_id(&self, isbn: &str) -> Result<Option<BookEntity>>;

    /// All books in storage order
    async fn find_all(&self) -> Result<Vec<BookEntity>>;

    async fn exists_by_id(&self, isbn: &str) -> Result<bool>;

    /// Deleting an absent ISBN is not an error
    async fn delete_by_id(&self, isbn: &str) -> Result<()>;
}

pub type BookRepositoryArc = Arc<dyn BookRepository>;

#[derive(FromRow)]
struct BookRow {
    isbn: String,
    title: Option<String>,
    author_id: Option<i64>,
    author_name: Option<String>,
    author_age: Option<i32>,
}

impl From<BookRow> for BookEntity {
    fn from(row: BookRow) -> Self {
        let author = row.author_id.map(|id| AuthorEntity {
            id: Some(id),
            name: row.author_name,
            age: row.author_age,
        });

        Self {
            isbn: row.isbn,
            title: row.title,
            author,
        }
    }
}

/// SQLite implementation of [`BookRepository`]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn save(&self, book: BookEntity) -> Result<BookEntity> {
        let mut tx = self.pool.begin().await?;

        let author = match book.author {
            Some(author) => Some(attach_author(&mut *tx, author).await?),
            None => None,
        };

        query(
            r#"
            INSERT INTO books (isbn, title, author_id) VALUES (?, ?, ?)
            ON CONFLICT(isbn) DO UPDATE SET title = excluded.title, author_id = excluded.author_id
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(author.as_ref().and_then(|a| a.id))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BookEntity { author, ..book })
    }

    async fn find_by_id(&self, isbn: &str) -> Result<Option<BookEntity>> {
        let row = query_as::<_, BookRow>(&format!("{SELECT_BOOKS} WHERE b.isbn = ?"))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BookEntity::from))
    }

    async fn find_all(&self) -> Result<Vec<BookEntity>> {
        let rows = query_as::<_, BookRow>(&format!("{SELECT_BOOKS} ORDER BY b.rowid"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BookEntity::from).collect())
    }

    async fn exists_by_id(&self, isbn: &str) -> Result<bool> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn delete_by_id(&self, isbn: &str) -> Result<()> {
        query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::authors::repository::{AuthorRepository, SqliteAuthorRepository};
    use crate::modules::test_pool;

    fn abigail() -> AuthorEntity {
        AuthorEntity {
            id: None,
            name: Some("Abigail Rose".to_string()),
            age: Some(80),
        }
    }

    fn book(isbn: &str, title: &str, author: Option<AuthorEntity>) -> BookEntity {
        BookEntity {
            isbn: isbn.to_string(),
            title: Some(title.to_string()),
            author,
        }
    }

    #[tokio::test]
    async fn test_book_with_new_author_cascades_author_save() {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        let authors = SqliteAuthorRepository::new(pool);

        let saved = repo
            .save(book("978-1-2345-6789-0", "The Shadow in the Attic", Some(abigail())))
            .await
            .unwrap();

        let author = saved.author.clone().unwrap();
        let author_id = author.id.expect("cascaded author has an id");
        assert_eq!(authors.find_by_id(author_id).await.unwrap(), Some(author));

        let found = repo.find_by_id("978-1-2345-6789-0").await.unwrap();
        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn test_multiple_books_are_listed_in_insertion_order() {
        let repo = SqliteBookRepository::new(test_pool().await);

        let a = repo
            .save(book("978-1-2345-6789-0", "The Shadow in the Attic", Some(abigail())))
            .await
            .unwrap();
        let shared_author = a.author.clone();
        let b = repo
            .save(book("978-1-2345-6789-1", "Beyond the Horizon", shared_author.clone()))
            .await
            .unwrap();
        let c = repo
            .save(book("978-1-2345-6789-2", "The Last Ember", shared_author))
            .await
            .unwrap();

        assert_eq!(repo.find_all().await.unwrap(), vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_save_existing_isbn_replaces_book() {
        let repo = SqliteBookRepository::new(test_pool().await);

        let mut saved = repo
            .save(book("978-0-13", "T", Some(abigail())))
            .await
            .unwrap();
        saved.title = Some("UPDATED".to_string());
        saved.author = None;
        repo.save(saved.clone()).await.unwrap();

        assert_eq!(repo.find_by_id("978-0-13").await.unwrap(), Some(saved));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_book_and_absent_isbn() {
        let repo = SqliteBookRepository::new(test_pool().await);

        repo.save(book("978-0-13", "T", None)).await.unwrap();
        repo.delete_by_id("978-0-13").await.unwrap();
        repo.delete_by_id("doesnotexist").await.unwrap();

        assert!(!repo.exists_by_id("978-0-13").await.unwrap());
        assert!(repo.find_by_id("978-0-13").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_author_reference_by_id_keeps_stored_fields() {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        let authors = SqliteAuthorRepository::new(pool);
        let stored = authors.save(abigail()).await.unwrap();

        let reference = AuthorEntity {
            id: stored.id,
            name: None,
            age: None,
        };
        let saved = repo
            .save(book("978-0-13", "T", Some(reference)))
            .await
            .unwrap();

        assert_eq!(saved.author, Some(stored.clone()));
        assert_eq!(authors.find_by_id(stored.id.unwrap()).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_author_reference_merges_supplied_fields() {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        let authors = SqliteAuthorRepository::new(pool);
        let stored = authors.save(abigail()).await.unwrap();

        let saved = repo
            .save(book(
                "978-0-13",
                "T",
                Some(AuthorEntity {
                    id: stored.id,
                    name: None,
                    age: Some(81),
                }),
            ))
            .await
            .unwrap();

        let expected = AuthorEntity {
            age: Some(81),
            ..stored
        };
        assert_eq!(saved.author, Some(expected.clone()));
        assert_eq!(
            authors.find_by_id(expected.id.unwrap()).await.unwrap(),
            Some(expected)
        );
    }

    #[tokio::test]
    async fn test_unknown_author_id_gets_store_assigned_id() {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        let authors = SqliteAuthorRepository::new(pool);

        let saved = repo
            .save(book(
                "978-0-13",
                "T",
                Some(AuthorEntity {
                    id: Some(999),
                    ..abigail()
                }),
            ))
            .await
            .unwrap();

        let author = saved.author.unwrap();
        assert_ne!(author.id, Some(999));
        assert_eq!(author.name.as_deref(), Some("Abigail Rose"));
        assert!(!authors.exists_by_id(999).await.unwrap());
        assert!(authors.exists_by_id(author.id.unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_author_detaches_books() {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        let authors = SqliteAuthorRepository::new(pool);

        let saved = repo
            .save(book("978-0-13", "T", Some(abigail())))
            .await
            .unwrap();
        authors
            .delete_by_id(saved.author.unwrap().id.unwrap())
            .await
            .unwrap();

        let found = repo.find_by_id("978-0-13").await.unwrap().unwrap();
        assert_eq!(found.author, None);
        assert_eq!(found.title.as_deref(), Some("T"));
    }
}
