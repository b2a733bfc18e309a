use crate::error::{CatalogError, CatalogResult};

use super::models::BookEntity;
use super::repository::BookRepositoryArc;

/// Book use cases on top of a [`BookRepository`](super::repository::BookRepository).
pub struct BookService {
    repository: BookRepositoryArc,
}

impl BookService {
    pub fn new(repository: BookRepositoryArc) -> Self {
        Self { repository }
    }

    /// Store `book` under `isbn`, creating or replacing it.
    ///
    /// Whether a row existed before is not reported. Callers that check first
    /// can race a concurrent writer for the same ISBN.
    pub async fn create_update(&self, isbn: &str, book: BookEntity) -> CatalogResult<BookEntity> {
        let saved = self
            .repository
            .save(BookEntity {
                isbn: isbn.to_string(),
                ..book
            })
            .await?;
        tracing::info!(isbn = %saved.isbn, "book saved");
        Ok(saved)
    }

    pub async fn find_all(&self) -> CatalogResult<Vec<BookEntity>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn find_one(&self, isbn: &str) -> CatalogResult<Option<BookEntity>> {
        Ok(self.repository.find_by_id(isbn).await?)
    }

    pub async fn is_exists(&self, isbn: &str) -> CatalogResult<bool> {
        Ok(self.repository.exists_by_id(isbn).await?)
    }

    /// Overwrite `title` and `author` only when they are `Some` in `book`.
    pub async fn partial_update(&self, isbn: &str, book: BookEntity) -> CatalogResult<BookEntity> {
        let mut existing =
            self.repository
                .find_by_id(isbn)
                .await?
                .ok_or_else(|| CatalogError::NotFound {
                    entity: "book",
                    key: isbn.to_string(),
                })?;

        if let Some(title) = book.title {
            existing.title = Some(title);
        }
        if let Some(author) = book.author {
            existing.author = Some(author);
        }

        let saved = self.repository.save(existing).await?;
        tracing::info!(isbn = %saved.isbn, "book updated");
        Ok(saved)
    }

    pub async fn delete(&self, isbn: &str) -> CatalogResult<()> {
        self.repository.delete_by_id(isbn).await?;
        tracing::info!(isbn = %isbn, "book deleted");
        Ok(())
    }
}
