use crate::error::{CatalogError, CatalogResult};

use super::models::AuthorEntity;
use super::repository::AuthorRepositoryArc;

/// Author use cases on top of an [`AuthorRepository`](super::repository::AuthorRepository).
///
/// Existence checks and the writes that follow them are separate store calls;
/// concurrent requests on the same id may interleave between the two.
pub struct AuthorService {
    repository: AuthorRepositoryArc,
}

impl AuthorService {
    pub fn new(repository: AuthorRepositoryArc) -> Self {
        Self { repository }
    }

    pub async fn save(&self, author: AuthorEntity) -> CatalogResult<AuthorEntity> {
        let saved = self.repository.save(author).await?;
        tracing::info!(author_id = ?saved.id, "author saved");
        Ok(saved)
    }

    pub async fn find_all(&self) -> CatalogResult<Vec<AuthorEntity>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn find_one(&self, id: i64) -> CatalogResult<Option<AuthorEntity>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn is_exists(&self, id: i64) -> CatalogResult<bool> {
        Ok(self.repository.exists_by_id(id).await?)
    }

    /// Overwrite every field of author `id` with `author`.
    pub async fn full_update(&self, id: i64, author: AuthorEntity) -> CatalogResult<AuthorEntity> {
        self.save(AuthorEntity {
            id: Some(id),
            ..author
        })
        .await
    }

    /// Overwrite only the fields that are `Some` in `author`.
    pub async fn partial_update(&self, id: i64, author: AuthorEntity) -> CatalogResult<AuthorEntity> {
        let mut existing =
            self.repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| CatalogError::NotFound {
                    entity: "author",
                    key: id.to_string(),
                })?;

        if let Some(name) = author.name {
            existing.name = Some(name);
        }
        if let Some(age) = author.age {
            existing.age = Some(age);
        }

        self.save(existing).await
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.repository.delete_by_id(id).await?;
        tracing::info!(author_id = id, "author deleted");
        Ok(())
    }
}
