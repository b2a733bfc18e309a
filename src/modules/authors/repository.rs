//! Author repository trait and SQLite implementation

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_db::Result;
use bookshelf_kernel::Migration;
use sqlx::{query, query_as, query_scalar, Sqlite, SqliteConnection, SqlitePool};

use super::models::AuthorEntity;

pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_authors",
    up: r#"
        CREATE TABLE authors (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            age  INTEGER
        );
    "#,
}];

/// Data access for authors
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Insert when `id` is `None`, otherwise insert-or-replace the row with that id.
    /// Returns the stored row including its id.
    async fn save(&self, author: AuthorEntity) -> Result<AuthorEntity>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorEntity>>;

    /// All authors in storage order
    async fn find_all(&self) -> Result<Vec<AuthorEntity>>;

    async fn exists_by_id(&self, id: i64) -> Result<bool>;

    /// Deleting an absent id is not an error
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

pub type AuthorRepositoryArc = Arc<dyn AuthorRepository>;

/// SQLite implementation of [`AuthorRepository`]
pub struct SqliteAuthorRepository {
    pool: SqlitePool,
}

impl SqliteAuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn upsert_author<'e, E>(
    executor: E,
    author: AuthorEntity,
) -> std::result::Result<AuthorEntity, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let id = match author.id {
        None => {
            query_scalar::<_, i64>("INSERT INTO authors (name, age) VALUES (?, ?) RETURNING id")
                .bind(&author.name)
                .bind(author.age)
                .fetch_one(executor)
                .await?
        }
        Some(id) => {
            query(
                r#"
                INSERT INTO authors (id, name, age) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name, age = excluded.age
                "#,
            )
            .bind(id)
            .bind(&author.name)
            .bind(author.age)
            .execute(executor)
            .await?;
            id
        }
    };

    Ok(AuthorEntity {
        id: Some(id),
        ..author
    })
}

/// Resolve the author nested in a book write, on the book's connection.
///
/// An id that names a stored row links to it and overwrites only the fields
/// that are `Some`. Without an id, or with an id the store does not know, a
/// new row is inserted under a store-assigned id.
pub(crate) async fn attach_author(
    conn: &mut SqliteConnection,
    author: AuthorEntity,
) -> std::result::Result<AuthorEntity, sqlx::Error> {
    let linked = match author.id {
        Some(id) => {
            query_as::<_, AuthorEntity>(
                r#"
                UPDATE authors SET name = COALESCE(?, name), age = COALESCE(?, age)
                WHERE id = ?
                RETURNING id, name, age
                "#,
            )
            .bind(&author.name)
            .bind(author.age)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        }
        None => None,
    };

    match linked {
        Some(stored) => Ok(stored),
        None => {
            query_as::<_, AuthorEntity>(
                "INSERT INTO authors (name, age) VALUES (?, ?) RETURNING id, name, age",
            )
            .bind(&author.name)
            .bind(author.age)
            .fetch_one(&mut *conn)
            .await
        }
    }
}

#[async_trait]
impl AuthorRepository for SqliteAuthorRepository {
    async fn save(&self, author: AuthorEntity) -> Result<AuthorEntity> {
        Ok(upsert_author(&self.pool, author).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorEntity>> {
        let author = query_as::<_, AuthorEntity>("SELECT id, name, age FROM authors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(author)
    }

    async fn find_all(&self) -> Result<Vec<AuthorEntity>> {
        let authors = query_as::<_, AuthorEntity>("SELECT id, name, age FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(authors)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
