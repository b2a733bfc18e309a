use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persisted author row.
///
/// `id` is `None` until the store assigns one on first save.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct AuthorEntity {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i32>,
}

/// Wire representation of an author.
///
/// Every field is optional so the same shape serves create, full update and
/// partial update payloads; absent and `null` fields both read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorDto {
    /// Store-assigned identifier
    pub id: Option<i64>,
    /// Display name of the author
    pub name: Option<String>,
    /// Age in years
    pub age: Option<i32>,
}
