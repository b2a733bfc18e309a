use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::authors::models::{AuthorDto, AuthorEntity};

/// Persisted book, keyed by its client-chosen ISBN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookEntity {
    pub isbn: String,
    pub title: Option<String>,
    pub author: Option<AuthorEntity>,
}

/// Wire representation of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookDto {
    /// ISBN; the path segment wins over this field on writes
    pub isbn: Option<String>,
    /// Title of the book
    pub title: Option<String>,
    /// Author of the book, saved along with it when present
    pub author: Option<AuthorDto>,
}
