//! Conversions between [`BookDto`] and [`BookEntity`].

use super::models::{BookDto, BookEntity};

impl From<BookDto> for BookEntity {
    /// A missing ISBN maps to an empty key; writers overwrite it with the path ISBN.
    fn from(dto: BookDto) -> Self {
        Self {
            isbn: dto.isbn.unwrap_or_default(),
            title: dto.title,
            author: dto.author.map(Into::into),
        }
    }
}

impl From<BookEntity> for BookDto {
    fn from(entity: BookEntity) -> Self {
        Self {
            isbn: Some(entity.isbn),
            title: entity.title,
            author: entity.author.map(Into::into),
        }
    }
}
