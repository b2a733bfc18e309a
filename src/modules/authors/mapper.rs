//! Conversions between [`AuthorDto`] and [`AuthorEntity`].

use super::models::{AuthorDto, AuthorEntity};

impl From<AuthorDto> for AuthorEntity {
    fn from(dto: AuthorDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            age: dto.age,
        }
    }
}

impl From<AuthorEntity> for AuthorDto {
    fn from(entity: AuthorEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            age: entity.age,
        }
    }
}
