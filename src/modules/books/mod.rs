pub mod mapper;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;
use sqlx::SqlitePool;

use super::authors::models::AuthorDto;
use super::schema_json;
use models::BookDto;
use repository::SqliteBookRepository;
use service::BookService;

/// Books resource: `/books` and `/books/{isbn}`
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book = json!({ "$ref": "#/components/schemas/BookDto" });
        let book_body = json!({
            "required": true,
            "content": { "application/json": { "schema": book } }
        });
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": book } }
            })
        };
        let not_found = json!({ "description": "Book not found" });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": book }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{isbn}": {
                    "parameters": [{
                        "name": "isbn",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    }],
                    "get": {
                        "summary": "Get book",
                        "tags": ["Books"],
                        "responses": { "200": book_response("Book"), "404": not_found }
                    },
                    "put": {
                        "summary": "Create or replace book",
                        "tags": ["Books"],
                        "requestBody": book_body,
                        "responses": {
                            "200": book_response("Replaced book"),
                            "201": book_response("Created book")
                        }
                    },
                    "patch": {
                        "summary": "Update supplied book fields",
                        "tags": ["Books"],
                        "requestBody": book_body,
                        "responses": { "200": book_response("Merged book"), "404": not_found }
                    },
                    "delete": {
                        "summary": "Delete book",
                        "tags": ["Books"],
                        "responses": { "204": { "description": "Deleted or already absent" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookDto": schema_json::<BookDto>(),
                    "AuthorDto": schema_json::<AuthorDto>()
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        repository::MIGRATIONS.to_vec()
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by `pool`
pub fn create_module(pool: SqlitePool) -> Arc<dyn Module> {
    let repository = Arc::new(SqliteBookRepository::new(pool));
    Arc::new(BooksModule::new(Arc::new(BookService::new(repository))))
}
