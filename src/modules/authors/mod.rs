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

use super::schema_json;
use models::AuthorDto;
use repository::SqliteAuthorRepository;
use service::AuthorService;

/// Authors resource: `/authors` and `/authors/{id}`
pub struct AuthorsModule {
    service: Arc<AuthorService>,
}

impl AuthorsModule {
    pub fn new(service: Arc<AuthorService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let author = json!({ "$ref": "#/components/schemas/AuthorDto" });
        let author_body = json!({
            "required": true,
            "content": { "application/json": { "schema": author } }
        });
        let author_response = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": author } }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let not_found = json!({ "description": "Author not found" });

        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create author",
                        "tags": ["Authors"],
                        "requestBody": author_body,
                        "responses": { "201": author_response("Created author") }
                    },
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "All authors",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": author }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "parameters": id_param,
                    "get": {
                        "summary": "Get author",
                        "tags": ["Authors"],
                        "responses": { "200": author_response("Author"), "404": not_found }
                    },
                    "put": {
                        "summary": "Replace author",
                        "tags": ["Authors"],
                        "requestBody": author_body,
                        "responses": { "200": author_response("Replaced author"), "404": not_found }
                    },
                    "patch": {
                        "summary": "Update supplied author fields",
                        "tags": ["Authors"],
                        "requestBody": author_body,
                        "responses": { "200": author_response("Merged author"), "404": not_found }
                    },
                    "delete": {
                        "summary": "Delete author",
                        "tags": ["Authors"],
                        "responses": { "204": { "description": "Deleted or already absent" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "AuthorDto": schema_json::<AuthorDto>()
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        repository::MIGRATIONS.to_vec()
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create the authors module backed by `pool`
pub fn create_module(pool: SqlitePool) -> Arc<dyn Module> {
    let repository = Arc::new(SqliteAuthorRepository::new(pool));
    Arc::new(AuthorsModule::new(Arc::new(AuthorService::new(repository))))
}
