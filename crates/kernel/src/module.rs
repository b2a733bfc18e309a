use async_trait::async_trait;
use axum::Router;

/// Borrowed view of the loaded settings handed to lifecycle hooks
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// One schema step owned by a module.
///
/// `id` must sort after every earlier step of the same module; the runner
/// records `(module, id)` once applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A resource mounted by the service, e.g. `authors` or `books`
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key and URL segment; must be unique
    fn name(&self) -> &'static str;

    /// Runs once after migrations, in registration order
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Handlers nested at `{api_prefix}/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the mount point and
    /// optional `components.schemas`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs right before the server binds
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server drained, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
