//! Bookshelf Application Library
//!
//! Wires the catalog modules, the SQLite pool, and the HTTP facade into a
//! runnable service.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

pub mod error;
pub mod modules;

/// A migrated database, initialized modules, and the router serving them.
pub struct Application {
    pub pool: SqlitePool,
    pub registry: ModuleRegistry,
    pub router: Router,
}

impl Application {
    /// Open the pool, apply pending migrations, initialize every module and
    /// assemble the router. Nothing is bound yet.
    pub async fn build(settings: &Settings) -> anyhow::Result<Self> {
        let pool = bookshelf_db::create_pool(&settings.database)
            .await
            .context("failed to open database")?;
        let registry = build_registry(&pool)?;

        let applied = bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "migrations up to date");

        registry.init_modules(&InitCtx { settings }).await?;

        let router = bookshelf_http::build_router(&registry, settings);

        Ok(Self {
            pool,
            registry,
            router,
        })
    }

    /// Start modules, serve until `shutdown` resolves, then stop modules and
    /// close the pool.
    pub async fn serve<F>(self, settings: &Settings, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.registry.start_modules(&InitCtx { settings }).await?;

        let served = bookshelf_http::start_server(self.router, settings, shutdown).await;

        self.registry.stop_modules().await?;
        self.pool.close().await;
        served
    }
}

/// Registry holding every catalog module, backed by `pool`
pub fn build_registry(pool: &SqlitePool) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, pool)?;
    tracing::info!(modules = registry.module_count(), "modules registered");
    Ok(registry)
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::create_pool(&settings.database)
        .await
        .context("failed to open database")?;
    let registry = build_registry(&pool)?;

    let applied = bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    pool.close().await;

    Ok(applied)
}

/// Build the application and serve it until Ctrl-C or SIGTERM.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf starting"
    );

    let app = Application::build(&settings).await?;
    app.serve(&settings, bookshelf_http::shutdown_signal()).await?;

    tracing::info!("bookshelf stopped");
    Ok(())
}
