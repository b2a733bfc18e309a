pub mod authors;
pub mod books;

use bookshelf_kernel::ModuleRegistry;
use sqlx::SqlitePool;

/// Register the catalog modules with the registry.
///
/// Authors goes first: the books table references it.
pub fn register_all(registry: &mut ModuleRegistry, pool: &SqlitePool) -> anyhow::Result<()> {
    registry.register(authors::create_module(pool.clone()))?;
    registry.register(books::create_module(pool.clone()))?;
    Ok(())
}

/// JSON form of a derived schema, for module OpenAPI fragments
pub(crate) fn schema_json<T: utoipa::ToSchema>() -> serde_json::Value {
    serde_json::to_value(T::schema()).unwrap_or_default()
}

/// In-memory pool with every catalog migration applied
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = bookshelf_db::create_pool(&bookshelf_kernel::settings::DatabaseSettings::in_memory())
        .await
        .expect("in-memory pool");

    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, &pool).expect("register modules");
    bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .expect("apply migrations");

    pool
}
