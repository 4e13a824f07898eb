//! Bookstore application library
//!
//! Wires the application modules onto the kernel, database and HTTP crates.

use anyhow::Context;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Registry holding every application module
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Open the configured database and apply pending migrations
pub async fn migrate(settings: &Settings, registry: &ModuleRegistry) -> anyhow::Result<Database> {
    let db = Database::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("failed to open database")?;

    let applied = db
        .apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    tracing::info!(applied, "migrations up to date");

    Ok(db)
}

/// Run the API until a shutdown signal arrives, then stop modules and close the pool
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = registry();
    let db = migrate(&settings, &registry).await?;
    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };

    let served = init_and_serve(&registry, &ctx).await;

    let stopped = registry.stop_all().await;
    db.close().await;

    served.and(stopped)
}

async fn init_and_serve(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
    registry.init_all(ctx).await?;
    bookstore_http::start_server(registry, ctx).await
}
