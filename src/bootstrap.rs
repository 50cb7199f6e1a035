//! Process lifecycle: open the store, run modules, close the store.

use anyhow::Context;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registry with every project module registered
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Apply pending schema migrations, or only report them when `dry_run` is set.
///
/// Returns the `module/id` labels of the migrations that were (or would be) applied.
pub async fn migrate(settings: &Settings, dry_run: bool) -> anyhow::Result<Vec<String>> {
    let db = connect(settings).await?;
    let result = run_migrations(&db, &registry(), dry_run).await;
    db.close().await;
    result
}

async fn run_migrations(
    db: &Database,
    registry: &ModuleRegistry,
    dry_run: bool,
) -> anyhow::Result<Vec<String>> {
    let migrations = registry.collect_migrations();
    let pending = db
        .pending_migrations(&migrations)
        .await
        .context("failed to read migration ledger")?;

    let labels: Vec<String> = pending
        .iter()
        .map(|(module, migration)| format!("{}/{}", module, migration.id))
        .collect();

    if dry_run {
        tracing::info!(pending = labels.len(), "migration dry run");
        return Ok(labels);
    }

    let applied = db
        .apply_migrations(&migrations)
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations complete");

    Ok(labels)
}

/// Serve HTTP until shutdown. The schema must already be migrated.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let db = connect(settings).await?;
    let registry = registry();

    let result = serve_with(&db, &registry, settings).await;

    db.close().await;
    result
}

async fn serve_with(
    db: &Database,
    registry: &ModuleRegistry,
    settings: &Settings,
) -> anyhow::Result<()> {
    let pending = db
        .pending_migrations(&registry.collect_migrations())
        .await
        .context("failed to read migration ledger")?;
    if !pending.is_empty() {
        anyhow::bail!(
            "{} pending migration(s); run `bookshelf migrate` before serving",
            pending.len()
        );
    }

    let ctx = InitCtx { settings, db };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(registry, &ctx).await;
    let stopped = registry.stop_modules().await;

    shutdown_outcome(served, stopped)
}

/// The server's error wins; a stop failure behind it is logged instead of dropped.
fn shutdown_outcome(
    served: anyhow::Result<()>,
    stopped: anyhow::Result<()>,
) -> anyhow::Result<()> {
    if let (Err(_), Err(stop_err)) = (&served, &stopped) {
        tracing::error!(error = ?stop_err, "failed to stop modules after server error");
    }
    served.and(stopped)
}

async fn connect(settings: &Settings) -> anyhow::Result<Database> {
    Database::connect(&settings.database.connect_options())
        .await
        .with_context(|| format!("failed to open database '{}'", settings.database.url))
}
