//! Schema migration runner.
//!
//! Migrations are contributed by modules as `(module, Migration)` pairs and
//! recorded in the `schema_migrations` ledger once applied. Each migration
//! runs in its own transaction together with its ledger row, so a failed
//! migration leaves no partial record behind.

use std::collections::HashSet;

use crate::{Database, StoreError, StoreResult};

const LEDGER_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    module     TEXT NOT NULL,
    id         TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (module, id)
);
"#;

/// Migration definition for modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

impl Database {
    /// Migrations from `migrations` that have not been recorded yet, in input order.
    ///
    /// Read-only: a database without a ledger reports everything as pending.
    pub async fn pending_migrations(
        &self,
        migrations: &[(String, Migration)],
    ) -> StoreResult<Vec<(String, Migration)>> {
        let applied = self.applied_migrations().await?;

        Ok(migrations
            .iter()
            .filter(|(module, migration)| {
                !applied.contains(&(module.clone(), migration.id.to_string()))
            })
            .cloned()
            .collect())
    }

    /// Apply every pending migration. Returns how many were applied.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> StoreResult<usize> {
        let pending = self.pending_migrations(migrations).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        sqlx::raw_sql(LEDGER_DDL).execute(self.pool()).await?;

        for (module, migration) in &pending {
            tracing::info!(
                target: "bookshelf-db",
                module = %module,
                migration = migration.id,
                "applying migration"
            );

            let wrap = |source: sqlx::Error| StoreError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            };

            let mut tx = self.pool().begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .map_err(wrap)?;
            sqlx::query("INSERT INTO schema_migrations (module, id) VALUES (?, ?)")
                .bind(module.as_str())
                .bind(migration.id)
                .execute(&mut *tx)
                .await
                .map_err(wrap)?;
            tx.commit().await.map_err(wrap)?;
        }

        Ok(pending.len())
    }

    async fn applied_migrations(&self) -> StoreResult<HashSet<(String, String)>> {
        let ledgers: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
        )
        .fetch_one(self.pool())
        .await?;

        if ledgers == 0 {
            return Ok(HashSet::new());
        }

        let applied =
            sqlx::query_as::<_, (String, String)>("SELECT module, id FROM schema_migrations")
                .fetch_all(self.pool())
                .await?
                .into_iter()
                .collect();

        Ok(applied)
    }
}
