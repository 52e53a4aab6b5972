//! Migrate command handler
//!
//! Applies, previews or reverts the embedded schema migrations.

use crate::config::settings::Settings;
use crate::db::{pending_migrations, revert_migrations, run_migrations};
use crate::error::{AppError, AppResult};

/// Handler for the migrate command
pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the migrate command.
    ///
    /// # Arguments
    /// * `dry_run` - List pending migrations without applying them
    /// * `rollback` - Revert this many migrations, newest first
    ///
    /// # Errors
    /// - Invalid database configuration or zero rollback steps
    /// - Connection and migration failures
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        if rollback == Some(0) {
            return Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "Number of rollback steps must be greater than 0".to_string(),
            });
        }

        self.config.database.validate()?;
        let url = self.config.database.url.clone();

        if dry_run {
            let pending = blocking(move || pending_migrations(&url)).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations - database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                for name in &pending {
                    println!("  - {}", name);
                }
                println!("\nRun without --dry-run to apply these migrations");
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            println!("Rolling back {} migration(s)...", steps);
            let reverted = blocking(move || revert_migrations(&url, steps)).await?;
            tracing::info!(count = reverted.len(), migrations = ?reverted, "Migrations reverted");
            if (reverted.len() as u32) < steps {
                println!(
                    "Only {} migration(s) were applied; all of them were reverted",
                    reverted.len()
                );
            }
            for version in &reverted {
                println!("  - {}", version);
            }
            println!("✓ Rolled back {} migration(s)", reverted.len());
            return Ok(());
        }

        println!("Running database migrations...");
        let applied = blocking(move || run_migrations(&url)).await?;
        tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");
        if applied.is_empty() {
            println!("✓ No migrations to apply - database is already up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {}", version);
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

/// Migration helpers hold a blocking `PgConnection`.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal_with("Migration task failed", e))?
}
