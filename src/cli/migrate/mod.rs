//! Migrate command - applies or reverts database migrations

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{connect_pool, storage_migrations, PostgresMigrator};

#[derive(Args)]
pub struct MigrateArgs {
    /// Revert the most recent migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

/// Run migrations against the configured database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });

    let pool = connect_pool(&config.database.url, config.database.max_connections).await?;
    let migrator = PostgresMigrator::new(pool);
    let migrations = storage_migrations();

    if args.revert {
        let current = migrator.current_version().await?;

        match current {
            Some(version) => {
                let migration = migrations
                    .iter()
                    .find(|m| m.version == version)
                    .ok_or_else(|| anyhow::anyhow!("Unknown migration version {}", version))?;

                migrator.revert_migration(migration).await?;
                info!(version, "Reverted migration");
            }
            None => info!("No migrations to revert"),
        }
    } else {
        for migration in &migrations {
            migrator.run_migration(migration).await?;
        }

        info!("Migrations up to date");
    }

    Ok(())
}
