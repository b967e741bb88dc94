use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    // Connect without the automatic migration so the run is reported here
    let mut database = config().database.clone();
    database.run_migrations = false;

    let pool = DatabaseManager::connect(&database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;

    output_success(
        &output_format,
        "Migrations applied",
        Some(json!({ "migrated": true })),
    )
}
