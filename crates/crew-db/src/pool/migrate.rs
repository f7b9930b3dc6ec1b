//! Schema migrations and change-feed switches

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use std::path::Path;
use tracing::info;

use crew_core::Table;

const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

/// Apply every pending migration under `crates/crew-db/migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let migrator = Migrator::new(Path::new(MIGRATIONS_DIR)).await?;
    migrator.run(pool).await?;
    info!(dir = MIGRATIONS_DIR, "Migrations applied");
    Ok(())
}

/// Choose whether DELETE notifications for `table` carry the whole old row
/// or only its id
pub async fn set_full_delete_payloads(
    pool: &PgPool,
    table: Table,
    enabled: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO change_feed_settings (table_name, full_delete_payloads)
        VALUES ($1, $2)
        ON CONFLICT (table_name) DO UPDATE SET full_delete_payloads = EXCLUDED.full_delete_payloads
        "#,
    )
    .bind(table.as_str())
    .bind(enabled)
    .execute(pool)
    .await?;

    info!(table = table.as_str(), enabled, "Delete payload mode set");
    Ok(())
}

/// Point the change triggers at `channel`
///
/// Listeners must LISTEN on the same name; see `ChangeListener::connect`.
pub async fn set_notify_channel(pool: &PgPool, channel: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO change_feed_channel (id, channel)
        VALUES (TRUE, $1)
        ON CONFLICT (id) DO UPDATE SET channel = EXCLUDED.channel
        "#,
    )
    .bind(channel)
    .execute(pool)
    .await?;

    info!(channel = %channel, "Change notify channel set");
    Ok(())
}
