//! Database connection pool management

mod migrate;
mod postgres;

pub use migrate::{run_migrations, set_full_delete_payloads, set_notify_channel};
pub use postgres::{create_pool, create_pool_from_env, DatabaseConfig};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
