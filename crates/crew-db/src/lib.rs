//! # crew-db
//!
//! Database layer implementing the repository ports with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity <-> Model mappers
//! - Repository implementations
//! - A `LISTEN` client decoding the change events emitted by the triggers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crew_db::{create_pool, run_migrations, DatabaseConfig, PgCommentRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let comments = PgCommentRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod listener;
pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use listener::{decode_notification, ChangeListener, ListenerError};
pub use pool::{
    create_pool, create_pool_from_env, run_migrations, set_full_delete_payloads,
    set_notify_channel, DatabaseConfig, PgPool,
};
pub use repositories::{
    PgCommentRepository, PgLikeRepository, PgMemberRepository, PgNotificationRepository,
};
