//! PostgreSQL plumbing shared by the blog services.
//!
//! Connection pooling from environment configuration, connect-with-retry for
//! container start-up races, migration running and a readiness probe.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config).await?;
//! postgres::run_migrations::<Migrator>(&db, "blog_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
