//! persist-db — Postgres connection pool and schema bootstrap for the
//! persister workspace.
//!
//! This crate owns the opaque DB boundary described in SPEC_FULL.md §1:
//! everything downstream (`persist-reconcile`) talks to Postgres through
//! the `sqlx::PgPool` this crate hands out, using the `pg_trgm` similarity
//! operators the schema bootstrap enables.

pub mod error;
pub mod pool;
pub mod schema;

pub use error::{DbError, Result};
pub use pool::connect;
pub use schema::bootstrap_schema;
