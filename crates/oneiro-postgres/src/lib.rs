//! Postgres implementations of the oneiro-core storage ports.
//!
//! Each adapter is a newtype wrapping PgPool. All SQL is runtime-checked
//! (sqlx::query, not sqlx::query!) to avoid a compile-time DB requirement.
//! Schema: migrations/0001_init.sql.

pub mod store;

pub use store::{PgDreamStore, PgOperationLogStore, PgProfileStore, PgStores};
