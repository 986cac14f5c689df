//! # PostgreSQL connection pool
//!
//! A lazy, process-wide [`tokio::sync::OnceCell`] singleton. The first call to
//! [`get_pool`] reads the database settings (see [`crate::settings`]), opens
//! the pool and caches it; [`run_migrations`] applies `migrations/` at start-up.
//! Server only, so WASM builds never pull in SQLx.

#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::{get_pool, run_migrations};
