//! Clustered User Service Library
//!
//! This library crate defines the modules behind the `user-cluster` binary
//! (`main.rs`): an in-memory user CRUD service run by a pool of worker
//! processes.
//!
//! ## Architecture Modules
//! - **`cluster`**: The process topology. The primary forks `max(1, CPUs - 1)` workers,
//!   logs their exits and never restarts them.
//! - **`server`**: The worker side. Binds the shared port and serves the HTTP router.
//! - **`users`**: The per-process `UserStore` and the CRUD handlers over it. Stores are
//!   never shared, so workers diverge after their first write.
//! - **`config`**: Environment-driven settings (`PORT`, `HOST`).

pub mod cluster;
pub mod config;
pub mod server;
pub mod users;
