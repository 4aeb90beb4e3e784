//! Users Module
//!
//! The CRUD surface of a single serving process.
//!
//! ## Submodules
//! - **`store`**: The per-process `UserStore`, an ordered in-memory collection of records.
//! - **`handlers`**: Axum handlers translating HTTP requests into store queries and mutations.
//! - **`error`**: `ApiError`, the mapping from domain failures to status codes and JSON bodies.
//! - **`types`**: Records, identifiers and request/response DTOs.

pub mod error;
pub mod handlers;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
