//! Process Topology Module
//!
//! Implements the primary/worker split. The primary forks a fixed number of
//! worker processes that each serve HTTP on the same port with their own
//! in-memory state; the primary itself serves nothing.
//!
//! ## Core Concepts
//! - **Role**: Resolved once at startup from the marker the primary sets on its children.
//! - **Fork Count Policy**: `max(1, available CPUs - 1)` workers.
//! - **Exit Monitoring**: Worker deaths are logged and recorded, never repaired. The pool only shrinks.
//! - **Isolation**: Workers share nothing but the listening port; a crash loses only that worker's data.

pub mod policy;
pub mod supervisor;
pub mod types;

pub use policy::worker_count;
pub use supervisor::{WorkerCommand, WorkerPool, WorkerSupervisor};
pub use types::Role;
