#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Latest-wins coordination for a single logical async computation.
//!
//! A [`Coordinator`] owns at most one in-flight run at a time. Every
//! [`Coordinator::start`] supersedes the previous run: the old run's
//! registry entry is evicted and its cancellation signal fires before
//! the new body executes, so stale outcomes are never observed. Bodies
//! cooperate through a [`RunContext`], polling the cancellation gate
//! between steps and handing the signal to abort-aware APIs, while
//! consumers read one [`Snapshot`] and are poked by a notifier callback
//! exactly once per published change.
//!
//! ```no_run
//! use supersede::{Coordinator, RunError};
//!
//! # async fn fetch(_part: u32) -> Result<String, String> { Ok(String::new()) }
//! let coordinator: Coordinator<String, String> = Coordinator::new(|| {
//!     // poke the view layer; it re-reads `coordinator.snapshot()`
//! });
//!
//! // Input changed: supersede whatever was in flight.
//! coordinator.start(|ctx| async move {
//!     let first = fetch(1).await.map_err(RunError::Failed)?;
//!     ctx.checkpoint().await?;
//!     let second = fetch(2).await.map_err(RunError::Failed)?;
//!     Ok(format!("{first}{second}"))
//! });
//! ```

mod context;
mod coordinator;
mod error;
mod registry;
mod snapshot;
mod spawn;

pub use context::RunContext;
pub use coordinator::Coordinator;
pub use error::{CancelKind, RunError, RunResult};
pub use registry::{RunId, RunStatus};
pub use snapshot::Snapshot;
