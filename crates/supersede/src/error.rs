//! Cancellation kinds and the run outcome error type.

use thiserror::Error;

/// Reason a run's cooperative cancellation gate tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelKind {
	/// A newer run claimed the slot; this run's registry entry is gone.
	#[error("superseded by a newer start")]
	Superseded,
	/// Abort was requested while this run still owned the slot.
	#[error("aborted by request")]
	Aborted,
}

/// Failure value a run body settles with.
///
/// `Cancelled` is the control-flow sentinel a checkpoint raises through
/// `?`; settlement swallows it, so it never reaches a snapshot. Only
/// `Failed` carries a consumer-visible error, published verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError<E> {
	/// Cooperative-cancel sentinel; discarded at settlement.
	#[error("run cancelled: {0}")]
	Cancelled(#[from] CancelKind),
	/// Genuine task failure; becomes the failed snapshot.
	#[error("run failed: {0}")]
	Failed(E),
}

/// Outcome type run bodies resolve with.
pub type RunResult<T, E> = Result<T, RunError<E>>;
