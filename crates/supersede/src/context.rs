//! Per-run capability handle passed into task bodies.

use std::fmt;
use std::sync::Weak;

use tokio_util::sync::CancellationToken;

use crate::error::CancelKind;
use crate::registry::RunId;

/// Cancellation state probe the context polls against.
pub(crate) trait CancelProbe: Send + Sync {
	fn poll_cancel(&self, id: RunId) -> Result<(), CancelKind>;
}

/// Handle a run body uses to cooperate with its coordinator.
///
/// Carries the run's identity, its cancellation signal, and the
/// cooperative cancellation gate. Clone it freely into sub-tasks; every
/// clone observes the same run.
#[derive(Clone)]
pub struct RunContext {
	pub(crate) probe: Weak<dyn CancelProbe>,
	pub(crate) id: RunId,
	pub(crate) signal: CancellationToken,
}

impl RunContext {
	/// Returns this run's identity.
	pub fn run_id(&self) -> RunId {
		self.id
	}

	/// Returns this run's cancellation signal.
	///
	/// Hand it (or a [`CancellationToken::child_token`]) to abort-aware
	/// APIs; it fires when the run is superseded or aborted.
	pub fn signal(&self) -> &CancellationToken {
		&self.signal
	}

	/// Synchronous cooperative cancellation gate.
	///
	/// `Ok(())` means keep going. `Err` carries the cancellation kind:
	/// [`CancelKind::Superseded`] when a newer run evicted this one (or
	/// the coordinator itself is gone), [`CancelKind::Aborted`] when
	/// abort was requested while this run still owned the slot. Never
	/// blocks.
	pub fn poll_cancellation(&self) -> Result<(), CancelKind> {
		match self.probe.upgrade() {
			Some(probe) => probe.poll_cancel(self.id),
			None => Err(CancelKind::Superseded),
		}
	}

	/// Awaitable cancellation gate for sequential bodies.
	///
	/// Yields to the runtime once, then polls, so a checkpoint loop
	/// stays cooperative even on a single-threaded runtime. Cancellation
	/// surfaces as an ordinary `Err` for `?` propagation; checkpoints
	/// never panic the body.
	pub async fn checkpoint(&self) -> Result<(), CancelKind> {
		tokio::task::yield_now().await;
		self.poll_cancellation()
	}
}

impl fmt::Debug for RunContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RunContext")
			.field("id", &self.id)
			.finish_non_exhaustive()
	}
}
