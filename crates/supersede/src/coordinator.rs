//! The latest-wins coordinator: slot ownership, settlement gating, and
//! change notification.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::context::{CancelProbe, RunContext};
use crate::error::{CancelKind, RunError, RunResult};
use crate::registry::{GenerationClock, OwnerSlot, RunId, RunStatus};
use crate::snapshot::Snapshot;
use crate::spawn;

type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Combined slot and snapshot state, guarded by one lock so compound
/// transitions (evict and claim, validate and publish, abort) are
/// atomic with respect to each other.
struct State<T, E> {
	slot: OwnerSlot,
	snapshot: Option<Snapshot<T, E>>,
}

struct Inner<T, E> {
	clock: GenerationClock,
	state: Mutex<State<T, E>>,
	notify: Notifier,
}

impl<T, E> Inner<T, E> {
	/// Records a run body's outcome, publishing it only when the run
	/// still owns the slot with a running status.
	fn settle(&self, id: RunId, outcome: RunResult<T, E>) {
		let (status, snapshot) = match outcome {
			Ok(value) => (RunStatus::Completed, Snapshot::Completed(value)),
			Err(RunError::Failed(error)) => (RunStatus::Failed, Snapshot::Failed(error)),
			Err(RunError::Cancelled(kind)) => {
				tracing::trace!(run = id.value(), kind = ?kind, "supersede.discard_cancelled");
				return;
			}
		};

		let published = {
			let mut state = self.state.lock();
			if state.slot.settle(id, status) {
				state.snapshot = Some(snapshot);
				true
			} else {
				false
			}
		};

		if published {
			tracing::debug!(run = id.value(), status = ?status, "supersede.publish");
			(self.notify)();
		} else {
			tracing::trace!(run = id.value(), "supersede.discard_stale");
		}
	}
}

impl<T, E> CancelProbe for Inner<T, E>
where
	T: Send,
	E: Send,
{
	fn poll_cancel(&self, id: RunId) -> Result<(), CancelKind> {
		self.state.lock().slot.probe(id)
	}
}

impl<T, E> Drop for Inner<T, E> {
	fn drop(&mut self) {
		self.state.get_mut().slot.cancel_current();
	}
}

/// Latest-wins coordinator for one logical async computation.
///
/// At most one run owns the slot at a time. [`start`](Self::start)
/// supersedes the current run: its registry entry is evicted and its
/// cancellation signal fires before the new body executes, so a stale
/// run can never publish over a newer one. Consumers observe a single
/// [`Snapshot`] plus a payload-free notifier callback that fires
/// exactly once per published change (settlement or abort) and never
/// for starts.
///
/// Handles are cheap to clone and share one coordinator. Dropping the
/// last handle fires the in-flight run's signal so its body can wind
/// down; the outcome is discarded.
pub struct Coordinator<T, E> {
	inner: Arc<Inner<T, E>>,
}

impl<T, E> Coordinator<T, E> {
	/// Creates a coordinator that reports published changes through
	/// `notify`.
	///
	/// The callback carries no payload; consumers re-read the snapshot.
	/// It is invoked after the coordinator's internal lock is released,
	/// so it may query the coordinator directly.
	pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
		Self {
			inner: Arc::new(Inner {
				clock: GenerationClock::default(),
				state: Mutex::new(State {
					slot: OwnerSlot::default(),
					snapshot: None,
				}),
				notify: Arc::new(notify),
			}),
		}
	}

	/// Requests abort of `run`.
	///
	/// Applies only while `run` still owns the slot with a running
	/// status: the registry entry is marked `Aborted` in place, the
	/// run's signal fires, an `Aborted` snapshot is published, and the
	/// notifier fires once. Any other state (superseded, settled,
	/// already aborted) makes this a no-op, so tardy or repeated abort
	/// requests are harmless.
	pub fn request_abort(&self, run: RunId) {
		let aborted = {
			let mut state = self.inner.state.lock();
			if state.slot.mark_aborted(run) {
				state.snapshot = Some(Snapshot::Aborted);
				true
			} else {
				false
			}
		};

		if aborted {
			tracing::debug!(run = run.value(), "supersede.abort");
			(self.inner.notify)();
		} else {
			tracing::trace!(run = run.value(), "supersede.abort_noop");
		}
	}

	/// Runs `f` against the current snapshot without cloning it.
	///
	/// The snapshot is `None` strictly before the first start. `f` runs
	/// under the coordinator's internal lock; do not call back into the
	/// coordinator from inside it.
	pub fn with_snapshot<R>(&self, f: impl FnOnce(Option<&Snapshot<T, E>>) -> R) -> R {
		f(self.inner.state.lock().snapshot.as_ref())
	}

	/// Returns the registry status of `run`, or `None` once it has been
	/// superseded.
	pub fn status(&self, run: RunId) -> Option<RunStatus> {
		self.inner.state.lock().slot.status_of(run)
	}

	/// Returns the id of the run presently owning the slot.
	pub fn current_run(&self) -> Option<RunId> {
		self.inner.state.lock().slot.current()
	}
}

impl<T, E> Coordinator<T, E>
where
	T: Send + 'static,
	E: Send + 'static,
{
	/// Starts a new run, superseding the current one.
	///
	/// The previous owner is evicted and its signal fires before the
	/// new body executes; a `Running` snapshot for the new run replaces
	/// whatever was published. Starts never fire the notifier: the
	/// caller initiated the change, and stale settlements are discarded
	/// silently.
	///
	/// `body` is invoked once with the run's [`RunContext`]; the future
	/// it returns runs on the ambient tokio runtime, or on a shared
	/// fallback runtime when no ambient one exists. A panicking body is
	/// contained to its run task and logged; the snapshot keeps its
	/// last value.
	pub fn start<F, Fut>(&self, body: F) -> RunId
	where
		F: FnOnce(RunContext) -> Fut,
		Fut: Future<Output = RunResult<T, E>> + Send + 'static,
	{
		self.start_after(Duration::ZERO, body)
	}

	/// Starts a new run whose body is withheld for `delay`.
	///
	/// Supersession and snapshot behavior match [`start`](Self::start).
	/// The delay races the run's cancellation signal: a newer start or
	/// an abort inside the window discards the run without its body
	/// future ever being polled. A zero delay skips the race.
	pub fn start_after<F, Fut>(&self, delay: Duration, body: F) -> RunId
	where
		F: FnOnce(RunContext) -> Fut,
		Fut: Future<Output = RunResult<T, E>> + Send + 'static,
	{
		let id = self.inner.clock.next();
		let signal = CancellationToken::new();

		{
			let mut state = self.inner.state.lock();
			if let Some(evicted) = state.slot.claim(id, signal.clone()) {
				tracing::trace!(run = id.value(), evicted = evicted.value(), "supersede.evict");
			}
			state.snapshot = Some(Snapshot::Running { run: id });
		}
		tracing::trace!(run = id.value(), "supersede.start");

		let inner = Arc::downgrade(&self.inner);
		let probe: Weak<dyn CancelProbe> = inner.clone();
		let ctx = RunContext {
			probe,
			id,
			signal: signal.clone(),
		};
		let fut = body(ctx);

		let run = spawn::spawn(async move {
			if !delay.is_zero() {
				tokio::select! {
					_ = signal.cancelled() => return Err(CancelKind::Superseded.into()),
					_ = tokio::time::sleep(delay) => {}
				}
			}
			fut.await
		});

		spawn::spawn(async move {
			match run.await {
				Ok(outcome) => {
					if let Some(inner) = inner.upgrade() {
						inner.settle(id, outcome);
					}
				}
				Err(join) if join.is_panic() => {
					tracing::error!(run = id.value(), "supersede.body_panicked");
				}
				Err(_) => {
					tracing::debug!(run = id.value(), "supersede.body_lost");
				}
			}
		});

		id
	}
}

impl<T, E> Coordinator<T, E>
where
	T: Clone,
	E: Clone,
{
	/// Returns a clone of the current snapshot.
	///
	/// `None` strictly before the first start.
	pub fn snapshot(&self) -> Option<Snapshot<T, E>> {
		self.inner.state.lock().snapshot.clone()
	}
}

impl<T, E> Clone for Coordinator<T, E> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T, E> Default for Coordinator<T, E> {
	/// Coordinator with a no-op notifier, for poll-only consumers.
	fn default() -> Self {
		Self::new(|| {})
	}
}

impl<T, E> fmt::Debug for Coordinator<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Coordinator").finish_non_exhaustive()
	}
}
