//! Single-slot run registry: identities, statuses, and the ownership
//! gate every compound transition goes through.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::CancelKind;

/// Opaque identity of one coordinated run.
///
/// Minted by the coordinator on every start; never reused within a
/// coordinator's lifetime. Compare it, hash it, or hand it back to
/// [`Coordinator::request_abort`](crate::Coordinator::request_abort);
/// the numeric value underneath is not part of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl RunId {
	pub(crate) const fn value(self) -> u64 {
		self.0
	}
}

/// Registry status of a run that still owns the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
	/// In flight; the only state settlement or abort can leave.
	Running,
	/// Settled with a value.
	Completed,
	/// Settled with the body's own failure.
	Failed,
	/// Abort was requested while running.
	Aborted,
}

impl RunStatus {
	/// Returns true once no further transition can occur for the run.
	pub const fn is_terminal(self) -> bool {
		!matches!(self, Self::Running)
	}
}

/// Monotonic clock minting run identities.
#[derive(Debug, Default)]
pub(crate) struct GenerationClock {
	next: AtomicU64,
}

impl GenerationClock {
	pub fn next(&self) -> RunId {
		RunId(self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}
}

#[derive(Debug)]
struct OwnerEntry {
	id: RunId,
	status: RunStatus,
	signal: CancellationToken,
}

/// At-most-one ownership slot.
///
/// Absence of an entry for a run means it was superseded. Claiming
/// replaces the entry wholesale; aborting marks the entry in place so a
/// tardy checkpoint still observes `Aborted` rather than a bare miss.
#[derive(Debug, Default)]
pub(crate) struct OwnerSlot {
	owner: Option<OwnerEntry>,
}

impl OwnerSlot {
	/// Claims the slot for `id`, evicting the previous owner.
	///
	/// The evicted run's signal fires before this returns. Returns the
	/// evicted run's id, if the slot was occupied.
	pub fn claim(&mut self, id: RunId, signal: CancellationToken) -> Option<RunId> {
		let evicted = self.owner.replace(OwnerEntry {
			id,
			status: RunStatus::Running,
			signal,
		});
		evicted.map(|old| {
			old.signal.cancel();
			old.id
		})
	}

	/// Returns the owning run's id, if any.
	pub fn current(&self) -> Option<RunId> {
		self.owner.as_ref().map(|entry| entry.id)
	}

	/// Returns the status recorded for `id`, or `None` once superseded.
	pub fn status_of(&self, id: RunId) -> Option<RunStatus> {
		self.owner
			.as_ref()
			.filter(|entry| entry.id == id)
			.map(|entry| entry.status)
	}

	/// Cancellation probe for checkpoints issued by run `id`.
	pub fn probe(&self, id: RunId) -> Result<(), CancelKind> {
		match self.status_of(id) {
			None => Err(CancelKind::Superseded),
			Some(RunStatus::Aborted) => Err(CancelKind::Aborted),
			Some(_) => Ok(()),
		}
	}

	/// Marks the owning run aborted in place and fires its signal.
	///
	/// Applies only while `id` owns the slot with status `Running`;
	/// returns whether the mark was applied. The entry is kept.
	pub fn mark_aborted(&mut self, id: RunId) -> bool {
		match self.owner.as_mut() {
			Some(entry) if entry.id == id && entry.status == RunStatus::Running => {
				entry.status = RunStatus::Aborted;
				entry.signal.cancel();
				true
			}
			_ => false,
		}
	}

	/// Records a terminal settlement status for the owning run.
	///
	/// Applies only while `id` owns the slot with status `Running`;
	/// returns whether the status was recorded.
	pub fn settle(&mut self, id: RunId, status: RunStatus) -> bool {
		match self.owner.as_mut() {
			Some(entry) if entry.id == id && entry.status == RunStatus::Running => {
				entry.status = status;
				true
			}
			_ => false,
		}
	}

	/// Fires the owning run's signal without touching its status.
	pub fn cancel_current(&self) {
		if let Some(entry) = &self.owner {
			entry.signal.cancel();
		}
	}
}
