//! The externally visible result slot.

use crate::registry::RunId;

/// Snapshot of the current run, the only state consumers observe.
///
/// One snapshot exists per coordinator and it always describes the
/// present run, never history: a start replaces it with `Running` for
/// the new run, settlement replaces it with `Completed` or `Failed`,
/// abort replaces it with `Aborted`. Before the first start there is no
/// snapshot at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot<T, E> {
	/// The current run is in flight.
	Running {
		/// Identity of the in-flight run, usable with
		/// [`Coordinator::request_abort`](crate::Coordinator::request_abort).
		run: RunId,
	},
	/// The current run produced a value.
	Completed(T),
	/// The current run failed with the body's own error, unmodified.
	Failed(E),
	/// The current run was aborted by request.
	Aborted,
}

impl<T, E> Snapshot<T, E> {
	/// Returns true while the current run is in flight.
	pub const fn is_running(&self) -> bool {
		matches!(self, Self::Running { .. })
	}

	/// Returns true when the current run was aborted by request.
	pub const fn is_aborted(&self) -> bool {
		matches!(self, Self::Aborted)
	}

	/// Returns the in-flight run's id, if running.
	pub const fn run(&self) -> Option<RunId> {
		match self {
			Self::Running { run } => Some(*run),
			_ => None,
		}
	}

	/// Returns the completed value, if any.
	pub const fn value(&self) -> Option<&T> {
		match self {
			Self::Completed(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the failure value, if any.
	pub const fn error(&self) -> Option<&E> {
		match self {
			Self::Failed(error) => Some(error),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accessors_match_variants() {
		let running: Snapshot<u32, &str> = Snapshot::Running {
			run: crate::registry::GenerationClock::default().next(),
		};
		assert!(running.is_running());
		assert!(running.run().is_some());
		assert_eq!(running.value(), None);

		let completed: Snapshot<u32, &str> = Snapshot::Completed(7);
		assert_eq!(completed.value(), Some(&7));
		assert!(!completed.is_running());

		let failed: Snapshot<u32, &str> = Snapshot::Failed("boom");
		assert_eq!(failed.error(), Some(&"boom"));

		let aborted: Snapshot<u32, &str> = Snapshot::Aborted;
		assert!(aborted.is_aborted());
		assert_eq!(aborted.run(), None);
	}
}
