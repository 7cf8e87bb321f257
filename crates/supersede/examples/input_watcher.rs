#![allow(unused_crate_dependencies)]

//! Debounced latest-wins lookups driven by changing input, the classic
//! "results for what the user typed last" shape.

use std::time::Duration;

use supersede::{Coordinator, Snapshot};
use tokio::time::sleep;

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.init();

	let coordinator: Coordinator<String, String> = Coordinator::new(|| {
		println!("snapshot changed; a real consumer would re-read it here");
	});

	// Each keystroke supersedes the pending lookup; only the last one
	// outlives its delay window.
	for input in ["rust", "rustc", "rust async"] {
		let query = input.to_string();
		coordinator.start_after(Duration::from_millis(80), move |ctx| async move {
			ctx.checkpoint().await?;
			sleep(Duration::from_millis(120)).await;
			ctx.checkpoint().await?;
			Ok(format!("results for `{query}`"))
		});
		sleep(Duration::from_millis(40)).await;
	}

	sleep(Duration::from_millis(400)).await;
	match coordinator.snapshot() {
		Some(Snapshot::Completed(results)) => println!("{results}"),
		other => println!("unexpected terminal state: {other:?}"),
	}
}
