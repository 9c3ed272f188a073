// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: intercept and report runtime faults with the faultline SDK.
//!
//! Run with:
//!   FAULTLINE_ENDPOINT=https://collector.example.com/api/faults \
//!     cargo run --example capture -p faultline

use faultline::{Config, DiagnosticContext, Severity, Supervisor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let endpoint = std::env::var("FAULTLINE_ENDPOINT")
		.expect("FAULTLINE_ENDPOINT environment variable required");

	println!("Starting fault supervisor...");
	println!("  Endpoint: {}", endpoint);

	let config = Config::builder()
		.endpoint(&endpoint)
		.default_header("X-Environment", "development")
		.silent_panic_type("BrokenPipe")
		.memory_headroom("40M")
		.build()?;
	let supervisor = Supervisor::start(config)?;

	// Announce each synchronously dispatched report.
	if let Some(client) = Supervisor::client() {
		client.register_event_callback(|event_id| {
			println!("  dispatched fault event {}", event_id);
		});
	}

	// Report a live diagnostic explicitly.
	println!("\nReporting a live warning...");
	supervisor.handle_error(
		Severity::Warning,
		"disk usage above 90%",
		file!(),
		line!(),
		&DiagnosticContext::default(),
	);

	// Uncaught panics are intercepted automatically while the supervisor is
	// active; this one is reported and then propagates to the default hook.
	println!("\nTriggering a panic...");
	let result = std::panic::catch_unwind(|| {
		panic!("example fault from the faultline SDK");
	});
	println!("  panic observed by caller: {}", result.is_err());

	// Give the fire-and-forget dispatch units a moment before exiting.
	std::thread::sleep(std::time::Duration::from_secs(1));

	Supervisor::reset(true);
	println!("\nSupervisor reset complete.");

	Ok(())
}
