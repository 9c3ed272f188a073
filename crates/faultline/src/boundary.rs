// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Async execution boundary isolating dispatch from the faulting call path.

use std::cell::Cell;
use std::sync::Arc;
use std::thread;

use faultline_core::FaultEvent;
use tracing::{debug, error};

use crate::client::Client;

thread_local! {
	static IN_DISPATCH: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is executing a dispatch unit.
///
/// Interceptors treat themselves as inactive when this is set, so a fault
/// raised while reporting can never re-enter the interceptor chain.
pub(crate) fn in_dispatch() -> bool {
	IN_DISPATCH.with(Cell::get)
}

/// Runs the full dispatch pipeline for one fault in its own detached thread.
///
/// Fire-and-forget: the caller never joins the unit and never observes the
/// outcome. The unit receives a private client snapshot, must not write back
/// into supervisor state, and exits as soon as dispatch completes.
pub(crate) fn submit(client: Arc<Client>, event: FaultEvent) {
	let spawned = thread::Builder::new()
		.name("faultline-dispatch".to_string())
		.spawn(move || {
			IN_DISPATCH.with(|flag| flag.set(true));
			let event_id = event.id;
			match client.notify(&event) {
				Ok(()) => debug!(event_id = %event_id, "dispatch unit finished"),
				Err(err) => error!(event_id = %event_id, error = %err, "dispatch unit failed"),
			}
		});
	if let Err(err) = spawned {
		error!(error = %err, "failed to spawn dispatch unit");
	}
}
