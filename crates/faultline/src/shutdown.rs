// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shutdown interceptor: last-chance reporting of the final fatal fault.

use std::sync::{Arc, Mutex, PoisonError};

use faultline_core::{fingerprint, FaultEvent, Severity, SourceLocation};
use tracing::debug;

use crate::boundary;
use crate::config::DEFAULT_MEMORY_HEADROOM;
use crate::memory;
use crate::supervisor::Supervisor;

/// The most recent fatal fault observed in this process, consumed exactly
/// once at shutdown.
#[derive(Debug, Clone)]
struct FatalRecord {
	severity: Severity,
	message: String,
	location: Option<SourceLocation>,
}

static LAST_FATAL: Mutex<Option<FatalRecord>> = Mutex::new(None);

/// Records a fatal fault for the shutdown interceptor to pick up.
///
/// Only the last record survives; a later fatal fault overwrites an earlier
/// one, matching "the process dies of its final fault".
pub fn record_fatal_fault(severity: Severity, message: &str, location: Option<SourceLocation>) {
	*lock() = Some(FatalRecord {
		severity,
		message: message.to_string(),
		location,
	});
}

#[cfg(test)]
pub(crate) fn clear_fatal_fault() {
	*lock() = None;
}

fn lock() -> std::sync::MutexGuard<'static, Option<FatalRecord>> {
	LAST_FATAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers the shutdown interceptor with the process exit path.
///
/// Registration happens once per process even across supervisor restarts;
/// the trampoline is a no-op while no supervisor is active.
#[cfg(unix)]
pub(crate) fn install_process_hook() {
	use std::sync::Once;

	static REGISTER: Once = Once::new();
	REGISTER.call_once(|| {
		extern "C" fn shutdown_trampoline() {
			Supervisor::handle_shutdown();
		}
		unsafe {
			libc::atexit(shutdown_trampoline);
		}
	});
}

#[cfg(not(unix))]
pub(crate) fn install_process_hook() {}

impl Supervisor {
	/// Runs the shutdown interceptor.
	///
	/// Grants the configured memory headroom first, so reporting still works
	/// when the process is dying of memory exhaustion. Consumes the active
	/// supervisor, then the recorded fatal fault; a fault whose fingerprint
	/// was already handled by a live interceptor is not re-reported.
	pub fn handle_shutdown() {
		let headroom = Self::instance()
			.map(|supervisor| supervisor.config().shutdown_memory_headroom)
			.unwrap_or(DEFAULT_MEMORY_HEADROOM);
		memory::raise_memory_ceiling(headroom);

		let Some(supervisor) = Self::take_instance() else {
			return;
		};
		let Some(record) = lock().take() else {
			return;
		};

		if !supervisor.config().reports(record.severity) {
			return;
		}

		let (file, line) = record
			.location
			.as_ref()
			.map(|loc| (loc.file.as_str(), loc.line))
			.unwrap_or(("", 0));
		if let Ok(print) = fingerprint(record.severity, &record.message, file, line) {
			if supervisor.already_handled(&print) {
				debug!(fingerprint = %print, "fatal fault already reported, skipping");
				return;
			}
		}

		let mut builder = FaultEvent::builder(record.severity, record.message);
		if let Some(location) = &record.location {
			builder = builder.location(&location.file, location.line);
		}
		boundary::submit(Arc::clone(supervisor.reporting_client()), builder.build());
	}
}
