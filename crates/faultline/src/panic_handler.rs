// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Uncaught-panic interceptor, chained with the previously installed hook.

use std::panic::PanicHookInfo;
use std::sync::Arc;

use faultline_core::{fingerprint, FaultEvent, Frame, Severity, SourceLocation};

use crate::backtrace::capture_frames;
use crate::boundary;
use crate::shutdown;
use crate::supervisor::{PanicHook, Supervisor};

/// A caught panic plus the flags the interceptor chain needs.
///
/// The flags travel alongside the payload in this wrapper instead of being
/// attached to it: `handled` marks "already handled, do not escalate", and
/// the overrides let a fault source supply its own report marker and type.
#[derive(Debug, Clone)]
pub struct CaughtPanic {
	/// Concrete type of the fault, matched against the silent-type list.
	pub type_name: String,
	pub message: String,
	pub location: Option<SourceLocation>,
	pub frames: Vec<Frame>,
	/// Set by the interceptor when the panic must not escalate further.
	pub handled: bool,
	/// Replaces the "Uncaught" marker in the report when set.
	pub prefix_override: Option<String>,
	/// Replaces `type_name` in the report when set.
	pub type_override: Option<String>,
}

impl CaughtPanic {
	pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			message: message.into(),
			location: None,
			frames: Vec::new(),
			handled: false,
			prefix_override: None,
			type_override: None,
		}
	}

	/// Builds a wrapper from a std panic-hook payload, capturing the current
	/// backtrace.
	pub fn from_hook_info(info: &PanicHookInfo<'_>) -> Self {
		let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
			(*s).to_string()
		} else if let Some(s) = info.payload().downcast_ref::<String>() {
			s.clone()
		} else {
			"Box<dyn Any>".to_string()
		};
		let location = info.location().map(|loc| SourceLocation {
			file: loc.file().to_string(),
			line: loc.line(),
		});

		Self {
			type_name: "panic".to_string(),
			message,
			location,
			frames: capture_frames(),
			handled: false,
			prefix_override: None,
			type_override: None,
		}
	}

	fn report_type(&self) -> &str {
		self.type_override.as_deref().unwrap_or(&self.type_name)
	}

	fn report_message(&self) -> String {
		let prefix = self.prefix_override.as_deref().unwrap_or("Uncaught");
		format!("{} {}: {}", prefix, self.report_type(), self.message)
	}
}

impl Supervisor {
	/// Intercepts an uncaught panic.
	///
	/// Panics whose concrete type is on the silent list are marked handled
	/// and not reported. Everything else is fingerprinted (so the shutdown
	/// interceptor will not re-report the same fault) and submitted through
	/// the execution boundary.
	pub fn handle_panic(&self, caught: &mut CaughtPanic) {
		let (file, line) = caught
			.location
			.as_ref()
			.map(|loc| (loc.file.as_str(), loc.line))
			.unwrap_or(("", 0));
		if let Ok(print) = fingerprint(Severity::Fatal, &caught.message, file, line) {
			self.record_fingerprint(print);
		}

		if self.config().silent_panic_types.contains(&caught.type_name) {
			caught.handled = true;
			return;
		}

		let mut builder = FaultEvent::builder(Severity::Fatal, caught.report_message())
			.frames(caught.frames.clone());
		if let Some(location) = &caught.location {
			builder = builder.location(&location.file, location.line);
		}
		boundary::submit(Arc::clone(self.reporting_client()), builder.build());
	}
}

/// Installs the process panic hook, chaining with `previous`.
///
/// The installed hook is a no-op (beyond delegating to `previous`) whenever
/// no supervisor is active or the panic happened inside a dispatch unit. In
/// seamless mode an unhandled panic tears the supervisor down without
/// restoring handlers, so the chained hook cannot re-enter this interceptor,
/// and then delegates to the previously captured hook; in non-seamless mode
/// the panic is absorbed with no default output.
pub(crate) fn install_hook(previous: PanicHook) {
	std::panic::set_hook(Box::new(move |info| {
		if boundary::in_dispatch() {
			previous(info);
			return;
		}
		let Some(supervisor) = Supervisor::instance() else {
			previous(info);
			return;
		};

		let mut caught = CaughtPanic::from_hook_info(info);
		shutdown::record_fatal_fault(Severity::Fatal, &caught.message, caught.location.clone());
		supervisor.handle_panic(&mut caught);

		if supervisor.config().handle_seamlessly && !caught.handled {
			Supervisor::reset(false);
			previous(info);
		}
	}));
}
