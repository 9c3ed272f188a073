// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Live error interceptor for non-fatal runtime diagnostics.

use std::sync::Arc;

use faultline_core::{fingerprint, FaultEvent, Frame, Severity};

use crate::boundary;
use crate::supervisor::Supervisor;

/// Call-site context supplied by the host's runtime integration.
///
/// `suppressed` mirrors an explicit "silence errors" operator being in effect
/// at the fault site, passed explicitly rather than queried from ambient
/// state. `frames` is the caller-captured stack, innermost first.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticContext {
	pub suppressed: bool,
	pub frames: Vec<Frame>,
}

impl Supervisor {
	/// Intercepts a live runtime diagnostic.
	///
	/// The returned flag tells the runtime whether to continue its own
	/// default handling: `true` in seamless mode, `false` when the fault is
	/// fully absorbed here. The fingerprint is recorded before any filtering
	/// so the shutdown interceptor can suppress a re-observation of the same
	/// fault, even when this call itself does not report.
	pub fn handle_error(
		&self,
		severity: Severity,
		message: &str,
		file: &str,
		line: u32,
		context: &DiagnosticContext,
	) -> bool {
		if boundary::in_dispatch() {
			return true;
		}

		if let Ok(print) = fingerprint(severity, message, file, line) {
			self.record_fingerprint(print);
		}

		if context.suppressed {
			return true;
		}

		let propagate = self.config().handle_seamlessly;

		if !self.config().reports(severity) {
			return propagate;
		}

		let has_location = !file.is_empty() && line > 0;
		let mut frames = Vec::with_capacity(context.frames.len() + 1);
		if has_location {
			// The fault site itself is frame zero, ahead of the caller stack.
			frames.push(Frame {
				function: None,
				file: Some(file.to_string()),
				line: Some(line),
				in_app: true,
			});
		}
		frames.extend(context.frames.iter().cloned());

		let mut builder = FaultEvent::builder(severity, message).frames(frames);
		if has_location {
			builder = builder.location(file, line);
		}
		boundary::submit(Arc::clone(self.reporting_client()), builder.build());

		propagate
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::sync::{mpsc, Mutex};
	use std::time::Duration;

	use faultline_core::SeverityMask;

	use crate::config::Config;
	use crate::error::Result as SdkResult;
	use crate::supervisor::test_support;
	use crate::transport::Transport;

	fn config() -> crate::config::ConfigBuilder {
		Config::builder().endpoint("https://collector.example.com")
	}

	#[test]
	fn reports_and_propagates_in_seamless_mode() {
		let (transport, receiver) = test_support::ChannelTransport::pair();
		let supervisor = test_support::detached(transport, config().build().unwrap());

		let propagate = supervisor.handle_error(
			Severity::Error,
			"division by zero",
			"src/math.rs",
			10,
			&DiagnosticContext::default(),
		);

		assert!(propagate);
		let event = test_support::recv_event(&receiver);
		assert_eq!(event.severity, Severity::Error);
		assert_eq!(event.message, "division by zero");
		assert_eq!(event.location.as_ref().unwrap().line, 10);
	}

	#[test]
	fn absorbs_in_non_seamless_mode() {
		let (transport, receiver) = test_support::ChannelTransport::pair();
		let supervisor = test_support::detached(
			transport,
			config().handle_seamlessly(false).build().unwrap(),
		);

		let propagate = supervisor.handle_error(
			Severity::Error,
			"boom",
			"src/lib.rs",
			1,
			&DiagnosticContext::default(),
		);

		assert!(!propagate);
		let _ = test_support::recv_event(&receiver);
	}

	#[test]
	fn suppressed_context_short_circuits_but_still_fingerprints() {
		let (transport, receiver) = test_support::ChannelTransport::pair();
		let supervisor = test_support::detached(transport, config().build().unwrap());

		let propagate = supervisor.handle_error(
			Severity::Error,
			"silenced",
			"src/lib.rs",
			5,
			&DiagnosticContext {
				suppressed: true,
				frames: Vec::new(),
			},
		);

		assert!(propagate);
		test_support::assert_no_event(&receiver);

		let print = fingerprint(Severity::Error, "silenced", "src/lib.rs", 5).unwrap();
		assert!(supervisor.already_handled(&print));
	}

	#[test]
	fn severity_outside_mask_is_skipped() {
		let (transport, receiver) = test_support::ChannelTransport::pair();
		let supervisor = test_support::detached(
			transport,
			config()
				.severity_mask(SeverityMask::NONE.with(Severity::Fatal))
				.build()
				.unwrap(),
		);

		let propagate = supervisor.handle_error(
			Severity::Warning,
			"ignored",
			"src/lib.rs",
			2,
			&DiagnosticContext::default(),
		);

		assert!(propagate);
		test_support::assert_no_event(&receiver);
	}

	#[test]
	fn fault_site_becomes_frame_zero() {
		let (transport, receiver) = test_support::ChannelTransport::pair();
		let supervisor = test_support::detached(transport, config().build().unwrap());

		let caller_frames = vec![Frame {
			function: Some("app::run".to_string()),
			in_app: true,
			..Default::default()
		}];
		supervisor.handle_error(
			Severity::Error,
			"boom",
			"src/handler.rs",
			33,
			&DiagnosticContext {
				suppressed: false,
				frames: caller_frames,
			},
		);

		let event = test_support::recv_event(&receiver);
		assert_eq!(event.frames.len(), 2);
		assert_eq!(event.frames[0].file.as_deref(), Some("src/handler.rs"));
		assert_eq!(event.frames[0].line, Some(33));
		assert_eq!(event.frames[1].function.as_deref(), Some("app::run"));
	}

	#[test]
	fn unfingerprintable_fault_is_still_reported() {
		let (transport, receiver) = test_support::ChannelTransport::pair();
		let supervisor = test_support::detached(transport, config().build().unwrap());

		// Empty message and no usable location: dedup is skipped, reporting is not.
		let propagate =
			supervisor.handle_error(Severity::Error, "", "", 0, &DiagnosticContext::default());

		assert!(propagate);
		let event = test_support::recv_event(&receiver);
		assert!(event.message.is_empty());
		assert!(event.location.is_none());
		// A fault with no identity leaves the handled set untouched.
		assert_eq!(supervisor.handled_len(), 0);
	}

	struct ReentrantTransport {
		supervisor: Mutex<Option<Arc<Supervisor>>>,
		sender: Mutex<mpsc::Sender<(FaultEvent, bool)>>,
	}

	impl Transport for ReentrantTransport {
		fn send(&self, payload: &[u8]) -> SdkResult<()> {
			let event: FaultEvent = serde_json::from_slice(payload)?;
			let supervisor = self.supervisor.lock().unwrap().clone().unwrap();
			// A diagnostic raised while dispatching must not spawn a unit.
			let propagate = supervisor.handle_error(
				Severity::Error,
				"raised while dispatching",
				"src/report.rs",
				3,
				&DiagnosticContext::default(),
			);
			let _ = self.sender.lock().unwrap().send((event, propagate));
			Ok(())
		}

		fn default_headers(&self) -> HashMap<String, String> {
			HashMap::new()
		}
	}

	#[test]
	fn handle_error_is_inert_inside_a_dispatch_unit() {
		let (sender, receiver) = mpsc::channel();
		let transport = Arc::new(ReentrantTransport {
			supervisor: Mutex::new(None),
			sender: Mutex::new(sender),
		});
		let supervisor = test_support::detached(transport.clone(), config().build().unwrap());
		*transport.supervisor.lock().unwrap() = Some(Arc::clone(&supervisor));

		supervisor.handle_error(
			Severity::Error,
			"first",
			"src/lib.rs",
			1,
			&DiagnosticContext::default(),
		);

		let (event, propagate) = receiver
			.recv_timeout(Duration::from_secs(5))
			.expect("dispatch unit never ran");
		assert_eq!(event.message, "first");
		assert!(propagate);

		// The reentrant call neither dispatched nor fingerprinted.
		assert!(receiver.recv_timeout(Duration::from_millis(200)).is_err());
		let print = fingerprint(Severity::Error, "raised while dispatching", "src/report.rs", 3)
			.unwrap();
		assert!(!supervisor.already_handled(&print));
	}
}
