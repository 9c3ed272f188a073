// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reporting client: dispatch selection and event callbacks.

use std::sync::{Arc, Mutex, PoisonError};

use faultline_core::{FaultEvent, FaultEventId};
use tracing::{debug, info};

use crate::backend::DelayedNotification;
use crate::config::Config;
use crate::error::{Result, SdkError};
use crate::transport::{HttpTransport, Transport};

/// Listener invoked with the event identifier after a synchronous dispatch
/// completes.
pub type EventCallback = Box<dyn Fn(&FaultEventId) + Send + Sync>;

/// Client shipping fault events to the remote collector.
pub struct Client {
	config: Config,
	transport: Arc<dyn Transport>,
	event_callbacks: Mutex<Vec<EventCallback>>,
}

impl Client {
	/// Builds a client with the HTTP transport derived from `config`.
	pub fn new(config: Config) -> Result<Self> {
		let transport = HttpTransport::new(
			config.endpoint.clone(),
			config.request_timeout,
			config.default_headers.clone(),
		)?;
		info!(endpoint = %config.endpoint, "fault reporting client initialized");
		Ok(Self::with_transport(config, Arc::new(transport)))
	}

	/// Builds a client over a caller-supplied transport.
	pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
		Self {
			config,
			transport,
			event_callbacks: Mutex::new(Vec::new()),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Registers a listener for synchronously dispatched events.
	///
	/// Callbacks are kept in registration order for the life of the client
	/// and are never removed individually. They must return quickly and must
	/// not panic; failures here are the caller's responsibility.
	pub fn register_event_callback<F>(&self, callback: F)
	where
		F: Fn(&FaultEventId) + Send + Sync + 'static,
	{
		self.event_callbacks
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(Box::new(callback));
	}

	/// Dispatches one fault event.
	///
	/// With a delayed backend configured the serialized report is handed off
	/// to it; a rejected handoff is surfaced to the configured
	/// dispatch-failure hook exactly once and is never retried synchronously,
	/// and event callbacks do not fire on this path. Without a backend the
	/// transport send blocks the caller; on success every registered event
	/// callback fires once, in registration order, with the event identifier.
	pub fn notify(&self, event: &FaultEvent) -> Result<()> {
		let payload = serde_json::to_vec(event)?;

		if let Some(backend) = &self.config.delayed_backend {
			let mut headers = self.transport.default_headers();
			headers.extend(self.config.default_headers.clone());

			let notification = DelayedNotification {
				event_id: event.id,
				payload: &payload,
				endpoint: &self.config.endpoint,
				timeout: self.config.delayed_timeout,
				headers: &headers,
				raw_message: &event.message,
			};

			let rejection = match backend.create_delayed_notification(notification) {
				Ok(true) => None,
				Ok(false) => Some(SdkError::Backend(
					"backend refused the notification".to_string(),
				)),
				Err(err) => Some(err),
			};

			match rejection {
				Some(err) => {
					debug!(event_id = %event.id, error = %err, "delayed dispatch rejected");
					if let Some(hook) = &self.config.on_dispatch_failure {
						hook(&err);
					}
				}
				None => debug!(event_id = %event.id, "fault event enqueued"),
			}
			return Ok(());
		}

		debug!(event_id = %event.id, endpoint = %self.config.endpoint, "sending fault event");
		self.transport.send(&payload)?;

		let callbacks = self
			.event_callbacks
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		for callback in callbacks.iter() {
			callback(&event.id);
		}
		Ok(())
	}
}
