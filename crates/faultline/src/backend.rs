// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pluggable asynchronous dispatch backend.

use std::collections::HashMap;
use std::time::Duration;

use faultline_core::FaultEventId;

use crate::error::Result;

/// One report handed to the delayed backend for later delivery.
#[derive(Debug)]
pub struct DelayedNotification<'a> {
	pub event_id: FaultEventId,
	/// The serialized report.
	pub payload: &'a [u8],
	pub endpoint: &'a str,
	pub timeout: Duration,
	pub headers: &'a HashMap<String, String>,
	/// The fault's human message, unserialized.
	pub raw_message: &'a str,
}

/// Backend that accepts a report for later delivery instead of sending inline.
///
/// The contract is enqueue-only: `Ok(true)` means the handoff was accepted,
/// nothing more. `Ok(false)` and `Err(_)` both mean rejection; the dispatch
/// selector never falls back to a synchronous send in that case.
pub trait DispatchBackend: Send + Sync {
	fn create_delayed_notification(&self, notification: DelayedNotification<'_>) -> Result<bool>;
}
