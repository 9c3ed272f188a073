// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured fault events shipped to the remote collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::fingerprint::{fingerprint, Fingerprint, FingerprintError};
use crate::severity::Severity;

/// Unique identifier of a dispatched fault event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaultEventId(pub Uuid);

impl FaultEventId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for FaultEventId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for FaultEventId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for FaultEventId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// A single call-stack frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub function: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line: Option<u32>,
	#[serde(default)]
	pub in_app: bool,
}

/// Source location a fault was raised from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
	pub file: String,
	pub line: u32,
}

/// A structured fault report.
///
/// Built by an interceptor from raw runtime fault data, immutable once built
/// and consumed once by the dispatch selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultEvent {
	pub id: FaultEventId,
	pub severity: Severity,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<SourceLocation>,
	#[serde(default)]
	pub frames: Vec<Frame>,
	#[serde(default)]
	pub tags: HashMap<String, String>,
	#[serde(default)]
	pub extra: serde_json::Value,
	pub timestamp: DateTime<Utc>,
}

impl FaultEvent {
	pub fn builder(severity: Severity, message: impl Into<String>) -> FaultEventBuilder {
		FaultEventBuilder {
			severity,
			message: message.into(),
			location: None,
			frames: Vec::new(),
			tags: HashMap::new(),
			extra: serde_json::Value::Object(serde_json::Map::new()),
		}
	}

	/// Fingerprint of this event under the dedup rule.
	pub fn fingerprint(&self) -> std::result::Result<Fingerprint, FingerprintError> {
		let (file, line) = self
			.location
			.as_ref()
			.map(|loc| (loc.file.as_str(), loc.line))
			.unwrap_or(("", 0));
		fingerprint(self.severity, &self.message, file, line)
	}
}

/// Builder for [`FaultEvent`].
#[derive(Debug)]
pub struct FaultEventBuilder {
	severity: Severity,
	message: String,
	location: Option<SourceLocation>,
	frames: Vec<Frame>,
	tags: HashMap<String, String>,
	extra: serde_json::Value,
}

impl FaultEventBuilder {
	pub fn location(mut self, file: impl Into<String>, line: u32) -> Self {
		self.location = Some(SourceLocation {
			file: file.into(),
			line,
		});
		self
	}

	pub fn frame(mut self, frame: Frame) -> Self {
		self.frames.push(frame);
		self
	}

	pub fn frames(mut self, frames: Vec<Frame>) -> Self {
		self.frames = frames;
		self
	}

	pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tags.insert(key.into(), value.into());
		self
	}

	pub fn extra(mut self, extra: serde_json::Value) -> Self {
		self.extra = extra;
		self
	}

	pub fn build(self) -> FaultEvent {
		FaultEvent {
			id: FaultEventId::new(),
			severity: self.severity,
			message: self.message,
			location: self.location,
			frames: self.frames,
			tags: self.tags,
			extra: self.extra,
			timestamp: Utc::now(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn event_id_roundtrip(uuid_bytes in any::<[u8; 16]>()) {
			let id = FaultEventId(Uuid::from_bytes(uuid_bytes));
			let s = id.to_string();
			let parsed: FaultEventId = s.parse().unwrap();
			prop_assert_eq!(id, parsed);
		}
	}

	#[test]
	fn builder_assembles_event() {
		let event = FaultEvent::builder(Severity::Error, "connection refused")
			.location("src/db.rs", 42)
			.frame(Frame {
				function: Some("db::connect".to_string()),
				in_app: true,
				..Default::default()
			})
			.tag("subsystem", "db")
			.build();

		assert_eq!(event.severity, Severity::Error);
		assert_eq!(event.message, "connection refused");
		assert_eq!(
			event.location,
			Some(SourceLocation {
				file: "src/db.rs".to_string(),
				line: 42,
			})
		);
		assert_eq!(event.frames.len(), 1);
		assert_eq!(event.tags.get("subsystem").map(String::as_str), Some("db"));
	}

	#[test]
	fn distinct_events_get_distinct_ids() {
		let a = FaultEvent::builder(Severity::Error, "x").build();
		let b = FaultEvent::builder(Severity::Error, "x").build();
		assert_ne!(a.id, b.id);
	}

	#[test]
	fn event_serializes_to_report_format() {
		let event = FaultEvent::builder(Severity::Fatal, "out of memory")
			.location("alloc.rs", 7)
			.build();

		let value = serde_json::to_value(&event).unwrap();
		assert_eq!(value["severity"], "fatal");
		assert_eq!(value["message"], "out of memory");
		assert_eq!(value["location"]["line"], 7);
	}

	#[test]
	fn event_fingerprint_uses_location() {
		let located = FaultEvent::builder(Severity::Error, "boom")
			.location("a.rs", 1)
			.build();
		let elsewhere = FaultEvent::builder(Severity::Error, "boom")
			.location("b.rs", 1)
			.build();
		assert_ne!(
			located.fingerprint().unwrap(),
			elsewhere.fingerprint().unwrap()
		);
	}
}
