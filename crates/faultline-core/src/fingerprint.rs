// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fingerprinting for suppressing duplicate reports of the same fault.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::severity::Severity;

/// Stable identity of a fault, derived from its classification, message and
/// source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Raised when a fault carries too little data to identify.
///
/// Callers swallow this and proceed without dedup for the fault in question.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FingerprintError {
	#[error("fault carries neither a message nor a valid source location")]
	InsufficientData,
}

/// Compute the fingerprint for a fault.
///
/// A fault is fingerprintable when `message` is non-empty or when `file` is
/// non-empty and `line` is positive. The digest is a SHA-256 hash over the
/// severity code, the message (if contributing) and the file:line pair (if
/// contributing), separated so equal tuples always hash identically.
pub fn fingerprint(
	severity: Severity,
	message: &str,
	file: &str,
	line: u32,
) -> Result<Fingerprint, FingerprintError> {
	let has_message = !message.is_empty();
	let has_location = !file.is_empty() && line > 0;

	if !has_message && !has_location {
		return Err(FingerprintError::InsufficientData);
	}

	let mut hasher = Sha256::new();
	hasher.update(severity.code().to_string().as_bytes());
	hasher.update(b"|");
	if has_message {
		hasher.update(message.as_bytes());
	}
	hasher.update(b"|");
	if has_location {
		hasher.update(file.as_bytes());
		hasher.update(b":");
		hasher.update(line.to_string().as_bytes());
	}

	Ok(Fingerprint(hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn equal_inputs_equal_digest() {
		let a = fingerprint(Severity::Error, "division by zero", "src/math.rs", 10).unwrap();
		let b = fingerprint(Severity::Error, "division by zero", "src/math.rs", 10).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn digest_is_hex_sha256() {
		let print = fingerprint(Severity::Error, "boom", "", 0).unwrap();
		assert_eq!(print.as_str().len(), 64);
		assert!(print.as_str().chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn message_only_is_valid() {
		assert!(fingerprint(Severity::Warning, "deprecated call", "", 0).is_ok());
	}

	#[test]
	fn location_only_is_valid() {
		assert!(fingerprint(Severity::Fatal, "", "src/main.rs", 3).is_ok());
	}

	#[test]
	fn missing_message_and_location_is_rejected() {
		assert_eq!(
			fingerprint(Severity::Error, "", "", 0),
			Err(FingerprintError::InsufficientData)
		);
	}

	#[test]
	fn zero_line_does_not_make_a_location() {
		assert_eq!(
			fingerprint(Severity::Error, "", "src/main.rs", 0),
			Err(FingerprintError::InsufficientData)
		);
	}

	#[test]
	fn empty_file_does_not_make_a_location() {
		assert_eq!(
			fingerprint(Severity::Error, "", "", 12),
			Err(FingerprintError::InsufficientData)
		);
	}

	#[test]
	fn different_message_different_digest() {
		let a = fingerprint(Severity::Error, "boom", "f.rs", 1).unwrap();
		let b = fingerprint(Severity::Error, "bang", "f.rs", 1).unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn different_location_different_digest() {
		let a = fingerprint(Severity::Error, "boom", "f.rs", 1).unwrap();
		let b = fingerprint(Severity::Error, "boom", "f.rs", 2).unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn different_severity_different_digest() {
		let a = fingerprint(Severity::Error, "boom", "f.rs", 1).unwrap();
		let b = fingerprint(Severity::Warning, "boom", "f.rs", 1).unwrap();
		assert_ne!(a, b);
	}

	proptest! {
		#[test]
		fn deterministic_for_valid_inputs(message in "[a-z]{1,32}", file in "[a-z/]{0,16}", line in 0u32..10_000) {
			let a = fingerprint(Severity::Error, &message, &file, line).unwrap();
			let b = fingerprint(Severity::Error, &message, &file, line).unwrap();
			prop_assert_eq!(a, b);
		}

		#[test]
		fn message_change_diverges(m1 in "[a-z]{1,32}", m2 in "[a-z]{1,32}") {
			prop_assume!(m1 != m2);
			let a = fingerprint(Severity::Error, &m1, "f.rs", 1).unwrap();
			let b = fingerprint(Severity::Error, &m2, "f.rs", 1).unwrap();
			prop_assert_ne!(a, b);
		}
	}
}
