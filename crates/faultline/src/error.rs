// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the fault-reporting SDK.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur in the fault-reporting SDK.
#[derive(Debug, Error)]
pub enum SdkError {
	/// Invalid setup; fatal to client creation.
	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),

	/// The asynchronous backend rejected the handoff or failed. Surfaced only
	/// to the configured dispatch-failure hook, never re-thrown.
	#[error("dispatch backend rejected the notification: {0}")]
	Backend(String),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// The collector returned an error status.
	#[error("collector error (status {status}): {message}")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Error message from the collector.
		message: String,
	},

	/// Failed to serialize a fault event.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
