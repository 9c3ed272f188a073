// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types shared across the fault-reporting system.

use thiserror::Error;

/// Errors that can occur while working with core fault types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid severity: {0}")]
	InvalidSeverity(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for core fault operations.
pub type Result<T> = std::result::Result<T, CoreError>;
