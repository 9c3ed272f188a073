// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fault severity classification and reporting masks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Classification of a fault by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Debug,
	Notice,
	Warning,
	Error,
	Fatal,
}

impl Severity {
	/// Stable bit code used in severity masks and fingerprints.
	pub const fn code(self) -> u32 {
		match self {
			Self::Debug => 1,
			Self::Notice => 2,
			Self::Warning => 4,
			Self::Error => 8,
			Self::Fatal => 16,
		}
	}

	/// True for sub-error severities (warnings, notices, debug noise).
	pub const fn is_warning_or_below(self) -> bool {
		matches!(self, Self::Debug | Self::Notice | Self::Warning)
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Debug => write!(f, "debug"),
			Self::Notice => write!(f, "notice"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
			Self::Fatal => write!(f, "fatal"),
		}
	}
}

impl FromStr for Severity {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"debug" => Ok(Self::Debug),
			"notice" => Ok(Self::Notice),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			"fatal" => Ok(Self::Fatal),
			_ => Err(CoreError::InvalidSeverity(s.to_string())),
		}
	}
}

/// Bitmask restricting which fault classifications are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityMask(u32);

impl SeverityMask {
	/// Mask matching nothing.
	pub const NONE: Self = Self(0);
	/// Mask matching every severity.
	pub const ALL: Self = Self(
		Severity::Debug.code()
			| Severity::Notice.code()
			| Severity::Warning.code()
			| Severity::Error.code()
			| Severity::Fatal.code(),
	);

	/// Raw bit representation.
	pub const fn bits(self) -> u32 {
		self.0
	}

	/// Build a mask from raw bits; unknown bits are dropped.
	pub const fn from_bits(bits: u32) -> Self {
		Self(bits & Self::ALL.0)
	}

	pub const fn contains(self, severity: Severity) -> bool {
		self.0 & severity.code() != 0
	}

	#[must_use]
	pub const fn with(self, severity: Severity) -> Self {
		Self(self.0 | severity.code())
	}

	#[must_use]
	pub const fn without(self, severity: Severity) -> Self {
		Self(self.0 & !severity.code())
	}
}

impl Default for SeverityMask {
	fn default() -> Self {
		Self::ALL
	}
}

impl FromIterator<Severity> for SeverityMask {
	fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
		iter.into_iter().fold(Self::NONE, Self::with)
	}
}
