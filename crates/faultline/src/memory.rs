// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Byte-size parsing and memory-ceiling adjustment for the shutdown path.

use crate::config::ConfigError;

/// Parse a human-readable byte size.
///
/// Suffixes `K`/`M`/`G`/`T` (case-insensitive) are powers of 1024; a bare
/// number is taken as bytes.
pub fn parse_byte_size(input: &str) -> Result<u64, ConfigError> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(ConfigError::InvalidByteSize(input.to_string()));
	}

	let (digits, shift) = match trimmed.as_bytes()[trimmed.len() - 1].to_ascii_uppercase() {
		b'K' => (&trimmed[..trimmed.len() - 1], 10u32),
		b'M' => (&trimmed[..trimmed.len() - 1], 20),
		b'G' => (&trimmed[..trimmed.len() - 1], 30),
		b'T' => (&trimmed[..trimmed.len() - 1], 40),
		_ => (trimmed, 0),
	};

	let value: u64 = digits
		.trim()
		.parse()
		.map_err(|_| ConfigError::InvalidByteSize(input.to_string()))?;

	value
		.checked_mul(1u64 << shift)
		.ok_or_else(|| ConfigError::InvalidByteSize(input.to_string()))
}

/// Raise the process address-space ceiling by `headroom` bytes so an
/// out-of-memory fault can still be assembled and reported. If the raise is
/// refused, fall back to lifting the ceiling entirely. Returns whether a
/// usable ceiling is in place afterwards.
#[cfg(unix)]
pub(crate) fn raise_memory_ceiling(headroom: u64) -> bool {
	unsafe {
		let mut limit = libc::rlimit {
			rlim_cur: 0,
			rlim_max: 0,
		};
		if libc::getrlimit(libc::RLIMIT_AS, &mut limit) != 0 {
			return lift_memory_ceiling();
		}
		if limit.rlim_cur == libc::RLIM_INFINITY {
			return true;
		}

		let raised = limit.rlim_cur.saturating_add(headroom as libc::rlim_t);
		let ceiling = if limit.rlim_max == libc::RLIM_INFINITY {
			raised
		} else {
			raised.min(limit.rlim_max)
		};
		let request = libc::rlimit {
			rlim_cur: ceiling,
			rlim_max: limit.rlim_max,
		};
		if libc::setrlimit(libc::RLIMIT_AS, &request) == 0 {
			true
		} else {
			lift_memory_ceiling()
		}
	}
}

#[cfg(unix)]
fn lift_memory_ceiling() -> bool {
	let unlimited = libc::rlimit {
		rlim_cur: libc::RLIM_INFINITY,
		rlim_max: libc::RLIM_INFINITY,
	};
	unsafe { libc::setrlimit(libc::RLIMIT_AS, &unlimited) == 0 }
}

#[cfg(not(unix))]
pub(crate) fn raise_memory_ceiling(_headroom: u64) -> bool {
	true
}
