// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and parsing for fault reports.

use std::backtrace::Backtrace;

use faultline_core::Frame;
use rustc_demangle::demangle;

/// Capture a fresh backtrace and parse it into frames, innermost first.
pub fn capture_frames() -> Vec<Frame> {
	let backtrace = Backtrace::force_capture();
	parse_backtrace(&backtrace)
}

/// Parse a Rust backtrace into frames.
pub fn parse_backtrace(backtrace: &Backtrace) -> Vec<Frame> {
	parse_backtrace_string(&format!("{:#}", backtrace))
}

/// Parse backtrace string output into frames.
///
/// Symbol lines produce frames; `at file:line:col` lines attach a location
/// to the frame they follow.
fn parse_backtrace_string(bt_string: &str) -> Vec<Frame> {
	let mut frames: Vec<Frame> = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(frame) = frames.last_mut() {
				let (file, lineno) = parse_location(location);
				frame.file = Some(file);
				frame.line = lineno;
			}
			continue;
		}

		if let Some(frame) = parse_symbol_line(line) {
			frames.push(frame);
		}
	}

	frames
}

/// Parse a `file:line:col` (or `file:line`, or bare `file`) location.
fn parse_location(location: &str) -> (String, Option<u32>) {
	let location = location.trim();
	let mut tail = location.rsplitn(3, ':');

	let last = tail.next().unwrap_or_default();
	let middle = tail.next();
	let head = tail.next();

	// file:line:col
	if let (Some(head), Some(middle)) = (head, middle) {
		if last.parse::<u32>().is_ok() {
			if let Ok(line) = middle.parse::<u32>() {
				return (head.to_string(), Some(line));
			}
		}
	}
	// file:line
	if let Some(middle) = middle {
		if let Ok(line) = last.parse::<u32>() {
			let file = match head {
				Some(head) => format!("{}:{}", head, middle),
				None => middle.to_string(),
			};
			return (file, Some(line));
		}
	}

	(location.to_string(), None)
}

/// Parse a single symbol line into a frame.
fn parse_symbol_line(line: &str) -> Option<Frame> {
	// Backtrace format is typically "N: symbol" or just "symbol".
	let symbol = match line.find(':') {
		Some(idx) if line[..idx].trim().parse::<u32>().is_ok() => line[idx + 1..].trim(),
		_ => line,
	};
	if symbol.is_empty() {
		return None;
	}

	let demangled = demangle(symbol).to_string();
	let in_app = is_in_app_frame(&demangled);

	Some(Frame {
		function: Some(demangled),
		file: None,
		line: None,
		in_app,
	})
}

/// Determine if a frame is user application code rather than runtime or
/// reporting machinery.
fn is_in_app_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"backtrace::",
		"<backtrace::",
		"panic_unwind::",
		"<panic_unwind::",
		"faultline::",
		"<faultline::",
		"faultline_core::",
		"<faultline_core::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
	];

	const SYSTEM_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::thread::",
		"::rt::",
		"::sys::",
		"::sys_common::",
	];

	for prefix in SYSTEM_PREFIXES {
		if function.starts_with(prefix) {
			return false;
		}
	}

	for contains in SYSTEM_CONTAINS {
		if function.contains(contains) {
			return false;
		}
	}

	true
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn in_app_excludes_runtime_and_reporting_frames() {
		assert!(!is_in_app_frame("std::panic::panic_any"));
		assert!(!is_in_app_frame("core::panicking::panic"));
		assert!(!is_in_app_frame("alloc::vec::Vec::push"));
		assert!(!is_in_app_frame("rust_begin_unwind"));
		assert!(!is_in_app_frame("faultline::boundary::submit"));
		assert!(!is_in_app_frame("faultline_core::fingerprint::fingerprint"));
	}

	#[test]
	fn in_app_includes_user_code() {
		assert!(is_in_app_frame("my_app::main"));
		assert!(is_in_app_frame("billing::invoice::finalize"));
	}

	#[test]
	fn symbol_line_with_index_prefix() {
		let frame = parse_symbol_line("  5: my_app::main").unwrap();
		assert_eq!(frame.function.as_deref(), Some("my_app::main"));
		assert!(frame.in_app);
	}

	#[test]
	fn at_line_attaches_location_to_previous_frame() {
		let frames = parse_backtrace_string(
			"   0: my_app::run\n             at src/main.rs:42:9\n   1: std::rt::lang_start\n",
		);
		assert_eq!(frames.len(), 2);
		assert_eq!(frames[0].function.as_deref(), Some("my_app::run"));
		assert_eq!(frames[0].file.as_deref(), Some("src/main.rs"));
		assert_eq!(frames[0].line, Some(42));
		assert!(!frames[1].in_app);
	}

	#[test]
	fn location_without_column_still_parses() {
		let (file, line) = parse_location("src/lib.rs:10");
		assert_eq!(file, "src/lib.rs");
		assert_eq!(line, Some(10));
	}

	#[test]
	fn location_without_line_keeps_the_whole_path() {
		let (file, line) = parse_location("/usr/src/libstd/panicking.rs");
		assert_eq!(file, "/usr/src/libstd/panicking.rs");
		assert_eq!(line, None);
	}

	#[test]
	fn capture_does_not_panic() {
		// Frame contents depend on compilation mode and debug info.
		let _frames = capture_frames();
	}
}
