// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the faultline fault-reporting system.
//!
//! This crate provides the shared plain types consumed by the SDK crate
//! (`faultline`) and by collector-side code:
//! - Structured fault events with severity, source location and call frames
//! - Severity classification and the masks used to filter reporting
//! - The fingerprint engine used to suppress duplicate reports of the same
//!   underlying fault within one process lifetime

pub mod error;
pub mod event;
pub mod fingerprint;
pub mod severity;

pub use error::{CoreError, Result};
pub use event::{FaultEvent, FaultEventBuilder, FaultEventId, Frame, SourceLocation};
pub use fingerprint::{fingerprint, Fingerprint, FingerprintError};
pub use severity::{Severity, SeverityMask};
