// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fault interception and crash reporting SDK.
//!
//! Intercepts unhandled runtime faults (live diagnostics, uncaught panics and
//! fatal terminations), suppresses duplicate reports of the same underlying
//! fault, and ships structured reports to a remote collector without blocking
//! or crashing the host process.
//!
//! The process-wide [`Supervisor`] owns interceptor installation: starting it
//! chains with any previously installed panic hook and registers a shutdown
//! interceptor, while the live-error interceptor is invoked explicitly by the
//! host's runtime integration. Every report travels through a fire-and-forget
//! dispatch unit, so a fault raised while reporting can never re-enter the
//! interceptor chain.
//!
//! # Example
//!
//! ```ignore
//! use faultline::{Config, Supervisor};
//!
//! let config = Config::builder()
//!     .endpoint("https://collector.example.com/api/faults")
//!     .build()?;
//! let supervisor = Supervisor::start(config)?;
//!
//! // Uncaught panics and fatal terminations are now reported automatically.
//! // Live diagnostics go through the supervisor explicitly:
//! supervisor.handle_error(
//!     faultline::Severity::Warning,
//!     "disk usage above 90%",
//!     file!(),
//!     line!(),
//!     &faultline::DiagnosticContext::default(),
//! );
//! ```

pub mod backend;
pub mod backtrace;
mod boundary;
pub mod client;
pub mod config;
pub mod error;
pub mod error_handler;
mod memory;
pub mod panic_handler;
pub mod shutdown;
pub mod supervisor;
pub mod transport;

pub use backend::{DelayedNotification, DispatchBackend};
pub use backtrace::capture_frames;
pub use client::{Client, EventCallback};
pub use config::{Config, ConfigBuilder, ConfigError};
pub use error::{Result, SdkError};
pub use error_handler::DiagnosticContext;
pub use memory::parse_byte_size;
pub use panic_handler::CaughtPanic;
pub use shutdown::record_fatal_fault;
pub use supervisor::{PanicHook, Supervisor};
pub use transport::{HttpTransport, Transport};

pub use faultline_core::{
	fingerprint, FaultEvent, FaultEventBuilder, FaultEventId, Fingerprint, FingerprintError,
	Frame, Severity, SeverityMask, SourceLocation,
};
