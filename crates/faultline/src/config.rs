// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration and validation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use faultline_core::{Severity, SeverityMask};
use thiserror::Error;

use crate::backend::DispatchBackend;
use crate::error::SdkError;
use crate::memory::parse_byte_size;

/// Default HTTP request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default extra memory granted to the shutdown interceptor so an
/// out-of-memory fault can still be assembled and reported.
pub(crate) const DEFAULT_MEMORY_HEADROOM: u64 = 40 * 1024 * 1024;

/// Hook invoked when the asynchronous backend rejects a dispatch.
pub type DispatchFailureHook = Arc<dyn Fn(&SdkError) + Send + Sync>;

/// Configuration errors, surfaced at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("API endpoint is required")]
	MissingEndpoint,

	#[error("invalid API endpoint: {0}")]
	InvalidEndpoint(String),

	#[error("invalid byte size: {0}")]
	InvalidByteSize(String),
}

/// Validated configuration for the reporting client and the interceptors.
#[derive(Clone)]
pub struct Config {
	/// Collector endpoint reports are posted to.
	pub endpoint: String,
	/// In seamless mode a reported fault still propagates to the runtime's
	/// default or previous handling; otherwise it is fully absorbed.
	pub handle_seamlessly: bool,
	/// Which fault classifications are reported at all.
	pub severity_mask: SeverityMask,
	/// When false, sub-error severities are skipped even if the mask
	/// includes them.
	pub report_warnings: bool,
	/// Panic types marked as handled without being reported.
	pub silent_panic_types: HashSet<String>,
	/// Extra headers attached to every report.
	pub default_headers: HashMap<String, String>,
	/// Timeout for the blocking transport send.
	pub request_timeout: Duration,
	/// Timeout handed to the delayed backend alongside each notification.
	pub delayed_timeout: Duration,
	/// Memory headroom granted before reporting at shutdown, in bytes.
	pub shutdown_memory_headroom: u64,
	pub(crate) delayed_backend: Option<Arc<dyn DispatchBackend>>,
	pub(crate) on_dispatch_failure: Option<DispatchFailureHook>,
}

impl Config {
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::new()
	}

	/// Whether faults of this severity should be reported.
	pub fn reports(&self, severity: Severity) -> bool {
		if !self.severity_mask.contains(severity) {
			return false;
		}
		self.report_warnings || !severity.is_warning_or_below()
	}

	pub fn has_delayed_backend(&self) -> bool {
		self.delayed_backend.is_some()
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("endpoint", &self.endpoint)
			.field("handle_seamlessly", &self.handle_seamlessly)
			.field("severity_mask", &self.severity_mask)
			.field("report_warnings", &self.report_warnings)
			.field("silent_panic_types", &self.silent_panic_types)
			.field("request_timeout", &self.request_timeout)
			.field("delayed_timeout", &self.delayed_timeout)
			.field("shutdown_memory_headroom", &self.shutdown_memory_headroom)
			.field("delayed_backend", &self.delayed_backend.is_some())
			.field("on_dispatch_failure", &self.on_dispatch_failure.is_some())
			.finish()
	}
}

/// Builder for [`Config`]; validation happens in [`ConfigBuilder::build`].
pub struct ConfigBuilder {
	endpoint: Option<String>,
	handle_seamlessly: bool,
	severity_mask: SeverityMask,
	report_warnings: bool,
	silent_panic_types: HashSet<String>,
	default_headers: HashMap<String, String>,
	request_timeout: Duration,
	delayed_timeout: Duration,
	memory_headroom: Option<String>,
	delayed_backend: Option<Arc<dyn DispatchBackend>>,
	on_dispatch_failure: Option<DispatchFailureHook>,
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			endpoint: None,
			handle_seamlessly: true,
			severity_mask: SeverityMask::ALL,
			report_warnings: true,
			silent_panic_types: HashSet::new(),
			default_headers: HashMap::new(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			delayed_timeout: DEFAULT_REQUEST_TIMEOUT,
			memory_headroom: None,
			delayed_backend: None,
			on_dispatch_failure: None,
		}
	}

	/// Sets the collector endpoint reports are posted to.
	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self
	}

	/// Enables or disables seamless mode (default: enabled).
	pub fn handle_seamlessly(mut self, seamless: bool) -> Self {
		self.handle_seamlessly = seamless;
		self
	}

	/// Restricts which fault classifications are reported.
	pub fn severity_mask(mut self, mask: SeverityMask) -> Self {
		self.severity_mask = mask;
		self
	}

	/// Enables or disables reporting of sub-error severities (default: enabled).
	pub fn report_warnings(mut self, report: bool) -> Self {
		self.report_warnings = report;
		self
	}

	/// Adds a panic type that is marked handled without being reported.
	pub fn silent_panic_type(mut self, type_name: impl Into<String>) -> Self {
		self.silent_panic_types.insert(type_name.into());
		self
	}

	/// Adds a header attached to every report.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name.into(), value.into());
		self
	}

	/// Sets the blocking transport timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Sets the timeout handed to the delayed backend.
	pub fn delayed_timeout(mut self, timeout: Duration) -> Self {
		self.delayed_timeout = timeout;
		self
	}

	/// Sets the asynchronous dispatch backend. When configured, reports are
	/// enqueued instead of sent inline.
	pub fn delayed_backend(mut self, backend: Arc<dyn DispatchBackend>) -> Self {
		self.delayed_backend = Some(backend);
		self
	}

	/// Sets the shutdown memory headroom as a human-readable byte size
	/// (`"40M"`, `"1G"`; suffixes are powers of 1024).
	pub fn memory_headroom(mut self, size: impl Into<String>) -> Self {
		self.memory_headroom = Some(size.into());
		self
	}

	/// Sets the hook surfacing delayed-dispatch failures to the upper layer.
	pub fn on_dispatch_failure<F>(mut self, hook: F) -> Self
	where
		F: Fn(&SdkError) + Send + Sync + 'static,
	{
		self.on_dispatch_failure = Some(Arc::new(hook));
		self
	}

	/// Validates and builds the configuration.
	pub fn build(self) -> Result<Config, ConfigError> {
		let endpoint = self.endpoint.ok_or(ConfigError::MissingEndpoint)?;
		if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
			return Err(ConfigError::InvalidEndpoint(endpoint));
		}
		let endpoint = endpoint.trim_end_matches('/').to_string();

		let shutdown_memory_headroom = match self.memory_headroom {
			Some(size) => parse_byte_size(&size)?,
			None => DEFAULT_MEMORY_HEADROOM,
		};

		Ok(Config {
			endpoint,
			handle_seamlessly: self.handle_seamlessly,
			severity_mask: self.severity_mask,
			report_warnings: self.report_warnings,
			silent_panic_types: self.silent_panic_types,
			default_headers: self.default_headers,
			request_timeout: self.request_timeout,
			delayed_timeout: self.delayed_timeout,
			shutdown_memory_headroom,
			delayed_backend: self.delayed_backend,
			on_dispatch_failure: self.on_dispatch_failure,
		})
	}
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}
