// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire transport shipping serialized fault reports to the collector.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, SdkError};

/// User agent attached to outgoing reports.
fn user_agent() -> String {
	format!("faultline-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Transport carrying one serialized fault report to the remote collector.
///
/// Retry and backoff policy belongs to the implementation; the dispatch
/// selector never retries a send.
pub trait Transport: Send + Sync {
	/// Deliver one serialized report, blocking until the attempt completes.
	fn send(&self, payload: &[u8]) -> Result<()>;

	/// Headers this transport attaches by default, exposed so the delayed
	/// backend can reproduce them when it delivers later.
	fn default_headers(&self) -> HashMap<String, String>;
}

/// HTTP transport posting JSON reports over a blocking reqwest client.
pub struct HttpTransport {
	endpoint: String,
	headers: HashMap<String, String>,
	client: reqwest::blocking::Client,
}

impl HttpTransport {
	pub fn new(
		endpoint: impl Into<String>,
		timeout: Duration,
		headers: HashMap<String, String>,
	) -> Result<Self> {
		let client = reqwest::blocking::Client::builder()
			.user_agent(user_agent())
			.timeout(timeout)
			.build()?;
		Ok(Self {
			endpoint: endpoint.into(),
			headers,
			client,
		})
	}
}

impl Transport for HttpTransport {
	fn send(&self, payload: &[u8]) -> Result<()> {
		let mut request = self
			.client
			.post(&self.endpoint)
			.header("Content-Type", "application/json")
			.body(payload.to_vec());
		for (name, value) in &self.headers {
			request = request.header(name, value);
		}

		let response = request.send()?;
		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().unwrap_or_default();
			return Err(SdkError::Server { status, message });
		}
		Ok(())
	}

	fn default_headers(&self) -> HashMap<String, String> {
		let mut headers = self.headers.clone();
		headers.insert(
			"Content-Type".to_string(),
			"application/json".to_string(),
		);
		headers
	}
}
