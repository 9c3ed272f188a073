// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide handler supervisor owning interceptor installation.

use std::collections::HashSet;
use std::panic::PanicHookInfo;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use faultline_core::Fingerprint;
use tracing::info;

use crate::client::Client;
use crate::config::Config;
use crate::error::Result;
use crate::{panic_handler, shutdown};

/// A captured panic hook, kept so `reset(true)` can reinstall it and the
/// panic interceptor can chain into it.
pub type PanicHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync>;

static INSTANCE: Mutex<Option<Arc<Supervisor>>> = Mutex::new(None);

/// Process-wide singleton owning the reporting client, the chained panic
/// hook and the set of fingerprints already handled in this process.
///
/// At most one supervisor is active per process; installation and teardown
/// are serialized on a process-wide lock.
pub struct Supervisor {
	client: Arc<Client>,
	previous_hook: PanicHook,
	handled: Mutex<HashSet<Fingerprint>>,
}

impl Supervisor {
	/// Installs the interceptors and activates the supervisor.
	///
	/// Idempotent: when an instance is already active it is returned
	/// untouched and nothing is re-installed. Otherwise this builds the
	/// reporting client from `config`, captures the previously installed
	/// panic hook for chaining, installs the panic interceptor and registers
	/// the shutdown interceptor. The live-error interceptor has no
	/// installation step; the host's runtime integration calls
	/// [`Supervisor::handle_error`] directly for every severity.
	pub fn start(config: Config) -> Result<Arc<Supervisor>> {
		let (supervisor, previous_hook) = {
			let mut slot = lock(&INSTANCE);
			if let Some(existing) = slot.as_ref() {
				return Ok(Arc::clone(existing));
			}

			let client = Arc::new(Client::new(config)?);
			let previous_hook: PanicHook = Arc::from(std::panic::take_hook());
			let supervisor = Arc::new(Supervisor {
				client,
				previous_hook: Arc::clone(&previous_hook),
				handled: Mutex::new(HashSet::new()),
			});
			*slot = Some(Arc::clone(&supervisor));
			(supervisor, previous_hook)
		};

		// The installed hook re-acquires the instance lock, so hook
		// installation and logging must run with the guard released: a panic
		// raised here has to be able to unwind through the hook.
		panic_handler::install_hook(previous_hook);
		shutdown::install_process_hook();
		info!("fault handler supervisor started");
		Ok(supervisor)
	}

	/// Deactivates the supervisor.
	///
	/// With `restore_handlers` the panic hook captured before `start` is
	/// reinstalled. The singleton is always cleared, regardless of the flag,
	/// so subsequent interceptor firings become no-ops.
	pub fn reset(restore_handlers: bool) {
		// Take the slot and drop the guard before touching hooks or logging;
		// the installed hook locks the same slot.
		let removed = lock(&INSTANCE).take();
		if let Some(supervisor) = removed {
			if restore_handlers {
				let previous = Arc::clone(&supervisor.previous_hook);
				std::panic::set_hook(Box::new(move |info| previous(info)));
			}
			info!(restored = restore_handlers, "fault handler supervisor reset");
		}
	}

	/// The active supervisor, if any.
	pub fn instance() -> Option<Arc<Supervisor>> {
		lock(&INSTANCE).clone()
	}

	/// The active reporting client, if any.
	pub fn client() -> Option<Arc<Client>> {
		Self::instance().map(|supervisor| Arc::clone(&supervisor.client))
	}

	/// The panic hook that was installed before `start`, while a supervisor
	/// is active.
	pub fn previous_panic_hook() -> Option<PanicHook> {
		Self::instance().map(|supervisor| Arc::clone(&supervisor.previous_hook))
	}

	/// Atomically consume the active instance, leaving the singleton empty.
	pub(crate) fn take_instance() -> Option<Arc<Supervisor>> {
		lock(&INSTANCE).take()
	}

	pub(crate) fn reporting_client(&self) -> &Arc<Client> {
		&self.client
	}

	pub(crate) fn config(&self) -> &Config {
		self.client.config()
	}

	/// Records a fingerprint as handled in this process.
	pub(crate) fn record_fingerprint(&self, fingerprint: Fingerprint) {
		lock(&self.handled).insert(fingerprint);
	}

	pub(crate) fn already_handled(&self, fingerprint: &Fingerprint) -> bool {
		lock(&self.handled).contains(fingerprint)
	}

	#[cfg(test)]
	pub(crate) fn handled_len(&self) -> usize {
		lock(&self.handled).len()
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
