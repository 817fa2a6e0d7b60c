use std::path::PathBuf;
use std::time::Duration;

use crate::channel::Channel;
use crate::config::{Config, RuntimeLayout};
use crate::output::OutputFormat;
use crate::session::{EndpointStore, SessionRegistry};

/// Effective settings for one CLI invocation: config file, environment and
/// flags merged in that order.
#[derive(Debug, Clone)]
pub struct CommandContext {
	pub config: Config,
	pub format: OutputFormat,
}

impl CommandContext {
	pub fn new(mut config: Config, runtime_dir: Option<PathBuf>, timeout_ms: Option<u64>, format: OutputFormat) -> Self {
		if let Some(dir) = runtime_dir {
			config.runtime_dir = dir;
		}
		if let Some(ms) = timeout_ms {
			config.rpc_timeout_ms = ms;
		}
		Self { config, format }
	}

	pub fn layout(&self) -> RuntimeLayout {
		self.config.layout()
	}

	pub fn registry(&self) -> SessionRegistry {
		let layout = self.layout();
		SessionRegistry::new(layout.registry(), layout.registry_lock())
	}

	pub fn endpoints(&self) -> EndpointStore {
		EndpointStore::new(self.layout().endpoints_dir())
	}

	/// Channel whose per-call bound is `rpc_timeout * factor`.
	pub fn channel_scaled(&self, factor: u32) -> Channel {
		let timeout: Duration = self.config.rpc_timeout() * factor.max(1);
		Channel::new(self.endpoints(), timeout)
	}

	pub fn channel(&self) -> Channel {
		self.channel_scaled(1)
	}
}
