//! User configuration and the runtime directory layout.
//!
//! Configuration lives in `~/.config/cohort/config.json` (or
//! `$XDG_CONFIG_HOME/cohort/config.json`). A missing or unreadable file yields
//! defaults; `COHORT_RUNTIME_DIR` and CLI flags override it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cohort_protocol::SessionId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding the runtime directory.
pub const RUNTIME_DIR_ENV: &str = "COHORT_RUNTIME_DIR";

const DEFAULT_RPC_TIMEOUT_MS: u64 = 2000;
const DEFAULT_SESSION_PREFIX: &str = "COHORT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
	/// Directory shared by every session on the host.
	pub runtime_dir: PathBuf,
	/// Upper bound for a single inter-session call.
	pub rpc_timeout_ms: u64,
	/// Terminal command prefix used to open new frames.
	pub terminal: Vec<String>,
	/// Name prefix for sessions started without an explicit id.
	pub session_prefix: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			runtime_dir: default_runtime_dir(),
			rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
			terminal: vec!["xterm".to_string(), "-e".to_string()],
			session_prefix: DEFAULT_SESSION_PREFIX.to_string(),
		}
	}
}

impl Config {
	/// Loads the user config, then applies the environment override.
	pub fn load() -> Self {
		let mut config = config_path().map(|path| Self::load_from(&path)).unwrap_or_default();
		if let Some(dir) = std::env::var_os(RUNTIME_DIR_ENV).filter(|v| !v.is_empty()) {
			config.runtime_dir = PathBuf::from(dir);
		}
		config
	}

	/// Reads a config file, falling back to defaults when absent or invalid.
	pub fn load_from(path: &Path) -> Self {
		match std::fs::read_to_string(path) {
			Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
				debug!(target = "cohort.config", path = %path.display(), error = %err, "ignoring unparsable config");
				Self::default()
			}),
			Err(_) => Self::default(),
		}
	}

	/// Config rooted at `runtime_dir` with every other field defaulted.
	pub fn with_runtime_dir(runtime_dir: impl Into<PathBuf>) -> Self {
		Self {
			runtime_dir: runtime_dir.into(),
			..Self::default()
		}
	}

	pub fn rpc_timeout(&self) -> Duration {
		Duration::from_millis(self.rpc_timeout_ms.max(1))
	}

	pub fn layout(&self) -> RuntimeLayout {
		RuntimeLayout::new(&self.runtime_dir)
	}
}

/// Every path sessions share, derived from the runtime directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
	root: PathBuf,
}

impl RuntimeLayout {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn registry(&self) -> PathBuf {
		self.root.join("registry")
	}

	pub fn registry_lock(&self) -> PathBuf {
		self.root.join("registry.lock")
	}

	pub fn history_slot(&self) -> PathBuf {
		self.root.join("history")
	}

	pub fn history_lock(&self) -> PathBuf {
		self.root.join("history.lock")
	}

	pub fn endpoints_dir(&self) -> PathBuf {
		self.root.join("sessions")
	}

	pub fn sockets_dir(&self) -> PathBuf {
		self.root.join("sockets")
	}

	pub fn socket(&self, id: &SessionId) -> PathBuf {
		self.sockets_dir().join(format!("{id}.sock"))
	}

	pub fn views_dir(&self) -> PathBuf {
		self.root.join("views")
	}
}

fn config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("cohort").join("config.json"))
}

fn default_runtime_dir() -> PathBuf {
	if let Some(dir) = dirs::runtime_dir() {
		return dir.join("cohort");
	}
	#[cfg(unix)]
	{
		// SAFETY: getuid has no preconditions and cannot fail.
		let uid = unsafe { libc::getuid() };
		std::env::temp_dir().join(format!("cohort-{uid}"))
	}
	#[cfg(not(unix))]
	{
		std::env::temp_dir().join("cohort")
	}
}
