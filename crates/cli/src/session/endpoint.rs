//! Per-session endpoint descriptors.
//!
//! A descriptor tells peers where a session listens and which process owns
//! it. The channel reads it before every call, so a session whose process is
//! gone is reported unreachable without touching its socket.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use cohort_protocol::SessionId;
use cohort_runtime::{pid_is_alive, read_optional, write_atomic};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const ENDPOINT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndpoint {
	pub schema_version: u32,
	pub id: SessionId,
	pub pid: u32,
	pub socket: PathBuf,
	pub started_at: u64,
}

impl SessionEndpoint {
	/// Descriptor for the current process.
	pub fn current(id: SessionId, socket: PathBuf) -> Self {
		Self {
			schema_version: ENDPOINT_SCHEMA_VERSION,
			id,
			pid: std::process::id(),
			socket,
			started_at: now_ts(),
		}
	}

	pub fn is_alive(&self) -> bool {
		pid_is_alive(self.pid)
	}
}

/// Directory of endpoint descriptors, one `<id>.json` per session.
#[derive(Debug, Clone)]
pub struct EndpointStore {
	dir: PathBuf,
}

impl EndpointStore {
	pub fn new(dir: PathBuf) -> Self {
		Self { dir }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn path_for(&self, id: &SessionId) -> PathBuf {
		self.dir.join(format!("{id}.json"))
	}

	pub fn load(&self, id: &SessionId) -> Result<Option<SessionEndpoint>> {
		let Some(content) = read_optional(&self.path_for(id))? else {
			return Ok(None);
		};
		Ok(Some(serde_json::from_str(&content)?))
	}

	pub fn save(&self, endpoint: &SessionEndpoint) -> Result<()> {
		let json = serde_json::to_string_pretty(endpoint)?;
		write_atomic(&self.path_for(&endpoint.id), json.as_bytes())?;
		Ok(())
	}

	/// Removes the descriptor if present.
	pub fn clear(&self, id: &SessionId) -> Result<bool> {
		match std::fs::remove_file(self.path_for(id)) {
			Ok(()) => Ok(true),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(err) => Err(err.into()),
		}
	}

	/// Whether `id` has a descriptor whose process is still running.
	pub fn is_live(&self, id: &SessionId) -> bool {
		matches!(self.load(id), Ok(Some(endpoint)) if endpoint.is_alive())
	}
}

pub(crate) fn now_ts() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn save_load_clear_round_trip() {
		let tmp = TempDir::new().unwrap();
		let store = EndpointStore::new(tmp.path().join("sessions"));
		let id = SessionId::new("COHORT").unwrap();
		let endpoint = SessionEndpoint::current(id.clone(), tmp.path().join("COHORT.sock"));

		store.save(&endpoint).unwrap();
		assert_eq!(store.load(&id).unwrap(), Some(endpoint));
		assert!(store.is_live(&id));

		assert!(store.clear(&id).unwrap());
		assert!(!store.clear(&id).unwrap());
		assert_eq!(store.load(&id).unwrap(), None);
		assert!(!store.is_live(&id));
	}

	#[test]
	fn dead_pid_is_not_live() {
		let tmp = TempDir::new().unwrap();
		let store = EndpointStore::new(tmp.path().to_path_buf());
		let id = SessionId::new("GONE").unwrap();
		let mut endpoint = SessionEndpoint::current(id.clone(), tmp.path().join("GONE.sock"));
		endpoint.pid = 0;
		store.save(&endpoint).unwrap();
		assert!(!store.is_live(&id));
	}
}
