//! Host-wide registry of live session ids.
//!
//! The store is a newline-delimited file shared by every session. Writers take
//! the registry lock and replace the file atomically; readers always read the
//! file fresh, so the listing reflects other processes immediately (including
//! stale entries of crashed sessions until someone prunes them).

use std::path::{Path, PathBuf};

use cohort_protocol::SessionId;
use cohort_runtime::{FileLock, read_optional, write_atomic};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SessionRegistry {
	path: PathBuf,
	lock_path: PathBuf,
}

impl SessionRegistry {
	pub fn new(path: PathBuf, lock_path: PathBuf) -> Self {
		Self { path, lock_path }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Appends `id` unless it is already listed.
	pub fn register(&self, id: &SessionId) -> Result<()> {
		let _lock = FileLock::acquire(&self.lock_path)?;
		let mut ids = self.read_ids()?;
		if ids.contains(id) {
			debug!(target = "cohort.registry", %id, "already registered");
			return Ok(());
		}
		ids.push(id.clone());
		self.write_ids(&ids)?;
		debug!(target = "cohort.registry", %id, count = ids.len(), "registered");
		Ok(())
	}

	/// Removes every entry equal to `id`. Returns how many were removed.
	pub fn deregister(&self, id: &SessionId) -> Result<usize> {
		let _lock = FileLock::acquire(&self.lock_path)?;
		let ids = self.read_ids()?;
		let before = ids.len();
		let kept: Vec<SessionId> = ids.into_iter().filter(|entry| entry != id).collect();
		let removed = before - kept.len();
		if removed > 0 {
			self.write_ids(&kept)?;
		}
		debug!(target = "cohort.registry", %id, removed, "deregistered");
		Ok(removed)
	}

	/// Ids in store order, duplicates included.
	pub fn list(&self) -> Result<Vec<SessionId>> {
		self.read_ids()
	}

	/// Drops entries for which `keep` returns false. Returns the dropped ids.
	pub fn prune(&self, mut keep: impl FnMut(&SessionId) -> bool) -> Result<Vec<SessionId>> {
		let _lock = FileLock::acquire(&self.lock_path)?;
		let (kept, dropped): (Vec<SessionId>, Vec<SessionId>) = self.read_ids()?.into_iter().partition(|id| keep(id));
		if !dropped.is_empty() {
			self.write_ids(&kept)?;
		}
		Ok(dropped)
	}

	fn read_ids(&self) -> Result<Vec<SessionId>> {
		let Some(content) = read_optional(&self.path)? else {
			return Ok(Vec::new());
		};
		let mut ids = Vec::new();
		for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
			match SessionId::new(line) {
				Ok(id) => ids.push(id),
				Err(err) => warn!(target = "cohort.registry", error = %err, "skipping malformed registry line"),
			}
		}
		Ok(ids)
	}

	fn write_ids(&self, ids: &[SessionId]) -> Result<()> {
		let mut content = String::new();
		for id in ids {
			content.push_str(id.as_str());
			content.push('\n');
		}
		write_atomic(&self.path, content.as_bytes())?;
		Ok(())
	}
}

/// Collapses duplicate ids, keeping the first occurrence's position.
pub fn distinct(ids: Vec<SessionId>) -> Vec<SessionId> {
	let mut seen = std::collections::HashSet::new();
	ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
