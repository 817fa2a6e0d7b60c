//! Advisory exclusive locks guarding read-modify-write of shared files.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

/// Exclusive advisory lock on a lock file, released on drop.
///
/// The lock file itself carries no data; it only serializes writers of a
/// sibling file across processes.
#[derive(Debug)]
pub struct FileLock {
	file: File,
	path: PathBuf,
}

impl FileLock {
	/// Blocks until the exclusive lock on `path` is held, creating the file
	/// and its parent directory when missing.
	pub fn acquire(path: &Path) -> io::Result<Self> {
		let file = open_lock_file(path)?;
		flock(&file, libc::LOCK_EX)?;
		trace!(target = "cohort.lock", path = %path.display(), "lock acquired");
		Ok(Self {
			file,
			path: path.to_path_buf(),
		})
	}

	/// Takes the lock without waiting. `Ok(None)` means another holder has it.
	pub fn try_acquire(path: &Path) -> io::Result<Option<Self>> {
		let file = open_lock_file(path)?;
		match flock(&file, libc::LOCK_EX | libc::LOCK_NB) {
			Ok(()) => Ok(Some(Self {
				file,
				path: path.to_path_buf(),
			})),
			Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
			Err(err) => Err(err),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Drop for FileLock {
	fn drop(&mut self) {
		let _ = flock(&self.file, libc::LOCK_UN);
		trace!(target = "cohort.lock", path = %self.path.display(), "lock released");
	}
}

fn open_lock_file(path: &Path) -> io::Result<File> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	OpenOptions::new().read(true).write(true).create(true).truncate(false).open(path)
}

#[cfg(unix)]
fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
	use std::os::unix::io::AsRawFd;

	loop {
		// SAFETY: `file` is open for the duration of the call, so the descriptor is valid.
		let rc = unsafe { libc::flock(file.as_raw_fd(), operation) };
		if rc == 0 {
			return Ok(());
		}
		let err = io::Error::last_os_error();
		if err.kind() != io::ErrorKind::Interrupted {
			return Err(err);
		}
	}
}

#[cfg(not(unix))]
fn flock(_file: &File, _operation: i32) -> io::Result<()> {
	Ok(())
}
