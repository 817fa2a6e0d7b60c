//! File helpers for shared runtime state.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

static TMP_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Replaces `path` with `contents` through a sibling temp file and a rename,
/// so concurrent readers see either the old or the new content.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
	let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
	std::fs::create_dir_all(parent)?;

	let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
	let tmp = parent.join(format!(
		".{file_name}.{}.{}.tmp",
		std::process::id(),
		TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
	));

	let result = (|| {
		let mut file = std::fs::File::create(&tmp)?;
		file.write_all(contents)?;
		file.sync_all()?;
		std::fs::rename(&tmp, path)
	})();

	if result.is_err() {
		let _ = std::fs::remove_file(&tmp);
	}
	result
}

/// Reads `path` as UTF-8, treating a missing file as `None`.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
	match std::fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err),
	}
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn write_atomic_replaces_and_leaves_no_temp_files() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("state").join("registry");

		write_atomic(&path, b"A\n").unwrap();
		write_atomic(&path, b"A\nB\n").unwrap();

		assert_eq!(std::fs::read_to_string(&path).unwrap(), "A\nB\n");
		let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap()).unwrap().collect();
		assert_eq!(entries.len(), 1);
	}

	#[test]
	fn read_optional_maps_missing_to_none() {
		let tmp = TempDir::new().unwrap();
		assert_eq!(read_optional(&tmp.path().join("absent")).unwrap(), None);

		let path = tmp.path().join("present");
		std::fs::write(&path, "x").unwrap();
		assert_eq!(read_optional(&path).unwrap().as_deref(), Some("x"));
	}
}
