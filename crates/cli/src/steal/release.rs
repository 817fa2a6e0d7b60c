use std::path::{Path, PathBuf};

use cohort_protocol::{RemoteErrorCode, SessionResponse};
use cohort_runtime::write_atomic;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::editor::Editor;
use crate::error::{CohortError, Result};

/// Owner side of a steal: snapshots the buffer's view and closes it.
///
/// Runs entirely under the caller's editor lock, so a concurrent edit or a
/// second requester cannot interleave with the checks below. The bell is
/// silenced for the duration and restored on every path.
pub(crate) fn release<E: Editor + ?Sized>(editor: &mut E, path: &Path, views_dir: &Path) -> SessionResponse {
	let Some(buffer) = editor.buffer_for_path(path) else {
		return refuse(RemoteErrorCode::NotFound, format!("no buffer for {}", path.display()));
	};
	if buffer.modified {
		return refuse(RemoteErrorCode::Modified, format!("{} has unsaved changes", path.display()));
	}
	if editor.buffers().len() == 1 {
		return refuse(RemoteErrorCode::SoleBuffer, format!("{} is the only open buffer", path.display()));
	}

	let bell = editor.bell_enabled();
	editor.set_bell_enabled(false);
	let result = hand_over(editor, path, views_dir);
	editor.set_bell_enabled(bell);

	match result {
		Ok(snapshot) => {
			debug!(target = "cohort.steal", path = %path.display(), snapshot = %snapshot.display(), "released buffer");
			SessionResponse::Released { snapshot }
		}
		Err(err) => {
			warn!(target = "cohort.steal", path = %path.display(), error = %err, "release failed");
			refuse(RemoteErrorCode::Internal, err.to_string())
		}
	}
}

fn hand_over<E: Editor + ?Sized>(editor: &mut E, path: &Path, views_dir: &Path) -> Result<PathBuf> {
	if !editor.focus_window(path) {
		editor.open_hidden(path)?;
	}
	let view = editor
		.capture_view(path)
		.ok_or_else(|| CohortError::Editor(format!("cannot capture view of {}", path.display())))?;

	let snapshot = views_dir.join(format!("{}.json", Uuid::new_v4()));
	write_atomic(&snapshot, &serde_json::to_vec(&view)?)?;
	if let Err(err) = editor.close_buffer(path) {
		let _ = std::fs::remove_file(&snapshot);
		return Err(err);
	}
	Ok(snapshot)
}

fn refuse(code: RemoteErrorCode, message: String) -> SessionResponse {
	SessionResponse::Error { code, message }
}
