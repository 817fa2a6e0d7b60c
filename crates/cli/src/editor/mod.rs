//! The editor a session augments.
//!
//! Editing, rendering and file I/O belong to the host editor; cohort only
//! drives it through the opaque operations of [`Editor`]. [`MemoryEditor`] is
//! an in-process model of that editor used by `cohort serve` and the tests.

mod memory;

use std::path::Path;
use std::sync::Arc;

use cohort_protocol::{BufferInfo, HistoryTable, ViewSnapshot};
use parking_lot::Mutex;

pub use memory::MemoryEditor;

use crate::error::Result;

/// Shared handle to a session's editor. Never hold the lock across `.await`.
pub type EditorHandle = Arc<Mutex<dyn Editor + Send>>;

/// Wraps an editor into a shareable handle.
pub fn handle<E: Editor + Send + 'static>(editor: E) -> EditorHandle {
	Arc::new(Mutex::new(editor))
}

/// Where an opened buffer is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
	/// Replace the current window's buffer.
	#[default]
	Edit,
	/// New window to the side of the current one.
	VSplit,
	/// New window above the current one.
	Split,
}

impl Placement {
	pub fn verb(self) -> &'static str {
		match self {
			Placement::Edit => "edit",
			Placement::VSplit => "vsplit",
			Placement::Split => "split",
		}
	}
}

/// Opaque operations of the host editor.
pub trait Editor {
	/// Every buffer, ordered by buffer number.
	fn buffers(&self) -> Vec<BufferInfo>;

	fn buffer_for_path(&self, path: &Path) -> Option<BufferInfo> {
		self.buffers().into_iter().find(|b| b.path == path)
	}

	fn buffer_by_number(&self, number: u32) -> Option<BufferInfo> {
		self.buffers().into_iter().find(|b| b.number == number)
	}

	/// The editor's own rendering of its buffer list.
	fn render_buffer_list(&self) -> String;

	fn bell_enabled(&self) -> bool;

	fn set_bell_enabled(&mut self, enabled: bool);

	/// Moves to a window showing `path`. Returns false when none shows it.
	fn focus_window(&mut self, path: &Path) -> bool;

	/// Loads `path` into the current window without messages or prompts.
	fn open_hidden(&mut self, path: &Path) -> Result<()>;

	/// Cursor/fold/scroll state of the buffer holding `path`.
	fn capture_view(&self, path: &Path) -> Option<ViewSnapshot>;

	/// Deletes the buffer holding `path`, closing its windows.
	fn close_buffer(&mut self, path: &Path) -> Result<()>;

	/// Shows `path`, reusing an existing buffer or creating a new one.
	fn open(&mut self, path: &Path, placement: Placement) -> Result<BufferInfo>;

	/// Restores a captured view onto the buffer of `snapshot.path`.
	fn apply_view(&mut self, snapshot: &ViewSnapshot) -> Result<()>;

	/// Appends an entry to a history table.
	fn record_history(&mut self, table: HistoryTable, entry: &str);

	/// The editor's rendering of the `table` entry at `index` (negative counts
	/// back from the newest entry), header line included.
	fn render_history(&self, table: HistoryTable, index: i64) -> Option<String>;

	/// Runs `text` as if typed at `table`'s prompt.
	fn execute(&mut self, table: HistoryTable, text: &str) -> Result<()>;

	fn set_register(&mut self, register: char, text: &str) -> Result<()>;

	fn feed_keys(&mut self, keys: &str);
}
