//! History hand-off between sessions through a single shared slot.
//!
//! `push` copies the editor's rendering of one history entry into the slot;
//! `pop` reads it back (leaving it in place), strips the rendering down to the
//! entry text and runs it at the matching prompt. Command lines the session
//! understands itself (`edit`, `ls`, ...) run through the session command
//! layer; everything else goes to the editor.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cohort_protocol::HistoryTable;
use cohort_runtime::{FileLock, read_optional, write_atomic};
use regex_lite::Regex;
use tracing::{debug, info};

use crate::error::{CohortError, Result};
use crate::session::{Session, SessionCommand};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s+\w+ history\s*$").expect("HEADER_RE should compile"));
static ENTRY_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[> ]\s*\d+  ").expect("ENTRY_PREFIX_RE should compile"));

/// The host-wide excerpt slot. Last writer wins.
#[derive(Debug, Clone)]
pub struct HistorySlot {
	path: PathBuf,
	lock_path: PathBuf,
}

impl HistorySlot {
	pub fn new(path: PathBuf, lock_path: PathBuf) -> Self {
		Self { path, lock_path }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn write(&self, excerpt: &str) -> Result<()> {
		let _lock = FileLock::acquire(&self.lock_path)?;
		write_atomic(&self.path, excerpt.as_bytes())?;
		Ok(())
	}

	/// Current excerpt; `None` when nothing was ever pushed.
	pub fn read(&self) -> Result<Option<String>> {
		Ok(read_optional(&self.path)?.filter(|content| !content.trim().is_empty()))
	}
}

/// Copies the `table` entry at `index` into the shared slot.
///
/// Without an index, `:` and `all` skip the newest entry, which is the
/// `push` command line itself.
pub fn push(session: &Session, table: HistoryTable, index: Option<i64>) -> Result<String> {
	let index = index.unwrap_or_else(|| table.default_push_index());
	let excerpt = session
		.editor()
		.lock()
		.render_history(table, index)
		.ok_or_else(|| CohortError::NoHistoryEntry {
			table: table.to_string(),
			index,
		})?;
	session.history().write(&excerpt)?;
	info!(target = "cohort.history", session = %session.id(), %table, index, "pushed history entry");
	Ok(excerpt)
}

/// Runs the slot's entry at `table`'s prompt and returns what it produced.
pub async fn pop(session: &Session, table: HistoryTable) -> Result<String> {
	let raw = session.history().read()?.ok_or(CohortError::EmptyHistorySlot)?;
	let text = clean_excerpt(&raw);
	if text.trim().is_empty() {
		return Err(CohortError::EmptyHistorySlot);
	}

	let prompt = match table {
		HistoryTable::All => HistoryTable::Cmd,
		other => other,
	};
	let message = if prompt == HistoryTable::Cmd && SessionCommand::recognizes(&text) {
		let command = SessionCommand::parse(&text)?;
		if matches!(command, SessionCommand::Pop { .. }) {
			return Err(CohortError::InvalidCommand(format!("popped entry `{text}` is itself a pop")));
		}
		session.editor().lock().record_history(HistoryTable::Cmd, &text);
		session.dispatch(command).await?
	} else {
		session.editor().lock().execute(prompt, &text)?;
		text.clone()
	};

	if let Some(register) = table.register() {
		let stored = session.editor().lock().set_register(register, &text);
		if let Err(err) = stored {
			debug!(target = "cohort.history", register = %register, error = %err, "register not updated");
		}
	}
	info!(target = "cohort.history", session = %session.id(), %table, entry = %text, "popped history entry");
	Ok(message)
}

/// Reduces a raw history rendering to the entry text: header lines go, the
/// newest-entry marker and index number of each entry line go, leading
/// whitespace goes, and the remaining lines are joined without separators.
pub fn clean_excerpt(raw: &str) -> String {
	raw.lines()
		.filter(|line| !HEADER_RE.is_match(line))
		.map(|line| ENTRY_PREFIX_RE.replace(line, ""))
		.map(|line| line.trim_start().to_string())
		.collect::<Vec<_>>()
		.concat()
}
