use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use cohort_protocol::{BufferInfo, Cursor, Fold, HistoryTable, ViewSnapshot};

use super::{Editor, Placement};
use crate::error::{CohortError, Result};

#[derive(Debug, Clone)]
struct MemoryBuffer {
	number: u32,
	path: PathBuf,
	loaded: bool,
	writable: bool,
	modified: bool,
	cursor: Cursor,
	top_line: usize,
	folds: Vec<Fold>,
}

impl MemoryBuffer {
	fn info(&self, visible: bool) -> BufferInfo {
		BufferInfo {
			number: self.number,
			path: self.path.clone(),
			loaded: self.loaded,
			writable: self.writable,
			modified: self.modified,
			visible,
		}
	}
}

/// In-memory model of an editor: buffers, windows, history tables and registers.
///
/// Windows form a flat list; splits insert next to the current window. A
/// single empty window always remains, matching editors that never run
/// windowless.
#[derive(Debug)]
pub struct MemoryEditor {
	buffers: BTreeMap<u32, MemoryBuffer>,
	next_number: u32,
	windows: Vec<Option<u32>>,
	current: usize,
	bell: bool,
	history: HashMap<HistoryTable, Vec<(u32, String)>>,
	history_counters: HashMap<HistoryTable, u32>,
	registers: HashMap<char, String>,
	executed: Vec<(HistoryTable, String)>,
	typed: String,
}

impl Default for MemoryEditor {
	fn default() -> Self {
		Self {
			buffers: BTreeMap::new(),
			next_number: 1,
			windows: vec![None],
			current: 0,
			bell: true,
			history: HashMap::new(),
			history_counters: HashMap::new(),
			registers: HashMap::new(),
			executed: Vec::new(),
			typed: String::new(),
		}
	}
}

impl MemoryEditor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Editor with each path opened in turn; the last one ends up current.
	pub fn with_files<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
		let mut editor = Self::new();
		for path in paths {
			editor.open(path.as_ref(), Placement::Edit)?;
		}
		Ok(editor)
	}

	pub fn set_modified(&mut self, path: &Path, modified: bool) -> Result<()> {
		self.buffer_mut(path)?.modified = modified;
		Ok(())
	}

	pub fn set_writable(&mut self, path: &Path, writable: bool) -> Result<()> {
		self.buffer_mut(path)?.writable = writable;
		Ok(())
	}

	pub fn set_cursor(&mut self, path: &Path, line: usize, column: usize) -> Result<()> {
		self.buffer_mut(path)?.cursor = Cursor { line, column };
		Ok(())
	}

	pub fn set_top_line(&mut self, path: &Path, top_line: usize) -> Result<()> {
		self.buffer_mut(path)?.top_line = top_line;
		Ok(())
	}

	pub fn add_fold(&mut self, path: &Path, start: usize, end: usize, closed: bool) -> Result<()> {
		self.buffer_mut(path)?.folds.push(Fold { start, end, closed });
		Ok(())
	}

	/// Commands run through [`Editor::execute`], oldest first.
	pub fn executed(&self) -> &[(HistoryTable, String)] {
		&self.executed
	}

	pub fn register(&self, name: char) -> Option<&str> {
		self.registers.get(&name).map(String::as_str)
	}

	/// Keys received through [`Editor::feed_keys`].
	pub fn typed(&self) -> &str {
		&self.typed
	}

	pub fn window_count(&self) -> usize {
		self.windows.len()
	}

	/// Path shown in the current window.
	pub fn current_path(&self) -> Option<&Path> {
		let number = self.windows.get(self.current).copied().flatten()?;
		self.buffers.get(&number).map(|b| b.path.as_path())
	}

	fn buffer_mut(&mut self, path: &Path) -> Result<&mut MemoryBuffer> {
		self.buffers
			.values_mut()
			.find(|b| b.path == path)
			.ok_or_else(|| CohortError::Editor(format!("no buffer for {}", path.display())))
	}

	fn number_for(&self, path: &Path) -> Option<u32> {
		self.buffers.values().find(|b| b.path == path).map(|b| b.number)
	}

	fn is_visible(&self, number: u32) -> bool {
		self.windows.contains(&Some(number))
	}

	fn current_number(&self) -> Option<u32> {
		self.windows.get(self.current).copied().flatten()
	}
}

impl Editor for MemoryEditor {
	fn buffers(&self) -> Vec<BufferInfo> {
		self.buffers.values().map(|b| b.info(self.is_visible(b.number))).collect()
	}

	fn render_buffer_list(&self) -> String {
		let mut out = String::new();
		let current = self.current_number();
		for buffer in self.buffers.values() {
			let current_flag = if current == Some(buffer.number) { '%' } else { ' ' };
			let active_flag = match (buffer.loaded, self.is_visible(buffer.number)) {
				(true, true) => 'a',
				(true, false) => 'h',
				(false, _) => ' ',
			};
			let writable_flag = if buffer.writable { ' ' } else { '-' };
			let modified_flag = if buffer.modified { '+' } else { ' ' };
			let name = format!("\"{}\"", buffer.path.display());
			let _ = writeln!(
				out,
				"{:>3} {current_flag}{active_flag}{writable_flag}{modified_flag} {name:<30} line {}",
				buffer.number, buffer.cursor.line
			);
		}
		out
	}

	fn bell_enabled(&self) -> bool {
		self.bell
	}

	fn set_bell_enabled(&mut self, enabled: bool) {
		self.bell = enabled;
	}

	fn focus_window(&mut self, path: &Path) -> bool {
		let Some(number) = self.number_for(path) else {
			return false;
		};
		match self.windows.iter().position(|w| *w == Some(number)) {
			Some(index) => {
				self.current = index;
				true
			}
			None => false,
		}
	}

	fn open_hidden(&mut self, path: &Path) -> Result<()> {
		self.open(path, Placement::Edit).map(|_| ())
	}

	fn capture_view(&self, path: &Path) -> Option<ViewSnapshot> {
		let buffer = self.buffers.values().find(|b| b.path == path)?;
		Some(ViewSnapshot {
			path: buffer.path.clone(),
			cursor: buffer.cursor,
			top_line: buffer.top_line,
			folds: buffer.folds.clone(),
		})
	}

	fn close_buffer(&mut self, path: &Path) -> Result<()> {
		let number = self
			.number_for(path)
			.ok_or_else(|| CohortError::Editor(format!("no buffer for {}", path.display())))?;
		self.buffers.remove(&number);

		let current = self.windows[self.current];
		self.windows.retain(|w| *w != Some(number));
		if self.windows.is_empty() {
			self.windows.push(None);
		}
		self.current = self
			.windows
			.iter()
			.position(|w| current.is_some() && *w == current)
			.unwrap_or(0)
			.min(self.windows.len() - 1);
		Ok(())
	}

	fn open(&mut self, path: &Path, placement: Placement) -> Result<BufferInfo> {
		let number = match self.number_for(path) {
			Some(number) => number,
			None => {
				let number = self.next_number;
				self.next_number += 1;
				let writable = std::fs::metadata(path).map(|m| !m.permissions().readonly()).unwrap_or(true);
				self.buffers.insert(
					number,
					MemoryBuffer {
						number,
						path: path.to_path_buf(),
						loaded: true,
						writable,
						modified: false,
						cursor: Cursor::default(),
						top_line: 1,
						folds: Vec::new(),
					},
				);
				number
			}
		};

		match placement {
			Placement::Edit => self.windows[self.current] = Some(number),
			Placement::VSplit => {
				self.windows.insert(self.current + 1, Some(number));
				self.current += 1;
			}
			Placement::Split => {
				self.windows.insert(self.current, Some(number));
			}
		}

		let buffer = &self.buffers[&number];
		Ok(buffer.info(true))
	}

	fn apply_view(&mut self, snapshot: &ViewSnapshot) -> Result<()> {
		let buffer = self.buffer_mut(&snapshot.path)?;
		buffer.cursor = snapshot.cursor;
		buffer.top_line = snapshot.top_line;
		buffer.folds = snapshot.folds.clone();
		Ok(())
	}

	fn record_history(&mut self, table: HistoryTable, entry: &str) {
		if table == HistoryTable::All || entry.trim().is_empty() {
			return;
		}
		let counter = self.history_counters.entry(table).or_insert(0);
		*counter += 1;
		let number = *counter;
		let entries = self.history.entry(table).or_default();
		// A repeated entry moves to the end instead of being duplicated.
		entries.retain(|(_, existing)| existing != entry);
		entries.push((number, entry.to_string()));
	}

	fn render_history(&self, table: HistoryTable, index: i64) -> Option<String> {
		let tables: &[HistoryTable] = if table == HistoryTable::All {
			&HistoryTable::CONCRETE
		} else {
			std::slice::from_ref(&table)
		};

		let mut out = String::new();
		let mut found = false;
		for table in tables {
			let _ = writeln!(out, "      #  {} history", table.header_name());
			let entries = self.history.get(table).map(Vec::as_slice).unwrap_or(&[]);
			let picked = if index < 0 {
				let back = index.unsigned_abs() as usize;
				entries.len().checked_sub(back).map(|i| (i, &entries[i]))
			} else {
				entries.iter().enumerate().find(|(_, (number, _))| i64::from(*number) == index)
			};
			if let Some((position, (number, entry))) = picked {
				let marker = if position + 1 == entries.len() { '>' } else { ' ' };
				let _ = writeln!(out, "{marker}{number:>6}  {entry}");
				found = true;
			}
		}
		found.then_some(out)
	}

	fn execute(&mut self, table: HistoryTable, text: &str) -> Result<()> {
		if table == HistoryTable::All {
			return Err(CohortError::Editor("cannot execute into every history table".into()));
		}
		self.record_history(table, text);
		self.executed.push((table, text.to_string()));
		Ok(())
	}

	fn set_register(&mut self, register: char, text: &str) -> Result<()> {
		if register == ':' || register == '.' || register == '%' {
			return Err(CohortError::Editor(format!("register {register} is read-only")));
		}
		self.registers.insert(register, text.to_string());
		Ok(())
	}

	fn feed_keys(&mut self, keys: &str) {
		self.typed.push_str(keys);
	}
}
