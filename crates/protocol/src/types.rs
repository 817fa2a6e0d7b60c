//! Identity, buffer and view types shared by every session.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Process-scoped unique name of a session.
///
/// The id is the addressing key for every remote call and doubles as a file
/// stem in the runtime directory, so it may not contain whitespace, path
/// separators, or start with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

/// Rejected session identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSessionId {
	pub value: String,
	pub reason: &'static str,
}

impl fmt::Display for InvalidSessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid session id {:?}: {}", self.value, self.reason)
	}
}

impl std::error::Error for InvalidSessionId {}

impl SessionId {
	pub fn new(value: impl Into<String>) -> Result<Self, InvalidSessionId> {
		let value = value.into();
		let reason = if value.is_empty() {
			Some("empty")
		} else if value.starts_with('.') {
			Some("leading dot")
		} else if value.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
			Some("contains whitespace or a path separator")
		} else {
			None
		};
		match reason {
			Some(reason) => Err(InvalidSessionId { value, reason }),
			None => Ok(Self(value)),
		}
	}

	/// Returns the first name of the form `PREFIX`, `PREFIX1`, `PREFIX2`, ...
	/// that is not in `taken`. An empty prefix yields `1`, `2`, ...
	pub fn first_free(prefix: &str, taken: &[SessionId]) -> Result<Self, InvalidSessionId> {
		let mut n = usize::from(prefix.is_empty());
		loop {
			let candidate = if n == 0 { prefix.to_string() } else { format!("{prefix}{n}") };
			if !taken.iter().any(|id| id.as_str() == candidate) {
				return Self::new(candidate);
			}
			n += 1;
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl TryFrom<String> for SessionId {
	type Error = InvalidSessionId;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl From<SessionId> for String {
	fn from(id: SessionId) -> Self {
		id.0
	}
}

impl std::str::FromStr for SessionId {
	type Err = InvalidSessionId;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Snapshot of one open buffer as reported by its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferInfo {
	/// Buffer number inside the owning session (what listings show).
	pub number: u32,
	pub path: PathBuf,
	pub loaded: bool,
	pub writable: bool,
	pub modified: bool,
	/// Displayed in at least one window.
	pub visible: bool,
}

impl BufferInfo {
	/// A buffer that may be handed over: loaded into memory and writable.
	pub fn is_claimable(&self) -> bool {
		self.loaded && self.writable
	}
}

/// Cursor position, 1-based line and 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
	pub line: usize,
	pub column: usize,
}

impl Default for Cursor {
	fn default() -> Self {
		Self { line: 1, column: 0 }
	}
}

/// A manual fold over an inclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
	pub start: usize,
	pub end: usize,
	pub closed: bool,
}

/// Cursor, fold and scroll state of a buffer captured at steal time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
	pub path: PathBuf,
	pub cursor: Cursor,
	/// First line shown at the top of the window.
	pub top_line: usize,
	#[serde(default)]
	pub folds: Vec<Fold>,
}

impl ViewSnapshot {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			cursor: Cursor::default(),
			top_line: 1,
			folds: Vec::new(),
		}
	}
}
