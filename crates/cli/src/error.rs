//! Error taxonomy for session coordination.

use std::path::PathBuf;

use cohort_protocol::{InvalidSessionId, SessionId};
use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CohortError {
	#[error("session {id} is unreachable: {reason}")]
	UnreachableSession { id: SessionId, reason: String },

	#[error("{} is modified by session {session}", path.display())]
	Blocked { session: SessionId, path: PathBuf },

	#[error("{} is the only buffer of session {session}; close it there or open another buffer first", path.display())]
	SoleBuffer { session: SessionId, path: PathBuf },

	#[error("invalid path: {0}")]
	InvalidPath(String),

	#[error("invalid buffer reference: {0}")]
	InvalidReference(String),

	#[error("no session with ordinal {0} in the current listing")]
	NoSuchSession(usize),

	#[error("session {session} has no buffer {number}")]
	NoSuchBuffer { session: SessionId, number: u32 },

	#[error(transparent)]
	InvalidSessionId(#[from] InvalidSessionId),

	#[error("invalid command: {0}")]
	InvalidCommand(String),

	#[error("history slot is empty; push an entry first")]
	EmptyHistorySlot,

	#[error("no {table} history entry at index {index}")]
	NoHistoryEntry { table: String, index: i64 },

	#[error("editor: {0}")]
	Editor(String),

	#[error("protocol: {0}")]
	Protocol(String),

	#[error("failed to launch frame: {0}")]
	Launch(String),

	#[error("{0}")]
	Context(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CohortError>;

impl CohortError {
	pub fn unreachable(id: &SessionId, reason: impl Into<String>) -> Self {
		CohortError::UnreachableSession {
			id: id.clone(),
			reason: reason.into(),
		}
	}

	/// Code reported in the command result envelope.
	pub fn code(&self) -> ErrorCode {
		match self {
			CohortError::UnreachableSession { .. } => ErrorCode::SessionUnreachable,
			CohortError::Blocked { .. } | CohortError::SoleBuffer { .. } => ErrorCode::StealRefused,
			CohortError::InvalidPath(_)
			| CohortError::InvalidReference(_)
			| CohortError::InvalidSessionId(_)
			| CohortError::InvalidCommand(_) => ErrorCode::InvalidInput,
			CohortError::NoSuchSession(_) | CohortError::NoSuchBuffer { .. } => ErrorCode::NotFound,
			CohortError::EmptyHistorySlot | CohortError::NoHistoryEntry { .. } => ErrorCode::HistoryError,
			CohortError::Launch(_) => ErrorCode::LaunchFailed,
			CohortError::Io(_) => ErrorCode::IoError,
			CohortError::Editor(_) | CohortError::Protocol(_) | CohortError::Context(_) | CohortError::Json(_) | CohortError::Anyhow(_) => {
				ErrorCode::InternalError
			}
		}
	}
}
