//! Request/response messages carried over a session socket.
//!
//! Each connection carries exactly one request line and at most one response
//! line. Fire-and-forget requests (`Keys`) are written without waiting for the
//! reply.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{BufferInfo, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionRequest {
	Ping,
	/// Does a buffer with this absolute path exist in the session?
	Probe { path: PathBuf },
	/// Buffer with this number, as shown in the session's listing.
	BufferAt { number: u32 },
	/// Hand the buffer over: snapshot its view, close it, return the snapshot path.
	Release { path: PathBuf },
	/// Rendered listing of the session's open buffers.
	ListBuffers,
	/// Raw input sequence fed to the session.
	Keys { keys: String },
	/// User command line interpreted by the session's command layer.
	Command { line: String },
}

impl SessionRequest {
	/// Short operation tag for logs.
	pub fn op(&self) -> &'static str {
		match self {
			SessionRequest::Ping => "ping",
			SessionRequest::Probe { .. } => "probe",
			SessionRequest::BufferAt { .. } => "buffer_at",
			SessionRequest::Release { .. } => "release",
			SessionRequest::ListBuffers => "list_buffers",
			SessionRequest::Keys { .. } => "keys",
			SessionRequest::Command { .. } => "command",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionResponse {
	Pong { id: SessionId },
	Buffer { buffer: Option<BufferInfo> },
	Released { snapshot: PathBuf },
	Listing { text: String },
	Status { ok: bool, message: String },
	Ok,
	Error { code: RemoteErrorCode, message: String },
}

/// Machine-readable failure reasons a session reports to its peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorCode {
	/// The buffer has unsaved changes.
	Modified,
	/// The buffer is the only one the session has open.
	SoleBuffer,
	/// No such buffer.
	NotFound,
	/// Anything else.
	Internal,
}

impl std::fmt::Display for RemoteErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RemoteErrorCode::Modified => write!(f, "MODIFIED"),
			RemoteErrorCode::SoleBuffer => write!(f, "SOLE_BUFFER"),
			RemoteErrorCode::NotFound => write!(f, "NOT_FOUND"),
			RemoteErrorCode::Internal => write!(f, "INTERNAL"),
		}
	}
}
