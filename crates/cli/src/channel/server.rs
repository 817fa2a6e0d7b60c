use std::path::{Path, PathBuf};
use std::sync::Arc;

use cohort_protocol::{RemoteErrorCode, SessionRequest, SessionResponse};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use super::{read_line, write_line};
use crate::error::Result;
use crate::session::Session;

/// Accept loop answering peers on a session's socket.
pub struct SessionServer {
	listener: UnixListener,
	socket: PathBuf,
	session: Arc<Session>,
}

impl SessionServer {
	/// Binds the session's socket, replacing a leftover file from a crashed run.
	pub fn bind(session: Arc<Session>) -> Result<Self> {
		let socket = session.layout().socket(session.id());
		if let Some(parent) = socket.parent() {
			std::fs::create_dir_all(parent)?;
		}
		match std::fs::remove_file(&socket) {
			Ok(()) => debug!(target = "cohort.channel", path = %socket.display(), "removed stale socket"),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
			Err(err) => return Err(err.into()),
		}
		let listener = UnixListener::bind(&socket)?;
		info!(target = "cohort.channel", session = %session.id(), path = %socket.display(), "listening");
		Ok(Self { listener, socket, session })
	}

	pub fn socket_path(&self) -> &Path {
		&self.socket
	}

	/// Serves until the task is dropped or accepting fails.
	pub async fn run(&self) -> Result<()> {
		loop {
			let (stream, _) = self.listener.accept().await?;
			let session = Arc::clone(&self.session);
			tokio::spawn(async move {
				if let Err(err) = handle_connection(session, stream).await {
					debug!(target = "cohort.channel", error = %err, "connection ended early");
				}
			});
		}
	}
}

impl Drop for SessionServer {
	fn drop(&mut self) {
		let _ = std::fs::remove_file(&self.socket);
	}
}

async fn handle_connection(session: Arc<Session>, stream: UnixStream) -> std::io::Result<()> {
	let mut reader = BufReader::new(stream);
	let request: SessionRequest = match read_line(&mut reader).await {
		Ok(Some(request)) => request,
		Ok(None) => return Ok(()),
		Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
			warn!(target = "cohort.channel", error = %err, "malformed request");
			let response = SessionResponse::Error {
				code: RemoteErrorCode::Internal,
				message: format!("malformed request: {err}"),
			};
			return write_line(reader.get_mut(), &response).await;
		}
		Err(err) => return Err(err),
	};

	let op = request.op();
	let response = session.handle_request(request).await;
	debug!(target = "cohort.channel", session = %session.id(), op, "answered");
	// `send` callers hang up right after writing; a failed reply is expected there.
	write_line(reader.get_mut(), &response).await
}
