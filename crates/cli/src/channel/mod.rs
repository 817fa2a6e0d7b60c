//! Inter-session channel.
//!
//! One request per connection: the caller writes a JSON line and, for
//! [`Channel::evaluate`], reads one JSON line back. Every failure between the
//! two sessions (missing descriptor, dead pid, refused connection, broken
//! stream, timeout) is reported as [`CohortError::UnreachableSession`].

mod server;

use std::time::Duration;

use cohort_protocol::{SessionId, SessionRequest, SessionResponse};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

pub use server::SessionServer;

use crate::error::{CohortError, Result};
use crate::session::EndpointStore;

#[derive(Debug, Clone)]
pub struct Channel {
	endpoints: EndpointStore,
	timeout: Duration,
}

impl Channel {
	pub fn new(endpoints: EndpointStore, timeout: Duration) -> Self {
		Self { endpoints, timeout }
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Sends `request` to `id` and waits for its response.
	pub async fn evaluate(&self, id: &SessionId, request: SessionRequest) -> Result<SessionResponse> {
		let op = request.op();
		let stream = self.connect(id).await?;
		let response = tokio::time::timeout(self.timeout, exchange(stream, &request))
			.await
			.map_err(|_| CohortError::unreachable(id, format!("{op} timed out after {}ms", self.timeout.as_millis())))?
			.map_err(|err| CohortError::unreachable(id, format!("{op}: {err}")))?;
		debug!(target = "cohort.channel", session = %id, op, "evaluated");
		Ok(response)
	}

	/// Injects `keys` into `id` without waiting for the outcome.
	pub async fn send(&self, id: &SessionId, keys: &str) -> Result<()> {
		let mut stream = self.connect(id).await?;
		let request = SessionRequest::Keys { keys: keys.to_string() };
		tokio::time::timeout(self.timeout, write_line(&mut stream, &request))
			.await
			.map_err(|_| CohortError::unreachable(id, "send timed out"))?
			.map_err(|err| CohortError::unreachable(id, format!("send: {err}")))?;
		debug!(target = "cohort.channel", session = %id, bytes = keys.len(), "sent keys");
		Ok(())
	}

	async fn connect(&self, id: &SessionId) -> Result<UnixStream> {
		let endpoint = self
			.endpoints
			.load(id)
			.map_err(|err| CohortError::unreachable(id, format!("unreadable endpoint: {err}")))?
			.ok_or_else(|| CohortError::unreachable(id, "no endpoint descriptor"))?;
		if !endpoint.is_alive() {
			return Err(CohortError::unreachable(id, format!("process {} is gone", endpoint.pid)));
		}
		tokio::time::timeout(self.timeout, UnixStream::connect(&endpoint.socket))
			.await
			.map_err(|_| CohortError::unreachable(id, "connect timed out"))?
			.map_err(|err| CohortError::unreachable(id, format!("connect {}: {err}", endpoint.socket.display())))
	}
}

pub(crate) async fn write_line<S, T>(stream: &mut S, message: &T) -> std::io::Result<()>
where
	S: AsyncWrite + Unpin,
	T: serde::Serialize,
{
	let mut payload = serde_json::to_vec(message)?;
	payload.push(b'\n');
	stream.write_all(&payload).await?;
	stream.flush().await
}

/// Reads one JSON line. `Ok(None)` when the peer closed without sending one.
pub(crate) async fn read_line<S, T>(reader: &mut BufReader<S>) -> std::io::Result<Option<T>>
where
	S: AsyncRead + Unpin,
	T: serde::de::DeserializeOwned,
{
	let mut line = String::new();
	if reader.read_line(&mut line).await? == 0 {
		return Ok(None);
	}
	let message = serde_json::from_str(line.trim_end())?;
	Ok(Some(message))
}

async fn exchange<S>(mut stream: S, request: &SessionRequest) -> std::io::Result<SessionResponse>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	write_line(&mut stream, request).await?;
	let mut reader = BufReader::new(stream);
	read_line(&mut reader)
		.await?
		.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed without a response"))
}
