use cohort_protocol::{SessionId, SessionRequest, SessionResponse};
use serde::Serialize;
use tracing::debug;

use crate::context::CommandContext;
use crate::error::{CohortError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecData {
	pub session: SessionId,
	pub line: String,
	pub text: String,
}

pub async fn run(ctx: &CommandContext, session: &str, line: &[String]) -> Result<ExecData> {
	let id = SessionId::new(session)?;
	let line = line.join(" ");

	// The target may probe every peer before answering, each probe bounded by
	// the per-call timeout.
	let peers = ctx.registry().list()?.len();
	let channel = ctx.channel_scaled(u32::try_from(peers).unwrap_or(u32::MAX).saturating_add(2));
	debug!(target = "cohort.session", session = %id, %line, timeout_ms = channel.timeout().as_millis() as u64, "exec");

	match channel.evaluate(&id, SessionRequest::Command { line: line.clone() }).await? {
		SessionResponse::Status { ok: true, message } => Ok(ExecData {
			session: id,
			line,
			text: message,
		}),
		SessionResponse::Status { ok: false, message } => Err(CohortError::Context(format!("{id}: {message}"))),
		other => Err(CohortError::Protocol(format!("unexpected response from {id}: {other:?}"))),
	}
}
