use cohort_protocol::SessionId;
use serde::Serialize;

use crate::context::CommandContext;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendData {
	pub session: SessionId,
	pub bytes: usize,
	pub text: String,
}

pub async fn run(ctx: &CommandContext, session: &str, keys: &str) -> Result<SendData> {
	let id = SessionId::new(session)?;
	ctx.channel().send(&id, keys).await?;
	Ok(SendData {
		text: format!("sent {} bytes to {id}", keys.len()),
		session: id,
		bytes: keys.len(),
	})
}
