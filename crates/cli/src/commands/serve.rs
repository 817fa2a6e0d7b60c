use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cohort_protocol::SessionId;
use serde_json::json;
use tracing::{info, warn};

use crate::channel::SessionServer;
use crate::context::CommandContext;
use crate::editor::{self, MemoryEditor};
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};
use crate::session::Session;

pub async fn run(ctx: &CommandContext, id: Option<String>, files: Vec<PathBuf>) -> Result<()> {
	let workdir = std::env::current_dir().context("cannot resolve working directory")?;
	let files: Vec<PathBuf> = files.into_iter().map(|f| workdir.join(f)).collect();
	let editor = editor::handle(MemoryEditor::with_files(&files)?);

	let session = match id {
		Some(id) => Session::new(&ctx.config, SessionId::new(id)?, editor, workdir)?,
		None => Session::with_free_id(&ctx.config, editor, workdir)?,
	};
	let session = Arc::new(session);
	let server = SessionServer::bind(Arc::clone(&session))?;
	session.register()?;

	let result = ResultBuilder::new("serve")
		.data(json!({
			"id": session.id(),
			"pid": std::process::id(),
			"socket": server.socket_path(),
			"files": files,
			"text": format!("{} serving {} file(s)", session.id(), files.len()),
		}))
		.build();
	print_result(&result, ctx.format);

	let outcome = tokio::select! {
		served = server.run() => served,
		stopped = wait_for_shutdown(&session) => stopped,
	};

	if let Err(err) = session.shutdown() {
		warn!(target = "cohort.session", id = %session.id(), error = %err, "failed to deregister on exit");
	}
	info!(target = "cohort.session", id = %session.id(), "exiting");
	outcome
}

/// Resolves on Ctrl-C or SIGTERM. A terminal stop (SIGTSTP) deregisters the
/// session for as long as the process is stopped.
#[cfg(unix)]
async fn wait_for_shutdown(session: &Session) -> Result<()> {
	use tokio::signal::unix::{SignalKind, signal};

	let mut terminate = signal(SignalKind::terminate())?;
	let mut stop = signal(SignalKind::from_raw(libc::SIGTSTP))?;
	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => return Ok(()),
			_ = terminate.recv() => return Ok(()),
			_ = stop.recv() => {
				session.suspend()?;
				// SAFETY: raise has no preconditions; execution resumes here on SIGCONT.
				unsafe {
					libc::raise(libc::SIGSTOP);
				}
				session.resume()?;
			}
		}
	}
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_session: &Session) -> Result<()> {
	tokio::signal::ctrl_c().await?;
	Ok(())
}
