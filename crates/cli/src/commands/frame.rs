use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::context::CommandContext;
use crate::error::Result;
use crate::launcher::FrameLauncher;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameData {
	pub pid: u32,
	pub files: Vec<PathBuf>,
	pub text: String,
}

pub fn run(ctx: &CommandContext, files: Vec<PathBuf>) -> Result<FrameData> {
	let cwd = std::env::current_dir().context("cannot resolve working directory")?;
	let files: Vec<PathBuf> = files.into_iter().map(|f| cwd.join(f)).collect();
	let runtime_dir = std::path::absolute(&ctx.config.runtime_dir)?;

	let pid = FrameLauncher::new(ctx.config.terminal.clone(), runtime_dir).new_frame(&files)?;
	Ok(FrameData {
		text: format!("frame launched (pid {pid})"),
		pid,
		files,
	})
}
