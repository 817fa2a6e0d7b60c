//! Opens new frames: a terminal running another `cohort serve`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{CohortError, Result};

#[derive(Debug, Clone)]
pub struct FrameLauncher {
	terminal: Vec<String>,
	program: PathBuf,
	runtime_dir: PathBuf,
}

impl FrameLauncher {
	/// Launcher running the current executable inside `terminal`.
	pub fn new(terminal: Vec<String>, runtime_dir: PathBuf) -> Self {
		let program = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("cohort"));
		Self {
			terminal,
			program,
			runtime_dir,
		}
	}

	pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
		self.program = program.into();
		self
	}

	/// Builds the detached command for a frame editing `files`.
	pub fn command(&self, files: &[PathBuf]) -> Result<Command> {
		let (terminal, terminal_args) = self
			.terminal
			.split_first()
			.ok_or_else(|| CohortError::Launch("no terminal command configured".into()))?;
		let terminal = which::which(terminal).map_err(|err| CohortError::Launch(format!("terminal `{terminal}` not found: {err}")))?;

		let mut cmd = Command::new(terminal);
		cmd.args(terminal_args)
			.arg(&self.program)
			.args(serve_args(&self.runtime_dir, files))
			.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null());

		#[cfg(unix)]
		std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

		Ok(cmd)
	}

	/// Spawns the frame and returns its pid. The frame is not waited on.
	pub fn new_frame(&self, files: &[PathBuf]) -> Result<u32> {
		let child = self
			.command(files)?
			.spawn()
			.map_err(|err| CohortError::Launch(format!("failed to spawn terminal: {err}")))?;
		let pid = child.id();
		info!(target = "cohort.launcher", pid, files = files.len(), "launched frame");
		Ok(pid)
	}
}

fn serve_args(runtime_dir: &Path, files: &[PathBuf]) -> Vec<OsString> {
	let mut args: Vec<OsString> = vec!["--runtime-dir".into(), runtime_dir.into(), "serve".into()];
	if !files.is_empty() {
		args.push("--".into());
		args.extend(files.iter().map(|f| f.as_os_str().to_owned()));
	}
	args
}
