mod exec;
mod frame;
mod send;
mod serve;
mod sessions;

use serde::Serialize;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, print_result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let ctx = CommandContext::new(Config::load(), cli.runtime_dir, cli.timeout_ms, cli.format);
	match cli.command {
		Commands::Serve { id, files } => serve::run(&ctx, id, files).await?,
		Commands::Exec { session, line } => report("exec", exec::run(&ctx, &session, &line).await, ctx.format)?,
		Commands::Send { session, keys } => report("send", send::run(&ctx, &session, &keys).await, ctx.format)?,
		Commands::Sessions { prune } => sessions::run(&ctx, prune)?,
		Commands::Frame { files } => report("frame", frame::run(&ctx, files), ctx.format)?,
	}

	Ok(())
}

/// Prints `result` as an envelope; errors are printed and passed on.
fn report<T: Serialize>(command: &str, result: Result<T>, format: OutputFormat) -> Result<()> {
	match result {
		Ok(data) => {
			print_result(&ResultBuilder::new(command).data(data).build(), format);
			Ok(())
		}
		Err(err) => {
			let failed = ResultBuilder::<serde_json::Value>::new(command).error(err.code(), err.to_string()).build();
			print_result(&failed, format);
			Err(err)
		}
	}
}
