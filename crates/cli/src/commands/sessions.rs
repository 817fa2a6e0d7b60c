use std::fmt::Write as _;

use cohort_protocol::SessionId;
use serde::Serialize;
use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{DiagnosticLevel, ResultBuilder, print_result};
use crate::session::registry::distinct;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
	pub id: SessionId,
	pub alive: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsData {
	pub sessions: Vec<SessionEntry>,
	pub pruned: Vec<SessionId>,
	pub text: String,
}

pub fn run(ctx: &CommandContext, prune: bool) -> Result<()> {
	let data = collect(ctx, prune)?;
	let dead: Vec<String> = data
		.sessions
		.iter()
		.filter(|entry| !entry.alive)
		.map(|entry| format!("{} has no running process; `cohort sessions --prune` removes it", entry.id))
		.collect();

	let mut builder = ResultBuilder::new("sessions");
	for message in dead {
		builder = builder.diagnostic(DiagnosticLevel::Warning, message);
	}
	print_result(&builder.data(data).build(), ctx.format);
	Ok(())
}

fn collect(ctx: &CommandContext, prune: bool) -> Result<SessionsData> {
	let registry = ctx.registry();
	let endpoints = ctx.endpoints();

	let pruned = if prune {
		let dropped = registry.prune(|id| endpoints.is_live(id))?;
		if !dropped.is_empty() {
			info!(target = "cohort.registry", count = dropped.len(), "pruned dead sessions");
		}
		dropped
	} else {
		Vec::new()
	};

	let sessions: Vec<SessionEntry> = distinct(registry.list()?)
		.into_iter()
		.map(|id| SessionEntry {
			alive: endpoints.is_live(&id),
			id,
		})
		.collect();

	let mut text = String::new();
	for entry in &sessions {
		let _ = writeln!(text, "{}{}", entry.id, if entry.alive { "" } else { " (dead)" });
	}
	for id in &pruned {
		let _ = writeln!(text, "pruned {id}");
	}
	if text.is_empty() {
		text.push_str("no sessions\n");
	}

	Ok(SessionsData { sessions, pruned, text })
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;
	use crate::config::Config;
	use crate::output::OutputFormat;
	use crate::session::SessionEndpoint;

	#[test]
	fn prune_drops_sessions_without_live_endpoint() {
		let tmp = TempDir::new().unwrap();
		let ctx = CommandContext::new(Config::with_runtime_dir(tmp.path()), None, None, OutputFormat::Text);
		let live = SessionId::new("LIVE").unwrap();
		ctx.endpoints()
			.save(&SessionEndpoint::current(live.clone(), ctx.layout().socket(&live)))
			.unwrap();
		std::fs::create_dir_all(tmp.path()).unwrap();
		std::fs::write(ctx.layout().registry(), "LIVE\nDEAD\nLIVE\n").unwrap();

		let listed = collect(&ctx, false).unwrap();
		assert_eq!(listed.sessions.len(), 2);
		assert!(listed.text.contains("DEAD (dead)"));

		let pruned = collect(&ctx, true).unwrap();
		assert_eq!(pruned.pruned, vec![SessionId::new("DEAD").unwrap()]);
		assert_eq!(pruned.sessions.len(), 1);
		assert!(pruned.sessions[0].alive);
	}
}
