//! User command lines understood inside a session.

use cohort_protocol::HistoryTable;
use serde::{Deserialize, Serialize};

use crate::editor::Placement;
use crate::error::{CohortError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
	/// `edit`, `vsplit`, `split` with a file name or `<ordinal>:<number>`.
	Open { placement: Placement, target: String },
	/// `ls` / `buffers`.
	List,
	/// `frame [files...]`.
	Frame { files: Vec<String> },
	Suspend,
	Resume,
	/// `push [table] [index]`.
	Push { table: HistoryTable, index: Option<i64> },
	/// `pop [table]`.
	Pop { table: HistoryTable },
}

/// Verbs handled by the session rather than the editor.
const VERBS: &[&str] = &[
	"e", "edit", "vs", "vsplit", "sp", "split", "ls", "buffers", "frame", "suspend", "resume", "push", "pop",
];

impl SessionCommand {
	/// Whether the line starts with a verb the session handles itself.
	pub fn recognizes(line: &str) -> bool {
		line.split_whitespace().next().is_some_and(|verb| VERBS.contains(&verb))
	}

	pub fn parse(line: &str) -> Result<Self> {
		let mut words = line.split_whitespace();
		let Some(verb) = words.next() else {
			return Err(CohortError::InvalidCommand("empty command line".into()));
		};
		let rest: Vec<&str> = words.collect();

		let open = |placement: Placement| -> Result<Self> {
			match rest.as_slice() {
				[target] => Ok(SessionCommand::Open {
					placement,
					target: (*target).to_string(),
				}),
				[] => Err(CohortError::InvalidCommand(format!("{verb}: file name or <ordinal>:<number> required"))),
				_ => Err(CohortError::InvalidCommand(format!("{verb}: expected a single file"))),
			}
		};
		let no_args = |command: Self| -> Result<Self> {
			if rest.is_empty() {
				Ok(command)
			} else {
				Err(CohortError::InvalidCommand(format!("{verb} takes no arguments")))
			}
		};

		match verb {
			"e" | "edit" => open(Placement::Edit),
			"vs" | "vsplit" => open(Placement::VSplit),
			"sp" | "split" => open(Placement::Split),
			"ls" | "buffers" => no_args(SessionCommand::List),
			"frame" => Ok(SessionCommand::Frame {
				files: rest.iter().map(|s| s.to_string()).collect(),
			}),
			"suspend" => no_args(SessionCommand::Suspend),
			"resume" => no_args(SessionCommand::Resume),
			"push" => {
				let (table, index) = match rest.as_slice() {
					[] => (HistoryTable::default(), None),
					[table] => (parse_table(table)?, None),
					[table, index] => (parse_table(table)?, Some(parse_index(index)?)),
					_ => return Err(CohortError::InvalidCommand("push [table] [index]".into())),
				};
				Ok(SessionCommand::Push { table, index })
			}
			"pop" => {
				let table = match rest.as_slice() {
					[] => HistoryTable::default(),
					[table] => parse_table(table)?,
					_ => return Err(CohortError::InvalidCommand("pop [table]".into())),
				};
				Ok(SessionCommand::Pop { table })
			}
			other => Err(CohortError::InvalidCommand(format!("unknown command: {other}"))),
		}
	}
}

fn parse_table(word: &str) -> Result<HistoryTable> {
	word.parse().map_err(CohortError::InvalidCommand)
}

fn parse_index(word: &str) -> Result<i64> {
	word.parse()
		.map_err(|_| CohortError::InvalidCommand(format!("history index must be an integer, got {word}")))
}

/// Outcome of a command line, reported back as a status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStatus {
	pub ok: bool,
	pub message: String,
}

impl CommandStatus {
	pub fn ok(message: impl Into<String>) -> Self {
		Self {
			ok: true,
			message: message.into(),
		}
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self {
			ok: false,
			message: message.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recognizes_only_session_verbs() {
		assert!(SessionCommand::recognizes("edit notes.md"));
		assert!(SessionCommand::recognizes("  ls"));
		assert!(SessionCommand::recognizes("pop /"));
		assert!(!SessionCommand::recognizes("set number"));
		assert!(!SessionCommand::recognizes("editx a"));
		assert!(!SessionCommand::recognizes(""));
	}

	#[test]
	fn open_verbs_and_abbreviations() {
		assert_eq!(
			SessionCommand::parse("vs 1:3").unwrap(),
			SessionCommand::Open {
				placement: Placement::VSplit,
				target: "1:3".into()
			}
		);
		assert_eq!(
			SessionCommand::parse("  edit   notes.md ").unwrap(),
			SessionCommand::Open {
				placement: Placement::Edit,
				target: "notes.md".into()
			}
		);
		assert!(matches!(SessionCommand::parse("sp"), Err(CohortError::InvalidCommand(_))));
		assert!(matches!(SessionCommand::parse("e a b"), Err(CohortError::InvalidCommand(_))));
	}

	#[test]
	fn history_commands_default_to_command_table() {
		assert_eq!(
			SessionCommand::parse("push").unwrap(),
			SessionCommand::Push {
				table: HistoryTable::Cmd,
				index: None
			}
		);
		assert_eq!(
			SessionCommand::parse("push / -3").unwrap(),
			SessionCommand::Push {
				table: HistoryTable::Search,
				index: Some(-3)
			}
		);
		assert_eq!(SessionCommand::parse("pop =").unwrap(), SessionCommand::Pop { table: HistoryTable::Expr });
		assert!(SessionCommand::parse("push : x").is_err());
		assert!(SessionCommand::parse("pop %").is_err());
	}

	#[test]
	fn misc_commands() {
		assert_eq!(SessionCommand::parse("buffers").unwrap(), SessionCommand::List);
		assert_eq!(
			SessionCommand::parse("frame a.txt b.txt").unwrap(),
			SessionCommand::Frame {
				files: vec!["a.txt".into(), "b.txt".into()]
			}
		);
		assert!(SessionCommand::parse("ls -a").is_err());
		assert!(SessionCommand::parse("").is_err());
		assert!(SessionCommand::parse("wq").is_err());
	}
}
