//! History table kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the editor's history tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryTable {
	/// Command-line history (`:`).
	#[default]
	Cmd,
	/// Search patterns (`/`).
	Search,
	/// Expression register input (`=`).
	Expr,
	/// Input lines (`@`).
	Input,
	/// Every table at once.
	All,
}

impl HistoryTable {
	/// Tables that hold entries, in rendering order.
	pub const CONCRETE: [HistoryTable; 4] = [HistoryTable::Cmd, HistoryTable::Search, HistoryTable::Expr, HistoryTable::Input];

	/// Prompt character of the table.
	pub fn prompt(self) -> &'static str {
		match self {
			HistoryTable::Cmd => ":",
			HistoryTable::Search => "/",
			HistoryTable::Expr => "=",
			HistoryTable::Input => "@",
			HistoryTable::All => "all",
		}
	}

	/// Name used in the rendered listing header (`#  cmd history`).
	pub fn header_name(self) -> &'static str {
		match self {
			HistoryTable::Cmd => "cmd",
			HistoryTable::Search => "search",
			HistoryTable::Expr => "expr",
			HistoryTable::Input => "input",
			HistoryTable::All => "all",
		}
	}

	/// Register the table's most recent entry is mirrored into.
	pub fn register(self) -> Option<char> {
		match self {
			HistoryTable::Cmd | HistoryTable::All => Some(':'),
			HistoryTable::Search => Some('/'),
			HistoryTable::Expr => Some('='),
			HistoryTable::Input => None,
		}
	}

	/// Default entry for a push: the command-line tables skip the transient
	/// entry recorded by invoking the push itself.
	pub fn default_push_index(self) -> i64 {
		match self {
			HistoryTable::Cmd | HistoryTable::All => -2,
			_ => -1,
		}
	}
}

impl std::str::FromStr for HistoryTable {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			":" | "cmd" | "command" => Ok(HistoryTable::Cmd),
			"/" | "?" | "search" => Ok(HistoryTable::Search),
			"=" | "expr" | "expression" => Ok(HistoryTable::Expr),
			"@" | "input" => Ok(HistoryTable::Input),
			"all" => Ok(HistoryTable::All),
			_ => Err(format!("unknown history table: {s}")),
		}
	}
}

impl fmt::Display for HistoryTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.prompt())
	}
}
