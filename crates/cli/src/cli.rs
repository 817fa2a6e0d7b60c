use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cohort")]
#[command(about = "Coordinate editor sessions on one host")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Directory shared by every session (overrides COHORT_RUNTIME_DIR and the config file)
	#[arg(long, global = true, value_name = "DIR")]
	pub runtime_dir: Option<PathBuf>,

	/// Timeout for a single call to another session, in milliseconds
	#[arg(long, global = true, value_name = "MS")]
	pub timeout_ms: Option<u64>,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run a session hosting FILES until interrupted
	Serve {
		/// Session id (defaults to the first free COHORT, COHORT1, ...)
		#[arg(long)]
		id: Option<String>,
		/// Files to open at startup
		files: Vec<PathBuf>,
	},

	/// Run a command line (edit, vsplit, ls, push, pop, ...) inside a session
	#[command(alias = "x")]
	Exec {
		session: String,
		#[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
		line: Vec<String>,
	},

	/// Inject raw keys into a session without waiting for the outcome
	Send { session: String, keys: String },

	/// List registered sessions
	#[command(alias = "ls")]
	Sessions {
		/// Drop entries whose process is gone
		#[arg(long)]
		prune: bool,
	},

	/// Open a new frame (terminal running `cohort serve`)
	Frame { files: Vec<PathBuf> },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exec_collects_the_command_line() {
		let cli = Cli::try_parse_from(["cohort", "exec", "COHORT1", "vsplit", "2:3"]).unwrap();
		match cli.command {
			Commands::Exec { session, line } => {
				assert_eq!(session, "COHORT1");
				assert_eq!(line, ["vsplit", "2:3"]);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn global_flags_apply_after_subcommand() {
		let cli = Cli::try_parse_from(["cohort", "sessions", "--prune", "-vv", "--timeout-ms", "50", "-f", "json"]).unwrap();
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.timeout_ms, Some(50));
		assert_eq!(cli.format, OutputFormat::Json);
		assert!(matches!(cli.command, Commands::Sessions { prune: true }));
	}

	#[test]
	fn serve_takes_id_and_files() {
		let cli = Cli::try_parse_from(["cohort", "--runtime-dir", "/run/x", "serve", "--id", "LEFT", "a.txt", "b.txt"]).unwrap();
		assert_eq!(cli.runtime_dir, Some(PathBuf::from("/run/x")));
		match cli.command {
			Commands::Serve { id, files } => {
				assert_eq!(id.as_deref(), Some("LEFT"));
				assert_eq!(files, [PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn exec_requires_a_line() {
		assert!(Cli::try_parse_from(["cohort", "exec", "COHORT"]).is_err());
	}
}
