use clap::ValueEnum;

/// How command results are printed on stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// The payload's `text` field, or pretty JSON when it has none
	#[default]
	Text,
	/// The full result envelope as pretty JSON
	Json,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = self.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default();
		f.write_str(&name)
	}
}
