use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, Diagnostic, DiagnosticLevel, ErrorCode, SCHEMA_VERSION};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	diagnostics: Vec<Diagnostic>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
			diagnostics: Vec::new(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn diagnostic(mut self, level: DiagnosticLevel, message: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
		});
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
			diagnostics: self.diagnostics,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			print_result_text(result);
		}
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		if let Some(ref data) = result.data {
			match serde_json::to_value(data) {
				Ok(serde_json::Value::String(text)) => {
					let _ = writeln!(stdout, "{text}");
				}
				Ok(value) => match value.get("text").and_then(|t| t.as_str()) {
					Some(text) => {
						let _ = write!(stdout, "{text}");
						if !text.ends_with('\n') {
							let _ = writeln!(stdout);
						}
					}
					None => {
						if let Ok(json) = serde_json::to_string_pretty(&value) {
							let _ = writeln!(stdout, "{json}");
						}
					}
				},
				Err(_) => {}
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "{} [{}]: {}", "Error".red().bold(), error.code, error.message);
	}

	for diag in &result.diagnostics {
		let prefix = match diag.level {
			DiagnosticLevel::Info => "info".normal(),
			DiagnosticLevel::Warning => "warning".yellow(),
			DiagnosticLevel::Error => "error".red(),
		};
		let _ = writeln!(stdout, "[{prefix}] {}", diag.message);
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn ok_requires_data_and_no_error() {
		let result = ResultBuilder::new("sessions").data(json!({"sessions": []})).build();
		assert!(result.ok);
		assert_eq!(result.schema_version, Some(SCHEMA_VERSION));

		let failed: CommandResult<serde_json::Value> = ResultBuilder::new("exec").error(ErrorCode::StealRefused, "modified").build();
		assert!(!failed.ok);
		assert_eq!(failed.error.unwrap().code, ErrorCode::StealRefused);
	}

	#[test]
	fn envelope_serializes_camel_case() {
		let result = ResultBuilder::new("frame")
			.data(json!({"launched": true}))
			.diagnostic(DiagnosticLevel::Info, "spawned")
			.build();
		let value = serde_json::to_value(&result).unwrap();
		assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
		assert!(value.get("durationMs").is_some());
		assert_eq!(value["diagnostics"][0]["level"], "info");
		assert_eq!(value["diagnostics"][0].as_object().unwrap().len(), 2);
	}

	#[test]
	fn error_carries_code_and_message_only() {
		let failed: CommandResult<serde_json::Value> = ResultBuilder::new("exec").error(ErrorCode::SessionUnreachable, "gone").build();
		let value = serde_json::to_value(&failed).unwrap();
		assert_eq!(value["error"], json!({"code": "SESSION_UNREACHABLE", "message": "gone"}));
	}
}
