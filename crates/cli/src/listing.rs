//! Buffer listing across every registered session.

use std::fmt;

use cohort_protocol::{SessionId, SessionRequest, SessionResponse};
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSection {
	/// Position among remote sessions; `None` for the local section.
	pub ordinal: Option<usize>,
	pub session: SessionId,
	/// The session's own rendering; `None` when it could not be reached.
	pub buffers: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
	pub sections: Vec<ListingSection>,
}

impl Listing {
	pub fn remote(&self) -> impl Iterator<Item = &ListingSection> {
		self.sections.iter().filter(|s| s.ordinal.is_some())
	}

	pub fn local(&self) -> Option<&ListingSection> {
		self.sections.iter().find(|s| s.ordinal.is_none())
	}
}

impl fmt::Display for Listing {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for section in &self.sections {
			match section.ordinal {
				Some(ordinal) => write!(f, "{ordinal}: {}", section.session)?,
				None => write!(f, "local: {}", section.session)?,
			}
			match &section.buffers {
				Some(text) => {
					writeln!(f)?;
					f.write_str(text)?;
					if !text.is_empty() && !text.ends_with('\n') {
						writeln!(f)?;
					}
				}
				None => writeln!(f, " (unreachable)")?,
			}
		}
		Ok(())
	}
}

/// Collects every peer's buffer list, numbered by ordinal, then the local one.
///
/// An unreachable peer keeps its ordinal so the numbers printed match what an
/// `<ordinal>:<number>` reference resolves to.
pub async fn list_all(session: &Session) -> Result<Listing> {
	let mut sections = Vec::new();
	for peer in session.peers()? {
		let buffers = match session.channel().evaluate(&peer.id, SessionRequest::ListBuffers).await {
			Ok(SessionResponse::Listing { text }) => Some(text),
			Ok(other) => {
				warn!(target = "cohort.session", session = %peer.id, response = ?other, "unexpected listing response");
				None
			}
			Err(err) => {
				warn!(target = "cohort.session", session = %peer.id, error = %err, "listing skipped unreachable session");
				None
			}
		};
		sections.push(ListingSection {
			ordinal: Some(peer.ordinal),
			session: peer.id,
			buffers,
		});
	}

	let local = session.editor().lock().render_buffer_list();
	sections.push(ListingSection {
		ordinal: None,
		session: session.id().clone(),
		buffers: Some(local),
	});
	Ok(Listing { sections })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(name: &str) -> SessionId {
		SessionId::new(name).unwrap()
	}

	#[test]
	fn renders_sections_with_ordinals_and_local_last() {
		let listing = Listing {
			sections: vec![
				ListingSection {
					ordinal: Some(1),
					session: id("COHORT1"),
					buffers: Some("  1 %a   \"/tmp/a.txt\" line 1\n".into()),
				},
				ListingSection {
					ordinal: Some(2),
					session: id("COHORT2"),
					buffers: None,
				},
				ListingSection {
					ordinal: None,
					session: id("COHORT"),
					buffers: Some("  1 %a   \"/tmp/b.txt\" line 1".into()),
				},
			],
		};

		assert_eq!(
			listing.to_string(),
			"1: COHORT1\n  1 %a   \"/tmp/a.txt\" line 1\n2: COHORT2 (unreachable)\nlocal: COHORT\n  1 %a   \"/tmp/b.txt\" line 1\n"
		);
		assert_eq!(listing.remote().count(), 2);
		assert_eq!(listing.local().map(|s| s.session.as_str()), Some("COHORT"));
	}

	#[test]
	fn serializes_for_json_output() {
		let listing = Listing {
			sections: vec![ListingSection {
				ordinal: None,
				session: id("COHORT"),
				buffers: Some(String::new()),
			}],
		};
		let value = serde_json::to_value(&listing).unwrap();
		assert_eq!(value["sections"][0]["session"], "COHORT");
		assert!(value["sections"][0]["ordinal"].is_null());
	}
}
