//! Locating a file across sessions and taking edit ownership of it.
//!
//! A request names either a path or `<ordinal>:<number>`. Paths are looked
//! up locally first, then in every peer in registry order; the first peer
//! holding a loaded, writable buffer for the path becomes the owner. The
//! owner only hands a buffer over when it has no unsaved changes, and the
//! view (cursor, folds, scroll) travels with it through a snapshot file.

mod release;

use std::fmt;
use std::path::{Component, Path, PathBuf};

use cohort_protocol::{BufferInfo, RemoteErrorCode, SessionId, SessionRequest, SessionResponse, ViewSnapshot};
use tracing::{debug, info, warn};

pub(crate) use release::release;

use crate::editor::Placement;
use crate::error::{CohortError, Result};
use crate::session::Session;

/// What the user asked to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
	/// Absolute, normalized path.
	Name(PathBuf),
	/// Buffer `number` of the session at `ordinal` in the current listing.
	Reference { ordinal: usize, number: u32 },
}

impl Target {
	/// Parses user input, resolving relative names against `workdir`.
	pub fn parse(input: &str, workdir: &Path) -> Result<Self> {
		let input = input.trim();
		if input.is_empty() {
			return Err(CohortError::InvalidPath("empty file name".into()));
		}
		if let Some(reference) = parse_reference(input)? {
			return Ok(reference);
		}

		let raw = Path::new(input);
		if raw.components().any(|c| matches!(c, Component::ParentDir)) {
			return Err(CohortError::InvalidPath(format!("{input}: parent directory components are not allowed")));
		}
		let joined = if raw.is_absolute() { raw.to_path_buf() } else { workdir.join(raw) };
		Ok(Target::Name(normalize(&joined)))
	}
}

fn parse_reference(input: &str) -> Result<Option<Target>> {
	let Some((ordinal, number)) = input.split_once(':') else {
		return Ok(None);
	};
	let is_decimal = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
	if !is_decimal(ordinal) || !is_decimal(number) {
		return Ok(None);
	}
	let ordinal: usize = ordinal
		.parse()
		.map_err(|_| CohortError::InvalidReference(format!("{input}: ordinal out of range")))?;
	let number: u32 = number
		.parse()
		.map_err(|_| CohortError::InvalidReference(format!("{input}: buffer number out of range")))?;
	if ordinal == 0 {
		return Err(CohortError::InvalidReference(format!("{input}: ordinals start at 1")));
	}
	Ok(Some(Target::Reference { ordinal, number }))
}

fn normalize(path: &Path) -> PathBuf {
	path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Where a successfully attached buffer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
	Local,
	Remote(SessionId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StealOutcome {
	Attached { path: PathBuf, origin: Origin },
	/// No session held the file; it was opened as a new local buffer.
	OpenedNew { path: PathBuf },
}

impl StealOutcome {
	pub fn path(&self) -> &Path {
		match self {
			StealOutcome::Attached { path, .. } | StealOutcome::OpenedNew { path } => path,
		}
	}
}

impl fmt::Display for StealOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StealOutcome::Attached { path, origin: Origin::Local } => write!(f, "\"{}\"", path.display()),
			StealOutcome::Attached {
				path,
				origin: Origin::Remote(id),
			} => write!(f, "\"{}\" taken from {id}", path.display()),
			StealOutcome::OpenedNew { path } => write!(f, "\"{}\" [New]", path.display()),
		}
	}
}

/// Attaches `target` to `session`, taking it from its owner when needed.
pub async fn steal(session: &Session, target: Target, placement: Placement) -> Result<StealOutcome> {
	match target {
		Target::Name(path) => steal_by_name(session, path, placement).await,
		Target::Reference { ordinal, number } => steal_by_reference(session, ordinal, number, placement).await,
	}
}

async fn steal_by_name(session: &Session, path: PathBuf, placement: Placement) -> Result<StealOutcome> {
	{
		let mut editor = session.editor().lock();
		if editor.buffer_for_path(&path).is_some_and(|b| b.is_claimable()) {
			editor.open(&path, placement)?;
			debug!(target = "cohort.steal", path = %path.display(), "attached local buffer");
			return Ok(StealOutcome::Attached { path, origin: Origin::Local });
		}
	}

	for peer in session.peers()? {
		let request = SessionRequest::Probe { path: path.clone() };
		let buffer = match session.channel().evaluate(&peer.id, request).await {
			Ok(SessionResponse::Buffer { buffer: Some(buffer) }) if buffer.is_claimable() => buffer,
			Ok(SessionResponse::Buffer { .. }) => continue,
			Ok(other) => {
				warn!(target = "cohort.steal", session = %peer.id, response = ?other, "unexpected probe response");
				continue;
			}
			Err(err) => {
				warn!(target = "cohort.steal", session = %peer.id, error = %err, "skipping unreachable session");
				continue;
			}
		};

		match transfer(session, &peer.id, &buffer, placement).await {
			Err(CohortError::NoSuchBuffer { .. }) => {
				debug!(target = "cohort.steal", session = %peer.id, path = %path.display(), "buffer vanished before release");
			}
			other => return other,
		}
	}

	session.editor().lock().open(&path, placement)?;
	debug!(target = "cohort.steal", path = %path.display(), "opened as new buffer");
	Ok(StealOutcome::OpenedNew { path })
}

async fn steal_by_reference(session: &Session, ordinal: usize, number: u32, placement: Placement) -> Result<StealOutcome> {
	let peer = session
		.peers()?
		.into_iter()
		.find(|peer| peer.ordinal == ordinal)
		.ok_or(CohortError::NoSuchSession(ordinal))?;

	let buffer = match session.channel().evaluate(&peer.id, SessionRequest::BufferAt { number }).await? {
		SessionResponse::Buffer { buffer: Some(buffer) } => buffer,
		SessionResponse::Buffer { buffer: None } => return Err(CohortError::NoSuchBuffer { session: peer.id, number }),
		other => return Err(CohortError::Protocol(format!("unexpected buffer_at response from {}: {other:?}", peer.id))),
	};
	transfer(session, &peer.id, &buffer, placement).await
}

/// Moves a clean remote buffer into `session`.
async fn transfer(session: &Session, owner: &SessionId, buffer: &BufferInfo, placement: Placement) -> Result<StealOutcome> {
	let path = buffer.path.clone();
	let blocked = || CohortError::Blocked {
		session: owner.clone(),
		path: path.clone(),
	};
	if buffer.modified {
		return Err(blocked());
	}

	let request = SessionRequest::Release { path: path.clone() };
	let snapshot_path = match session.channel().evaluate(owner, request).await? {
		SessionResponse::Released { snapshot } => snapshot,
		SessionResponse::Error { code, message } => {
			return Err(match code {
				RemoteErrorCode::Modified => blocked(),
				RemoteErrorCode::SoleBuffer => CohortError::SoleBuffer {
					session: owner.clone(),
					path: path.clone(),
				},
				RemoteErrorCode::NotFound => CohortError::NoSuchBuffer {
					session: owner.clone(),
					number: buffer.number,
				},
				RemoteErrorCode::Internal => CohortError::Protocol(format!("{owner} failed to release: {message}")),
			});
		}
		other => return Err(CohortError::Protocol(format!("unexpected release response from {owner}: {other:?}"))),
	};

	// The owner already closed its buffer: open the file even without a usable view.
	let snapshot = take_snapshot(session, &snapshot_path, &path);
	{
		let mut editor = session.editor().lock();
		editor.open(&path, placement)?;
		let applied = snapshot.and_then(|snapshot| editor.apply_view(&snapshot));
		if let Err(err) = applied {
			warn!(target = "cohort.steal", from = %owner, path = %path.display(), error = %err, "view not restored");
		}
	}
	info!(target = "cohort.steal", from = %owner, path = %path.display(), placement = placement.verb(), "stole buffer");
	Ok(StealOutcome::Attached {
		path,
		origin: Origin::Remote(owner.clone()),
	})
}

/// Reads and deletes a snapshot written by the owner.
fn take_snapshot(session: &Session, snapshot_path: &Path, path: &Path) -> Result<ViewSnapshot> {
	if snapshot_path.parent() != Some(session.layout().views_dir().as_path()) {
		return Err(CohortError::Protocol(format!(
			"snapshot {} is outside the views directory",
			snapshot_path.display()
		)));
	}
	let content = std::fs::read_to_string(snapshot_path);
	if let Err(err) = std::fs::remove_file(snapshot_path) {
		debug!(target = "cohort.steal", path = %snapshot_path.display(), error = %err, "snapshot not removed");
	}
	let snapshot: ViewSnapshot = serde_json::from_str(&content?)?;
	Ok(ViewSnapshot {
		path: path.to_path_buf(),
		..snapshot
	})
}
