//! A running session: its identity, shared-state handles and request handling.

use std::path::{Path, PathBuf};

use cohort_protocol::{SessionId, SessionRequest, SessionResponse};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::command::{CommandStatus, SessionCommand};
use super::endpoint::{EndpointStore, SessionEndpoint};
use super::registry::{SessionRegistry, distinct};
use crate::channel::Channel;
use crate::config::{Config, RuntimeLayout};
use crate::editor::EditorHandle;
use crate::error::{CohortError, Result};
use crate::history::{self, HistorySlot};
use crate::launcher::FrameLauncher;
use crate::listing;
use crate::steal::{self, Target};

/// Whether the session is currently listed in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
	/// Not started yet, or already shut down.
	Detached,
	Registered,
	/// Deregistered around a stop of the process.
	Suspended,
}

/// Another registered session and its position in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
	/// 1-based, counted over sessions other than the requester.
	pub ordinal: usize,
	pub id: SessionId,
}

pub struct Session {
	id: SessionId,
	layout: RuntimeLayout,
	registry: SessionRegistry,
	endpoints: EndpointStore,
	channel: Channel,
	history: HistorySlot,
	launcher: FrameLauncher,
	editor: EditorHandle,
	workdir: PathBuf,
	liveness: Mutex<Liveness>,
}

impl Session {
	/// Builds a session named `id` over the runtime directory of `config`.
	pub fn new(config: &Config, id: SessionId, editor: EditorHandle, workdir: PathBuf) -> Result<Self> {
		std::fs::create_dir_all(&config.runtime_dir)?;
		let root = config.runtime_dir.canonicalize()?;
		let layout = RuntimeLayout::new(&root);
		let endpoints = EndpointStore::new(layout.endpoints_dir());
		Ok(Self {
			id,
			registry: SessionRegistry::new(layout.registry(), layout.registry_lock()),
			channel: Channel::new(endpoints.clone(), config.rpc_timeout()),
			history: HistorySlot::new(layout.history_slot(), layout.history_lock()),
			launcher: FrameLauncher::new(config.terminal.clone(), root),
			endpoints,
			layout,
			editor,
			workdir,
			liveness: Mutex::new(Liveness::Detached),
		})
	}

	/// Like [`Session::new`], picking the first `<prefix>`, `<prefix>1`, ...
	/// name the registry does not list yet.
	pub fn with_free_id(config: &Config, editor: EditorHandle, workdir: PathBuf) -> Result<Self> {
		let registry = SessionRegistry::new(config.layout().registry(), config.layout().registry_lock());
		let id = SessionId::first_free(&config.session_prefix, &registry.list()?)?;
		Self::new(config, id, editor, workdir)
	}

	pub fn id(&self) -> &SessionId {
		&self.id
	}

	pub fn layout(&self) -> &RuntimeLayout {
		&self.layout
	}

	pub fn registry(&self) -> &SessionRegistry {
		&self.registry
	}

	pub fn endpoints(&self) -> &EndpointStore {
		&self.endpoints
	}

	pub fn channel(&self) -> &Channel {
		&self.channel
	}

	pub fn history(&self) -> &HistorySlot {
		&self.history
	}

	pub fn launcher(&self) -> &FrameLauncher {
		&self.launcher
	}

	pub fn editor(&self) -> &EditorHandle {
		&self.editor
	}

	pub fn workdir(&self) -> &Path {
		&self.workdir
	}

	pub fn liveness(&self) -> Liveness {
		*self.liveness.lock()
	}

	/// Publishes the endpoint descriptor and lists the session in the registry.
	pub fn register(&self) -> Result<()> {
		self.endpoints
			.save(&SessionEndpoint::current(self.id.clone(), self.layout.socket(&self.id)))?;
		self.registry.register(&self.id)?;
		*self.liveness.lock() = Liveness::Registered;
		info!(target = "cohort.session", id = %self.id, "registered");
		Ok(())
	}

	/// Removes the session from the registry. The endpoint stays published.
	pub fn suspend(&self) -> Result<()> {
		self.registry.deregister(&self.id)?;
		*self.liveness.lock() = Liveness::Suspended;
		info!(target = "cohort.session", id = %self.id, "suspended");
		Ok(())
	}

	pub fn resume(&self) -> Result<()> {
		self.registry.register(&self.id)?;
		*self.liveness.lock() = Liveness::Registered;
		info!(target = "cohort.session", id = %self.id, "resumed");
		Ok(())
	}

	/// Deregisters and withdraws the endpoint descriptor.
	pub fn shutdown(&self) -> Result<()> {
		self.registry.deregister(&self.id)?;
		self.endpoints.clear(&self.id)?;
		*self.liveness.lock() = Liveness::Detached;
		info!(target = "cohort.session", id = %self.id, "shut down");
		Ok(())
	}

	/// Registered sessions other than this one, duplicates collapsed, numbered
	/// from 1 in registry order. Read fresh on every call.
	pub fn peers(&self) -> Result<Vec<Peer>> {
		Ok(distinct(self.registry.list()?)
			.into_iter()
			.filter(|id| *id != self.id)
			.enumerate()
			.map(|(index, id)| Peer { ordinal: index + 1, id })
			.collect())
	}

	/// Answers a request from another session.
	pub async fn handle_request(&self, request: SessionRequest) -> SessionResponse {
		match request {
			SessionRequest::Ping => SessionResponse::Pong { id: self.id.clone() },
			SessionRequest::Probe { path } => {
				let buffer = self.editor.lock().buffer_for_path(&path);
				SessionResponse::Buffer { buffer }
			}
			SessionRequest::BufferAt { number } => {
				let buffer = self.editor.lock().buffer_by_number(number);
				SessionResponse::Buffer { buffer }
			}
			SessionRequest::Release { path } => {
				let mut editor = self.editor.lock();
				steal::release(&mut *editor, &path, &self.layout.views_dir())
			}
			SessionRequest::ListBuffers => {
				let text = self.editor.lock().render_buffer_list();
				SessionResponse::Listing { text }
			}
			SessionRequest::Keys { keys } => {
				self.editor.lock().feed_keys(&keys);
				SessionResponse::Ok
			}
			SessionRequest::Command { line } => {
				let status = self.run_command(&line).await;
				SessionResponse::Status {
					ok: status.ok,
					message: status.message,
				}
			}
		}
	}

	/// Runs a user command line. Failures come back as a status, never as a panic
	/// or an error that would end the session.
	pub async fn run_command(&self, line: &str) -> CommandStatus {
		self.editor.lock().record_history(cohort_protocol::HistoryTable::Cmd, line);
		match self.execute(line).await {
			Ok(message) => {
				debug!(target = "cohort.session", id = %self.id, line, "command ok");
				CommandStatus::ok(message)
			}
			Err(err) => {
				warn!(target = "cohort.session", id = %self.id, line, error = %err, "command failed");
				CommandStatus::failed(err.to_string())
			}
		}
	}

	async fn execute(&self, line: &str) -> Result<String> {
		match SessionCommand::parse(line)? {
			SessionCommand::Pop { table } => history::pop(self, table).await,
			command => self.dispatch(command).await,
		}
	}

	/// Runs a parsed command. A `pop` only runs from [`Session::run_command`],
	/// never as the entry another pop replays.
	pub(crate) async fn dispatch(&self, command: SessionCommand) -> Result<String> {
		match command {
			SessionCommand::Open { placement, target } => {
				let target = Target::parse(&target, &self.workdir)?;
				let outcome = steal::steal(self, target, placement).await?;
				Ok(outcome.to_string())
			}
			SessionCommand::List => Ok(listing::list_all(self).await?.to_string()),
			SessionCommand::Frame { files } => {
				let files = files
					.iter()
					.map(|file| match Target::parse(file, &self.workdir)? {
						Target::Name(path) => Ok(path),
						Target::Reference { .. } => Err(CohortError::InvalidPath(format!("{file}: frames open files by name"))),
					})
					.collect::<Result<Vec<_>>>()?;
				let pid = self.launcher.new_frame(&files)?;
				Ok(format!("frame launched (pid {pid})"))
			}
			SessionCommand::Suspend => {
				self.suspend()?;
				Ok(format!("{} suspended", self.id))
			}
			SessionCommand::Resume => {
				self.resume()?;
				Ok(format!("{} registered", self.id))
			}
			SessionCommand::Push { table, index } => {
				let excerpt = history::push(self, table, index)?;
				Ok(format!("pushed {table} history: {}", history::clean_excerpt(&excerpt)))
			}
			SessionCommand::Pop { .. } => Err(CohortError::InvalidCommand("pop cannot replay another pop".into())),
		}
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("id", &self.id)
			.field("runtime_dir", &self.layout.root())
			.field("liveness", &self.liveness())
			.finish_non_exhaustive()
	}
}
