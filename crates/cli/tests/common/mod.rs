#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cohort::channel::{Channel, SessionServer};
use cohort::config::Config;
use cohort::editor::{EditorHandle, MemoryEditor};
use cohort::session::{CommandStatus, Session};
use cohort_protocol::SessionId;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Sessions sharing one temporary runtime directory, all served in-process.
pub struct Cluster {
	pub tmp: TempDir,
	pub config: Config,
}

impl Cluster {
	pub fn new() -> Self {
		let tmp = TempDir::new().expect("temp dir");
		std::fs::create_dir_all(tmp.path().join("work")).expect("workdir");
		std::fs::create_dir_all(tmp.path().join("run")).expect("runtime dir");
		let mut config = Config::with_runtime_dir(tmp.path().join("run"));
		config.rpc_timeout_ms = 500;
		Self { tmp, config }
	}

	pub fn workdir(&self) -> PathBuf {
		self.tmp.path().join("work")
	}

	/// Absolute path of a file in the shared working directory.
	pub fn file(&self, name: &str) -> PathBuf {
		self.workdir().join(name)
	}

	/// Boots, serves and registers a session with `files` open.
	pub fn spawn(&self, name: &str, files: &[&str]) -> Node {
		let editor = Arc::new(Mutex::new(
			MemoryEditor::with_files(files.iter().map(|f| self.file(f))).expect("editor"),
		));
		let handle: EditorHandle = editor.clone();
		let session = Arc::new(
			Session::new(&self.config, SessionId::new(name).expect("session id"), handle, self.workdir()).expect("session"),
		);
		let server = SessionServer::bind(Arc::clone(&session)).expect("bind");
		session.register().expect("register");
		let task = tokio::spawn(async move {
			let _ = server.run().await;
		});
		Node {
			session,
			editor,
			task: Some(task),
		}
	}

	/// Appends a raw line to the registry, bypassing any session.
	pub fn append_registry(&self, line: &str) {
		let path = self.config.layout().registry();
		let mut content = std::fs::read_to_string(&path).unwrap_or_default();
		content.push_str(line);
		content.push('\n');
		std::fs::write(path, content).expect("write registry");
	}

	pub fn registry_ids(&self) -> Vec<String> {
		std::fs::read_to_string(self.config.layout().registry())
			.unwrap_or_default()
			.lines()
			.map(str::to_string)
			.collect()
	}

	pub fn views_left(&self) -> usize {
		std::fs::read_dir(self.config.layout().views_dir()).map(|d| d.count()).unwrap_or(0)
	}

	pub fn channel(&self) -> Channel {
		Channel::new(
			cohort::session::EndpointStore::new(self.config.layout().endpoints_dir()),
			Duration::from_millis(500),
		)
	}
}

pub struct Node {
	pub session: Arc<Session>,
	pub editor: Arc<Mutex<MemoryEditor>>,
	task: Option<JoinHandle<()>>,
}

impl Node {
	pub fn id(&self) -> &SessionId {
		self.session.id()
	}

	pub async fn run(&self, line: &str) -> CommandStatus {
		self.session.run_command(line).await
	}

	pub fn has_buffer(&self, path: &Path) -> bool {
		use cohort::editor::Editor;
		self.editor.lock().buffer_for_path(path).is_some()
	}

	/// Stops serving but leaves the registry entry behind, like a crash.
	pub async fn crash(mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
			let _ = task.await;
		}
	}

	/// Clean exit: deregisters and stops serving.
	pub async fn stop(self) {
		self.session.shutdown().expect("shutdown");
		self.crash().await;
	}
}

impl Drop for Node {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}
