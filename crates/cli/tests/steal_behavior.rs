mod common;

use cohort::editor::Editor;
use cohort::session::{EndpointStore, SessionEndpoint};
use cohort_protocol::{BufferInfo, SessionId, SessionRequest, SessionResponse};
use common::Cluster;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

#[tokio::test]
async fn clean_remote_file_moves_with_its_view() {
	let cluster = Cluster::new();
	let owner = cluster.spawn("OWNER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &[]);
	let a = cluster.file("a.txt");
	{
		let mut editor = owner.editor.lock();
		editor.set_cursor(&a, 40, 3).unwrap();
		editor.set_top_line(&a, 31).unwrap();
		editor.add_fold(&a, 10, 20, true).unwrap();
	}

	let status = me.run("edit a.txt").await;
	assert!(status.ok, "{}", status.message);
	assert!(status.message.contains("taken from OWNER"), "{}", status.message);

	assert!(!owner.has_buffer(&a));
	let view = me.editor.lock().capture_view(&a).unwrap();
	assert_eq!((view.cursor.line, view.cursor.column), (40, 3));
	assert_eq!(view.top_line, 31);
	assert_eq!(view.folds.len(), 1);
	assert!(view.folds[0].closed);
	assert_eq!(me.editor.lock().current_path(), Some(a.as_path()));
	assert_eq!(cluster.views_left(), 0);
}

#[tokio::test]
async fn modified_remote_file_is_refused_without_changes() {
	let cluster = Cluster::new();
	let owner = cluster.spawn("OWNER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &[]);
	let a = cluster.file("a.txt");
	owner.editor.lock().set_modified(&a, true).unwrap();

	let status = me.run("edit a.txt").await;
	assert!(!status.ok);
	assert!(status.message.contains("modified by session OWNER"), "{}", status.message);

	assert!(owner.has_buffer(&a));
	assert!(!me.has_buffer(&a));
	assert_eq!(owner.editor.lock().buffers().len(), 2);
	assert_eq!(cluster.views_left(), 0);
}

#[tokio::test]
async fn parent_directory_names_are_refused() {
	let cluster = Cluster::new();
	let me = cluster.spawn("ME", &[]);

	let status = me.run("edit ../../etc/passwd").await;
	assert!(!status.ok);
	assert!(status.message.contains("invalid path"), "{}", status.message);
	assert!(me.editor.lock().buffers().is_empty());
}

#[tokio::test]
async fn only_buffer_of_owner_is_not_taken() {
	let cluster = Cluster::new();
	let owner = cluster.spawn("OWNER", &["a.txt"]);
	let me = cluster.spawn("ME", &[]);
	let a = cluster.file("a.txt");

	let status = me.run("edit a.txt").await;
	assert!(!status.ok);
	assert!(status.message.contains("only buffer of session OWNER"), "{}", status.message);
	assert!(owner.has_buffer(&a));
	assert!(!me.has_buffer(&a));
}

#[tokio::test]
async fn unreachable_sessions_are_skipped_during_the_scan() {
	let cluster = Cluster::new();
	cluster.append_registry("GHOST");
	let crashed = cluster.spawn("CRASHED", &["x.txt", "y.txt"]);
	crashed.crash().await;
	let owner = cluster.spawn("OWNER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &[]);

	let status = me.run("edit a.txt").await;
	assert!(status.ok, "{}", status.message);
	assert!(status.message.contains("taken from OWNER"), "{}", status.message);
	assert!(!owner.has_buffer(&cluster.file("a.txt")));
}

#[tokio::test]
async fn ordinal_reference_takes_buffer_by_number() {
	let cluster = Cluster::new();
	let owner = cluster.spawn("OWNER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &["mine.txt"]);
	let b = cluster.file("b.txt");

	let status = me.run("vsplit 1:2").await;
	assert!(status.ok, "{}", status.message);
	assert!(!owner.has_buffer(&b));

	let editor = me.editor.lock();
	assert_eq!(editor.window_count(), 2);
	assert_eq!(editor.current_path(), Some(b.as_path()));
}

#[tokio::test]
async fn bad_references_report_what_is_missing() {
	let cluster = Cluster::new();
	let _owner = cluster.spawn("OWNER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &[]);

	let status = me.run("edit 9:1").await;
	assert!(!status.ok);
	assert!(status.message.contains("ordinal 9"), "{}", status.message);

	let status = me.run("edit 1:42").await;
	assert!(!status.ok);
	assert!(status.message.contains("no buffer 42"), "{}", status.message);
}

#[tokio::test]
async fn unknown_files_open_as_new_buffers() {
	let cluster = Cluster::new();
	let _other = cluster.spawn("OTHER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &[]);

	let status = me.run("sp fresh.txt").await;
	assert!(status.ok, "{}", status.message);
	assert!(status.message.ends_with("[New]"), "{}", status.message);
	assert!(me.has_buffer(&cluster.file("fresh.txt")));
}

#[tokio::test]
async fn local_buffers_attach_without_asking_peers() {
	let cluster = Cluster::new();
	let other = cluster.spawn("OTHER", &["a.txt", "b.txt"]);
	let me = cluster.spawn("ME", &["a.txt", "c.txt"]);

	let status = me.run("e a.txt").await;
	assert!(status.ok, "{}", status.message);
	assert!(!status.message.contains("taken from"), "{}", status.message);
	assert!(other.has_buffer(&cluster.file("a.txt")));
	assert_eq!(me.editor.lock().current_path(), Some(cluster.file("a.txt").as_path()));
}

#[tokio::test]
async fn unreadable_snapshot_still_moves_the_file() {
	let cluster = Cluster::new();
	let me = cluster.spawn("ME", &[]);
	let a = cluster.file("a.txt");
	let layout = me.session.layout().clone();
	let owner_id = SessionId::new("BROKEN").unwrap();

	// An owner that releases the buffer but leaves an unparsable snapshot.
	let socket = layout.socket(&owner_id);
	let listener = UnixListener::bind(&socket).unwrap();
	EndpointStore::new(layout.endpoints_dir())
		.save(&SessionEndpoint::current(owner_id.clone(), socket))
		.unwrap();
	cluster.append_registry("BROKEN");

	let snapshot = layout.views_dir().join("broken.json");
	let buffer = BufferInfo {
		number: 1,
		path: a.clone(),
		loaded: true,
		writable: true,
		modified: false,
		visible: true,
	};
	let owner = tokio::spawn(async move {
		loop {
			let (stream, _) = listener.accept().await.unwrap();
			let (read, mut write) = stream.into_split();
			let mut line = String::new();
			BufReader::new(read).read_line(&mut line).await.unwrap();
			let response = match serde_json::from_str::<SessionRequest>(&line).unwrap() {
				SessionRequest::Probe { .. } => SessionResponse::Buffer {
					buffer: Some(buffer.clone()),
				},
				SessionRequest::Release { .. } => {
					std::fs::create_dir_all(snapshot.parent().unwrap()).unwrap();
					std::fs::write(&snapshot, "{ not a view").unwrap();
					SessionResponse::Released {
						snapshot: snapshot.clone(),
					}
				}
				other => panic!("unexpected request {other:?}"),
			};
			let mut reply = serde_json::to_string(&response).unwrap();
			reply.push('\n');
			write.write_all(reply.as_bytes()).await.unwrap();
		}
	});

	let status = me.run("edit a.txt").await;
	assert!(status.ok, "{}", status.message);
	assert!(status.message.contains("taken from BROKEN"), "{}", status.message);
	assert!(me.has_buffer(&a));
	assert_eq!(me.editor.lock().capture_view(&a).unwrap().top_line, 1);
	assert_eq!(cluster.views_left(), 0);
	owner.abort();
}
