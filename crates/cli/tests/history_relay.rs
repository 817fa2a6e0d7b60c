mod common;

use cohort::editor::Editor;
use cohort_protocol::HistoryTable;
use common::Cluster;

#[tokio::test]
async fn pushed_search_runs_in_another_session() {
	let cluster = Cluster::new();
	let source = cluster.spawn("SOURCE", &[]);
	let sink = cluster.spawn("SINK", &[]);
	source.editor.lock().record_history(HistoryTable::Search, "needle");

	let status = source.run("push /").await;
	assert!(status.ok, "{}", status.message);

	let status = sink.run("pop /").await;
	assert!(status.ok, "{}", status.message);
	assert_eq!(status.message, "needle");

	let editor = sink.editor.lock();
	assert!(editor.executed().contains(&(HistoryTable::Search, "needle".to_string())));
	assert_eq!(editor.register('/'), Some("needle"));
}

#[tokio::test]
async fn command_push_skips_its_own_entry_and_pop_is_repeatable() {
	let cluster = Cluster::new();
	let source = cluster.spawn("SOURCE", &["a.txt", "b.txt"]);
	let sink = cluster.spawn("SINK", &[]);

	assert!(source.run("ls").await.ok);
	let status = source.run("push").await;
	assert!(status.ok, "{}", status.message);
	assert_eq!(status.message, "pushed : history: ls");

	for _ in 0..2 {
		let status = sink.run("pop").await;
		assert!(status.ok, "{}", status.message);
		assert!(status.message.contains("1: SOURCE"), "{}", status.message);
		assert!(status.message.contains("local: SINK"), "{}", status.message);
	}

	let editor = sink.editor.lock();
	let newest = editor.render_history(HistoryTable::Cmd, -1).unwrap();
	assert!(newest.ends_with("  ls\n"), "{newest}");
	// `:` is read-only; the failed register write does not fail the pop.
	assert_eq!(editor.register(':'), None);
}

#[tokio::test]
async fn popped_edit_steals_the_file_into_the_popping_session() {
	let cluster = Cluster::new();
	let source = cluster.spawn("SOURCE", &["other.txt"]);
	let sink = cluster.spawn("SINK", &[]);
	let fresh = cluster.file("fresh.txt");

	assert!(source.run("edit fresh.txt").await.ok);
	assert!(source.run("push").await.ok);

	let status = sink.run("pop").await;
	assert!(status.ok, "{}", status.message);
	assert!(status.message.contains("taken from SOURCE"), "{}", status.message);
	assert!(sink.has_buffer(&fresh));
	assert!(!source.has_buffer(&fresh));
}

#[tokio::test]
async fn popped_pop_is_refused_and_foreign_lines_reach_the_editor() {
	let cluster = Cluster::new();
	let source = cluster.spawn("SOURCE", &[]);
	let sink = cluster.spawn("SINK", &[]);

	source.editor.lock().record_history(HistoryTable::Cmd, "pop /");
	assert!(source.run("push").await.ok);
	let status = sink.run("pop").await;
	assert!(!status.ok);
	assert!(status.message.contains("is itself a pop"), "{}", status.message);

	source.editor.lock().record_history(HistoryTable::Cmd, "set number");
	assert!(source.run("push").await.ok);
	let status = sink.run("pop").await;
	assert!(status.ok, "{}", status.message);
	assert_eq!(status.message, "set number");
	assert!(sink.editor.lock().executed().contains(&(HistoryTable::Cmd, "set number".to_string())));
}

#[tokio::test]
async fn search_entry_keeps_trailing_space() {
	let cluster = Cluster::new();
	let source = cluster.spawn("SOURCE", &[]);
	let sink = cluster.spawn("SINK", &[]);
	source.editor.lock().record_history(HistoryTable::Search, "foo ");

	assert!(source.run("push /").await.ok);
	let status = sink.run("pop /").await;
	assert_eq!(status.message, "foo ");
	assert_eq!(sink.editor.lock().register('/'), Some("foo "));
}

#[tokio::test]
async fn last_push_wins() {
	let cluster = Cluster::new();
	let first = cluster.spawn("FIRST", &[]);
	let second = cluster.spawn("SECOND", &[]);
	first.editor.lock().record_history(HistoryTable::Expr, "1 + 1");
	second.editor.lock().record_history(HistoryTable::Expr, "2 * 21");

	assert!(first.run("push =").await.ok);
	assert!(second.run("push =").await.ok);

	let status = first.run("pop =").await;
	assert_eq!(status.message, "2 * 21");
}

#[tokio::test]
async fn empty_slot_and_missing_entries_are_reported() {
	let cluster = Cluster::new();
	let me = cluster.spawn("ME", &[]);

	let status = me.run("pop").await;
	assert!(!status.ok);
	assert!(status.message.contains("history slot is empty"), "{}", status.message);

	let status = me.run("push / -1").await;
	assert!(!status.ok);
	assert!(status.message.contains("no / history entry at index -1"), "{}", status.message);
}
