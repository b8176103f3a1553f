use super::*;

#[test]
fn recording_renderer_keeps_order() {
    let r = RecordingRenderer::new();
    r.run(&RenderCommand::from_tokens(["ffmpeg", "-i", "a"])).unwrap();
    r.run(&RenderCommand::from_tokens(["ffmpeg", "-i", "b"])).unwrap();
    assert_eq!(r.commands(), vec!["ffmpeg -i a", "ffmpeg -i b"]);
}

#[test]
fn missing_tool_is_not_on_path() {
    assert!(!is_tool_on_path("cuecast-definitely-not-a-real-binary"));
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a").join("b").join("out.mp4");
    ensure_parent_dir(&target).unwrap();
    assert!(target.parent().unwrap().is_dir());
}

#[cfg(unix)]
#[test]
fn shell_renderer_reports_failure_with_output() {
    let err = ShellRenderer::default()
        .run(&RenderCommand::from_tokens(["echo", "boom", ">&2;", "exit", "3"]))
        .unwrap_err();
    match err {
        CuecastError::Render { status, output } => {
            assert!(status.contains('3'), "{status}");
            assert_eq!(output, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn shell_renderer_runs_in_its_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "ok").unwrap();
    let out = ShellRenderer::in_dir(dir.path())
        .run(&RenderCommand::from_tokens(["cat", "marker.txt"]))
        .unwrap();
    assert_eq!(out.stdout.trim(), "ok");
}

#[cfg(unix)]
#[test]
fn shell_renderer_kills_command_at_deadline() {
    let started = Instant::now();
    let err = ShellRenderer::default()
        .with_timeout(Duration::from_millis(200))
        .run(&RenderCommand::from_tokens(["sleep", "5"]))
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(4));
    match err {
        CuecastError::Render { status, output } => {
            assert_eq!(status, "timed out");
            assert!(output.contains("sleep 5"), "{output}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn shell_renderer_finishes_within_deadline() {
    let out = ShellRenderer::default()
        .with_timeout(Duration::from_secs(10))
        .run(&RenderCommand::from_tokens(["echo", "done"]))
        .unwrap();
    assert_eq!(out.stdout.trim(), "done");
}

#[cfg(unix)]
#[test]
fn output_with_timeout_returns_none_for_hung_child() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let started = Instant::now();
    let out = output_with_timeout(&mut cmd, Some(Duration::from_millis(100))).unwrap();
    assert!(out.is_none());
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn output_with_timeout_captures_both_streams() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo out; echo err >&2; exit 2"]);
    let out = output_with_timeout(&mut cmd, Some(Duration::from_secs(10)))
        .unwrap()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "out");
    assert_eq!(String::from_utf8_lossy(&out.stderr).trim(), "err");
}
