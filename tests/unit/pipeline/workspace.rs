use super::*;
use crate::{
    assets::listfile::read_concat_list,
    timeline::accumulate::{AudioSegment, CaptionText, TimelineSegment},
};

fn timeline() -> Timeline {
    Timeline {
        audio: vec![
            AudioSegment {
                source: PathBuf::from("audio/intro.aac"),
                duration: 3.5,
                delay: 0.25,
            },
            AudioSegment {
                source: PathBuf::from("audio/walk.aac"),
                duration: 2.0,
                delay: 0.25,
            },
        ],
        captions: vec![TimelineSegment {
            index: 0,
            text_ref: "0-0".to_string(),
            audio_ref: Some("intro".to_string()),
            start: 5.25,
            end: 11.0,
            delay: 0.25,
            caption: CaptionText {
                title: "Motion".to_string(),
                body: "  • Walk\n".to_string(),
                intro: Some("Move more".to_string()),
            },
        }],
        origin: 5.0,
        content_end: 11.0,
        total_duration: 16.0,
        probe_failures: Vec::new(),
    }
}

#[test]
fn namespace_and_output_name() {
    let ws = Workspace::with_id("/tmp/ws", "16-10-2026", 42);
    assert_eq!(ws.namespace(), "16-10-2026-42");
    assert_eq!(ws.output_name("composition"), "composition-16-10-2026-42");
}

#[test]
fn fresh_workspaces_are_dated() {
    let ns = Workspace::new("/tmp/ws").namespace();
    assert!(
        chrono::NaiveDate::parse_from_str(&ns[..10], "%d-%m-%Y").is_ok(),
        "{ns}"
    );
    assert!(ns[11..].parse::<u32>().is_ok(), "{ns}");
}

#[test]
fn caption_files_are_namespaced() {
    let ws = Workspace::with_id("/tmp/ws", "01-02-2026", 7);
    let files = ws.caption_files(&ComposerConfig::default(), "1-2", false);
    assert_eq!(files.title, PathBuf::from("text/01-02-2026-7-1-2-title.txt"));
    assert_eq!(files.body, PathBuf::from("text/01-02-2026-7-1-2-text.txt"));
    assert_eq!(files.intro, None);
}

#[test]
fn writes_captions_and_audio_list() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ComposerConfig::default();
    let ws = Workspace::with_id(dir.path(), "01-02-2026", 7);
    ws.prepare(&cfg).unwrap();
    assert!(dir.path().join("videos/output").is_dir());

    let tl = timeline();
    let files = ws.write_captions(&cfg, &tl).unwrap();
    assert_eq!(files.len(), 1);
    let read = |p: &Path| std::fs::read_to_string(ws.resolve(p)).unwrap();
    assert_eq!(read(&files[0].title), "Motion");
    assert_eq!(read(&files[0].body), "  • Walk\n");
    assert_eq!(read(files[0].intro.as_deref().unwrap()), "Move more");

    let list = ws.write_audio_list(&cfg, &tl).unwrap();
    assert_eq!(list, PathBuf::from("text/01-02-2026-7-audio.txt"));
    assert_eq!(
        read_concat_list(&ws.resolve(&list)).unwrap(),
        tl.audio_sources()
    );
}
