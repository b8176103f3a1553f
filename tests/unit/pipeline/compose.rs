use std::path::Path;

use super::*;
use crate::{
    assets::probe::StaticDurationProbe, compile::node::TextSource,
    foundation::error::CuecastError, render::invoke::RecordingRenderer,
};

const REQUEST: &str = r#"{
  "payload": [
    {
      "id": "hjerte",
      "parentOptions": [
        {
          "name": "Motion",
          "description": "Bevæg dig 30 minutter om dagen",
          "introduction": "intro",
          "options": [
            { "name": "Gå ture", "audioName": "walk", "delay": 0.25, "active": true },
            { "name": "Løb", "audioName": "run", "delay": 0.5, "active": false }
          ]
        }
      ]
    }
  ]
}"#;

fn probe() -> Arc<StaticDurationProbe> {
    Arc::new(StaticDurationProbe::new([
        (PathBuf::from("audio/intro.aac"), 3.5),
        (PathBuf::from("audio/walk.aac"), 2.0),
    ]))
}

type Fixture = (tempfile::TempDir, Workspace, Arc<RecordingRenderer>, Composer);

fn setup(cfg: ComposerConfig) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::with_id(dir.path(), "16-10-2026", 1);
    let renderer = Arc::new(RecordingRenderer::new());
    let composer = Composer::new(cfg, probe(), renderer.clone());
    (dir, ws, renderer, composer)
}

fn request() -> RenderRequest {
    RenderRequest::from_json_str(REQUEST).unwrap()
}

#[test]
fn mix_plan_is_a_single_final_command() {
    let (_dir, ws, _renderer, composer) = setup(ComposerConfig::default());
    let comp = composer.plan(&request(), &ws).unwrap();

    assert_eq!(comp.steps.len(), 1);
    assert_eq!(comp.steps[0].label, "final render");
    let cmd = comp.steps[0].command.as_str();
    assert!(
        cmd.starts_with(
            "ffmpeg -y -i videos/hjerte_Long.mp4 -i audio/intro.aac -i audio/walk.aac -filter_complex \"[1:a]adelay=5.25|8.75[a1];[2:a]adelay=9.00|11.00[a2];[a1][a2]amix=inputs=2[a]\" -map 0:v -map \"[a]\" -vf drawtext="
        ),
        "{cmd}"
    );
    assert!(cmd.contains("textfile=text/16-10-2026-1-0-0-title.txt"));
    assert!(cmd.contains("enable='between(t,5.25,11.00)'"));
    assert!(cmd.ends_with(
        "-preset:v ultrafast -preset:a ultrafast videos/output/composition-16-10-2026-1-final.mp4"
    ));

    assert_eq!(comp.audio_graph.as_ref().map(|g| g.inputs.len()), Some(2));
    assert_eq!(comp.overlays.len(), 2);
    assert_eq!(
        comp.output_path,
        PathBuf::from("videos/output/composition-16-10-2026-1-final.mp4")
    );
    assert_eq!(comp.url, "/download?url=composition-16-10-2026-1-final.mp4");
}

#[test]
fn plan_writes_caption_files() {
    let (dir, ws, _renderer, composer) = setup(ComposerConfig::default());
    composer.plan(&request(), &ws).unwrap();

    let text = dir.path().join("text");
    let read = |name: &str| std::fs::read_to_string(text.join(name)).unwrap();
    assert_eq!(read("16-10-2026-1-0-0-title.txt"), "Motion");
    assert_eq!(read("16-10-2026-1-0-0-text.txt"), "  • Gå ture\n");
    assert_eq!(
        read("16-10-2026-1-0-0-intro.txt"),
        "Bevæg dig 30 minutter om dagen"
    );
    assert_eq!(
        read("16-10-2026-1-audio.txt"),
        "file 'audio/intro.aac'\nfile 'audio/walk.aac'\n"
    );
}

#[test]
fn stitch_plan_runs_three_steps() {
    let cfg = ComposerConfig {
        audio_strategy: AudioStrategy::Stitch,
        ..ComposerConfig::default()
    };
    let (_dir, ws, _renderer, composer) = setup(cfg);
    let comp = composer.plan(&request(), &ws).unwrap();

    let labels: Vec<_> = comp.steps.iter().map(|s| s.label).collect();
    assert_eq!(labels, ["stitch audio", "combine audio and video", "final render"]);
    assert!(comp.audio_graph.is_none());
    assert!(
        comp.steps[0]
            .command
            .as_str()
            .contains("concat=n=2:v=0:a=1[outa]")
    );
    assert!(comp.steps[1].command.as_str().ends_with(
        "-shortest -movflags +faststart videos/output/composition-16-10-2026-1-av.mp4"
    ));
    let last = comp.steps[2].command.as_str();
    assert!(last.starts_with("ffmpeg -y -i videos/output/composition-16-10-2026-1-av.mp4 -vf "));
    assert!(last.contains(" -c:a copy "));
}

#[test]
fn branding_overlays_come_first() {
    let cfg = ComposerConfig {
        branding: Some(Branding {
            logo: Some("Cuecast".to_string()),
            title_card: Some("Din plan".to_string()),
            disclaimer: Some("Kun vejledende".to_string()),
            ..Branding::default()
        }),
        ..ComposerConfig::default()
    };
    let (_dir, ws, _renderer, composer) = setup(cfg);
    let comp = composer.plan(&request(), &ws).unwrap();

    assert_eq!(comp.overlays.len(), 5);
    assert_eq!(comp.overlays[0].window, None);
    assert_eq!(comp.overlays[1].window, Some(TimeWindow::new(0.0, 5.0)));
    assert_eq!(comp.overlays[2].window, Some(TimeWindow::new(11.0, 16.0)));
    assert!(
        comp.steps[0]
            .command
            .as_str()
            .contains("-vf drawtext=\"text='Cuecast'")
    );
}

#[test]
fn run_executes_every_step_in_order() {
    let cfg = ComposerConfig {
        audio_strategy: AudioStrategy::Stitch,
        ..ComposerConfig::default()
    };
    let (_dir, ws, renderer, composer) = setup(cfg);
    let comp = composer.run(&request(), &ws).unwrap();

    let expected: Vec<String> = comp
        .steps
        .iter()
        .map(|s| s.command.as_str().to_string())
        .collect();
    assert_eq!(renderer.commands(), expected);
}

#[test]
fn missing_clip_still_plans() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::with_id(dir.path(), "16-10-2026", 2);
    let probe = Arc::new(StaticDurationProbe::new([(
        PathBuf::from("audio/walk.aac"),
        2.0,
    )]));
    let composer = Composer::new(
        ComposerConfig::default(),
        probe,
        Arc::new(RecordingRenderer::new()),
    );

    let comp = composer.plan(&request(), &ws).unwrap();
    assert_eq!(comp.timeline.probe_failures.len(), 1);
    assert_eq!(
        comp.timeline.probe_failures[0].source,
        Path::new("audio/intro.aac")
    );
    assert_eq!(comp.steps.len(), 1);
}

#[test]
fn invalid_request_never_reaches_the_renderer() {
    let (_dir, ws, renderer, composer) = setup(ComposerConfig::default());
    let err = composer
        .run(&RenderRequest::default(), &ws)
        .unwrap_err();
    assert!(matches!(err, CuecastError::Validation(_)));
    assert!(renderer.commands().is_empty());
}

#[test]
fn clip_names_with_shell_characters_are_quoted() {
    let req = RenderRequest::from_json_str(
        r#"{ "payload": [ { "id": "hjerte", "parentOptions": [
            { "name": "Motion", "audioName": "my clip;touch x;#", "options": [] }
        ] } ] }"#,
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::with_id(dir.path(), "16-10-2026", 1);
    let probe = Arc::new(StaticDurationProbe::new([(
        PathBuf::from("audio/my clip;touch x;#.aac"),
        2.0,
    )]));
    let composer = Composer::new(
        ComposerConfig::default(),
        probe,
        Arc::new(RecordingRenderer::new()),
    );

    let comp = composer.plan(&req, &ws).unwrap();
    assert!(comp.timeline.probe_failures.is_empty());
    let cmd = comp.steps[0].command.as_str();
    assert!(
        cmd.contains(" -i 'audio/my clip;touch x;#.aac' -filter_complex "),
        "{cmd}"
    );
}

#[test]
fn branding_text_gets_glyph_substitutions() {
    let cfg = ComposerConfig {
        branding: Some(Branding {
            disclaimer: Some("100% vejledende".to_string()),
            ..Branding::default()
        }),
        ..ComposerConfig::default()
    };
    let (_dir, ws, _renderer, composer) = setup(cfg);
    let comp = composer.plan(&request(), &ws).unwrap();

    assert_eq!(
        comp.overlays[0].content,
        TextSource::Inline("100\\% vejledende".to_string())
    );
    assert!(
        comp.steps[0]
            .command
            .as_str()
            .contains("text='100\\\\% vejledende'")
    );
}
