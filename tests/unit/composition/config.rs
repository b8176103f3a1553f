use super::*;

#[test]
fn empty_json_yields_defaults() {
    let cfg: ComposerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.timing, TimingConfig::default());
    assert_eq!(cfg.audio_strategy, AudioStrategy::Mix);
    assert_eq!(cfg.wrap.title.width, 120);
    assert_eq!(cfg.wrap.body.prefix, "  • ");
    assert!(cfg.branding.is_none());
    cfg.validate().unwrap();
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let cfg: ComposerConfig = serde_json::from_str(
        r#"{ "timing": { "lead_in_sec": 3.0 }, "audio_strategy": "Stitch" }"#,
    )
    .unwrap();
    assert_eq!(cfg.timing.lead_in_sec, 3.0);
    assert_eq!(cfg.timing.tail_sec, 5.0);
    assert_eq!(cfg.audio_strategy, AudioStrategy::Stitch);
}

#[test]
fn validate_rejects_negative_timing() {
    let mut cfg = ComposerConfig::default();
    cfg.timing.narration_delay_sec = -0.25;
    assert!(matches!(cfg.validate(), Err(CuecastError::Validation(_))));
}

#[test]
fn validate_rejects_glyph_arity_mismatch_as_layout_error() {
    let mut cfg = ComposerConfig::default();
    cfg.wrap.glyphs = GlyphMap::new(["%", "'"], ["\\%"]);
    assert!(matches!(cfg.validate(), Err(CuecastError::LayoutConfig(_))));
}

#[test]
fn from_json_file_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cuecast.json");
    std::fs::write(&path, r#"{ "name_prefix": "mit-hjerte" }"#).unwrap();
    let cfg = ComposerConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.name_prefix, "mit-hjerte");

    std::fs::write(&path, r#"{ "wrap": { "title": { "width": 0 } } }"#).unwrap();
    assert!(ComposerConfig::from_json_file(&path).is_err());
}

#[test]
fn branding_positions_use_renderer_expressions() {
    assert_eq!(Branding::logo_position().x, Coord::expr("w-tw-15"));
    assert_eq!(Branding::centered_position().y, Coord::expr("(h-text_h)/2"));
}
