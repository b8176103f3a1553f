use std::path::{Path, PathBuf};

use crate::{
    compile::node::{Coord, Position},
    foundation::error::{CuecastError, CuecastResult},
    layout::wrap::{GlyphMap, WordWrapper, WrapSpec},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Everything about a composition that is not part of the request itself.
///
/// All fields have defaults, so a config file only needs to list what it overrides.
pub struct ComposerConfig {
    /// Where narration clips live, relative to the workspace root.
    pub audio_dir: PathBuf,
    /// Narration clip extension.
    pub audio_ext: String,
    /// Where caption text files and list files are written.
    pub text_dir: PathBuf,
    /// Where pre-rendered base videos live.
    pub video_dir: PathBuf,
    /// Where rendered outputs are written.
    pub output_dir: PathBuf,
    /// Container extension for video inputs and outputs.
    pub video_ext: String,
    /// Appended to each video id to name the base video.
    pub base_video_suffix: String,
    /// Master-clock constants.
    pub timing: TimingConfig,
    /// Caption overlay styling.
    pub captions: CaptionStyles,
    /// Caption text layout.
    pub wrap: WrapConfig,
    /// Fixed logo/title/disclaimer overlays; `None` disables them.
    pub branding: Option<Branding>,
    /// How narration is put on the output's audio track.
    pub audio_strategy: AudioStrategy,
    /// Audio encoding used by the stitch and combine steps.
    pub audio_encoding: AudioEncoding,
    /// Encoder presets appended to the final command.
    pub presets: EncodingPresets,
    /// Pass `-y` to the renderer.
    pub overwrite: bool,
    /// Prepended to the final output file name to build the download URL.
    pub public_url_base: String,
    /// First component of every output name.
    pub name_prefix: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            audio_ext: "aac".to_string(),
            text_dir: PathBuf::from("text"),
            video_dir: PathBuf::from("videos"),
            output_dir: PathBuf::from("videos/output"),
            video_ext: "mp4".to_string(),
            base_video_suffix: "_Long".to_string(),
            timing: TimingConfig::default(),
            captions: CaptionStyles::default(),
            wrap: WrapConfig::default(),
            branding: None,
            audio_strategy: AudioStrategy::default(),
            audio_encoding: AudioEncoding::default(),
            presets: EncodingPresets::default(),
            overwrite: true,
            public_url_base: "/download?url=".to_string(),
            name_prefix: "composition".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Master-clock constants, in seconds unless noted.
pub struct TimingConfig {
    /// Head material before the first caption span (title card).
    pub lead_in_sec: f64,
    /// Tail material after the last span (disclaimer).
    pub tail_sec: f64,
    /// Silence before each group's own narration.
    pub narration_delay_sec: f64,
    /// Fixed per-input delay used when stitching, in milliseconds.
    pub stitch_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lead_in_sec: 5.0,
            tail_sec: 5.0,
            narration_delay_sec: 0.25,
            stitch_delay_ms: 250,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Drawtext styling for one kind of caption.
pub struct OverlayStyle {
    /// Font size in pixels.
    pub font_size: u32,
    /// Renderer color name or `#RRGGBB`.
    pub font_color: String,
    /// Extra spacing between lines, if any.
    pub line_height: Option<u32>,
    /// Anchor position.
    pub position: Position,
    /// Fade-in seconds (0 disables fading).
    pub fade_in: f64,
    /// Fade-out seconds (0 disables fading).
    pub fade_out: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: 40,
            font_color: "black".to_string(),
            line_height: Some(2),
            position: Position::px(52, 124),
            fade_in: 2.0,
            fade_out: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Styling for the per-group caption overlays.
pub struct CaptionStyles {
    /// Font used by every caption overlay.
    pub font_file: String,
    /// Group title.
    pub title: OverlayStyle,
    /// Bulleted option list.
    pub body: OverlayStyle,
}

impl Default for CaptionStyles {
    fn default() -> Self {
        Self {
            font_file: "fonts/TitilliumWeb-SemiBold.ttf".to_string(),
            title: OverlayStyle {
                font_size: 52,
                position: Position::px(52, 64),
                fade_in: 1.3,
                fade_out: 2.0,
                ..OverlayStyle::default()
            },
            body: OverlayStyle::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Word-wrap presets for the three caption bodies.
pub struct WrapConfig {
    /// Group title.
    pub title: WrapSpec,
    /// One bullet per active option.
    pub body: WrapSpec,
    /// Introduction description.
    pub intro: WrapSpec,
    /// Substitutions applied before every wrap.
    pub glyphs: GlyphMap,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            title: WrapSpec::plain(120),
            body: WrapSpec::bullet(60, "  • ", 5),
            intro: WrapSpec::hanging(60, 5),
            glyphs: GlyphMap::renderer_escapes(),
        }
    }
}

impl WrapConfig {
    /// Wrapper for group titles.
    pub fn title_wrapper(&self) -> WordWrapper {
        WordWrapper::new(self.title.clone(), self.glyphs.clone())
    }

    /// Wrapper for bullet bodies.
    pub fn body_wrapper(&self) -> WordWrapper {
        WordWrapper::new(self.body.clone(), self.glyphs.clone())
    }

    /// Wrapper for introduction descriptions.
    pub fn intro_wrapper(&self) -> WordWrapper {
        WordWrapper::new(self.intro.clone(), self.glyphs.clone())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Fixed overlays that frame every composition.
pub struct Branding {
    /// Font used by every branding overlay.
    pub font_file: String,
    /// Color used by every branding overlay.
    pub color: String,
    /// Corner logo text, shown for the whole composition.
    pub logo: Option<String>,
    /// Logo font size.
    pub logo_size: u32,
    /// Centred title card, shown during the lead-in.
    pub title_card: Option<String>,
    /// Title card font size.
    pub title_card_size: u32,
    /// Centred disclaimer, shown during the tail.
    pub disclaimer: Option<String>,
    /// Disclaimer font size.
    pub disclaimer_size: u32,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            font_file: "fonts/TitilliumWeb-SemiBold.ttf".to_string(),
            color: "#B40031".to_string(),
            logo: None,
            logo_size: 48,
            title_card: None,
            title_card_size: 96,
            disclaimer: None,
            disclaimer_size: 32,
        }
    }
}

impl Branding {
    /// Top-right corner anchor, 15px from the edges.
    pub fn logo_position() -> Position {
        Position {
            x: Coord::expr("w-tw-15"),
            y: Coord::Px(15),
        }
    }

    /// Centre-of-frame anchor.
    pub fn centered_position() -> Position {
        Position {
            x: Coord::expr("(w-text_w)/2"),
            y: Coord::expr("(h-text_h)/2"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// How narration reaches the output's audio track.
pub enum AudioStrategy {
    /// Delay-mix every segment onto the base video at its master-clock window, in the final
    /// command.
    #[default]
    Mix,
    /// Concatenate all narration into an intermediate file, mux it with the base video, then
    /// draw the captions.
    Stitch,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Audio encoder settings for the stitch and combine steps.
pub struct AudioEncoding {
    /// Encoder name.
    pub codec: String,
    /// Target bitrate.
    pub bitrate: String,
    /// Output sample rate.
    pub sample_rate: String,
}

impl Default for AudioEncoding {
    fn default() -> Self {
        Self {
            codec: "libfdk_aac".to_string(),
            bitrate: "320k".to_string(),
            sample_rate: "48k".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Encoder presets for the final command.
pub struct EncodingPresets {
    /// `-preset:v` value.
    pub video: Option<String>,
    /// `-preset:a` value.
    pub audio: Option<String>,
}

impl Default for EncodingPresets {
    fn default() -> Self {
        Self {
            video: Some("ultrafast".to_string()),
            audio: Some("ultrafast".to_string()),
        }
    }
}

impl ComposerConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> CuecastResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| CuecastError::serde(format!("config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the config for values the compiler cannot work with.
    pub fn validate(&self) -> CuecastResult<()> {
        let t = &self.timing;
        for (name, v) in [
            ("timing.lead_in_sec", t.lead_in_sec),
            ("timing.tail_sec", t.tail_sec),
            ("timing.narration_delay_sec", t.narration_delay_sec),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CuecastError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }

        for (name, style) in [
            ("captions.title", &self.captions.title),
            ("captions.body", &self.captions.body),
        ] {
            if !style.fade_in.is_finite() || !style.fade_out.is_finite() {
                return Err(CuecastError::validation(format!(
                    "{name} fades must be finite"
                )));
            }
            if style.font_size == 0 {
                return Err(CuecastError::validation(format!(
                    "{name}.font_size must be non-zero"
                )));
            }
        }
        if self.captions.font_file.trim().is_empty() {
            return Err(CuecastError::validation(
                "captions.font_file must be non-empty",
            ));
        }

        for spec in [&self.wrap.title, &self.wrap.body, &self.wrap.intro] {
            spec.validate()?;
        }
        self.wrap.glyphs.validate()?;

        if self.audio_ext.is_empty() || self.video_ext.is_empty() {
            return Err(CuecastError::validation(
                "audio_ext and video_ext must be non-empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/config.rs"]
mod tests;
