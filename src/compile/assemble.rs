//! Command assembly.
//!
//! Token order is fixed; see [`assemble`].

use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
};

use crate::{
    compile::{
        node::CompiledGraph,
        overlay::{TextOverlay, compile_overlay_chain},
        syntax::shell_quote,
    },
    foundation::error::{CuecastError, CuecastResult},
};

/// Flags appended to a final, delivery-ready render (after the audio codec).
const FINAL_FLAGS: [&str; 10] = [
    "-movflags",
    "+faststart",
    "-tune",
    "fastdecode",
    "-crf",
    "31",
    "-pix_fmt",
    "yuv420p",
    "-level",
    "4.2",
];

#[derive(Clone, Debug, PartialEq, Eq)]
/// An assembled renderer command line.
pub struct RenderCommand(String);

impl RenderCommand {
    /// Join `tokens` with single spaces.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for t in tokens {
            let t = t.as_ref();
            if t.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(t);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RenderCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The primary video input.
pub enum InputSpec {
    /// A single media file.
    File(PathBuf),
    /// A concat list file (`file '<path>'` lines).
    ConcatList(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
/// Output path without its extension, plus the extension.
pub struct OutputTarget {
    pub stem: PathBuf,
    pub ext: String,
}

impl OutputTarget {
    pub fn new(stem: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            ext: ext.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.stem.display(), self.ext))
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Operations that can be applied to a [`CommandSpec`].
pub enum CommandOp {
    /// Mix a compiled audio graph onto the video.
    AddComplexAudio(CompiledGraph),
    /// Draw a text overlay.
    AddText(TextOverlay),
    /// Add a single plain audio track. Not implemented.
    AddAudio(PathBuf),
    /// Concatenate several videos. Not implemented.
    StitchVideos(Vec<PathBuf>),
}

#[derive(Clone, Debug, PartialEq)]
/// Everything [`assemble`] needs to build one command.
pub struct CommandSpec {
    /// Pass `-y`.
    pub overwrite: bool,
    pub input: InputSpec,
    /// Copy every stream (`-c copy`). Incompatible with filters.
    pub stream_copy: bool,
    pub audio_graph: Option<CompiledGraph>,
    /// Drawtext overlays, drawn in order.
    pub overlays: Vec<TextOverlay>,
    /// Append the delivery encoding flags.
    pub finalize: bool,
    pub video_preset: Option<String>,
    pub audio_preset: Option<String>,
    pub output: OutputTarget,
}

impl CommandSpec {
    /// A bare spec: no filters, no presets, not finalized.
    pub fn new(input: InputSpec, output: OutputTarget) -> Self {
        Self {
            overwrite: false,
            input,
            stream_copy: false,
            audio_graph: None,
            overlays: Vec::new(),
            finalize: false,
            video_preset: None,
            audio_preset: None,
            output,
        }
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: CommandOp) -> CuecastResult<()> {
        match op {
            CommandOp::AddComplexAudio(graph) => {
                if self.audio_graph.is_some() {
                    return Err(CuecastError::validation(
                        "command already has an audio graph",
                    ));
                }
                self.audio_graph = Some(graph);
            }
            CommandOp::AddText(overlay) => self.overlays.push(overlay),
            CommandOp::AddAudio(_) => return Err(CuecastError::Unsupported("add audio")),
            CommandOp::StitchVideos(_) => return Err(CuecastError::Unsupported("stitch videos")),
        }
        Ok(())
    }

    fn has_filters(&self) -> bool {
        self.audio_graph.is_some() || !self.overlays.is_empty()
    }
}

/// A path as one shell word.
pub(crate) fn quote_path(path: &Path) -> String {
    shell_quote(&path.display().to_string())
}

/// Assemble `spec` into a command line.
///
/// Tokens, in order: `ffmpeg`, `-y`, the video input, the audio graph inputs, `-c copy`, the
/// filter graph and its maps, the `-vf` chain, the final flags, `-preset:v`, `-preset:a`, and
/// the output path. Optional parts are left out entirely.
#[tracing::instrument(skip(spec), fields(output = ?spec.output.stem))]
pub fn assemble(spec: &CommandSpec) -> CuecastResult<RenderCommand> {
    if spec.stream_copy && spec.has_filters() {
        return Err(CuecastError::validation(
            "stream copy cannot be combined with audio graphs or text overlays",
        ));
    }
    if spec.output.ext.is_empty() {
        return Err(CuecastError::validation("output extension must be non-empty"));
    }

    let mut tokens: Vec<String> = vec!["ffmpeg".to_string()];
    if spec.overwrite {
        tokens.push("-y".to_string());
    }

    match &spec.input {
        InputSpec::File(path) => {
            tokens.push("-i".to_string());
            tokens.push(quote_path(path));
        }
        InputSpec::ConcatList(path) => {
            tokens.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
            tokens.push(quote_path(path));
        }
    }

    if let Some(graph) = &spec.audio_graph {
        graph.verify()?;
        if graph.first_input != 1 {
            return Err(CuecastError::invariant(format!(
                "audio graph starts at input {}, but input 0 is the video and audio starts at 1",
                graph.first_input
            )));
        }
        for input in &graph.inputs {
            tokens.push("-i".to_string());
            tokens.push(quote_path(input));
        }
    }

    if spec.stream_copy {
        tokens.extend(["-c", "copy"].map(String::from));
    }

    if let Some(graph) = &spec.audio_graph {
        tokens.push("-filter_complex".to_string());
        tokens.push(format!("\"{graph}\""));
        tokens.extend(["-map", "0:v", "-map"].map(String::from));
        tokens.push(format!("\"{}\"", graph.output_port()));
    }

    if !spec.overlays.is_empty() {
        tokens.push("-vf".to_string());
        tokens.push(compile_overlay_chain(&spec.overlays));
    }

    if spec.finalize {
        let codec = if spec.audio_graph.is_some() { "aac" } else { "copy" };
        tokens.extend(["-c:a", codec].map(String::from));
        tokens.extend(FINAL_FLAGS.iter().map(|s| s.to_string()));
    }

    if let Some(p) = &spec.video_preset {
        tokens.push("-preset:v".to_string());
        tokens.push(p.clone());
    }
    if let Some(p) = &spec.audio_preset {
        tokens.push("-preset:a".to_string());
        tokens.push(p.clone());
    }

    tokens.push(quote_path(&spec.output.path()));

    let cmd = RenderCommand::from_tokens(tokens);
    tracing::debug!(command = %cmd, "assembled command");
    Ok(cmd)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/assemble.rs"]
mod tests;
