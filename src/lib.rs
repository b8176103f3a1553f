//! cuecast compiles narrated, captioned compositions into renderer command lines.
//!
//! # Pipeline overview
//!
//! 1. **Accumulate**: request groups are laid out on one master clock (`Timeline`), with
//!    narration durations probed in parallel.
//! 2. **Lay out**: caption bodies are word-wrapped and written to request-scoped text files.
//! 3. **Compile**: the timeline becomes typed filter nodes (delay/mix/concat for audio,
//!    drawtext with a timed alpha curve for captions).
//! 4. **Assemble**: nodes and inputs are serialized into `ffmpeg` command lines, which a
//!    [`Renderer`] runs.
//!
//! Compilation is pure and deterministic for a given request, configuration and set of probed
//! durations. Probing and rendering sit behind the [`DurationProbe`] and [`Renderer`] traits.
#![forbid(unsafe_code)]

pub mod assets;
pub mod compile;
pub mod composition;
pub mod foundation;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod timeline;

pub use assets::probe::{DurationProbe, FfprobeDurationProbe, StaticDurationProbe};
pub use compile::{
    assemble::{CommandOp, CommandSpec, InputSpec, OutputTarget, RenderCommand, assemble},
    audio::{
        combine_command, compile_audio_graph, compile_audio_graph_at, compile_stitch_graph,
        stitch_command,
    },
    node::{CompiledGraph, Coord, DrawTextNode, FilterNode, Position, TextSource},
    overlay::{TextOverlay, compile_overlay, overlay_node},
};
pub use composition::{
    config::{AudioStrategy, ComposerConfig},
    model::RenderRequest,
};
pub use foundation::error::{CuecastError, CuecastResult};
pub use layout::wrap::{GlyphMap, WordWrapper, WrapSpec, replace_glyphs, wrap};
pub use pipeline::{
    compose::{Composer, Composition, RenderStep},
    workspace::Workspace,
};
pub use render::invoke::{RecordingRenderer, Renderer, ShellRenderer, is_tool_on_path};
pub use timeline::{
    accumulate::{AudioSegment, Timeline, TimelineAccumulator, TimelineSegment},
    window::{TimeWindow, segment_window},
};
