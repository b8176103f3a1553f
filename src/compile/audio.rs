//! Audio graph compilation.
//!
//! Two graph shapes exist. The mix graph places every narration segment at its master-clock
//! window and sums them; the stitch graph plays the clips back to back after a fixed delay.

use std::path::{Path, PathBuf};

use crate::{
    compile::{
        assemble::{RenderCommand, quote_path},
        node::{CompiledGraph, ConcatNode, DelayAmount, DelayNode, FilterNode, MixNode},
    },
    composition::config::AudioEncoding,
    foundation::error::{CuecastError, CuecastResult},
    timeline::{accumulate::AudioSegment, window::segment_window},
};

/// Output label of the mix graph.
pub const MIX_OUTPUT: &str = "a";

/// Output label of the stitch graph.
pub const STITCH_OUTPUT: &str = "outa";

/// Compile a mix graph whose clock starts at 0 and whose first audio input is renderer input 1
/// (input 0 being the video).
pub fn compile_audio_graph(segments: &[AudioSegment]) -> CuecastResult<CompiledGraph> {
    compile_audio_graph_at(0.0, 1, segments)
}

/// Compile a mix graph with an explicit clock origin and first input index.
///
/// Segment `k` is bound to input `first_input + k` and delayed to the window produced by
/// sequencing the segments from `origin`.
#[tracing::instrument(skip(segments), fields(segments = segments.len()))]
pub fn compile_audio_graph_at(
    origin: f64,
    first_input: usize,
    segments: &[AudioSegment],
) -> CuecastResult<CompiledGraph> {
    if segments.is_empty() {
        return Err(CuecastError::validation(
            "audio graph needs at least one segment",
        ));
    }

    let mut nodes = Vec::with_capacity(segments.len() + 1);
    let mut labels = Vec::with_capacity(segments.len());
    let mut offset = origin;
    for (k, seg) in segments.iter().enumerate() {
        let (window, next) = segment_window(offset, seg.duration, seg.delay);
        offset = next;
        let port = first_input + k;
        let label = format!("a{port}");
        nodes.push(FilterNode::Delay(DelayNode {
            input: port,
            amount: DelayAmount::Window(window),
            output: label.clone(),
        }));
        labels.push(label);
    }
    nodes.push(FilterNode::Mix(MixNode {
        inputs: labels,
        output: MIX_OUTPUT.to_string(),
    }));

    let graph = CompiledGraph {
        inputs: segments.iter().map(|s| s.source.clone()).collect(),
        first_input,
        nodes,
        output: MIX_OUTPUT.to_string(),
    };
    graph.verify()?;
    Ok(graph)
}

/// Compile a stitch graph: every input delayed by `delay_ms`, then concatenated in order.
#[tracing::instrument(skip(inputs), fields(inputs = inputs.len()))]
pub fn compile_stitch_graph(inputs: &[PathBuf], delay_ms: u32) -> CuecastResult<CompiledGraph> {
    if inputs.is_empty() {
        return Err(CuecastError::validation(
            "stitch graph needs at least one input",
        ));
    }

    let labels: Vec<String> = (0..inputs.len()).map(|i| format!("a{i}")).collect();
    let mut nodes: Vec<FilterNode> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            FilterNode::Delay(DelayNode {
                input: i,
                amount: DelayAmount::Millis(delay_ms),
                output: label.clone(),
            })
        })
        .collect();
    nodes.push(FilterNode::Concat(ConcatNode {
        inputs: labels,
        video_streams: 0,
        audio_streams: 1,
        output: STITCH_OUTPUT.to_string(),
    }));

    let graph = CompiledGraph {
        inputs: inputs.to_vec(),
        first_input: 0,
        nodes,
        output: STITCH_OUTPUT.to_string(),
    };
    graph.verify()?;
    Ok(graph)
}

fn encoding_args(enc: &AudioEncoding) -> [String; 6] {
    [
        "-c:a".to_string(),
        enc.codec.clone(),
        "-b:a".to_string(),
        enc.bitrate.clone(),
        "-ar".to_string(),
        enc.sample_rate.clone(),
    ]
}

/// Command that stitches `inputs` into one audio file at `out`.
pub fn stitch_command(
    inputs: &[PathBuf],
    enc: &AudioEncoding,
    delay_ms: u32,
    out: &Path,
    overwrite: bool,
) -> CuecastResult<RenderCommand> {
    let graph = compile_stitch_graph(inputs, delay_ms)?;

    let mut tokens = vec!["ffmpeg".to_string()];
    if overwrite {
        tokens.push("-y".to_string());
    }
    for input in &graph.inputs {
        tokens.push("-i".to_string());
        tokens.push(quote_path(input));
    }
    tokens.push("-filter_complex".to_string());
    tokens.push(format!("\"{graph}\""));
    tokens.push("-map".to_string());
    tokens.push(format!("\"{}\"", graph.output_port()));
    tokens.extend(encoding_args(enc));
    tokens.extend(
        ["-movflags", "+faststart", "-preset", "slow"]
            .into_iter()
            .map(String::from),
    );
    tokens.push(quote_path(out));

    let cmd = RenderCommand::from_tokens(tokens);
    tracing::debug!(command = %cmd, "assembled stitch command");
    Ok(cmd)
}

/// Command that muxes `audio` onto `video`, copying the video stream.
pub fn combine_command(
    video: &Path,
    audio: &Path,
    enc: &AudioEncoding,
    out: &Path,
    overwrite: bool,
) -> RenderCommand {
    let mut tokens = vec!["ffmpeg".to_string()];
    if overwrite {
        tokens.push("-y".to_string());
    }
    tokens.extend([
        "-i".to_string(),
        quote_path(video),
        "-i".to_string(),
        quote_path(audio),
        "-c:v".to_string(),
        "copy".to_string(),
    ]);
    tokens.extend(encoding_args(enc));
    tokens.extend(
        ["-shortest", "-movflags", "+faststart"]
            .into_iter()
            .map(String::from),
    );
    tokens.push(quote_path(out));

    let cmd = RenderCommand::from_tokens(tokens);
    tracing::debug!(command = %cmd, "assembled combine command");
    cmd
}

#[cfg(test)]
#[path = "../../tests/unit/compile/audio.rs"]
mod tests;
