//! Typed filter-graph nodes.
//!
//! Compilers build these trees; `compile::syntax` is the only place that turns them into the
//! renderer's expression language.

use std::path::PathBuf;

use crate::{
    foundation::error::{CuecastError, CuecastResult},
    timeline::window::TimeWindow,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// One overlay coordinate: fixed pixels or a renderer expression such as `(w-text_w)/2`.
pub enum Coord {
    /// Absolute pixels.
    Px(i32),
    /// Expression evaluated by the renderer.
    Expr(String),
}

impl Coord {
    /// Build an expression coordinate.
    pub fn expr(s: impl Into<String>) -> Self {
        Self::Expr(s.into())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Overlay anchor.
pub struct Position {
    /// Horizontal coordinate.
    pub x: Coord,
    /// Vertical coordinate.
    pub y: Coord,
}

impl Position {
    /// Pixel position.
    pub fn px(x: i32, y: i32) -> Self {
        Self {
            x: Coord::Px(x),
            y: Coord::Px(y),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::px(0, 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Parameter of a delay node.
pub enum DelayAmount {
    /// Master-clock window of the segment, in seconds.
    Window(TimeWindow),
    /// Fixed onset delay in milliseconds.
    Millis(u32),
}

#[derive(Clone, Debug, PartialEq)]
/// Time-shift the audio stream of input `input` and label the result `output`.
pub struct DelayNode {
    /// Renderer input index.
    pub input: usize,
    /// Delay parameter.
    pub amount: DelayAmount,
    /// Output label (without brackets).
    pub output: String,
}

#[derive(Clone, Debug, PartialEq)]
/// Sum labelled audio streams into one.
pub struct MixNode {
    /// Labels to mix, in order.
    pub inputs: Vec<String>,
    /// Output label.
    pub output: String,
}

#[derive(Clone, Debug, PartialEq)]
/// Play labelled streams one after the other.
pub struct ConcatNode {
    /// Labels to concatenate, in order.
    pub inputs: Vec<String>,
    /// Video streams per segment.
    pub video_streams: u32,
    /// Audio streams per segment.
    pub audio_streams: u32,
    /// Output label.
    pub output: String,
}

#[derive(Clone, Debug, PartialEq)]
/// One node of an audio filter graph.
pub enum FilterNode {
    /// Delay node.
    Delay(DelayNode),
    /// Mix node.
    Mix(MixNode),
    /// Concat node.
    Concat(ConcatNode),
}

impl FilterNode {
    fn output(&self) -> &str {
        match self {
            Self::Delay(n) => &n.output,
            Self::Mix(n) => &n.output,
            Self::Concat(n) => &n.output,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A compiled audio graph plus the input files its ports refer to.
///
/// `inputs[k]` is bound to renderer input `first_input + k`.
pub struct CompiledGraph {
    /// Input files, in port order.
    pub inputs: Vec<PathBuf>,
    /// Renderer input index of `inputs[0]`.
    pub first_input: usize,
    /// Delay nodes in port order, followed by exactly one terminal node.
    pub nodes: Vec<FilterNode>,
    /// Label of the terminal node's output.
    pub output: String,
}

impl CompiledGraph {
    /// Delay nodes, in port order.
    pub fn delay_nodes(&self) -> impl Iterator<Item = &DelayNode> {
        self.nodes.iter().filter_map(|n| match n {
            FilterNode::Delay(d) => Some(d),
            _ => None,
        })
    }

    /// Bracketed output label, as used by `-map`.
    pub fn output_port(&self) -> String {
        format!("[{}]", self.output)
    }

    /// Check the input-port/label alignment the renderer relies on.
    ///
    /// Delay node `k` must read input `first_input + k` and write `a{first_input + k}`; the
    /// terminal node must consume every delay label in that same order.
    pub fn verify(&self) -> CuecastResult<()> {
        let Some((terminal, delays)) = self.nodes.split_last() else {
            return Err(CuecastError::invariant("graph has no nodes"));
        };
        if delays.len() != self.inputs.len() {
            return Err(CuecastError::invariant(format!(
                "graph has {} delay nodes for {} inputs",
                delays.len(),
                self.inputs.len()
            )));
        }

        let mut labels = Vec::with_capacity(delays.len());
        for (k, node) in delays.iter().enumerate() {
            let FilterNode::Delay(d) = node else {
                return Err(CuecastError::invariant(format!(
                    "node {k} precedes the terminal node but is not a delay node"
                )));
            };
            let port = self.first_input + k;
            if d.input != port || d.output != format!("a{port}") {
                return Err(CuecastError::invariant(format!(
                    "delay node {k} reads input {} into '{}', expected input {port} into 'a{port}'",
                    d.input, d.output
                )));
            }
            labels.push(d.output.as_str());
        }

        let consumed: Vec<&str> = match terminal {
            FilterNode::Mix(m) => m.inputs.iter().map(String::as_str).collect(),
            FilterNode::Concat(c) => c.inputs.iter().map(String::as_str).collect(),
            FilterNode::Delay(_) => {
                return Err(CuecastError::invariant(
                    "graph must end with a mix or concat node",
                ));
            }
        };
        if consumed != labels {
            return Err(CuecastError::invariant(format!(
                "terminal node consumes {consumed:?}, expected {labels:?}"
            )));
        }
        if terminal.output() != self.output {
            return Err(CuecastError::invariant(format!(
                "terminal node writes '{}', graph declares '{}'",
                terminal.output(),
                self.output
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Where a drawtext overlay gets its text.
pub enum TextSource {
    /// Read from a UTF-8 file.
    File(PathBuf),
    /// Literal text.
    Inline(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Piecewise opacity: 0, ramp up over `fade_in`, hold 1, ramp down over `fade_out`, 0.
pub struct AlphaCurve {
    /// Visible window (already shifted by any overlay delay).
    pub window: TimeWindow,
    /// Fade-in seconds, > 0.
    pub fade_in: f64,
    /// Fade-out seconds, > 0.
    pub fade_out: f64,
}

impl AlphaCurve {
    /// Start of the fade-in ramp.
    pub fn fade_in_start(&self) -> f64 {
        self.window.from
    }

    /// End of the fade-in ramp.
    pub fn fade_in_end(&self) -> f64 {
        self.window.from + self.fade_in
    }

    /// Start of the fade-out ramp.
    pub fn fade_out_start(&self) -> f64 {
        self.window.to - self.fade_out
    }

    /// End of the fade-out ramp.
    pub fn fade_out_end(&self) -> f64 {
        self.window.to
    }

    /// Opacity at `t`, branch for branch the same function the serialized form encodes.
    pub fn eval(&self, t: f64) -> f64 {
        if t < self.fade_in_start() {
            0.0
        } else if t < self.fade_in_end() {
            (t - self.fade_in_start()) / self.fade_in
        } else if t < self.fade_out_start() {
            1.0
        } else if t < self.fade_out_end() {
            1.0 - (t - self.fade_out_start()) / self.fade_out
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A typed drawtext filter.
pub struct DrawTextNode {
    /// Text source.
    pub source: TextSource,
    /// Font file path.
    pub font_file: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Font color.
    pub font_color: String,
    /// Extra line spacing.
    pub line_spacing: Option<u32>,
    /// Anchor.
    pub position: Position,
    /// Visibility gate; `None` keeps the overlay on for the whole composition.
    pub enable: Option<TimeWindow>,
    /// Opacity curve; only present alongside `enable`.
    pub alpha: Option<AlphaCurve>,
}

#[cfg(test)]
#[path = "../../tests/unit/compile/node.rs"]
mod tests;
