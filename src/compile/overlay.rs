//! Text overlay compilation.

use std::path::PathBuf;

use crate::{
    compile::{
        node::{AlphaCurve, DrawTextNode, Position, TextSource},
        syntax::CHAIN_SEPARATOR,
    },
    composition::config::OverlayStyle,
    timeline::window::TimeWindow,
};

#[derive(Clone, Debug, PartialEq)]
/// A caption to draw over the video.
pub struct TextOverlay {
    pub content: TextSource,
    pub font_file: String,
    pub font_size: u32,
    pub font_color: String,
    pub position: Position,
    pub line_height: Option<u32>,
    /// Visibility window; `None` shows the overlay for the whole composition.
    pub window: Option<TimeWindow>,
    /// Shift applied to both bounds of `window`.
    pub delay: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl TextOverlay {
    /// Overlay reading its text from `path`, styled by `style`.
    pub fn from_file(
        path: impl Into<PathBuf>,
        font_file: impl Into<String>,
        style: &OverlayStyle,
        window: Option<TimeWindow>,
    ) -> Self {
        Self {
            content: TextSource::File(path.into()),
            font_file: font_file.into(),
            font_size: style.font_size,
            font_color: style.font_color.clone(),
            position: style.position.clone(),
            line_height: style.line_height,
            window,
            delay: 0.0,
            fade_in: style.fade_in,
            fade_out: style.fade_out,
        }
    }

    /// Unfaded overlay with literal text.
    pub fn inline(
        text: impl Into<String>,
        font_file: impl Into<String>,
        font_size: u32,
        font_color: impl Into<String>,
        position: Position,
        window: Option<TimeWindow>,
    ) -> Self {
        Self {
            content: TextSource::Inline(text.into()),
            font_file: font_file.into(),
            font_size,
            font_color: font_color.into(),
            position,
            line_height: None,
            window,
            delay: 0.0,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }

    pub fn with_fades(mut self, fade_in: f64, fade_out: f64) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Fade lengths that fit inside `window`, or `None` when no fade should be drawn.
///
/// Fades that together exceed the window are scaled down by the same factor.
pub fn fitted_fades(window: TimeWindow, fade_in: f64, fade_out: f64) -> Option<(f64, f64)> {
    if !(fade_in > 0.0 && fade_out > 0.0) {
        return None;
    }
    let len = window.duration();
    if len <= 0.0 {
        return None;
    }
    let total = fade_in + fade_out;
    if total <= len {
        return Some((fade_in, fade_out));
    }
    let scale = len / total;
    Some((fade_in * scale, fade_out * scale))
}

/// Build the typed drawtext node for `overlay`.
pub fn overlay_node(overlay: &TextOverlay) -> DrawTextNode {
    let enable = overlay.window.map(|w| w.shifted(overlay.delay));
    let alpha = enable.and_then(|window| {
        fitted_fades(window, overlay.fade_in, overlay.fade_out).map(|(fade_in, fade_out)| {
            AlphaCurve {
                window,
                fade_in,
                fade_out,
            }
        })
    });
    DrawTextNode {
        source: overlay.content.clone(),
        font_file: overlay.font_file.clone(),
        font_size: overlay.font_size,
        font_color: overlay.font_color.clone(),
        line_spacing: overlay.line_height,
        position: overlay.position.clone(),
        enable,
        alpha,
    }
}

/// Serialized drawtext filter, followed by the chain separator unless `is_last`.
pub fn compile_overlay(overlay: &TextOverlay, is_last: bool) -> String {
    let mut out = overlay_node(overlay).to_string();
    if !is_last {
        out.push(CHAIN_SEPARATOR);
    }
    out
}

/// Serialized `-vf` chain for `overlays`, in order.
pub fn compile_overlay_chain(overlays: &[TextOverlay]) -> String {
    let last = overlays.len().saturating_sub(1);
    overlays
        .iter()
        .enumerate()
        .map(|(i, o)| compile_overlay(o, i == last))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/compile/overlay.rs"]
mod tests;
