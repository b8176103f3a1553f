/// A closed `[from, to]` interval on the master clock, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    /// Start, in seconds.
    pub from: f64,
    /// End, in seconds.
    pub to: f64,
}

impl TimeWindow {
    /// Build a window; `to` is clamped so the window is never inverted.
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            from,
            to: to.max(from),
        }
    }

    /// Window length in seconds.
    pub fn duration(&self) -> f64 {
        self.to - self.from
    }

    /// Shift both bounds by `by` seconds.
    pub fn shifted(&self, by: f64) -> Self {
        Self {
            from: self.from + by,
            to: self.to + by,
        }
    }

    /// Whether `t` lies inside the window (inclusive).
    pub fn contains(&self, t: f64) -> bool {
        t >= self.from && t <= self.to
    }
}

/// Place one segment on the master clock.
///
/// The segment waits `delay` seconds after `prior_offset`, then plays for `duration`
/// seconds. Returns its window and the offset the next segment starts from, which is always
/// the window's end. Every segment is sequenced with this rule, the first one included.
pub fn segment_window(prior_offset: f64, duration: f64, delay: f64) -> (TimeWindow, f64) {
    let from = prior_offset + delay.max(0.0);
    let window = TimeWindow::new(from, from + duration.max(0.0));
    (window, window.to)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/window.rs"]
mod tests;
