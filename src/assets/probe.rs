use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    foundation::{
        error::{CuecastError, CuecastResult},
        math::round2,
    },
    render::invoke::output_with_timeout,
};

/// Looks up the playback length of a media file.
///
/// Implementations are shared across the probe pool, so they must be `Send + Sync`.
pub trait DurationProbe: Send + Sync {
    /// Duration of `path` in seconds.
    fn probe_duration(&self, path: &Path) -> CuecastResult<f64>;
}

/// Probe backed by the system `ffprobe` binary.
#[derive(Clone, Debug, Default)]
pub struct FfprobeDurationProbe {
    dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl FfprobeDurationProbe {
    /// Resolve relative paths against `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            timeout: None,
        }
    }

    /// Give up on any single file after `timeout`; the timeout is reported as a probe error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn probe_duration(&self, path: &Path) -> CuecastResult<f64> {
        let mut cmd = std::process::Command::new("ffprobe");
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
            "-i",
        ])
        .arg(path)
        .stdin(std::process::Stdio::null());
        let out = output_with_timeout(&mut cmd, self.timeout)
            .map_err(|e| CuecastError::probe(format!("failed to run ffprobe: {e}")))?
            .ok_or_else(|| {
                CuecastError::probe(format!(
                    "ffprobe timed out after {:.1}s for '{}'",
                    self.timeout.unwrap_or_default().as_secs_f64(),
                    path.display()
                ))
            })?;
        if !out.status.success() {
            return Err(CuecastError::probe(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        parse_duration(&String::from_utf8_lossy(&out.stdout))
            .map_err(|e| CuecastError::probe(format!("'{}': {e}", path.display())))
    }
}

/// Parse ffprobe's bare duration output, rounded to two decimals.
pub fn parse_duration(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    let secs: f64 = trimmed
        .parse()
        .map_err(|_| format!("unparseable duration '{trimmed}'"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("invalid duration {secs}"));
    }
    Ok(round2(secs))
}

/// Probe that answers from a fixed table, for dry runs and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticDurationProbe {
    durations: BTreeMap<PathBuf, f64>,
}

impl StaticDurationProbe {
    pub fn new(durations: impl IntoIterator<Item = (PathBuf, f64)>) -> Self {
        Self {
            durations: durations.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, secs: f64) {
        self.durations.insert(path.into(), secs);
    }

    /// Load a `{ "path": seconds }` JSON object.
    pub fn from_json_file(path: &Path) -> CuecastResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read durations '{}'", path.display()))?;
        let durations: BTreeMap<PathBuf, f64> = serde_json::from_str(&text)
            .map_err(|e| CuecastError::serde(format!("durations '{}': {e}", path.display())))?;
        Ok(Self { durations })
    }
}

impl DurationProbe for StaticDurationProbe {
    fn probe_duration(&self, path: &Path) -> CuecastResult<f64> {
        self.durations
            .get(path)
            .copied()
            .ok_or_else(|| {
                CuecastError::probe(format!("no duration known for '{}'", path.display()))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/probe.rs"]
mod tests;
