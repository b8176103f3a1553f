use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

use crate::{
    compile::assemble::RenderCommand,
    foundation::error::{CuecastError, CuecastResult},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Captured output of a successful renderer run.
pub struct RenderOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes assembled commands.
///
/// Shared by concurrent requests, so implementations must be `Send + Sync`.
pub trait Renderer: Send + Sync {
    fn run(&self, command: &RenderCommand) -> CuecastResult<RenderOutput>;
}

/// Runs each command through `sh -c`.
#[derive(Clone, Debug, Default)]
pub struct ShellRenderer {
    dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ShellRenderer {
    /// Run commands with `dir` as the working directory, so relative paths resolve there.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            timeout: None,
        }
    }

    /// Kill any command still running after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Renderer for ShellRenderer {
    fn run(&self, command: &RenderCommand) -> CuecastResult<RenderOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command.as_str()).stdin(Stdio::null());
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        let out = output_with_timeout(&mut cmd, self.timeout)
            .map_err(|e| CuecastError::render("spawn failed", e.to_string()))?
            .ok_or_else(|| {
                CuecastError::render(
                    "timed out",
                    format!(
                        "killed after {:.1}s: {command}",
                        self.timeout.unwrap_or_default().as_secs_f64()
                    ),
                )
            })?;

        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
        if !out.status.success() {
            let mut output = stdout;
            if !output.is_empty() && !stderr.is_empty() {
                output.push('\n');
            }
            output.push_str(&stderr);
            return Err(CuecastError::render(
                out.status.to_string(),
                output.trim().to_string(),
            ));
        }
        Ok(RenderOutput { stdout, stderr })
    }
}

/// Records commands instead of running them.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command seen so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Renderer for RecordingRenderer {
    fn run(&self, command: &RenderCommand) -> CuecastResult<RenderOutput> {
        let mut commands = self
            .commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        commands.push(command.as_str().to_string());
        Ok(RenderOutput::default())
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `cmd` to completion, capturing stdout and stderr.
///
/// With a `timeout`, the child is killed once the deadline passes and `Ok(None)` is returned.
/// The pipe readers are detached in that case, since a grandchild may still hold the pipes.
pub fn output_with_timeout(
    cmd: &mut Command,
    timeout: Option<Duration>,
) -> std::io::Result<Option<Output>> {
    let Some(timeout) = timeout else {
        return cmd.output().map(Some);
    };

    let mut child = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || drain(stdout));
    let stderr_reader = thread::spawn(move || drain(stderr));

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(Output {
                status,
                stdout: stdout_reader.join().unwrap_or_default(),
                stderr: stderr_reader.join().unwrap_or_default(),
            }));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "child process killed at deadline"
            );
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

pub fn is_tool_on_path(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> CuecastResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/invoke.rs"]
mod tests;
