//! Concat list files, one `file '<path>'` line per input.
//!
//! A single quote inside a path is written as `'\''`, the same way the renderer reads it.

use std::path::{Path, PathBuf};

use crate::foundation::error::{CuecastError, CuecastResult};

/// Render a list file body.
pub fn format_concat_list(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in paths {
        out.push_str("file '");
        out.push_str(&p.display().to_string().replace('\'', "'\\''"));
        out.push_str("'\n");
    }
    out
}

/// Write `paths` to a list file at `list_path`, creating parent directories.
pub fn write_concat_list(list_path: &Path, paths: &[PathBuf]) -> CuecastResult<()> {
    use anyhow::Context as _;
    crate::render::invoke::ensure_parent_dir(list_path)?;
    std::fs::write(list_path, format_concat_list(paths))
        .with_context(|| format!("write concat list '{}'", list_path.display()))?;
    Ok(())
}

/// Parse a list file body. Blank lines and `#` comments are skipped.
pub fn parse_concat_list(body: &str) -> CuecastResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for (lineno, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let path = line
            .strip_prefix("file ")
            .map(str::trim)
            .and_then(|rest| rest.strip_prefix('\''))
            .and_then(|rest| rest.strip_suffix('\''))
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                CuecastError::validation(format!(
                    "concat list line {}: expected file '<path>', got '{line}'",
                    lineno + 1
                ))
            })?;
        out.push(PathBuf::from(path.replace("'\\''", "'")));
    }
    Ok(out)
}

pub fn read_concat_list(list_path: &Path) -> CuecastResult<Vec<PathBuf>> {
    use anyhow::Context as _;
    let body = std::fs::read_to_string(list_path)
        .with_context(|| format!("read concat list '{}'", list_path.display()))?;
    parse_concat_list(&body)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/listfile.rs"]
mod tests;
