//! Request-scoped files.
//!
//! Every file a request writes is prefixed with its namespace, `<DD-MM-YYYY>-<id>`, so
//! concurrent requests sharing one root never collide.

use std::path::{Path, PathBuf};

use crate::{
    assets::listfile::write_concat_list,
    composition::config::ComposerConfig,
    foundation::error::CuecastResult,
    render::invoke::ensure_parent_dir,
    timeline::accumulate::Timeline,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Caption files of one group, relative to the workspace root.
pub struct CaptionFiles {
    pub title: PathBuf,
    pub body: PathBuf,
    pub intro: Option<PathBuf>,
}

#[derive(Clone, Debug)]
/// The directory a request's files are written under, and the namespace that keeps them apart.
pub struct Workspace {
    root: PathBuf,
    date: String,
    id: u32,
}

impl Workspace {
    /// A workspace under `root` with a fresh request id.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_id(
            root,
            chrono::Local::now().format("%d-%m-%Y").to_string(),
            rand::random::<u32>(),
        )
    }

    /// A workspace with a fixed date and id.
    pub fn with_id(root: impl Into<PathBuf>, date: impl Into<String>, id: u32) -> Self {
        Self {
            root: root.into(),
            date: date.into(),
            id,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> String {
        format!("{}-{}", self.date, self.id)
    }

    /// `<prefix>-<DD-MM-YYYY>-<id>`.
    pub fn output_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.namespace())
    }

    /// Absolute location of a workspace-relative path.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    pub fn caption_files(
        &self,
        cfg: &ComposerConfig,
        text_ref: &str,
        has_intro: bool,
    ) -> CaptionFiles {
        let ns = self.namespace();
        let file = |kind: &str| cfg.text_dir.join(format!("{ns}-{text_ref}-{kind}.txt"));
        CaptionFiles {
            title: file("title"),
            body: file("text"),
            intro: has_intro.then(|| file("intro")),
        }
    }

    /// Create the text and output directories.
    pub fn prepare(&self, cfg: &ComposerConfig) -> CuecastResult<()> {
        use anyhow::Context as _;
        for dir in [&cfg.text_dir, &cfg.output_dir] {
            let dir = self.resolve(dir);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
        }
        Ok(())
    }

    /// Write every span's caption files; returns them in span order.
    pub fn write_captions(
        &self,
        cfg: &ComposerConfig,
        timeline: &Timeline,
    ) -> CuecastResult<Vec<CaptionFiles>> {
        let mut out = Vec::with_capacity(timeline.captions.len());
        for span in &timeline.captions {
            let caption = &span.caption;
            let files = self.caption_files(cfg, &span.text_ref, caption.intro.is_some());
            self.write_text(&files.title, &caption.title)?;
            self.write_text(&files.body, &caption.body)?;
            if let (Some(path), Some(intro)) = (&files.intro, &caption.intro) {
                self.write_text(path, intro)?;
            }
            out.push(files);
        }
        tracing::debug!(groups = out.len(), "caption files written");
        Ok(out)
    }

    /// Write the narration clip list; returns its workspace-relative path.
    pub fn write_audio_list(
        &self,
        cfg: &ComposerConfig,
        timeline: &Timeline,
    ) -> CuecastResult<PathBuf> {
        let rel = cfg.text_dir.join(format!("{}-audio.txt", self.namespace()));
        write_concat_list(&self.resolve(&rel), &timeline.audio_sources())?;
        Ok(rel)
    }

    fn write_text(&self, rel: &Path, body: &str) -> CuecastResult<()> {
        use anyhow::Context as _;
        let path = self.resolve(rel);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/workspace.rs"]
mod tests;
