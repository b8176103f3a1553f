//! Request orchestration: accumulate, write captions, compile, assemble, render.

use std::{path::PathBuf, sync::Arc};

use crate::{
    assets::probe::DurationProbe,
    compile::{
        assemble::{CommandSpec, InputSpec, OutputTarget, RenderCommand, assemble},
        audio::{combine_command, compile_audio_graph_at, stitch_command},
        node::CompiledGraph,
        overlay::TextOverlay,
    },
    composition::{
        config::{AudioStrategy, Branding, ComposerConfig},
        model::RenderRequest,
    },
    foundation::error::CuecastResult,
    layout::wrap::replace_glyphs,
    pipeline::workspace::{CaptionFiles, Workspace},
    render::invoke::Renderer,
    timeline::{
        accumulate::{Timeline, TimelineAccumulator},
        window::TimeWindow,
    },
};

#[derive(Clone, Debug, PartialEq)]
/// One renderer invocation.
pub struct RenderStep {
    pub label: &'static str,
    pub command: RenderCommand,
}

#[derive(Clone, Debug, PartialEq)]
/// Everything compiled for one request.
pub struct Composition {
    pub timeline: Timeline,
    /// Overlays of the final step, in drawing order.
    pub overlays: Vec<TextOverlay>,
    /// The mix graph, when narration is mixed in the final step.
    pub audio_graph: Option<CompiledGraph>,
    /// Renderer invocations, in execution order.
    pub steps: Vec<RenderStep>,
    /// Final output, relative to the workspace root.
    pub output_path: PathBuf,
    /// Download URL of the final output.
    pub url: String,
}

/// Compiles requests and drives the renderer.
///
/// Holds no per-request state, so one composer can serve concurrent requests as long as each
/// gets its own [`Workspace`].
pub struct Composer {
    cfg: ComposerConfig,
    probe: Arc<dyn DurationProbe>,
    renderer: Arc<dyn Renderer>,
}

impl Composer {
    pub fn new(
        cfg: ComposerConfig,
        probe: Arc<dyn DurationProbe>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            cfg,
            probe,
            renderer,
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.cfg
    }

    /// Compile `request`, writing its caption and list files into `ws`.
    #[tracing::instrument(skip(self, request, ws), fields(ns = %ws.namespace()))]
    pub fn plan(&self, request: &RenderRequest, ws: &Workspace) -> CuecastResult<Composition> {
        self.cfg.validate()?;
        request.validate()?;

        let timeline = TimelineAccumulator::new(self.probe.as_ref(), &self.cfg)
            .accumulate(&request.payload)?;

        ws.prepare(&self.cfg)?;
        let captions = ws.write_captions(&self.cfg, &timeline)?;
        ws.write_audio_list(&self.cfg, &timeline)?;

        let mut overlays = self.branding_overlays(&timeline)?;
        overlays.extend(self.caption_overlays(&timeline, &captions));

        let name = ws.output_name(&self.cfg.name_prefix);
        let out_dir = &self.cfg.output_dir;
        let base_video = self.cfg.video_dir.join(format!(
            "{}.{}",
            request.base_video_stem(&self.cfg.base_video_suffix),
            self.cfg.video_ext
        ));
        let final_target =
            OutputTarget::new(out_dir.join(format!("{name}-final")), &self.cfg.video_ext);

        let mut steps = Vec::new();
        let mut audio_graph = None;
        let final_input = match self.cfg.audio_strategy {
            AudioStrategy::Mix => {
                if !timeline.audio.is_empty() {
                    audio_graph = Some(compile_audio_graph_at(
                        timeline.origin,
                        1,
                        &timeline.audio,
                    )?);
                }
                base_video
            }
            AudioStrategy::Stitch if timeline.audio.is_empty() => base_video,
            AudioStrategy::Stitch => {
                let enc = &self.cfg.audio_encoding;
                let audio_out = out_dir.join(format!("{name}-audio.{}", self.cfg.audio_ext));
                let av_out = out_dir.join(format!("{name}-av.{}", self.cfg.video_ext));
                steps.push(RenderStep {
                    label: "stitch audio",
                    command: stitch_command(
                        &timeline.audio_sources(),
                        enc,
                        self.cfg.timing.stitch_delay_ms,
                        &audio_out,
                        self.cfg.overwrite,
                    )?,
                });
                steps.push(RenderStep {
                    label: "combine audio and video",
                    command: combine_command(
                        &base_video,
                        &audio_out,
                        enc,
                        &av_out,
                        self.cfg.overwrite,
                    ),
                });
                av_out
            }
        };

        let mut spec = CommandSpec::new(InputSpec::File(final_input), final_target.clone());
        spec.overwrite = self.cfg.overwrite;
        spec.audio_graph = audio_graph.clone();
        spec.overlays = overlays.clone();
        spec.finalize = true;
        spec.video_preset = self.cfg.presets.video.clone();
        spec.audio_preset = self.cfg.presets.audio.clone();
        steps.push(RenderStep {
            label: "final render",
            command: assemble(&spec)?,
        });

        let url = format!(
            "{}{name}-final.{}",
            self.cfg.public_url_base, self.cfg.video_ext
        );
        tracing::info!(
            steps = steps.len(),
            segments = timeline.audio.len(),
            probe_failures = timeline.probe_failures.len(),
            total = timeline.total_duration,
            "composition planned"
        );

        Ok(Composition {
            timeline,
            overlays,
            audio_graph,
            steps,
            output_path: final_target.path(),
            url,
        })
    }

    /// Run every step of `comp`, stopping at the first failure.
    pub fn execute(&self, comp: &Composition) -> CuecastResult<()> {
        let n = comp.steps.len();
        for (i, step) in comp.steps.iter().enumerate() {
            tracing::info!(step = i + 1, of = n, label = step.label, "render step");
            self.renderer.run(&step.command)?;
        }
        Ok(())
    }

    /// Plan and execute.
    pub fn run(&self, request: &RenderRequest, ws: &Workspace) -> CuecastResult<Composition> {
        let comp = self.plan(request, ws)?;
        self.execute(&comp)?;
        tracing::info!(url = %comp.url, "composition rendered");
        Ok(comp)
    }

    fn caption_overlays(&self, timeline: &Timeline, files: &[CaptionFiles]) -> Vec<TextOverlay> {
        let styles = &self.cfg.captions;
        timeline
            .captions
            .iter()
            .zip(files)
            .flat_map(|(span, files)| {
                let window = Some(span.window());
                [
                    TextOverlay::from_file(&files.title, &styles.font_file, &styles.title, window),
                    TextOverlay::from_file(&files.body, &styles.font_file, &styles.body, window),
                ]
            })
            .collect()
    }

    /// Inline branding text gets the same glyph substitutions as caption files.
    fn branding_overlays(&self, timeline: &Timeline) -> CuecastResult<Vec<TextOverlay>> {
        let Some(b) = &self.cfg.branding else {
            return Ok(Vec::new());
        };
        let total = timeline.total_duration;
        let tail = self.cfg.timing.tail_sec;
        let glyphs = &self.cfg.wrap.glyphs;
        let text = |s: &str, size: u32, position, window| -> CuecastResult<TextOverlay> {
            let s = replace_glyphs(s, glyphs)?;
            Ok(TextOverlay::inline(s, &b.font_file, size, &b.color, position, window))
        };

        let mut out = Vec::new();
        if let Some(logo) = &b.logo {
            out.push(text(logo, b.logo_size, Branding::logo_position(), None)?);
        }
        if let Some(title) = &b.title_card {
            out.push(text(
                title,
                b.title_card_size,
                Branding::centered_position(),
                Some(TimeWindow::new(0.0, timeline.origin)),
            )?);
        }
        if let Some(disclaimer) = &b.disclaimer {
            out.push(text(
                disclaimer,
                b.disclaimer_size,
                Branding::centered_position(),
                Some(TimeWindow::new((total - tail).max(0.0), total)),
            )?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/compose.rs"]
mod tests;
