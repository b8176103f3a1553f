//! Timeline accumulation.
//!
//! Groups are planned (caption layout, audio paths), probed in parallel, then folded onto the
//! master clock one after another. Every segment is sequenced by [`segment_window`].

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    assets::probe::DurationProbe,
    composition::{
        config::ComposerConfig,
        model::{OptionGroup, VideoRequest},
    },
    foundation::error::CuecastResult,
    timeline::window::{TimeWindow, segment_window},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A narration clip with its probed duration and the silence placed before it.
pub struct AudioSegment {
    /// Clip path.
    pub source: PathBuf,
    /// Probed duration in seconds (0 when probing failed).
    pub duration: f64,
    /// Seconds of silence before the clip.
    pub delay: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Wrapped caption bodies for one group.
pub struct CaptionText {
    pub title: String,
    /// One bullet per active option, each terminated by a newline.
    pub body: String,
    /// Wrapped description; only set for groups with an introduction.
    pub intro: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// The caption span of one option group.
pub struct TimelineSegment {
    /// Position of the group on the timeline.
    pub index: usize,
    /// Stable reference used to name the group's caption files.
    pub text_ref: String,
    /// The group's own narration clip name, if any.
    pub audio_ref: Option<String>,
    /// Span start, absolute seconds.
    pub start: f64,
    /// Span end, absolute seconds.
    pub end: f64,
    /// Silence before the group's own narration.
    pub delay: f64,
    pub caption: CaptionText,
}

impl TimelineSegment {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A clip whose duration could not be determined.
pub struct ProbeFailure {
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Result of accumulating a request onto the master clock.
pub struct Timeline {
    /// Every narration clip, in renderer input order.
    pub audio: Vec<AudioSegment>,
    /// One caption span per option group.
    pub captions: Vec<TimelineSegment>,
    /// Master-clock time at which the first segment is sequenced.
    pub origin: f64,
    /// Master-clock time at which the last segment ends.
    pub content_end: f64,
    /// Length of the whole composition, tail included.
    pub total_duration: f64,
    pub probe_failures: Vec<ProbeFailure>,
}

impl Timeline {
    pub fn audio_sources(&self) -> Vec<PathBuf> {
        self.audio.iter().map(|a| a.source.clone()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Fold state: where the next group starts and which index it gets.
pub struct Cursor {
    pub offset: f64,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
/// A planned group whose clips have been probed.
pub struct ProbedGroup {
    pub text_ref: String,
    pub audio_ref: Option<String>,
    /// The group's own narration.
    pub lead: Option<AudioSegment>,
    /// Active sub-option narration, in request order.
    pub options: Vec<AudioSegment>,
    pub caption: CaptionText,
}

#[derive(Clone, Debug, PartialEq)]
/// A group placed on the master clock.
pub struct PlacedGroup {
    pub segment: TimelineSegment,
    pub audio: Vec<AudioSegment>,
}

/// Place one group at `cursor`.
///
/// The caption span starts once the lead clip's delay has elapsed and ends where the group's
/// last clip ends; the returned cursor points at that end.
pub fn place_group(cursor: Cursor, group: &ProbedGroup) -> (Cursor, PlacedGroup) {
    let lead_delay = group.lead.as_ref().map_or(0.0, |s| s.delay.max(0.0));
    let start = cursor.offset + lead_delay;

    let audio: Vec<AudioSegment> = group
        .lead
        .iter()
        .chain(group.options.iter())
        .cloned()
        .collect();
    let end = audio
        .iter()
        .fold(cursor.offset, |offset, seg| {
            segment_window(offset, seg.duration, seg.delay).1
        })
        .max(start);

    let segment = TimelineSegment {
        index: cursor.index,
        text_ref: group.text_ref.clone(),
        audio_ref: group.audio_ref.clone(),
        start,
        end,
        delay: lead_delay,
        caption: group.caption.clone(),
    };
    (
        Cursor {
            offset: end,
            index: cursor.index + 1,
        },
        PlacedGroup { segment, audio },
    )
}

#[derive(Clone, Debug)]
struct PlannedClip {
    source: PathBuf,
    delay: f64,
}

#[derive(Clone, Debug)]
struct PlannedGroup {
    text_ref: String,
    audio_ref: Option<String>,
    lead: Option<PlannedClip>,
    options: Vec<PlannedClip>,
    caption: CaptionText,
}

impl PlannedGroup {
    fn clips(&self) -> impl Iterator<Item = &PlannedClip> {
        self.lead.iter().chain(self.options.iter())
    }
}

/// Builds a [`Timeline`] from request videos.
pub struct TimelineAccumulator<'a> {
    probe: &'a dyn DurationProbe,
    cfg: &'a ComposerConfig,
}

impl<'a> TimelineAccumulator<'a> {
    pub fn new(probe: &'a dyn DurationProbe, cfg: &'a ComposerConfig) -> Self {
        Self { probe, cfg }
    }

    /// Plan, probe and fold every group of `videos` onto one master clock.
    ///
    /// Probe failures do not abort: the clip is kept with duration 0 and reported in
    /// [`Timeline::probe_failures`]. Caption layout errors do abort.
    #[tracing::instrument(skip(self, videos), fields(videos = videos.len()))]
    pub fn accumulate(&self, videos: &[VideoRequest]) -> CuecastResult<Timeline> {
        let planned = self.plan(videos)?;
        let (probed, probe_failures) = self.probe_all(planned)?;

        let origin = self.cfg.timing.lead_in_sec;
        let mut cursor = Cursor {
            offset: origin,
            index: 0,
        };
        let mut audio = Vec::new();
        let mut captions = Vec::with_capacity(probed.len());
        for group in &probed {
            let (next, placed) = place_group(cursor, group);
            cursor = next;
            audio.extend(placed.audio);
            captions.push(placed.segment);
        }

        let content_end = cursor.offset;
        let timeline = Timeline {
            audio,
            captions,
            origin,
            content_end,
            total_duration: content_end + self.cfg.timing.tail_sec,
            probe_failures,
        };
        tracing::debug!(
            segments = timeline.audio.len(),
            spans = timeline.captions.len(),
            total = timeline.total_duration,
            "timeline accumulated"
        );
        Ok(timeline)
    }

    fn audio_path(&self, name: &str) -> PathBuf {
        self.cfg
            .audio_dir
            .join(format!("{name}.{}", self.cfg.audio_ext))
    }

    fn plan(&self, videos: &[VideoRequest]) -> CuecastResult<Vec<PlannedGroup>> {
        let title = self.cfg.wrap.title_wrapper();
        let body = self.cfg.wrap.body_wrapper();
        let intro = self.cfg.wrap.intro_wrapper();

        let mut out = Vec::new();
        for (vi, video) in videos.iter().enumerate() {
            for (gi, group) in video.groups.iter().enumerate() {
                let mut body_text = String::new();
                for opt in group.active_options() {
                    body_text.push_str(&body.layout(&opt.name)?);
                    body_text.push('\n');
                }
                let caption = CaptionText {
                    title: title.layout(&group.name)?,
                    body: body_text,
                    intro: match group.introduction() {
                        Some(_) => Some(intro.layout(&group.description)?),
                        None => None,
                    },
                };
                out.push(self.plan_group(format!("{vi}-{gi}"), group, caption));
            }
        }
        Ok(out)
    }

    fn plan_group(
        &self,
        text_ref: String,
        group: &OptionGroup,
        caption: CaptionText,
    ) -> PlannedGroup {
        let audio_ref = group.narration().map(str::to_string);
        PlannedGroup {
            text_ref,
            lead: audio_ref.as_deref().map(|name| PlannedClip {
                source: self.audio_path(name),
                delay: self.cfg.timing.narration_delay_sec,
            }),
            audio_ref,
            options: group
                .active_options()
                .map(|opt| PlannedClip {
                    source: self.audio_path(opt.audio_name.trim()),
                    delay: opt.delay,
                })
                .collect(),
            caption,
        }
    }

    fn probe_all(
        &self,
        planned: Vec<PlannedGroup>,
    ) -> CuecastResult<(Vec<ProbedGroup>, Vec<ProbeFailure>)> {
        let sources: Vec<&Path> = planned
            .iter()
            .flat_map(PlannedGroup::clips)
            .map(|c| c.source.as_path())
            .collect();
        let probe = self.probe;
        let results: Vec<CuecastResult<f64>> = sources
            .par_iter()
            .map(|path| probe.probe_duration(path))
            .collect();

        let mut failures = Vec::new();
        let mut durations = Vec::with_capacity(results.len());
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(secs) => durations.push(secs),
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(
                        source = %source.display(),
                        error = %e,
                        "probe failed, using 0s"
                    );
                    failures.push(ProbeFailure {
                        source: source.to_path_buf(),
                        reason: e.to_string(),
                    });
                    durations.push(0.0);
                }
                Err(e) => return Err(e),
            }
        }

        let mut durations = durations.into_iter();
        let mut segment = |clip: PlannedClip| AudioSegment {
            duration: durations.next().unwrap_or(0.0),
            source: clip.source,
            delay: clip.delay,
        };
        let probed = planned
            .into_iter()
            .map(|g| ProbedGroup {
                text_ref: g.text_ref,
                audio_ref: g.audio_ref,
                lead: g.lead.map(&mut segment),
                options: g.options.into_iter().map(&mut segment).collect(),
                caption: g.caption,
            })
            .collect();
        Ok((probed, failures))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/accumulate.rs"]
mod tests;
