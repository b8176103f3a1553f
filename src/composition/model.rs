use crate::foundation::error::{CuecastError, CuecastResult};

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// A render request as posted by the front-end.
///
/// Every video in `payload` is placed on the same master timeline, in order.
pub struct RenderRequest {
    /// Videos to compose, in timeline order.
    pub payload: Vec<VideoRequest>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One base video and the narrated option groups laid over it.
pub struct VideoRequest {
    /// Base video identifier; also names the pre-rendered base video file.
    pub id: String,
    /// Display name (informational).
    #[serde(default)]
    pub name: String,
    /// Requested file name (informational).
    #[serde(default)]
    pub file_name: String,
    /// Option groups in timeline order.
    #[serde(default, rename = "parentOptions")]
    pub groups: Vec<OptionGroup>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A titled group of options with optional narration of its own.
pub struct OptionGroup {
    /// Group identifier (informational).
    #[serde(default)]
    pub id: i64,
    /// Caption title.
    #[serde(default)]
    pub name: String,
    /// Introductory description, written next to the introduction narration.
    #[serde(default)]
    pub description: String,
    /// Narration played when the group has no introduction.
    #[serde(default)]
    pub audio_name: Option<String>,
    /// Introduction narration; takes precedence over `audio_name`.
    #[serde(default)]
    pub introduction: Option<String>,
    /// Sub-options; only active ones contribute to the timeline.
    #[serde(default)]
    pub options: Vec<SubOption>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A selectable option with its own narration clip.
pub struct SubOption {
    /// Option identifier (informational).
    #[serde(default)]
    pub id: i64,
    /// Bullet text shown in the group caption body.
    #[serde(default)]
    pub name: String,
    /// Narration clip name.
    #[serde(default)]
    pub audio_name: String,
    /// Seconds of silence placed before this option's narration.
    #[serde(default)]
    pub delay: f64,
    /// Whether the option was selected.
    #[serde(default)]
    pub active: bool,
}

impl OptionGroup {
    /// The group's own introduction clip, if set.
    pub fn introduction(&self) -> Option<&str> {
        non_empty(self.introduction.as_deref())
    }

    /// The narration clip that leads this group: the introduction when present, otherwise
    /// the group's own audio.
    pub fn narration(&self) -> Option<&str> {
        self.introduction()
            .or_else(|| non_empty(self.audio_name.as_deref()))
    }

    /// Active sub-options in request order.
    pub fn active_options(&self) -> impl Iterator<Item = &SubOption> {
        self.options.iter().filter(|o| o.active)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Names from the request become file names under a configured directory, so they may not
/// leave it or carry control characters.
fn check_file_name(field: &str, name: &str) -> CuecastResult<()> {
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(CuecastError::validation(format!(
            "{field} '{name}' must not contain path separators or '..'"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(CuecastError::validation(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}

impl RenderRequest {
    /// Parse a request from JSON.
    pub fn from_json_str(s: &str) -> CuecastResult<Self> {
        serde_json::from_str(s).map_err(|e| CuecastError::serde(format!("render request: {e}")))
    }

    /// Validate the request before any probing or compilation happens.
    pub fn validate(&self) -> CuecastResult<()> {
        if self.payload.is_empty() {
            return Err(CuecastError::validation(
                "render request payload must be non-empty",
            ));
        }

        for (vi, video) in self.payload.iter().enumerate() {
            if video.id.trim().is_empty() {
                return Err(CuecastError::validation(format!(
                    "payload[{vi}].id must be non-empty"
                )));
            }
            check_file_name(&format!("payload[{vi}].id"), &video.id)?;
            for (gi, group) in video.groups.iter().enumerate() {
                let at = format!("payload[{vi}].parentOptions[{gi}]");
                if let Some(name) = &group.audio_name {
                    check_file_name(&format!("{at}.audioName"), name)?;
                }
                if let Some(name) = &group.introduction {
                    check_file_name(&format!("{at}.introduction"), name)?;
                }
                for (oi, opt) in group.options.iter().enumerate() {
                    let at = || format!("payload[{vi}].parentOptions[{gi}].options[{oi}]");
                    check_file_name(&format!("{}.audioName", at()), &opt.audio_name)?;
                    if !opt.delay.is_finite() || opt.delay < 0.0 {
                        return Err(CuecastError::validation(format!(
                            "{} delay must be finite and >= 0",
                            at()
                        )));
                    }
                    if opt.active && opt.audio_name.trim().is_empty() {
                        return Err(CuecastError::validation(format!(
                            "{} is active but has no audioName",
                            at()
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Stem of the pre-rendered base video: every video id followed by `suffix`, concatenated.
    pub fn base_video_stem(&self, suffix: &str) -> String {
        self.payload
            .iter()
            .map(|v| format!("{}{suffix}", v.id))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
