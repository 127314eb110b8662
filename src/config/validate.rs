use crate::config::model::{BackgroundMode, Emotion, VideoConfig};
use crate::foundation::error::{StoryError, StoryResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathElem {
    Field(&'static str),
    Index(usize),
}

/// One document problem with its JSON path.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    path: Vec<PathElem>,
    /// Description of the problem.
    pub message: String,
}

impl ConfigIssue {
    fn at(path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::from("$");
        for p in &self.path {
            match *p {
                PathElem::Field(name) => {
                    s.push('.');
                    s.push_str(name);
                }
                PathElem::Index(i) => {
                    s.push('[');
                    s.push_str(&i.to_string());
                    s.push(']');
                }
            }
        }
        write!(f, "{s}: {}", self.message)
    }
}

fn join(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Problems that make the whole document unusable.
pub fn fatal_issues(cfg: &VideoConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if cfg.scenes.is_empty() {
        issues.push(ConfigIssue::at(
            &[PathElem::Field("scenes")],
            "at least one scene is required",
        ));
    }
    if cfg.fps == 0 {
        issues.push(ConfigIssue::at(&[PathElem::Field("fps")], "fps must be > 0"));
    }

    let style = &cfg.style;
    if style.background == BackgroundMode::Clips {
        if style.clip_frames == 0 {
            issues.push(ConfigIssue::at(
                &[PathElem::Field("style"), PathElem::Field("clipFrames")],
                "clipFrames must be > 0",
            ));
        } else if style.crossfade_frames.saturating_mul(3) > style.clip_frames {
            issues.push(ConfigIssue::at(
                &[PathElem::Field("style"), PathElem::Field("crossfadeFrames")],
                format!(
                    "crossfadeFrames ({}) must satisfy 3 * crossfadeFrames <= clipFrames ({}) \
                     so consecutive crossfade windows do not overlap and at most two clips blend",
                    style.crossfade_frames, style.clip_frames
                ),
            ));
        }
    }
    if style.default_scene_frames == 0 {
        issues.push(ConfigIssue::at(
            &[PathElem::Field("style"), PathElem::Field("defaultSceneFrames")],
            "defaultSceneFrames must be > 0",
        ));
    }

    let v = cfg.music.volume;
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        issues.push(ConfigIssue::at(
            &[PathElem::Field("music"), PathElem::Field("volume")],
            format!("volume must be within [0, 1], got {v}"),
        ));
    }

    issues
}

/// Scene-level problems the timeline builder resolves by skipping the scene.
pub fn scene_issues(cfg: &VideoConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    for (i, scene) in cfg.scenes.iter().enumerate() {
        let at = |field| [PathElem::Field("scenes"), PathElem::Index(i), field];
        match cfg.speaker(&scene.speaker_id) {
            None => issues.push(ConfigIssue::at(
                &at(PathElem::Field("speakerId")),
                format!("unknown speaker '{}'", scene.speaker_id),
            )),
            Some(sp) if !sp.is_resolvable() => issues.push(ConfigIssue::at(
                &at(PathElem::Field("speakerId")),
                format!("speaker '{}' has no neutral pose", scene.speaker_id),
            )),
            Some(_) => {}
        }
        if Emotion::parse(&scene.emotion_tag).is_none() {
            issues.push(ConfigIssue::at(
                &at(PathElem::Field("emotion")),
                format!("unknown emotion '{}'", scene.emotion_tag),
            ));
        }
        if let Some(secs) = scene.explicit_duration_seconds
            && (!secs.is_finite() || secs <= 0.0)
        {
            issues.push(ConfigIssue::at(
                &at(PathElem::Field("durationOverride")),
                format!("duration override must be positive, got {secs}"),
            ));
        }
        if scene.dialogue_text.trim().is_empty() {
            issues.push(ConfigIssue::at(
                &at(PathElem::Field("dialogue")),
                "dialogue is empty",
            ));
        }
    }
    issues
}

impl VideoConfig {
    /// Reject documents that cannot produce any timeline.
    ///
    /// Per-scene problems are not reported here; they are skipped during timeline building.
    pub fn validate(&self) -> StoryResult<()> {
        let issues = fatal_issues(self);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(StoryError::configuration(join(&issues)))
        }
    }

    /// Like [`VideoConfig::validate`], but scene-level problems are fatal too.
    pub fn validate_strict(&self) -> StoryResult<()> {
        self.validate()?;
        let issues = scene_issues(self);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(StoryError::configuration(join(&issues)))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/validate.rs"]
mod tests;
