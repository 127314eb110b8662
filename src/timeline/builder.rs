use crate::config::manifest::AudioManifest;
use crate::config::model::{BackgroundMode, Emotion, Scene, VideoConfig, VisualType};
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{Diagnostic, StoryResult};
use crate::timeline::subclip::{CrossfadeWindow, SubClip, SubClipPlan};

/// Where a scene's background comes from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SceneBackground {
    /// One still image with a slow zoom and pan.
    Image {
        /// Image reference.
        source: String,
    },
    /// Generated clips joined by crossfades.
    Clips {
        /// Clips in playback order.
        clips: Vec<SubClip>,
        /// One window per clip boundary.
        crossfades: Vec<CrossfadeWindow>,
    },
    /// Animated theme gradient.
    Gradient {
        /// Angle at scene start; sweeps 45 degrees over 300 frames.
        base_angle_deg: f64,
    },
}

/// One scene placed on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneWindow {
    /// Index of the scene in the configuration document.
    pub scene_index: usize,
    /// Absolute frames owned by this scene.
    pub range: FrameRange,
    /// Speaker id; look the speaker up in the shared table.
    pub speaker_id: String,
    /// Resolved emotion.
    pub emotion: Emotion,
    /// Pose reference for the emotion (neutral fallback applied).
    pub pose: String,
    /// Layout hint.
    pub visual_type: VisualType,
    /// Highlight phrase, if any.
    pub highlight: Option<String>,
    /// Background source.
    pub background: SceneBackground,
    /// Optional flat tint from the document.
    pub background_color: Option<Color>,
    /// Dialogue audio reference.
    pub audio_path: String,
    /// Where the length came from.
    pub length_source: LengthSource,
}

/// Origin of a scene's frame length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthSource {
    /// `ceil(override * fps)`.
    Override,
    /// Measured audio from the manifest.
    Measured,
    /// `style.defaultSceneFrames`.
    Default,
}

/// Ordered, non-overlapping scene windows covering `[0, total_frames)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Frame rate.
    pub fps: Fps,
    /// Output canvas.
    pub canvas: Canvas,
    /// Placed scenes in document order.
    pub scenes: Vec<SceneWindow>,
    /// Sum of placed scene lengths.
    pub total_frames: u64,
    /// Scenes that were skipped, and why.
    pub diagnostics: Vec<Diagnostic>,
}

impl Timeline {
    /// Scene window containing `frame`.
    pub fn scene_at(&self, frame: FrameIndex) -> Option<&SceneWindow> {
        let idx = self.scenes.partition_point(|w| w.range.end <= frame);
        self.scenes.get(idx).filter(|w| w.range.contains(frame))
    }

    /// Window for a document scene index, `None` when the scene was skipped.
    pub fn window(&self, scene_index: usize) -> Option<&SceneWindow> {
        self.scenes
            .binary_search_by_key(&scene_index, |w| w.scene_index)
            .ok()
            .map(|i| &self.scenes[i])
    }

    /// Whole-composition range.
    pub fn range(&self) -> FrameRange {
        FrameRange::from_start_len(0, self.total_frames)
    }
}

/// Absolute ranges for consecutive lengths laid end to end from frame 0.
pub fn lay_out(lengths: &[u64]) -> Vec<FrameRange> {
    let mut offset = 0u64;
    lengths
        .iter()
        .map(|&len| {
            let r = FrameRange::from_start_len(offset, len);
            offset = r.end.0;
            r
        })
        .collect()
}

/// Converts the document's scene list into a [`Timeline`].
///
/// Scene lengths are taken, in order of precedence, from the explicit override, the audio
/// manifest, or the configured default. Scenes that cannot be resolved are dropped without
/// shifting anything after them.
#[derive(Clone, Copy, Debug)]
pub struct TimelineBuilder<'a> {
    config: &'a VideoConfig,
    manifest: Option<&'a AudioManifest>,
}

struct Resolved<'a> {
    index: usize,
    scene: &'a Scene,
    emotion: Emotion,
    pose: String,
    len: u64,
    length_source: LengthSource,
}

impl<'a> TimelineBuilder<'a> {
    /// Builder over a document without measured audio.
    pub fn new(config: &'a VideoConfig) -> Self {
        Self {
            config,
            manifest: None,
        }
    }

    /// Use measured durations from `manifest`.
    pub fn with_manifest(mut self, manifest: &'a AudioManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Resolve lengths and offsets for every usable scene.
    #[tracing::instrument(skip(self), fields(scenes = self.config.scenes.len()))]
    pub fn build(&self) -> StoryResult<Timeline> {
        let cfg = self.config;
        cfg.validate()?;
        if let Some(m) = self.manifest {
            m.check_consistency(cfg)?;
        }
        let fps = cfg.frame_rate()?;
        let plan = match cfg.style.background {
            BackgroundMode::Clips => Some(SubClipPlan::new(
                cfg.style.clip_frames,
                cfg.style.crossfade_frames,
            )?),
            _ => None,
        };

        let mut diagnostics = Vec::new();
        let resolved = cfg
            .scenes
            .iter()
            .enumerate()
            .filter_map(|(i, scene)| match self.resolve(i, scene, fps) {
                Ok(r) => Some(r),
                Err(d) => {
                    tracing::warn!(scene = i, "skipping scene: {}", d.message);
                    diagnostics.push(d);
                    None
                }
            })
            .collect::<Vec<_>>();

        let lengths = resolved.iter().map(|r| r.len).collect::<Vec<_>>();
        let ranges = lay_out(&lengths);

        let scenes = resolved
            .into_iter()
            .zip(ranges)
            .map(|(r, range)| {
                let background = match (cfg.style.background, plan) {
                    (BackgroundMode::Clips, Some(plan)) => {
                        let (clips, crossfades) = plan.layout(range, r.index);
                        tracing::debug!(
                            scene = r.index,
                            clips = clips.len(),
                            crossfades = crossfades.len(),
                            "sub-clip plan"
                        );
                        SceneBackground::Clips { clips, crossfades }
                    }
                    (BackgroundMode::Gradient, _) => SceneBackground::Gradient {
                        base_angle_deg: 135.0 + (r.index as f64) * 15.0,
                    },
                    _ => SceneBackground::Image {
                        source: r
                            .scene
                            .background_reference
                            .clone()
                            .unwrap_or_else(|| format!("scenes/scene-{}.png", r.index)),
                    },
                };
                let audio_path = self
                    .manifest
                    .and_then(|m| m.entry(r.index))
                    .map(|e| e.audio_path.clone())
                    .unwrap_or_else(|| format!("audio/scene-{}.wav", r.index));

                tracing::debug!(
                    scene = r.index,
                    start = range.start.0,
                    len = range.len_frames(),
                    "placed scene"
                );
                SceneWindow {
                    scene_index: r.index,
                    range,
                    speaker_id: r.scene.speaker_id.clone(),
                    emotion: r.emotion,
                    pose: r.pose,
                    visual_type: r.scene.visual_type,
                    highlight: r
                        .scene
                        .highlight_text
                        .as_ref()
                        .filter(|h| !h.trim().is_empty())
                        .cloned(),
                    background,
                    background_color: r.scene.background_color,
                    audio_path,
                    length_source: r.length_source,
                }
            })
            .collect::<Vec<_>>();

        let total_frames = scenes.last().map_or(0, |w| w.range.end.0);
        tracing::info!(
            placed = scenes.len(),
            skipped = diagnostics.len(),
            total_frames,
            "timeline built"
        );

        Ok(Timeline {
            fps,
            canvas: cfg.canvas(),
            scenes,
            total_frames,
            diagnostics,
        })
    }

    fn resolve(
        &self,
        index: usize,
        scene: &'a Scene,
        fps: Fps,
    ) -> Result<Resolved<'a>, Diagnostic> {
        let skip = |msg: String| Diagnostic::configuration(Some(index), msg);

        let speaker = self
            .config
            .speaker(&scene.speaker_id)
            .ok_or_else(|| skip(format!("unknown speaker '{}'", scene.speaker_id)))?;
        if !speaker.is_resolvable() {
            return Err(skip(format!(
                "speaker '{}' has no neutral pose",
                scene.speaker_id
            )));
        }
        let emotion = Emotion::parse(&scene.emotion_tag)
            .ok_or_else(|| skip(format!("unknown emotion '{}'", scene.emotion_tag)))?;
        let pose = speaker
            .pose_for(emotion)
            .map(str::to_owned)
            .ok_or_else(|| skip(format!("speaker '{}' has no pose", scene.speaker_id)))?;

        let (len, length_source) = if let Some(secs) = scene.explicit_duration_seconds {
            let frames = fps.secs_to_frames_ceil(secs);
            if !secs.is_finite() || frames == 0 {
                return Err(skip(format!("duration override must be positive, got {secs}")));
            }
            (frames, LengthSource::Override)
        } else if let Some(entry) = self.manifest.and_then(|m| m.entry(index)) {
            (entry.frames, LengthSource::Measured)
        } else {
            (self.config.style.default_scene_frames, LengthSource::Default)
        };

        Ok(Resolved {
            index,
            scene,
            emotion,
            pose,
            len,
            length_source,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
