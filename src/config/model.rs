use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::hash::StableHasher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Declarative video document: speakers, ordered scenes, style and global tracks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConfig {
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Frame rate of the composition.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Speaker table keyed by id.
    #[serde(alias = "characters")]
    pub speakers: BTreeMap<String, Speaker>,
    /// Ordered scene list.
    pub scenes: Vec<Scene>,
    /// Presentation options.
    #[serde(default)]
    pub style: Style,
    /// Looping background music.
    #[serde(default)]
    pub music: Music,
    /// Persistent watermark.
    #[serde(default)]
    pub watermark: Watermark,
}

/// One character that can speak in scenes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    /// Speaker id; when omitted the table key is used.
    #[serde(default)]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Accent color for name badge, subtitle bar and transition wipe.
    #[serde(alias = "color")]
    pub accent_color: Color,
    /// Free-form role label (host, explainer, ...).
    #[serde(default)]
    pub role: String,
    /// Emotion tag to pose image reference. `neutral` is required.
    #[serde(default)]
    pub poses: BTreeMap<String, String>,
    /// Voice reference consumed by the speech collaborator.
    pub voice: Voice,
}

impl Speaker {
    /// A speaker is usable only when it has a `neutral` pose to fall back to.
    pub fn is_resolvable(&self) -> bool {
        self.poses.contains_key(Emotion::Neutral.as_str())
    }

    /// Pose for `emotion`, falling back to `neutral`.
    pub fn pose_for(&self, emotion: Emotion) -> Option<&str> {
        self.poses
            .get(emotion.as_str())
            .or_else(|| self.poses.get(Emotion::Neutral.as_str()))
            .map(String::as_str)
    }
}

/// Reference sample used for voice cloning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Path to the reference audio sample.
    pub ref_audio_path: String,
    /// Transcript of the reference sample.
    pub ref_text: String,
    /// Guidance strength passed through to the synthesizer.
    #[serde(default = "default_cfg_value")]
    pub cfg_value: String,
    /// Diffusion step count passed through to the synthesizer.
    #[serde(default = "default_steps")]
    pub steps: String,
}

/// One dialogue unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Id of the speaking character.
    #[serde(alias = "characterId")]
    pub speaker_id: String,
    /// Spoken text, also used for subtitles.
    #[serde(alias = "dialogue")]
    pub dialogue_text: String,
    /// Emotion tag; parsed with [`Emotion::parse`] at build time.
    #[serde(default = "default_emotion", alias = "emotion")]
    pub emotion_tag: String,
    /// Layout hint for the rendering host.
    #[serde(default)]
    pub visual_type: VisualType,
    /// Explicit background image reference.
    #[serde(default, alias = "backgroundUrl")]
    pub background_reference: Option<String>,
    /// Solid background tint for hosts without imagery.
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Phrase shown as a title card and emphasized in subtitles.
    #[serde(default)]
    pub highlight_text: Option<String>,
    /// Override for the measured audio duration.
    #[serde(default, alias = "durationOverride")]
    pub explicit_duration_seconds: Option<f64>,
    /// Additional scene-relative cues.
    #[serde(default)]
    pub cues: Vec<CueSpec>,
}

/// Emotion vocabulary for speaker poses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    /// Resting pose; every speaker must provide it.
    Neutral,
    /// Energetic.
    Excited,
    /// Pondering.
    Thinking,
    /// Grave.
    Serious,
    /// Teaching.
    Explaining,
    /// Triumphant.
    Celebrating,
    /// Greeting.
    Waving,
}

impl Emotion {
    /// Every tag in the vocabulary.
    pub const ALL: [Emotion; 7] = [
        Emotion::Neutral,
        Emotion::Excited,
        Emotion::Thinking,
        Emotion::Serious,
        Emotion::Explaining,
        Emotion::Celebrating,
        Emotion::Waving,
    ];

    /// Parse a tag case-insensitively.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(tag))
    }

    /// Canonical lowercase tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Excited => "excited",
            Self::Thinking => "thinking",
            Self::Serious => "serious",
            Self::Explaining => "explaining",
            Self::Celebrating => "celebrating",
            Self::Waving => "waving",
        }
    }

    /// Emotions rendered with an idle bounce.
    pub fn bounces(self) -> bool {
        matches!(self, Self::Excited | Self::Celebrating)
    }
}

/// Scene layout hint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualType {
    /// Speaker over background.
    #[default]
    TalkingHead,
    /// Speaker and background side by side.
    SplitScreen,
    /// Text-first layout.
    TextOverlay,
    /// Speaker without background imagery.
    CharacterOnly,
}

/// Output aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectFormat {
    /// Landscape 1920x1080.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// Portrait 1080x1920.
    #[serde(rename = "9:16")]
    Portrait,
    /// Square 1080x1080.
    #[serde(rename = "1:1")]
    Square,
}

impl AspectFormat {
    /// Canvas size for this format.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Landscape => Canvas {
                width: 1920,
                height: 1080,
            },
            Self::Portrait => Canvas {
                width: 1080,
                height: 1920,
            },
            Self::Square => Canvas {
                width: 1080,
                height: 1080,
            },
        }
    }
}

/// Scene-entry transition style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// Accent wipe that fades the incoming scene in.
    #[default]
    Fade,
    /// Accent wipe sliding across the frame.
    Slide,
    /// Hard cut.
    None,
}

/// How scene backgrounds are sourced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundMode {
    /// One still per scene with a slow zoom and pan.
    #[default]
    Image,
    /// Short generated clips joined by crossfades.
    Clips,
    /// Animated theme gradient.
    Gradient,
}

/// Presentation options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    /// Theme name; unknown names fall back to `zkagi-brand`.
    pub theme: String,
    /// Output aspect ratio.
    #[serde(alias = "format")]
    pub aspect_format: AspectFormat,
    /// Show word-reveal subtitles.
    #[serde(alias = "showSubtitles")]
    pub subtitles: bool,
    /// Show the speaker's name badge.
    #[serde(alias = "showCharacterName")]
    pub show_speaker_name: bool,
    /// Scene-entry transition.
    #[serde(alias = "transitionType")]
    pub transition_kind: TransitionKind,
    /// Background sourcing.
    pub background: BackgroundMode,
    /// Nominal sub-clip length `C` in frames.
    pub clip_frames: u64,
    /// Crossfade width `X` in frames.
    pub crossfade_frames: u64,
    /// Share of the scene over which subtitle words are revealed.
    pub reveal_fraction: f64,
    /// Scene length when neither override nor measurement is known.
    pub default_scene_frames: u64,
    /// Frames a cue may run past its scene's end.
    pub cue_tolerance: u64,
    /// Scene-relative frame at which the highlight title appears.
    pub highlight_offset_frames: u64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            aspect_format: AspectFormat::default(),
            subtitles: true,
            show_speaker_name: true,
            transition_kind: TransitionKind::default(),
            background: BackgroundMode::default(),
            clip_frames: 117,
            crossfade_frames: 12,
            reveal_fraction: 0.70,
            default_scene_frames: 120,
            cue_tolerance: 15,
            highlight_offset_frames: 10,
        }
    }
}

impl Style {
    /// Reveal fraction clamped to `[0.70, 0.85]`.
    pub fn effective_reveal_fraction(&self) -> f64 {
        if self.reveal_fraction.is_finite() {
            self.reveal_fraction.clamp(0.70, 0.85)
        } else {
            0.70
        }
    }
}

/// Looping background music.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Music {
    /// Asset reference; no music track without it.
    pub url: Option<String>,
    /// Linear gain in `[0, 1]`.
    pub volume: f64,
}

impl Default for Music {
    fn default() -> Self {
        Self {
            url: None,
            volume: 0.12,
        }
    }
}

/// Persistent corner watermark.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Watermark {
    /// Text to draw.
    pub text: String,
    /// Whether to draw it at all.
    pub show: bool,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            text: "ZkAGI".to_owned(),
            show: true,
        }
    }
}

/// Scene-relative cue declared in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueSpec {
    /// Named track; two cues on one track must not overlap.
    pub track: String,
    /// Offset from the scene start. Negative values are rejected at scheduling time.
    pub relative_frame: i64,
    /// Length in frames.
    pub duration_frames: u64,
    /// Payload.
    #[serde(flatten)]
    pub kind: CueKind,
}

/// Cue payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CueKind {
    /// Sound effect.
    Sound {
        /// Asset reference.
        asset: String,
        /// Linear gain.
        #[serde(default = "default_cue_volume")]
        volume: f64,
    },
    /// Full-frame color flash.
    Flash {
        /// Flash color.
        color: Color,
    },
    /// Color wipe across the frame.
    Wipe {
        /// Wipe color.
        color: Color,
        /// Travel direction.
        #[serde(default)]
        direction: WipeDirection,
    },
    /// Call-to-action text reveal.
    Reveal {
        /// Text to reveal.
        text: String,
    },
    /// Visual glitch burst.
    Glitch {
        /// Strength in `[0, 1]`.
        #[serde(default = "default_glitch_intensity")]
        intensity: f64,
    },
}

/// Direction of a wipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeDirection {
    /// Enters from the right edge and exits to the left.
    #[default]
    RightToLeft,
    /// Enters from the left edge and exits to the right.
    LeftToRight,
}

/// Theme used when the document names none or an unknown one.
pub const DEFAULT_THEME: &str = "zkagi-brand";

fn default_fps() -> u32 {
    30
}

fn default_emotion() -> String {
    Emotion::Neutral.as_str().to_owned()
}

fn default_cfg_value() -> String {
    "2.0".to_owned()
}

fn default_steps() -> String {
    "15".to_owned()
}

fn default_cue_volume() -> f64 {
    1.0
}

fn default_glitch_intensity() -> f64 {
    0.5
}

impl VideoConfig {
    /// Parse a document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        let mut cfg: VideoConfig = serde_json::from_reader(r)
            .map_err(|e| StoryError::serde(format!("parse video config JSON: {e}")))?;
        cfg.fill_speaker_ids();
        Ok(cfg)
    }

    /// Parse a document from a JSON string.
    pub fn from_str_json(s: &str) -> StoryResult<Self> {
        let mut cfg: VideoConfig = serde_json::from_str(s)
            .map_err(|e| StoryError::serde(format!("parse video config JSON: {e}")))?;
        cfg.fill_speaker_ids();
        Ok(cfg)
    }

    /// Build a document from an already parsed JSON value.
    pub fn from_json_value(v: serde_json::Value) -> StoryResult<Self> {
        let mut cfg: VideoConfig = serde_json::from_value(v)
            .map_err(|e| StoryError::serde(format!("parse video config JSON: {e}")))?;
        cfg.fill_speaker_ids();
        Ok(cfg)
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::io(format!("open video config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    fn fill_speaker_ids(&mut self) {
        for (key, speaker) in &mut self.speakers {
            if speaker.id.is_empty() {
                speaker.id = key.clone();
            }
        }
    }

    /// Validated frame rate.
    pub fn frame_rate(&self) -> StoryResult<Fps> {
        Fps::integer(self.fps)
    }

    /// Output canvas for the configured aspect format.
    pub fn canvas(&self) -> Canvas {
        self.style.aspect_format.canvas()
    }

    /// Speaker by id.
    pub fn speaker(&self, id: &str) -> Option<&Speaker> {
        self.speakers.get(id)
    }

    /// Digest of the ordered `(speakerId, dialogue)` pairs.
    ///
    /// Audio durations are only valid for the exact dialogue they were measured from, so manifests
    /// carry this value to detect reordering or edits.
    pub fn dialogue_fingerprint(&self) -> String {
        let mut h = StableHasher::new();
        h.write_u64(self.scenes.len() as u64);
        for scene in &self.scenes {
            h.write_str(&scene.speaker_id);
            h.write_str(&scene.dialogue_text);
        }
        format!("{:016x}", h.finish64())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
