use crate::config::theme::GradientStop;
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, FrameIndex};

/// Scene background (image, clip or gradient).
pub const Z_BACKGROUND: i32 = 0;
/// Blend mask drawn over a sub-clip crossfade.
pub const Z_CROSSFADE_MASK: i32 = 5;
/// Speaker artwork.
pub const Z_CHARACTER: i32 = 20;
/// Highlight title and call-to-action reveals.
pub const Z_HIGHLIGHT: i32 = 30;
/// Subtitle panel.
pub const Z_SUBTITLES: i32 = 40;
/// Wipes, flashes and glitches.
pub const Z_TRANSITION: i32 = 100;
/// Persistent watermark.
pub const Z_WATERMARK: i32 = 200;

/// Everything visible and audible at one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameState {
    /// Evaluated frame.
    pub frame: FrameIndex,
    /// Scene owning the frame.
    pub scene_index: Option<usize>,
    /// Canvas fill under every layer.
    pub clear: Color,
    /// Visual layers sorted by `(z, id)`.
    pub layers: Vec<VisualLayer>,
    /// Active audio sorted by `id`.
    pub audio: Vec<AudioEvent>,
}

impl FrameState {
    /// Layers at the background z.
    pub fn backgrounds(&self) -> impl Iterator<Item = &VisualLayer> {
        self.layers.iter().filter(|l| l.z == Z_BACKGROUND)
    }

    /// Layer by id.
    pub fn layer(&self, id: &str) -> Option<&VisualLayer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

/// One evaluated visual element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualLayer {
    /// Stable id, unique within a frame.
    pub id: String,
    /// Draw order; higher is on top.
    pub z: i32,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Placement relative to the element's anchor.
    pub transform: Affine,
    /// What to draw.
    pub content: LayerContent,
}

/// Drawable payload of a [`VisualLayer`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerContent {
    /// Still or moving image.
    Image {
        /// Media reference.
        source: String,
        /// Source frame for moving media.
        media_frame: Option<u64>,
        /// Flat tint over the image.
        tint: Option<Color>,
    },
    /// Animated linear gradient.
    Gradient {
        /// Gradient angle in degrees.
        angle_deg: f64,
        /// Color stops.
        stops: Vec<GradientStop>,
        /// Accent glow strength.
        glow: f64,
        /// Glow color.
        glow_color: Color,
    },
    /// Flat fill used to hide the seam between two clips.
    Mask {
        /// Fill color.
        color: Color,
    },
    /// Speaker artwork with an optional name badge.
    Character {
        /// Pose image reference.
        pose: String,
        /// Badge text, when names are shown.
        name: Option<String>,
        /// Speaker accent.
        accent: Color,
    },
    /// Animated title text.
    Title {
        /// Text.
        text: String,
        /// Horizontal shimmer offset in pixels.
        shimmer_offset: f64,
        /// Text color.
        color: Color,
    },
    /// Word-by-word subtitle panel.
    Subtitle {
        /// Speaker label.
        speaker: Option<String>,
        /// Per-word state in reading order.
        words: Vec<WordState>,
        /// Panel fill.
        background: Color,
        /// Text color.
        text_color: Color,
        /// Highlighted-word color.
        highlight_color: Color,
    },
    /// Color bar sliding across the frame.
    Wipe {
        /// Bar color.
        color: Color,
        /// Horizontal offset in percent of canvas width (`100` off right, `-100` off left).
        offset_pct: f64,
    },
    /// Full-frame flash.
    Flash {
        /// Flash color.
        color: Color,
    },
    /// Glitch displacement.
    Glitch {
        /// Strength in `[0, 1]`.
        intensity: f64,
        /// Horizontal slice displacement in pixels.
        displacement: f64,
    },
    /// Watermark text.
    Watermark {
        /// Text.
        text: String,
        /// Text color.
        color: Color,
    },
}

/// One subtitle word at one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordState {
    /// Word as written.
    pub text: String,
    /// Revealed yet.
    pub visible: bool,
    /// Matches a highlight token.
    pub highlighted: bool,
    /// Pop-in scale.
    pub scale: f64,
    /// Pop-in vertical offset in pixels.
    pub translate_y: f64,
}

/// One active audio contribution.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEvent {
    /// Stable id.
    pub id: String,
    /// Media reference.
    pub source: String,
    /// Playback position in the source, in seconds.
    pub source_time_secs: f64,
    /// Linear gain.
    pub gain: f64,
    /// Source loops when it runs out.
    pub looping: bool,
}
