use crate::animation::curve::FadeEnvelope;
use crate::animation::spring::spring;
use crate::compose::evaluator::{CONTAINER_SPRING, Motion, WORD_SPRING};
use crate::compose::layers::WordState;
use crate::foundation::core::{Fps, Transform2D, Vec2};
use std::collections::BTreeSet;

/// Subtitle panel fade-in length.
pub const SUBTITLE_FADE_IN: u64 = 15;
/// Subtitle panel fade-out length.
pub const SUBTITLE_FADE_OUT: u64 = 15;

/// Lowercased token with surrounding punctuation removed, `None` when nothing is left.
pub fn normalize_token(word: &str) -> Option<String> {
    let t = word.trim_matches(|c: char| !c.is_alphanumeric());
    (!t.is_empty()).then(|| t.to_lowercase())
}

/// Exact, case-insensitive token matcher for highlight phrases.
///
/// `"Self-custody, finally!"` highlights `self-custody` and `finally` but never `elf` or `final`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightMatcher {
    tokens: BTreeSet<String>,
}

impl HighlightMatcher {
    /// Matcher for every whitespace-separated token of `phrase`.
    pub fn new(phrase: &str) -> Self {
        Self {
            tokens: phrase.split_whitespace().filter_map(normalize_token).collect(),
        }
    }

    /// Whether `word` equals one of the phrase tokens.
    pub fn matches(&self, word: &str) -> bool {
        normalize_token(word).is_some_and(|t| self.tokens.contains(&t))
    }

    /// No tokens to match.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Word-by-word reveal schedule for one scene's dialogue.
///
/// The reveal window `W = round(L * fraction)` is split evenly across `n` words; word `i`
/// appears at `floor(i * W / n)`. Once shown a word stays until the panel fades out.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordReveal {
    words: Vec<String>,
    frames: Vec<u64>,
    reveal_frames: u64,
    scene_frames: u64,
}

impl WordReveal {
    /// Schedule for `text` over a scene of `scene_frames` frames.
    pub fn new(text: &str, scene_frames: u64, reveal_fraction: f64) -> Self {
        let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        let n = words.len() as u64;
        let reveal_frames = ((scene_frames as f64) * reveal_fraction)
            .round()
            .clamp(0.0, scene_frames as f64) as u64;
        let frames = (0..n)
            .map(|i| (u128::from(i) * u128::from(reveal_frames) / u128::from(n)) as u64)
            .collect();
        Self {
            words,
            frames,
            reveal_frames,
            scene_frames,
        }
    }

    /// Words in reading order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Reveal window length `W`.
    pub fn reveal_frames(&self) -> u64 {
        self.reveal_frames
    }

    /// Scene-local frame at which word `i` appears.
    pub fn frame_for_word(&self, i: usize) -> Option<u64> {
        self.frames.get(i).copied()
    }

    /// Number of words shown at scene-local frame `local`; non-decreasing in `local`.
    pub fn visible_count(&self, local: u64) -> usize {
        self.frames.partition_point(|&f| f <= local)
    }

    /// Panel opacity: symmetric fade at both ends of the scene.
    pub fn panel_opacity(&self, local: u64) -> f64 {
        FadeEnvelope::new(self.scene_frames, SUBTITLE_FADE_IN, SUBTITLE_FADE_OUT)
            .opacity(local as f64)
    }

    /// Panel placement and opacity.
    pub fn panel_motion(&self, local: u64, fps: Fps) -> Motion {
        let p = spring(local as f64, fps, CONTAINER_SPRING);
        Motion {
            transform: Transform2D {
                translate: Vec2::new(0.0, 30.0 * (1.0 - p)),
                ..Transform2D::default()
            },
            opacity: self.panel_opacity(local),
        }
    }

    /// Per-word state at scene-local frame `local`.
    pub fn word_states(
        &self,
        local: u64,
        fps: Fps,
        highlight: &HighlightMatcher,
    ) -> Vec<WordState> {
        self.words
            .iter()
            .zip(&self.frames)
            .map(|(word, &at)| {
                let visible = at <= local;
                let p = if visible {
                    spring((local - at) as f64, fps, WORD_SPRING)
                } else {
                    0.0
                };
                WordState {
                    text: word.clone(),
                    visible,
                    highlighted: highlight.matches(word),
                    scale: 0.5 + 0.5 * p,
                    translate_y: 20.0 * (1.0 - p),
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/subtitle.rs"]
mod tests;
