use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{StoryError, StoryResult};

/// Parameters for splitting a scene background into overlapping generated clips.
///
/// Clip `k` starts at local frame `k * (C - X)`. The last clip absorbs the remainder so spans
/// partition the scene exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubClipPlan {
    /// Nominal clip length `C`.
    pub clip_frames: u64,
    /// Crossfade width `X`.
    pub crossfade_frames: u64,
}

impl SubClipPlan {
    /// Validate `C > 0` and `3X <= C`.
    ///
    /// `3X <= C` keeps the step `C - X` at least `2X`, so consecutive `2X` crossfade windows
    /// never overlap and at most two clips are drawn at any frame.
    pub fn new(clip_frames: u64, crossfade_frames: u64) -> StoryResult<Self> {
        if clip_frames == 0 {
            return Err(StoryError::configuration("sub-clip length must be > 0"));
        }
        if crossfade_frames.saturating_mul(3) > clip_frames {
            return Err(StoryError::configuration(format!(
                "crossfade {crossfade_frames} too wide for clip length {clip_frames}: \
                 need 3X <= C so consecutive 2X crossfade windows do not overlap"
            )));
        }
        Ok(Self {
            clip_frames,
            crossfade_frames,
        })
    }

    /// Distance between consecutive clip starts, `C - X`.
    pub fn step(self) -> u64 {
        self.clip_frames - self.crossfade_frames
    }

    /// Number of clips needed for a scene of `scene_len` frames.
    pub fn clip_count(self, scene_len: u64) -> u64 {
        if scene_len <= self.clip_frames {
            return 1;
        }
        1 + (scene_len - self.clip_frames).div_ceil(self.step())
    }

    /// Scene-local spans `[k*(C-X), ...)` that partition `[0, scene_len)`.
    pub fn spans(self, scene_len: u64) -> Vec<FrameRange> {
        if scene_len == 0 {
            return Vec::new();
        }
        let n = self.clip_count(scene_len);
        let step = self.step();
        (0..n)
            .map(|k| {
                let start = k * step;
                let len = if k + 1 == n { scene_len - start } else { step };
                FrameRange::from_start_len(start, len)
            })
            .collect()
    }

    /// Lay out clips and crossfade windows for a scene occupying `scene` on the timeline.
    pub fn layout(
        self,
        scene: FrameRange,
        scene_index: usize,
    ) -> (Vec<SubClip>, Vec<CrossfadeWindow>) {
        let x = self.crossfade_frames;
        let offset = scene.start.0;

        let clips = self
            .spans(scene.len_frames())
            .iter()
            .enumerate()
            .map(|(k, span)| {
                let span = span.shift(offset as i64);
                SubClip {
                    index: k,
                    span,
                    visible: FrameRange {
                        start: span.start,
                        end: FrameIndex((span.start.0 + self.clip_frames).min(scene.end.0)),
                    },
                    clip_frames: self.clip_frames,
                    source: clip_source(scene_index, k),
                }
            })
            .collect::<Vec<_>>();

        let crossfades = if x == 0 {
            Vec::new()
        } else {
            clips
                .windows(2)
                .map(|w| {
                    CrossfadeWindow::new(w[1].span.start, x, scene.end, w[0].index, w[1].index)
                })
                .collect()
        };

        (clips, crossfades)
    }
}

fn clip_source(scene_index: usize, k: usize) -> String {
    match u8::try_from(k) {
        Ok(k) if k < 26 => format!("scenes/scene-{scene_index}-{}.mp4", char::from(b'a' + k)),
        _ => format!("scenes/scene-{scene_index}-{k}.mp4"),
    }
}

/// One generated background clip placed on the timeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubClip {
    /// Position within the scene.
    pub index: usize,
    /// Frames this clip owns; spans of one scene partition it.
    pub span: FrameRange,
    /// Frames where the clip is drawn: `C` frames from its span start, cut at the scene end.
    pub visible: FrameRange,
    /// Nominal media length `C`.
    pub clip_frames: u64,
    /// Media reference.
    pub source: String,
}

impl SubClip {
    /// Media frame to show at timeline `frame`; never past `C - 1`.
    pub fn media_frame(&self, frame: FrameIndex) -> Option<u64> {
        self.visible.local(frame)
    }
}

/// Bounded two-layer blend region `[b, b + 2X)` opened where the incoming clip starts.
///
/// The outgoing clip is still drawn over `[b, b + X)`; the mask peaks at `b + X`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossfadeWindow {
    /// Frame where the incoming clip starts.
    pub boundary: FrameIndex,
    /// Crossfade width `X`.
    pub width: u64,
    /// Blend region, cut at the scene end.
    pub range: FrameRange,
    /// Clip fading out.
    pub outgoing: usize,
    /// Clip fading in.
    pub incoming: usize,
}

impl CrossfadeWindow {
    /// Window `[boundary, boundary + 2 * width)`, ending no later than `limit`.
    pub fn new(
        boundary: FrameIndex,
        width: u64,
        limit: FrameIndex,
        outgoing: usize,
        incoming: usize,
    ) -> Self {
        let end = boundary.0.saturating_add(width.saturating_mul(2)).min(limit.0);
        Self {
            boundary,
            width,
            range: FrameRange {
                start: boundary,
                end: FrameIndex(end.max(boundary.0)),
            },
            outgoing,
            incoming,
        }
    }

    /// Triangular blend-mask opacity: 0 at the window start, 1 at `b + X`, back to 0 at `b + 2X`.
    pub fn mask_opacity(self, frame: FrameIndex) -> f64 {
        if !self.range.contains(frame) || self.width == 0 {
            return 0.0;
        }
        let peak = (self.boundary.0 + self.width) as f64;
        let d = (frame.0 as f64 - peak).abs();
        (1.0 - d / self.width as f64).clamp(0.0, 1.0)
    }

    /// Opacity of the incoming clip, rising over the `X` frames both clips are drawn; the
    /// outgoing clip takes `1 - weight`.
    pub fn incoming_weight(self, frame: FrameIndex) -> f64 {
        if frame < self.boundary {
            return 0.0;
        }
        if self.width == 0 {
            return 1.0;
        }
        ((frame.0 - self.boundary.0) as f64 / self.width as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/subclip.rs"]
mod tests;
