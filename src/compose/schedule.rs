use crate::compose::evaluator::{
    character_motion, flash_opacity, gradient_angle, gradient_glow, glitch_displacement,
    ken_burns, shimmer_offset, title_motion, wipe_offset,
};
use crate::compose::layers::{
    AudioEvent, FrameState, LayerContent, VisualLayer, Z_BACKGROUND, Z_CHARACTER,
    Z_CROSSFADE_MASK, Z_HIGHLIGHT, Z_SUBTITLES, Z_TRANSITION, Z_WATERMARK,
};
use crate::compose::subtitle::{HighlightMatcher, WordReveal};
use crate::config::model::{CueKind, Emotion};
use crate::config::theme::Theme;
use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, FrameRange, Transform2D};
use crate::foundation::error::{Diagnostic, StoryError, StoryResult};
use crate::foundation::hash::{Fingerprint, StableHasher};
use crate::timeline::subclip::{CrossfadeWindow, SubClip};
use rayon::prelude::*;
use smallvec::SmallVec;

/// One element placed at absolute frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedSegment {
    /// Stable id, also the id of the layer or audio event it produces.
    pub id: String,
    /// Frames where the segment is active.
    pub range: FrameRange,
    /// Owning scene, `None` for cues that are scene-independent after resolution.
    pub scene_index: Option<usize>,
    /// What the segment evaluates to.
    pub payload: SegmentPayload,
}

/// Segment payload; each variant knows how to evaluate itself at a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentPayload {
    /// Still image with Ken Burns motion.
    ImageBackground {
        /// Image reference.
        source: String,
        /// Optional flat tint.
        tint: Option<Color>,
    },
    /// One generated clip of a multi-clip background.
    ClipBackground {
        /// Clip placement.
        clip: SubClip,
        /// Window where this clip fades in, if any.
        fade_in: Option<CrossfadeWindow>,
        /// Window where this clip fades out, if any.
        fade_out: Option<CrossfadeWindow>,
    },
    /// Blend mask over a clip boundary.
    CrossfadeMask {
        /// The crossfade being masked.
        window: CrossfadeWindow,
        /// Mask fill.
        color: Color,
    },
    /// Animated gradient fallback background.
    GradientBackground {
        /// Angle at scene start.
        base_angle_deg: f64,
    },
    /// Speaker artwork.
    Character {
        /// Pose image.
        pose: String,
        /// Emotion driving idle motion.
        emotion: Emotion,
        /// Badge text.
        name: Option<String>,
        /// Speaker accent.
        accent: Color,
    },
    /// Word-reveal subtitle panel.
    Subtitle {
        /// Speaker label.
        speaker: Option<String>,
        /// Reveal schedule.
        reveal: WordReveal,
        /// Highlight phrase.
        highlight: Option<String>,
    },
    /// Dialogue audio for a scene.
    Dialogue {
        /// Audio reference.
        source: String,
    },
    /// Resolved cue.
    Cue {
        /// Declaration order.
        seq: usize,
        /// Cue track.
        track: String,
        /// Cue payload.
        kind: CueKind,
    },
}

/// Looping background music.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    /// Audio reference.
    pub source: String,
    /// Linear gain.
    pub volume: f64,
}

/// Persistent watermark.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkTrack {
    /// Text.
    pub text: String,
    /// Text color.
    pub color: Color,
}

/// Flat, frame-indexed event list handed to a rendering host.
///
/// Immutable once assembled. [`Schedule::evaluate`] is pure, so any frame can be produced in any
/// order and from any thread.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Frame rate.
    pub fps: Fps,
    /// Output canvas.
    pub canvas: Canvas,
    /// Composition length.
    pub total_frames: u64,
    /// Palette.
    pub theme: Theme,
    /// Segments ordered by `(range.start, id)`; reordered on deserialization.
    ///
    /// [`Schedule::active`] relies on this order. Call [`order_segments`] after editing.
    #[serde(deserialize_with = "deserialize_ordered")]
    pub segments: Vec<TimedSegment>,
    /// Composition-wide music.
    pub music: Option<MusicTrack>,
    /// Composition-wide watermark.
    pub watermark: Option<WatermarkTrack>,
    /// Everything skipped or dropped while building.
    pub diagnostics: Vec<Diagnostic>,
}

/// Sort segments by `(range.start, id)`, the order [`Schedule::active`] searches.
pub fn order_segments(segments: &mut [TimedSegment]) {
    segments.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn deserialize_ordered<'de, D>(de: D) -> Result<Vec<TimedSegment>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut segments = <Vec<TimedSegment> as serde::Deserialize>::deserialize(de)?;
    order_segments(&mut segments);
    Ok(segments)
}

enum Output {
    Visual(VisualLayer),
    Audio(AudioEvent),
}

impl Schedule {
    /// Composition range.
    pub fn range(&self) -> FrameRange {
        FrameRange::from_start_len(0, self.total_frames)
    }

    /// Segments active at `frame`.
    pub fn active(&self, frame: FrameIndex) -> impl Iterator<Item = &TimedSegment> {
        let end = self.segments.partition_point(|s| s.range.start <= frame);
        self.segments[..end]
            .iter()
            .filter(move |s| s.range.contains(frame))
    }

    /// Visual and audio state at `frame`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn evaluate(&self, frame: FrameIndex) -> StoryResult<FrameState> {
        if frame.0 >= self.total_frames {
            return Err(StoryError::evaluation(format!(
                "frame {} is outside the composition (0..{})",
                frame.0, self.total_frames
            )));
        }

        let mut layers = Vec::new();
        let mut audio = Vec::new();
        let mut scene_index = None;

        for seg in self.active(frame) {
            if matches!(seg.payload, SegmentPayload::Character { .. }) {
                scene_index = seg.scene_index;
            }
            match self.eval_segment(seg, frame)? {
                Some(Output::Visual(l)) => layers.push(l),
                Some(Output::Audio(a)) => audio.push(a),
                None => {}
            }
        }

        if let Some(m) = &self.music {
            audio.push(AudioEvent {
                id: "music".to_owned(),
                source: m.source.clone(),
                source_time_secs: self.fps.frames_to_secs(frame.0),
                gain: m.volume,
                looping: true,
            });
        }
        if let Some(w) = &self.watermark {
            layers.push(VisualLayer {
                id: "watermark".to_owned(),
                z: Z_WATERMARK,
                opacity: 1.0,
                transform: Affine::IDENTITY,
                content: LayerContent::Watermark {
                    text: w.text.clone(),
                    color: w.color,
                },
            });
        }

        layers.sort_by(|a, b| a.z.cmp(&b.z).then_with(|| a.id.cmp(&b.id)));
        audio.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(FrameState {
            frame,
            scene_index,
            clear: self.theme.background,
            layers,
            audio,
        })
    }

    fn eval_segment(&self, seg: &TimedSegment, frame: FrameIndex) -> StoryResult<Option<Output>> {
        let local = frame.0 - seg.range.start.0;
        let len = seg.range.len_frames();
        let visual = |z: i32, opacity: f64, transform: Transform2D, content: LayerContent| {
            Some(Output::Visual(VisualLayer {
                id: seg.id.clone(),
                z,
                opacity: opacity.clamp(0.0, 1.0),
                transform: transform.to_affine(),
                content,
            }))
        };

        let out = match &seg.payload {
            SegmentPayload::ImageBackground { source, tint } => {
                let m = ken_burns(local, len, self.canvas)?;
                visual(
                    Z_BACKGROUND,
                    m.opacity,
                    m.transform,
                    LayerContent::Image {
                        source: source.clone(),
                        media_frame: None,
                        tint: *tint,
                    },
                )
            }
            SegmentPayload::ClipBackground {
                clip,
                fade_in,
                fade_out,
            } => {
                let mut opacity = 1.0;
                if let Some(w) = fade_in.filter(|w| w.range.contains(frame)) {
                    opacity = w.incoming_weight(frame);
                }
                if let Some(w) = fade_out.filter(|w| w.range.contains(frame)) {
                    opacity = 1.0 - w.incoming_weight(frame);
                }
                visual(
                    Z_BACKGROUND,
                    opacity,
                    Transform2D::default(),
                    LayerContent::Image {
                        source: clip.source.clone(),
                        media_frame: clip.media_frame(frame),
                        tint: None,
                    },
                )
            }
            SegmentPayload::CrossfadeMask { window, color } => visual(
                Z_CROSSFADE_MASK,
                window.mask_opacity(frame),
                Transform2D::default(),
                LayerContent::Mask { color: *color },
            ),
            SegmentPayload::GradientBackground { base_angle_deg } => visual(
                Z_BACKGROUND,
                1.0,
                Transform2D::default(),
                LayerContent::Gradient {
                    angle_deg: gradient_angle(local, *base_angle_deg)?,
                    stops: self.theme.gradient.clone(),
                    glow: gradient_glow(local),
                    glow_color: self.theme.accent,
                },
            ),
            SegmentPayload::Character {
                pose,
                emotion,
                name,
                accent,
            } => {
                let m = character_motion(local, len, *emotion, self.fps)?;
                visual(
                    Z_CHARACTER,
                    m.opacity,
                    m.transform,
                    LayerContent::Character {
                        pose: pose.clone(),
                        name: name.clone(),
                        accent: *accent,
                    },
                )
            }
            SegmentPayload::Subtitle {
                speaker,
                reveal,
                highlight,
            } => {
                let matcher = highlight
                    .as_deref()
                    .map(HighlightMatcher::new)
                    .unwrap_or_default();
                let m = reveal.panel_motion(local, self.fps);
                visual(
                    Z_SUBTITLES,
                    m.opacity,
                    m.transform,
                    LayerContent::Subtitle {
                        speaker: speaker.clone(),
                        words: reveal.word_states(local, self.fps, &matcher),
                        background: self.theme.subtitle_bg,
                        text_color: self.theme.subtitle_text,
                        highlight_color: self.theme.accent,
                    },
                )
            }
            SegmentPayload::Dialogue { source } => Some(Output::Audio(AudioEvent {
                id: seg.id.clone(),
                source: source.clone(),
                source_time_secs: self.fps.frames_to_secs(local),
                gain: 1.0,
                looping: false,
            })),
            SegmentPayload::Cue { seq, kind, .. } => match kind {
                CueKind::Sound { asset, volume } => Some(Output::Audio(AudioEvent {
                    id: seg.id.clone(),
                    source: asset.clone(),
                    source_time_secs: self.fps.frames_to_secs(local),
                    gain: volume.max(0.0),
                    looping: false,
                })),
                CueKind::Flash { color } => visual(
                    Z_TRANSITION,
                    flash_opacity(local, len),
                    Transform2D::default(),
                    LayerContent::Flash { color: *color },
                ),
                CueKind::Wipe { color, direction } => match wipe_offset(local, *direction)? {
                    Some(offset_pct) => visual(
                        Z_TRANSITION,
                        1.0,
                        Transform2D::default(),
                        LayerContent::Wipe {
                            color: *color,
                            offset_pct,
                        },
                    ),
                    None => None,
                },
                CueKind::Reveal { text } => {
                    let m = title_motion(local, len, self.fps);
                    visual(
                        Z_HIGHLIGHT,
                        m.opacity,
                        m.transform,
                        LayerContent::Title {
                            text: text.clone(),
                            shimmer_offset: shimmer_offset(local)?,
                            color: self.theme.text_primary,
                        },
                    )
                }
                CueKind::Glitch { intensity } => visual(
                    Z_TRANSITION,
                    1.0,
                    Transform2D::default(),
                    LayerContent::Glitch {
                        intensity: intensity.clamp(0.0, 1.0),
                        displacement: glitch_displacement(*seq, frame.0, *intensity),
                    },
                ),
            },
        };
        Ok(out)
    }

    /// Check the single-dominant-background guarantee on every frame.
    ///
    /// Outside a crossfade window exactly one background layer exists; inside one, at most two.
    /// Frames are checked in parallel; the first offending frame (lowest index) is reported.
    #[tracing::instrument(skip(self), fields(total_frames = self.total_frames))]
    pub fn verify(&self) -> StoryResult<()> {
        let windows: Vec<FrameRange> = self
            .segments
            .iter()
            .filter_map(|s| match &s.payload {
                SegmentPayload::CrossfadeMask { window, .. } => Some(window.range),
                _ => None,
            })
            .collect();

        let bad = (0..self.total_frames)
            .into_par_iter()
            .map(|f| {
                let frame = FrameIndex(f);
                let state = self.evaluate(frame)?;
                let bgs: SmallVec<[&VisualLayer; 2]> = state.backgrounds().collect();
                let in_window = windows.iter().any(|w| w.contains(frame));
                let ok = match bgs.len() {
                    1 => true,
                    2 => in_window,
                    _ => false,
                };
                Ok((!ok).then(|| (f, bgs.len(), in_window)))
            })
            .collect::<StoryResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .min_by_key(|(f, _, _)| *f);

        match bad {
            None => {
                tracing::info!("background coverage verified");
                Ok(())
            }
            Some((f, n, in_window)) => Err(StoryError::evaluation(format!(
                "frame {f}: {n} background layers ({} crossfade window)",
                if in_window { "inside" } else { "outside" }
            ))),
        }
    }

    /// Stable digest of the frames in `range`.
    pub fn fingerprint_range(&self, range: FrameRange) -> StoryResult<Fingerprint> {
        let mut h = StableHasher::new();
        for f in range.start.0..range.end.0 {
            hash_frame(&mut h, &self.evaluate(FrameIndex(f))?);
        }
        Ok(h.finish())
    }

    /// Number of segments.
    pub fn event_count(&self) -> usize {
        self.segments.len()
    }
}

/// Feed one evaluated frame into `h` through its JSON form.
pub fn hash_frame(h: &mut StableHasher, state: &FrameState) {
    h.write_u64(state.frame.0);
    match serde_json::to_vec(state) {
        Ok(bytes) => h.write_bytes(&bytes),
        Err(e) => h.write_str(&e.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/schedule.rs"]
mod tests;
