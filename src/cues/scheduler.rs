use crate::config::model::{CueKind, TransitionKind, VideoConfig, WipeDirection};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::Diagnostic;
use crate::timeline::builder::Timeline;
use std::collections::BTreeMap;

/// Track carrying the automatic scene-entry wipe.
pub const TRANSITION_TRACK: &str = "transition";
/// Track carrying the automatic highlight title.
pub const HIGHLIGHT_TRACK: &str = "highlight";
/// Length of the scene-entry wipe (8 frames in, 8 out).
pub const TRANSITION_FRAMES: u64 = 16;

/// A cue anchored to a scene, before resolution.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueRequest {
    /// Document index of the anchor scene.
    pub scene_index: usize,
    /// Named track.
    pub track: String,
    /// Offset from the scene start.
    pub relative_frame: i64,
    /// Length in frames.
    pub duration_frames: u64,
    /// Payload.
    pub kind: CueKind,
}

/// A cue placed at absolute frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCue {
    /// Declaration order; stable across runs.
    pub seq: usize,
    /// Document index of the anchor scene.
    pub scene_index: usize,
    /// Named track.
    pub track: String,
    /// Offset from the scene start.
    pub relative_frame: u64,
    /// Absolute frames `[sceneStart + r, sceneStart + r + d)`.
    pub range: FrameRange,
    /// Payload.
    pub kind: CueKind,
}

/// Every accepted cue plus what was dropped.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueSchedule {
    /// Accepted cues ordered by start frame, then declaration order.
    pub cues: Vec<ResolvedCue>,
    /// Rejected and overridden cues.
    pub diagnostics: Vec<Diagnostic>,
}

impl CueSchedule {
    /// Cues whose range contains `frame`.
    pub fn active_at(&self, frame: FrameIndex) -> impl Iterator<Item = &ResolvedCue> {
        let end = self.cues.partition_point(|c| c.range.start <= frame);
        self.cues[..end]
            .iter()
            .filter(move |c| c.range.contains(frame))
    }
}

/// Resolves scene-relative cues against a [`Timeline`].
#[derive(Clone, Copy, Debug)]
pub struct CueScheduler<'a> {
    timeline: &'a Timeline,
    tolerance: u64,
}

impl<'a> CueScheduler<'a> {
    /// Scheduler allowing cues to run `tolerance` frames past their scene's end.
    pub fn new(timeline: &'a Timeline, tolerance: u64) -> Self {
        Self {
            timeline,
            tolerance,
        }
    }

    /// Place one cue, or explain why it cannot be placed.
    pub fn resolve(&self, seq: usize, req: &CueRequest) -> Result<ResolvedCue, Diagnostic> {
        let reject = |msg: String| {
            Diagnostic::scheduling(
                Some(req.scene_index),
                format!("cue on track '{}' dropped: {msg}", req.track),
            )
        };

        let window = self
            .timeline
            .window(req.scene_index)
            .ok_or_else(|| reject("anchor scene is not on the timeline".to_owned()))?;
        if req.duration_frames == 0 {
            return Err(reject("duration must be > 0".to_owned()));
        }
        let r = u64::try_from(req.relative_frame)
            .map_err(|_| reject(format!("relative frame {} is negative", req.relative_frame)))?;
        let len = window.range.len_frames();
        if r >= len {
            return Err(reject(format!(
                "relative frame {r} is outside the scene (length {len})"
            )));
        }
        let rel_end = r.saturating_add(req.duration_frames);
        if rel_end > len.saturating_add(self.tolerance) {
            return Err(reject(format!(
                "ends at scene frame {rel_end}, past length {len} + tolerance {}",
                self.tolerance
            )));
        }
        let range = FrameRange::from_start_len(window.range.start.0 + r, req.duration_frames);
        if range.end.0 > self.timeline.total_frames {
            return Err(reject(format!(
                "resolves to [{}, {}) beyond timeline end {}",
                range.start.0, range.end.0, self.timeline.total_frames
            )));
        }

        Ok(ResolvedCue {
            seq,
            scene_index: req.scene_index,
            track: req.track.clone(),
            relative_frame: r,
            range,
            kind: req.kind.clone(),
        })
    }

    /// Resolve requests in declaration order.
    ///
    /// Out-of-range cues are dropped. When two cues on one track overlap, the later declaration
    /// wins and the earlier one is dropped; cues on different tracks never interact.
    #[tracing::instrument(skip(self, requests))]
    pub fn schedule(&self, requests: impl IntoIterator<Item = CueRequest>) -> CueSchedule {
        let mut diagnostics = Vec::new();
        let mut tracks: BTreeMap<String, Vec<ResolvedCue>> = BTreeMap::new();

        for (seq, req) in requests.into_iter().enumerate() {
            let cue = match self.resolve(seq, &req) {
                Ok(cue) => cue,
                Err(d) => {
                    tracing::warn!(scene = req.scene_index, track = %req.track, "{}", d.message);
                    diagnostics.push(d);
                    continue;
                }
            };

            let lane = tracks.entry(cue.track.clone()).or_default();
            lane.retain(|prev| {
                if !prev.range.overlaps(cue.range) {
                    return true;
                }
                let d = Diagnostic::scheduling(
                    Some(prev.scene_index),
                    format!(
                        "cue on track '{}' at [{}, {}) overridden by later cue at [{}, {})",
                        prev.track,
                        prev.range.start.0,
                        prev.range.end.0,
                        cue.range.start.0,
                        cue.range.end.0
                    ),
                );
                tracing::warn!(track = %prev.track, "{}", d.message);
                diagnostics.push(d);
                false
            });
            lane.push(cue);
        }

        let mut cues: Vec<ResolvedCue> = tracks.into_values().flatten().collect();
        cues.sort_by_key(|c| (c.range.start, c.seq));
        tracing::info!(
            cues = cues.len(),
            dropped = diagnostics.len(),
            "cues scheduled"
        );
        CueSchedule { cues, diagnostics }
    }
}

/// Automatic and declared cues for every placed scene, in declaration order.
///
/// Per scene: the entry wipe (unless transitions are off), the highlight reveal, then the
/// document's own cues.
pub fn cue_requests(cfg: &VideoConfig, timeline: &Timeline) -> Vec<CueRequest> {
    let mut out = Vec::new();
    for window in &timeline.scenes {
        let i = window.scene_index;
        let len = window.range.len_frames();

        let direction = match cfg.style.transition_kind {
            TransitionKind::None => None,
            TransitionKind::Fade => Some(WipeDirection::RightToLeft),
            TransitionKind::Slide => Some(WipeDirection::LeftToRight),
        };
        if let (Some(direction), Some(speaker)) = (direction, cfg.speaker(&window.speaker_id)) {
            out.push(CueRequest {
                scene_index: i,
                track: TRANSITION_TRACK.to_owned(),
                relative_frame: 0,
                duration_frames: TRANSITION_FRAMES.min(len),
                kind: CueKind::Wipe {
                    color: speaker.accent_color,
                    direction,
                },
            });
        }

        if let Some(text) = &window.highlight {
            let offset = cfg.style.highlight_offset_frames;
            out.push(CueRequest {
                scene_index: i,
                track: HIGHLIGHT_TRACK.to_owned(),
                relative_frame: i64::try_from(offset).unwrap_or(i64::MAX),
                duration_frames: len.saturating_sub(offset),
                kind: CueKind::Reveal { text: text.clone() },
            });
        }

        if let Some(scene) = cfg.scenes.get(i) {
            out.extend(scene.cues.iter().map(|c| CueRequest {
                scene_index: i,
                track: c.track.clone(),
                relative_frame: c.relative_frame,
                duration_frames: c.duration_frames,
                kind: c.kind.clone(),
            }));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/cues/scheduler.rs"]
mod tests;
