use crate::compose::schedule::{
    MusicTrack, Schedule, SegmentPayload, TimedSegment, WatermarkTrack, order_segments,
};
use crate::compose::subtitle::WordReveal;
use crate::config::manifest::AudioManifest;
use crate::config::model::VideoConfig;
use crate::config::theme::ThemeTable;
use crate::cues::scheduler::{CueSchedule, CueScheduler, cue_requests};
use crate::foundation::color::Color;
use crate::foundation::error::{Diagnostic, StoryResult};
use crate::timeline::builder::{SceneBackground, SceneWindow, Timeline, TimelineBuilder};

/// Merges a [`Timeline`], its [`CueSchedule`] and the composition-wide tracks into a
/// [`Schedule`].
///
/// Inputs are borrowed read-only; the assembler owns nothing and can be reused.
#[derive(Clone, Copy, Debug)]
pub struct Assembler<'a> {
    config: &'a VideoConfig,
    themes: &'a ThemeTable,
    timeline: &'a Timeline,
    cues: &'a CueSchedule,
}

impl<'a> Assembler<'a> {
    /// Assembler over already-built timing.
    pub fn new(
        config: &'a VideoConfig,
        themes: &'a ThemeTable,
        timeline: &'a Timeline,
        cues: &'a CueSchedule,
    ) -> Self {
        Self {
            config,
            themes,
            timeline,
            cues,
        }
    }

    /// Build the flat segment list.
    #[tracing::instrument(skip(self), fields(scenes = self.timeline.scenes.len()))]
    pub fn assemble(&self) -> StoryResult<Schedule> {
        let cfg = self.config;
        let (theme, fell_back) = self.themes.resolve(&cfg.style.theme);
        let mut diagnostics = self.timeline.diagnostics.clone();
        if fell_back {
            tracing::warn!(theme = %cfg.style.theme, fallback = %theme.name, "unknown theme");
            diagnostics.push(Diagnostic::configuration(
                None,
                format!("unknown theme '{}', using '{}'", cfg.style.theme, theme.name),
            ));
        }
        diagnostics.extend(self.cues.diagnostics.iter().cloned());

        let mut segments = Vec::new();
        for w in &self.timeline.scenes {
            self.scene_segments(w, theme.background, &mut segments);
        }
        segments.extend(self.cues.cues.iter().map(|c| TimedSegment {
            id: format!("cue:{}:{}", c.track, c.seq),
            range: c.range,
            scene_index: Some(c.scene_index),
            payload: SegmentPayload::Cue {
                seq: c.seq,
                track: c.track.clone(),
                kind: c.kind.clone(),
            },
        }));
        order_segments(&mut segments);

        let music = cfg.music.url.as_ref().map(|url| MusicTrack {
            source: url.clone(),
            volume: cfg.music.volume,
        });
        let watermark = (cfg.watermark.show && !cfg.watermark.text.trim().is_empty()).then(|| {
            WatermarkTrack {
                text: cfg.watermark.text.clone(),
                color: theme.watermark,
            }
        });

        tracing::info!(
            events = segments.len(),
            total_frames = self.timeline.total_frames,
            music = music.is_some(),
            "schedule assembled"
        );

        Ok(Schedule {
            fps: self.timeline.fps,
            canvas: self.timeline.canvas,
            total_frames: self.timeline.total_frames,
            theme: theme.clone(),
            segments,
            music,
            watermark,
            diagnostics,
        })
    }

    fn scene_segments(&self, w: &SceneWindow, mask_color: Color, out: &mut Vec<TimedSegment>) {
        let i = w.scene_index;
        let style = &self.config.style;
        let seg = |id: String, range, payload| TimedSegment {
            id,
            range,
            scene_index: Some(i),
            payload,
        };

        match &w.background {
            SceneBackground::Image { source } => out.push(seg(
                format!("bg:{i}"),
                w.range,
                SegmentPayload::ImageBackground {
                    source: source.clone(),
                    tint: w.background_color,
                },
            )),
            SceneBackground::Clips { clips, crossfades } => {
                for clip in clips {
                    let fade_in = crossfades.iter().find(|x| x.incoming == clip.index).copied();
                    let fade_out = crossfades.iter().find(|x| x.outgoing == clip.index).copied();
                    out.push(seg(
                        format!("bg:{i}:{}", clip.index),
                        clip.visible,
                        SegmentPayload::ClipBackground {
                            clip: clip.clone(),
                            fade_in,
                            fade_out,
                        },
                    ));
                }
                for x in crossfades {
                    out.push(seg(
                        format!("xfade:{i}:{}", x.outgoing),
                        x.range,
                        SegmentPayload::CrossfadeMask {
                            window: *x,
                            color: mask_color,
                        },
                    ));
                }
            }
            SceneBackground::Gradient { base_angle_deg } => out.push(seg(
                format!("bg:{i}"),
                w.range,
                SegmentPayload::GradientBackground {
                    base_angle_deg: *base_angle_deg,
                },
            )),
        }

        let speaker = self.config.speaker(&w.speaker_id);
        let name = speaker
            .filter(|_| style.show_speaker_name)
            .map(|s| s.name.clone());
        if let Some(s) = speaker {
            out.push(seg(
                format!("character:{i}"),
                w.range,
                SegmentPayload::Character {
                    pose: w.pose.clone(),
                    emotion: w.emotion,
                    name: name.clone(),
                    accent: s.accent_color,
                },
            ));
        }

        if style.subtitles
            && let Some(scene) = self.config.scenes.get(i)
        {
            let reveal = WordReveal::new(
                &scene.dialogue_text,
                w.range.len_frames(),
                style.effective_reveal_fraction(),
            );
            if !reveal.words().is_empty() {
                out.push(seg(
                    format!("subtitle:{i}"),
                    w.range,
                    SegmentPayload::Subtitle {
                        speaker: name,
                        reveal,
                        highlight: w.highlight.clone(),
                    },
                ));
            }
        }

        out.push(seg(
            format!("dialogue:{i}"),
            w.range,
            SegmentPayload::Dialogue {
                source: w.audio_path.clone(),
            },
        ));
    }
}

/// Run the whole pipeline: timeline, cues, assembly.
#[tracing::instrument(skip_all)]
pub fn compose(
    config: &VideoConfig,
    manifest: Option<&AudioManifest>,
    themes: &ThemeTable,
) -> StoryResult<Schedule> {
    let mut builder = TimelineBuilder::new(config);
    if let Some(m) = manifest {
        builder = builder.with_manifest(m);
    }
    let timeline = builder.build()?;
    let requests = cue_requests(config, &timeline);
    let cues = CueScheduler::new(&timeline, config.style.cue_tolerance).schedule(requests);
    Assembler::new(config, themes, &timeline, &cues).assemble()
}

#[cfg(test)]
#[path = "../../tests/unit/compose/assembler.rs"]
mod tests;
