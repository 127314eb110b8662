//! Storyreel turns a declarative scene list into a frame-exact schedule for dialogue videos.
//!
//! Every visual and audio property is a pure function of the frame index, so frames can be
//! evaluated in any order and on any thread. The pipeline is:
//!
//! - Load a [`VideoConfig`] (and optionally an [`AudioManifest`] of measured speech)
//! - [`compose`] it into a [`Schedule`] (timeline, cues, layers)
//! - Evaluate single frames with [`Schedule::evaluate`] or stream a range into a [`FrameSink`]
//!   through a [`RenderSession`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Easing, keyframe curves, springs and waves.
pub mod animation;
/// External collaborator boundaries (speech, script, audio probing).
pub mod collab;
/// Schedule assembly and per-frame evaluation.
pub mod compose;
/// Document model, themes, validation and the audio manifest.
pub mod config;
/// Scene-relative cue scheduling.
pub mod cues;
/// Shared vocabulary: frames, colors, errors, hashing.
pub mod foundation;
/// Frame sinks and range rendering sessions.
pub mod render;
/// Scene placement and sub-clip decomposition.
pub mod timeline;

pub use crate::compose::assembler::{Assembler, compose};
pub use crate::compose::layers::{AudioEvent, FrameState, LayerContent, VisualLayer};
pub use crate::compose::schedule::Schedule;
pub use crate::config::manifest::AudioManifest;
pub use crate::config::model::VideoConfig;
pub use crate::config::theme::{Theme, ThemeTable};
pub use crate::cues::scheduler::{CueSchedule, CueScheduler};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{Diagnostic, DiagnosticKind, StoryError, StoryResult};
pub use crate::render::session::{RenderSession, RenderSessionOpts, RenderStats};
pub use crate::render::sink::{FrameSink, InMemorySink, JsonLinesSink, SinkConfig};
pub use crate::timeline::builder::{Timeline, TimelineBuilder};
