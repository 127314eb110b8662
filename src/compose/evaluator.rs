//! Per-frame motion for every element kind.
//!
//! Every function here is a pure function of its arguments. Nothing reads a "current frame" from
//! ambient state, so frames can be evaluated in any order and on any thread.

use crate::animation::curve::{Curve, Edge, FadeEnvelope, interpolate};
use crate::animation::ease::Ease;
use crate::animation::spring::{SpringConfig, spring};
use crate::animation::wave::Wave;
use crate::config::model::{Emotion, WipeDirection};
use crate::foundation::core::{Canvas, Fps, Transform2D, Vec2};
use crate::foundation::error::StoryResult;
use crate::foundation::hash::StableHasher;

/// Character entrance.
pub const ENTRANCE_SPRING: SpringConfig = SpringConfig::new(12.0, 1.0, 80.0);
/// Highlight title pop-in.
pub const TITLE_SPRING: SpringConfig = SpringConfig::new(15.0, 1.2, 100.0);
/// Subtitle panel slide-up.
pub const CONTAINER_SPRING: SpringConfig = SpringConfig::new(20.0, 0.8, 100.0);
/// Per-word pop-in.
pub const WORD_SPRING: SpringConfig = SpringConfig::new(12.0, 0.5, 200.0);

/// Frames a background takes to fade in.
pub const BACKGROUND_FADE_IN: u64 = 15;
/// Frames a character takes to fade in at scene start.
pub const CHARACTER_FADE_IN: u64 = 15;
/// Frames a character takes to shrink and fade out at scene end.
pub const EXIT_FRAMES: u64 = 15;
/// Title fade-in length.
pub const TITLE_FADE_IN: u64 = 20;
/// Title fade-out length.
pub const TITLE_FADE_OUT: u64 = 15;
/// Length of each half of a wipe.
pub const WIPE_HALF_FRAMES: u64 = 8;

const KEN_BURNS_ZOOM: f64 = 1.15;
const KEN_BURNS_PAN: (f64, f64) = (-0.03, -0.02);
const GRADIENT_SWEEP_DEG: f64 = 45.0;
const GRADIENT_SWEEP_FRAMES: f64 = 300.0;
const GLITCH_MAX_SHIFT_PX: f64 = 24.0;

/// Transform plus opacity for one element at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Placement.
    pub transform: Transform2D,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

fn ramp(local: f64, x0: f64, x1: f64, y0: f64, y1: f64, ease: Ease) -> StoryResult<f64> {
    interpolate(local, &[x0, x1], &[y0, y1], ease, Edge::Clamp)
}

/// Slow zoom and pan over a still background, fading in over its first frames.
pub fn ken_burns(local: u64, len: u64, canvas: Canvas) -> StoryResult<Motion> {
    let end = len.max(1) as f64;
    let f = local as f64;
    let zoom = ramp(f, 0.0, end, 1.0, KEN_BURNS_ZOOM, Ease::Linear)?;
    let size = canvas.size();
    let pan_x = ramp(f, 0.0, end, 0.0, KEN_BURNS_PAN.0 * size.x, Ease::Linear)?;
    let pan_y = ramp(f, 0.0, end, 0.0, KEN_BURNS_PAN.1 * size.y, Ease::Linear)?;
    let opacity = ramp(f, 0.0, BACKGROUND_FADE_IN as f64, 0.0, 1.0, Ease::Linear)?;

    Ok(Motion {
        transform: Transform2D {
            translate: Vec2::new(pan_x, pan_y),
            scale: Vec2::new(zoom, zoom),
            anchor: size / 2.0,
            ..Transform2D::default()
        },
        opacity,
    })
}

/// Gradient angle sweeping 45 degrees over 300 frames from `base_deg`.
pub fn gradient_angle(local: u64, base_deg: f64) -> StoryResult<f64> {
    ramp(
        local as f64,
        0.0,
        GRADIENT_SWEEP_FRAMES,
        base_deg,
        base_deg + GRADIENT_SWEEP_DEG,
        Ease::Linear,
    )
}

/// Pulsing accent glow, `0.3 +- 0.1`.
pub fn gradient_glow(local: u64) -> f64 {
    Wave::sine(40.0, 0.1).with_offset(0.3).sample(local as f64)
}

/// Speaker artwork: spring entrance with an overshooting scale, idle breathing and sway, an
/// emotion bounce for lively emotions, a fade-in over the first frames and a shrink-out over the
/// last frames of the scene.
pub fn character_motion(local: u64, len: u64, emotion: Emotion, fps: Fps) -> StoryResult<Motion> {
    let f = local as f64;
    let entrance = spring(f, fps, ENTRANCE_SPRING);
    let rise = ramp(entrance, 0.0, 1.0, 100.0, 0.0, Ease::Linear)?;
    let pop = Curve::clamped(&[0.0, 0.5, 0.8, 1.0], &[0.3, 1.1, 0.95, 1.0])?.sample(entrance);

    let breathe = Wave::sine(25.0, 4.0).sample(f);
    let sway = Wave::sine(40.0, 2.0).sample(f);
    let hop = if emotion.bounces() {
        Wave::bounce(8.0, 8.0).sample(f)
    } else {
        0.0
    };

    let len = len.max(1);
    let exit_start = len.saturating_sub(EXIT_FRAMES) as f64;
    let exit = ramp(f, exit_start, len as f64, 0.0, 1.0, Ease::Linear)?;
    let scale = pop * (1.0 - 0.2 * exit);

    Ok(Motion {
        transform: Transform2D {
            translate: Vec2::new(0.0, rise + breathe - hop),
            rotation_deg: sway,
            scale: Vec2::new(scale, scale),
            ..Transform2D::default()
        },
        opacity: FadeEnvelope::new(len, CHARACTER_FADE_IN, EXIT_FRAMES).opacity(f),
    })
}

/// Highlight title: springs in from above at half size and fades at both ends of its life.
pub fn title_motion(local: u64, len: u64, fps: Fps) -> Motion {
    let f = local as f64;
    let p = spring(f, fps, TITLE_SPRING);
    let scale = 0.5 + 0.5 * p;
    let opacity = FadeEnvelope::new(len, TITLE_FADE_IN, TITLE_FADE_OUT).opacity(f);

    Motion {
        transform: Transform2D {
            translate: Vec2::new(0.0, -50.0 * (1.0 - p)),
            scale: Vec2::new(scale, scale),
            ..Transform2D::default()
        },
        opacity,
    }
}

/// Shimmer band offset in pixels, repeating every 60 frames.
pub fn shimmer_offset(local: u64) -> StoryResult<f64> {
    let x = interpolate(
        local as f64,
        &[0.0, 60.0],
        &[-200.0, 200.0],
        Ease::Linear,
        Edge::Extend,
    )?;
    Ok(x % 400.0)
}

/// Wipe bar offset in percent of canvas width, or `None` once the wipe has left the frame.
///
/// The bar covers the frame over the first half (ease-out) and leaves over the second (ease-in).
pub fn wipe_offset(local: u64, direction: WipeDirection) -> StoryResult<Option<f64>> {
    let f = local as f64;
    let half = WIPE_HALF_FRAMES as f64;
    let pct = if local < WIPE_HALF_FRAMES {
        ramp(f, 0.0, half, 100.0, 0.0, Ease::OutCubic)?
    } else if local < 2 * WIPE_HALF_FRAMES {
        ramp(f, half, 2.0 * half, 0.0, -100.0, Ease::InCubic)?
    } else {
        return Ok(None);
    };
    Ok(Some(match direction {
        WipeDirection::RightToLeft => pct,
        WipeDirection::LeftToRight => -pct,
    }))
}

/// Flash opacity decaying from 1 to 0 over the cue.
pub fn flash_opacity(local: u64, len: u64) -> f64 {
    FadeEnvelope::new(len, 0, len.saturating_sub(1)).opacity(local as f64)
}

/// Deterministic glitch displacement for cue `seq` at absolute `frame`.
pub fn glitch_displacement(seq: usize, frame: u64, intensity: f64) -> f64 {
    let mut h = StableHasher::new();
    h.write_u64(seq as u64);
    h.write_u64(frame);
    // Top 53 bits give a uniform value in [0, 1).
    let unit = (h.finish64() >> 11) as f64 / (1u64 << 53) as f64;
    (unit * 2.0 - 1.0) * intensity.clamp(0.0, 1.0) * GLITCH_MAX_SHIFT_PX
}

#[cfg(test)]
#[path = "../../tests/unit/compose/evaluator.rs"]
mod tests;
