use crate::foundation::core::Fps;

/// Physical parameters of a damped spring pulled from rest at 0 toward 1.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpringConfig {
    /// Damping coefficient `c`.
    pub damping: f64,
    /// Mass `m`.
    pub mass: f64,
    /// Stiffness `k`.
    pub stiffness: f64,
    /// Once the response first reaches 1 it stays there, which keeps progress monotone.
    pub overshoot_clamping: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            mass: 1.0,
            stiffness: 100.0,
            overshoot_clamping: true,
        }
    }
}

impl SpringConfig {
    /// Spring with the given damping, mass and stiffness and overshoot clamping enabled.
    pub const fn new(damping: f64, mass: f64, stiffness: f64) -> Self {
        Self {
            damping,
            mass,
            stiffness,
            overshoot_clamping: true,
        }
    }

    /// Same spring, allowing the response to overshoot past 1.
    pub const fn unclamped(self) -> Self {
        Self {
            overshoot_clamping: false,
            ..self
        }
    }

    fn sanitized(self) -> Option<(f64, f64, f64)> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.mass) || !ok(self.stiffness) {
            return None;
        }
        let damping = if self.damping.is_finite() {
            self.damping.max(0.0)
        } else {
            0.0
        };
        Some((damping, self.mass, self.stiffness))
    }

    /// Progress in `[0, 1]` after `elapsed_frames` at `fps`.
    ///
    /// Negative elapsed frames yield the rest value 0. The response is recomputed from its closed
    /// form on every call.
    pub fn progress(self, elapsed_frames: f64, fps: Fps) -> f64 {
        spring(elapsed_frames, fps, self)
    }
}

/// Closed-form damped-spring progress.
///
/// Solves `m x'' + c x' + k (x - 1) = 0` with `x(0) = 0`, `x'(0) = 0`. Under-damped springs are cut
/// at their first crossing of 1 when `overshoot_clamping` is set. Degenerate parameters
/// (non-positive mass or stiffness) settle immediately.
pub fn spring(elapsed_frames: f64, fps: Fps, config: SpringConfig) -> f64 {
    if elapsed_frames.is_nan() || elapsed_frames <= 0.0 {
        return 0.0;
    }
    let Some((c, m, k)) = config.sanitized() else {
        return 1.0;
    };
    if elapsed_frames.is_infinite() {
        return 1.0;
    }

    let t = elapsed_frames / fps.as_f64();
    let w0 = (k / m).sqrt();
    let zeta = c / (2.0 * (k * m).sqrt());

    let x = if (zeta - 1.0).abs() < 1e-9 {
        1.0 - (-w0 * t).exp() * (1.0 + w0 * t)
    } else if zeta < 1.0 {
        let w1 = w0 * (1.0 - zeta * zeta).sqrt();
        if config.overshoot_clamping {
            let t_cross = (std::f64::consts::PI - (w1 / (zeta * w0)).atan()) / w1;
            if t >= t_cross {
                return 1.0;
            }
        }
        let envelope = (-zeta * w0 * t).exp();
        1.0 - envelope * ((w1 * t).cos() + (zeta * w0 / w1) * (w1 * t).sin())
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -w0 * (zeta - root);
        let r2 = -w0 * (zeta + root);
        1.0 - (r2 * (r1 * t).exp() - r1 * (r2 * t).exp()) / (r2 - r1)
    };

    if config.overshoot_clamping {
        x.clamp(0.0, 1.0)
    } else {
        x.max(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
