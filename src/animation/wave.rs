/// Shape of a periodic oscillation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveShape {
    /// `sin`, range `[-1, 1]`.
    Sine,
    /// `cos`, range `[-1, 1]`.
    Cosine,
    /// `|sin|`, range `[0, 1]` (bounce).
    AbsSine,
}

/// Stateless oscillation `offset + amplitude * shape(frame / divisor + phase)`.
///
/// `divisor` is frames per radian, so `Wave::sine(25.0, 4.0)` completes a cycle every
/// `2 * PI * 25` frames.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Wave {
    /// Oscillation shape.
    pub shape: WaveShape,
    /// Frames per radian; must be non-zero.
    pub divisor: f64,
    /// Peak deviation.
    pub amplitude: f64,
    /// Phase offset in radians.
    pub phase: f64,
    /// Constant added to the result.
    pub offset: f64,
}

impl Wave {
    /// Sine wave centred on zero.
    pub const fn sine(divisor: f64, amplitude: f64) -> Self {
        Self {
            shape: WaveShape::Sine,
            divisor,
            amplitude,
            phase: 0.0,
            offset: 0.0,
        }
    }

    /// Rectified sine bouncing between 0 and `amplitude`.
    pub const fn bounce(divisor: f64, amplitude: f64) -> Self {
        Self {
            shape: WaveShape::AbsSine,
            divisor,
            amplitude,
            phase: 0.0,
            offset: 0.0,
        }
    }

    /// Same wave shifted vertically.
    pub const fn with_offset(self, offset: f64) -> Self {
        Self { offset, ..self }
    }

    /// Same wave with a phase offset.
    pub const fn with_phase(self, phase: f64) -> Self {
        Self { phase, ..self }
    }

    /// Value at `frame`. A zero divisor yields the resting `offset`.
    pub fn sample(self, frame: f64) -> f64 {
        if self.divisor == 0.0 || !self.divisor.is_finite() {
            return self.offset;
        }
        let x = frame / self.divisor + self.phase;
        let s = match self.shape {
            WaveShape::Sine => x.sin(),
            WaveShape::Cosine => x.cos(),
            WaveShape::AbsSine => x.sin().abs(),
        };
        self.offset + self.amplitude * s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/wave.rs"]
mod tests;
