use crate::{
    animation::ease::Ease,
    foundation::error::{StoryError, StoryResult},
};

/// Behavior outside the breakpoint domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Hold the outermost breakpoint value.
    #[default]
    Clamp,
    /// Continue the outermost segment's linear slope.
    Extend,
}

/// Piecewise interpolation over strictly increasing breakpoints.
///
/// A `Curve` holds no cursor or cache: [`Curve::sample`] is a pure function of its input, so any
/// frame can be queried in any order from any thread.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Curve {
    xs: Vec<f64>,
    ys: Vec<f64>,
    ease: Ease,
    left: Edge,
    right: Edge,
}

impl Curve {
    /// Build a validated curve.
    ///
    /// `xs` must be non-empty, finite and strictly increasing; `ys` must match its length.
    pub fn new(xs: &[f64], ys: &[f64], ease: Ease, left: Edge, right: Edge) -> StoryResult<Self> {
        if xs.is_empty() {
            return Err(StoryError::evaluation("curve needs at least one breakpoint"));
        }
        if xs.len() != ys.len() {
            return Err(StoryError::evaluation(format!(
                "curve has {} inputs but {} outputs",
                xs.len(),
                ys.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(StoryError::evaluation("curve breakpoints must be finite"));
        }
        if !xs.windows(2).all(|w| w[0] < w[1]) {
            return Err(StoryError::evaluation(
                "curve breakpoints must be strictly increasing",
            ));
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            ease,
            left,
            right,
        })
    }

    /// Linear curve clamped on both sides.
    pub fn clamped(xs: &[f64], ys: &[f64]) -> StoryResult<Self> {
        Self::new(xs, ys, Ease::Linear, Edge::Clamp, Edge::Clamp)
    }

    /// Sample the curve at `x`.
    pub fn sample(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 1 || x.is_nan() {
            return self.ys[0];
        }

        let first = self.xs[0];
        let last = self.xs[n - 1];
        if x < first {
            return match self.left {
                Edge::Clamp => self.ys[0],
                Edge::Extend => self.ys[0] + (x - first) * self.slope(0),
            };
        }
        if x > last {
            return match self.right {
                Edge::Clamp => self.ys[n - 1],
                Edge::Extend => self.ys[n - 1] + (x - last) * self.slope(n - 2),
            };
        }

        // First breakpoint strictly greater than x; `x == last` lands on the final segment end.
        let idx = self.xs.partition_point(|&k| k <= x).clamp(1, n - 1);
        let (x0, x1) = (self.xs[idx - 1], self.xs[idx]);
        let (y0, y1) = (self.ys[idx - 1], self.ys[idx]);
        let t = self.ease.apply((x - x0) / (x1 - x0));
        y0 + (y1 - y0) * t
    }

    fn slope(&self, seg: usize) -> f64 {
        (self.ys[seg + 1] - self.ys[seg]) / (self.xs[seg + 1] - self.xs[seg])
    }
}

/// One-shot interpolation of `x` over breakpoints without keeping the curve.
pub fn interpolate(x: f64, xs: &[f64], ys: &[f64], ease: Ease, edge: Edge) -> StoryResult<f64> {
    Ok(Curve::new(xs, ys, ease, edge, edge)?.sample(x))
}

/// Symmetric entrance/exit opacity envelope over an element's lifetime.
///
/// Opacity ramps `0 -> 1` over the first `fade_in` frames and `1 -> 0` over the last `fade_out`
/// frames. When the two ramps overlap (short elements) the smaller value wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FadeEnvelope {
    /// Element lifetime in frames.
    pub length: u64,
    /// Entrance ramp length.
    pub fade_in: u64,
    /// Exit ramp length.
    pub fade_out: u64,
}

impl FadeEnvelope {
    /// Envelope for an element living `length` frames.
    pub fn new(length: u64, fade_in: u64, fade_out: u64) -> Self {
        Self {
            length,
            fade_in,
            fade_out,
        }
    }

    /// Opacity at `local` frames after the element's start.
    pub fn opacity(self, local: f64) -> f64 {
        if local < 0.0 || local >= self.length as f64 {
            return 0.0;
        }
        let rise = if self.fade_in == 0 {
            1.0
        } else {
            (local / self.fade_in as f64).min(1.0)
        };
        let fall = if self.fade_out == 0 {
            1.0
        } else {
            // Last frame of life (`length - 1`) reaches zero.
            let remaining = (self.length as f64 - 1.0 - local).max(0.0);
            (remaining / self.fade_out as f64).min(1.0)
        };
        rise.min(fall).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
