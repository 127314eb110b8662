/// Keyframe interpolation and fade envelopes.
pub mod curve;
/// Easing functions.
pub mod ease;
/// Closed-form damped spring.
pub mod spring;
/// Periodic oscillations.
pub mod wave;
