/// Color parsing for theme and speaker accents.
pub mod color;
/// Frame, range, rate and canvas vocabulary.
pub mod core;
/// Error taxonomy and recoverable diagnostics.
pub mod error;
/// Stable xxh3 fingerprints.
pub mod hash;
