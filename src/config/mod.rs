/// Measured audio durations persisted between runs.
pub mod manifest;
/// Document model and defaults.
pub mod model;
/// Theme palettes.
pub mod theme;
/// Document validation.
pub mod validate;
