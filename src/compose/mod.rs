/// Merges timeline, cues and global tracks into a [`schedule::Schedule`].
pub mod assembler;
/// Pure per-frame motion functions.
pub mod evaluator;
/// Z order and evaluated frame types.
pub mod layers;
/// The assembled, serializable event list and its per-frame evaluation.
pub mod schedule;
/// Word-reveal subtitles and highlight matching.
pub mod subtitle;
