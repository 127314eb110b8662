/// Scene offsets and the [`builder::Timeline`] arena.
pub mod builder;
/// Sub-clip decomposition and crossfade windows.
pub mod subclip;
