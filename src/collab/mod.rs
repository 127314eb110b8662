/// Script-writing collaborator boundary and response parsing.
pub mod script;
/// Speech synthesis boundary and audio manifest generation.
pub mod speech;
/// Duration probing for synthesized audio.
pub mod wav;
