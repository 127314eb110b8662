/// Scene-relative cue resolution and same-track collision handling.
pub mod scheduler;
