//! Dictation text processing.
//!
//! Spoken-command substitution ("period" -> "."), filler removal,
//! contraction fixes, and the final punctuation/capitalization polish.
//! Control phrases ("scratch that") short-circuit the pipeline entirely.

mod commands;
mod corrections;
mod normalize;


pub use commands::{detect_control, ControlCommand};
pub use normalize::{apply, normalize, Normalized, NormalizeFlags};
