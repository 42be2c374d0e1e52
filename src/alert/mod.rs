//! Per-subject threat levels and the ambience they drive

pub mod ambience;
pub mod levels;

pub use ambience::{alert_driven_cue, ambient_cue, AmbientCue, CuePlay, PresenceTimer};
pub use levels::{AlertLevels, AlertRise};
