//! Guided breathing sessions.
//!
//! A [`BreathSequencer`] walks a [`MeditationPreset`] through its rounds of
//! inhale, hold, exhale and hold. A [`SessionClock`] feeds it time, and a
//! [`Reactor`] ties the two together with control commands and listeners.

pub mod breathing;
pub mod clock;
pub mod console;
pub mod error;
pub mod listener;
pub mod preset;
pub mod reactor;
pub mod settings;
pub mod types;

pub use breathing::{BreathSequencer, SessionEvent, SessionSnapshot, SessionState};
pub use clock::{Clock, ManualClock, SessionClock, SystemClock};
pub use error::SessionError;
pub use listener::{EventRecorder, LogListener, SessionListener};
pub use preset::{CyclePlan, MeditationPreset, PhaseStep, PresetLibrary};
pub use reactor::{ControlEvent, ControlHandle, Reactor};
pub use settings::Settings;
pub use types::{Phase, SessionStatus, Technique};
