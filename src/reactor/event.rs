use crate::breathing::SessionEvent;
use crate::preset::MeditationPreset;
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum Event {
	Control(ControlEvent),
	Session(SessionEvent),
}

impl Event {
	pub fn priority(&self) -> Priority {
		match self {
			// Already happened; deliver before acting on anything new
			Event::Session(_) => Priority::Critical,
			// Commands stay in arrival order among themselves
			Event::Control(_) => Priority::Normal,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
	Critical = 0,
	Normal = 1,
}

impl Priority {
	pub const COUNT: usize = 2;

	pub fn as_index(&self) -> usize {
		*self as usize
	}
}

/// Commands that drive the sequencer
#[derive(Clone, Debug)]
pub enum ControlEvent {
	Start { preset: Box<MeditationPreset> },
	Pause,
	Resume,
	/// Pause when running, resume when paused
	TogglePause,
	Cancel,
}

/// Response from a handler
#[derive(Default)]
pub struct ComponentResponse {
	/// Events to dispatch immediately
	pub events: Vec<Event>,
	/// Events to schedule (event, delay)
	pub scheduled: Vec<(Event, Duration)>,
}

impl ComponentResponse {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn emit(event: Event) -> Self {
		Self {
			events: vec![event],
			scheduled: vec![],
		}
	}

	pub fn emit_many(events: Vec<Event>) -> Self {
		Self {
			events,
			scheduled: vec![],
		}
	}

	pub fn schedule(event: Event, delay: Duration) -> Self {
		Self {
			events: vec![],
			scheduled: vec![(event, delay)],
		}
	}
}

impl From<Vec<SessionEvent>> for ComponentResponse {
	fn from(events: Vec<SessionEvent>) -> Self {
		Self::emit_many(events.into_iter().map(Event::Session).collect())
	}
}
