//! Consumers of session events.

use crate::breathing::{SessionEvent, SessionSnapshot};
use std::sync::{Arc, Mutex};

/// Receives every session event in the order it happened
pub trait SessionListener {
	fn on_event(&mut self, event: &SessionEvent, snapshot: &SessionSnapshot);
}

impl<F> SessionListener for F
where
	F: FnMut(&SessionEvent, &SessionSnapshot),
{
	fn on_event(&mut self, event: &SessionEvent, snapshot: &SessionSnapshot) {
		self(event, snapshot)
	}
}

/// Writes each event to the `log` facade
#[derive(Debug, Default)]
pub struct LogListener;

impl SessionListener for LogListener {
	fn on_event(&mut self, event: &SessionEvent, snapshot: &SessionSnapshot) {
		match event {
			SessionEvent::PhaseStarted {
				phase,
				duration,
				round,
			} => log::info!(
				"[Session] {} for {:.1}s (round {}/{})",
				phase,
				duration.as_secs_f64(),
				round,
				snapshot.rounds
			),
			SessionEvent::RoundCompleted { round } => {
				log::info!("[Session] Round {}/{} done", round, snapshot.rounds)
			}
			SessionEvent::SessionCompleted => log::info!(
				"[Session] Completed after {:.1}s",
				snapshot.session_elapsed.as_secs_f64()
			),
			SessionEvent::SessionPaused => log::info!("[Session] Paused"),
			SessionEvent::SessionResumed => log::info!("[Session] Resumed"),
			SessionEvent::SessionCancelled => log::info!(
				"[Session] Cancelled at {:.0}%",
				snapshot.progress() * 100.0
			),
		}
	}
}

/// Keeps a copy of every event it sees
///
/// Clones share one buffer, so a handle can be kept after the recorder is
/// handed to a reactor.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
	events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventRecorder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<SessionEvent> {
		match self.events.lock() {
			Ok(events) => events.clone(),
			Err(poisoned) => poisoned.into_inner().clone(),
		}
	}

	pub fn clear(&self) {
		if let Ok(mut events) = self.events.lock() {
			events.clear();
		}
	}
}

impl SessionListener for EventRecorder {
	fn on_event(&mut self, event: &SessionEvent, _snapshot: &SessionSnapshot) {
		match self.events.lock() {
			Ok(mut events) => events.push(event.clone()),
			Err(poisoned) => poisoned.into_inner().push(event.clone()),
		}
	}
}
