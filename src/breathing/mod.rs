//! The breathing session state machine.
//!
//! [`BreathSequencer`] owns the single source of truth for where a session is:
//! which round, which phase of the cycle plan, and how far into that phase.
//! Time only moves through [`BreathSequencer::advance`], and every boundary it
//! crosses is reported as a [`SessionEvent`] in chronological order.

use crate::error::SessionError;
use crate::preset::{CyclePlan, MeditationPreset, PhaseStep, serialize_secs};
use crate::types::{Phase, SessionStatus};
use serde::Serialize;
use std::time::Duration;

/// Something a listener can react to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
	PhaseStarted {
		phase: Phase,
		#[serde(rename = "duration_seconds", serialize_with = "serialize_secs")]
		duration: Duration,
		round: u32,
	},
	RoundCompleted {
		round: u32,
	},
	SessionCompleted,
	SessionPaused,
	SessionResumed,
	SessionCancelled,
}

impl SessionEvent {
	/// Whether the session is over after this event
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			SessionEvent::SessionCompleted | SessionEvent::SessionCancelled
		)
	}
}

/// Mutable position within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
	pub status: SessionStatus,
	pub current_round: u32,
	pub current_phase_index: usize,
	pub elapsed_in_phase: Duration,
}

/// Read-only view of a sequencer, cheap to clone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
	pub status: SessionStatus,
	pub preset_id: Option<String>,
	pub current_round: u32,
	pub rounds: u32,
	pub current_phase_index: usize,
	pub current_phase: Option<PhaseStep>,
	#[serde(serialize_with = "serialize_secs")]
	pub elapsed_in_phase: Duration,
	#[serde(serialize_with = "serialize_secs")]
	pub session_elapsed: Duration,
	#[serde(serialize_with = "serialize_secs")]
	pub total_duration: Duration,
}

impl SessionSnapshot {
	pub fn remaining_in_phase(&self) -> Duration {
		self.current_phase
			.map(|step| step.duration.saturating_sub(self.elapsed_in_phase))
			.unwrap_or_default()
	}

	/// Fraction of the whole session already breathed, 0.0 to 1.0
	pub fn progress(&self) -> f64 {
		if self.total_duration.is_zero() {
			return 0.0;
		}
		(self.session_elapsed.as_secs_f64() / self.total_duration.as_secs_f64()).clamp(0.0, 1.0)
	}
}

struct ActiveSession {
	preset_id: String,
	plan: CyclePlan,
	rounds: u32,
}

/// Drives one guided breathing session at a time
#[derive(Default)]
pub struct BreathSequencer {
	session: Option<ActiveSession>,
	state: SessionState,
}

impl BreathSequencer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Begin a session, returning the first phase
	pub fn start(&mut self, preset: &MeditationPreset) -> Result<SessionEvent, SessionError> {
		let status = self.state.status;
		if matches!(status, SessionStatus::Running | SessionStatus::Paused) {
			return Err(SessionError::invalid_state("start", status));
		}

		let plan = preset.cycle_plan()?;
		let first = plan.steps()[0];

		log::info!(
			"Starting session '{}': {} rounds of {} phases",
			preset.id,
			preset.rounds,
			plan.len()
		);

		self.session = Some(ActiveSession {
			preset_id: preset.id.clone(),
			plan,
			rounds: preset.rounds,
		});
		self.state = SessionState {
			status: SessionStatus::Running,
			current_round: 1,
			current_phase_index: 0,
			elapsed_in_phase: Duration::ZERO,
		};

		Ok(SessionEvent::PhaseStarted {
			phase: first.phase,
			duration: first.duration,
			round: 1,
		})
	}

	/// Advance by a number of seconds
	pub fn advance(&mut self, delta_seconds: f64) -> Result<Vec<SessionEvent>, SessionError> {
		let delta = Duration::try_from_secs_f64(delta_seconds).map_err(|_| {
			SessionError::InvalidArgument(format!(
				"delta must be a finite, non-negative number of seconds, got {}",
				delta_seconds
			))
		})?;
		self.advance_by(delta)
	}

	/// Advance by an exact duration, returning every boundary crossed
	pub fn advance_by(&mut self, delta: Duration) -> Result<Vec<SessionEvent>, SessionError> {
		self.require(SessionStatus::Running, "advance")?;
		let Some(session) = &self.session else {
			return Err(SessionError::invalid_state("advance", self.state.status));
		};

		let steps = session.plan.steps();
		let state = &mut self.state;
		let mut events = Vec::new();
		state.elapsed_in_phase = state.elapsed_in_phase.saturating_add(delta);

		loop {
			let step = steps[state.current_phase_index];
			if state.elapsed_in_phase < step.duration {
				break;
			}

			if state.current_phase_index + 1 < steps.len() {
				state.elapsed_in_phase -= step.duration;
				state.current_phase_index += 1;
			} else {
				events.push(SessionEvent::RoundCompleted {
					round: state.current_round,
				});
				log::debug!("Round {}/{} completed", state.current_round, session.rounds);

				if state.current_round >= session.rounds {
					// Park on the last phase, fully elapsed; leftover delta is dropped
					state.elapsed_in_phase = step.duration;
					state.status = SessionStatus::Completed;
					events.push(SessionEvent::SessionCompleted);
					log::info!("Session '{}' completed", session.preset_id);
					break;
				}

				state.elapsed_in_phase -= step.duration;
				state.current_phase_index = 0;
				state.current_round += 1;
			}

			let next = steps[state.current_phase_index];
			log::debug!(
				"Phase {} ({:?}) in round {}",
				next.phase,
				next.duration,
				state.current_round
			);
			events.push(SessionEvent::PhaseStarted {
				phase: next.phase,
				duration: next.duration,
				round: state.current_round,
			});
		}

		Ok(events)
	}

	pub fn pause(&mut self) -> Result<SessionEvent, SessionError> {
		self.require(SessionStatus::Running, "pause")?;
		self.state.status = SessionStatus::Paused;
		log::info!("Session paused");
		Ok(SessionEvent::SessionPaused)
	}

	pub fn resume(&mut self) -> Result<SessionEvent, SessionError> {
		self.require(SessionStatus::Paused, "resume")?;
		self.state.status = SessionStatus::Running;
		log::info!("Session resumed");
		Ok(SessionEvent::SessionResumed)
	}

	pub fn cancel(&mut self) -> Result<SessionEvent, SessionError> {
		let status = self.state.status;
		if status.is_terminal() {
			return Err(SessionError::invalid_state("cancel", status));
		}
		self.state.status = SessionStatus::Cancelled;
		log::info!("Session cancelled");
		Ok(SessionEvent::SessionCancelled)
	}

	pub fn status(&self) -> SessionStatus {
		self.state.status
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn current_state(&self) -> SessionSnapshot {
		let state = &self.state;
		let Some(session) = &self.session else {
			return SessionSnapshot {
				status: state.status,
				preset_id: None,
				current_round: 0,
				rounds: 0,
				current_phase_index: 0,
				current_phase: None,
				elapsed_in_phase: Duration::ZERO,
				session_elapsed: Duration::ZERO,
				total_duration: Duration::ZERO,
			};
		};

		let plan = &session.plan;
		let finished_rounds = state.current_round.saturating_sub(1);
		let finished_phases: Duration = plan.steps()[..state.current_phase_index]
			.iter()
			.map(|s| s.duration)
			.sum();

		SessionSnapshot {
			status: state.status,
			preset_id: Some(session.preset_id.clone()),
			current_round: state.current_round,
			rounds: session.rounds,
			current_phase_index: state.current_phase_index,
			current_phase: plan.get(state.current_phase_index).copied(),
			elapsed_in_phase: state.elapsed_in_phase,
			session_elapsed: plan
				.round_duration()
				.saturating_mul(finished_rounds)
				.saturating_add(finished_phases)
				.saturating_add(state.elapsed_in_phase),
			total_duration: plan.total_duration(),
		}
	}

	fn require(&self, expected: SessionStatus, operation: &'static str) -> Result<(), SessionError> {
		if self.state.status == expected {
			Ok(())
		} else {
			Err(SessionError::invalid_state(operation, self.state.status))
		}
	}
}
