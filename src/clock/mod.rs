//! Time sources and the adapter that feeds them into a sequencer.

use crate::breathing::{BreathSequencer, SessionEvent};
use crate::error::SessionError;
use crate::types::SessionStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock {
	/// Time since an arbitrary, fixed origin
	fn now(&self) -> Duration;
}

/// Wall-clock time backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
	origin: Instant,
}

impl SystemClock {
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
		}
	}
}

impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SystemClock {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}

/// Virtual time that only moves when told to
///
/// Clones share the same time, so a test can keep one handle while the
/// session clock owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	nanos: Arc<AtomicU64>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn advance(&self, delta: Duration) {
		let nanos = u64::try_from(delta.as_nanos()).unwrap_or(u64::MAX);
		self.nanos.fetch_add(nanos, Ordering::SeqCst);
	}

	pub fn set(&self, now: Duration) {
		let nanos = u64::try_from(now.as_nanos()).unwrap_or(u64::MAX);
		self.nanos.store(nanos, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Duration {
		Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
	}
}

/// Bridges a [`Clock`] to [`BreathSequencer::advance`]
///
/// Time is only forwarded while the sequencer is running. Reads taken while
/// paused still move the read mark, so a pause never replays into the session.
pub struct SessionClock<C: Clock = SystemClock> {
	clock: C,
	resolution: Duration,
	last_read: Option<Duration>,
}

impl<C: Clock> SessionClock<C> {
	pub fn new(clock: C, resolution: Duration) -> Self {
		Self {
			clock,
			resolution: resolution.max(Duration::from_millis(1)),
			last_read: None,
		}
	}

	/// Start measuring from the current instant
	pub fn start(&mut self) {
		let now = self.clock.now();
		log::debug!("Session clock started at {:?}", now);
		self.last_read = Some(now);
	}

	pub fn stop(&mut self) {
		if self.last_read.take().is_some() {
			log::debug!("Session clock stopped");
		}
	}

	pub fn is_running(&self) -> bool {
		self.last_read.is_some()
	}

	/// Interval between polls when driven in real time
	pub fn resolution(&self) -> Duration {
		self.resolution
	}

	pub fn now(&self) -> Duration {
		self.clock.now()
	}

	pub fn clock(&self) -> &C {
		&self.clock
	}

	/// Forward `delta_seconds` straight to the sequencer
	pub fn tick(
		&mut self,
		sequencer: &mut BreathSequencer,
		delta_seconds: f64,
	) -> Result<Vec<SessionEvent>, SessionError> {
		if !Self::accepts_time(sequencer) {
			return Ok(Vec::new());
		}
		sequencer.advance(delta_seconds)
	}

	pub fn tick_by(
		&mut self,
		sequencer: &mut BreathSequencer,
		delta: Duration,
	) -> Result<Vec<SessionEvent>, SessionError> {
		if !Self::accepts_time(sequencer) {
			return Ok(Vec::new());
		}
		sequencer.advance_by(delta)
	}

	/// Read the clock and forward the time elapsed since the previous read
	pub fn poll(&mut self, sequencer: &mut BreathSequencer) -> Result<Vec<SessionEvent>, SessionError> {
		let Some(last) = self.last_read else {
			return Ok(Vec::new());
		};
		let now = self.clock.now();
		self.last_read = Some(now);
		self.tick_by(sequencer, now.saturating_sub(last))
	}

	fn accepts_time(sequencer: &BreathSequencer) -> bool {
		let status = sequencer.current_state().status;
		if status != SessionStatus::Running {
			log::trace!("Tick skipped: session is {}", status);
			return false;
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::preset::MeditationPreset;
	use crate::types::{Phase, Technique};

	fn started() -> BreathSequencer {
		let preset = MeditationPreset::new("t", "T", Technique::Box)
			.with_pattern(2.0, 0.0, 2.0, 0.0)
			.with_rounds(2);
		let mut seq = BreathSequencer::new();
		seq.start(&preset).unwrap();
		seq
	}

	#[test]
	fn manual_clock_clones_share_time() {
		let clock = ManualClock::new();
		let handle = clock.clone();
		handle.advance(Duration::from_millis(1500));
		assert_eq!(clock.now(), Duration::from_millis(1500));
		handle.set(Duration::from_secs(10));
		assert_eq!(clock.now(), Duration::from_secs(10));
	}

	#[test]
	fn system_clock_is_monotonic() {
		let clock = SystemClock::new();
		let a = clock.now();
		let b = clock.now();
		assert!(b >= a);
	}

	#[test]
	fn tick_passes_through_when_running() {
		let mut seq = started();
		let mut clock = SessionClock::new(ManualClock::new(), Duration::from_millis(100));
		let events = clock.tick(&mut seq, 2.0).unwrap();
		assert_eq!(
			events,
			vec![SessionEvent::PhaseStarted {
				phase: Phase::Exhale,
				duration: Duration::from_secs(2),
				round: 1,
			}]
		);
		assert!(clock.tick(&mut seq, -1.0).is_err());
	}

	#[test]
	fn tick_skips_paused_and_terminal_sessions() {
		let mut seq = started();
		let mut clock = SessionClock::new(ManualClock::new(), Duration::from_millis(100));

		seq.pause().unwrap();
		let before = seq.current_state();
		assert!(clock.tick(&mut seq, 5.0).unwrap().is_empty());
		assert_eq!(seq.current_state(), before);

		seq.cancel().unwrap();
		assert!(clock.tick(&mut seq, 5.0).unwrap().is_empty());

		let mut idle = BreathSequencer::new();
		assert!(clock.tick(&mut idle, 1.0).unwrap().is_empty());
	}

	#[test]
	fn poll_forwards_elapsed_time() {
		let time = ManualClock::new();
		let mut seq = started();
		let mut clock = SessionClock::new(time.clone(), Duration::from_millis(100));

		time.advance(Duration::from_secs(1));
		assert!(clock.poll(&mut seq).unwrap().is_empty(), "stopped clock forwards nothing");
		assert_eq!(seq.current_state().elapsed_in_phase, Duration::ZERO);

		clock.start();
		time.advance(Duration::from_millis(2500));
		assert_eq!(clock.poll(&mut seq).unwrap().len(), 1);
		assert_eq!(seq.current_state().elapsed_in_phase, Duration::from_millis(500));
	}

	#[test]
	fn paused_time_is_not_replayed() {
		let time = ManualClock::new();
		let mut seq = started();
		let mut clock = SessionClock::new(time.clone(), Duration::from_millis(100));
		clock.start();

		time.advance(Duration::from_secs(1));
		clock.poll(&mut seq).unwrap();
		seq.pause().unwrap();

		time.advance(Duration::from_secs(30));
		clock.poll(&mut seq).unwrap();
		seq.resume().unwrap();

		time.advance(Duration::from_millis(500));
		clock.poll(&mut seq).unwrap();
		assert_eq!(seq.current_state().elapsed_in_phase, Duration::from_millis(1500));
	}

	/// Moves forward a second on every read
	struct SteppingClock(std::cell::Cell<u64>);

	impl Clock for SteppingClock {
		fn now(&self) -> Duration {
			let secs = self.0.get() + 1;
			self.0.set(secs);
			Duration::from_secs(secs)
		}
	}

	#[test]
	fn start_anchors_on_a_single_read() {
		let mut seq = started();
		let mut clock = SessionClock::new(
			SteppingClock(std::cell::Cell::new(0)),
			Duration::from_millis(100),
		);
		clock.start();
		assert_eq!(clock.clock().0.get(), 1);

		clock.poll(&mut seq).unwrap();
		assert_eq!(clock.clock().0.get(), 2);
		assert_eq!(seq.current_state().elapsed_in_phase, Duration::from_secs(1));
	}

	#[test]
	fn resolution_has_a_floor() {
		let clock = SessionClock::new(ManualClock::new(), Duration::ZERO);
		assert_eq!(clock.resolution(), Duration::from_millis(1));
	}
}
