pub mod event;
pub mod queue;
pub mod scheduler;

pub use event::{ComponentResponse, ControlEvent, Event, Priority};
pub use queue::EventQueue;
pub use scheduler::Scheduler;

use crate::breathing::{BreathSequencer, SessionEvent, SessionSnapshot};
use crate::clock::{Clock, SessionClock, SystemClock};
use crate::listener::SessionListener;
use crate::types::SessionStatus;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;

const CONTROL_CHANNEL_SIZE: usize = 32;
const MAX_ITERATIONS: usize = 1000;

/// Sends control commands to a reactor from another task or thread
#[derive(Clone)]
pub struct ControlHandle {
	sender: mpsc::Sender<ControlEvent>,
}

impl ControlHandle {
	pub fn send(&self, event: ControlEvent) -> Result<(), TrySendError<ControlEvent>> {
		self.sender.try_send(event)
	}
}

/// Routes clock time, control commands and session events
///
/// Everything runs on the caller's thread; other tasks reach the reactor only
/// through a [`ControlHandle`].
pub struct Reactor<C: Clock = SystemClock> {
	queue: EventQueue,
	scheduler: Scheduler,
	clock: SessionClock<C>,
	sequencer: BreathSequencer,
	listeners: Vec<Box<dyn SessionListener>>,
	control_rx: Option<mpsc::Receiver<ControlEvent>>,
}

impl<C: Clock> Reactor<C> {
	pub fn new(clock: SessionClock<C>) -> Self {
		log::info!(
			"Initializing reactor (tick every {:?})",
			clock.resolution()
		);
		Self {
			queue: EventQueue::new(),
			scheduler: Scheduler::new(),
			clock,
			sequencer: BreathSequencer::new(),
			listeners: Vec::new(),
			control_rx: None,
		}
	}

	pub fn add_listener(&mut self, listener: impl SessionListener + 'static) {
		self.listeners.push(Box::new(listener));
	}

	/// Open the control channel, replacing any previous one
	pub fn control_handle(&mut self) -> ControlHandle {
		let (sender, receiver) = mpsc::channel(CONTROL_CHANNEL_SIZE);
		self.control_rx = Some(receiver);
		ControlHandle { sender }
	}

	/// Queue a command for the next tick
	pub fn push(&mut self, control: ControlEvent) {
		self.queue.push(Event::Control(control));
	}

	/// Queue a command once `delay` has passed on the session clock
	pub fn schedule(&mut self, control: ControlEvent, delay: Duration) {
		let at = self.clock.now().saturating_add(delay);
		log::debug!("Scheduled {:?} at {:?}", control, at);
		self.scheduler.schedule(Event::Control(control), at);
	}

	fn process_response(&mut self, response: ComponentResponse) {
		for e in response.events {
			self.queue.push(e);
		}
		for (e, d) in response.scheduled {
			let at = self.clock.now().saturating_add(d);
			self.scheduler.schedule(e, at);
		}
	}

	pub fn tick(&mut self) {
		// Collect commands from other tasks
		if let Some(rx) = self.control_rx.as_mut() {
			while let Ok(control) = rx.try_recv() {
				self.queue.push(Event::Control(control));
			}
		}

		// Drain scheduled events
		let now = self.clock.now();
		self.scheduler.tick(now, &mut self.queue);

		// Credit elapsed time before acting on new commands
		match self.clock.poll(&mut self.sequencer) {
			Ok(events) => self.process_response(events.into()),
			Err(e) => log::error!("Clock poll failed: {}", e),
		}

		// Process event queue until empty
		let mut iterations = 0;
		while let Some(event) = self.queue.pop() {
			log::trace!("Processing event: {:?}", event);
			let response = self.route(&event);
			self.process_response(response);

			iterations += 1;
			if iterations > MAX_ITERATIONS {
				log::warn!("Event loop exceeded {} iterations, breaking", MAX_ITERATIONS);
				break;
			}
		}
	}

	fn route(&mut self, event: &Event) -> ComponentResponse {
		match event {
			Event::Control(control) => self.handle_control(control),
			Event::Session(session_event) => {
				self.publish(session_event);
				ComponentResponse::none()
			}
		}
	}

	fn handle_control(&mut self, control: &ControlEvent) -> ComponentResponse {
		let result = match control {
			ControlEvent::Start { preset } => self.sequencer.start(preset).map(|event| {
				self.clock.start();
				vec![event]
			}),
			ControlEvent::Pause => self.sequencer.pause().map(|e| vec![e]),
			ControlEvent::Resume => self.sequencer.resume().map(|e| vec![e]),
			ControlEvent::TogglePause => match self.sequencer.status() {
				SessionStatus::Paused => self.sequencer.resume().map(|e| vec![e]),
				_ => self.sequencer.pause().map(|e| vec![e]),
			},
			ControlEvent::Cancel => {
				self.scheduler.clear();
				self.sequencer.cancel().map(|e| vec![e])
			}
		};

		match result {
			Ok(events) => events.into(),
			Err(e) => {
				log::warn!("Ignoring {:?}: {}", control, e);
				ComponentResponse::none()
			}
		}
	}

	fn publish(&mut self, event: &SessionEvent) {
		let snapshot = self.sequencer.current_state();
		if event.is_terminal() {
			self.clock.stop();
		}
		for listener in &mut self.listeners {
			listener.on_event(event, &snapshot);
		}
	}

	pub fn snapshot(&self) -> SessionSnapshot {
		self.sequencer.current_state()
	}

	pub fn sequencer(&self) -> &BreathSequencer {
		&self.sequencer
	}

	pub fn session_clock(&self) -> &SessionClock<C> {
		&self.clock
	}

	/// No session is active and nothing is waiting to run
	pub fn is_idle(&self) -> bool {
		let status = self.sequencer.status();
		let active = matches!(status, SessionStatus::Running | SessionStatus::Paused);
		!active && self.queue.is_empty() && self.scheduler.is_empty()
	}

	/// Tick at the clock's resolution until the reactor goes idle
	pub async fn run(&mut self) -> SessionSnapshot {
		let mut interval = tokio::time::interval(self.clock.resolution());
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			interval.tick().await;
			self.tick();
			if self.is_idle() {
				break;
			}
		}

		let snapshot = self.snapshot();
		log::info!("Reactor idle, session {}", snapshot.status);
		snapshot
	}
}
