use super::event::Event;
use super::queue::EventQueue;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct ScheduledEvent {
	emit_at: Duration,
	seq: u64,
	event: Event,
}

impl PartialEq for ScheduledEvent {
	fn eq(&self, other: &Self) -> bool {
		self.emit_at == other.emit_at && self.seq == other.seq
	}
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ScheduledEvent {
	// Reversed: BinaryHeap is a max-heap and the earliest event must surface first
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.emit_at
			.cmp(&self.emit_at)
			.then_with(|| other.seq.cmp(&self.seq))
	}
}

/// Holds events until a clock reading reaches their due time
pub struct Scheduler {
	pending: BinaryHeap<ScheduledEvent>,
	next_seq: u64,
}

impl Scheduler {
	pub fn new() -> Self {
		Self {
			pending: BinaryHeap::new(),
			next_seq: 0,
		}
	}

	/// Schedule an event to fire once the clock reads `emit_at`
	pub fn schedule(&mut self, event: Event, emit_at: Duration) {
		self.pending.push(ScheduledEvent {
			emit_at,
			seq: self.next_seq,
			event,
		});
		self.next_seq += 1;
	}

	/// Drain events due at `now` into the queue
	pub fn tick(&mut self, now: Duration, queue: &mut EventQueue) {
		while let Some(scheduled) = self.pending.peek() {
			if scheduled.emit_at > now {
				break;
			}
			if let Some(scheduled) = self.pending.pop() {
				queue.push(scheduled.event);
			}
		}
	}

	/// Due time of the earliest pending event
	pub fn next_due(&self) -> Option<Duration> {
		self.pending.peek().map(|s| s.emit_at)
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	pub fn clear(&mut self) {
		self.pending.clear();
	}
}

impl Default for Scheduler {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reactor::event::ControlEvent;
	use assert_matches::assert_matches;

	#[test]
	fn releases_only_due_events_in_time_order() {
		let mut scheduler = Scheduler::new();
		let mut queue = EventQueue::new();
		scheduler.schedule(Event::Control(ControlEvent::Resume), Duration::from_secs(5));
		scheduler.schedule(Event::Control(ControlEvent::Pause), Duration::from_secs(2));
		assert_eq!(scheduler.next_due(), Some(Duration::from_secs(2)));

		scheduler.tick(Duration::from_secs(1), &mut queue);
		assert!(queue.is_empty());

		scheduler.tick(Duration::from_secs(2), &mut queue);
		assert_matches!(queue.pop(), Some(Event::Control(ControlEvent::Pause)));
		assert!(queue.pop().is_none());

		scheduler.tick(Duration::from_secs(60), &mut queue);
		assert_matches!(queue.pop(), Some(Event::Control(ControlEvent::Resume)));
		assert!(scheduler.is_empty());
	}

	#[test]
	fn equal_due_times_keep_insertion_order() {
		let mut scheduler = Scheduler::new();
		let mut queue = EventQueue::new();
		let at = Duration::from_secs(1);
		scheduler.schedule(Event::Control(ControlEvent::Pause), at);
		scheduler.schedule(Event::Control(ControlEvent::Resume), at);
		scheduler.schedule(Event::Control(ControlEvent::TogglePause), at);

		scheduler.tick(at, &mut queue);
		assert_matches!(queue.pop(), Some(Event::Control(ControlEvent::Pause)));
		assert_matches!(queue.pop(), Some(Event::Control(ControlEvent::Resume)));
		assert_matches!(queue.pop(), Some(Event::Control(ControlEvent::TogglePause)));
	}
}
