use super::event::{Event, Priority};
use std::collections::VecDeque;

/// Priority event queue, FIFO within each level
pub struct EventQueue {
	queues: [VecDeque<Event>; Priority::COUNT],
}

impl EventQueue {
	pub fn new() -> Self {
		Self {
			queues: [
				VecDeque::new(), // Critical
				VecDeque::new(), // Normal
			],
		}
	}

	/// Push an event to the appropriate priority queue
	pub fn push(&mut self, event: Event) {
		let priority = event.priority();
		self.queues[priority.as_index()].push_back(event);
	}

	/// Pop the highest priority event available
	pub fn pop(&mut self) -> Option<Event> {
		for queue in &mut self.queues {
			if let Some(event) = queue.pop_front() {
				return Some(event);
			}
		}
		None
	}

	pub fn is_empty(&self) -> bool {
		self.queues.iter().all(VecDeque::is_empty)
	}

	pub fn len(&self) -> usize {
		self.queues.iter().map(VecDeque::len).sum()
	}
}

impl Default for EventQueue {
	fn default() -> Self {
		Self::new()
	}
}
