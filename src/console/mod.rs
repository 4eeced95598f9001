//! Terminal rendering of session cues.

use crate::breathing::{SessionEvent, SessionSnapshot};
use crate::error::SessionError;
use crate::listener::SessionListener;
use crate::preset::MeditationPreset;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

const BAR_WIDTH: usize = 20;

/// Seconds with at most one decimal, e.g. `4s` or `1.5s`
pub fn format_seconds(d: Duration) -> String {
	let tenths = (d.as_millis() + 50) / 100;
	if tenths % 10 == 0 {
		format!("{}s", tenths / 10)
	} else {
		format!("{}.{}s", tenths / 10, tenths % 10)
	}
}

/// Format a duration as M:SS
pub fn format_clock(d: Duration) -> String {
	let secs = d.as_secs();
	format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn progress_bar(progress: f64, width: usize) -> String {
	let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
	format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// One line of human-readable output for an event
pub fn format_event(event: &SessionEvent, snapshot: &SessionSnapshot) -> String {
	match event {
		SessionEvent::PhaseStarted {
			phase,
			duration,
			round,
		} => format!(
			"[{}/{}] {:<7} {}",
			round,
			snapshot.rounds,
			phase.cue(),
			format_seconds(*duration)
		),
		SessionEvent::RoundCompleted { round } => {
			let progress = if snapshot.rounds == 0 {
				0.0
			} else {
				f64::from(*round) / f64::from(snapshot.rounds)
			};
			format!(
				"Round {}/{} done {} {:.0}%",
				round,
				snapshot.rounds,
				progress_bar(progress, BAR_WIDTH),
				progress * 100.0
			)
		}
		SessionEvent::SessionCompleted => format!(
			"Session complete ({})",
			format_clock(snapshot.session_elapsed)
		),
		SessionEvent::SessionPaused => "Paused. Press Enter to resume, q to quit.".to_string(),
		SessionEvent::SessionResumed => "Resumed.".to_string(),
		SessionEvent::SessionCancelled => format!(
			"Session cancelled at {:.0}% ({} of {})",
			snapshot.progress() * 100.0,
			format_clock(snapshot.session_elapsed),
			format_clock(snapshot.total_duration)
		),
	}
}

/// Multi-line description of a preset's cycle plan
pub fn format_plan(preset: &MeditationPreset) -> Result<String, SessionError> {
	let plan = preset.cycle_plan()?;
	let mut out = String::new();
	let _ = writeln!(out, "{} ({})", preset.name, preset.technique.display_name());
	if !preset.description.is_empty() {
		let _ = writeln!(out, "  {}", preset.description);
	}
	for step in plan.steps() {
		let _ = writeln!(out, "  {:<13} {}", step.phase.to_string(), format_seconds(step.duration));
	}
	let _ = write!(
		out,
		"  {} rounds x {} = {}",
		preset.rounds,
		format_seconds(plan.round_duration()),
		format_clock(plan.total_duration())
	);
	Ok(out)
}

#[derive(Serialize)]
struct JsonLine<'a> {
	#[serde(flatten)]
	event: &'a SessionEvent,
	elapsed_seconds: f64,
	progress: f64,
}

/// Prints cues as text or JSON lines
pub struct ConsoleListener<W: Write> {
	out: W,
	json: bool,
}

impl ConsoleListener<io::Stdout> {
	pub fn stdout(json: bool) -> Self {
		Self::new(io::stdout(), json)
	}
}

impl<W: Write> ConsoleListener<W> {
	pub fn new(out: W, json: bool) -> Self {
		Self { out, json }
	}

	pub fn into_inner(self) -> W {
		self.out
	}

	fn render(&self, event: &SessionEvent, snapshot: &SessionSnapshot) -> String {
		if !self.json {
			return format_event(event, snapshot);
		}
		let line = JsonLine {
			event,
			elapsed_seconds: snapshot.session_elapsed.as_secs_f64(),
			progress: snapshot.progress(),
		};
		serde_json::to_string(&line).unwrap_or_else(|e| {
			log::error!("Failed to encode event: {}", e);
			String::new()
		})
	}
}

impl<W: Write> SessionListener for ConsoleListener<W> {
	fn on_event(&mut self, event: &SessionEvent, snapshot: &SessionSnapshot) {
		let line = self.render(event, snapshot);
		if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
			log::warn!("Failed to write to console: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::breathing::BreathSequencer;
	use crate::types::{Phase, Technique};

	fn running_snapshot() -> SessionSnapshot {
		let preset = MeditationPreset::new("box", "Box", Technique::Box)
			.with_pattern(4.0, 4.0, 4.0, 4.0)
			.with_rounds(4);
		let mut seq = BreathSequencer::new();
		seq.start(&preset).unwrap();
		seq.advance(16.0).unwrap();
		seq.current_state()
	}

	#[test]
	fn seconds_formatting() {
		assert_eq!(format_seconds(Duration::from_secs(4)), "4s");
		assert_eq!(format_seconds(Duration::from_millis(1500)), "1.5s");
		assert_eq!(format_seconds(Duration::ZERO), "0s");
		assert_eq!(format_clock(Duration::from_secs(64)), "1:04");
	}

	#[test]
	fn progress_bar_fills_proportionally() {
		assert_eq!(progress_bar(0.5, 4), "[██░░]");
		assert_eq!(progress_bar(2.0, 3), "[███]");
		assert_eq!(progress_bar(-1.0, 2), "[░░]");
	}

	#[test]
	fn text_cues() {
		let snapshot = running_snapshot();
		let event = SessionEvent::PhaseStarted {
			phase: Phase::Exhale,
			duration: Duration::from_secs(4),
			round: 2,
		};
		assert_eq!(format_event(&event, &snapshot), "[2/4] EXHALE  4s");
		let done = format_event(&SessionEvent::RoundCompleted { round: 1 }, &snapshot);
		assert!(done.starts_with("Round 1/4 done"));
		assert!(done.ends_with("25%"));
	}

	#[test]
	fn json_lines() {
		let snapshot = running_snapshot();
		let mut listener = ConsoleListener::new(Vec::new(), true);
		listener.on_event(&SessionEvent::RoundCompleted { round: 1 }, &snapshot);
		listener.on_event(&SessionEvent::SessionPaused, &snapshot);
		let out = String::from_utf8(listener.into_inner()).unwrap();
		let lines: Vec<serde_json::Value> = out
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect();
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[0]["event"], "round_completed");
		assert_eq!(lines[0]["round"], 1);
		assert_eq!(lines[0]["elapsed_seconds"], 16.0);
		assert_eq!(lines[1]["event"], "session_paused");
	}

	#[test]
	fn plan_lists_non_zero_phases() {
		let preset = MeditationPreset::new("478", "Relax", Technique::FourSevenEight)
			.with_pattern(4.0, 7.0, 8.0, 0.0)
			.with_rounds(4);
		let plan = format_plan(&preset).unwrap();
		assert!(plan.contains("inhale"));
		assert!(plan.contains("hold (full)"));
		assert!(!plan.contains("hold (empty)"));
		assert!(plan.ends_with("4 rounds x 19s = 1:16"));
	}
}
