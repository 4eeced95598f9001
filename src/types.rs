use serde::{Deserialize, Serialize};
use std::fmt;

/// Breathing technique a preset is modelled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
	Box,
	Diaphragmatic,
	AlternateNostril,
	#[serde(rename = "4-7-8")]
	FourSevenEight,
	WimHof,
	#[default]
	Custom,
}

impl Technique {
	pub fn as_str(&self) -> &'static str {
		match self {
			Technique::Box => "box",
			Technique::Diaphragmatic => "diaphragmatic",
			Technique::AlternateNostril => "alternate-nostril",
			Technique::FourSevenEight => "4-7-8",
			Technique::WimHof => "wim-hof",
			Technique::Custom => "custom",
		}
	}

	pub fn display_name(&self) -> &'static str {
		match self {
			Technique::Box => "Box Breathing",
			Technique::Diaphragmatic => "Diaphragmatic Breathing",
			Technique::AlternateNostril => "Alternate Nostril",
			Technique::FourSevenEight => "4-7-8 Breathing",
			Technique::WimHof => "Wim Hof Method",
			Technique::Custom => "Custom",
		}
	}
}

impl fmt::Display for Technique {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Breathing cycle phases, in the order they run within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
	Inhale,
	HoldInhale,
	Exhale,
	HoldExhale,
}

impl Phase {
	pub const ORDER: [Phase; 4] = [
		Phase::Inhale,
		Phase::HoldInhale,
		Phase::Exhale,
		Phase::HoldExhale,
	];

	/// Short cue shown to the user
	pub fn cue(&self) -> &'static str {
		match self {
			Phase::Inhale => "INHALE",
			Phase::HoldInhale | Phase::HoldExhale => "HOLD",
			Phase::Exhale => "EXHALE",
		}
	}
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Phase::Inhale => "inhale",
			Phase::HoldInhale => "hold (full)",
			Phase::Exhale => "exhale",
			Phase::HoldExhale => "hold (empty)",
		};
		f.write_str(name)
	}
}

/// Lifecycle of a breathing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
	#[default]
	NotStarted,
	Running,
	Paused,
	Completed,
	Cancelled,
}

impl SessionStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SessionStatus::NotStarted => "not started",
			SessionStatus::Running => "running",
			SessionStatus::Paused => "paused",
			SessionStatus::Completed => "completed",
			SessionStatus::Cancelled => "cancelled",
		};
		f.write_str(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn technique_serializes_kebab_case() {
		let json = serde_json::to_string(&Technique::FourSevenEight).unwrap();
		assert_eq!(json, "\"4-7-8\"");
		let parsed: Technique = serde_json::from_str("\"alternate-nostril\"").unwrap();
		assert_eq!(parsed, Technique::AlternateNostril);
		assert_eq!(Technique::WimHof.as_str(), "wim-hof");
	}

	#[test]
	fn terminal_statuses() {
		assert!(SessionStatus::Completed.is_terminal());
		assert!(SessionStatus::Cancelled.is_terminal());
		assert!(!SessionStatus::Paused.is_terminal());
		assert!(!SessionStatus::NotStarted.is_terminal());
	}
}
