//! Breathing presets and the per-round cycle plan derived from them.

pub mod library;

pub use library::PresetLibrary;

use crate::error::SessionError;
use crate::types::{Phase, Technique};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A guided breathing exercise definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationPreset {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub technique: Technique,
	#[serde(default)]
	pub inhale_seconds: f64,
	#[serde(default)]
	pub hold_inhale_seconds: f64,
	#[serde(default)]
	pub exhale_seconds: f64,
	#[serde(default)]
	pub hold_exhale_seconds: f64,
	pub rounds: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub guidance_audio: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub background_sound: Option<String>,
}

impl MeditationPreset {
	pub fn new(id: impl Into<String>, name: impl Into<String>, technique: Technique) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			description: String::new(),
			technique,
			inhale_seconds: 0.0,
			hold_inhale_seconds: 0.0,
			exhale_seconds: 0.0,
			hold_exhale_seconds: 0.0,
			rounds: 1,
			guidance_audio: None,
			background_sound: None,
		}
	}

	/// Set the four phase durations, in seconds
	pub fn with_pattern(mut self, inhale: f64, hold_inhale: f64, exhale: f64, hold_exhale: f64) -> Self {
		self.inhale_seconds = inhale;
		self.hold_inhale_seconds = hold_inhale;
		self.exhale_seconds = exhale;
		self.hold_exhale_seconds = hold_exhale;
		self
	}

	pub fn with_rounds(mut self, rounds: u32) -> Self {
		self.rounds = rounds;
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	fn phase_seconds(&self) -> [(Phase, f64); 4] {
		[
			(Phase::Inhale, self.inhale_seconds),
			(Phase::HoldInhale, self.hold_inhale_seconds),
			(Phase::Exhale, self.exhale_seconds),
			(Phase::HoldExhale, self.hold_exhale_seconds),
		]
	}

	/// Check the preset can drive a session
	pub fn validate(&self) -> Result<(), SessionError> {
		self.cycle_plan().map(|_| ())
	}

	/// Build the ordered list of non-skipped phases for one round
	pub fn cycle_plan(&self) -> Result<CyclePlan, SessionError> {
		if self.rounds == 0 {
			return Err(SessionError::InvalidPreset(format!(
				"preset '{}' must run at least one round",
				self.id
			)));
		}

		let mut steps = Vec::with_capacity(4);
		for (phase, seconds) in self.phase_seconds() {
			let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
				SessionError::InvalidPreset(format!(
					"preset '{}' has an invalid {} duration: {}",
					self.id, phase, seconds
				))
			})?;
			if duration.is_zero() {
				if seconds > 0.0 {
					return Err(SessionError::InvalidPreset(format!(
						"preset '{}' has a {} duration below one nanosecond: {}",
						self.id, phase, seconds
					)));
				}
				continue;
			}
			steps.push(PhaseStep { phase, duration });
		}

		if steps.is_empty() {
			return Err(SessionError::InvalidPreset(format!(
				"preset '{}' has no phase with a non-zero duration",
				self.id
			)));
		}

		let too_long = || {
			SessionError::InvalidPreset(format!("preset '{}' is too long to schedule", self.id))
		};
		let round_duration = steps
			.iter()
			.try_fold(Duration::ZERO, |acc, s| acc.checked_add(s.duration))
			.ok_or_else(too_long)?;
		let total = round_duration.checked_mul(self.rounds).ok_or_else(too_long)?;

		Ok(CyclePlan {
			steps,
			round_duration,
			total,
		})
	}

	/// Planned length of the whole exercise
	pub fn total_duration(&self) -> Result<Duration, SessionError> {
		Ok(self.cycle_plan()?.total_duration())
	}
}

/// One phase of the cycle plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseStep {
	pub phase: Phase,
	#[serde(rename = "duration_seconds", serialize_with = "serialize_secs")]
	pub duration: Duration,
}

/// Non-empty, ordered phases for a single round, with lengths that fit in a `Duration`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePlan {
	steps: Vec<PhaseStep>,
	round_duration: Duration,
	total: Duration,
}

impl CyclePlan {
	pub fn steps(&self) -> &[PhaseStep] {
		&self.steps
	}

	pub fn len(&self) -> usize {
		self.steps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&PhaseStep> {
		self.steps.get(index)
	}

	pub fn round_duration(&self) -> Duration {
		self.round_duration
	}

	/// Length of every round back to back
	pub fn total_duration(&self) -> Duration {
		self.total
	}
}

pub(crate) fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
	s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn preset(inhale: f64, hold_in: f64, exhale: f64, hold_out: f64) -> MeditationPreset {
		MeditationPreset::new("test", "Test", Technique::Custom)
			.with_pattern(inhale, hold_in, exhale, hold_out)
			.with_rounds(3)
	}

	#[test]
	fn plan_skips_zero_phases_in_fixed_order() {
		let plan = preset(4.0, 0.0, 6.0, 2.0).cycle_plan().unwrap();
		let phases: Vec<Phase> = plan.steps().iter().map(|s| s.phase).collect();
		assert_eq!(phases, vec![Phase::Inhale, Phase::Exhale, Phase::HoldExhale]);
		assert_eq!(plan.round_duration(), Duration::from_secs(12));
	}

	#[test]
	fn all_zero_durations_rejected() {
		let err = preset(0.0, 0.0, 0.0, 0.0).validate().unwrap_err();
		assert!(matches!(err, SessionError::InvalidPreset(_)));
	}

	#[test]
	fn zero_rounds_rejected() {
		let err = preset(4.0, 4.0, 4.0, 4.0).with_rounds(0).validate().unwrap_err();
		assert!(matches!(err, SessionError::InvalidPreset(_)));
	}

	#[test]
	fn negative_or_nan_durations_rejected() {
		assert!(preset(-1.0, 0.0, 4.0, 0.0).validate().is_err());
		assert!(preset(f64::NAN, 0.0, 4.0, 0.0).validate().is_err());
		assert!(preset(4.0, f64::INFINITY, 4.0, 0.0).validate().is_err());
	}

	#[test]
	fn fractional_durations_are_exact() {
		let plan = preset(1.5, 0.0, 1.5, 0.0).cycle_plan().unwrap();
		assert_eq!(plan.round_duration(), Duration::from_millis(3000));
	}

	#[test]
	fn total_duration_covers_all_rounds() {
		let total = preset(4.0, 7.0, 8.0, 0.0).total_duration().unwrap();
		assert_eq!(total, Duration::from_secs(57));
	}

	#[test]
	fn overflowing_length_rejected() {
		let err = preset(1e19, 0.0, 0.0, 0.0).with_rounds(2).cycle_plan().unwrap_err();
		assert!(matches!(err, SessionError::InvalidPreset(ref m) if m.contains("too long")));

		let err = preset(1e19, 1e19, 0.0, 0.0).with_rounds(1).validate().unwrap_err();
		assert!(matches!(err, SessionError::InvalidPreset(_)));

		let plan = preset(1e19, 0.0, 0.0, 0.0).with_rounds(1).cycle_plan().unwrap();
		assert_eq!(plan.total_duration(), plan.round_duration());
	}

	#[test]
	fn sub_nanosecond_phase_rejected() {
		let err = preset(1e-10, 0.0, 0.0, 0.0).validate().unwrap_err();
		assert!(matches!(
			err,
			SessionError::InvalidPreset(ref m) if m.contains("below one nanosecond")
		));

		let err = preset(4.0, 0.0, 1e-10, 0.0).validate().unwrap_err();
		assert!(matches!(err, SessionError::InvalidPreset(ref m) if m.contains("exhale")));
	}

	#[test]
	fn deserializes_with_defaults() {
		let preset: MeditationPreset = toml::from_str(
			r#"
			id = "calm"
			name = "Calm"
			technique = "diaphragmatic"
			inhale_seconds = 4
			exhale_seconds = 6
			rounds = 5
			"#,
		)
		.unwrap();
		assert_eq!(preset.technique, Technique::Diaphragmatic);
		assert_eq!(preset.hold_inhale_seconds, 0.0);
		assert!(preset.guidance_audio.is_none());
		assert_eq!(preset.cycle_plan().unwrap().len(), 2);
	}
}
