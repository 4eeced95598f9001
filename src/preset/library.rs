use super::MeditationPreset;
use crate::types::Technique;
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// On-disk layout of a preset file: a list of `[[preset]]` tables
#[derive(Debug, Default, Deserialize)]
struct PresetFile {
	#[serde(default, rename = "preset")]
	presets: Vec<MeditationPreset>,
}

/// Ordered catalogue of presets keyed by id
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
	presets: IndexMap<String, MeditationPreset>,
}

impl PresetLibrary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Catalogue with one preset per named technique
	pub fn builtin() -> Self {
		let mut library = Self::new();
		for preset in builtin_presets() {
			library.insert(preset);
		}
		library
	}

	/// Parse presets from TOML text, skipping invalid entries
	pub fn parse_toml(text: &str) -> anyhow::Result<Vec<MeditationPreset>> {
		let file: PresetFile = toml::from_str(text).context("Failed to parse preset file")?;
		let mut presets = Vec::with_capacity(file.presets.len());
		for preset in file.presets {
			match preset.validate() {
				Ok(()) => presets.push(preset),
				Err(e) => log::warn!("Skipping preset '{}': {}", preset.id, e),
			}
		}
		Ok(presets)
	}

	/// Load a preset file and merge it over the current catalogue
	pub fn load_file(&mut self, path: &Path) -> anyhow::Result<usize> {
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read preset file {}", path.display()))?;
		let presets = Self::parse_toml(&text)
			.with_context(|| format!("Invalid preset file {}", path.display()))?;
		let count = presets.len();
		for preset in presets {
			self.insert(preset);
		}
		log::info!("Loaded {} presets from {}", count, path.display());
		Ok(count)
	}

	/// Add a preset, replacing any existing one with the same id
	pub fn insert(&mut self, preset: MeditationPreset) {
		if let Some(previous) = self.presets.insert(preset.id.clone(), preset) {
			log::warn!("Preset '{}' overridden", previous.id);
		}
	}

	pub fn get(&self, id: &str) -> Option<&MeditationPreset> {
		self.presets.get(id)
	}

	pub fn iter(&self) -> impl Iterator<Item = &MeditationPreset> {
		self.presets.values()
	}

	pub fn len(&self) -> usize {
		self.presets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.presets.is_empty()
	}
}

fn builtin_presets() -> Vec<MeditationPreset> {
	vec![
		MeditationPreset::new("box", "Box Breathing", Technique::Box)
			.with_pattern(4.0, 4.0, 4.0, 4.0)
			.with_rounds(4)
			.with_description("Equal four-count inhale, hold, exhale and hold"),
		MeditationPreset::new("diaphragmatic", "Belly Breathing", Technique::Diaphragmatic)
			.with_pattern(4.0, 0.0, 6.0, 0.0)
			.with_rounds(6)
			.with_description("Slow belly breaths with a longer exhale"),
		MeditationPreset::new(
			"alternate-nostril",
			"Alternate Nostril",
			Technique::AlternateNostril,
		)
		.with_pattern(4.0, 4.0, 4.0, 0.0)
		.with_rounds(6)
		.with_description("Switch nostrils on every exhale"),
		MeditationPreset::new("4-7-8", "Relaxing Breath", Technique::FourSevenEight)
			.with_pattern(4.0, 7.0, 8.0, 0.0)
			.with_rounds(4)
			.with_description("Inhale for 4, hold for 7, exhale for 8"),
		MeditationPreset::new("wim-hof", "Power Breathing", Technique::WimHof)
			.with_pattern(1.5, 0.0, 1.5, 0.0)
			.with_rounds(30)
			.with_description("Thirty quick deep breaths"),
	]
}
