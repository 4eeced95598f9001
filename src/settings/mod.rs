use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.toml";
const PRESETS_FILE: &str = "presets.toml";

/// User configuration, read from `settings.toml` in the platform config dir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// How often the session clock is polled
	pub tick_interval_ms: u64,
	/// Countdown before the first inhale
	pub lead_in_seconds: u64,
	/// Default log filter when `RUST_LOG` is unset
	pub log_level: String,
	/// Extra presets to load on top of the built-ins
	pub preset_file: Option<PathBuf>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			tick_interval_ms: 100,
			lead_in_seconds: 3,
			log_level: "info".to_string(),
			preset_file: None,
		}
	}
}

impl Settings {
	pub fn config_dir() -> Option<PathBuf> {
		ProjectDirs::from("", "", "breathwork").map(|dirs| dirs.config_dir().to_path_buf())
	}

	/// Load from the default location, falling back to defaults when absent
	pub fn load() -> anyhow::Result<Self> {
		match Self::config_dir() {
			Some(dir) => Self::load_from_dir(&dir),
			None => Ok(Self::default()),
		}
	}

	pub fn load_from_dir(dir: &Path) -> anyhow::Result<Self> {
		let path = dir.join(SETTINGS_FILE);
		let mut settings = if path.exists() {
			Self::load_from(&path)?
		} else {
			Self::default()
		};

		if settings.preset_file.is_none() {
			let default_presets = dir.join(PRESETS_FILE);
			if default_presets.exists() {
				settings.preset_file = Some(default_presets);
			}
		}
		Ok(settings)
	}

	pub fn load_from(path: &Path) -> anyhow::Result<Self> {
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read settings {}", path.display()))?;
		Self::parse(&text).with_context(|| format!("Invalid settings {}", path.display()))
	}

	pub fn parse(text: &str) -> anyhow::Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn tick_interval(&self) -> Duration {
		Duration::from_millis(self.tick_interval_ms.max(1))
	}

	pub fn lead_in(&self) -> Duration {
		Duration::from_secs(self.lead_in_seconds)
	}
}
