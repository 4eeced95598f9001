use anyhow::{Context, bail};
use breathwork::console::{self, ConsoleListener};
use breathwork::{
	ControlEvent, ControlHandle, LogListener, PresetLibrary, Reactor, SessionClock, Settings,
	SystemClock,
};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;

/// Guided breathing sessions in the terminal
#[derive(Parser)]
#[command(name = "breathwork", version)]
struct Cli {
	/// Extra preset file (TOML) to load on top of the built-ins
	#[arg(long, global = true, value_name = "FILE")]
	presets: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List available presets
	#[command(alias = "ls")]
	List,

	/// Show the phases and length of a preset
	Plan { preset: String },

	/// Run a breathing session
	Run {
		preset: String,

		/// Override the number of rounds
		#[arg(long)]
		rounds: Option<u32>,

		/// Clock resolution in milliseconds
		#[arg(long, value_name = "MS")]
		tick_ms: Option<u64>,

		/// Countdown before the first phase, in seconds
		#[arg(long, value_name = "SECS")]
		lead_in: Option<u64>,

		/// Print events as JSON lines
		#[arg(long)]
		json: bool,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let settings = Settings::load();
	let level = settings
		.as_ref()
		.map(|s| s.log_level.clone())
		.unwrap_or_else(|_| "info".to_string());
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
	let settings = settings.unwrap_or_else(|e| {
		log::warn!("Using default settings: {:#}", e);
		Settings::default()
	});

	let library = load_library(&settings, cli.presets.as_deref())?;

	match cli.command {
		Commands::List => cmd_list(&library),
		Commands::Plan { preset } => cmd_plan(&library, &preset),
		Commands::Run {
			preset,
			rounds,
			tick_ms,
			lead_in,
			json,
		} => {
			let tick = tick_ms.map(Duration::from_millis).unwrap_or(settings.tick_interval());
			let lead_in = lead_in.map(Duration::from_secs).unwrap_or(settings.lead_in());
			cmd_run(&library, &preset, rounds, tick, lead_in, json).await
		}
	}
}

fn load_library(settings: &Settings, extra: Option<&std::path::Path>) -> anyhow::Result<PresetLibrary> {
	let mut library = PresetLibrary::builtin();
	if let Some(path) = &settings.preset_file {
		if let Err(e) = library.load_file(path) {
			log::warn!("{:#}", e);
		}
	}
	if let Some(path) = extra {
		library.load_file(path)?;
	}
	Ok(library)
}

fn cmd_list(library: &PresetLibrary) -> anyhow::Result<()> {
	for preset in library.iter() {
		let length = preset
			.total_duration()
			.map(console::format_clock)
			.unwrap_or_else(|_| "-".to_string());
		println!(
			"{:<20} {:<24} {:>6}  {}",
			preset.id,
			preset.name,
			length,
			preset.technique.display_name()
		);
	}
	Ok(())
}

fn cmd_plan(library: &PresetLibrary, id: &str) -> anyhow::Result<()> {
	let preset = library
		.get(id)
		.with_context(|| format!("Unknown preset '{}'. Try 'breathwork list'.", id))?;
	println!("{}", console::format_plan(preset)?);
	Ok(())
}

async fn cmd_run(
	library: &PresetLibrary,
	id: &str,
	rounds: Option<u32>,
	tick: Duration,
	lead_in: Duration,
	json: bool,
) -> anyhow::Result<()> {
	let mut preset = library
		.get(id)
		.cloned()
		.with_context(|| format!("Unknown preset '{}'. Try 'breathwork list'.", id))?;
	if let Some(rounds) = rounds {
		preset.rounds = rounds;
	}
	preset.validate()?;

	let mut reactor = Reactor::new(SessionClock::new(SystemClock::new(), tick));
	reactor.add_listener(LogListener);
	reactor.add_listener(ConsoleListener::stdout(json));

	let handle = reactor.control_handle();
	spawn_ctrl_c(handle.clone());
	spawn_stdin_commands(handle);

	if !json {
		println!("{}", console::format_plan(&preset)?);
		println!("Enter pauses or resumes, q quits.");
		if !lead_in.is_zero() {
			println!("Starting in {}...", console::format_seconds(lead_in));
		}
	}
	reactor.schedule(
		ControlEvent::Start {
			preset: Box::new(preset),
		},
		lead_in,
	);

	let snapshot = reactor.run().await;
	if !snapshot.status.is_terminal() {
		bail!("Session ended while {}", snapshot.status);
	}
	Ok(())
}

fn spawn_ctrl_c(handle: ControlHandle) {
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			log::debug!("Ctrl-C received");
			if let Err(e) = handle.send(ControlEvent::Cancel) {
				log::warn!("Failed to deliver cancel: {}", e);
			}
		}
	});
}

/// Read commands from stdin on a dedicated thread, off the runtime
fn spawn_stdin_commands(handle: ControlHandle) {
	std::thread::spawn(move || {
		let stdin = std::io::stdin();
		for line in stdin.lock().lines() {
			let Ok(line) = line else { break };
			let control = match line.trim().to_lowercase().as_str() {
				"" => ControlEvent::TogglePause,
				"p" | "pause" => ControlEvent::Pause,
				"r" | "resume" => ControlEvent::Resume,
				"q" | "quit" | "c" | "cancel" => ControlEvent::Cancel,
				other => {
					log::warn!("Unknown command '{}'", other);
					continue;
				}
			};
			match handle.send(control) {
				Ok(()) => {}
				Err(TrySendError::Full(control)) => {
					log::warn!("Dropped {:?}: too many pending commands", control)
				}
				Err(TrySendError::Closed(_)) => break,
			}
		}
	});
}
