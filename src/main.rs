use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;


mod config;
mod coordinator;
mod error;
mod output;
mod playback;
mod preset;
mod render;
mod selection;
mod session;
mod view;
mod waveform;

use config::SynthConfig;
use coordinator::Coordinator;
use playback::PlaybackState;
use preset::Preset;
use selection::{MoveDirection, ResizeDirection};
use session::Command;


#[derive(Parser)]
#[clap(version, about = "Draw a waveform and listen to it.")]
struct Cli {
	/// Path to a YAML config file.
	#[arg(short, long)]
	config: Option<PathBuf>,
}


#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cli = Cli::parse();
	let config = SynthConfig::load(cli.config.as_deref())?;

	let coordinator = Coordinator::start(config.clone())?;

	let options = eframe::NativeOptions {
		initial_window_size: Some(egui::vec2(config.canvas.width as f32 + 20.0, config.canvas.height as f32 + 60.0)),
		.. Default::default()
	};

	eframe::run_native("Wavedraw", options, Box::new(move |_cc| {
		Box::new(AppRoot {
			coordinator,
			config,
			looping: false,
		})
	}));

	Ok(())
}



struct AppRoot {
	coordinator: Coordinator,
	config: SynthConfig,

	looping: bool,
}

impl eframe::App for AppRoot {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		let mut commands = Vec::new();
		self.collect_key_commands(ctx, &mut commands);

		let display_state = self.coordinator.display_state().clone();
		self.looping = display_state.looping;

		egui::CentralPanel::default().show(ctx, |ui| {
			ui.horizontal(|ui| {
				if ui.button("Sine").clicked() {
					commands.push(Command::Reset(Preset::Sine));
				}

				if ui.button("Noise").clicked() {
					commands.push(Command::Reset(Preset::Noise));
				}

				if ui.button("Flat").clicked() {
					commands.push(Command::Reset(Preset::Flat));
				}

				if ui.button("Help").clicked() {
					commands.push(Command::ToggleHelp);
				}

				ui.separator();

				if display_state.audio_available {
					if display_state.playback == PlaybackState::Closed {
						if ui.button("Open audio").clicked() {
							commands.push(Command::OpenAudio);
						}
					} else if ui.button("Beep").clicked() {
						commands.push(Command::Trigger);
					}

					if ui.checkbox(&mut self.looping, "Loop").changed() {
						commands.push(Command::SetLooping(self.looping));
					}

					ui.label(match display_state.playback {
						PlaybackState::Closed => "audio closed",
						PlaybackState::Idle => "idle",
						PlaybackState::Playing => "playing",
					});
				} else {
					ui.label("no audio output");
				}
			});

			ui.add(view::WaveformCanvas {
				waveform: &display_state.waveform,
				window: display_state.window,
				canvas_size: (self.config.canvas.width, self.config.canvas.height),
				help_visible: display_state.help_visible,
				commands: &mut commands,
			});
		});

		for command in commands {
			self.coordinator.send(command);
		}

		ctx.request_repaint();
	}
}

impl AppRoot {
	fn collect_key_commands(&self, ctx: &egui::Context, commands: &mut Vec<Command>) {
		let input = ctx.input();

		let speed = if input.modifiers.shift {
			self.config.window.fast_step
		} else {
			self.config.window.step
		};

		if input.key_pressed(egui::Key::ArrowLeft) {
			commands.push(Command::MoveWindow { direction: MoveDirection::Left, speed });
		}

		if input.key_pressed(egui::Key::ArrowRight) {
			commands.push(Command::MoveWindow { direction: MoveDirection::Right, speed });
		}

		if input.key_pressed(egui::Key::ArrowUp) {
			commands.push(Command::ResizeWindow { direction: ResizeDirection::Widen, speed });
		}

		if input.key_pressed(egui::Key::ArrowDown) {
			commands.push(Command::ResizeWindow { direction: ResizeDirection::Narrow, speed });
		}

		if input.key_pressed(egui::Key::Space) {
			commands.push(Command::Trigger);
		}

		if input.key_pressed(egui::Key::H) {
			commands.push(Command::ToggleHelp);
		}
	}
}
