use tokio::sync::mpsc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task;
use tokio::runtime::Handle;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::SynthConfig;
use crate::output::CpalHost;
use crate::playback::{AudioHost, PlaybackState};
use crate::session::{Command, SynthesisSession};



/// Handle the UI uses to drive the synthesis session running on its own thread.
pub struct Coordinator {
	cmd_tx: mpsc::Sender<Command>,

	display_state: Arc<Mutex<DisplayState>>,
}

/// What the UI needs to draw a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayState {
	pub waveform: Vec<f32>,
	pub window: (usize, usize),

	pub playback: PlaybackState,
	pub looping: bool,
	pub audio_available: bool,
	pub help_visible: bool,
}

impl DisplayState {
	fn capture<H: AudioHost>(session: &SynthesisSession<H>) -> DisplayState {
		DisplayState {
			waveform: session.waveform().samples().to_vec(),
			window: session.window().bounds(),
			playback: session.playback_state(),
			looping: session.looping(),
			audio_available: session.audio_available(),
			help_visible: session.help_visible(),
		}
	}
}



impl Coordinator {
	pub fn start(config: SynthConfig) -> anyhow::Result<Coordinator> {
		let (cmd_tx, cmd_rx) = mpsc::channel(64);
		let display_state = Arc::new(Mutex::new(DisplayState::default()));
		let async_handle = Handle::current();

		std::thread::spawn({
			let display_state = display_state.clone();

			move || {
				if let Err(err) = start_inner(config, cmd_rx, display_state, async_handle) {
					error!("Coordinator stopped: {err:#}");
				}
			}
		});

		Ok(Coordinator {
			cmd_tx,
			display_state,
		})
	}

	pub fn send(&self, command: Command) {
		if let Err(err) = self.cmd_tx.try_send(command) {
			warn!("Dropped command: {err}");
		}
	}

	pub fn display_state(&self) -> MutexGuard<'_, DisplayState> {
		task::block_in_place(|| self.display_state.blocking_lock())
	}
}



fn start_inner(config: SynthConfig, mut cmd_rx: mpsc::Receiver<Command>, display_state: Arc<Mutex<DisplayState>>,
	async_handle: Handle) -> anyhow::Result<()>
{
	// Created on this thread because cpal::Stream is not Send.
	let host = CpalHost::default_output();
	let mut session = SynthesisSession::new(config, host)?;

	*display_state.blocking_lock() = DisplayState::capture(&session);
	info!("Synthesis session started.");

	async_handle.block_on(async move {
		use tokio::time::MissedTickBehavior;

		let mut interval = tokio::time::interval(std::time::Duration::from_millis(16));
		interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

		loop {
			tokio::select!{
				value = cmd_rx.recv() => match value {
					Some(cmd) => {
						if let Err(err) = session.apply(cmd) {
							error!("Command failed: {err}");
						}

						*display_state.lock().await = DisplayState::capture(&session);
					}

					None => break,
				},

				_ = interval.tick() => {
					if session.poll() {
						display_state.lock().await.playback = session.playback_state();
					}
				}
			}
		}

		session.close()?;
		info!("Synthesis session closed.");

		Ok(())
	})
}
