use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{error::Error, render::RenderedAudioBuffer};


pub type SourceId = u64;


/// Something that can open an audio context. Opening usually has to wait for a user gesture.
pub trait AudioHost {
	type Context: AudioContext;

	fn open(&mut self, sample_rate: u32) -> Result<Self::Context, Error>;
}

/// An open audio context that plays rendered buffers through its output.
pub trait AudioContext {
	type Source: AudioSource;

	fn create_source(&mut self, buffer: Arc<RenderedAudioBuffer>, looping: bool) -> Result<Self::Source, Error>;

	/// Ids of one-shot sources that played to the end since the last call.
	fn take_finished(&mut self) -> Vec<SourceId>;
}

pub trait AudioSource {
	fn id(&self) -> SourceId;

	/// Connects the source to the output and starts it.
	fn start(&mut self) -> Result<(), Error>;

	/// Stops the source and disconnects it from the output.
	fn stop(&mut self) -> Result<(), Error>;
}


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
	#[default]
	Closed,
	Idle,
	Playing,
}


/// Tracks the audio context and the one source allowed to sound at a time.
pub struct PlaybackSession<H: AudioHost> {
	host: Option<H>,
	sample_rate: u32,
	looping: bool,

	context: Option<H::Context>,
	current: Option<<H::Context as AudioContext>::Source>,

	warned_unavailable: bool,
}

impl<H: AudioHost> PlaybackSession<H> {
	pub fn new(host: Option<H>, sample_rate: u32, looping: bool) -> PlaybackSession<H> {
		PlaybackSession {
			host,
			sample_rate,
			looping,
			context: None,
			current: None,
			warned_unavailable: false,
		}
	}

	pub fn state(&self) -> PlaybackState {
		match (&self.context, &self.current) {
			(None, _) => PlaybackState::Closed,
			(Some(_), None) => PlaybackState::Idle,
			(Some(_), Some(_)) => PlaybackState::Playing,
		}
	}

	pub fn is_open(&self) -> bool {
		self.context.is_some()
	}

	pub fn is_available(&self) -> bool {
		self.host.is_some()
	}

	pub fn looping(&self) -> bool {
		self.looping
	}

	/// Applies to sources started after this call.
	pub fn set_looping(&mut self, looping: bool) {
		self.looping = looping;
	}

	/// Opens the audio context once. Without a host this only warns and stays closed.
	pub fn open(&mut self) -> Result<(), Error> {
		if self.context.is_some() {
			return Ok(());
		}

		let Some(host) = self.host.as_mut() else {
			if !self.warned_unavailable {
				warn!("No audio output available, playback is disabled.");
				self.warned_unavailable = true;
			}
			return Ok(());
		};

		self.context = Some(host.open(self.sample_rate)?);
		info!(sample_rate = self.sample_rate, "Audio context opened.");
		Ok(())
	}

	/// Replaces whatever is sounding with `buffer`. A no-op while closed.
	///
	/// Returns whether the buffer was started.
	pub fn trigger(&mut self, buffer: Arc<RenderedAudioBuffer>) -> Result<bool, Error> {
		let Some(context) = self.context.as_mut() else {
			debug!("Trigger ignored, audio context is not open.");
			return Ok(false);
		};

		if let Some(mut previous) = self.current.take() {
			previous.stop()?;
		}

		let mut source = context.create_source(buffer, self.looping)?;
		source.start()?;
		debug!(source = source.id(), looping = self.looping, "Source started.");

		self.current = Some(source);
		Ok(true)
	}

	/// Handles end-of-playback notifications. Returns true if the session went idle.
	pub fn poll(&mut self) -> bool {
		let Some(context) = self.context.as_mut() else {
			return false;
		};

		let finished = context.take_finished();
		let current_finished = self.current.as_ref()
			.is_some_and(|current| finished.contains(&current.id()));

		if current_finished {
			if let Some(source) = self.current.take() {
				debug!(source = source.id(), "Source finished.");
			}
		}

		current_finished
	}

	/// Stops the current source and drops the context.
	pub fn close(&mut self) -> Result<(), Error> {
		if let Some(mut source) = self.current.take() {
			source.stop()?;
		}

		if self.context.take().is_some() {
			info!("Audio context closed.");
		}

		Ok(())
	}
}
