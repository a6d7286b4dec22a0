use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, warn};

use std::sync::Arc;

use crate::error::Error;
use crate::playback::{AudioContext, AudioHost, AudioSource, SourceId};
use crate::render::RenderedAudioBuffer;


/// The default cpal output device.
pub struct CpalHost {
	device: cpal::Device,
}

impl CpalHost {
	/// Returns `None` with a warning when the system has no output device.
	pub fn default_output() -> Option<CpalHost> {
		let host = cpal::default_host();

		match host.default_output_device() {
			Some(device) => {
				info!(device = %device.name().unwrap_or_default(), "Found output device.");
				Some(CpalHost { device })
			}

			None => {
				warn!("No default output device, audio playback is unavailable.");
				None
			}
		}
	}
}

impl AudioHost for CpalHost {
	type Context = OutputStream;

	fn open(&mut self, sample_rate: u32) -> Result<OutputStream, Error> {
		OutputStream::start(&self.device, sample_rate)
	}
}



/// A running output stream. Sources are handed to the realtime callback over a channel.
pub struct OutputStream {
	_stream: cpal::Stream,

	render_rate: u32,
	device_rate: u32,

	cmd_tx: Sender<StreamCommand>,
	finished_rx: Receiver<SourceId>,

	next_id: SourceId,
}

enum StreamCommand {
	Play { id: SourceId, frames: Arc<[f32]>, looping: bool },
	Stop { id: SourceId },
}


impl OutputStream {
	pub fn start(device: &cpal::Device, render_rate: u32) -> Result<OutputStream, Error> {
		let supported = device.default_output_config()?;
		if supported.sample_format() != cpal::SampleFormat::F32 {
			return Err(Error::UnsupportedSampleFormat(supported.sample_format()));
		}

		let config = supported.config();
		let device_rate = config.sample_rate.0;

		info!(device_rate, render_rate, channels = config.channels, "Opening output stream.");

		let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
		let (finished_tx, finished_rx) = crossbeam_channel::unbounded();

		let mut callback = Callback {
			cmd_rx,
			finished_tx,
			channels: config.channels as usize,
			voice: None,
		};

		let stream = device.build_output_stream(
			&config,

			move |data: &mut [f32], callback_info: &cpal::OutputCallbackInfo| {
				callback.process(data, callback_info);
			},

			move |err| {
				error!("OutputStream error: {err}");
			}
		)?;

		stream.play()?;

		Ok(OutputStream {
			_stream: stream,
			render_rate,
			device_rate,
			cmd_tx,
			finished_rx,
			next_id: 0,
		})
	}
}

impl AudioContext for OutputStream {
	type Source = OutputSource;

	fn create_source(&mut self, buffer: Arc<RenderedAudioBuffer>, looping: bool) -> Result<OutputSource, Error> {
		let frames = if buffer.sample_rate() == self.device_rate {
			buffer.shared_frames()
		} else {
			let ratio = self.device_rate as f64 / buffer.sample_rate() as f64;
			resample(buffer.frames().to_vec(), ratio)?.into()
		};

		if buffer.sample_rate() != self.render_rate {
			warn!(buffer_rate = buffer.sample_rate(), render_rate = self.render_rate, "Buffer rate differs from the context rate.");
		}

		let id = self.next_id;
		self.next_id += 1;

		Ok(OutputSource {
			id,
			frames: Some(frames),
			looping,
			cmd_tx: self.cmd_tx.clone(),
		})
	}

	fn take_finished(&mut self) -> Vec<SourceId> {
		self.finished_rx.try_iter().collect()
	}
}


pub struct OutputSource {
	id: SourceId,
	frames: Option<Arc<[f32]>>,
	looping: bool,

	cmd_tx: Sender<StreamCommand>,
}

impl AudioSource for OutputSource {
	fn id(&self) -> SourceId {
		self.id
	}

	fn start(&mut self) -> Result<(), Error> {
		// A source only plays once.
		let Some(frames) = self.frames.take() else {
			return Ok(());
		};

		self.cmd_tx.send(StreamCommand::Play { id: self.id, frames, looping: self.looping })
			.map_err(|_| Error::StreamClosed)
	}

	fn stop(&mut self) -> Result<(), Error> {
		self.cmd_tx.send(StreamCommand::Stop { id: self.id })
			.map_err(|_| Error::StreamClosed)
	}
}



struct Voice {
	id: SourceId,
	frames: Arc<[f32]>,
	cursor: usize,
	looping: bool,
}

struct Callback {
	cmd_rx: Receiver<StreamCommand>,
	finished_tx: Sender<SourceId>,
	channels: usize,

	voice: Option<Voice>,
}

impl Callback {
	fn process(&mut self, data: &mut [f32], _: &cpal::OutputCallbackInfo) {
		self.fill(data);
	}

	fn fill(&mut self, data: &mut [f32]) {
		while let Ok(cmd) = self.cmd_rx.try_recv() {
			match cmd {
				StreamCommand::Play { id, frames, looping } => {
					self.voice = Some(Voice { id, frames, cursor: 0, looping });
				}

				StreamCommand::Stop { id } => {
					if self.voice.as_ref().is_some_and(|voice| voice.id == id) {
						self.voice = None;
					}
				}
			}
		}

		data.fill(0.0);

		let Some(voice) = self.voice.as_mut() else {
			return;
		};

		if voice.frames.is_empty() {
			let _ = self.finished_tx.try_send(voice.id);
			self.voice = None;
			return;
		}

		for frame in data.chunks_exact_mut(self.channels.max(1)) {
			if voice.cursor >= voice.frames.len() {
				if !voice.looping {
					break;
				}
				voice.cursor = 0;
			}

			frame.fill(voice.frames[voice.cursor]);
			voice.cursor += 1;
		}

		if !voice.looping && voice.cursor >= voice.frames.len() {
			let _ = self.finished_tx.try_send(voice.id);
			self.voice = None;
		}
	}
}



/// Converts `buffer` to `sample_rate_ratio` times its rate, keeping it aligned and the same duration.
fn resample(buffer: Vec<f32>, sample_rate_ratio: f64) -> Result<Vec<f32>, Error> {
	use rubato::{Resampler, SincFixedIn, InterpolationType, InterpolationParameters, WindowFunction};
	let params = InterpolationParameters {
		sinc_len: 256,
		f_cutoff: 0.95,
		interpolation: InterpolationType::Linear,
		oversampling_factor: 256,
		window: WindowFunction::BlackmanHarris2,
	};

	// The sinc filter lags its input by half its length.
	let delay = params.sinc_len / 2;
	let target_len = (buffer.len() as f64 * sample_rate_ratio).round() as usize;

	let mut padded = buffer;
	padded.resize(padded.len() + delay, 0.0);

	let mut resampler = SincFixedIn::<f32>::new(
		sample_rate_ratio,
		2.0,
		params,
		padded.len(),
		1,
	).map_err(|e| Error::Resample(e.to_string()))?;

	let waves_in = vec![padded];
	let mut waves_out = resampler.process(&waves_in, None)
		.map_err(|e| Error::Resample(e.to_string()))?;

	let mut output = waves_out.remove(0);
	let skip = ((delay as f64 * sample_rate_ratio).round() as usize).min(output.len());
	output.drain(..skip);
	output.resize(target_len, 0.0);

	Ok(output)
}
