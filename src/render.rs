use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::{selection::SelectionWindow, waveform::WaveformBuffer};


#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
	pub sample_rate: u32,
	pub duration_seconds: f32,

	/// Length of the linear fade in from silence to `peak_gain`.
	pub attack_seconds: f32,
	pub peak_gain: f32,
}

impl Default for RenderSettings {
	fn default() -> Self {
		RenderSettings {
			sample_rate: 22050,
			duration_seconds: 1.0,
			attack_seconds: 0.2,
			peak_gain: 1.0,
		}
	}
}

impl RenderSettings {
	pub fn frame_count(&self) -> usize {
		(self.sample_rate as f64 * self.duration_seconds as f64).round() as usize
	}

	pub fn attack_frames(&self) -> usize {
		(self.sample_rate as f64 * self.attack_seconds as f64).round() as usize
	}
}


/// A finished, immutable mono buffer ready to be handed to the audio device.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedAudioBuffer {
	sample_rate: u32,
	frames: Arc<[f32]>,
}

impl RenderedAudioBuffer {
	pub fn new(sample_rate: u32, frames: Vec<f32>) -> RenderedAudioBuffer {
		RenderedAudioBuffer {
			sample_rate,
			frames: frames.into(),
		}
	}

	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	pub fn frames(&self) -> &[f32] {
		&self.frames
	}

	/// Shared handle to the frames, for handing across threads without copying.
	pub fn shared_frames(&self) -> Arc<[f32]> {
		self.frames.clone()
	}

	pub fn duration(&self) -> Duration {
		Duration::from_secs_f64(self.frames.len() as f64 / self.sample_rate as f64)
	}
}



/// Renders the selected slice of `waveform` into a tiled, enveloped buffer.
///
/// Panics if the window is empty or reaches past the waveform, since the selection window
/// can never be in that state.
pub fn render(waveform: &WaveformBuffer, window: &SelectionWindow, settings: &RenderSettings) -> RenderedAudioBuffer {
	assert!(
		window.start() < window.end() && window.end() <= waveform.width(),
		"selection [{}, {}) is invalid for a waveform of width {}",
		window.start(), window.end(), waveform.width()
	);

	let slice = waveform.slice(window.start(), window.end());
	let mut frames = tile(slice, settings.frame_count());
	apply_envelope(&mut frames, settings.attack_frames(), settings.peak_gain);

	RenderedAudioBuffer::new(settings.sample_rate, frames)
}

/// Loops `slice` by modulo indexing until `frame_count` frames are filled.
pub fn tile(slice: &[f32], frame_count: usize) -> Vec<f32> {
	assert!(!slice.is_empty(), "cannot tile an empty slice");

	slice.iter()
		.copied()
		.cycle()
		.take(frame_count)
		.collect()
}

/// Gain at `index` of a `frame_count` long attack/release envelope.
///
/// Ramps linearly from 0 up to `peak` over the attack, then back down to 0 at the last frame.
/// The attack is at least one frame so the first frame is always silent.
pub fn envelope_gain(index: usize, frame_count: usize, attack_frames: usize, peak: f32) -> f32 {
	if frame_count < 2 {
		return 0.0;
	}

	let last = frame_count - 1;
	let attack = attack_frames.clamp(1, last);

	if index < attack {
		return peak * index as f32 / attack as f32;
	}

	let release = last - attack;
	if release == 0 || index >= last {
		return 0.0;
	}

	peak * (last - index) as f32 / release as f32
}

pub fn apply_envelope(frames: &mut [f32], attack_frames: usize, peak: f32) {
	let frame_count = frames.len();
	for (index, frame) in frames.iter_mut().enumerate() {
		*frame *= envelope_gain(index, frame_count, attack_frames, peak);
	}
}
