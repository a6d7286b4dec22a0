use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::{error::Error, preset::PresetSettings, render::RenderSettings};


#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
	pub canvas: CanvasConfig,
	pub render: RenderSettings,
	pub window: WindowConfig,
	pub preset: PresetSettings,
	pub stroke: StrokeConfig,
	pub playback: PlaybackConfig,
}

/// Size of the drawing surface in device pixels. `width` is also the waveform length.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
	pub width: usize,
	pub height: usize,
}

impl Default for CanvasConfig {
	fn default() -> Self {
		CanvasConfig { width: 800, height: 300 }
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
	pub min_width: usize,

	/// Columns per key press.
	pub step: usize,

	/// Columns per key press while shift is held.
	pub fast_step: usize,
}

impl Default for WindowConfig {
	fn default() -> Self {
		WindowConfig { min_width: 3, step: 2, fast_step: 10 }
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
	/// Fill the columns skipped between two drag samples.
	pub interpolate: bool,

	/// Flatten the waveform when a new stroke begins.
	pub clear_on_start: bool,
}

impl Default for StrokeConfig {
	fn default() -> Self {
		StrokeConfig { interpolate: true, clear_on_start: true }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
	pub looping: bool,
}


impl SynthConfig {
	/// Defaults, overlaid with the optional YAML file, overlaid with `WAVEDRAW_*` environment variables.
	pub fn load(path: Option<&Path>) -> Result<SynthConfig, Error> {
		Self::load_with(path, environment())
	}

	fn load_with(path: Option<&Path>, environment: Environment) -> Result<SynthConfig, Error> {
		let mut builder = Config::builder();
		if let Some(path) = path {
			builder = builder.add_source(File::from(path));
		}

		let config: SynthConfig = builder
			.add_source(environment)
			.build()?
			.try_deserialize()?;

		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), Error> {
		let invalid = |msg: &str| -> Result<(), Error> { Err(Error::InvalidConfig(msg.to_string())) };

		if self.canvas.width == 0 || self.canvas.height == 0 {
			return invalid("canvas width and height must be non-zero");
		}
		if self.window.min_width == 0 {
			return invalid("window.min_width must be at least 1");
		}
		if self.window.min_width > self.canvas.width {
			return Err(Error::WaveformTooNarrow {
				width: self.canvas.width,
				min_width: self.window.min_width,
			});
		}
		if self.render.sample_rate == 0 {
			return invalid("render.sample_rate must be non-zero");
		}
		if !(self.render.duration_seconds > 0.0) {
			return invalid("render.duration_seconds must be positive");
		}
		if self.render.frame_count() < 2 {
			return invalid("render.sample_rate * render.duration_seconds must give at least 2 frames");
		}
		if !(self.render.attack_seconds >= 0.0) {
			return invalid("render.attack_seconds must not be negative");
		}
		if !(self.render.peak_gain > 0.0 && self.render.peak_gain <= 1.0) {
			return invalid("render.peak_gain must be in (0, 1]");
		}
		if !(0.0..=1.0).contains(&self.preset.amplitude_scale) {
			return invalid("preset.amplitude_scale must be in [0, 1]");
		}
		if !(self.preset.sine_divisor > 0.0) {
			return invalid("preset.sine_divisor must be positive");
		}

		Ok(())
	}
}

/// `WAVEDRAW_SECTION__KEY` variables, e.g. `WAVEDRAW_RENDER__SAMPLE_RATE`.
fn environment() -> Environment {
	Environment::with_prefix("WAVEDRAW")
		.prefix_separator("_")
		.separator("__")
		.try_parsing(true)
}
