use rand::Rng;
use serde::Deserialize;


/// Canonical waveforms used to reset the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
	Sine,
	Flat,
	Noise,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PresetSettings {
	/// Preset loaded when the session starts.
	pub initial: Preset,

	/// Columns per radian of the sine preset.
	pub sine_divisor: f32,

	/// Peak amplitude of the sine and noise presets.
	pub amplitude_scale: f32,
}

impl Default for PresetSettings {
	fn default() -> Self {
		PresetSettings {
			initial: Preset::Sine,
			sine_divisor: 8.0,
			amplitude_scale: 0.5,
		}
	}
}


impl Preset {
	pub fn generate<R: Rng + ?Sized>(self, width: usize, settings: &PresetSettings, rng: &mut R) -> Vec<f32> {
		match self {
			Preset::Sine => sine(width, settings.sine_divisor, settings.amplitude_scale),
			Preset::Flat => flat(width),
			Preset::Noise => noise(width, settings.amplitude_scale, rng),
		}
	}
}


pub fn sine(width: usize, divisor: f32, scale: f32) -> Vec<f32> {
	(0..width)
		.map(|i| (i as f32 / divisor).sin() * scale)
		.collect()
}

pub fn flat(width: usize) -> Vec<f32> {
	vec![0.0; width]
}

pub fn noise<R: Rng + ?Sized>(width: usize, scale: f32, rng: &mut R) -> Vec<f32> {
	(0..width)
		.map(|_| rng.gen_range(-1.0..=1.0f32) * scale)
		.collect()
}
