/// Errors raised by the synthesis core and the audio backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("config load/parse error: {0}")]
	Config(#[from] config::ConfigError),

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("waveform width {width} is narrower than the minimum window width {min_width}")]
	WaveformTooNarrow { width: usize, min_width: usize },

	#[error("selection [{start}, {end}) is not valid for width {width} and minimum width {min_width}")]
	InvalidSelection { start: usize, end: usize, width: usize, min_width: usize },

	#[error("unsupported output sample format {0:?}")]
	UnsupportedSampleFormat(cpal::SampleFormat),

	#[error(transparent)]
	DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

	#[error(transparent)]
	BuildStream(#[from] cpal::BuildStreamError),

	#[error(transparent)]
	PlayStream(#[from] cpal::PlayStreamError),

	#[error("resampling failed: {0}")]
	Resample(String),

	#[error("audio stream closed")]
	StreamClosed,
}
