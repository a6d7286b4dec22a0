use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::error::Error;
use crate::playback::{AudioHost, PlaybackSession, PlaybackState};
use crate::preset::Preset;
use crate::render::{self, RenderedAudioBuffer};
use crate::selection::{MoveDirection, ResizeDirection, SelectionWindow};
use crate::waveform::{canvas_domain, normalize, Point, Span, WaveformBuffer};


/// Everything the UI can ask the synthesis core to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	StrokeStart(Point),
	StrokeDrag(Point),
	StrokeEnd,

	MoveWindow { direction: MoveDirection, speed: usize },
	ResizeWindow { direction: ResizeDirection, speed: usize },

	Reset(Preset),
	Trigger,

	OpenAudio,
	SetLooping(bool),
	ToggleHelp,
}


/// The waveform, selection and playback state of one running app.
pub struct SynthesisSession<H: AudioHost> {
	config: SynthConfig,

	waveform: WaveformBuffer,
	window: SelectionWindow,
	playback: PlaybackSession<H>,

	/// Last column written by the stroke in progress.
	stroke: Option<(usize, f32)>,
	help_visible: bool,

	rng: StdRng,
}

impl<H: AudioHost> SynthesisSession<H> {
	pub fn new(config: SynthConfig, host: Option<H>) -> Result<SynthesisSession<H>, Error> {
		Self::with_rng(config, host, StdRng::from_entropy())
	}

	pub fn with_rng(config: SynthConfig, host: Option<H>, mut rng: StdRng) -> Result<SynthesisSession<H>, Error> {
		config.validate()?;

		let width = config.canvas.width;
		let window = SelectionWindow::new(width, config.window.min_width)?;

		let mut waveform = WaveformBuffer::new(width);
		waveform.overwrite(config.preset.initial.generate(width, &config.preset, &mut rng));

		let playback = PlaybackSession::new(host, config.render.sample_rate, config.playback.looping);

		Ok(SynthesisSession {
			config,
			waveform,
			window,
			playback,
			stroke: None,
			help_visible: false,
			rng,
		})
	}

	pub fn waveform(&self) -> &WaveformBuffer {
		&self.waveform
	}

	pub fn window(&self) -> &SelectionWindow {
		&self.window
	}

	pub fn playback_state(&self) -> PlaybackState {
		self.playback.state()
	}

	pub fn audio_available(&self) -> bool {
		self.playback.is_available()
	}

	pub fn looping(&self) -> bool {
		self.playback.looping()
	}

	pub fn help_visible(&self) -> bool {
		self.help_visible
	}

	fn vertical_domain(&self) -> Span {
		canvas_domain(self.config.canvas.height)
	}

	pub fn apply(&mut self, command: Command) -> Result<(), Error> {
		match command {
			Command::StrokeStart(point) => {
				if self.config.stroke.clear_on_start {
					self.waveform.overwrite(Preset::Flat.generate(self.waveform.width(), &self.config.preset, &mut self.rng));
				}

				let column = normalize(point, self.vertical_domain(), Span::AMPLITUDE, self.waveform.width());
				self.waveform.write(column.0, column.1);
				self.stroke = Some(column);
			}

			Command::StrokeDrag(point) => {
				let domain = self.vertical_domain();
				let column = normalize(point, domain, Span::AMPLITUDE, self.waveform.width());

				match self.stroke {
					Some(previous) if self.config.stroke.interpolate => self.waveform.draw_segment(previous, column),
					_ => self.waveform.draw_points(&[point], domain, Span::AMPLITUDE),
				}

				self.stroke = Some(column);
			}

			Command::StrokeEnd => {
				if self.stroke.take().is_some() {
					self.retrigger()?;
				}
			}

			Command::MoveWindow { direction, speed } => {
				if self.window.shift(direction, speed) {
					debug!(start = self.window.start(), end = self.window.end(), "Selection window moved.");
					self.retrigger()?;
				}
			}

			Command::ResizeWindow { direction, speed } => {
				if self.window.resize(direction, speed) {
					debug!(start = self.window.start(), end = self.window.end(), "Selection window resized.");
					self.retrigger()?;
				}
			}

			Command::Reset(preset) => {
				info!(?preset, "Resetting waveform.");
				self.stroke = None;
				self.waveform.overwrite(preset.generate(self.waveform.width(), &self.config.preset, &mut self.rng));
				self.retrigger()?;
			}

			Command::Trigger => {
				self.trigger()?;
			}

			Command::OpenAudio => {
				self.playback.open()?;
			}

			Command::SetLooping(looping) => {
				self.playback.set_looping(looping);
			}

			Command::ToggleHelp => {
				self.help_visible = !self.help_visible;
			}
		}

		Ok(())
	}

	/// Renders the current selection and plays it. Does nothing until audio is open.
	pub fn trigger(&mut self) -> Result<bool, Error> {
		if !self.playback.is_open() {
			debug!("Trigger ignored, audio context is not open.");
			return Ok(false);
		}

		let buffer = self.render();
		debug!(frames = buffer.frames().len(), duration = ?buffer.duration(), "Rendered selection.");
		self.playback.trigger(Arc::new(buffer))
	}

	pub fn render(&self) -> RenderedAudioBuffer {
		render::render(&self.waveform, &self.window, &self.config.render)
	}

	/// Edits are audible straight away once audio is open.
	fn retrigger(&mut self) -> Result<(), Error> {
		self.trigger().map(|_| ())
	}

	/// Processes playback notifications. Returns true if anything changed.
	pub fn poll(&mut self) -> bool {
		self.playback.poll()
	}

	pub fn close(&mut self) -> Result<(), Error> {
		self.playback.close()
	}
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::playback::mock::{Event, Host};

	fn config() -> SynthConfig {
		let mut config = SynthConfig::default();
		config.canvas.width = 10;
		config.canvas.height = 100;
		config.render.sample_rate = 100;
		config.render.attack_seconds = 0.1;
		config.preset.initial = Preset::Flat;
		config
	}

	fn session(config: SynthConfig, host: Option<Host>) -> SynthesisSession<Host> {
		SynthesisSession::with_rng(config, host, StdRng::seed_from_u64(3)).unwrap()
	}

	fn starts(host: &Host) -> usize {
		host.events().iter().filter(|event| matches!(event, Event::Start(_))).count()
	}

	#[test]
	fn starts_with_initial_preset_and_default_window() {
		let mut config = config();
		config.canvas.width = 800;
		config.preset.initial = Preset::Sine;
		let session = session(config, None);

		assert_eq!(session.waveform().width(), 800);
		assert_eq!(session.window().bounds(), (160, 320));
		assert!(session.waveform().samples().iter().any(|s| *s != 0.0));
		assert_eq!(session.playback_state(), PlaybackState::Closed);
	}

	#[test]
	fn stroke_clears_and_interpolates() {
		let mut session = session(config(), None);
		session.apply(Command::Reset(Preset::Noise)).unwrap();

		session.apply(Command::StrokeStart(Point::new(1.0, 0.0))).unwrap();
		session.apply(Command::StrokeDrag(Point::new(5.0, 100.0))).unwrap();
		session.apply(Command::StrokeEnd).unwrap();

		let samples = session.waveform().samples();
		assert_eq!(&samples[1..=5], &[1.0, 0.5, 0.0, -0.5, -1.0]);
		assert_eq!(samples[0], 0.0);
		assert!(samples[6..].iter().all(|s| *s == 0.0));
	}

	#[test]
	fn stroke_without_interpolation_leaves_gaps() {
		let mut config = config();
		config.stroke.interpolate = false;
		let mut session = session(config, None);

		session.apply(Command::StrokeStart(Point::new(1.0, 0.0))).unwrap();
		session.apply(Command::StrokeDrag(Point::new(5.0, 100.0))).unwrap();

		assert_eq!(&session.waveform().samples()[1..=5], &[1.0, 0.0, 0.0, 0.0, -1.0]);
	}

	#[test]
	fn stroke_can_keep_previous_drawing() {
		let mut config = config();
		config.stroke.clear_on_start = false;
		let mut session = session(config, None);

		session.apply(Command::StrokeStart(Point::new(0.0, 0.0))).unwrap();
		session.apply(Command::StrokeEnd).unwrap();
		session.apply(Command::StrokeStart(Point::new(9.0, 100.0))).unwrap();

		assert_eq!(session.waveform().samples()[0], 1.0);
		assert_eq!(session.waveform().samples()[9], -1.0);
	}

	#[test]
	fn trigger_before_open_does_nothing() {
		let host = Host::default();
		let mut session = session(config(), Some(host.clone()));

		session.apply(Command::Trigger).unwrap();
		session.apply(Command::MoveWindow { direction: MoveDirection::Right, speed: 1 }).unwrap();

		assert!(host.events().is_empty());
		assert_eq!(session.playback_state(), PlaybackState::Closed);
	}

	#[test]
	fn trigger_plays_rendered_selection() {
		let host = Host::default();
		let mut session = session(config(), Some(host.clone()));

		session.apply(Command::OpenAudio).unwrap();
		session.apply(Command::Trigger).unwrap();

		assert_eq!(host.events(), vec![
			Event::Open(100),
			Event::Create { id: 0, frames: 100, looping: false },
			Event::Start(0),
		]);
		assert_eq!(session.playback_state(), PlaybackState::Playing);
	}

	#[test]
	fn window_edits_retrigger_only_when_changed() {
		let host = Host::default();
		let mut session = session(config(), Some(host.clone()));
		session.apply(Command::OpenAudio).unwrap();

		session.apply(Command::MoveWindow { direction: MoveDirection::Right, speed: 2 }).unwrap();
		assert_eq!(starts(&host), 1);

		session.apply(Command::ResizeWindow { direction: ResizeDirection::Narrow, speed: 5 }).unwrap();
		assert_eq!(starts(&host), 1);

		session.apply(Command::ResizeWindow { direction: ResizeDirection::Widen, speed: 1 }).unwrap();
		assert_eq!(starts(&host), 2);
		assert_eq!(host.max_connected(), 1);
	}

	#[test]
	fn replace_stops_before_starting() {
		let host = Host::default();
		let mut session = session(config(), Some(host.clone()));
		session.apply(Command::OpenAudio).unwrap();

		session.apply(Command::Trigger).unwrap();
		session.apply(Command::Trigger).unwrap();

		let events = host.events();
		let stop_a = events.iter().position(|e| *e == Event::Stop(0)).unwrap();
		let start_b = events.iter().position(|e| *e == Event::Start(1)).unwrap();
		assert!(stop_a < start_b);
	}

	#[test]
	fn stroke_end_and_reset_retrigger() {
		let host = Host::default();
		let mut session = session(config(), Some(host.clone()));
		session.apply(Command::OpenAudio).unwrap();

		session.apply(Command::StrokeStart(Point::new(3.0, 20.0))).unwrap();
		session.apply(Command::StrokeDrag(Point::new(4.0, 30.0))).unwrap();
		assert_eq!(starts(&host), 0);

		session.apply(Command::StrokeEnd).unwrap();
		assert_eq!(starts(&host), 1);

		session.apply(Command::Reset(Preset::Sine)).unwrap();
		assert_eq!(starts(&host), 2);
	}

	#[test]
	fn flat_waveform_renders_silence() {
		let session = session(config(), None);
		assert!(session.render().frames().iter().all(|f| *f == 0.0));
	}

	#[test]
	fn looping_and_natural_end() {
		let host = Host::default();
		let mut session = session(config(), Some(host.clone()));
		session.apply(Command::OpenAudio).unwrap();
		session.apply(Command::Trigger).unwrap();

		host.finish(0);
		assert!(session.poll());
		assert_eq!(session.playback_state(), PlaybackState::Idle);

		session.apply(Command::SetLooping(true)).unwrap();
		assert!(session.looping());
		session.apply(Command::Trigger).unwrap();
		assert!(host.events().contains(&Event::Create { id: 1, frames: 100, looping: true }));
	}

	#[test]
	fn help_toggles() {
		let mut session = session(config(), None);
		session.apply(Command::ToggleHelp).unwrap();
		assert!(session.help_visible());
		session.apply(Command::ToggleHelp).unwrap();
		assert!(!session.help_visible());
	}

	#[test]
	fn missing_audio_keeps_drawing_working() {
		let mut session = session(config(), None);
		session.apply(Command::OpenAudio).unwrap();
		session.apply(Command::StrokeStart(Point::new(2.0, 0.0))).unwrap();
		session.apply(Command::StrokeEnd).unwrap();

		assert!(!session.audio_available());
		assert_eq!(session.waveform().samples()[2], 1.0);
	}
}
