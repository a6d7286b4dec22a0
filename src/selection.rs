use crate::error::Error;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
	Left,
	Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeDirection {
	Widen,
	Narrow,
}


/// The half-open slice `[start, end)` of the waveform that gets sonified.
///
/// Always satisfies `0 <= start < end <= width` and `end - start >= min_width`;
/// every mutation clamps instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionWindow {
	start: usize,
	end: usize,
	width: usize,
	min_width: usize,
}

impl SelectionWindow {
	/// Default span covering `width/5 .. 2*width/5`, widened to `min_width` if needed.
	pub fn new(width: usize, min_width: usize) -> Result<SelectionWindow, Error> {
		let min_width = min_width.max(1);
		if width < min_width {
			return Err(Error::WaveformTooNarrow { width, min_width });
		}

		let start = width / 5;
		let end = (2 * width / 5).max(start + min_width).min(width);
		let start = start.min(end - min_width);

		Self::with_bounds(width, min_width, start, end)
	}

	pub fn with_bounds(width: usize, min_width: usize, start: usize, end: usize) -> Result<SelectionWindow, Error> {
		let min_width = min_width.max(1);
		if end > width || start >= end || end - start < min_width {
			return Err(Error::InvalidSelection { start, end, width, min_width });
		}

		Ok(SelectionWindow { start, end, width, min_width })
	}

	pub fn start(&self) -> usize {
		self.start
	}

	pub fn end(&self) -> usize {
		self.end
	}

	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn bounds(&self) -> (usize, usize) {
		(self.start, self.end)
	}

	/// Shifts the window by up to `speed` columns, keeping its length. Returns whether it moved.
	pub fn shift(&mut self, direction: MoveDirection, speed: usize) -> bool {
		let amount = match direction {
			MoveDirection::Left => speed.min(self.start),
			MoveDirection::Right => speed.min(self.width - self.end),
		};

		if amount == 0 {
			return false;
		}

		match direction {
			MoveDirection::Left => {
				self.start -= amount;
				self.end -= amount;
			}
			MoveDirection::Right => {
				self.start += amount;
				self.end += amount;
			}
		}

		true
	}

	/// Moves both bounds apart or together by up to `speed` columns each. Returns whether either changed.
	pub fn resize(&mut self, direction: ResizeDirection, speed: usize) -> bool {
		let (start, end) = match direction {
			ResizeDirection::Widen => (
				self.start.saturating_sub(speed),
				(self.end + speed).min(self.width),
			),
			ResizeDirection::Narrow => {
				let slack = self.len() - self.min_width;
				let from_start = speed.min(slack / 2);
				let from_end = speed.min(slack - from_start);
				(self.start + from_start, self.end - from_end)
			}
		};

		let changed = (start, end) != (self.start, self.end);
		self.start = start;
		self.end = end;
		changed
	}
}



#[cfg(test)]
mod tests {
	use rand::{rngs::StdRng, Rng, SeedableRng};

	use super::*;

	fn assert_valid(window: &SelectionWindow) {
		assert!(window.start() < window.end(), "{window:?}");
		assert!(window.end() <= window.width, "{window:?}");
		assert!(window.len() >= window.min_width, "{window:?}");
	}

	#[test]
	fn default_span_is_second_fifth() {
		let window = SelectionWindow::new(800, 3).unwrap();
		assert_eq!(window.bounds(), (160, 320));
	}

	#[test]
	fn default_span_respects_min_width() {
		let window = SelectionWindow::new(10, 3).unwrap();
		assert_eq!(window.bounds(), (2, 5));

		let window = SelectionWindow::new(3, 3).unwrap();
		assert_eq!(window.bounds(), (0, 3));
	}

	#[test]
	fn too_narrow_waveform_is_rejected() {
		assert!(matches!(
			SelectionWindow::new(2, 3),
			Err(Error::WaveformTooNarrow { width: 2, min_width: 3 })
		));
	}

	#[test]
	fn explicit_bounds_are_checked() {
		assert!(SelectionWindow::with_bounds(10, 3, 2, 6).is_ok());
		assert!(SelectionWindow::with_bounds(10, 3, 2, 4).is_err());
		assert!(SelectionWindow::with_bounds(10, 3, 8, 11).is_err());
		assert!(SelectionWindow::with_bounds(10, 3, 6, 6).is_err());
	}

	#[test]
	fn shift_clamps_at_edges_and_keeps_length() {
		let mut window = SelectionWindow::with_bounds(20, 3, 2, 8).unwrap();

		assert!(window.shift(MoveDirection::Left, 5));
		assert_eq!(window.bounds(), (0, 6));
		assert!(!window.shift(MoveDirection::Left, 5));

		assert!(window.shift(MoveDirection::Right, 100));
		assert_eq!(window.bounds(), (14, 20));
		assert!(!window.shift(MoveDirection::Right, 1));
	}

	#[test]
	fn narrow_stops_at_min_width() {
		let mut window = SelectionWindow::with_bounds(20, 3, 4, 12).unwrap();

		assert!(window.resize(ResizeDirection::Narrow, 2));
		assert_eq!(window.bounds(), (6, 10));

		assert!(window.resize(ResizeDirection::Narrow, 2));
		assert_eq!(window.len(), 3);

		assert!(!window.resize(ResizeDirection::Narrow, 2));
	}

	#[test]
	fn widen_clamps_to_buffer() {
		let mut window = SelectionWindow::with_bounds(20, 3, 1, 18).unwrap();
		assert!(window.resize(ResizeDirection::Widen, 5));
		assert_eq!(window.bounds(), (0, 20));
		assert!(!window.resize(ResizeDirection::Widen, 5));
	}

	#[test]
	fn random_commands_keep_invariants() {
		let mut rng = StdRng::seed_from_u64(42);

		for width in [3usize, 4, 10, 57, 800] {
			let mut window = SelectionWindow::new(width, 3).unwrap();

			for _ in 0..2000 {
				let speed = rng.gen_range(0..=width + 2);
				match rng.gen_range(0..4) {
					0 => window.shift(MoveDirection::Left, speed),
					1 => window.shift(MoveDirection::Right, speed),
					2 => window.resize(ResizeDirection::Widen, speed),
					_ => window.resize(ResizeDirection::Narrow, speed),
				};
				assert_valid(&window);
			}
		}
	}
}
