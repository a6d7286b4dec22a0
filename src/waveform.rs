/// A raw pointer position in canvas pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	pub x: f32,
	pub y: f32,
}

impl Point {
	pub fn new(x: f32, y: f32) -> Point {
		Point { x, y }
	}
}


/// One end of a linear mapping. `min` may be greater than `max`, which flips the axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
	pub min: f32,
	pub max: f32,
}

impl Span {
	pub const AMPLITUDE: Span = Span { min: -1.0, max: 1.0 };

	pub fn new(min: f32, max: f32) -> Span {
		Span { min, max }
	}

	fn lower(&self) -> f32 {
		self.min.min(self.max)
	}

	fn upper(&self) -> f32 {
		self.min.max(self.max)
	}
}


/// Vertical canvas pixels, row 0 at the top, mapped so the top edge is the upper amplitude bound.
pub fn canvas_domain(height: usize) -> Span {
	Span::new(height as f32, 0.0)
}

/// Linearly remaps `value` from `domain` into `range`.
///
/// A zero-length domain has no meaningful slope and maps everything to the middle of `range`.
pub fn remap(value: f32, domain: Span, range: Span) -> f32 {
	let domain_len = domain.max - domain.min;
	if domain_len == 0.0 {
		return (range.min + range.max) / 2.0;
	}

	(value - domain.min) * (range.max - range.min) / domain_len + range.min
}

/// Maps a raw pointer coordinate onto a buffer index and an amplitude.
///
/// The index is `point.x` truncated and clamped to `0..width`. The amplitude is `point.y`
/// remapped from `domain` into `range`, clamped to the range bounds so that drags which
/// leave the canvas still produce valid samples.
pub fn normalize(point: Point, domain: Span, range: Span, width: usize) -> (usize, f32) {
	let max_index = width.saturating_sub(1);
	// `as usize` saturates negatives and NaN to zero.
	let index = (point.x as usize).min(max_index);

	let amplitude = remap(point.y, domain, range).clamp(range.lower(), range.upper());

	(index, amplitude)
}

/// Inverse of the amplitude half of [`normalize`].
pub fn denormalize(amplitude: f32, domain: Span, range: Span) -> f32 {
	remap(amplitude, range, domain)
}



/// Dense per-column amplitude store for the drawn curve.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformBuffer {
	samples: Vec<f32>,
}

impl WaveformBuffer {
	/// A silent buffer of `width` columns.
	pub fn new(width: usize) -> WaveformBuffer {
		WaveformBuffer {
			samples: vec![0.0; width],
		}
	}

	#[cfg(test)]
	pub fn from_samples(samples: Vec<f32>) -> WaveformBuffer {
		let mut buffer = WaveformBuffer { samples };
		for sample in buffer.samples.iter_mut() {
			*sample = clamp_amplitude(*sample);
		}
		buffer
	}

	pub fn width(&self) -> usize {
		self.samples.len()
	}

	pub fn samples(&self) -> &[f32] {
		&self.samples
	}

	pub fn slice(&self, start: usize, end: usize) -> &[f32] {
		&self.samples[start..end]
	}

	/// Writes a single column. Out of range indices are ignored.
	pub fn write(&mut self, index: usize, amplitude: f32) {
		if let Some(sample) = self.samples.get_mut(index) {
			*sample = clamp_amplitude(amplitude);
		}
	}

	/// Fully overwrites the buffer. Missing trailing values become silence, extra values are dropped.
	pub fn overwrite(&mut self, samples: impl IntoIterator<Item = f32>) {
		let mut samples = samples.into_iter();
		for sample in self.samples.iter_mut() {
			*sample = clamp_amplitude(samples.next().unwrap_or(0.0));
		}
	}

	/// Normalizes and writes every point in order; later points at the same index win.
	pub fn draw_points(&mut self, points: &[Point], domain: Span, range: Span) {
		let width = self.width();
		if width == 0 {
			return;
		}

		for &point in points {
			let (index, amplitude) = normalize(point, domain, range, width);
			self.write(index, amplitude);
		}
	}

	/// Writes the straight line between two columns, both ends inclusive.
	pub fn draw_segment(&mut self, from: (usize, f32), to: (usize, f32)) {
		let ((start, start_amp), (end, end_amp)) = if from.0 <= to.0 { (from, to) } else { (to, from) };

		if start == end {
			self.write(end, end_amp);
			return;
		}

		let span = (end - start) as f32;
		for index in start..=end {
			let t = (index - start) as f32 / span;
			self.write(index, start_amp + (end_amp - start_amp) * t);
		}
	}
}


fn clamp_amplitude(amplitude: f32) -> f32 {
	if amplitude.is_nan() {
		0.0
	} else {
		amplitude.clamp(-1.0, 1.0)
	}
}
