use std::ops::RangeInclusive;

use crate::session::Command;
use crate::waveform::{canvas_domain, denormalize, Point, Span};


const HELP_TEXT: &str = "Draw on the canvas to shape the waveform.\n\
	Left / Right: move the selection\n\
	Up / Down: widen / narrow the selection (hold Shift for bigger steps)\n\
	Space: play the selection\n\
	H: toggle this help";


/// The drawing surface. Pointer strokes become commands, nothing is mutated directly.
pub struct WaveformCanvas<'a> {
	pub waveform: &'a [f32],
	pub window: (usize, usize),

	/// Canvas size in the pixel space pointer coordinates are reported in.
	pub canvas_size: (usize, usize),
	pub help_visible: bool,

	pub commands: &'a mut Vec<Command>,
}


impl egui::Widget for WaveformCanvas<'_> {
	fn ui(mut self, ui: &mut egui::Ui) -> egui::Response {
		let (mut response, mut painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
		let rect = response.rect.shrink(5.0);

		response.rect = rect;
		painter.set_clip_rect(response.rect);

		let mapping = CanvasMapping::new(rect, self.canvas_size);

		let bg_color = ui.visuals().panel_fill;
		let outline_stroke = ui.visuals().window_stroke;
		let wave_stroke = egui::Stroke::new(1.5, egui::Color32::from_rgba_unmultiplied(204, 51, 0, 204));
		let marker_stroke = egui::Stroke::new(1.0, egui::Color32::LIGHT_BLUE);
		let selection_color = egui::Color32::LIGHT_BLUE.linear_multiply(0.2);

		// Background
		painter.rect(rect, 0.0, bg_color, outline_stroke);

		self.handle_input(&mut response, &mapping);

		// Draw selection
		{
			let (start, end) = self.window;
			let start_x = mapping.column_to_display(start);
			let end_x = mapping.column_to_display(end);

			let selection = egui::Rect::from_x_y_ranges(start_x..=end_x, rect.y_range());
			painter.rect(selection, 0.0, selection_color, egui::Stroke::NONE);

			painter.vline(start_x, rect.y_range(), marker_stroke);
			painter.vline(end_x, rect.y_range(), marker_stroke);
		}

		// Draw waveform
		if !self.waveform.is_empty() {
			let points = self.waveform.iter()
				.enumerate()
				.map(|(column, amplitude)| egui::pos2(mapping.column_to_display(column), mapping.amplitude_to_display(*amplitude)))
				.collect();

			painter.add(egui::Shape::line(points, wave_stroke));
		}

		if self.help_visible {
			painter.text(
				rect.left_top() + egui::vec2(10.0, 10.0),
				egui::Align2::LEFT_TOP,
				HELP_TEXT,
				egui::FontId::proportional(14.0),
				ui.visuals().text_color(),
			);
		}

		response
	}
}

impl WaveformCanvas<'_> {
	fn handle_input(&mut self, response: &mut egui::Response, mapping: &CanvasMapping) {
		if response.drag_started() {
			if let Some(pos) = response.interact_pointer_pos() {
				self.commands.push(Command::StrokeStart(mapping.display_to_canvas(pos)));
				response.mark_changed();
			}
		} else if response.dragged() {
			if let Some(pos) = response.interact_pointer_pos() {
				self.commands.push(Command::StrokeDrag(mapping.display_to_canvas(pos)));
				response.mark_changed();
			}
		}

		if response.drag_released() {
			self.commands.push(Command::StrokeEnd);
		}
	}
}



/// Maps between screen points and canvas pixel coordinates.
struct CanvasMapping {
	display_x: RangeInclusive<f32>,
	display_y: RangeInclusive<f32>,
	canvas_width: f32,
	canvas_height: f32,
}

impl CanvasMapping {
	pub fn new(rect: egui::Rect, (canvas_width, canvas_height): (usize, usize)) -> Self {
		CanvasMapping {
			display_x: rect.x_range(),
			display_y: rect.y_range(),
			canvas_width: canvas_width as f32,
			canvas_height: canvas_height as f32,
		}
	}

	fn display_width(&self) -> f32 {
		self.display_x.end() - self.display_x.start()
	}

	fn display_height(&self) -> f32 {
		self.display_y.end() - self.display_y.start()
	}

	pub fn display_to_canvas(&self, pos: egui::Pos2) -> Point {
		Point::new(
			(pos.x - self.display_x.start()) / self.display_width() * self.canvas_width,
			(pos.y - self.display_y.start()) / self.display_height() * self.canvas_height,
		)
	}

	pub fn column_to_display(&self, column: usize) -> f32 {
		self.display_x.start() + column as f32 / self.canvas_width * self.display_width()
	}

	/// +1 sits on the top edge, -1 on the bottom edge.
	pub fn amplitude_to_display(&self, amplitude: f32) -> f32 {
		let canvas_y = denormalize(amplitude, canvas_domain(self.canvas_height as usize), Span::AMPLITUDE);
		self.display_y.start() + canvas_y / self.canvas_height * self.display_height()
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	fn mapping() -> CanvasMapping {
		let rect = egui::Rect::from_min_max(egui::pos2(10.0, 20.0), egui::pos2(410.0, 170.0));
		CanvasMapping::new(rect, (800, 300))
	}

	#[test]
	fn display_points_scale_into_canvas_pixels() {
		let mapping = mapping();

		assert_eq!(mapping.display_to_canvas(egui::pos2(10.0, 20.0)), Point::new(0.0, 0.0));
		assert_eq!(mapping.display_to_canvas(egui::pos2(210.0, 95.0)), Point::new(400.0, 150.0));
		assert_eq!(mapping.display_to_canvas(egui::pos2(410.0, 170.0)), Point::new(800.0, 300.0));
	}

	#[test]
	fn columns_and_amplitudes_map_back_onto_the_rect() {
		let mapping = mapping();

		assert_eq!(mapping.column_to_display(0), 10.0);
		assert_eq!(mapping.column_to_display(400), 210.0);
		assert_eq!(mapping.amplitude_to_display(1.0), 20.0);
		assert_eq!(mapping.amplitude_to_display(-1.0), 170.0);
		assert_eq!(mapping.amplitude_to_display(0.0), 95.0);
	}
}
