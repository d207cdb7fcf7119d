/// Stacked RGB histogram of the selected tile
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Size};

use crate::histogram::{Histogram, BINS};
use crate::Message;

impl canvas::Program<Message> for Histogram {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let width = bounds.width;
        let height = bounds.height;

        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgba(1.0, 1.0, 1.0, 0.5),
        );

        if !self.is_empty() {
            let max_value = self.max_stack() as f32;
            let bar_width = width / BINS as f32;
            let colors = [
                Color::from_rgb(1.0, 0.0, 0.0),
                Color::from_rgb(0.0, 0.8, 0.0),
                Color::from_rgb(0.0, 0.0, 1.0),
            ];

            for i in 0..BINS {
                let x = i as f32 * bar_width;
                // Red at the bottom, then green, then blue
                let mut bottom = height;
                for (channel, color) in [self.reds[i], self.greens[i], self.blues[i]]
                    .into_iter()
                    .zip(colors)
                {
                    let bar_height = channel as f32 / max_value * height;
                    if bar_height > 0.0 {
                        frame.fill_rectangle(
                            Point::new(x, bottom - bar_height),
                            Size::new(bar_width, bar_height),
                            color,
                        );
                    }
                    bottom -= bar_height;
                }
            }
        }

        frame.stroke(
            &Path::rectangle(Point::ORIGIN, Size::new(width, height)),
            Stroke::default().with_color(Color::BLACK).with_width(1.0),
        );

        vec![frame.into_geometry()]
    }
}
