use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program};
use iced::{Rectangle, Renderer, Theme};

use crate::Message;

/// Transparent layer stacked over the minimap image.
/// Turns left clicks into minimap-local click positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickLayer;

impl Program<Message> for ClickLayer {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        _renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        // The composite underneath is the picture
        vec![]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        if let canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
            if let Some(position) = cursor.position_in(bounds) {
                return (canvas::event::Status::Captured, Some(Message::Clicked(position)));
            }
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}
