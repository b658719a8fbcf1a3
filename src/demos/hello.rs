//! Smallest possible sample: one line of text on a cleared window

use glam::Vec2;

use crate::colors;
use crate::input::FrameInput;
use crate::render::Canvas;
use crate::sim::RoundEvent;

use super::Demo;

pub const GREETING: &str = "Congrats! You created your first window!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelloWindow {
    pub width: u32,
    pub height: u32,
}

impl Default for HelloWindow {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Demo for HelloWindow {
    fn title(&self) -> &str {
        "Hello Window"
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn update(&mut self, _input: &FrameInput, _dt: f32) -> Vec<RoundEvent> {
        Vec::new()
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.begin_frame(colors::RAYWHITE);
        canvas.text(GREETING, Vec2::new(190.0, 200.0), 20.0, colors::DARKGREEN);
        canvas.end_frame();
    }

    fn autopilot(&self) -> FrameInput {
        FrameInput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCmd, DrawList};

    #[test]
    fn test_draws_greeting() {
        let mut canvas = DrawList::new();
        HelloWindow::default().draw(&mut canvas);
        assert_eq!(
            canvas.commands(),
            &[
                DrawCmd::Clear(colors::RAYWHITE),
                DrawCmd::Text {
                    text: GREETING.to_owned(),
                    pos: Vec2::new(190.0, 200.0),
                    size: 20.0,
                    color: colors::DARKGREEN,
                },
            ]
        );
    }

    #[test]
    fn test_default_size() {
        assert_eq!(HelloWindow::default().screen_size(), (1920, 1080));
    }
}
