//! Synthetic input emitter
//!
//! Forwards synthetic pointer events to the display. Emission is
//! fire-and-forget.

use crate::display::DisplayClient;
use std::sync::Arc;

/// Pointer button ids as the display server numbers them
pub mod button {
    pub const LEFT: u8 = 1;
    pub const MIDDLE: u8 = 2;
    pub const RIGHT: u8 = 3;
    pub const SCROLL_UP: u8 = 4;
    pub const SCROLL_DOWN: u8 = 5;
    pub const SCROLL_LEFT: u8 = 6;
    pub const SCROLL_RIGHT: u8 = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticEvent {
    Motion { x: i16, y: i16 },
    Button { button: u8, down: bool },
}

impl SyntheticEvent {
    /// Press followed by release, as one scroll step
    pub fn pulse(button: u8) -> [SyntheticEvent; 2] {
        [
            SyntheticEvent::Button { button, down: true },
            SyntheticEvent::Button {
                button,
                down: false,
            },
        ]
    }
}

pub struct Emitter<D: DisplayClient> {
    display: Arc<D>,
}

impl<D: DisplayClient> Emitter<D> {
    pub fn new(display: Arc<D>) -> Self {
        Self { display }
    }

    pub fn emit(&self, event: SyntheticEvent) {
        match event {
            SyntheticEvent::Motion { x, y } => self.display.inject_motion(x, y),
            SyntheticEvent::Button { button, down } => self.display.inject_button(button, down),
        }
    }
}
