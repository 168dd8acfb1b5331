//! Cursor physics for one motion session
//!
//! `MotionState::tick` is one iteration of the session loop minus the wait:
//! it integrates position from the held keys, updates acceleration and
//! returns the synthetic events the tick produced.

use crate::emitter::{button, SyntheticEvent};
use crate::keymap::{KeySnapshot, LogicalAction};
use std::time::Duration;
use tokio::time::Instant;

/// Session parameters, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub tick_interval: Duration,
    pub speed: f64,
    pub min_speed: f64,
    pub accel_increment: f64,
    pub accel_ceiling: f64,
    pub decel_decrement: f64,
    /// Minimum spacing of two scroll pulses on the same axis
    pub scroll_interval: Duration,
    pub screen_width: f64,
    pub screen_height: f64,
}

const BUTTONS: [(LogicalAction, u8); 3] = [
    (LogicalAction::Button1, button::LEFT),
    (LogicalAction::Button2, button::MIDDLE),
    (LogicalAction::Button3, button::RIGHT),
];

#[derive(Debug, Clone)]
pub struct MotionState {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub accel: f64,
    buttons: [bool; 3],
    next_vertical_scroll: Instant,
    next_horizontal_scroll: Instant,
}

impl MotionState {
    pub fn new((x, y): (i16, i16), params: &MotionParams, now: Instant) -> Self {
        Self {
            x: f64::from(x),
            y: f64::from(y),
            speed: params.speed,
            accel: 0.0,
            buttons: [false; 3],
            next_vertical_scroll: now,
            next_horizontal_scroll: now,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn tick(
        &mut self,
        keys: &KeySnapshot,
        params: &MotionParams,
        now: Instant,
    ) -> Vec<SyntheticEvent> {
        let mut events = Vec::new();
        let (ox, oy) = (self.x, self.y);

        let step = self.speed + self.accel;
        if keys.is_down(LogicalAction::MoveUp) {
            self.y -= step;
        }
        if keys.is_down(LogicalAction::MoveDown) {
            self.y += step;
        }
        if keys.is_down(LogicalAction::MoveLeft) {
            self.x -= step;
        }
        if keys.is_down(LogicalAction::MoveRight) {
            self.x += step;
        }

        // Decelerate pins acceleration at zero while held; the speed drop sticks.
        let decelerate = keys.is_down(LogicalAction::Decelerate);
        if decelerate {
            self.accel = 0.0;
            self.speed = params.min_speed;
        }

        self.x = self.x.clamp(0.0, params.screen_width);
        self.y = self.y.clamp(0.0, params.screen_height);

        if self.x != ox || self.y != oy {
            events.push(SyntheticEvent::Motion {
                x: ox as i16,
                y: oy as i16,
            });
            if !decelerate {
                self.accel = (self.accel + params.accel_increment).min(params.accel_ceiling);
            }
        } else {
            self.accel = (self.accel - params.decel_decrement).max(0.0);
        }

        for (i, (action, id)) in BUTTONS.iter().enumerate() {
            let down = keys.is_down(*action);
            if down != self.buttons[i] {
                events.push(SyntheticEvent::Button { button: *id, down });
                self.buttons[i] = down;
            }
        }

        let vertical = if keys.is_down(LogicalAction::ScrollUp) {
            Some(button::SCROLL_UP)
        } else if keys.is_down(LogicalAction::ScrollDown) {
            Some(button::SCROLL_DOWN)
        } else {
            None
        };
        if let Some(id) = vertical {
            if now >= self.next_vertical_scroll {
                events.extend(SyntheticEvent::pulse(id));
                self.next_vertical_scroll = now + params.scroll_interval;
            }
        }

        let horizontal = if keys.is_down(LogicalAction::ScrollLeft) {
            Some(button::SCROLL_LEFT)
        } else if keys.is_down(LogicalAction::ScrollRight) {
            Some(button::SCROLL_RIGHT)
        } else {
            None
        };
        if let Some(id) = horizontal {
            if now >= self.next_horizontal_scroll {
                events.extend(SyntheticEvent::pulse(id));
                self.next_horizontal_scroll = now + params.scroll_interval;
            }
        }

        events
    }
}
