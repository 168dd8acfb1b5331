//! Configuration file schema

use crate::keymap::{KeyBinding, KeyRegistry, LogicalAction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base pointer speed in pixels per tick
    pub speed: f64,
    /// Speed used once decelerate has been pressed
    pub min_speed: f64,
    /// Session tick rate in Hz
    pub rate: u32,
    /// Acceleration gained per moving tick
    pub acceleration: f64,
    /// Acceleration ceiling
    pub max_acceleration: f64,
    /// Acceleration lost per idle tick
    pub deceleration: f64,
    /// Scroll pulses per second while a scroll key is held
    pub scroll_rate: u32,

    pub keymap: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: 0.5,
            min_speed: 0.25,
            rate: 1000,
            acceleration: 0.005,
            max_acceleration: 6.0,
            deceleration: 0.2,
            scroll_rate: 20,
            keymap: Keymap::default(),
        }
    }
}

impl Config {
    /// Defaults plus the standard home-row keymap
    pub fn with_standard_keymap() -> Self {
        Self {
            keymap: Keymap::standard(),
            ..Self::default()
        }
    }
}

/// Key bindings, one entry per logical action. Absent entries are unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keymap {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub left: KeyBinding,
    pub right: KeyBinding,

    pub button1: KeyBinding,
    pub button2: KeyBinding,
    pub button3: KeyBinding,

    pub button1_alt: KeyBinding,
    pub button2_alt: KeyBinding,
    pub button3_alt: KeyBinding,

    pub scroll_up: KeyBinding,
    pub scroll_down: KeyBinding,
    pub scroll_left: KeyBinding,
    pub scroll_right: KeyBinding,

    pub decelerate: KeyBinding,
    pub mlock: KeyBinding,
}

impl Keymap {
    pub fn standard() -> Self {
        Self {
            up: KeyBinding::new(31),    // I
            down: KeyBinding::new(45),  // K
            left: KeyBinding::new(44),  // J
            right: KeyBinding::new(46), // L

            button1: KeyBinding::without_grab(41), // S
            button2: KeyBinding::without_grab(40), // D
            button3: KeyBinding::without_grab(39), // F

            button1_alt: KeyBinding::without_grab(58), // M
            button2_alt: KeyBinding::without_grab(59), // ,
            button3_alt: KeyBinding::without_grab(60), // .

            scroll_up: KeyBinding::new(43),    // H
            scroll_down: KeyBinding::new(57),  // N
            scroll_left: KeyBinding::new(30),  // U
            scroll_right: KeyBinding::new(32), // O

            decelerate: KeyBinding::new(65), // Space
            mlock: KeyBinding::new(33),      // P
        }
    }

    pub fn binding(&self, action: LogicalAction) -> KeyBinding {
        match action {
            LogicalAction::MoveUp => self.up,
            LogicalAction::MoveDown => self.down,
            LogicalAction::MoveLeft => self.left,
            LogicalAction::MoveRight => self.right,
            LogicalAction::Button1 => self.button1,
            LogicalAction::Button2 => self.button2,
            LogicalAction::Button3 => self.button3,
            LogicalAction::Button1Alt => self.button1_alt,
            LogicalAction::Button2Alt => self.button2_alt,
            LogicalAction::Button3Alt => self.button3_alt,
            LogicalAction::ScrollUp => self.scroll_up,
            LogicalAction::ScrollDown => self.scroll_down,
            LogicalAction::ScrollLeft => self.scroll_left,
            LogicalAction::ScrollRight => self.scroll_right,
            LogicalAction::Decelerate => self.decelerate,
            LogicalAction::ModLock => self.mlock,
        }
    }

    /// Build the registry from these bindings
    pub fn registry(&self) -> KeyRegistry {
        let mut registry = KeyRegistry::new();
        for action in LogicalAction::ALL {
            let binding = self.binding(action);
            registry.bind(action, binding.keycode, binding.no_grab);
        }
        registry
    }
}
