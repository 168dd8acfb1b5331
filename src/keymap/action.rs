use crate::display::Keycode;
use serde::{Deserialize, Serialize};

/// Logical input concept bound to one physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Button1,
    Button2,
    Button3,
    Button1Alt,
    Button2Alt,
    Button3Alt,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    Decelerate,
    ModLock,
}

impl LogicalAction {
    pub const COUNT: usize = 16;

    /// Every action in declaration order (also the lookup priority order)
    pub const ALL: [LogicalAction; Self::COUNT] = [
        LogicalAction::MoveUp,
        LogicalAction::MoveDown,
        LogicalAction::MoveLeft,
        LogicalAction::MoveRight,
        LogicalAction::Button1,
        LogicalAction::Button2,
        LogicalAction::Button3,
        LogicalAction::Button1Alt,
        LogicalAction::Button2Alt,
        LogicalAction::Button3Alt,
        LogicalAction::ScrollUp,
        LogicalAction::ScrollDown,
        LogicalAction::ScrollLeft,
        LogicalAction::ScrollRight,
        LogicalAction::Decelerate,
        LogicalAction::ModLock,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Alternate button keys act as the button they alias
    pub fn canonical(self) -> Self {
        match self {
            LogicalAction::Button1Alt => LogicalAction::Button1,
            LogicalAction::Button2Alt => LogicalAction::Button2,
            LogicalAction::Button3Alt => LogicalAction::Button3,
            other => other,
        }
    }

    /// Key under `[keymap]` in the configuration file
    pub fn config_name(self) -> &'static str {
        match self {
            LogicalAction::MoveUp => "up",
            LogicalAction::MoveDown => "down",
            LogicalAction::MoveLeft => "left",
            LogicalAction::MoveRight => "right",
            LogicalAction::Button1 => "button1",
            LogicalAction::Button2 => "button2",
            LogicalAction::Button3 => "button3",
            LogicalAction::Button1Alt => "button1_alt",
            LogicalAction::Button2Alt => "button2_alt",
            LogicalAction::Button3Alt => "button3_alt",
            LogicalAction::ScrollUp => "scroll_up",
            LogicalAction::ScrollDown => "scroll_down",
            LogicalAction::ScrollLeft => "scroll_left",
            LogicalAction::ScrollRight => "scroll_right",
            LogicalAction::Decelerate => "decelerate",
            LogicalAction::ModLock => "mlock",
        }
    }
}

impl std::fmt::Display for LogicalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.config_name())
    }
}

/// Physical binding of a logical action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBinding {
    /// Keycode, 0 when unbound
    #[serde(skip_serializing_if = "is_zero")]
    pub keycode: Keycode,
    /// Skip the passive grab; the key only acts while a session holds the keyboard
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_grab: bool,
}

fn is_zero(keycode: &Keycode) -> bool {
    *keycode == 0
}

impl KeyBinding {
    pub const UNBOUND: KeyBinding = KeyBinding {
        keycode: 0,
        no_grab: false,
    };

    pub const fn new(keycode: Keycode) -> Self {
        Self {
            keycode,
            no_grab: false,
        }
    }

    pub const fn without_grab(keycode: Keycode) -> Self {
        Self {
            keycode,
            no_grab: true,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.keycode != 0
    }

    pub fn wants_passive_grab(&self) -> bool {
        self.is_bound() && !self.no_grab
    }
}
