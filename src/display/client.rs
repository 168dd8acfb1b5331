//! Display client trait
//!
//! Defines the interface to the display server that the dispatcher and the
//! motion sessions talk to: the input event stream, key grabs, the modifier
//! table and synthetic input injection.

use thiserror::Error;

/// Physical key code as reported by the display server
pub type Keycode = u8;

/// Errors that can occur while talking to the display server
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Failed to connect to display: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("Connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("Request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("Grab refused: {0}")]
    GrabRefused(String),

    #[error("Insufficient modifier table: {0}")]
    InsufficientModifierTable(String),

    #[error("Event stream closed")]
    EventStreamClosed,
}

/// Result type for display operations
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Input event delivered by the display server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key went down; coordinates are the pointer position on the root window
    KeyPress { keycode: Keycode, x: i16, y: i16 },
    /// Key went up
    KeyRelease { keycode: Keycode, x: i16, y: i16 },
    /// Anything else, carried only for logging
    Other(String),
}

/// Modifier-to-keycode table
///
/// Laid out as eight rows (Shift, Lock, Control, Mod1..Mod5) of
/// `keycodes_per_modifier` entries each. Zero entries are unused slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierMapping {
    pub keycodes_per_modifier: usize,
    pub keycodes: Vec<Keycode>,
}

impl ModifierMapping {
    /// Row index of Mod4 (the "super" modifier)
    const MOD4_ROW: usize = 6;

    pub fn new(keycodes: Vec<Keycode>) -> Self {
        Self {
            keycodes_per_modifier: keycodes.len() / 8,
            keycodes,
        }
    }

    /// Resolve the keycode of the activating modifier (first key bound to Mod4)
    pub fn super_keycode(&self) -> DisplayResult<Keycode> {
        let start = Self::MOD4_ROW * self.keycodes_per_modifier;
        let row = self
            .keycodes
            .get(start..start + self.keycodes_per_modifier)
            .filter(|row| !row.is_empty())
            .ok_or_else(|| {
                DisplayError::InsufficientModifierTable(format!(
                    "{} keycodes, {} per modifier",
                    self.keycodes.len(),
                    self.keycodes_per_modifier
                ))
            })?;

        row.iter().copied().find(|&k| k != 0).ok_or_else(|| {
            DisplayError::InsufficientModifierTable("no key is bound to Mod4".to_string())
        })
    }
}

/// Modifier combination for a passive grab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabModifiers {
    /// The activating modifier alone
    Super,
    /// The activating modifier with NumLock engaged
    SuperNumLock,
}

/// Trait for display server connections
///
/// Shared between the dispatcher thread and the running motion session,
/// so every method takes `&self`.
pub trait DisplayClient: Send + Sync + 'static {
    /// Block until the next input event arrives
    fn next_event(&self) -> DisplayResult<InputEvent>;

    /// Install a passive grab for `keycode` with the given modifiers
    fn grab_key(&self, keycode: Keycode, modifiers: GrabModifiers) -> DisplayResult<()>;

    /// Take the whole keyboard exclusively
    fn grab_keyboard(&self) -> DisplayResult<()>;

    /// Release the keyboard taken by `grab_keyboard`
    fn ungrab_keyboard(&self) -> DisplayResult<()>;

    /// Fetch the modifier table
    fn modifier_mapping(&self) -> DisplayResult<ModifierMapping>;

    /// Screen size in pixels (width, height)
    fn screen_size(&self) -> (u16, u16);

    /// Move the pointer to an absolute position
    fn inject_motion(&self, x: i16, y: i16);

    /// Press or release a pointer button
    fn inject_button(&self, button: u8, down: bool);
}
