//! Key registry
//!
//! Bindings are fixed once the registry is shared. The down-state of every
//! action lives behind a single lock so a session tick reads all of it in one
//! acquisition and never sees a half-applied update.

use crate::keymap::action::{KeyBinding, LogicalAction};
use parking_lot::RwLock;

/// Down-state of every action at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    down: [bool; LogicalAction::COUNT],
}

impl KeySnapshot {
    pub fn is_down(&self, action: LogicalAction) -> bool {
        self.down[action.index()]
    }

    /// Build a snapshot with the given actions held
    #[cfg(test)]
    pub fn with_down(actions: &[LogicalAction]) -> Self {
        let mut snapshot = Self::default();
        for action in actions {
            snapshot.down[action.index()] = true;
        }
        snapshot
    }
}

#[derive(Debug, Default)]
pub struct KeyRegistry {
    bindings: [KeyBinding; LogicalAction::COUNT],
    down: RwLock<[bool; LogicalAction::COUNT]>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an action to a key. Only possible before the registry is shared.
    pub fn bind(&mut self, action: LogicalAction, keycode: u8, no_grab: bool) {
        self.bindings[action.index()] = KeyBinding { keycode, no_grab };
    }

    pub fn binding(&self, action: LogicalAction) -> KeyBinding {
        self.bindings[action.index()]
    }

    /// Bindings in declaration order
    pub fn bindings(&self) -> impl Iterator<Item = (LogicalAction, KeyBinding)> + '_ {
        LogicalAction::ALL
            .into_iter()
            .map(move |action| (action, self.bindings[action.index()]))
    }

    pub fn set_down(&self, action: LogicalAction, down: bool) {
        self.down.write()[action.index()] = down;
    }

    pub fn snapshot(&self) -> KeySnapshot {
        KeySnapshot { down: *self.down.read() }
    }
}
