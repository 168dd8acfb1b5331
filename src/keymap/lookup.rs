//! Keycode to action reverse map
//!
//! Built once at startup. Declaration order is `LogicalAction::ALL` followed
//! by the system modifier; when two entries share a keycode the first one
//! wins and the loser is reported.

use crate::display::Keycode;
use crate::keymap::action::LogicalAction;
use crate::keymap::registry::KeyRegistry;
use std::collections::HashMap;

/// What a physical key means to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// A motion, button, scroll or decelerate action (already canonical)
    Action(LogicalAction),
    /// The sticky lock toggle
    ModLock,
    /// The system modifier that activates sessions
    Modifier,
}

/// A binding that lost its keycode to an earlier declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadowed {
    pub keycode: Keycode,
    pub winner: KeyRole,
    pub loser: KeyRole,
}

#[derive(Debug, Clone, Default)]
pub struct KeyLookup {
    roles: HashMap<Keycode, KeyRole>,
    shadowed: Vec<Shadowed>,
}

impl KeyLookup {
    pub fn build(registry: &KeyRegistry, modifier: Keycode) -> Self {
        let mut lookup = Self::default();

        for (action, binding) in registry.bindings() {
            if !binding.is_bound() {
                continue;
            }
            let role = match action {
                LogicalAction::ModLock => KeyRole::ModLock,
                other => KeyRole::Action(other.canonical()),
            };
            lookup.declare(binding.keycode, role);
        }
        if modifier != 0 {
            lookup.declare(modifier, KeyRole::Modifier);
        }

        for s in &lookup.shadowed {
            tracing::warn!(
                "Keycode {} is bound to both {:?} and {:?}; {:?} never triggers",
                s.keycode,
                s.winner,
                s.loser,
                s.loser
            );
        }
        lookup
    }

    fn declare(&mut self, keycode: Keycode, role: KeyRole) {
        match self.roles.get(&keycode) {
            Some(&winner) => self.shadowed.push(Shadowed {
                keycode,
                winner,
                loser: role,
            }),
            None => {
                self.roles.insert(keycode, role);
            }
        }
    }

    pub fn resolve(&self, keycode: Keycode) -> Option<KeyRole> {
        self.roles.get(&keycode).copied()
    }

    #[cfg(test)]
    pub fn shadowed(&self) -> &[Shadowed] {
        &self.shadowed
    }
}
