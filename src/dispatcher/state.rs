//! Modifier/lock state machine
//!
//! Tracks whether a session is running, whether the sticky lock latch is on
//! and whether the activating modifier is still physically held. The latch
//! outlives sessions, so it is carried in `Idle` as well.
//!
//! ```text
//! Idle --(resolved key, no session)----> Active | Locked{held}
//! Active --(ModLock released)-----------> Locked{held}
//! Active --(modifier released)----------> Idle            cancel
//! Locked{held} --(ModLock released)-----> Active
//! Locked{!held} --(ModLock released)----> Idle            cancel
//! Locked{_} --(modifier released)-------> Locked{!held}
//! Locked{_} --(modifier pressed)--------> Active          latch off
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    /// No session
    Idle { latched: bool },
    /// Session running, latch off, modifier held
    Active,
    /// Session running with the latch on
    Locked { modifier_held: bool },
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState::Idle { latched: false }
    }
}

/// What the dispatcher must do after a ModLock release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// Latch turned on; counts as a resolved key for the session-start rule
    Engaged,
    /// Latch turned off, session (if any) keeps running
    Disengaged,
    /// Latch turned off and the session must stop
    Cancel,
}

impl GestureState {
    pub fn is_active(self) -> bool {
        !matches!(self, GestureState::Idle { .. })
    }

    pub fn latched(self) -> bool {
        match self {
            GestureState::Idle { latched } => latched,
            GestureState::Active => false,
            GestureState::Locked { .. } => true,
        }
    }

    /// A session was just spawned; the activating modifier is held
    pub fn session_started(self) -> Self {
        if self.latched() {
            GestureState::Locked {
                modifier_held: true,
            }
        } else {
            GestureState::Active
        }
    }

    /// The session ended without being cancelled
    pub fn session_lost(self) -> Self {
        GestureState::Idle {
            latched: self.latched(),
        }
    }

    pub fn modlock_released(self) -> (Self, LockOutcome) {
        match self {
            GestureState::Idle { latched: false } => {
                (GestureState::Idle { latched: true }, LockOutcome::Engaged)
            }
            GestureState::Idle { latched: true } => {
                (GestureState::Idle { latched: false }, LockOutcome::Disengaged)
            }
            GestureState::Active => (
                GestureState::Locked {
                    modifier_held: true,
                },
                LockOutcome::Engaged,
            ),
            GestureState::Locked {
                modifier_held: true,
            } => (GestureState::Active, LockOutcome::Disengaged),
            GestureState::Locked {
                modifier_held: false,
            } => (GestureState::Idle { latched: false }, LockOutcome::Cancel),
        }
    }

    /// Returns the next state and whether the session must be cancelled
    pub fn modifier_released(self) -> (Self, bool) {
        match self {
            GestureState::Idle { .. } => (self, false),
            GestureState::Active => (GestureState::Idle { latched: false }, true),
            GestureState::Locked { .. } => (
                GestureState::Locked {
                    modifier_held: false,
                },
                false,
            ),
        }
    }

    /// Pressing the modifier again turns the latch off
    pub fn modifier_pressed(self) -> Self {
        match self {
            GestureState::Idle { .. } => GestureState::Idle { latched: false },
            GestureState::Active | GestureState::Locked { .. } => GestureState::Active,
        }
    }
}
