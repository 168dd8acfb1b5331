//! Event dispatcher
//!
//! Consumes the display's input events on a single thread, keeps the key
//! registry current, drives the gesture state machine and is the only place
//! that spawns or cancels motion sessions.

pub mod state;

pub use state::{GestureState, LockOutcome};

use crate::display::{DisplayClient, DisplayResult, GrabModifiers, InputEvent, Keycode};
use crate::keymap::{KeyLookup, KeyRegistry, KeyRole};
use crate::session::{spawn_session, MotionParams, SessionHandle, SessionSpec};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Install a passive grab for every bound key that wants one
///
/// Returns the number of grabs that failed. A failed binding still works
/// while a session holds the keyboard, it just cannot start one.
pub fn install_passive_grabs<D: DisplayClient>(display: &D, registry: &KeyRegistry) -> usize {
    let mut failed = 0;
    for (action, binding) in registry.bindings() {
        if !binding.wants_passive_grab() {
            continue;
        }
        for modifiers in [GrabModifiers::Super, GrabModifiers::SuperNumLock] {
            if let Err(e) = display.grab_key(binding.keycode, modifiers) {
                tracing::warn!(
                    "Failed to grab key {} for {} ({:?}): {}",
                    binding.keycode,
                    action,
                    modifiers,
                    e
                );
                failed += 1;
            }
        }
    }
    failed
}

pub struct Dispatcher<D: DisplayClient> {
    display: Arc<D>,
    registry: Arc<KeyRegistry>,
    lookup: KeyLookup,
    params: MotionParams,
    runtime: Handle,

    state: GestureState,
    session: Option<SessionHandle>,
    /// Cancelled but possibly still running; the next session waits on it
    retiring: Option<SessionHandle>,
    last_position: (i16, i16),
    sessions_started: u64,
}

impl<D: DisplayClient> Dispatcher<D> {
    pub fn new(
        display: Arc<D>,
        registry: Arc<KeyRegistry>,
        modifier: Keycode,
        params: MotionParams,
        runtime: Handle,
    ) -> Self {
        let lookup = KeyLookup::build(&registry, modifier);
        Self {
            display,
            registry,
            lookup,
            params,
            runtime,
            state: GestureState::default(),
            session: None,
            retiring: None,
            last_position: (0, 0),
            sessions_started: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// Process events until the event stream fails
    pub fn run(mut self) -> DisplayResult<()> {
        tracing::info!("Handling input");
        loop {
            let event = self.display.next_event()?;
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        self.reap_session();

        let start = match event {
            InputEvent::KeyPress { keycode, x, y } => {
                self.last_position = (x, y);
                self.key_pressed(keycode)
            }
            InputEvent::KeyRelease { keycode, x, y } => {
                self.last_position = (x, y);
                self.key_released(keycode)
            }
            InputEvent::Other(description) => {
                tracing::debug!("Unhandled event: {}", description);
                false
            }
        };

        if start && self.session.is_none() {
            self.start_session();
        }
    }

    /// Returns true when the key may start a session
    fn key_pressed(&mut self, keycode: Keycode) -> bool {
        match self.lookup.resolve(keycode) {
            Some(KeyRole::Action(action)) => {
                self.registry.set_down(action, true);
                true
            }
            // Only the release of the lock key means anything
            Some(KeyRole::ModLock) => false,
            Some(KeyRole::Modifier) => {
                if self.state.latched() {
                    tracing::info!("Mlock released by modifier");
                }
                self.state = self.state.modifier_pressed();
                false
            }
            None => false,
        }
    }

    fn key_released(&mut self, keycode: Keycode) -> bool {
        match self.lookup.resolve(keycode) {
            Some(KeyRole::Action(action)) => {
                self.registry.set_down(action, false);
                true
            }
            Some(KeyRole::ModLock) => {
                let (next, outcome) = self.state.modlock_released();
                self.state = next;
                match outcome {
                    LockOutcome::Engaged => {
                        tracing::info!("Mlock enabled");
                        true
                    }
                    LockOutcome::Disengaged => {
                        tracing::info!("Mlock disabled");
                        false
                    }
                    LockOutcome::Cancel => {
                        tracing::info!("Mlock released");
                        self.cancel_session();
                        false
                    }
                }
            }
            Some(KeyRole::Modifier) => {
                let (next, cancel) = self.state.modifier_released();
                self.state = next;
                if cancel {
                    self.cancel_session();
                }
                false
            }
            None => false,
        }
    }

    fn start_session(&mut self) {
        self.sessions_started += 1;
        let predecessor = self.retiring.take().filter(|s| !s.is_finished());
        let handle = spawn_session(
            &self.runtime,
            SessionSpec {
                id: self.sessions_started,
                display: self.display.clone(),
                registry: self.registry.clone(),
                params: self.params,
                origin: self.last_position,
                predecessor,
            },
        );
        self.session = Some(handle);
        self.state = self.state.session_started();
    }

    fn cancel_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Cancelling session {}", session.id());
            session.cancel();
            self.retiring = Some(session);
        }
    }

    fn reap_session(&mut self) {
        if self.retiring.as_ref().is_some_and(SessionHandle::is_finished) {
            self.retiring = None;
        }
        if self.session.as_ref().is_some_and(SessionHandle::is_finished) {
            if let Some(session) = self.session.take() {
                tracing::warn!("Session {} ended on its own", session.id());
            }
            self.state = self.state.session_lost();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mock::{Call, MockDisplay};
    use crate::display::DisplayError;
    use crate::keymap::{KeySnapshot, LogicalAction};
    use std::time::Duration;
    use tokio::time;

    const SUPER: Keycode = 133;
    const UP: Keycode = 31;
    const BUTTON1: Keycode = 41;
    const BUTTON1_ALT: Keycode = 58;
    const MLOCK: Keycode = 33;

    fn params() -> MotionParams {
        MotionParams {
            tick_interval: Duration::from_millis(1),
            speed: 0.5,
            min_speed: 0.25,
            accel_increment: 0.005,
            accel_ceiling: 6.0,
            decel_decrement: 0.2,
            scroll_interval: Duration::from_millis(50),
            screen_width: 1920.0,
            screen_height: 1080.0,
        }
    }

    fn registry() -> KeyRegistry {
        let mut registry = KeyRegistry::new();
        registry.bind(LogicalAction::MoveUp, UP, false);
        registry.bind(LogicalAction::Button1, BUTTON1, true);
        registry.bind(LogicalAction::Button1Alt, BUTTON1_ALT, true);
        registry.bind(LogicalAction::ModLock, MLOCK, false);
        registry
    }

    fn dispatcher(display: &Arc<MockDisplay>) -> Dispatcher<MockDisplay> {
        Dispatcher::new(
            display.clone(),
            Arc::new(registry()),
            SUPER,
            params(),
            Handle::current(),
        )
    }

    fn press(keycode: Keycode) -> InputEvent {
        InputEvent::KeyPress {
            keycode,
            x: 10,
            y: 20,
        }
    }

    fn release(keycode: Keycode) -> InputEvent {
        InputEvent::KeyRelease {
            keycode,
            x: 10,
            y: 20,
        }
    }

    async fn settle() {
        time::sleep(Duration::from_millis(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_starts_session() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(UP));
        assert_eq!(dispatcher.state(), GestureState::Active);
        assert!(dispatcher.session().is_some());
        assert!(dispatcher.registry.snapshot().is_down(LogicalAction::MoveUp));

        settle().await;
        assert_eq!(display.count(|c| *c == Call::GrabKeyboard), 1);
        // First motion is reported at the seed position
        assert!(display.calls().contains(&Call::Motion(10, 20)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_press_reuses_session() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(UP));
        settle().await;
        dispatcher.handle_event(press(BUTTON1));
        dispatcher.handle_event(release(BUTTON1));
        dispatcher.handle_event(press(BUTTON1_ALT));
        settle().await;

        assert_eq!(dispatcher.sessions_started(), 1);
        assert_eq!(display.count(|c| *c == Call::GrabKeyboard), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_modifier_release_cancels_session() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(UP));
        settle().await;
        dispatcher.handle_event(release(SUPER));
        assert_eq!(dispatcher.state(), GestureState::Idle { latched: false });
        assert!(dispatcher.session().is_none());

        settle().await;
        assert_eq!(display.calls().last(), Some(&Call::UngrabKeyboard));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_keeps_session_after_modifier_release() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(MLOCK));
        assert!(dispatcher.session().is_none());

        dispatcher.handle_event(release(MLOCK));
        assert_eq!(
            dispatcher.state(),
            GestureState::Locked {
                modifier_held: true
            }
        );
        assert!(dispatcher.session().is_some());

        dispatcher.handle_event(release(SUPER));
        settle().await;
        assert_eq!(
            dispatcher.state(),
            GestureState::Locked {
                modifier_held: false
            }
        );
        assert!(dispatcher.session().is_some_and(|s| !s.is_finished()));
        assert_eq!(display.count(|c| *c == Call::UngrabKeyboard), 0);

        dispatcher.handle_event(release(MLOCK));
        assert_eq!(dispatcher.state(), GestureState::Idle { latched: false });
        settle().await;
        assert_eq!(display.count(|c| *c == Call::UngrabKeyboard), 1);
        assert_eq!(dispatcher.sessions_started(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_during_active_session() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(UP));
        dispatcher.handle_event(release(MLOCK));
        assert_eq!(
            dispatcher.state(),
            GestureState::Locked {
                modifier_held: true
            }
        );
        assert_eq!(dispatcher.sessions_started(), 1);

        // Unlocking while the modifier is still down keeps the session
        dispatcher.handle_event(release(MLOCK));
        assert_eq!(dispatcher.state(), GestureState::Active);
        assert!(dispatcher.session().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_modifier_tap_dismisses_lock() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(release(MLOCK));
        dispatcher.handle_event(release(SUPER));
        dispatcher.handle_event(press(SUPER));
        assert_eq!(dispatcher.state(), GestureState::Active);

        dispatcher.handle_event(release(SUPER));
        assert_eq!(dispatcher.state(), GestureState::Idle { latched: false });
        assert!(dispatcher.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_restarts_cancelled_session() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(UP));
        dispatcher.handle_event(release(SUPER));
        dispatcher.handle_event(release(UP));

        assert!(dispatcher.session().is_some());
        assert_eq!(dispatcher.state(), GestureState::Active);
        assert_eq!(dispatcher.sessions_started(), 2);
        assert!(!dispatcher.registry.snapshot().is_down(LogicalAction::MoveUp));

        settle().await;
        assert_eq!(
            display.calls(),
            vec![Call::GrabKeyboard, Call::UngrabKeyboard, Call::GrabKeyboard]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restarted_sessions_never_share_the_grab() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(UP));
        for _ in 0..500 {
            dispatcher.handle_event(release(SUPER));
            dispatcher.handle_event(press(UP));
        }
        dispatcher.handle_event(release(SUPER));
        assert_eq!(dispatcher.sessions_started(), 501);

        // The last session joins every earlier one before it exits
        time::timeout(Duration::from_secs(10), async {
            while !dispatcher.retiring.as_ref().is_some_and(SessionHandle::is_finished) {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let grabs: Vec<Call> = display
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::GrabKeyboard | Call::UngrabKeyboard))
            .collect();
        assert!(!grabs.is_empty());
        for pair in grabs.chunks(2) {
            assert_eq!(pair, &[Call::GrabKeyboard, Call::UngrabKeyboard][..]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_keys_and_events_ignored() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(99));
        dispatcher.handle_event(InputEvent::Other("MapNotify".to_string()));
        assert!(dispatcher.session().is_none());
        assert_eq!(dispatcher.registry.snapshot(), KeySnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_alt_button_sets_canonical_button() {
        let display = Arc::new(MockDisplay::default());
        let mut dispatcher = dispatcher(&display);

        dispatcher.handle_event(press(BUTTON1_ALT));
        let snapshot = dispatcher.registry.snapshot();
        assert!(snapshot.is_down(LogicalAction::Button1));
        assert!(!snapshot.is_down(LogicalAction::Button1Alt));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_stream_loss() {
        let display = Arc::new(MockDisplay::with_events([press(UP), release(SUPER)]));
        let dispatcher = dispatcher(&display);

        let result = dispatcher.run();
        assert!(matches!(result, Err(DisplayError::EventStreamClosed)));
        settle().await;
        assert_eq!(display.count(|c| *c == Call::GrabKeyboard), 1);
        assert_eq!(display.count(|c| *c == Call::UngrabKeyboard), 1);
    }

    #[test]
    fn test_passive_grabs_skip_unbound_and_no_grab() {
        let display = MockDisplay::default();
        display.reject_key(MLOCK);

        let failed = install_passive_grabs(&display, &registry());

        assert_eq!(failed, 2);
        assert_eq!(
            display.calls(),
            vec![
                Call::GrabKey(UP, GrabModifiers::Super),
                Call::GrabKey(UP, GrabModifiers::SuperNumLock),
                Call::GrabKey(MLOCK, GrabModifiers::Super),
                Call::GrabKey(MLOCK, GrabModifiers::SuperNumLock),
            ]
        );
    }
}
