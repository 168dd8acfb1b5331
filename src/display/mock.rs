//! Recording display client for tests

use crate::display::client::{
    DisplayClient, DisplayError, DisplayResult, GrabModifiers, InputEvent, Keycode,
    ModifierMapping,
};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GrabKey(Keycode, GrabModifiers),
    GrabKeyboard,
    UngrabKeyboard,
    Motion(i16, i16),
    Button(u8, bool),
}

#[derive(Default)]
pub struct MockDisplay {
    calls: Mutex<Vec<Call>>,
    events: Mutex<VecDeque<InputEvent>>,
    rejected_keys: Mutex<HashSet<Keycode>>,
    refuse_keyboard: AtomicBool,
}

impl MockDisplay {
    pub fn with_events(events: impl IntoIterator<Item = InputEvent>) -> Self {
        let display = Self::default();
        display.events.lock().extend(events);
        display
    }

    pub fn reject_key(&self, keycode: Keycode) {
        self.rejected_keys.lock().insert(keycode);
    }

    pub fn refuse_keyboard_grab(&self) {
        self.refuse_keyboard.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl DisplayClient for MockDisplay {
    fn next_event(&self) -> DisplayResult<InputEvent> {
        self.events
            .lock()
            .pop_front()
            .ok_or(DisplayError::EventStreamClosed)
    }

    fn grab_key(&self, keycode: Keycode, modifiers: GrabModifiers) -> DisplayResult<()> {
        self.record(Call::GrabKey(keycode, modifiers));
        if self.rejected_keys.lock().contains(&keycode) {
            return Err(DisplayError::GrabRefused(format!("key {}", keycode)));
        }
        Ok(())
    }

    fn grab_keyboard(&self) -> DisplayResult<()> {
        if self.refuse_keyboard.load(Ordering::SeqCst) {
            return Err(DisplayError::GrabRefused("already grabbed".to_string()));
        }
        self.record(Call::GrabKeyboard);
        Ok(())
    }

    fn ungrab_keyboard(&self) -> DisplayResult<()> {
        self.record(Call::UngrabKeyboard);
        Ok(())
    }

    fn modifier_mapping(&self) -> DisplayResult<ModifierMapping> {
        // Super_L on Mod4, two keycodes per modifier
        let mut keycodes = vec![0; 16];
        keycodes[12] = 133;
        Ok(ModifierMapping::new(keycodes))
    }

    fn screen_size(&self) -> (u16, u16) {
        (1920, 1080)
    }

    fn inject_motion(&self, x: i16, y: i16) {
        self.record(Call::Motion(x, y));
    }

    fn inject_button(&self, button: u8, down: bool) {
        self.record(Call::Button(button, down));
    }
}
