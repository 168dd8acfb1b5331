use crate::display::{DisplayClient, DisplayResult};
use std::sync::Arc;

/// Exclusive keyboard grab, released on drop
pub struct KeyboardGrab<D: DisplayClient> {
    display: Arc<D>,
}

impl<D: DisplayClient> KeyboardGrab<D> {
    pub fn acquire(display: Arc<D>) -> DisplayResult<Self> {
        display.grab_keyboard()?;
        tracing::debug!("Keyboard grabbed");
        Ok(Self { display })
    }
}

impl<D: DisplayClient> Drop for KeyboardGrab<D> {
    fn drop(&mut self) {
        match self.display.ungrab_keyboard() {
            Ok(()) => tracing::debug!("Keyboard released"),
            Err(e) => tracing::warn!("Failed to release keyboard grab: {}", e),
        }
    }
}
