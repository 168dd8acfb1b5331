//! X11 display client
//!
//! Backed by `x11rb`. Synthetic input goes through the XTEST extension.

use crate::display::client::{
    DisplayClient, DisplayError, DisplayResult, GrabModifiers, InputEvent, Keycode,
    ModifierMapping,
};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConnectionExt as _, GrabMode, GrabStatus, ModMask, Window};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

pub struct X11Display {
    conn: RustConnection,
    root: Window,
    width: u16,
    height: u16,
}

impl X11Display {
    /// Connect to `$DISPLAY` and initialize XTEST
    pub fn connect() -> DisplayResult<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let (width, height) = (screen.width_in_pixels, screen.height_in_pixels);

        let version = conn.xtest_get_version(2, 2)?.reply()?;
        tracing::info!(
            "Connected to X11 display (screen={}, {}x{}, xtest={}.{})",
            screen_num,
            width,
            height,
            version.major_version,
            version.minor_version
        );

        Ok(Self {
            conn,
            root,
            width,
            height,
        })
    }

    fn fake_input(&self, kind: u8, detail: u8, x: i16, y: i16) {
        let sent = self
            .conn
            .xtest_fake_input(kind, detail, x11rb::CURRENT_TIME, self.root, x, y, 0)
            .and_then(|_| self.conn.flush());
        if let Err(e) = sent {
            tracing::debug!("Dropped synthetic event (type={}): {}", kind, e);
        }
    }
}

impl DisplayClient for X11Display {
    fn next_event(&self) -> DisplayResult<InputEvent> {
        let event = self.conn.wait_for_event()?;
        Ok(match event {
            Event::KeyPress(ev) => InputEvent::KeyPress {
                keycode: ev.detail,
                x: ev.root_x,
                y: ev.root_y,
            },
            Event::KeyRelease(ev) => InputEvent::KeyRelease {
                keycode: ev.detail,
                x: ev.root_x,
                y: ev.root_y,
            },
            other => InputEvent::Other(format!("{:?}", other)),
        })
    }

    fn grab_key(&self, keycode: Keycode, modifiers: GrabModifiers) -> DisplayResult<()> {
        let mask = match modifiers {
            GrabModifiers::Super => ModMask::M4,
            GrabModifiers::SuperNumLock => ModMask::M4 | ModMask::M2,
        };
        self.conn
            .grab_key(true, self.root, mask, keycode, GrabMode::ASYNC, GrabMode::ASYNC)?
            .check()?;
        Ok(())
    }

    fn grab_keyboard(&self) -> DisplayResult<()> {
        let reply = self
            .conn
            .grab_keyboard(
                true,
                self.root,
                x11rb::CURRENT_TIME,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .reply()?;
        if reply.status != GrabStatus::SUCCESS {
            return Err(DisplayError::GrabRefused(format!(
                "keyboard grab status {:?}",
                reply.status
            )));
        }
        Ok(())
    }

    fn ungrab_keyboard(&self) -> DisplayResult<()> {
        self.conn.ungrab_keyboard(x11rb::CURRENT_TIME)?;
        self.conn.flush()?;
        Ok(())
    }

    fn modifier_mapping(&self) -> DisplayResult<ModifierMapping> {
        let reply = self.conn.get_modifier_mapping()?.reply()?;
        Ok(ModifierMapping::new(reply.keycodes))
    }

    fn screen_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn inject_motion(&self, x: i16, y: i16) {
        self.fake_input(xproto::MOTION_NOTIFY_EVENT, 0, x, y);
    }

    fn inject_button(&self, button: u8, down: bool) {
        let kind = if down {
            xproto::BUTTON_PRESS_EVENT
        } else {
            xproto::BUTTON_RELEASE_EVENT
        };
        self.fake_input(kind, button, 0, 0);
    }
}
