//! Display server access
//!
//! The dispatcher and motion sessions only see the `DisplayClient` trait;
//! `X11Display` is the production implementation.

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod x11;

pub use client::{
    DisplayClient, DisplayError, DisplayResult, GrabModifiers, InputEvent, Keycode,
    ModifierMapping,
};
pub use x11::X11Display;
