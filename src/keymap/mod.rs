//! Logical actions, their key bindings and live key state

pub mod action;
pub mod lookup;
pub mod registry;

pub use action::{KeyBinding, LogicalAction};
pub use lookup::{KeyLookup, KeyRole};
pub use registry::{KeyRegistry, KeySnapshot};
