//! Keyboard input.
//!
//! Raw bytes from the terminal are resolved against a [`KeyMap`] into edit
//! commands, interpreter commands, or plain bytes to insert.

mod keymap;

pub use keymap::{KeyAction, KeyBinding, KeyMap, KeyResult, parse_sequence, sequence_name};
