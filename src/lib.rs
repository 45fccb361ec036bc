//! `termline` - interactive line editing for text-based remote clients
//!
//! Two coupled pieces: a terminal line editor that keeps the input line
//! correct under wrapping and embedded escape sequences while redrawing
//! only what changed, and a wildcard pattern engine that marks or
//! substitutes text arriving from the remote side.
//!
//! ```
//! use termline::ansi::AnsiWriter;
//! use termline::edit::EditorConfig;
//! use termline::pattern::PatternEntry;
//! use termline::style::MarkStyle;
//! use termline::{Session, SessionEvent};
//!
//! let out = AnsiWriter::new(Vec::new(), 80, 24);
//! let mut session = Session::new(out, EditorConfig::default());
//! let bold: MarkStyle = "bold".parse().unwrap();
//! session
//!     .patterns_mut()
//!     .add(PatternEntry::mark(b"$ tells you", false, bold).unwrap());
//! session.handle_remote_line(b"Bob tells you hello").unwrap();
//! assert_eq!(
//!     session.handle_input(b"reply hi\r").unwrap(),
//!     vec![SessionEvent::Submitted(b"reply hi".to_vec())]
//! );
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow KeyMap::KeyBinding etc
#![allow(clippy::struct_excessive_bools)] // Terminal state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::format_push_string)] // format! with push_str is fine
#![allow(clippy::branches_sharing_code)] // Code clarity over DRY in branching
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod ansi;
pub mod edit;
pub mod error;
pub mod event;
pub mod input;
pub mod pattern;
pub mod persist;
pub mod session;
pub mod style;
pub mod terminal;
pub mod text;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use style::{Color, MarkStyle, TextAttributes};

// Re-export editor types
pub use edit::{Command, Editor, EditorConfig, Outcome};

// Re-export input and pattern types
pub use input::{KeyAction, KeyMap};
pub use pattern::{PatternAction, PatternEntry, PatternSet};

// Re-export commonly used types
pub use ansi::AnsiWriter;
pub use session::{Session, SessionEvent};
pub use terminal::{RawModeGuard, TerminalOutput, enable_raw_mode, is_tty, terminal_size};
pub use text::{DelimMode, Delimiters};
