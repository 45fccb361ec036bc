//! Byte-string helpers shared by the editor and the pattern engine.
//!
//! - [`width`]: column width in the presence of escape sequences
//! - [`escape`]: the backslash/octal codec used for stored text
//! - [`delim`]: configurable word delimiter sets

pub mod delim;
pub mod escape;
pub mod width;

pub use delim::{DelimMode, Delimiters};
pub use escape::{escape, find_unescaped, split_unescaped, unescape, unescape_in_place};
pub use width::{find_partial_escape, visual_width};
