#![forbid(unsafe_code)]

//! Headless, embeddable VT100/xterm terminal emulator core.
//!
//! Feed PTY output to [`Terminal::write`] and poll the result: a grid of
//! styled cells, scrollback history, cursor state, mode flags, and — for
//! the few request sequences — reply bytes headed back to the PTY. There
//! is no I/O and no rendering here; the embedder owns both ends of the
//! byte stream and draws the cells however it likes.
//!
//! ```
//! use drizzle::{Terminal, TermConfig};
//!
//! let mut term = Terminal::new(TermConfig::default()).unwrap();
//! term.write(b"\x1b[1;31mhello\x1b[0m");
//! assert_eq!(term.line_text(0).unwrap(), "hello");
//! ```
//!
//! The engine is single-threaded and synchronous: every byte is fully
//! processed before `write` returns, and chunk boundaries are invisible.
//! Malformed input never escapes the parser — arbitrary bytes leave the
//! terminal in a consistent state.

pub mod cell;
pub mod charset;
pub mod color;
pub mod cursor;
pub mod error;
pub mod event;
pub mod grid;
pub mod modes;
pub mod osc;
pub mod parser;
pub mod screen;
pub mod scrollback;
pub mod sgr;
pub mod term;

pub use cell::{AttrFlags, Attributes, Cell, CellFlags, Row, UnderlineStyle};
pub use charset::{Charset, CharsetState};
pub use color::Color;
pub use cursor::{CursorState, SavedCursor};
pub use error::TermError;
pub use event::TermEvent;
pub use grid::Grid;
pub use modes::{MouseTracking, TerminalModes};
pub use osc::OscCommand;
pub use parser::{Params, Parser, Perform, MAX_OSC_LEN};
pub use screen::{Screen, ScreenManager};
pub use scrollback::ScrollbackRing;
pub use term::{TermConfig, Terminal, TerminalState};
