//! In-memory VT100/VT102 screen-state engine
//!
//! Feed a [`Terminal`] the byte stream a program writes to its tty and it
//! maintains the grid of cells a real terminal would display: runes,
//! per-cell formats, the cursor, the main/alternate screen pair, scroll
//! regions, and the editing primitives VT escape sequences invoke. There
//! is no PTY, no rendering, and no I/O of its own; this is the state
//! machine in the middle.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  bytes → vte decoder → typed commands       │
//! │                  ↓                          │
//! │   Screen grid + format runs + change ledger │
//! │                  ↓                          │
//! │   snapshots / resize + scrollback hooks     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use vtscreen::Terminal;
//!
//! let term = Terminal::new(24, 80);
//! term.process(b"\x1b[1;31mhello\x1b[0m world");
//! let screen = term.snapshot();
//! assert_eq!(&screen.row_text(0)[..11], "hello world");
//! ```
//!
//! # Concurrency
//!
//! Every public operation acquires the terminal-wide mutex for its
//! duration. Registered hooks (`on_resize`, `on_scrollback`) run after
//! the lock is released; they may touch the terminal from another thread,
//! but re-entering it from the callback on the calling thread deadlocks.

mod format;
mod parser;
mod screen;
mod terminal;

pub use format::{CellAttrs, Color, CursorStyle, Format, FormatRow, Region};
pub use screen::{Cursor, Line, Screen};
pub use terminal::{EraseDirection, Terminal};
