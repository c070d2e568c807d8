//! Terminal engine
//!
//! [`Terminal`] owns the main and alternate [`Screen`]s, the deferred-wrap
//! flag, the auto-resize policy, and the `vte` parser that decodes incoming
//! bytes. Every public operation takes the terminal-wide mutex for its
//! duration; resize and scrollback notifications are queued while the lock
//! is held and delivered to the registered hooks after it is released, so
//! observer callbacks never run under the engine lock.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{trace, warn};

use crate::format::{CellAttrs, Color, CursorStyle, Format};
use crate::parser::Performer;
use crate::screen::{Cursor, Line, Screen};

/// Direction of an erase command, relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseDirection {
    /// From the cursor to the end, inclusive.
    Forward,
    /// From the beginning to the cursor, inclusive.
    Back,
    /// Everything.
    All,
}

/// Sentinel column meaning "to the end of the row" in erase ranges.
const TO_END: usize = usize::MAX;

/// Notification captured under the lock, delivered after it is released.
pub(crate) enum Event {
    Resize(usize, usize),
    Scrollback(Line),
}

type ResizeHook = Box<dyn FnMut(usize, usize) + Send>;
type ScrollbackHook = Box<dyn FnMut(Line) + Send>;

#[derive(Default)]
struct Hooks {
    on_resize: Option<ResizeHook>,
    on_scrollback: Option<ScrollbackHook>,
}

/// The lock-protected engine state. All semantics live here; [`Terminal`]
/// is the locking shell around it.
pub(crate) struct Term {
    screen: Screen,
    /// The inactive screen of the main/alternate pair, once one exists.
    alt: Option<Screen>,
    is_alt: bool,
    title: String,
    auto_resize_y: bool,
    auto_resize_x: bool,
    /// Line endings do not imply a carriage return.
    raw: bool,
    /// Ignore sequences that could lose output, e.g. scroll regions.
    append_only: bool,
    /// Deferred wrap: the last column was printed, the next rune wraps.
    wrap: bool,
    /// A scrollback hook is installed; capture evicted lines.
    record_scrollback: bool,
    replies: Vec<u8>,
    forward_requests: Option<Box<dyn io::Write + Send>>,
    forward_responses: Option<Box<dyn io::Write + Send>>,
    events: Vec<Event>,
}

impl Term {
    fn new(height: usize, width: usize) -> Self {
        Self {
            screen: Screen::new(height, width),
            alt: None,
            is_alt: false,
            title: String::new(),
            auto_resize_y: false,
            auto_resize_x: false,
            raw: false,
            append_only: false,
            wrap: false,
            record_scrollback: false,
            replies: Vec::new(),
            forward_requests: None,
            forward_responses: None,
            events: Vec::new(),
        }
    }

    pub(crate) fn height(&self) -> usize {
        self.screen.height()
    }

    pub(crate) fn width(&self) -> usize {
        self.screen.width()
    }

    pub(crate) fn cursor(&self) -> Cursor {
        self.screen.cursor
    }

    /// The scroll region, if one is set, valid, and honoured.
    fn active_region(&self) -> Option<(usize, usize)> {
        if self.append_only {
            return None;
        }
        let (start, end) = self.screen.scroll_region?;
        (end < self.screen.height()).then_some((start, end))
    }

    /// The row range scroll and line operations act on.
    fn region_bounds(&self) -> (usize, usize) {
        self.active_region()
            .unwrap_or((0, self.screen.height().saturating_sub(1)))
    }

    // ========== Putting runes ==========

    /// Put `r` at the cursor with the cursor's format, then advance,
    /// honouring deferred wrap and the auto-resize policy.
    pub(crate) fn put(&mut self, r: char) {
        if self.wrap {
            self.screen.cursor.x = 0;
            self.move_down();
            self.wrap = false;
        }
        if self.auto_resize_y {
            self.ensure_height(self.screen.cursor.y + 1);
        }
        let Cursor { y, x, format, .. } = self.screen.cursor;
        if y >= self.screen.height() {
            return;
        }
        if self.auto_resize_x {
            self.screen.extend_row(y, x + 1);
        } else if x >= self.screen.width() {
            return;
        }
        self.screen.paint(y, x, r, format);
        self.screen.note_extent(y, x);
        self.advance();
    }

    /// Move the cursor right, deferring the wrap at the last column. In
    /// auto-X mode the row grows instead of wrapping.
    fn advance(&mut self) {
        let w = self.screen.width();
        let Cursor { y, x, .. } = self.screen.cursor;
        if !self.auto_resize_x && w > 0 && x == w - 1 {
            self.wrap = true;
        } else {
            self.screen.cursor.x = x + 1;
            if self.auto_resize_x && x + 1 >= self.screen.row_width(y) {
                self.screen.extend_row(y, x + 2);
            }
        }
    }

    // ========== Cursor motion ==========

    /// Move down one row: scroll when pinned to the bottom of the scroll
    /// region or screen, grow when auto-Y allows it.
    pub(crate) fn move_down(&mut self) {
        let h = self.screen.height();
        let cy = self.screen.cursor.y;
        if let Some((_, end)) = self.active_region() {
            if cy == end {
                self.scroll_up_n(1);
                return;
            }
        }
        if cy + 1 < h {
            self.screen.cursor.y = cy + 1;
        } else if self.auto_resize_y {
            self.grow_height(cy + 2);
            self.screen.cursor.y = cy + 1;
            self.screen.note_extent(cy + 1, 0);
        } else if h > 0 {
            self.scroll_up_n(1);
        }
    }

    /// Move up one row, scrolling down when pinned to the top.
    pub(crate) fn move_up(&mut self) {
        let cy = self.screen.cursor.y;
        let at_top = self
            .active_region()
            .is_some_and(|(start, _)| cy == start);
        if cy == 0 || at_top {
            self.scroll_down_n(1);
        } else {
            self.screen.cursor.y = cy - 1;
        }
    }

    pub(crate) fn move_abs(&mut self, y: usize, x: usize) {
        self.wrap = false;
        self.screen.cursor.y = y.min(self.screen.height().saturating_sub(1));
        self.screen.cursor.x = x.min(self.screen.width().saturating_sub(1));
    }

    pub(crate) fn move_rel(&mut self, dy: isize, dx: isize) {
        self.wrap = false;
        let max_y = self.screen.height().saturating_sub(1) as isize;
        let max_x = self.screen.width().saturating_sub(1) as isize;
        let c = &mut self.screen.cursor;
        c.y = (c.y as isize + dy).clamp(0, max_y.max(0)) as usize;
        c.x = (c.x as isize + dx).clamp(0, max_x.max(0)) as usize;
    }

    pub(crate) fn home(&mut self, y: usize, x: usize) {
        self.move_abs(y, x);
    }

    /// IND: move down, scrolling at the bottom.
    pub(crate) fn index(&mut self) {
        self.wrap = false;
        self.move_down();
    }

    /// RI: move up, scrolling at the top.
    pub(crate) fn reverse_index(&mut self) {
        self.wrap = false;
        self.move_up();
    }

    /// NEL: carriage return plus index.
    pub(crate) fn next_line(&mut self) {
        self.wrap = false;
        self.screen.cursor.x = 0;
        self.move_down();
    }

    /// LF/VT/FF. Unless in raw mode, a line ending implies a carriage
    /// return.
    pub(crate) fn linefeed(&mut self) {
        self.wrap = false;
        if !self.raw {
            self.screen.cursor.x = 0;
        }
        self.move_down();
    }

    pub(crate) fn carriage_return(&mut self) {
        self.wrap = false;
        self.screen.cursor.x = 0;
    }

    pub(crate) fn backspace(&mut self) {
        self.move_rel(0, -1);
    }

    /// Advance to the next multiple-of-8 tab stop, clamped to the last
    /// column.
    pub(crate) fn tab(&mut self) {
        self.wrap = false;
        let w = self.screen.width();
        if w == 0 {
            return;
        }
        let c = &mut self.screen.cursor;
        c.x = ((c.x / 8 + 1) * 8).min(w - 1);
    }

    // ========== Scrolling and line edits ==========

    /// Scroll the active region up `n` lines. When the region is the whole
    /// screen and a scrollback hook is armed, the evicted lines are
    /// captured top-down before being overwritten.
    pub(crate) fn scroll_up_n(&mut self, n: usize) {
        let h = self.screen.height();
        if n == 0 || h == 0 {
            return;
        }
        let (start, end) = self.region_bounds();
        if self.record_scrollback && start == 0 && end == h - 1 {
            for y in 0..n.min(end - start + 1) {
                if let Some(line) = self.screen.line(start + y) {
                    self.events.push(Event::Scrollback(line));
                }
            }
        }
        let fill = self.screen.cursor.format;
        self.screen.scroll_up(n, start, end, fill);
    }

    /// Scroll the active region down `n` lines; nothing is evicted into
    /// scrollback.
    pub(crate) fn scroll_down_n(&mut self, n: usize) {
        if n == 0 || self.screen.height() == 0 {
            return;
        }
        self.wrap = false;
        let (start, end) = self.region_bounds();
        let fill = self.screen.cursor.format;
        self.screen.scroll_down(n, start, end, fill);
    }

    pub(crate) fn insert_lines(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if self.auto_resize_y {
            self.ensure_height(self.screen.cursor.y + n);
        }
        let (start, end) = self.region_bounds();
        let cy = self.screen.cursor.y;
        if cy < start || cy > end {
            return;
        }
        self.wrap = false;
        let fill = self.screen.cursor.format;
        self.screen.insert_lines(cy, n, end, fill);
    }

    pub(crate) fn delete_lines(&mut self, n: usize) {
        let (start, end) = self.region_bounds();
        let cy = self.screen.cursor.y;
        if n == 0 || cy < start || cy > end {
            return;
        }
        self.wrap = false;
        let fill = self.screen.cursor.format;
        self.screen.delete_lines(cy, n, end, fill);
    }

    // ========== Character edits ==========

    pub(crate) fn insert_chars(&mut self, n: usize) {
        let Cursor { y, x, format, .. } = self.screen.cursor;
        self.screen.insert_chars(y, x, n, format);
    }

    pub(crate) fn delete_chars(&mut self, n: usize) {
        self.wrap = false;
        let Cursor { y, x, .. } = self.screen.cursor;
        self.screen.delete_chars(y, x, n);
    }

    pub(crate) fn erase_chars(&mut self, n: usize) {
        self.wrap = false;
        let Cursor { y, x, format, .. } = self.screen.cursor;
        self.screen.erase_chars(y, x, n, format);
    }

    // ========== Erase ==========

    fn erase_region(&mut self, y1: usize, x1: usize, y2: usize, x2: usize) {
        self.wrap = false;
        let format = self.screen.cursor.format;
        self.screen.erase_region(y1, x1, y2, x2, format);
    }

    pub(crate) fn erase_line(&mut self, dir: EraseDirection) {
        let Cursor { y, x, .. } = self.screen.cursor;
        match dir {
            EraseDirection::Forward => self.erase_region(y, x, y, TO_END),
            EraseDirection::Back => self.erase_region(y, 0, y, x),
            EraseDirection::All => self.erase_region(y, 0, y, TO_END),
        }
    }

    pub(crate) fn erase_display(&mut self, dir: EraseDirection) {
        let h = self.screen.height();
        let Cursor { y, x, .. } = self.screen.cursor;
        match dir {
            EraseDirection::Forward => {
                self.erase_region(y, x, y, TO_END);
                if y + 1 < h {
                    self.erase_region(y + 1, 0, h - 1, TO_END);
                }
            }
            EraseDirection::Back => {
                if y > 0 {
                    self.erase_region(0, 0, y - 1, TO_END);
                }
                self.erase_region(y, 0, y, x);
            }
            EraseDirection::All => {
                self.erase_region(0, 0, h.saturating_sub(1), TO_END);
            }
        }
    }

    // ========== Save/restore and alt screen ==========

    pub(crate) fn save(&mut self) {
        self.screen.saved_cursor = Some(self.screen.cursor);
    }

    /// Restore the saved cursor, clamped into the current bounds.
    pub(crate) fn unsave(&mut self) {
        self.wrap = false;
        if let Some(saved) = self.screen.saved_cursor {
            let mut c = saved;
            c.y = c.y.min(self.screen.height().saturating_sub(1));
            c.x = c.x.min(self.screen.width().saturating_sub(1));
            self.screen.cursor = c;
        }
    }

    /// Exchange the active screen with the main/alternate partner. The
    /// alternate comes up cleared on every enter.
    pub(crate) fn swap_alt(&mut self) {
        self.wrap = false;
        if self.is_alt {
            if let Some(main) = self.alt.take() {
                let alt = std::mem::replace(&mut self.screen, main);
                self.alt = Some(alt);
            }
            self.is_alt = false;
        } else {
            let fresh = Screen::new(self.screen.height(), self.screen.width());
            let main = std::mem::replace(&mut self.screen, fresh);
            self.alt = Some(main);
            self.is_alt = true;
        }
        trace!("alt screen {}", if self.is_alt { "on" } else { "off" });
    }

    pub(crate) fn set_alt(&mut self, on: bool) {
        if on != self.is_alt {
            self.swap_alt();
        }
    }

    pub(crate) fn is_alt(&self) -> bool {
        self.is_alt
    }

    // ========== Modes ==========

    /// Store the scroll region (0-based, inclusive, clamped). Covering the
    /// whole screen clears it. Ignored entirely under append-only.
    pub(crate) fn set_scroll_region(&mut self, start: usize, end: usize) {
        if self.append_only {
            trace!("append-only: ignoring scroll region {}..={}", start, end);
            return;
        }
        let h = self.screen.height();
        if h == 0 {
            return;
        }
        let start = start.min(h - 1);
        let end = end.min(h - 1);
        if start >= end {
            return;
        }
        self.screen.scroll_region = if start == 0 && end == h - 1 {
            None
        } else {
            Some((start, end))
        };
        self.home(0, 0);
    }

    pub(crate) fn clear_scroll_region(&mut self) {
        self.screen.scroll_region = None;
    }

    pub(crate) fn set_cursor_style(&mut self, style: CursorStyle, blink: bool) {
        self.screen.cursor.style = style;
        self.screen.cursor.blink = blink;
    }

    pub(crate) fn set_format(&mut self, f: Format) {
        self.screen.cursor.format = f;
    }

    pub(crate) fn reset_attrs(&mut self) {
        self.screen.cursor.format = Format::default();
    }

    pub(crate) fn set_attr(&mut self, attr: CellAttrs) {
        self.screen.cursor.format.attrs.insert(attr);
    }

    pub(crate) fn clear_attr(&mut self, attr: CellAttrs) {
        self.screen.cursor.format.attrs.remove(attr);
    }

    pub(crate) fn set_fg(&mut self, color: Color) {
        self.screen.cursor.format.fg = color;
    }

    pub(crate) fn set_bg(&mut self, color: Color) {
        self.screen.cursor.format.bg = color;
    }

    // ========== Resize ==========

    /// Resize both screens. `width: None` keeps each screen's own width
    /// (they differ under auto-X).
    fn resize_screens(&mut self, height: usize, width: Option<usize>) {
        let w = width.unwrap_or_else(|| self.screen.width());
        self.screen.resize(height, w);
        if let Some(alt) = self.alt.as_mut() {
            let aw = width.unwrap_or_else(|| alt.width());
            alt.resize(height, aw);
        }
    }

    /// Grow to at least `height` rows (auto-Y growth path). Under auto-X
    /// the new rows start empty and grow on write; otherwise they come up
    /// at the screen width.
    fn grow_height(&mut self, height: usize) {
        if self.auto_resize_x {
            self.screen.grow_ragged(height);
            if let Some(alt) = self.alt.as_mut() {
                alt.grow_ragged(height);
            }
        } else {
            self.resize_screens(height, None);
        }
    }

    fn ensure_height(&mut self, height: usize) {
        if height > self.screen.height() {
            self.grow_height(height);
        }
    }

    pub(crate) fn resize(&mut self, height: usize, width: usize) {
        self.resize_screens(height, Some(width));
        self.auto_resize_y = false;
        self.auto_resize_x = false;
        self.events.push(Event::Resize(height, width));
    }

    pub(crate) fn resize_y(&mut self, height: usize) {
        let w = self.screen.width();
        self.resize_screens(height, None);
        self.auto_resize_y = false;
        self.events.push(Event::Resize(height, w));
    }

    pub(crate) fn resize_x(&mut self, width: usize) {
        let h = self.screen.height();
        self.resize_screens(h, Some(width));
        self.auto_resize_x = false;
        self.events.push(Event::Resize(h, width));
    }

    /// Full reset: back to the main screen, alternate discarded, blank
    /// grid, cursor at the origin. Title and auto-resize flags survive.
    pub(crate) fn reset(&mut self) {
        if self.is_alt {
            self.swap_alt();
        }
        self.alt = None;
        self.screen.reset();
        self.wrap = false;
    }

    // ========== Queries and OSC ==========

    /// DA1 reply: VT102.
    pub(crate) fn device_attributes(&mut self) {
        self.replies.extend_from_slice(b"\x1b[?6c");
    }

    /// DSR 5 reply: ready, no malfunction.
    pub(crate) fn status_report(&mut self) {
        self.replies.extend_from_slice(b"\x1b[0n");
    }

    /// DSR 6 reply: 1-based cursor position.
    pub(crate) fn cursor_position_report(&mut self) {
        let Cursor { y, x, .. } = self.screen.cursor;
        let seq = format!("\x1b[{};{}R", y + 1, x + 1);
        self.replies.extend_from_slice(seq.as_bytes());
    }

    /// OSC title: forwarded verbatim when a request forwarder is
    /// configured, stored otherwise.
    pub(crate) fn osc_title(&mut self, cmd: &str, payload: &str) {
        if self.forward_requests.is_some() {
            let seq = format!("\x1b]{};{}\x07", cmd, payload);
            self.forward_request(seq.into_bytes());
        } else {
            self.title = payload.to_string();
        }
    }

    /// OSC 52 clipboard payload: forwarded verbatim when configured,
    /// dropped otherwise.
    pub(crate) fn osc_clipboard(&mut self, payload: &[u8]) {
        if self.forward_requests.is_some() {
            let mut seq = Vec::with_capacity(payload.len() + 6);
            seq.extend_from_slice(b"\x1b]52;");
            seq.extend_from_slice(payload);
            seq.push(0x07);
            self.forward_request(seq);
        } else {
            trace!("no request forwarder; dropping clipboard payload");
        }
    }

    fn forward_request(&mut self, bytes: Vec<u8>) {
        if let Some(w) = self.forward_requests.as_mut() {
            if let Err(err) = w.write_all(&bytes).and_then(|()| w.flush()) {
                warn!("dropping forwarded request: {}", err);
            }
        }
    }

    fn flush_replies(&mut self) {
        if self.replies.is_empty() {
            return;
        }
        if let Some(w) = self.forward_responses.as_mut() {
            if let Err(err) = w.write_all(&self.replies).and_then(|()| w.flush()) {
                warn!("dropping query replies: {}", err);
            }
        }
        self.replies.clear();
    }
}

struct TermState {
    term: Term,
    parser: vte::Parser,
}

/// An in-memory terminal: feed it output bytes, read back the grid.
///
/// All methods take `&self`; a terminal-wide mutex serialises them. See
/// the crate docs for the locking/callback contract.
pub struct Terminal {
    state: Mutex<TermState>,
    hooks: Mutex<Hooks>,
}

impl Terminal {
    /// A terminal with fixed dimensions, fully blank, cursor at the
    /// origin.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            state: Mutex::new(TermState {
                term: Term::new(height, width),
                parser: vte::Parser::new(),
            }),
            hooks: Mutex::new(Hooks::default()),
        }
    }

    /// A terminal with no fixed dimensions: the grid grows to fit
    /// whatever is written.
    pub fn auto_resizing() -> Self {
        let term = Self::new(0, 0);
        {
            let mut st = term.lock_state();
            st.term.auto_resize_y = true;
            st.term.auto_resize_x = true;
        }
        term
    }

    fn lock_state(&self) -> MutexGuard<'_, TermState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_hooks(&self) -> MutexGuard<'_, Hooks> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the state lock, then deliver any queued
    /// notifications with the lock released.
    fn with<R>(&self, f: impl FnOnce(&mut Term) -> R) -> R {
        let (r, events) = {
            let mut st = self.lock_state();
            let r = f(&mut st.term);
            st.term.flush_replies();
            (r, std::mem::take(&mut st.term.events))
        };
        self.dispatch(events);
        r
    }

    fn dispatch(&self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        let mut hooks = self.lock_hooks();
        for event in events {
            match event {
                Event::Resize(h, w) => {
                    if let Some(f) = hooks.on_resize.as_mut() {
                        f(h, w);
                    }
                }
                Event::Scrollback(line) => {
                    if let Some(f) = hooks.on_scrollback.as_mut() {
                        f(line);
                    }
                }
            }
        }
    }

    // ========== Byte input ==========

    /// Decode `bytes` and apply them to the grid. Partial UTF-8 and
    /// partial escape sequences are buffered by the decoder across calls;
    /// malformed sequences are dropped.
    pub fn process(&self, bytes: &[u8]) {
        let events = {
            let mut st = self.lock_state();
            let st = &mut *st;
            let mut performer = Performer::new(&mut st.term);
            for &byte in bytes {
                st.parser.advance(&mut performer, byte);
            }
            st.term.flush_replies();
            std::mem::take(&mut st.term.events)
        };
        self.dispatch(events);
    }

    // ========== Construction-time configuration ==========

    /// Raw mode: line endings do not imply a carriage return.
    pub fn set_raw(&self, on: bool) {
        self.lock_state().term.raw = on;
    }

    /// Append-only mode: ignore sequences that could lose output, such as
    /// scroll regions.
    pub fn set_append_only(&self, on: bool) {
        self.lock_state().term.append_only = on;
    }

    pub fn set_auto_resize_y(&self, on: bool) {
        self.lock_state().term.auto_resize_y = on;
    }

    pub fn set_auto_resize_x(&self, on: bool) {
        self.lock_state().term.auto_resize_x = on;
    }

    /// Forward OSC requests (title, clipboard) verbatim to `w` instead of
    /// handling them locally.
    pub fn set_forward_requests(&self, w: impl io::Write + Send + 'static) {
        self.lock_state().term.forward_requests = Some(Box::new(w));
    }

    /// Write replies to CSI queries (DA, DSR) to `w`.
    pub fn set_forward_responses(&self, w: impl io::Write + Send + 'static) {
        self.lock_state().term.forward_responses = Some(Box::new(w));
    }

    // ========== Command interface ==========

    pub fn put(&self, r: char) {
        self.with(|t| t.put(r));
    }

    pub fn move_abs(&self, y: usize, x: usize) {
        self.with(|t| t.move_abs(y, x));
    }

    pub fn move_rel(&self, dy: isize, dx: isize) {
        self.with(|t| t.move_rel(dy, dx));
    }

    pub fn home(&self, y: usize, x: usize) {
        self.with(|t| t.home(y, x));
    }

    pub fn save(&self) {
        self.with(Term::save);
    }

    pub fn restore(&self) {
        self.with(Term::unsave);
    }

    pub fn next_line(&self) {
        self.with(Term::next_line);
    }

    pub fn index(&self) {
        self.with(Term::index);
    }

    pub fn reverse_index(&self) {
        self.with(Term::reverse_index);
    }

    pub fn insert_characters(&self, n: usize) {
        self.with(|t| t.insert_chars(n));
    }

    pub fn delete_characters(&self, n: usize) {
        self.with(|t| t.delete_chars(n));
    }

    pub fn erase_characters(&self, n: usize) {
        self.with(|t| t.erase_chars(n));
    }

    pub fn insert_lines(&self, n: usize) {
        self.with(|t| t.insert_lines(n));
    }

    pub fn delete_lines(&self, n: usize) {
        self.with(|t| t.delete_lines(n));
    }

    pub fn scroll_up(&self, n: usize) {
        self.with(|t| t.scroll_up_n(n));
    }

    pub fn scroll_down(&self, n: usize) {
        self.with(|t| t.scroll_down_n(n));
    }

    pub fn erase_line(&self, dir: EraseDirection) {
        self.with(|t| t.erase_line(dir));
    }

    pub fn erase_display(&self, dir: EraseDirection) {
        self.with(|t| t.erase_display(dir));
    }

    pub fn set_scroll_region(&self, start: usize, end: usize) {
        self.with(|t| t.set_scroll_region(start, end));
    }

    pub fn clear_scroll_region(&self) {
        self.with(Term::clear_scroll_region);
    }

    pub fn swap_alt(&self, on: bool) {
        self.with(|t| t.set_alt(on));
    }

    pub fn set_cursor_style(&self, style: CursorStyle, blink: bool) {
        self.with(|t| t.set_cursor_style(style, blink));
    }

    pub fn set_format(&self, f: Format) {
        self.with(|t| t.set_format(f));
    }

    pub fn send_device_attributes(&self) {
        self.with(Term::device_attributes);
    }

    pub fn send_cursor_position(&self) {
        self.with(Term::cursor_position_report);
    }

    pub fn set_title(&self, title: &str) {
        self.with(|t| t.osc_title("2", title));
    }

    pub fn clipboard_set(&self, payload: &[u8]) {
        self.with(|t| t.osc_clipboard(payload));
    }

    pub fn reset(&self) {
        self.with(Term::reset);
    }

    // ========== Resize ==========

    /// Resize to `height` x `width` and disable auto-resizing on both
    /// axes. The resize hook fires after the lock is released.
    pub fn resize(&self, height: usize, width: usize) {
        self.with(|t| t.resize(height, width));
    }

    /// Resize the height only; disables auto-Y.
    pub fn resize_y(&self, height: usize) {
        self.with(|t| t.resize_y(height));
    }

    /// Resize the width only; disables auto-X.
    pub fn resize_x(&self, width: usize) {
        self.with(|t| t.resize_x(width));
    }

    // ========== Readers ==========

    /// An immutable copy of the active screen.
    pub fn snapshot(&self) -> Screen {
        self.lock_state().term.screen.clone()
    }

    pub fn height(&self) -> usize {
        self.lock_state().term.height()
    }

    pub fn width(&self) -> usize {
        self.lock_state().term.width()
    }

    /// `max_y + 1`: rows actually reached since the last reset.
    pub fn used_height(&self) -> usize {
        self.lock_state().term.screen.max_y() + 1
    }

    /// `max_x + 1`: columns actually painted since the last reset.
    pub fn used_width(&self) -> usize {
        self.lock_state().term.screen.max_x() + 1
    }

    pub fn cursor(&self) -> Cursor {
        self.lock_state().term.cursor()
    }

    pub fn title(&self) -> String {
        self.lock_state().term.title.clone()
    }

    pub fn is_alt(&self) -> bool {
        self.lock_state().term.is_alt()
    }

    // ========== Hooks ==========

    /// Install a resize hook. It is called once immediately with the
    /// current dimensions, outside the lock, then on every explicit
    /// resize.
    pub fn on_resize(&self, f: impl FnMut(usize, usize) + Send + 'static) {
        let (h, w) = {
            let st = self.lock_state();
            (st.term.height(), st.term.width())
        };
        let mut f: ResizeHook = Box::new(f);
        f(h, w);
        self.lock_hooks().on_resize = Some(f);
    }

    /// Install a scrollback hook, called for each line evicted by a
    /// full-screen scroll.
    pub fn on_scrollback(&self, f: impl FnMut(Line) + Send + 'static) {
        self.lock_state().term.record_scrollback = true;
        self.lock_hooks().on_scrollback = Some(Box::new(f));
    }
}

impl io::Write for Terminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.process(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &Terminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.process(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
