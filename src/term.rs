//! The terminal orchestrator: owns the screens, scrollback, tab stops,
//! modes, and viewport, and implements [`Perform`] to execute the decoded
//! byte stream.

use std::ops::{Deref, DerefMut};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellFlags};
use crate::charset::{Charset, CharsetState};
use crate::cursor::{CursorState, SavedCursor};
use crate::error::TermError;
use crate::event::TermEvent;
use crate::modes::{MouseTracking, TerminalModes};
use crate::osc::{self, OscCommand};
use crate::parser::{Params, Parser, Perform};
use crate::screen::ScreenManager;
use crate::scrollback::ScrollbackRing;
use crate::sgr;

/// Construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermConfig {
    pub cols: u16,
    pub rows: u16,
    /// Scrollback ring capacity in lines; zero disables history.
    pub scrollback: usize,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            scrollback: 1000,
        }
    }
}

const DIMENSION_LIMIT: u16 = 1000;

/// Cap on CSI REP expansion, so a hostile `CSI 65535 b` stays cheap.
const MAX_REPEAT: usize = 2048;

type ResponseSink = Box<dyn FnMut(&[u8])>;
type EventSink = Box<dyn FnMut(&TermEvent)>;

/// Full terminal state. Implements [`Perform`] to execute escape
/// sequences; wrap it in [`Terminal`] to feed raw bytes.
pub struct TerminalState {
    screens: ScreenManager,
    scrollback: ScrollbackRing,
    modes: TerminalModes,
    /// DECSTBM region, 0-based inclusive. `None` spans the whole screen.
    scroll_region: Option<(u16, u16)>,
    tab_stops: Vec<bool>,
    charsets: CharsetState,
    /// Lines of history shown above the live screen; 0 follows the output.
    viewport: usize,
    title: String,
    /// URI stamped onto printed cells while an OSC 8 link is open.
    active_hyperlink: Option<Arc<str>>,
    /// Last character through `print`, used by CSI REP.
    last_printed: char,
    pending_responses: Vec<Vec<u8>>,
    pending_events: Vec<TermEvent>,
    response_sink: Option<ResponseSink>,
    event_sink: Option<EventSink>,
    cols: u16,
    rows: u16,
}

impl TerminalState {
    fn new(config: TermConfig) -> Result<Self, TermError> {
        let TermConfig {
            cols,
            rows,
            scrollback,
        } = config;
        if !(1..=DIMENSION_LIMIT).contains(&cols) || !(1..=DIMENSION_LIMIT).contains(&rows) {
            return Err(TermError::InvalidDimensions { cols, rows });
        }
        Ok(Self {
            screens: ScreenManager::new(rows, cols),
            scrollback: ScrollbackRing::new(scrollback),
            modes: TerminalModes::default(),
            scroll_region: None,
            tab_stops: default_tab_stops(cols),
            charsets: CharsetState::default(),
            viewport: 0,
            title: String::new(),
            active_hyperlink: None,
            last_printed: ' ',
            pending_responses: Vec::new(),
            pending_events: Vec::new(),
            response_sink: None,
            event_sink: None,
            cols,
            rows,
        })
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cursor(&self) -> &CursorState {
        &self.screens.active().cursor
    }

    pub fn modes(&self) -> &TerminalModes {
        &self.modes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_alt_screen_active(&self) -> bool {
        self.screens.is_alt_active()
    }

    pub fn scrollback(&self) -> &ScrollbackRing {
        &self.scrollback
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Resize both screens. Rows and columns are added/removed at the
    /// bottom/right; the scrollback ring is untouched.
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), TermError> {
        if !(1..=DIMENSION_LIMIT).contains(&cols) || !(1..=DIMENSION_LIMIT).contains(&rows) {
            return Err(TermError::InvalidDimensions { cols, rows });
        }
        self.screens.resize(rows, cols);
        self.cols = cols;
        self.rows = rows;
        self.tab_stops = default_tab_stops(cols);
        if let Some((_, bottom)) = self.scroll_region {
            if bottom >= rows {
                self.scroll_region = None;
            }
        }
        self.viewport = self.viewport.min(self.scrollback.len());
        self.emit_event(TermEvent::Resized { cols, rows });
        Ok(())
    }

    /// Viewport-aware row read: with an offset of `n`, the top `n` rows
    /// come from scrollback and the rest from the live screen. Always
    /// yields exactly `cols` cells.
    pub fn get_line(&self, row: u16) -> Result<Vec<Cell>, TermError> {
        if row >= self.rows {
            return Err(TermError::OutOfRange {
                row,
                rows: self.rows,
            });
        }
        let offset = self.viewport;
        if offset > 0 && (row as usize) < offset {
            let index = self.scrollback.len() - offset + row as usize;
            let mut cells = self
                .scrollback
                .get(index)
                .map(|r| r.cells.clone())
                .unwrap_or_default();
            cells.resize(self.cols as usize, Cell::default());
            Ok(cells)
        } else {
            let screen_row = row - offset as u16;
            Ok(self.screens.active().grid.row(screen_row).cells.clone())
        }
    }

    /// Text content of a viewport row, spacers skipped and trailing blanks
    /// trimmed.
    pub fn line_text(&self, row: u16) -> Result<String, TermError> {
        let cells = self.get_line(row)?;
        let s: String = cells
            .iter()
            .filter(|c| !c.flags.contains(CellFlags::WIDE_SPACER))
            .map(|c| c.c)
            .collect();
        Ok(s.trim_end().to_string())
    }

    /// Rows of the active screen modified since the last
    /// [`clear_dirty`](Self::clear_dirty).
    pub fn dirty_rows(&self) -> Vec<u16> {
        self.screens.active().grid.dirty_rows()
    }

    pub fn clear_dirty(&mut self) {
        self.screens.active_mut().grid.clear_dirty();
    }

    pub fn viewport_offset(&self) -> usize {
        self.viewport
    }

    /// Scroll the viewport `offset` lines into history; clamped to the
    /// retained scrollback. Incoming output snaps it back to 0.
    pub fn set_viewport_offset(&mut self, offset: usize) {
        self.viewport = offset.min(self.scrollback.len());
    }

    /// Route bytes onto the PTY reply channel, exactly as DSR/DA answers
    /// travel. Lets an embedder answer a query it handled itself (say, an
    /// OSC 52 clipboard read) through the same transport.
    pub fn send_response(&mut self, bytes: Vec<u8>) {
        self.emit_response(bytes);
    }

    /// Replies queued by DSR/DA while no response sink was installed.
    pub fn take_responses(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending_responses)
    }

    /// Events queued while no event sink was installed.
    pub fn take_events(&mut self) -> Vec<TermEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Route DSR/DA replies to the embedder as they are produced.
    pub fn set_response_sink(&mut self, sink: impl FnMut(&[u8]) + 'static) {
        self.response_sink = Some(Box::new(sink));
    }

    /// Route structured events to the embedder as they are produced.
    pub fn set_event_sink(&mut self, sink: impl FnMut(&TermEvent) + 'static) {
        self.event_sink = Some(Box::new(sink));
    }

    fn emit_response(&mut self, bytes: Vec<u8>) {
        match self.response_sink.as_mut() {
            Some(sink) => {
                if catch_unwind(AssertUnwindSafe(|| sink(&bytes))).is_err() {
                    tracing::error!("response sink panicked; reply dropped");
                }
            }
            None => self.pending_responses.push(bytes),
        }
    }

    fn emit_event(&mut self, event: TermEvent) {
        match self.event_sink.as_mut() {
            Some(sink) => {
                if catch_unwind(AssertUnwindSafe(|| sink(&event))).is_err() {
                    tracing::error!("event sink panicked; event dropped");
                }
            }
            None => self.pending_events.push(event),
        }
    }

    // ---- cursor and scrolling ------------------------------------------

    fn region(&self) -> (u16, u16) {
        self.scroll_region.unwrap_or((0, self.rows - 1))
    }

    fn cursor_pos(&self) -> (u16, u16) {
        let cursor = &self.screens.active().cursor;
        (cursor.row, cursor.col)
    }

    /// Scroll the region up. Rows evicted from a region-less primary
    /// screen feed the scrollback ring; everything else is discarded.
    fn scroll_region_up(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }
        let keep_history = !self.screens.is_alt_active() && self.scroll_region.is_none();
        for _ in 0..n {
            let evicted = self.screens.active_mut().grid.scroll_up(top, bottom);
            if keep_history {
                if let Some(row) = evicted {
                    self.scrollback.push(row);
                }
            }
        }
        self.screens.active_mut().grid.mark_all_dirty();
    }

    fn scroll_region_down(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }
        for _ in 0..n {
            self.screens.active_mut().grid.scroll_down(top, bottom);
        }
        self.screens.active_mut().grid.mark_all_dirty();
    }

    fn linefeed(&mut self) {
        let (_, bottom) = self.region();
        let row = self.screens.active().cursor.row;
        if row == bottom {
            self.scroll_region_up(1);
        } else if row < self.rows - 1 {
            self.screens.active_mut().cursor.row += 1;
        }
    }

    fn reverse_index(&mut self) {
        let (top, _) = self.region();
        let row = self.screens.active().cursor.row;
        if row == top {
            self.scroll_region_down(1);
        } else if row > 0 {
            self.screens.active_mut().cursor.row -= 1;
        }
    }

    fn carriage_return(&mut self) {
        self.screens.active_mut().cursor.col = 0;
    }

    fn backspace(&mut self) {
        let cursor = &mut self.screens.active_mut().cursor;
        if cursor.col > 0 {
            cursor.col -= 1;
        }
    }

    fn tab_forward(&mut self, n: u16) {
        let n = n.min(self.cols);
        let cols = self.cols as usize;
        let mut col = self.screens.active().cursor.col.min(self.cols - 1) as usize;
        for _ in 0..n {
            col = ((col + 1)..cols)
                .find(|&i| self.tab_stops[i])
                .unwrap_or(cols - 1);
        }
        self.screens.active_mut().cursor.col = col as u16;
    }

    fn tab_backward(&mut self, n: u16) {
        let n = n.min(self.cols);
        let mut col = self.screens.active().cursor.col.min(self.cols - 1) as usize;
        for _ in 0..n {
            col = (0..col).rev().find(|&i| self.tab_stops[i]).unwrap_or(0);
        }
        self.screens.active_mut().cursor.col = col as u16;
    }

    fn cursor_up(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let row = self.screens.active().cursor.row;
        let floor = if row >= top && row <= bottom { top } else { 0 };
        self.screens.active_mut().cursor.row = row.saturating_sub(n).max(floor);
    }

    fn cursor_down(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let row = self.screens.active().cursor.row;
        let ceiling = if row >= top && row <= bottom {
            bottom
        } else {
            self.rows - 1
        };
        self.screens.active_mut().cursor.row = row.saturating_add(n).min(ceiling);
    }

    fn cursor_forward(&mut self, n: u16) {
        let cols = self.cols;
        let cursor = &mut self.screens.active_mut().cursor;
        cursor.col = cursor.col.saturating_add(n).min(cols - 1);
    }

    fn cursor_backward(&mut self, n: u16) {
        let cursor = &mut self.screens.active_mut().cursor;
        cursor.col = cursor.col.saturating_sub(n);
    }

    /// CUP/HVP/VPA target, honoring origin mode.
    fn move_cursor_absolute(&mut self, row: u16, col: u16) {
        let (top, bottom) = self.region();
        let row = if self.modes.origin {
            top.saturating_add(row).min(bottom)
        } else {
            row.min(self.rows - 1)
        };
        let col = col.min(self.cols - 1);
        let cursor = &mut self.screens.active_mut().cursor;
        cursor.row = row;
        cursor.col = col;
    }

    // ---- erase and edit ------------------------------------------------

    fn erase_display(&mut self, mode: u16) {
        let rows = self.rows;
        let cols = self.cols;
        let (crow, ccol) = self.cursor_pos();
        let ccol = ccol.min(cols - 1);
        let grid = &mut self.screens.active_mut().grid;
        match mode {
            0 => {
                grid.erase_cells(crow, ccol, cols);
                for r in crow + 1..rows {
                    grid.row_mut(r).clear();
                }
            }
            1 => {
                for r in 0..crow {
                    grid.row_mut(r).clear();
                }
                grid.erase_cells(crow, 0, ccol + 1);
            }
            // Mode 3 asks for history to go too; both clear the screen here
            2 | 3 => grid.clear(),
            _ => {}
        }
    }

    fn erase_line(&mut self, mode: u16) {
        let cols = self.cols;
        let (crow, ccol) = self.cursor_pos();
        let ccol = ccol.min(cols - 1);
        let grid = &mut self.screens.active_mut().grid;
        match mode {
            0 => grid.erase_cells(crow, ccol, cols),
            1 => grid.erase_cells(crow, 0, ccol + 1),
            2 => grid.erase_cells(crow, 0, cols),
            _ => {}
        }
    }

    /// IL: blank rows open at the cursor; rows below shift out of the
    /// region and are discarded.
    fn insert_lines(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let row = self.screens.active().cursor.row;
        if row < top || row > bottom {
            return;
        }
        let n = n.min(bottom - row + 1);
        let grid = &mut self.screens.active_mut().grid;
        for _ in 0..n {
            grid.scroll_down(row, bottom);
        }
        grid.mark_all_dirty();
        self.screens.active_mut().cursor.col = 0;
    }

    /// DL: rows close up at the cursor. Unlike a top-of-screen scroll, the
    /// removed rows never reach scrollback.
    fn delete_lines(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let row = self.screens.active().cursor.row;
        if row < top || row > bottom {
            return;
        }
        let n = n.min(bottom - row + 1);
        let grid = &mut self.screens.active_mut().grid;
        for _ in 0..n {
            let _ = grid.scroll_up(row, bottom);
        }
        grid.mark_all_dirty();
        self.screens.active_mut().cursor.col = 0;
    }

    fn insert_chars(&mut self, n: u16) {
        let (crow, ccol) = self.cursor_pos();
        let ccol = ccol.min(self.cols - 1);
        self.screens.active_mut().grid.insert_cells(crow, ccol, n);
    }

    fn delete_chars(&mut self, n: u16) {
        let (crow, ccol) = self.cursor_pos();
        let ccol = ccol.min(self.cols - 1);
        self.screens.active_mut().grid.delete_cells(crow, ccol, n);
    }

    fn erase_chars(&mut self, n: u16) {
        let cols = self.cols;
        let (crow, ccol) = self.cursor_pos();
        let ccol = ccol.min(cols - 1);
        let end = ccol.saturating_add(n).min(cols);
        self.screens.active_mut().grid.erase_cells(crow, ccol, end);
    }

    // ---- save/restore and screens --------------------------------------

    fn save_cursor(&mut self) {
        let origin_mode = self.modes.origin;
        let charsets = self.charsets;
        let screen = self.screens.active_mut();
        screen.saved = Some(SavedCursor {
            row: screen.cursor.row,
            col: screen.cursor.col,
            attrs: screen.attrs.clone(),
            origin_mode,
            charsets,
        });
    }

    fn restore_cursor(&mut self) {
        let rows = self.rows;
        let cols = self.cols;
        let Some(saved) = self.screens.active().saved.clone() else {
            return;
        };
        self.modes.origin = saved.origin_mode;
        self.charsets = saved.charsets;
        let screen = self.screens.active_mut();
        screen.cursor.row = saved.row.min(rows - 1);
        // The pending-wrap column survives a save/restore round trip
        screen.cursor.col = saved.col.min(cols);
        screen.attrs = saved.attrs;
    }

    fn enter_alt_screen(&mut self) {
        self.screens.enter_alt();
    }

    fn exit_alt_screen(&mut self) {
        self.screens.exit_alt();
    }

    fn full_reset(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        self.screens = ScreenManager::new(rows, cols);
        self.modes = TerminalModes::default();
        self.scroll_region = None;
        self.tab_stops = default_tab_stops(cols);
        self.charsets = CharsetState::default();
        self.viewport = 0;
        self.title.clear();
        self.active_hyperlink = None;
        self.last_printed = ' ';
        // Scrollback, sinks, and queued output survive a reset
    }

    // ---- modes ----------------------------------------------------------

    fn set_dec_mode(&mut self, params: &Params, enable: bool) {
        let modes: Vec<u16> = params.iter().filter_map(|g| g.first().copied()).collect();
        for mode in modes {
            match mode {
                1 => self.modes.cursor_keys_application = enable,
                6 => {
                    self.modes.origin = enable;
                    // DECOM toggle homes the cursor
                    let home = if enable { self.region().0 } else { 0 };
                    let cursor = &mut self.screens.active_mut().cursor;
                    cursor.row = home;
                    cursor.col = 0;
                }
                7 => self.modes.autowrap = enable,
                25 => self.modes.cursor_visible = enable,
                47 | 1047 => {
                    if enable {
                        self.enter_alt_screen();
                    } else {
                        self.exit_alt_screen();
                    }
                }
                1048 => {
                    if enable {
                        self.save_cursor();
                    } else {
                        self.restore_cursor();
                    }
                }
                1049 => {
                    if enable {
                        self.save_cursor();
                        self.enter_alt_screen();
                    } else {
                        self.exit_alt_screen();
                        self.restore_cursor();
                    }
                }
                1000 => self.modes.mouse.set(MouseTracking::CLICK, enable),
                1002 => self.modes.mouse.set(MouseTracking::BUTTON, enable),
                1003 => self.modes.mouse.set(MouseTracking::ANY, enable),
                1006 => self.modes.mouse_sgr = enable,
                2004 => self.modes.bracketed_paste = enable,
                _ => tracing::debug!(mode, enable, "unhandled DEC private mode"),
            }
        }
    }

    fn set_ansi_mode(&mut self, params: &Params, enable: bool) {
        for group in params.iter() {
            match group.first().copied() {
                Some(4) => self.modes.insert = enable,
                Some(20) => self.modes.linefeed_newline = enable,
                _ => {}
            }
        }
    }

    fn dec_mode_state(&self, mode: u16) -> Option<bool> {
        match mode {
            1 => Some(self.modes.cursor_keys_application),
            6 => Some(self.modes.origin),
            7 => Some(self.modes.autowrap),
            25 => Some(self.modes.cursor_visible),
            47 | 1047 | 1049 => Some(self.screens.is_alt_active()),
            1000 => Some(self.modes.mouse.contains(MouseTracking::CLICK)),
            1002 => Some(self.modes.mouse.contains(MouseTracking::BUTTON)),
            1003 => Some(self.modes.mouse.contains(MouseTracking::ANY)),
            1006 => Some(self.modes.mouse_sgr),
            2004 => Some(self.modes.bracketed_paste),
            _ => None,
        }
    }

    fn ansi_mode_state(&self, mode: u16) -> Option<bool> {
        match mode {
            4 => Some(self.modes.insert),
            20 => Some(self.modes.linefeed_newline),
            _ => None,
        }
    }

    /// DECRPM / RQM reply: 1 set, 2 reset, 0 unrecognized.
    fn report_mode_state(&mut self, mode: u16, state: Option<bool>, dec_private: bool) {
        let pm = match state {
            Some(true) => 1,
            Some(false) => 2,
            None => 0,
        };
        let prefix = if dec_private { "?" } else { "" };
        let response = format!("\x1b[{}{};{}$y", prefix, mode, pm);
        self.emit_response(response.into_bytes());
    }

    fn report_modes(&mut self, params: &Params, dec_private: bool) {
        if params.is_empty() {
            self.report_mode_state(0, None, dec_private);
            return;
        }
        let modes: Vec<u16> = params.iter().filter_map(|g| g.first().copied()).collect();
        for mode in modes {
            let state = if dec_private {
                self.dec_mode_state(mode)
            } else {
                self.ansi_mode_state(mode)
            };
            self.report_mode_state(mode, state, dec_private);
        }
    }

    // ---- printing -------------------------------------------------------

    fn put_char(&mut self, c: char, width: u16) {
        let cols = self.cols;
        if width > cols {
            return;
        }
        // Covers both the pending-wrap position and a wide character
        // against the right edge: wrap first, or discard without autowrap
        if self.screens.active().cursor.col + width > cols {
            if self.modes.autowrap {
                self.screens.active_mut().cursor.col = 0;
                self.linefeed();
            } else {
                return;
            }
        }
        if self.modes.insert {
            let (row, col) = self.cursor_pos();
            self.screens.active_mut().grid.insert_cells(row, col, width);
        }
        let url = self.active_hyperlink.clone();
        let screen = self.screens.active_mut();
        let (row, col) = (screen.cursor.row, screen.cursor.col);
        let mut attrs = screen.attrs.clone();
        attrs.url = url;
        let flags = if width == 2 {
            CellFlags::WIDE
        } else {
            CellFlags::empty()
        };
        screen.grid.set_cell(row, col, Cell { c, attrs, flags });
        // Advancing out of the last column leaves the pending-wrap position
        screen.cursor.col += width;
    }
}

fn default_tab_stops(cols: u16) -> Vec<bool> {
    let mut stops = vec![false; cols as usize];
    for i in (8..cols as usize).step_by(8) {
        stops[i] = true;
    }
    stops
}

fn param(params: &Params, idx: usize, default: u16) -> u16 {
    params
        .get(idx)
        .filter(|&v| v != 0)
        .unwrap_or(default)
}

impl Perform for TerminalState {
    fn print(&mut self, c: char) {
        let c = self.charsets.map(c);
        self.last_printed = c;
        let width = UnicodeWidthChar::width(c).unwrap_or(1);
        if width == 0 {
            // Combining marks and other zero-width scalars are not cells
            return;
        }
        self.put_char(c, width.min(2) as u16);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => self.emit_event(TermEvent::Bell),
            0x08 => self.backspace(),
            0x09 => self.tab_forward(1),
            0x0a | 0x0b | 0x0c => {
                self.linefeed();
                if self.modes.linefeed_newline {
                    self.carriage_return();
                }
            }
            0x0d => self.carriage_return(),
            0x0e => self.charsets.shift_out(),
            0x0f => self.charsets.shift_in(),
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], action: char) {
        let private = intermediates.contains(&b'?');
        let has_gt = intermediates.contains(&b'>');
        let has_dollar = intermediates.contains(&b'$');
        let has_space = intermediates.contains(&b' ');

        // DECRQM / RQM mode state reports
        if action == 'p' && has_dollar {
            self.report_modes(params, private);
            return;
        }

        // Secondary Device Attributes: CSI > c
        if action == 'c' && has_gt {
            if param(params, 0, 0) == 0 {
                self.emit_response(b"\x1b[>0;10;0c".to_vec());
            }
            return;
        }

        match (action, private) {
            ('A', false) => self.cursor_up(param(params, 0, 1)),
            ('B', false) => self.cursor_down(param(params, 0, 1)),
            ('C', false) => self.cursor_forward(param(params, 0, 1)),
            ('D', false) => self.cursor_backward(param(params, 0, 1)),
            ('E', false) => {
                self.carriage_return();
                self.cursor_down(param(params, 0, 1));
            }
            ('F', false) => {
                self.carriage_return();
                self.cursor_up(param(params, 0, 1));
            }
            ('G', false) => {
                let col = param(params, 0, 1) - 1;
                self.screens.active_mut().cursor.col = col.min(self.cols - 1);
            }
            ('H' | 'f', false) => {
                let row = param(params, 0, 1) - 1;
                let col = param(params, 1, 1) - 1;
                self.move_cursor_absolute(row, col);
            }
            ('d', false) => {
                let row = param(params, 0, 1) - 1;
                let col = self.screens.active().cursor.col.min(self.cols - 1);
                self.move_cursor_absolute(row, col);
            }
            ('J', false) => self.erase_display(param(params, 0, 0)),
            ('K', false) => self.erase_line(param(params, 0, 0)),
            ('L', false) => self.insert_lines(param(params, 0, 1)),
            ('M', false) => self.delete_lines(param(params, 0, 1)),
            ('@', false) => self.insert_chars(param(params, 0, 1)),
            ('P', false) => self.delete_chars(param(params, 0, 1)),
            ('X', false) => self.erase_chars(param(params, 0, 1)),
            ('S', false) => self.scroll_region_up(param(params, 0, 1)),
            ('T', false) => self.scroll_region_down(param(params, 0, 1)),
            ('I', false) => self.tab_forward(param(params, 0, 1)),
            ('Z', false) => self.tab_backward(param(params, 0, 1)),
            ('g', false) => match param(params, 0, 0) {
                0 => {
                    let col = self.screens.active().cursor.col;
                    if let Some(stop) = self.tab_stops.get_mut(col as usize) {
                        *stop = false;
                    }
                }
                3 => self.tab_stops.iter_mut().for_each(|s| *s = false),
                _ => {}
            },
            ('r', false) => {
                let top = param(params, 0, 1).saturating_sub(1);
                let bottom = param(params, 1, self.rows)
                    .saturating_sub(1)
                    .min(self.rows - 1);
                if top < bottom {
                    self.scroll_region = if top == 0 && bottom == self.rows - 1 {
                        None
                    } else {
                        Some((top, bottom))
                    };
                    let home = if self.modes.origin { top } else { 0 };
                    let cursor = &mut self.screens.active_mut().cursor;
                    cursor.row = home;
                    cursor.col = 0;
                }
                // top >= bottom is rejected; the prior region stays
            }
            ('m', false) => sgr::apply(&mut self.screens.active_mut().attrs, params),
            ('h', true) => self.set_dec_mode(params, true),
            ('l', true) => self.set_dec_mode(params, false),
            ('h', false) => self.set_ansi_mode(params, true),
            ('l', false) => self.set_ansi_mode(params, false),
            ('n', false) => match param(params, 0, 0) {
                5 => self.emit_response(b"\x1b[0n".to_vec()),
                6 => {
                    let (row, col) = self.cursor_pos();
                    let col = col.min(self.cols - 1);
                    let response = format!("\x1b[{};{}R", row + 1, col + 1);
                    self.emit_response(response.into_bytes());
                }
                _ => {}
            },
            ('c', false) => {
                // Primary Device Attributes: report as a VT220
                if param(params, 0, 0) == 0 {
                    self.emit_response(b"\x1b[?62;22c".to_vec());
                }
            }
            ('s', false) => self.save_cursor(),
            ('u', false) => self.restore_cursor(),
            ('q', false) if has_space => {
                // DECSCUSR: odd styles blink, even are steady
                let style = param(params, 0, 1);
                self.screens.active_mut().cursor.blinking = matches!(style, 0 | 1 | 3 | 5);
            }
            ('b', false) => {
                let count = (param(params, 0, 1) as usize).min(MAX_REPEAT);
                let c = self.last_printed;
                let width = UnicodeWidthChar::width(c).unwrap_or(1).min(2) as u16;
                if width == 0 {
                    return;
                }
                for _ in 0..count {
                    self.put_char(c, width);
                }
            }
            _ => tracing::trace!(action = %action, "unhandled CSI sequence"),
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], byte: u8) {
        match (intermediates, byte) {
            ([], b'7') => self.save_cursor(),
            ([], b'8') => self.restore_cursor(),
            ([], b'D') => self.linefeed(),
            ([], b'M') => self.reverse_index(),
            ([], b'E') => {
                self.carriage_return();
                self.linefeed();
            }
            ([], b'H') => {
                let col = self.screens.active().cursor.col;
                if let Some(stop) = self.tab_stops.get_mut(col as usize) {
                    *stop = true;
                }
            }
            ([], b'c') => self.full_reset(),
            // String terminator tail of an ESC-terminated OSC
            ([], b'\\') => {}
            ([designator], final_byte) => {
                if let Some(slot) = CharsetState::slot_for_designator(*designator) {
                    self.charsets.designate(slot, Charset::from_final(final_byte));
                }
            }
            _ => tracing::trace!(byte, "unhandled ESC sequence"),
        }
    }

    fn osc_dispatch(&mut self, payload: &[u8], _bell_terminated: bool) {
        match osc::classify(payload) {
            OscCommand::Title(title) => {
                self.title = title.clone();
                self.emit_event(TermEvent::Title { title });
            }
            OscCommand::IconTitle(title) => self.emit_event(TermEvent::IconTitle { title }),
            OscCommand::Hyperlink {
                id,
                uri: Some(uri),
            } => {
                self.active_hyperlink = Some(Arc::from(uri.as_str()));
                self.emit_event(TermEvent::HyperlinkOpened { id, uri });
            }
            OscCommand::Hyperlink { uri: None, .. } => {
                if self.active_hyperlink.take().is_some() {
                    self.emit_event(TermEvent::HyperlinkClosed);
                }
            }
            OscCommand::Clipboard { clipboard, data } => {
                self.emit_event(TermEvent::ClipboardSet { clipboard, data });
            }
            OscCommand::Other { command, payload } => {
                self.emit_event(TermEvent::Osc { command, payload });
            }
        }
    }

    fn osc_overflow(&mut self) {
        self.emit_event(TermEvent::OscOverflow);
    }
}

/// The embedder-facing engine: terminal state plus the byte parser.
pub struct Terminal {
    state: TerminalState,
    parser: Parser,
}

impl Deref for Terminal {
    type Target = TerminalState;

    fn deref(&self) -> &TerminalState {
        &self.state
    }
}

impl DerefMut for Terminal {
    fn deref_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }
}

impl Terminal {
    pub fn new(config: TermConfig) -> Result<Self, TermError> {
        Ok(Self {
            state: TerminalState::new(config)?,
            parser: Parser::new(),
        })
    }

    /// Feed a chunk of the byte stream. Never fails: malformed input is
    /// recovered in place. Incoming output snaps the viewport back to the
    /// live screen.
    pub fn write<B: AsRef<[u8]>>(&mut self, bytes: B) {
        self.state.viewport = 0;
        for &byte in bytes.as_ref() {
            self.parser.advance(&mut self.state, byte);
        }
    }

    /// Drop any partially accumulated escape/UTF-8 state without touching
    /// the screen.
    pub fn reset_parser(&mut self) {
        self.parser.reset();
    }

    /// Full reset (as `ESC c`): screens, modes, tab stops, charsets, and
    /// parser state. Scrollback and sinks survive.
    pub fn reset(&mut self) {
        self.state.full_reset();
        self.parser.reset();
    }
}
