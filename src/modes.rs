use bitflags::bitflags;

bitflags! {
    /// Mouse tracking granularities (DEC private modes 1000/1002/1003).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct MouseTracking: u8 {
        /// Mode 1000: button press/release
        const CLICK  = 1 << 0;
        /// Mode 1002: motion while a button is held
        const BUTTON = 1 << 1;
        /// Mode 1003: all motion
        const ANY    = 1 << 2;
    }
}

/// Terminal mode flags tracking various DEC and ANSI modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalModes {
    /// DECCKM: cursor key mode (application vs normal)
    pub cursor_keys_application: bool,
    /// DECOM: origin mode
    pub origin: bool,
    /// DECAWM: auto-wrap mode
    pub autowrap: bool,
    /// DECTCEM: text cursor visible
    pub cursor_visible: bool,
    /// Mouse tracking granularity (modes 1000/1002/1003)
    pub mouse: MouseTracking,
    /// SGR mouse reporting (mode 1006)
    pub mouse_sgr: bool,
    /// Bracketed paste mode (mode 2004)
    pub bracketed_paste: bool,
    /// Insert mode (IRM)
    pub insert: bool,
    /// Line feed / new line mode (LNM): LF implies CR. On by default;
    /// `CSI 20 l` restores bare line feeds.
    pub linefeed_newline: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self {
            cursor_keys_application: false,
            origin: false,
            autowrap: true,
            cursor_visible: true,
            mouse: MouseTracking::empty(),
            mouse_sgr: false,
            bracketed_paste: false,
            insert: false,
            linefeed_newline: true,
        }
    }
}
