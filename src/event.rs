use serde::Serialize;

/// Structured events emitted alongside grid mutations.
///
/// Delivered to the installed event sink, or queued for
/// [`take_events`](crate::term::TerminalState::take_events) when none is
/// set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TermEvent {
    /// Window title changed (OSC 0 or 2)
    Title { title: String },
    /// Icon title changed (OSC 1)
    IconTitle { title: String },
    /// A hyperlink opened (OSC 8); printed cells carry its URI until closed
    HyperlinkOpened { id: Option<String>, uri: String },
    /// The open hyperlink closed (OSC 8 with an empty URI)
    HyperlinkClosed,
    /// Clipboard write request (OSC 52); the embedder may refuse
    ClipboardSet { clipboard: String, data: String },
    /// BEL received
    Bell,
    /// Screen dimensions changed
    Resized { cols: u16, rows: u16 },
    /// An OSC payload exceeded the size bound and was dropped
    OscOverflow,
    /// Unclassified OSC sequence, surfaced raw
    Osc { command: String, payload: Vec<u8> },
}
