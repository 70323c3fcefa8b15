use crate::cell::Attributes;
use crate::charset::CharsetState;

/// Cursor position and presentation state.
///
/// `col` may momentarily equal the column count: writing into the last
/// column under autowrap leaves the cursor in the pending-wrap position,
/// and the next printable character wraps before it is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub visible: bool,
    pub blinking: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            visible: true,
            blinking: true,
        }
    }
}

/// Snapshot captured by DECSC (`ESC 7`) and restored by DECRC (`ESC 8`).
/// Each screen keeps its own slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCursor {
    pub row: u16,
    pub col: u16,
    pub attrs: Attributes,
    pub origin_mode: bool,
    pub charsets: CharsetState,
}
