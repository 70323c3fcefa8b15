use crate::cell::Attributes;
use crate::cursor::{CursorState, SavedCursor};
use crate::grid::Grid;

/// One drawing surface: a grid plus the cursor and rendition state that
/// mutate it, and the DECSC slot.
#[derive(Debug, Clone)]
pub struct Screen {
    pub grid: Grid,
    pub cursor: CursorState,
    pub attrs: Attributes,
    pub saved: Option<SavedCursor>,
}

impl Screen {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            cursor: CursorState::default(),
            attrs: Attributes::default(),
            saved: None,
        }
    }

    /// Fresh surface for alternate-screen entry: cleared grid, home cursor,
    /// default rendition. The DECSC slot survives.
    fn clear_for_entry(&mut self) {
        self.grid.clear();
        self.cursor = CursorState::default();
        self.attrs = Attributes::default();
    }
}

/// Primary and alternate screens. Switching flips a flag; neither screen's
/// state is copied, and the primary is preserved verbatim across a round
/// trip through the alternate.
#[derive(Debug, Clone)]
pub struct ScreenManager {
    primary: Screen,
    alternate: Screen,
    alt_active: bool,
}

impl ScreenManager {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            primary: Screen::new(rows, cols),
            alternate: Screen::new(rows, cols),
            alt_active: false,
        }
    }

    pub fn is_alt_active(&self) -> bool {
        self.alt_active
    }

    pub fn active(&self) -> &Screen {
        if self.alt_active {
            &self.alternate
        } else {
            &self.primary
        }
    }

    pub fn active_mut(&mut self) -> &mut Screen {
        if self.alt_active {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn primary(&self) -> &Screen {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut Screen {
        &mut self.primary
    }

    /// Switch to the alternate screen, clearing it first. Returns false if
    /// it was already active.
    pub fn enter_alt(&mut self) -> bool {
        if self.alt_active {
            return false;
        }
        self.alternate.clear_for_entry();
        self.alt_active = true;
        true
    }

    /// Switch back to the primary screen. Returns false if the alternate
    /// was not active.
    pub fn exit_alt(&mut self) -> bool {
        if !self.alt_active {
            return false;
        }
        self.alt_active = false;
        self.primary.grid.mark_all_dirty();
        true
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.primary.grid.resize(rows, cols);
        self.alternate.grid.resize(rows, cols);
        for screen in [&mut self.primary, &mut self.alternate] {
            screen.cursor.row = screen.cursor.row.min(rows - 1);
            screen.cursor.col = screen.cursor.col.min(cols - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn alt_entry_clears_alternate_only() {
        let mut screens = ScreenManager::new(3, 10);
        screens.primary_mut().grid.set_cell(
            0,
            0,
            Cell {
                c: 'p',
                ..Default::default()
            },
        );

        assert!(screens.enter_alt());
        screens.active_mut().grid.set_cell(
            0,
            0,
            Cell {
                c: 'a',
                ..Default::default()
            },
        );
        assert!(!screens.enter_alt(), "re-entry is a no-op");

        assert!(screens.exit_alt());
        assert_eq!(screens.active().grid.cell(0, 0).unwrap().c, 'p');

        // Re-entering clears what the last alternate session drew
        screens.enter_alt();
        assert_eq!(screens.active().grid.cell(0, 0).unwrap().c, ' ');
    }

    #[test]
    fn resize_clamps_both_cursors() {
        let mut screens = ScreenManager::new(10, 20);
        screens.primary_mut().cursor.row = 9;
        screens.primary_mut().cursor.col = 19;
        screens.resize(5, 8);
        assert_eq!(screens.primary().cursor.row, 4);
        assert_eq!(screens.primary().cursor.col, 7);
    }
}
