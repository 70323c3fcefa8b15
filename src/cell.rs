use std::sync::Arc;

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Cell text attributes as a compact bitflag set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct AttrFlags: u8 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const BLINK         = 1 << 3;
        const INVERSE       = 1 << 4;
        const HIDDEN        = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
    }
}

bitflags! {
    /// Per-cell flags for wide character tracking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellFlags: u8 {
        /// This cell holds a wide (2-column) character
        const WIDE        = 1 << 0;
        /// This cell is the trailing spacer of a wide character
        const WIDE_SPACER = 1 << 1;
    }
}

/// Underline rendition selected by SGR 4 and its `4:n` sub-parameter forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnderlineStyle {
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

impl Default for UnderlineStyle {
    fn default() -> Self {
        UnderlineStyle::None
    }
}

impl UnderlineStyle {
    /// Map an SGR `4:n` sub-parameter to a style.
    pub fn from_sgr(n: u16) -> Option<Self> {
        Some(match n {
            0 => UnderlineStyle::None,
            1 => UnderlineStyle::Single,
            2 => UnderlineStyle::Double,
            3 => UnderlineStyle::Curly,
            4 => UnderlineStyle::Dotted,
            5 => UnderlineStyle::Dashed,
            _ => return None,
        })
    }
}

/// The rendition applied to newly printed cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
    pub underline: UnderlineStyle,
    /// Hyperlink target from OSC 8, shared by the cells printed while the
    /// link is open.
    pub url: Option<Arc<str>>,
}

/// A single terminal cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub c: char,
    pub attrs: Attributes,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            attrs: Attributes::default(),
            flags: CellFlags::empty(),
        }
    }
}

impl Cell {
    /// Create a spacer cell for the trailing half of a wide character.
    pub fn wide_spacer() -> Self {
        Self {
            flags: CellFlags::WIDE_SPACER,
            ..Default::default()
        }
    }

    /// Columns this cell occupies: 2 for a wide cell, 0 for a spacer,
    /// 1 otherwise.
    pub fn width(&self) -> u8 {
        if self.flags.contains(CellFlags::WIDE) {
            2
        } else if self.flags.contains(CellFlags::WIDE_SPACER) {
            0
        } else {
            1
        }
    }

    /// Reset cell to default blank state.
    pub fn clear(&mut self) {
        *self = Cell::default();
    }
}

/// A single row in the terminal grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub dirty: bool,
}

impl Row {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
            dirty: true,
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.dirty = true;
    }

    /// Resize to the new column count. Columns are added and removed on the
    /// right; a wide pair split by the cut has its surviving half blanked.
    pub fn resize(&mut self, cols: u16) {
        let new_len = cols as usize;
        if self.cells.len() == new_len {
            return;
        }
        self.cells.resize(new_len, Cell::default());
        if let Some(last) = self.cells.last_mut() {
            if last.flags.contains(CellFlags::WIDE) {
                last.clear();
            }
        }
        self.dirty = true;
    }

    /// Plain text content: spacers skipped, trailing blanks trimmed.
    pub fn text(&self) -> String {
        let s: String = self
            .cells
            .iter()
            .filter(|c| !c.flags.contains(CellFlags::WIDE_SPACER))
            .map(|c| c.c)
            .collect();
        s.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cell_is_one_column_space() {
        let cell = Cell::default();
        assert_eq!(cell.c, ' ');
        assert_eq!(cell.width(), 1);
        assert_eq!(cell.attrs, Attributes::default());
    }

    #[test]
    fn spacer_has_zero_width() {
        assert_eq!(Cell::wide_spacer().width(), 0);
    }

    #[test]
    fn row_resize_blanks_split_wide_pair() {
        let mut row = Row::new(4);
        row.cells[2] = Cell {
            c: '漢',
            flags: CellFlags::WIDE,
            ..Default::default()
        };
        row.cells[3] = Cell::wide_spacer();

        // The cut at column 3 drops the spacer; the wide half must not survive
        row.resize(3);
        assert_eq!(row.cells.len(), 3);
        assert_eq!(row.cells[2], Cell::default());
    }

    #[test]
    fn row_text_skips_spacers_and_trims() {
        let mut row = Row::new(5);
        row.cells[0].c = 'a';
        row.cells[1] = Cell {
            c: '漢',
            flags: CellFlags::WIDE,
            ..Default::default()
        };
        row.cells[2] = Cell::wide_spacer();
        assert_eq!(row.text(), "a漢");
    }
}
