//! Property-based invariant tests.
//!
//! These hold for **any** byte stream, hostile or not:
//!
//! 1. `write` never panics.
//! 2. Chunking is invisible: splitting the stream changes nothing.
//! 3. Wide cells always pair with exactly one spacer, never at the edge.
//! 4. Scrollback never exceeds its capacity.
//! 5. The cursor stays inside the pending-wrap bounds.

use drizzle::{Cell, CellFlags, TermConfig, Terminal};
use proptest::prelude::*;

fn dims() -> impl Strategy<Value = (u16, u16)> {
    (1u16..=120, 1u16..=60)
}

/// Bytes biased toward escape-sequence structure so the parser states all
/// get exercised, not just ground.
fn terminal_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<u8>(),
            2 => prop_oneof![
                Just(0x1b),
                Just(b'['),
                Just(b']'),
                Just(b';'),
                Just(b'?'),
                Just(0x07),
            ],
            2 => 0x20u8..0x7f,
            1 => prop::sample::select(b"Hm0123456789JKrhl".to_vec()),
        ],
        0..512,
    )
}

/// Printable mix of narrow and wide scalars.
fn printable_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('a'),
            Just('Z'),
            Just(' '),
            Just('漢'),
            Just('語'),
            Just('あ'),
            Just('\n'),
        ],
        0..200,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn snapshot(term: &Terminal) -> (Vec<Vec<Cell>>, (u16, u16), usize) {
    let rows = (0..term.rows())
        .map(|r| term.get_line(r).unwrap())
        .collect();
    (
        rows,
        (term.cursor().row, term.cursor().col),
        term.scrollback_len(),
    )
}

proptest! {
    #[test]
    fn write_never_panics((cols, rows) in dims(), bytes in terminal_bytes()) {
        let mut term = Terminal::new(TermConfig { cols, rows, scrollback: 50 }).unwrap();
        term.write(&bytes);
    }

    #[test]
    fn chunking_is_invisible(
        (cols, rows) in dims(),
        bytes in terminal_bytes(),
        split in any::<prop::sample::Index>(),
    ) {
        let config = TermConfig { cols, rows, scrollback: 50 };

        let mut whole = Terminal::new(config).unwrap();
        whole.write(&bytes);

        let mut chunked = Terminal::new(config).unwrap();
        let at = split.index(bytes.len() + 1);
        chunked.write(&bytes[..at]);
        chunked.write(&bytes[at..]);

        prop_assert_eq!(snapshot(&whole), snapshot(&chunked));
    }

    #[test]
    fn wide_cells_always_pair((cols, rows) in dims(), text in printable_text()) {
        let mut term = Terminal::new(TermConfig { cols, rows, scrollback: 20 }).unwrap();
        term.write(text.as_bytes());

        for row in 0..rows {
            let line = term.get_line(row).unwrap();
            prop_assert_eq!(line.len(), cols as usize);
            for (col, cell) in line.iter().enumerate() {
                if cell.flags.contains(CellFlags::WIDE) {
                    prop_assert!(col + 1 < cols as usize, "wide cell at last column");
                    prop_assert!(
                        line[col + 1].flags.contains(CellFlags::WIDE_SPACER),
                        "wide cell without trailing spacer"
                    );
                }
                if cell.flags.contains(CellFlags::WIDE_SPACER) {
                    prop_assert!(col > 0, "spacer at column 0");
                    prop_assert!(
                        line[col - 1].flags.contains(CellFlags::WIDE),
                        "spacer without leading wide cell"
                    );
                }
            }
        }
    }

    #[test]
    fn scrollback_respects_capacity(
        (cols, rows) in dims(),
        cap in 0usize..20,
        lines in 0usize..100,
    ) {
        let mut term = Terminal::new(TermConfig { cols, rows, scrollback: cap }).unwrap();
        for i in 0..lines {
            term.write(format!("line {i}\n").as_bytes());
        }
        prop_assert!(term.scrollback_len() <= cap);
    }

    #[test]
    fn cursor_stays_in_bounds((cols, rows) in dims(), bytes in terminal_bytes()) {
        let mut term = Terminal::new(TermConfig { cols, rows, scrollback: 20 }).unwrap();
        term.write(&bytes);
        prop_assert!(term.cursor().row < rows);
        // Column `cols` is the legal pending-wrap position
        prop_assert!(term.cursor().col <= cols);
    }
}
