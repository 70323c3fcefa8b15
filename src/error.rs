use thiserror::Error;

/// Typed failures surfaced to the embedder. Everything else — malformed
/// escape sequences, bad mode parameters, invalid UTF-8 — is recovered
/// internally and never propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TermError {
    /// Construction or `resize` with dimensions outside `1..=1000`.
    #[error("invalid terminal dimensions {cols}x{rows} (limit 1..=1000)")]
    InvalidDimensions { cols: u16, rows: u16 },
    /// Row query outside the visible screen.
    #[error("row {row} out of range (screen has {rows} rows)")]
    OutOfRange { row: u16, rows: u16 },
}
