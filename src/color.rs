/// Terminal color representation supporting 16-color, 256-color, and truecolor.
///
/// `Default` stands for the embedder's theme foreground/background and is
/// never resolved inside the engine; `Indexed` covers the 16 named colors,
/// the 6x6x6 cube, and the grayscale ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}
