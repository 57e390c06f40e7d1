//! How a cell looks: the eight basic ANSI colours, normal or dim text, and
//! the shape of the hardware cursor.

/// An ANSI colour. The discriminant is the digit used in `3x`/`4x` SGR
/// sequences.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,

    #[default]
    Default = 9,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    #[default]
    Normal,
    Dim,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub weight: Weight,
}

impl Style {
    pub const EMPTY: Self = Style::new(Color::Default, Color::Default);

    /// Black on white, for the status bar.
    pub const INVERTED: Self = Style::new(Color::Black, Color::White);

    #[inline]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Style {
            fg,
            bg,
            weight: Weight::Normal,
        }
    }

    #[inline]
    pub const fn fg(fg: Color) -> Self {
        Style::new(fg, Color::Default)
    }

    #[inline]
    #[must_use]
    pub const fn dim(self) -> Self {
        Style {
            weight: Weight::Dim,
            ..self
        }
    }
}

/// Steady (non-blinking) cursor shapes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    #[default]
    Block,
    Bar,
}
