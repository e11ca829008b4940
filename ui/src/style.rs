//! Named palette colours and cell styles.

use std::fmt;

/// Sixteen-colour palette every cell is drawn with.
///
/// Renderers map the names to concrete RGB values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Black.
    Black,
    /// Dark blue.
    Blue,
    /// Dark green.
    Green,
    /// Dark cyan.
    Cyan,
    /// Dark red.
    Red,
    /// Magenta.
    Magenta,
    /// Orange, the default highlight background.
    Orange,
    /// Light grey.
    LightGrey,
    /// Dark grey.
    Grey,
    /// Light blue.
    LightBlue,
    /// Light green.
    LightGreen,
    /// Light cyan.
    LightCyan,
    /// Light red.
    LightRed,
    /// Light purple.
    LightPurple,
    /// Yellow.
    Yellow,
    /// White.
    White,
}

impl Color {
    /// Every palette entry in index order.
    pub const ALL: [Color; 16] = [
        Self::Black,
        Self::Blue,
        Self::Green,
        Self::Cyan,
        Self::Red,
        Self::Magenta,
        Self::Orange,
        Self::LightGrey,
        Self::Grey,
        Self::LightBlue,
        Self::LightGreen,
        Self::LightCyan,
        Self::LightRed,
        Self::LightPurple,
        Self::Yellow,
        Self::White,
    ];

    /// Upper-case palette name as used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "BLACK",
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::Cyan => "CYAN",
            Self::Red => "RED",
            Self::Magenta => "MAGENTA",
            Self::Orange => "ORANGE",
            Self::LightGrey => "LGREY",
            Self::Grey => "GREY",
            Self::LightBlue => "LBLUE",
            Self::LightGreen => "LGREEN",
            Self::LightCyan => "LCYAN",
            Self::LightRed => "LRED",
            Self::LightPurple => "LPURP",
            Self::Yellow => "YELLOW",
            Self::White => "WHITE",
        }
    }

    /// Looks up a palette entry by its name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Foreground, background, and highlight colours of a cell or widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Style {
    /// Glyph colour.
    pub fg: Color,
    /// Cell colour.
    pub bg: Color,
    /// Glyph colour while highlighted.
    pub highlight_fg: Color,
    /// Cell colour while highlighted.
    pub highlight_bg: Color,
}

impl Style {
    /// Creates a style with the default highlight colours.
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            highlight_fg: Color::Black,
            highlight_bg: Color::Orange,
        }
    }

    /// Replaces the highlight colours.
    #[must_use]
    pub const fn with_highlight(self, highlight_fg: Color, highlight_bg: Color) -> Self {
        Self {
            highlight_fg,
            highlight_bg,
            ..self
        }
    }

    /// Swaps foreground and background, used for title bars.
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
            ..self
        }
    }

    /// Colours a cell is actually drawn with.
    #[must_use]
    pub const fn resolve(self, highlighted: bool) -> (Color, Color) {
        if highlighted {
            (self.highlight_fg, self.highlight_bg)
        } else {
            (self.fg, self.bg)
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(Color::White, Color::Blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for color in Color::ALL {
            assert_eq!(Color::from_name(color.name()), Some(color));
        }
        assert_eq!(Color::from_name(" lgrey "), Some(Color::LightGrey));
        assert_eq!(Color::from_name("PUCE"), None);
    }

    #[test]
    fn default_style_is_white_on_blue_with_orange_highlight() {
        let style = Style::default();
        assert_eq!(style.resolve(false), (Color::White, Color::Blue));
        assert_eq!(style.resolve(true), (Color::Black, Color::Orange));
    }
}
