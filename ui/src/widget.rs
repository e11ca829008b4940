//! Widgets hosted inside windows.
//!
//! Widgets are laid out in window content coordinates. The [`Painter`] maps
//! them onto the surface and clips every cell against the window viewport.

use crate::{
    geometry::{GridPos, GridRect},
    style::Style,
    surface::{Cell, GridSurface},
    Action, ChildRef,
};

/// Full block used for completed progress.
pub const PROGRESS_FULL: char = '\u{2588}';
/// Half block used for a half-completed progress cell.
pub const PROGRESS_HALF: char = '\u{258C}';

/// Paints widget cells onto a surface, clipped to a screen rectangle.
#[derive(Debug)]
pub struct Painter<'a> {
    surface: &'a mut GridSurface,
    origin: GridPos,
    clip: GridRect,
}

impl<'a> Painter<'a> {
    /// Creates a painter whose content origin sits at `origin` on screen.
    ///
    /// Cells outside `clip` or outside the surface are discarded.
    pub fn new(surface: &'a mut GridSurface, origin: GridPos, clip: GridRect) -> Self {
        let clip = clip
            .intersection(&surface.bounds())
            .unwrap_or_default();
        Self {
            surface,
            origin,
            clip,
        }
    }

    /// Screen position of a content position.
    #[must_use]
    pub const fn to_screen(&self, pos: GridPos) -> GridPos {
        pos.offset(self.origin.column, self.origin.row)
    }

    /// Writes one cell at a content position.
    pub fn put(
        &mut self,
        pos: GridPos,
        glyph: char,
        style: Style,
        highlighted: bool,
        action: Option<&Action>,
    ) {
        let screen = self.to_screen(pos);
        if !self.clip.contains(screen) {
            return;
        }
        self.surface.set_cell(
            screen,
            Cell {
                glyph,
                style,
                highlighted,
                action: action.cloned(),
            },
        );
    }

    /// Writes a string left to right starting at a content position.
    pub fn text(
        &mut self,
        pos: GridPos,
        text: &str,
        style: Style,
        highlighted: bool,
        action: Option<&Action>,
    ) {
        for (offset, glyph) in (0..).zip(text.chars()) {
            self.put(pos.offset(offset, 0), glyph, style, highlighted, action);
        }
    }
}

/// Capability shared by everything a window can host.
pub trait Element {
    /// Cells covered by the element, in content coordinates.
    fn bounds(&self) -> GridRect;

    /// Draws the element.
    fn paint(&self, painter: &mut Painter<'_>, owner: ChildRef);

    /// Behaviour triggered when one of the element's cells is activated.
    fn activation(&self, _owner: ChildRef) -> Option<Action> {
        None
    }

    /// Updates the hover state of the element.
    fn set_hovered(&mut self, _hovered: bool) {}
}

fn text_width(text: &str) -> i32 {
    i32::try_from(text.chars().count()).unwrap_or(i32::MAX)
}

/// Static, optionally multi-line text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    origin: GridPos,
    lines: Vec<String>,
    style: Style,
    highlighted: bool,
}

impl Text {
    /// Creates a text block; `\n` separates lines.
    #[must_use]
    pub fn new(origin: GridPos, text: &str, style: Style) -> Self {
        Self {
            origin,
            lines: text.split('\n').map(str::to_owned).collect(),
            style,
            highlighted: false,
        }
    }

    /// Draws the text with the highlight colours.
    #[must_use]
    pub fn highlighted(mut self) -> Self {
        self.highlighted = true;
        self
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_owned).collect();
    }

    /// Appends a line at the bottom.
    pub fn push_line(&mut self, line: impl Into<String>) {
        if self.lines.len() == 1 && self.lines[0].is_empty() {
            self.lines.clear();
        }
        self.lines.push(line.into());
    }

    /// Lines of the block.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Element for Text {
    fn bounds(&self) -> GridRect {
        let width = self.lines.iter().map(|line| text_width(line)).max().unwrap_or(0);
        let height = i32::try_from(self.lines.len()).unwrap_or(i32::MAX);
        GridRect::new(self.origin.column, self.origin.row, width, height)
    }

    fn paint(&self, painter: &mut Painter<'_>, _owner: ChildRef) {
        for (row, line) in (0..).zip(&self.lines) {
            painter.text(
                self.origin.offset(0, row),
                line,
                self.style,
                self.highlighted,
                None,
            );
        }
    }
}

/// Single-line clickable label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    origin: GridPos,
    label: String,
    style: Style,
    action: Action,
    highlight_on_hover: bool,
    hovered: bool,
}

impl Button {
    /// Creates a button triggering the provided action.
    #[must_use]
    pub fn new(origin: GridPos, label: impl Into<String>, style: Style, action: Action) -> Self {
        Self {
            origin,
            label: label.into(),
            style,
            action,
            highlight_on_hover: false,
            hovered: false,
        }
    }

    /// Draws the button with the highlight colours while hovered.
    #[must_use]
    pub fn highlight_on_hover(mut self) -> Self {
        self.highlight_on_hover = true;
        self
    }

    /// Label shown on the button.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the cursor currently rests on the button.
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }
}

impl Element for Button {
    fn bounds(&self) -> GridRect {
        GridRect::new(self.origin.column, self.origin.row, text_width(&self.label), 1)
    }

    fn paint(&self, painter: &mut Painter<'_>, _owner: ChildRef) {
        let highlighted = self.highlight_on_hover && self.hovered;
        painter.text(
            self.origin,
            &self.label,
            self.style,
            highlighted,
            Some(&self.action),
        );
    }

    fn activation(&self, _owner: ChildRef) -> Option<Action> {
        Some(self.action.clone())
    }

    fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }
}

/// Horizontal bar filled in half-cell steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressBar {
    origin: GridPos,
    width: i32,
    value: u32,
    max: u32,
    style: Style,
}

impl ProgressBar {
    /// Creates an empty bar.
    #[must_use]
    pub fn new(origin: GridPos, width: i32, max: u32, style: Style) -> Self {
        Self {
            origin,
            width: width.max(0),
            value: 0,
            max: max.max(1),
            style,
        }
    }

    /// Sets the progress, clamped to the maximum.
    pub fn set_value(&mut self, value: u32) {
        self.value = value.min(self.max);
    }

    /// Sets the value the bar fills up to.
    pub fn set_max(&mut self, max: u32) {
        self.max = max.max(1);
        self.value = self.value.min(self.max);
    }

    /// Current progress.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Number of half cells covered by the current progress.
    #[must_use]
    pub fn filled_halves(&self) -> i32 {
        let width = u64::try_from(self.width).unwrap_or(0);
        let halves = width * 2 * u64::from(self.value) / u64::from(self.max);
        i32::try_from(halves).unwrap_or(self.width * 2)
    }
}

impl Element for ProgressBar {
    fn bounds(&self) -> GridRect {
        GridRect::new(self.origin.column, self.origin.row, self.width, 1)
    }

    fn paint(&self, painter: &mut Painter<'_>, _owner: ChildRef) {
        let halves = self.filled_halves();
        for column in 0..self.width {
            let glyph = match halves - column * 2 {
                n if n >= 2 => PROGRESS_FULL,
                1 => PROGRESS_HALF,
                _ => ' ',
            };
            painter.put(self.origin.offset(column, 0), glyph, self.style, false, None);
        }
    }
}

/// Editable text field, single- or multi-line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEntry {
    origin: GridPos,
    width: i32,
    height: i32,
    placeholder: String,
    max_length: Option<usize>,
    style: Style,
    lines: Vec<String>,
    caret: GridPos,
    focused: bool,
}

impl TextEntry {
    /// Creates an empty entry; a height above one makes it multi-line.
    #[must_use]
    pub fn new(
        origin: GridPos,
        width: i32,
        height: i32,
        placeholder: impl Into<String>,
        max_length: Option<usize>,
        style: Style,
    ) -> Self {
        Self {
            origin,
            width: width.max(1),
            height: height.max(1),
            placeholder: placeholder.into(),
            max_length,
            style,
            lines: vec![String::new()],
            caret: GridPos::default(),
            focused: false,
        }
    }

    /// Whether the entry accepts line breaks.
    #[must_use]
    pub const fn is_multiline(&self) -> bool {
        self.height > 1
    }

    /// Whether the entry currently receives keystrokes.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Grants or revokes keyboard focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Entered text with lines joined by `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Caret position in content columns and lines.
    #[must_use]
    pub const fn caret(&self) -> GridPos {
        self.caret
    }

    fn length(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum::<usize>() + self.lines.len() - 1
    }

    fn line_len(&self, row: i32) -> i32 {
        usize::try_from(row)
            .ok()
            .and_then(|row| self.lines.get(row))
            .map_or(0, |line| text_width(line))
    }

    fn current_line(&mut self) -> Option<&mut String> {
        let row = usize::try_from(self.caret.row).ok()?;
        self.lines.get_mut(row)
    }

    fn byte_index(line: &str, column: i32) -> usize {
        let column = usize::try_from(column).unwrap_or(0);
        line.char_indices()
            .nth(column)
            .map_or(line.len(), |(index, _)| index)
    }

    /// Inserts a character at the caret; returns `false` when it was refused.
    pub fn insert(&mut self, glyph: char) -> bool {
        if glyph == '\n' {
            return self.newline();
        }
        if glyph.is_control() {
            return false;
        }
        if self.max_length.is_some_and(|max| self.length() >= max) {
            return false;
        }
        if self.line_len(self.caret.row) >= self.width {
            return false;
        }
        let column = self.caret.column;
        let Some(line) = self.current_line() else {
            return false;
        };
        let index = Self::byte_index(line, column);
        line.insert(index, glyph);
        self.caret.column += 1;
        true
    }

    /// Splits the line at the caret; single-line entries refuse and return `false`.
    pub fn newline(&mut self) -> bool {
        if !self.is_multiline() {
            return false;
        }
        if i32::try_from(self.lines.len()).unwrap_or(i32::MAX) >= self.height {
            return false;
        }
        if self.max_length.is_some_and(|max| self.length() >= max) {
            return false;
        }
        let column = self.caret.column;
        let Some(line) = self.current_line() else {
            return false;
        };
        let index = Self::byte_index(line, column);
        let rest = line.split_off(index);
        let row = usize::try_from(self.caret.row).unwrap_or(0) + 1;
        self.lines.insert(row, rest);
        self.caret = GridPos::new(0, self.caret.row + 1);
        true
    }

    /// Removes the character before the caret, joining lines at a line start.
    pub fn backspace(&mut self) -> bool {
        if self.caret.column > 0 {
            let column = self.caret.column - 1;
            let Some(line) = self.current_line() else {
                return false;
            };
            let index = Self::byte_index(line, column);
            let _ = line.remove(index);
            self.caret.column = column;
            return true;
        }
        if self.caret.row == 0 {
            return false;
        }
        let row = usize::try_from(self.caret.row).unwrap_or(0);
        let tail = self.lines.remove(row);
        let previous_len = self.line_len(self.caret.row - 1);
        self.caret = GridPos::new(previous_len, self.caret.row - 1);
        if let Some(line) = self.current_line() {
            line.push_str(&tail);
        }
        true
    }

    /// Moves the caret, clamped to the entered text.
    pub fn move_caret(&mut self, columns: i32, rows: i32) {
        let last_row = i32::try_from(self.lines.len()).unwrap_or(1) - 1;
        let row = (self.caret.row + rows).clamp(0, last_row);
        let column = (self.caret.column + columns).clamp(0, self.line_len(row));
        self.caret = GridPos::new(column, row);
    }
}

impl Element for TextEntry {
    fn bounds(&self) -> GridRect {
        GridRect::new(self.origin.column, self.origin.row, self.width, self.height)
    }

    fn paint(&self, painter: &mut Painter<'_>, owner: ChildRef) {
        let action = self.activation(owner);
        let show_placeholder = !self.focused && self.lines.iter().all(String::is_empty);
        for row in 0..self.height {
            let line = if show_placeholder {
                (row == 0).then_some(self.placeholder.as_str())
            } else {
                usize::try_from(row)
                    .ok()
                    .and_then(|row| self.lines.get(row))
                    .map(String::as_str)
            };
            let mut glyphs = line.unwrap_or("").chars();
            for column in 0..self.width {
                let glyph = glyphs.next().unwrap_or(' ');
                let caret = self.focused && self.caret == GridPos::new(column, row);
                painter.put(
                    self.origin.offset(column, row),
                    glyph,
                    self.style,
                    caret,
                    action.as_ref(),
                );
            }
        }
    }

    fn activation(&self, owner: ChildRef) -> Option<Action> {
        Some(Action::FocusEntry(owner))
    }
}

/// Every widget kind a window can host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Widget {
    /// Static text.
    Text(Text),
    /// Clickable label.
    Button(Button),
    /// Progress bar.
    ProgressBar(ProgressBar),
    /// Editable text field.
    TextEntry(TextEntry),
}

impl Widget {
    fn element(&self) -> &dyn Element {
        match self {
            Self::Text(text) => text,
            Self::Button(button) => button,
            Self::ProgressBar(bar) => bar,
            Self::TextEntry(entry) => entry,
        }
    }

    fn element_mut(&mut self) -> &mut dyn Element {
        match self {
            Self::Text(text) => text,
            Self::Button(button) => button,
            Self::ProgressBar(bar) => bar,
            Self::TextEntry(entry) => entry,
        }
    }

    /// Whether activating the widget does anything.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        matches!(self, Self::Button(_) | Self::TextEntry(_))
    }
}

impl Element for Widget {
    fn bounds(&self) -> GridRect {
        self.element().bounds()
    }

    fn paint(&self, painter: &mut Painter<'_>, owner: ChildRef) {
        self.element().paint(painter, owner);
    }

    fn activation(&self, owner: ChildRef) -> Option<Action> {
        self.element().activation(owner)
    }

    fn set_hovered(&mut self, hovered: bool) {
        self.element_mut().set_hovered(hovered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Signal, WidgetId, WindowId};

    fn owner() -> ChildRef {
        ChildRef::new(WindowId::new(0), WidgetId::new(0))
    }

    #[test]
    fn painter_clips_to_the_viewport() {
        let mut surface = GridSurface::new(10, 4, Style::default());
        let mut painter = Painter::new(
            &mut surface,
            GridPos::new(1, 1),
            GridRect::new(1, 1, 3, 2),
        );
        Text::new(GridPos::new(0, 0), "abcdef\nghijkl\nmnopqr", Style::default())
            .paint(&mut painter, owner());
        assert_eq!(surface.row_text(0), "          ");
        assert_eq!(surface.row_text(1), " abc      ");
        assert_eq!(surface.row_text(2), " ghi      ");
        assert_eq!(surface.row_text(3), "          ");
    }

    #[test]
    fn button_cells_carry_its_action() {
        let mut surface = GridSurface::new(8, 1, Style::default());
        let action = Action::Emit(Signal::new(9));
        let mut painter = Painter::new(&mut surface, GridPos::new(0, 0), GridRect::new(0, 0, 8, 1));
        Button::new(GridPos::new(2, 0), "GO", Style::default(), action.clone())
            .paint(&mut painter, owner());
        assert_eq!(surface.action_at(GridPos::new(2, 0)), Some(&action));
        assert_eq!(surface.action_at(GridPos::new(3, 0)), Some(&action));
        assert_eq!(surface.action_at(GridPos::new(4, 0)), None);
    }

    #[test]
    fn progress_fills_in_half_cells() {
        let mut bar = ProgressBar::new(GridPos::new(0, 0), 4, 8, Style::default());
        bar.set_value(3);
        assert_eq!(bar.filled_halves(), 3);
        let mut surface = GridSurface::new(4, 1, Style::default());
        let mut painter = Painter::new(&mut surface, GridPos::new(0, 0), GridRect::new(0, 0, 4, 1));
        bar.paint(&mut painter, owner());
        assert_eq!(surface.row_text(0), "\u{2588}\u{258C}  ");

        bar.set_value(100);
        assert_eq!(bar.value(), 8);
        assert_eq!(bar.filled_halves(), 8);
    }

    #[test]
    fn single_line_entry_refuses_newlines_and_overflow() {
        let mut entry = TextEntry::new(GridPos::new(0, 0), 3, 1, "NAME", Some(10), Style::default());
        assert!(entry.insert('a'));
        assert!(entry.insert('b'));
        assert!(!entry.newline());
        assert!(entry.insert('c'));
        assert!(!entry.insert('d'));
        assert_eq!(entry.text(), "abc");
        entry.move_caret(-1, 0);
        assert!(entry.backspace());
        assert_eq!(entry.text(), "ac");
        assert_eq!(entry.caret(), GridPos::new(1, 0));
    }

    #[test]
    fn multiline_entry_splits_and_joins_lines() {
        let mut entry = TextEntry::new(GridPos::new(0, 0), 10, 3, "", Some(5), Style::default());
        for glyph in "abc".chars() {
            assert!(entry.insert(glyph));
        }
        entry.move_caret(-1, 0);
        assert!(entry.newline());
        assert_eq!(entry.text(), "ab\nc");
        assert!(entry.insert('d'));
        assert!(!entry.insert('e'), "max length counts the line break");
        entry.move_caret(-5, 0);
        assert!(entry.backspace());
        assert_eq!(entry.text(), "abdc");
        assert_eq!(entry.caret(), GridPos::new(2, 0));
    }

    #[test]
    fn placeholder_shows_only_while_unfocused_and_empty() {
        let mut entry = TextEntry::new(GridPos::new(0, 0), 6, 1, "NAME", None, Style::default());
        let mut surface = GridSurface::new(6, 1, Style::default());
        let clip = GridRect::new(0, 0, 6, 1);
        entry.paint(&mut Painter::new(&mut surface, GridPos::new(0, 0), clip), owner());
        assert_eq!(surface.row_text(0), "NAME  ");
        assert_eq!(
            surface.action_at(GridPos::new(5, 0)),
            Some(&Action::FocusEntry(owner()))
        );

        entry.set_focused(true);
        entry.paint(&mut Painter::new(&mut surface, GridPos::new(0, 0), clip), owner());
        assert_eq!(surface.row_text(0), "      ");
        assert!(surface
            .cell(GridPos::new(0, 0))
            .is_some_and(|cell| cell.highlighted));
    }
}
