//! Bordered, optionally scrollable windows hosting widgets.

use crate::{
    geometry::{GridPos, GridRect},
    style::{Color, Style},
    surface::{Cell, GridSurface},
    widget::{Element, Painter, Widget},
    Action, ChildRef, WidgetId, WindowId,
};

/// Box-drawing glyphs used for window chrome.
pub mod glyphs {
    /// Top-left corner.
    pub const TOP_LEFT: char = '\u{2554}';
    /// Top-right corner.
    pub const TOP_RIGHT: char = '\u{2557}';
    /// Bottom-left corner.
    pub const BOTTOM_LEFT: char = '\u{255A}';
    /// Bottom-right corner.
    pub const BOTTOM_RIGHT: char = '\u{255D}';
    /// Vertical edge.
    pub const VERTICAL: char = '\u{2551}';
    /// Horizontal edge.
    pub const HORIZONTAL: char = '\u{2550}';
    /// Light shade, used for scrollbar tracks.
    pub const LIGHT_FILL: char = '\u{2591}';
    /// Medium shade, used for the blinking cursor.
    pub const MEDIUM_FILL: char = '\u{2592}';
    /// Heavy shade.
    pub const HEAVY_FILL: char = '\u{2593}';
    /// Full block, used for scrollbar thumbs.
    pub const FULL_BLOCK: char = '\u{2588}';
    /// Scroll up arrow.
    pub const ARROW_UP: char = '\u{25B2}';
    /// Scroll down arrow.
    pub const ARROW_DOWN: char = '\u{25BC}';
    /// Scroll left arrow.
    pub const ARROW_LEFT: char = '\u{25C4}';
    /// Scroll right arrow.
    pub const ARROW_RIGHT: char = '\u{25BA}';
}

/// Start and length of a scrollbar thumb within its track.
///
/// Returns `None` when the content fits the viewport or the track is empty.
#[must_use]
pub fn scrollbar_thumb(
    position: i32,
    content_extent: i32,
    viewport_extent: i32,
    track: i32,
) -> Option<(i32, i32)> {
    if track <= 0 || viewport_extent <= 0 || content_extent <= viewport_extent {
        return None;
    }
    let length = (track * viewport_extent / content_extent).clamp(1, track);
    let travel = content_extent - viewport_extent;
    let position = position.clamp(0, travel);
    let offset = ((track - length) * position + travel / 2) / travel;
    Some((offset, length))
}

#[derive(Clone, Debug)]
struct Child {
    id: WidgetId,
    widget: Widget,
}

/// Rectangular container with a border, title, and scrollable content.
#[derive(Clone, Debug)]
pub struct Window {
    id: WindowId,
    area: GridRect,
    title: String,
    style: Style,
    border: Color,
    children: Vec<Child>,
    next_widget: u32,
    viewport: GridRect,
    vertical_scroll: bool,
    horizontal_scroll: bool,
    show_close: bool,
    always_on_top: bool,
    destroy: bool,
}

impl Window {
    /// Creates an empty window occupying `area`, border included.
    #[must_use]
    pub fn new(area: GridRect, title: impl Into<String>) -> Self {
        Self {
            id: WindowId::UNASSIGNED,
            area,
            title: title.into(),
            style: Style::default(),
            border: Color::LightGrey,
            children: Vec::new(),
            next_widget: 0,
            viewport: GridRect::new(0, 0, (area.width - 2).max(0), (area.height - 2).max(0)),
            vertical_scroll: false,
            horizontal_scroll: false,
            show_close: false,
            always_on_top: false,
            destroy: false,
        }
    }

    /// Sets the content colours.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the border colour.
    #[must_use]
    pub fn with_border(mut self, border: Color) -> Self {
        self.border = border;
        self
    }

    /// Enables scrolling along the requested axes.
    #[must_use]
    pub fn with_scrollbars(mut self, vertical: bool, horizontal: bool) -> Self {
        self.vertical_scroll = vertical;
        self.horizontal_scroll = horizontal;
        self
    }

    /// Shows a close button on the top border.
    #[must_use]
    pub fn with_close_button(mut self) -> Self {
        self.show_close = true;
        self
    }

    /// Keeps the window above every regular window.
    #[must_use]
    pub fn always_on_top(mut self) -> Self {
        self.always_on_top = true;
        self
    }

    /// Identifier assigned by the window manager.
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: WindowId) {
        self.id = id;
    }

    /// Screen area including the border.
    #[must_use]
    pub const fn area(&self) -> GridRect {
        self.area
    }

    /// Title shown on the top border.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replaces the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Content colours.
    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Whether the window stays above regular windows.
    #[must_use]
    pub const fn is_always_on_top(&self) -> bool {
        self.always_on_top
    }

    /// Whether the window waits to be purged.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroy
    }

    /// Marks the window for removal on the next manager tick and drops its
    /// children.
    pub fn queue_destroy(&mut self) {
        self.destroy = true;
        self.children.clear();
    }

    /// Adds a widget and returns its identifier within the window.
    pub fn add_child(&mut self, widget: Widget) -> WidgetId {
        let id = WidgetId::new(self.next_widget);
        self.next_widget += 1;
        self.children.push(Child { id, widget });
        id
    }

    /// Removes every widget and resets the viewport.
    pub fn clear_children(&mut self) {
        self.children.clear();
        self.viewport.left = 0;
        self.viewport.top = 0;
    }

    /// Widget with the provided identifier.
    #[must_use]
    pub fn child(&self, id: WidgetId) -> Option<&Widget> {
        self.children
            .iter()
            .find(|child| child.id == id)
            .map(|child| &child.widget)
    }

    /// Mutable widget with the provided identifier.
    pub fn child_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.children
            .iter_mut()
            .find(|child| child.id == id)
            .map(|child| &mut child.widget)
    }

    /// Iterates the widgets in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (WidgetId, &Widget)> + '_ {
        self.children.iter().map(|child| (child.id, &child.widget))
    }

    /// Visible region of the content, in content coordinates.
    #[must_use]
    pub const fn viewport(&self) -> GridRect {
        self.viewport
    }

    /// Bounding box of the viewport size and every child's extent.
    #[must_use]
    pub fn full_content(&self) -> GridRect {
        let base = GridRect::new(0, 0, self.viewport.width, self.viewport.height);
        self.children
            .iter()
            .fold(base, |full, child| full.union(&child.widget.bounds()))
    }

    /// Moves the viewport along the enabled axes, clamped to the content.
    pub fn scroll_view(&mut self, columns: i32, rows: i32) {
        if self.horizontal_scroll {
            self.viewport.left = self.viewport.left.saturating_add(columns);
        }
        if self.vertical_scroll {
            self.viewport.top = self.viewport.top.saturating_add(rows);
        }
        self.clamp_viewport();
    }

    /// Scrolls so the last content row is visible.
    pub fn scroll_to_bottom(&mut self) {
        let full = self.full_content();
        self.scroll_view(0, full.bottom() - self.viewport.bottom());
    }

    fn clamp_viewport(&mut self) {
        let full = self.full_content();
        if self.viewport.right() > full.right() {
            self.viewport.left = full.right() - self.viewport.width;
        }
        if self.viewport.left < full.left {
            self.viewport.left = full.left;
        }
        if self.viewport.bottom() > full.bottom() {
            self.viewport.top = full.bottom() - self.viewport.height;
        }
        if self.viewport.top < full.top {
            self.viewport.top = full.top;
        }
    }

    /// Screen rectangle inside the border.
    #[must_use]
    pub const fn interior(&self) -> GridRect {
        GridRect::new(
            self.area.left + 1,
            self.area.top + 1,
            self.viewport.width,
            self.viewport.height,
        )
    }

    /// Screen position of content coordinate (0, 0).
    #[must_use]
    pub const fn content_origin(&self) -> GridPos {
        GridPos::new(
            self.area.left + 1 - self.viewport.left,
            self.area.top + 1 - self.viewport.top,
        )
    }

    /// Screen rectangle of the part of a widget that is actually visible.
    #[must_use]
    pub fn visible_portion(&self, id: WidgetId) -> Option<GridRect> {
        let origin = self.content_origin();
        let bounds = self
            .child(id)?
            .bounds()
            .translate(origin.column, origin.row);
        bounds.intersection(&self.interior())
    }

    /// Title as drawn, truncated with `~` when it does not fit.
    #[must_use]
    pub fn display_title(&self) -> String {
        let room = usize::try_from(self.area.width - 4).unwrap_or(0);
        if self.title.chars().count() > room {
            let keep = usize::try_from(self.area.width - 5).unwrap_or(0);
            let mut shown: String = self.title.chars().take(keep).collect();
            shown.push('~');
            shown
        } else {
            self.title.clone()
        }
    }

    /// Paints the chrome and every visible widget.
    pub fn draw(&self, surface: &mut GridSurface) {
        if self.area.is_empty() {
            return;
        }
        surface.fill_rect(self.area, ' ', self.style);
        self.draw_border(surface);

        let mut painter = Painter::new(surface, self.content_origin(), self.interior());
        for child in &self.children {
            child
                .widget
                .paint(&mut painter, ChildRef::new(self.id, child.id));
        }

        if self.vertical_scroll {
            self.draw_vertical_scrollbar(surface);
        }
        if self.horizontal_scroll {
            self.draw_horizontal_scrollbar(surface);
        }
    }

    fn draw_border(&self, surface: &mut GridSurface) {
        let border = Style::new(self.border, self.style.bg);
        let area = self.area;
        let (right, bottom) = (area.right() - 1, area.bottom() - 1);
        for column in area.left + 1..right {
            surface.put(GridPos::new(column, area.top), glyphs::HORIZONTAL, border);
            surface.put(GridPos::new(column, bottom), glyphs::HORIZONTAL, border);
        }
        for row in area.top + 1..bottom {
            surface.put(GridPos::new(area.left, row), glyphs::VERTICAL, border);
            surface.put(GridPos::new(right, row), glyphs::VERTICAL, border);
        }
        surface.put(area.origin(), glyphs::TOP_LEFT, border);
        surface.put(GridPos::new(right, area.top), glyphs::TOP_RIGHT, border);
        surface.put(GridPos::new(area.left, bottom), glyphs::BOTTOM_LEFT, border);
        surface.put(GridPos::new(right, bottom), glyphs::BOTTOM_RIGHT, border);

        if !self.title.is_empty() {
            surface.write_str(
                GridPos::new(area.left + 1, area.top),
                &self.display_title(),
                Style::new(self.style.bg, self.border),
            );
        }

        if self.show_close {
            surface.set_cell(
                GridPos::new(right - 1, area.top),
                Cell {
                    glyph: 'X',
                    style: Style::new(Color::White, Color::Red),
                    highlighted: false,
                    action: Some(Action::CloseWindow(self.id)),
                },
            );
        }
    }

    fn draw_vertical_scrollbar(&self, surface: &mut GridSurface) {
        let column = self.area.right() - 1;
        let top = self.area.top + 1;
        let length = self.viewport.height;
        let full = self.full_content();
        self.draw_scrollbar(
            surface,
            length,
            |offset| GridPos::new(column, top + offset),
            (glyphs::ARROW_UP, glyphs::ARROW_DOWN),
            (
                Action::Scroll {
                    window: self.id,
                    columns: 0,
                    rows: -1,
                },
                Action::Scroll {
                    window: self.id,
                    columns: 0,
                    rows: 1,
                },
            ),
            scrollbar_thumb(
                self.viewport.top - full.top,
                full.height,
                self.viewport.height,
                length - 2,
            ),
        );
    }

    fn draw_horizontal_scrollbar(&self, surface: &mut GridSurface) {
        let row = self.area.bottom() - 1;
        let left = self.area.left + 1;
        let length = self.viewport.width;
        let full = self.full_content();
        self.draw_scrollbar(
            surface,
            length,
            |offset| GridPos::new(left + offset, row),
            (glyphs::ARROW_LEFT, glyphs::ARROW_RIGHT),
            (
                Action::Scroll {
                    window: self.id,
                    columns: -1,
                    rows: 0,
                },
                Action::Scroll {
                    window: self.id,
                    columns: 1,
                    rows: 0,
                },
            ),
            scrollbar_thumb(
                self.viewport.left - full.left,
                full.width,
                self.viewport.width,
                length - 2,
            ),
        );
    }

    fn draw_scrollbar(
        &self,
        surface: &mut GridSurface,
        length: i32,
        at: impl Fn(i32) -> GridPos,
        arrows: (char, char),
        actions: (Action, Action),
        thumb: Option<(i32, i32)>,
    ) {
        if length < 3 {
            return;
        }
        let style = Style::new(self.border, self.style.bg);
        let arrow = |glyph: char, action: Action| Cell {
            glyph,
            style,
            highlighted: false,
            action: Some(action),
        };
        surface.set_cell(at(0), arrow(arrows.0, actions.0));
        surface.set_cell(at(length - 1), arrow(arrows.1, actions.1));
        for offset in 1..length - 1 {
            let on_thumb = thumb.is_some_and(|(start, size)| {
                let track = offset - 1;
                track >= start && track < start + size
            });
            let glyph = if on_thumb {
                glyphs::FULL_BLOCK
            } else {
                glyphs::LIGHT_FILL
            };
            surface.put(at(offset), glyph, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Button, Text};
    use crate::Signal;

    fn numbered_lines(count: usize) -> String {
        (1..=count)
            .map(|line| format!("line {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn scrolling_window() -> Window {
        let mut window = Window::new(GridRect::new(0, 0, 24, 9), "LOG").with_scrollbars(true, false);
        let _ = window.add_child(Widget::Text(Text::new(
            GridPos::new(0, 0),
            &numbered_lines(20),
            Style::default(),
        )));
        window
    }

    #[test]
    fn scrolling_past_the_end_clamps_to_the_content() {
        let mut window = scrolling_window();
        assert_eq!(window.viewport().height, 7);
        assert_eq!(window.full_content().height, 20);

        window.scroll_view(0, 50);
        assert_eq!(window.viewport().bottom(), window.full_content().bottom());

        window.scroll_view(0, -100);
        assert_eq!(window.viewport().top, 0);
    }

    #[test]
    fn disabled_axes_do_not_scroll() {
        let mut window = scrolling_window();
        window.scroll_view(5, 0);
        assert_eq!(window.viewport().left, 0);
    }

    #[test]
    fn long_titles_are_truncated() {
        let window = Window::new(GridRect::new(0, 0, 10, 4), "VERY LONG TITLE");
        assert_eq!(window.display_title(), "VERY ~");
        let window = Window::new(GridRect::new(0, 0, 10, 4), "SHORT");
        assert_eq!(window.display_title(), "SHORT");
    }

    #[test]
    fn visible_portion_clips_a_widget_at_the_bottom_right() {
        let mut window = Window::new(GridRect::new(2, 2, 10, 6), "");
        let id = window.add_child(Widget::Text(Text::new(
            GridPos::new(6, 2),
            "abcdef\nabcdef\nabcdef\nabcdef",
            Style::default(),
        )));
        assert_eq!(window.visible_portion(id), Some(GridRect::new(9, 5, 2, 2)));

        let mut surface = GridSurface::new(20, 12, Style::default());
        window.draw(&mut surface);
        assert_eq!(surface.cell(GridPos::new(9, 5)).map(|cell| cell.glyph), Some('a'));
        assert_eq!(
            surface.cell(GridPos::new(11, 5)).map(|cell| cell.glyph),
            Some(glyphs::VERTICAL)
        );
        assert_eq!(
            surface.cell(GridPos::new(9, 7)).map(|cell| cell.glyph),
            Some(glyphs::HORIZONTAL)
        );
    }

    #[test]
    fn visible_portion_clips_a_widget_at_the_top_left_after_scrolling() {
        let mut window = Window::new(GridRect::new(0, 0, 6, 6), "").with_scrollbars(true, true);
        let id = window.add_child(Widget::Text(Text::new(
            GridPos::new(0, 0),
            &numbered_lines(10),
            Style::default(),
        )));
        window.scroll_view(2, 3);
        assert_eq!(window.viewport(), GridRect::new(2, 3, 4, 4));
        assert_eq!(window.visible_portion(id), Some(GridRect::new(1, 1, 4, 4)));
    }

    #[test]
    fn chrome_binds_close_and_scroll_actions() {
        let mut window = scrolling_window().with_close_button();
        window.assign_id(WindowId::new(4));
        let _ = window.add_child(Widget::Button(Button::new(
            GridPos::new(0, 0),
            "OK",
            Style::default(),
            Action::Emit(Signal::new(1)),
        )));
        let mut surface = GridSurface::new(30, 12, Style::default());
        window.draw(&mut surface);

        assert_eq!(
            surface.action_at(GridPos::new(22, 0)),
            Some(&Action::CloseWindow(WindowId::new(4)))
        );
        assert_eq!(
            surface.action_at(GridPos::new(23, 7)),
            Some(&Action::Scroll {
                window: WindowId::new(4),
                columns: 0,
                rows: 1
            })
        );
        assert_eq!(
            surface.cell(GridPos::new(23, 2)).map(|cell| cell.glyph),
            Some(glyphs::FULL_BLOCK)
        );
        assert_eq!(surface.row_text(0).chars().nth(1), Some('L'));
    }

    #[test]
    fn destroyed_windows_drop_their_children() {
        let mut window = scrolling_window();
        window.queue_destroy();
        assert!(window.is_destroyed());
        assert_eq!(window.children().count(), 0);
    }

    #[test]
    fn thumb_tracks_the_scroll_position() {
        assert_eq!(scrollbar_thumb(0, 5, 7, 5), None);
        assert_eq!(scrollbar_thumb(0, 20, 7, 5), Some((0, 1)));
        assert_eq!(scrollbar_thumb(13, 20, 7, 5), Some((4, 1)));
        assert_eq!(scrollbar_thumb(0, 14, 7, 10), Some((0, 5)));
        assert_eq!(scrollbar_thumb(7, 14, 7, 10), Some((5, 5)));
    }
}
