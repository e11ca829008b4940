//! Input routing between navigation mode and text-entry mode.
//!
//! Navigation moves the cursor and activates whatever action the cell under
//! it carries. While a text entry holds focus, keystrokes edit the entry
//! until Enter on a single-line entry or Escape releases it.

use std::time::Duration;

use tracing::debug;

use crate::{
    cursor::Cursor,
    geometry::GridPos,
    manager::WindowManager,
    menu::{InfoBar, MenuBar},
    style::Style,
    surface::GridSurface,
    window::glyphs,
    Action, ChildRef, Signal,
};

/// Keys the interface reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Return.
    Enter,
    /// Space bar.
    Space,
    /// Backspace.
    Backspace,
    /// Escape.
    Escape,
}

/// Input delivered to the interface once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiInput {
    /// A key was pressed.
    KeyDown(Key),
    /// A printable character was typed.
    Text(char),
    /// The pointer now rests over the provided cell.
    PointerMoved(GridPos),
    /// The pointer button was released over the provided cell.
    PointerReleased(GridPos),
}

/// Screen-wide state shared by every frame: the surface, cursor, focus, and
/// hover.
#[derive(Clone, Debug)]
pub struct UiContext {
    surface: GridSurface,
    cursor: Cursor,
    focus: Option<ChildRef>,
    hover: Option<ChildRef>,
}

impl UiContext {
    /// Creates a context for a screen of the provided size.
    #[must_use]
    pub fn new(columns: i32, rows: i32, background: Style) -> Self {
        Self {
            surface: GridSurface::new(columns, rows, background),
            cursor: Cursor::new(columns, rows),
            focus: None,
            hover: None,
        }
    }

    /// Surface painted by the last [`UiContext::render`].
    #[must_use]
    pub const fn surface(&self) -> &GridSurface {
        &self.surface
    }

    /// Grid cursor.
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Mutable grid cursor.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Text entry receiving keystrokes, if any.
    #[must_use]
    pub const fn focus(&self) -> Option<ChildRef> {
        self.focus
    }

    /// Interactive widget under the cursor, if any.
    #[must_use]
    pub const fn hover(&self) -> Option<ChildRef> {
        self.hover
    }

    /// Advances time-based effects.
    pub fn tick(&mut self, dt: Duration) {
        self.cursor.tick(dt);
    }

    /// Repaints the whole screen: windows, then bars, then the cursor.
    pub fn render(&mut self, windows: &WindowManager, menus: &MenuBar, info: &InfoBar) {
        self.surface.clear();
        windows.render(&mut self.surface);
        menus.draw(&mut self.surface);
        info.draw(&mut self.surface);

        let position = self.cursor.position();
        let blink = self.cursor.blink_on() && self.focus.is_none();
        if let Some(cell) = self.surface.cell_mut(position) {
            cell.highlighted = true;
            if blink {
                cell.glyph = glyphs::MEDIUM_FILL;
            }
        }
    }
}

/// Routes input to the cursor, menus, windows, and focused text entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionController;

impl InteractionController {
    /// Creates a controller.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies one input; signals of activated cells are appended to `out`.
    pub fn handle(
        &mut self,
        input: UiInput,
        ctx: &mut UiContext,
        windows: &mut WindowManager,
        menus: &mut MenuBar,
        out: &mut Vec<Signal>,
    ) {
        if let Some(focus) = ctx.focus {
            if windows.entry_mut(focus).is_none() {
                ctx.focus = None;
            }
        }

        match (ctx.focus, input) {
            (Some(focus), UiInput::KeyDown(key)) => edit_entry(ctx, windows, focus, key),
            (Some(focus), UiInput::Text(glyph)) => {
                if let Some(entry) = windows.entry_mut(focus) {
                    let _ = entry.insert(glyph);
                }
            }
            (Some(focus), UiInput::PointerReleased(pos)) => {
                release_focus(ctx, windows, focus);
                ctx.cursor.move_to(pos);
                activate(ctx, windows, menus, out);
            }
            (_, UiInput::PointerMoved(pos)) => ctx.cursor.move_to(pos),
            (None, UiInput::KeyDown(key)) => match key {
                Key::Up => {
                    let _ = ctx.cursor.move_by(0, -1);
                }
                Key::Down => {
                    let _ = ctx.cursor.move_by(0, 1);
                }
                Key::Left => {
                    let _ = ctx.cursor.move_by(-1, 0);
                }
                Key::Right => {
                    let _ = ctx.cursor.move_by(1, 0);
                }
                Key::Enter | Key::Space => activate(ctx, windows, menus, out),
                Key::Escape => menus.collapse_all(),
                Key::Backspace => {}
            },
            (None, UiInput::Text(_)) => {}
            (None, UiInput::PointerReleased(pos)) => {
                ctx.cursor.move_to(pos);
                activate(ctx, windows, menus, out);
            }
        }
    }

    /// Recomputes which interactive widget the cursor rests on.
    ///
    /// Only the top-most window under the cursor is considered, and only the
    /// visible part of each widget counts.
    pub fn refresh_hover(&mut self, ctx: &mut UiContext, windows: &mut WindowManager) {
        let position = ctx.cursor.position();
        let hovered = windows.window_at(position).and_then(|id| {
            let window = windows.window(id)?;
            window
                .children()
                .filter(|(_, widget)| widget.is_interactive())
                .find(|(widget, _)| {
                    window
                        .visible_portion(*widget)
                        .is_some_and(|rect| rect.contains(position))
                })
                .map(|(widget, _)| ChildRef::new(id, widget))
        });
        ctx.hover = hovered;
        windows.set_hover(hovered);
    }
}

fn edit_entry(ctx: &mut UiContext, windows: &mut WindowManager, focus: ChildRef, key: Key) {
    let Some(entry) = windows.entry_mut(focus) else {
        return;
    };
    match key {
        Key::Up => entry.move_caret(0, -1),
        Key::Down => entry.move_caret(0, 1),
        Key::Left => entry.move_caret(-1, 0),
        Key::Right => entry.move_caret(1, 0),
        Key::Backspace => {
            let _ = entry.backspace();
        }
        Key::Space => {
            let _ = entry.insert(' ');
        }
        Key::Enter => {
            if !entry.newline() && !entry.is_multiline() {
                release_focus(ctx, windows, focus);
            }
        }
        Key::Escape => release_focus(ctx, windows, focus),
    }
}

fn release_focus(ctx: &mut UiContext, windows: &mut WindowManager, focus: ChildRef) {
    if let Some(entry) = windows.entry_mut(focus) {
        entry.set_focused(false);
    }
    ctx.focus = None;
    debug!(window = focus.window.get(), widget = focus.widget.get(), "text entry released");
}

fn activate(
    ctx: &mut UiContext,
    windows: &mut WindowManager,
    menus: &mut MenuBar,
    out: &mut Vec<Signal>,
) {
    let position = ctx.cursor.position();
    let Some(action) = ctx.surface.action_at(position).cloned() else {
        menus.collapse_all();
        if let Some(window) = windows.window_at(position) {
            windows.raise(window);
        }
        return;
    };

    match action {
        Action::ToggleMenu(menu) => {
            menus.toggle(menu);
            return;
        }
        Action::CloseWindow(window) => windows.queue_destroy(window),
        Action::FocusEntry(child) => {
            if let Some(entry) = windows.entry_mut(child) {
                entry.set_focused(true);
                ctx.focus = Some(child);
                windows.raise(child.window);
                debug!(window = child.window.get(), widget = child.widget.get(), "text entry focused");
            }
        }
        Action::Scroll {
            window,
            columns,
            rows,
        } => {
            if let Some(window) = windows.window_mut(window) {
                window.scroll_view(columns, rows);
            }
        }
        Action::Emit(signal) => out.push(signal),
    }
    menus.collapse_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::GridRect,
        widget::{Button, TextEntry, Widget},
        window::Window,
    };

    struct Screen {
        ctx: UiContext,
        windows: WindowManager,
        menus: MenuBar,
        info: InfoBar,
        controller: InteractionController,
    }

    impl Screen {
        fn new() -> Self {
            Self {
                ctx: UiContext::new(40, 20, Style::default()),
                windows: WindowManager::new(40, 20),
                menus: MenuBar::new(),
                info: InfoBar::new(""),
                controller: InteractionController::new(),
            }
        }

        fn frame(&mut self, inputs: &[UiInput]) -> Vec<Signal> {
            let mut out = Vec::new();
            self.ctx.render(&self.windows, &self.menus, &self.info);
            for input in inputs {
                self.controller.handle(
                    *input,
                    &mut self.ctx,
                    &mut self.windows,
                    &mut self.menus,
                    &mut out,
                );
                self.ctx.render(&self.windows, &self.menus, &self.info);
            }
            self.controller.refresh_hover(&mut self.ctx, &mut self.windows);
            out
        }
    }

    #[test]
    fn clicking_a_button_emits_its_signal() {
        let mut screen = Screen::new();
        let mut window = Window::new(GridRect::new(2, 2, 12, 5), "W");
        let _ = window.add_child(Widget::Button(Button::new(
            GridPos::new(1, 1),
            "START",
            Style::default(),
            Action::Emit(Signal::new(7)),
        )));
        let _ = screen.windows.add_window(window).expect("fits");

        let signals = screen.frame(&[UiInput::PointerReleased(GridPos::new(5, 4))]);
        assert_eq!(signals, vec![Signal::new(7)]);
    }

    #[test]
    fn hover_ignores_clipped_parts_and_covered_windows() {
        let mut screen = Screen::new();
        let mut below = Window::new(GridRect::new(0, 1, 10, 4), "LOW");
        let _ = below.add_child(Widget::Button(Button::new(
            GridPos::new(5, 0),
            "LONGLABEL",
            Style::default(),
            Action::Emit(Signal::new(1)),
        )));
        let below = screen.windows.add_window(below).expect("fits");
        let _ = screen.frame(&[UiInput::PointerMoved(GridPos::new(6, 2))]);
        assert!(screen.ctx.hover().is_some_and(|hover| hover.window == below));

        let _ = screen.frame(&[UiInput::PointerMoved(GridPos::new(11, 2))]);
        assert_eq!(screen.ctx.hover(), None, "clipped part of the label");

        let _ = screen
            .windows
            .add_window(Window::new(GridRect::new(5, 0, 10, 6), "TOP"))
            .expect("fits");
        let _ = screen.frame(&[UiInput::PointerMoved(GridPos::new(6, 2))]);
        assert_eq!(screen.ctx.hover(), None, "covered by another window");
    }

    #[test]
    fn text_entry_captures_keys_until_released() {
        let mut screen = Screen::new();
        let mut window = Window::new(GridRect::new(0, 1, 20, 5), "NAME");
        let entry = window.add_child(Widget::TextEntry(TextEntry::new(
            GridPos::new(0, 0),
            10,
            1,
            "TYPE HERE",
            Some(8),
            Style::default(),
        )));
        let window = screen.windows.add_window(window).expect("fits");
        let child = ChildRef::new(window, entry);

        let _ = screen.frame(&[UiInput::PointerReleased(GridPos::new(1, 2))]);
        assert_eq!(screen.ctx.focus(), Some(child));

        let _ = screen.frame(&[
            UiInput::Text('H'),
            UiInput::KeyDown(Key::Space),
            UiInput::Text('I'),
            UiInput::KeyDown(Key::Right),
            UiInput::KeyDown(Key::Down),
        ]);
        assert_eq!(screen.ctx.cursor().position(), GridPos::new(1, 2));
        assert_eq!(
            screen.windows.entry_mut(child).map(|entry| entry.text()),
            Some("H I".to_owned())
        );

        let _ = screen.frame(&[UiInput::KeyDown(Key::Enter)]);
        assert_eq!(screen.ctx.focus(), None);
        assert!(screen
            .windows
            .entry_mut(child)
            .is_some_and(|entry| !entry.is_focused()));

        let _ = screen.frame(&[UiInput::KeyDown(Key::Down)]);
        assert_eq!(screen.ctx.cursor().position(), GridPos::new(1, 3));
    }

    #[test]
    fn multiline_entry_is_released_by_escape_only() {
        let mut screen = Screen::new();
        let mut window = Window::new(GridRect::new(0, 1, 20, 6), "MLINE");
        let entry = window.add_child(Widget::TextEntry(TextEntry::new(
            GridPos::new(0, 0),
            10,
            3,
            "",
            None,
            Style::default(),
        )));
        let window = screen.windows.add_window(window).expect("fits");
        let child = ChildRef::new(window, entry);

        let _ = screen.frame(&[
            UiInput::PointerReleased(GridPos::new(1, 2)),
            UiInput::Text('a'),
            UiInput::KeyDown(Key::Enter),
            UiInput::Text('b'),
        ]);
        assert_eq!(screen.ctx.focus(), Some(child));
        assert_eq!(
            screen.windows.entry_mut(child).map(|entry| entry.text()),
            Some("a\nb".to_owned())
        );

        let _ = screen.frame(&[UiInput::KeyDown(Key::Escape)]);
        assert_eq!(screen.ctx.focus(), None);
    }

    #[test]
    fn menu_items_fire_and_collapse_the_menu() {
        let mut screen = Screen::new();
        let file = screen.menus.add_menu("FILE", 0);
        screen
            .menus
            .add_item(file, crate::menu::MenuItem::new("Exit", Action::Emit(Signal::new(99))));

        let _ = screen.frame(&[UiInput::PointerReleased(GridPos::new(1, 0))]);
        assert_eq!(screen.menus.expanded(), Some(file));

        let signals = screen.frame(&[UiInput::PointerReleased(GridPos::new(2, 1))]);
        assert_eq!(signals, vec![Signal::new(99)]);
        assert_eq!(screen.menus.expanded(), None);
    }

    #[test]
    fn close_button_destroys_the_window_on_the_next_tick() {
        let mut screen = Screen::new();
        let window = screen
            .windows
            .add_window(Window::new(GridRect::new(0, 1, 10, 4), "X").with_close_button())
            .expect("fits");
        let _ = screen.frame(&[UiInput::PointerReleased(GridPos::new(8, 1))]);
        assert_eq!(screen.windows.tick(), vec![window]);
    }

    #[test]
    fn scroll_arrows_move_the_viewport() {
        let mut screen = Screen::new();
        let mut window = Window::new(GridRect::new(0, 1, 12, 6), "LOG").with_scrollbars(true, false);
        let lines: Vec<String> = (0..10).map(|line| format!("row {line}")).collect();
        let _ = window.add_child(Widget::Text(crate::widget::Text::new(
            GridPos::new(0, 0),
            &lines.join("\n"),
            Style::default(),
        )));
        let window = screen.windows.add_window(window).expect("fits");

        let _ = screen.frame(&[UiInput::PointerReleased(GridPos::new(11, 5))]);
        assert_eq!(
            screen.windows.window(window).map(|window| window.viewport().top),
            Some(1)
        );
    }
}
