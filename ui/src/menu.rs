//! Menu bar along the top row and the info bar along the bottom row.

use crate::{
    geometry::{GridPos, GridRect},
    style::{Color, Style},
    surface::{Cell, GridSurface},
    Action, MenuId,
};

/// Label drawn for divider items.
pub const DIVIDER: &str = "------";

/// Entry in a drop-down menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    label: String,
    action: Option<Action>,
}

impl MenuItem {
    /// Creates an item triggering the provided action.
    #[must_use]
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action: Some(action),
        }
    }

    /// Creates an inert divider line.
    #[must_use]
    pub fn divider() -> Self {
        Self {
            label: DIVIDER.to_owned(),
            action: None,
        }
    }

    /// Label shown for the item.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Action bound to the item, `None` for dividers.
    #[must_use]
    pub const fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }
}

/// Drop-down menu with a title on the menu bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    id: MenuId,
    title: String,
    shortcut: usize,
    items: Vec<MenuItem>,
    expanded: bool,
}

impl Menu {
    /// Identifier of the menu.
    #[must_use]
    pub const fn id(&self) -> MenuId {
        self.id
    }

    /// Title shown on the bar.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Whether the drop-down is open.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Width of the drop-down, the longest of the title and items.
    #[must_use]
    pub fn expand_width(&self) -> i32 {
        let widest = self
            .items
            .iter()
            .map(|item| item.label.chars().count())
            .chain(std::iter::once(self.title.chars().count()))
            .max()
            .unwrap_or(0);
        i32::try_from(widest).unwrap_or(i32::MAX)
    }
}

/// Horizontal bar of menus; at most one menu is expanded at a time.
#[derive(Clone, Debug)]
pub struct MenuBar {
    menus: Vec<Menu>,
    style: Style,
    next_id: u32,
}

impl MenuBar {
    /// Creates an empty bar with black text on grey.
    #[must_use]
    pub fn new() -> Self {
        Self {
            menus: Vec::new(),
            style: Style::new(Color::Black, Color::Grey).with_highlight(Color::White, Color::Black),
            next_id: 0,
        }
    }

    /// Appends a menu; `shortcut` indexes the highlighted title character.
    pub fn add_menu(&mut self, title: impl Into<String>, shortcut: usize) -> MenuId {
        let id = MenuId::new(self.next_id);
        self.next_id += 1;
        self.menus.push(Menu {
            id,
            title: title.into(),
            shortcut,
            items: Vec::new(),
            expanded: false,
        });
        id
    }

    /// Appends an item to a menu; unknown menus are ignored.
    pub fn add_item(&mut self, menu: MenuId, item: MenuItem) {
        if let Some(menu) = self.menus.iter_mut().find(|candidate| candidate.id == menu) {
            menu.items.push(item);
        }
    }

    /// Menus in bar order.
    #[must_use]
    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    /// Expands a collapsed menu and collapses every other one, or collapses
    /// it when it is already open.
    pub fn toggle(&mut self, menu: MenuId) {
        for candidate in &mut self.menus {
            candidate.expanded = candidate.id == menu && !candidate.expanded;
        }
    }

    /// Collapses every menu.
    pub fn collapse_all(&mut self) {
        for menu in &mut self.menus {
            menu.expanded = false;
        }
    }

    /// Menu currently expanded, if any.
    #[must_use]
    pub fn expanded(&self) -> Option<MenuId> {
        self.menus
            .iter()
            .find(|menu| menu.expanded)
            .map(|menu| menu.id)
    }

    /// Screen column each menu title starts at.
    fn title_columns(&self) -> impl Iterator<Item = (i32, &Menu)> + '_ {
        self.menus.iter().scan(1, |column, menu| {
            let start = *column;
            *column += i32::try_from(menu.title.chars().count()).unwrap_or(0) + 2;
            Some((start, menu))
        })
    }

    /// Drop-down area of the expanded menu.
    #[must_use]
    pub fn dropdown_area(&self) -> Option<GridRect> {
        self.title_columns()
            .find(|(_, menu)| menu.expanded)
            .map(|(column, menu)| {
                let height = i32::try_from(menu.items.len()).unwrap_or(0);
                GridRect::new(column, 1, menu.expand_width(), height)
            })
    }

    /// Paints the bar across the top row and the expanded drop-down.
    pub fn draw(&self, surface: &mut GridSurface) {
        surface.fill_rect(
            GridRect::new(0, 0, surface.columns(), 1),
            ' ',
            self.style,
        );
        for (column, menu) in self.title_columns() {
            let action = Action::ToggleMenu(menu.id);
            for (offset, glyph) in (0..).zip(menu.title.chars()) {
                let shortcut = usize::try_from(offset).is_ok_and(|index| index == menu.shortcut);
                surface.set_cell(
                    GridPos::new(column + offset, 0),
                    Cell {
                        glyph,
                        style: self.style,
                        highlighted: shortcut || menu.expanded,
                        action: Some(action.clone()),
                    },
                );
            }
            if menu.expanded {
                self.draw_dropdown(surface, column, menu);
            }
        }
    }

    fn draw_dropdown(&self, surface: &mut GridSurface, column: i32, menu: &Menu) {
        let width = menu.expand_width();
        let style = Style::new(Color::Black, Color::LightGrey)
            .with_highlight(self.style.highlight_fg, self.style.highlight_bg);
        for (row, item) in (1..).zip(&menu.items) {
            let mut glyphs = item.label.chars();
            for offset in 0..width {
                surface.set_cell(
                    GridPos::new(column + offset, row),
                    Cell {
                        glyph: glyphs.next().unwrap_or(' '),
                        style,
                        highlighted: false,
                        action: item.action.clone(),
                    },
                );
            }
        }
    }
}

impl Default for MenuBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Single line of status text along the bottom row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoBar {
    text: String,
    style: Style,
}

impl InfoBar {
    /// Creates a bar showing the provided text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::new(Color::LightGrey, Color::Black),
        }
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Text currently shown.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Paints the bar across the bottom row.
    pub fn draw(&self, surface: &mut GridSurface) {
        let row = surface.rows() - 1;
        surface.fill_rect(GridRect::new(0, row, surface.columns(), 1), ' ', self.style);
        surface.write_str(GridPos::new(1, row), &self.text, self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signal;

    fn file_menu() -> (MenuBar, MenuId, MenuId) {
        let mut bar = MenuBar::new();
        let file = bar.add_menu("FILE", 0);
        let help = bar.add_menu("HELP", 0);
        bar.add_item(file, MenuItem::new("New...", Action::Emit(Signal::new(1))));
        bar.add_item(file, MenuItem::divider());
        bar.add_item(file, MenuItem::new("Exit", Action::Emit(Signal::new(2))));
        (bar, file, help)
    }

    #[test]
    fn only_one_menu_is_expanded() {
        let (mut bar, file, help) = file_menu();
        bar.toggle(file);
        assert_eq!(bar.expanded(), Some(file));
        bar.toggle(help);
        assert_eq!(bar.expanded(), Some(help));
        assert_eq!(bar.menus().iter().filter(|menu| menu.is_expanded()).count(), 1);
        bar.toggle(help);
        assert_eq!(bar.expanded(), None);
    }

    #[test]
    fn dropdown_is_as_wide_as_the_longest_entry() {
        let (mut bar, file, _) = file_menu();
        bar.toggle(file);
        assert_eq!(bar.dropdown_area(), Some(GridRect::new(1, 1, 6, 3)));

        let mut surface = GridSurface::new(20, 6, Style::default());
        bar.draw(&mut surface);
        assert_eq!(surface.row_text(0), " FILE  HELP         ");
        assert_eq!(&surface.row_text(2)[1..7], DIVIDER);
        assert_eq!(
            surface.action_at(GridPos::new(6, 3)),
            Some(&Action::Emit(Signal::new(2)))
        );
        assert_eq!(surface.action_at(GridPos::new(3, 2)), None);
        assert_eq!(
            surface.action_at(GridPos::new(7, 0)),
            Some(&Action::ToggleMenu(MenuId::new(1)))
        );
    }

    #[test]
    fn info_bar_writes_the_bottom_row() {
        let mut surface = GridSurface::new(12, 3, Style::default());
        InfoBar::new("READY").draw(&mut surface);
        assert_eq!(surface.row_text(2), " READY      ");
        let cell = surface.cell(GridPos::new(0, 2));
        assert_eq!(cell.map(Cell::colors), Some((Color::LightGrey, Color::Black)));
    }
}
