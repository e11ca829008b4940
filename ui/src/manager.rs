//! Z-ordered window registry.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    geometry::GridPos,
    surface::GridSurface,
    widget::{Element, TextEntry, Widget},
    window::Window,
    ChildRef, WindowId,
};

/// Reasons a window is refused by the manager.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The window does not fit the usable screen area.
    #[error("window '{title}' is {width}x{height}, larger than the {max_width}x{max_height} screen area")]
    WindowTooLarge {
        /// Title of the rejected window.
        title: String,
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
        /// Widest accepted window.
        max_width: i32,
        /// Tallest accepted window.
        max_height: i32,
    },
}

/// Owns every window; later windows are drawn above earlier ones.
#[derive(Clone, Debug)]
pub struct WindowManager {
    columns: i32,
    rows: i32,
    windows: Vec<Window>,
    next_id: u32,
}

impl WindowManager {
    /// Creates a manager for a screen of the provided size.
    #[must_use]
    pub const fn new(columns: i32, rows: i32) -> Self {
        Self {
            columns,
            rows,
            windows: Vec::new(),
            next_id: 0,
        }
    }

    /// Largest accepted window, leaving room for the menu and info bars.
    #[must_use]
    pub const fn max_window_size(&self) -> (i32, i32) {
        (self.columns - 2, self.rows - 3)
    }

    /// Registers a window and makes it the active one.
    ///
    /// Always-on-top windows stay above it.
    pub fn add_window(&mut self, mut window: Window) -> Result<WindowId, LayoutError> {
        let (max_width, max_height) = self.max_window_size();
        let area = window.area();
        if area.width > max_width || area.height > max_height {
            warn!(
                title = window.title(),
                width = area.width,
                height = area.height,
                "window larger than the screen rejected"
            );
            return Err(LayoutError::WindowTooLarge {
                title: window.title().to_owned(),
                width: area.width,
                height: area.height,
                max_width,
                max_height,
            });
        }

        let id = WindowId::new(self.next_id);
        self.next_id += 1;
        window.assign_id(id);
        debug!(window = id.get(), title = window.title(), "window added");
        if window.is_always_on_top() {
            self.windows.push(window);
        } else {
            let index = self.first_pinned_index();
            self.windows.insert(index, window);
        }
        Ok(id)
    }

    fn first_pinned_index(&self) -> usize {
        self.windows
            .iter()
            .position(Window::is_always_on_top)
            .unwrap_or(self.windows.len())
    }

    /// Marks a window for removal on the next [`WindowManager::tick`].
    pub fn queue_destroy(&mut self, id: WindowId) {
        if let Some(window) = self.window_mut(id) {
            window.queue_destroy();
        }
    }

    /// Marks every window for removal.
    pub fn queue_destroy_all(&mut self) {
        for window in &mut self.windows {
            window.queue_destroy();
        }
    }

    /// Purges windows queued for removal and returns their identifiers.
    pub fn tick(&mut self) -> Vec<WindowId> {
        let purged: Vec<_> = self
            .windows
            .iter()
            .filter(|window| window.is_destroyed())
            .map(Window::id)
            .collect();
        self.windows.retain(|window| !window.is_destroyed());
        for id in &purged {
            debug!(window = id.get(), "window purged");
        }
        purged
    }

    /// Moves a window to the top of its layer.
    pub fn raise(&mut self, id: WindowId) {
        let Some(index) = self.windows.iter().position(|window| window.id() == id) else {
            return;
        };
        let window = self.windows.remove(index);
        if window.is_always_on_top() {
            self.windows.push(window);
        } else {
            let target = self.first_pinned_index();
            self.windows.insert(target, window);
        }
    }

    /// Window with the provided identifier.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|window| window.id() == id)
    }

    /// Mutable window with the provided identifier.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|window| window.id() == id)
    }

    /// Iterates live windows from bottom to top.
    pub fn windows(&self) -> impl DoubleEndedIterator<Item = &Window> + '_ {
        self.windows.iter().filter(|window| !window.is_destroyed())
    }

    /// Top-most regular window.
    #[must_use]
    pub fn active(&self) -> Option<WindowId> {
        self.windows()
            .rev()
            .find(|window| !window.is_always_on_top())
            .map(Window::id)
    }

    /// Top-most live window covering the provided cell.
    #[must_use]
    pub fn window_at(&self, pos: GridPos) -> Option<WindowId> {
        self.windows()
            .rev()
            .find(|window| window.area().contains(pos))
            .map(Window::id)
    }

    /// Number of registered windows, including ones awaiting purge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Reports whether no windows are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Text entry addressed by a child reference.
    pub fn entry_mut(&mut self, child: ChildRef) -> Option<&mut TextEntry> {
        match self.window_mut(child.window)?.child_mut(child.widget)? {
            Widget::TextEntry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Sets the hover flag on exactly the referenced widget.
    pub fn set_hover(&mut self, hovered: Option<ChildRef>) {
        for window in &mut self.windows {
            let window_id = window.id();
            let ids: Vec<_> = window.children().map(|(id, _)| id).collect();
            for widget in ids {
                let is_hovered = hovered == Some(ChildRef::new(window_id, widget));
                if let Some(child) = window.child_mut(widget) {
                    child.set_hovered(is_hovered);
                }
            }
        }
    }

    /// Draws live windows from bottom to top.
    pub fn render(&self, surface: &mut GridSurface) {
        for window in self.windows() {
            window.draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridRect;

    #[test]
    fn oversize_windows_are_rejected() {
        let mut manager = WindowManager::new(80, 30);
        assert_eq!(manager.max_window_size(), (78, 27));
        let error = manager
            .add_window(Window::new(GridRect::new(0, 0, 79, 10), "WIDE"))
            .expect_err("too wide");
        assert!(matches!(error, LayoutError::WindowTooLarge { max_width: 78, .. }));
        assert!(manager.is_empty());
        assert!(manager
            .add_window(Window::new(GridRect::new(0, 0, 78, 27), "FITS"))
            .is_ok());
    }

    #[test]
    fn destroyed_windows_are_purged_exactly_once() {
        let mut manager = WindowManager::new(80, 30);
        let id = manager
            .add_window(Window::new(GridRect::new(1, 1, 10, 5), "TEMP"))
            .expect("fits");
        manager.queue_destroy(id);
        assert_eq!(manager.windows().count(), 0);
        assert_eq!(manager.tick(), vec![id]);
        assert!(manager.tick().is_empty());
        assert!(manager.window(id).is_none());
    }

    #[test]
    fn new_windows_become_active_below_pinned_ones() {
        let mut manager = WindowManager::new(80, 30);
        let pinned = manager
            .add_window(Window::new(GridRect::new(0, 0, 10, 5), "PIN").always_on_top())
            .expect("fits");
        let first = manager
            .add_window(Window::new(GridRect::new(0, 0, 10, 5), "A"))
            .expect("fits");
        let second = manager
            .add_window(Window::new(GridRect::new(0, 0, 10, 5), "B"))
            .expect("fits");
        assert_eq!(manager.active(), Some(second));
        assert_eq!(manager.window_at(GridPos::new(1, 1)), Some(pinned));

        manager.raise(first);
        assert_eq!(manager.active(), Some(first));
        let order: Vec<_> = manager.windows().map(Window::id).collect();
        assert_eq!(order, vec![second, first, pinned]);
    }
}
