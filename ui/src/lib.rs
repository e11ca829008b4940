#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Character-grid window toolkit: windows with widgets, a menu bar, an info
//! bar, and a keyboard or pointer driven cursor.
//!
//! Every frame the application renders into a [`GridSurface`] through
//! [`UiContext::render`] and feeds input through [`InteractionController`].
//! Activating a cell performs the [`Action`] painted into it; application
//! behaviour is reported back as opaque [`Signal`]s.

pub mod cursor;
pub mod geometry;
pub mod interaction;
pub mod manager;
pub mod menu;
pub mod style;
pub mod surface;
pub mod widget;
pub mod window;

pub use cursor::Cursor;
pub use geometry::{GridPos, GridRect};
pub use interaction::{InteractionController, Key, UiContext, UiInput};
pub use manager::{LayoutError, WindowManager};
pub use menu::{InfoBar, Menu, MenuBar, MenuItem};
pub use style::{Color, Style};
pub use surface::{Cell, GridSurface};
pub use widget::{Button, Element, Painter, ProgressBar, Text, TextEntry, Widget};
pub use window::Window;

/// Identifies a window registered with the [`WindowManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u32);

impl WindowId {
    /// Placeholder carried by windows not yet registered.
    pub const UNASSIGNED: WindowId = WindowId(u32::MAX);

    /// Creates a new window identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies a widget within its window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u32);

impl WidgetId {
    /// Creates a new widget identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies a menu on the [`MenuBar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(u32);

impl MenuId {
    /// Creates a new menu identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Addresses a widget across all windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildRef {
    /// Window hosting the widget.
    pub window: WindowId,
    /// Widget within the window.
    pub widget: WidgetId,
}

impl ChildRef {
    /// Creates a new child reference.
    #[must_use]
    pub const fn new(window: WindowId, widget: WidgetId) -> Self {
        Self { window, widget }
    }
}

/// Application-defined notification raised by an activated cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signal(u32);

impl Signal {
    /// Creates a new signal.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw signal value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour bound to a cell, performed when the cell is activated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Queue the window for destruction.
    CloseWindow(WindowId),
    /// Give keyboard focus to a text entry.
    FocusEntry(ChildRef),
    /// Expand or collapse a menu.
    ToggleMenu(MenuId),
    /// Scroll a window's viewport.
    Scroll {
        /// Window to scroll.
        window: WindowId,
        /// Columns to move by.
        columns: i32,
        /// Rows to move by.
        rows: i32,
    },
    /// Report a signal to the application.
    Emit(Signal),
}
