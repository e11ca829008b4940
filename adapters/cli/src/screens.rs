//! Game screens: calendar, property map, finances, data feed, and dialogs.
//!
//! Every screen owns one window in the [`WindowManager`] and refreshes its
//! widgets from world queries after the simulation step of a frame.

use std::collections::{HashMap, VecDeque};

use arcade_manager_core::{
    CabinetView, CustomerId, CustomerState, Date, DayPhase, DayReport, DepartureReason, Event,
    PlacementError, TilePos,
};
use arcade_manager_ui::{
    Action, Button, ChildRef, Color, GridPos, GridRect, LayoutError, MenuBar, MenuItem,
    ProgressBar, Style, Text, TextEntry, Widget, WidgetId, Window, WindowId, WindowManager,
};
use arcade_manager_world::{calendar, query, World};
use tracing::debug;

/// Signals raised by the screens and menus, handled by the session.
pub mod signals {
    use arcade_manager_ui::Signal;

    /// Opens the doors for the current day.
    pub const START_DAY: Signal = Signal::new(1);
    /// Moves a closed day on to the next morning.
    pub const NEXT_DAY: Signal = Signal::new(2);
    /// Asks whether to start a new game.
    pub const NEW_GAME: Signal = Signal::new(3);
    /// Starts a new game with the name typed into the dialog.
    pub const CONFIRM_NEW_GAME: Signal = Signal::new(4);
    /// Ends the session.
    pub const EXIT: Signal = Signal::new(5);
}

/// Glyphs of the property map.
pub mod glyphs {
    /// Installed cabinet.
    pub const CABINET: char = '\u{221A}';
    /// Customer walking around.
    pub const CUSTOMER: char = '\u{263A}';
    /// Customer at a cabinet.
    pub const CUSTOMER_PLAYING: char = '\u{263B}';
    /// Horizontal wall.
    pub const WALL_HORIZONTAL: char = '\u{2500}';
    /// Vertical wall.
    pub const WALL_VERTICAL: char = '\u{2502}';
    /// Top-left wall corner.
    pub const WALL_TOP_LEFT: char = '\u{250C}';
    /// Top-right wall corner.
    pub const WALL_TOP_RIGHT: char = '\u{2510}';
    /// Bottom-left wall corner.
    pub const WALL_BOTTOM_LEFT: char = '\u{2514}';
    /// Bottom-right wall corner.
    pub const WALL_BOTTOM_RIGHT: char = '\u{2518}';
    /// Door drawn into the top wall.
    pub const DOOR: &str = "[_]";
}

/// Header row of the calendar.
pub const WEEKDAY_HEADER: &str = "MO TU WE TH FR SA SU";

/// Lines the data feed keeps before dropping the oldest.
pub const FEED_HISTORY: usize = 200;

const MAP_CENTRE_COLUMNS: i32 = 18;

/// Builds the menu bar shown across the top row.
#[must_use]
pub fn menu_bar() -> MenuBar {
    let mut menus = MenuBar::new();
    let file = menus.add_menu("FILE", 0);
    menus.add_item(file, MenuItem::new("New...", Action::Emit(signals::NEW_GAME)));
    menus.add_item(file, MenuItem::divider());
    menus.add_item(file, MenuItem::new("Exit", Action::Emit(signals::EXIT)));
    menus
}

/// Text of the info bar for the current world state.
#[must_use]
pub fn info_text(world: &World) -> String {
    let hint = match query::phase(world) {
        DayPhase::Opening => "Press START DAY to open the doors.",
        DayPhase::Running => "Open for business.",
        DayPhase::Closing => "Closing up, waiting for the last customers.",
        DayPhase::Closed => "Day over. Press NEXT DAY to carry on.",
    };
    format!(
        "{}  FUNDS {}  {hint}",
        query::date(world),
        query::funds(world)
    )
}

/// Month view with today highlighted.
#[derive(Debug)]
pub struct CalendarWindow {
    id: WindowId,
    shown: Option<Date>,
}

impl CalendarWindow {
    /// Screen area of the calendar.
    pub const AREA: GridRect = GridRect::new(0, 1, 24, 9);

    /// Opens the calendar on `date`.
    pub fn open(windows: &mut WindowManager, date: Date) -> Result<Self, LayoutError> {
        let id = windows.add_window(Window::new(Self::AREA, calendar_title(date)))?;
        let mut calendar = Self { id, shown: None };
        calendar.refresh(windows, date);
        Ok(calendar)
    }

    /// Window showing the calendar.
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Redraws the month when the date changed.
    pub fn refresh(&mut self, windows: &mut WindowManager, date: Date) {
        if self.shown == Some(date) {
            return;
        }
        let Some(window) = windows.window_mut(self.id) else {
            return;
        };
        window.set_title(calendar_title(date));
        window.clear_children();
        for widget in month_grid(date) {
            let _ = window.add_child(widget);
        }
        self.shown = Some(date);
    }
}

fn calendar_title(date: Date) -> String {
    format!("{}, Year {}", date.month.abbreviation(), date.year)
}

/// Weekday header followed by one text per day of the month.
#[must_use]
pub fn month_grid(date: Date) -> Vec<Widget> {
    let style =
        Style::new(Color::White, Color::Blue).with_highlight(Color::Blue, Color::LightGrey);
    let mut widgets = vec![Widget::Text(Text::new(
        GridPos::new(1, 0),
        WEEKDAY_HEADER,
        style,
    ))];
    let first = i32::from(calendar::first_weekday_of_month(date.year, date.month));
    for day in 1..=date.month.days() {
        let slot = first + i32::from(day) - 1;
        let origin = GridPos::new(1 + (slot % 7) * 3, 1 + slot / 7);
        let text = Text::new(origin, &format!("{day:2}"), style);
        widgets.push(Widget::Text(if day == date.day {
            text.highlighted()
        } else {
            text
        }));
    }
    widgets
}

/// Top-down view of the property.
#[derive(Debug)]
pub struct PropertyMap {
    id: WindowId,
}

impl PropertyMap {
    /// Screen area of the map.
    pub const AREA: GridRect = GridRect::new(0, 11, 24, 17);

    /// Opens the map of the world's property.
    pub fn open(windows: &mut WindowManager, world: &World) -> Result<Self, LayoutError> {
        let window = Window::new(Self::AREA, query::property_layout(world).name.clone())
            .with_style(Style::new(Color::White, Color::Black).with_highlight(Color::Red, Color::Black));
        let map = Self {
            id: windows.add_window(window)?,
        };
        map.refresh(windows, world);
        Ok(map)
    }

    /// Window showing the map.
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Redraws walls, cabinets, and customers.
    pub fn refresh(&self, windows: &mut WindowManager, world: &World) {
        let Some(window) = windows.window_mut(self.id) else {
            return;
        };
        window.set_title(query::property_layout(world).name.clone());
        window.clear_children();
        for widget in floor_plan(world) {
            let _ = window.add_child(widget);
        }
    }
}

/// Walls, door, cabinets, and customers, centred in the map window.
#[must_use]
pub fn floor_plan(world: &World) -> Vec<Widget> {
    let layout = query::property_layout(world);
    let tiles_wide = layout.width + 1;
    let tiles_high = layout.height + 1;
    let x_offset = ((MAP_CENTRE_COLUMNS - tiles_wide) / 2).max(0);
    let tile = |pos: TilePos| GridPos::new(x_offset + 1 + pos.column(), 2 + pos.row());
    let wall = Style::new(Color::Grey, Color::Black);
    let span = usize::try_from(tiles_wide).unwrap_or(0);

    let mut top: Vec<char> = std::iter::once(glyphs::WALL_TOP_LEFT)
        .chain(std::iter::repeat(glyphs::WALL_HORIZONTAL).take(span))
        .chain(std::iter::once(glyphs::WALL_TOP_RIGHT))
        .collect();
    if layout.door.row() == 0 {
        for (offset, glyph) in (-1..=1).zip(glyphs::DOOR.chars()) {
            let index = usize::try_from(layout.door.column() + 1 + offset).ok();
            if let Some(slot) = index.and_then(|index| top.get_mut(index)) {
                *slot = glyph;
            }
        }
    }
    let side = format!(
        "{}{}{}",
        glyphs::WALL_VERTICAL,
        " ".repeat(span),
        glyphs::WALL_VERTICAL
    );
    let sides = vec![side; usize::try_from(tiles_high).unwrap_or(0)].join("\n");
    let bottom = format!(
        "{}{}{}",
        glyphs::WALL_BOTTOM_LEFT,
        glyphs::WALL_HORIZONTAL.to_string().repeat(span),
        glyphs::WALL_BOTTOM_RIGHT
    );

    let mut widgets = vec![
        Widget::Text(Text::new(
            GridPos::new(x_offset, 1),
            &top.into_iter().collect::<String>(),
            wall,
        )),
        Widget::Text(Text::new(GridPos::new(x_offset, 2), &sides, wall)),
        Widget::Text(Text::new(
            GridPos::new(x_offset, 2 + tiles_high),
            &bottom,
            wall,
        )),
    ];

    let cabinet_style = Style::new(Color::Green, Color::Black);
    for cabinet in query::cabinet_view(world).iter() {
        widgets.push(Widget::Text(Text::new(
            tile(cabinet.position),
            &glyphs::CABINET.to_string(),
            cabinet_style,
        )));
    }
    for customer in query::customer_view(world).iter() {
        let glyph = if customer.state == CustomerState::Play {
            glyphs::CUSTOMER_PLAYING
        } else {
            glyphs::CUSTOMER
        };
        widgets.push(Widget::Text(Text::new(
            tile(customer.position),
            &glyph.to_string(),
            Style::new(mood_color(customer.patience), Color::Black),
        )));
    }
    widgets
}

/// Colour of a customer glyph by remaining patience.
#[must_use]
pub const fn mood_color(patience: i32) -> Color {
    if patience >= 50 {
        Color::Green
    } else if patience >= 20 {
        Color::Yellow
    } else {
        Color::Red
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusView {
    PreDay,
    Open,
    DayOver,
}

impl StatusView {
    const fn for_phase(phase: DayPhase) -> Self {
        match phase {
            DayPhase::Opening => Self::PreDay,
            DayPhase::Running | DayPhase::Closing => Self::Open,
            DayPhase::Closed => Self::DayOver,
        }
    }
}

/// Finances of the current day, switching layout with the day phase.
#[derive(Debug)]
pub struct StatusWindow {
    id: WindowId,
    view: Option<StatusView>,
    labels: Vec<WidgetId>,
    progress: Option<WidgetId>,
}

impl StatusWindow {
    /// Screen area of the finances window.
    pub const AREA: GridRect = GridRect::new(25, 1, 54, 9);

    /// Opens the window for the world's current phase.
    pub fn open(
        windows: &mut WindowManager,
        world: &World,
        report: Option<&DayReport>,
    ) -> Result<Self, LayoutError> {
        let window = Window::new(Self::AREA, "FINANCES")
            .with_style(Style::new(Color::LightGrey, Color::Blue));
        let mut status = Self {
            id: windows.add_window(window)?,
            view: None,
            labels: Vec::new(),
            progress: None,
        };
        status.refresh(windows, world, report);
        Ok(status)
    }

    /// Window showing the finances.
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Rebuilds the layout on phase changes and updates every figure.
    pub fn refresh(&mut self, windows: &mut WindowManager, world: &World, report: Option<&DayReport>) {
        let view = StatusView::for_phase(query::phase(world));
        let Some(window) = windows.window_mut(self.id) else {
            return;
        };
        if self.view != Some(view) {
            debug!(?view, "finances layout switched");
            self.rebuild(window, view, world);
            self.view = Some(view);
        }

        let lines = status_lines(view, world, report);
        for (id, line) in self.labels.iter().zip(&lines) {
            if let Some(Widget::Text(text)) = window.child_mut(*id) {
                text.set_text(line);
            }
        }
        if let Some(Widget::ProgressBar(bar)) = self.progress.and_then(|id| window.child_mut(id)) {
            bar.set_value(query::day_progress(world).tick);
        }
    }

    fn rebuild(&mut self, window: &mut Window, view: StatusView, world: &World) {
        window.clear_children();
        self.labels.clear();
        self.progress = None;
        let style = window.style();
        let button = Style::new(Color::Black, Color::White).with_highlight(Color::White, Color::Black);

        let (origins, action): (&[(i32, i32)], Option<(GridPos, &str, _)>) = match view {
            StatusView::PreDay => (
                &[(1, 1), (1, 2), (1, 3)],
                Some((GridPos::new(10, 5), "START DAY", signals::START_DAY)),
            ),
            StatusView::Open => {
                let length = query::day_progress(world).length;
                self.progress = Some(window.add_child(Widget::ProgressBar(ProgressBar::new(
                    GridPos::new(2, 1),
                    49,
                    length,
                    Style::new(Color::Yellow, Color::Blue),
                ))));
                (&[(2, 0), (2, 3), (2, 4), (2, 5)], None)
            }
            StatusView::DayOver => (
                &[(1, 0), (1, 1), (1, 2), (1, 3), (1, 4), (1, 5)],
                Some((GridPos::new(38, 3), "NEXT DAY", signals::NEXT_DAY)),
            ),
        };
        for (column, row) in origins {
            let label = Text::new(GridPos::new(*column, *row), "", style);
            self.labels.push(window.add_child(Widget::Text(label)));
        }
        if let Some((origin, label, signal)) = action {
            let _ = window.add_child(Widget::Button(
                Button::new(origin, label, button, Action::Emit(signal)).highlight_on_hover(),
            ));
        }
    }
}

fn status_lines(view: StatusView, world: &World, report: Option<&DayReport>) -> Vec<String> {
    let ledger = query::ledger(world);
    match view {
        StatusView::PreDay => vec![
            format!("FUNDS: {}", query::funds(world)),
            format!("Cabinets Owned: {}", query::cabinet_view(world).len()),
            format!(
                "Rent due at opening: {}",
                query::property_layout(world).rent
            ),
        ],
        StatusView::Open => {
            let outlook = query::arrival_outlook(world);
            let state = if query::phase(world) == DayPhase::Closing {
                "CLOSING UP"
            } else {
                "OPEN"
            };
            vec![
                state.to_owned(),
                format!("Income: {}", ledger.income),
                format!("Customers: {}/{}", outlook.customers, outlook.capacity),
                format!("Visitors: {}  Games: {}", ledger.visitors, ledger.plays),
            ]
        }
        StatusView::DayOver => {
            let average = report
                .filter(|report| report.date == ledger.date)
                .map_or_else(|| "-".to_owned(), |report| report.trailing_average_income.to_string());
            vec![
                format!("DAY CLOSED: {}", ledger.date),
                format!("Income:   {}", ledger.income),
                format!("Expenses: {}", ledger.expenses),
                format!("Net:      {}", ledger.net()),
                format!("Visitors: {}  Games: {}", ledger.visitors, ledger.plays),
                format!("Average income: {average}"),
            ]
        }
    }
}

/// Scrolling log of what happened in the arcade.
#[derive(Debug)]
pub struct DataFeed {
    id: WindowId,
    text: WidgetId,
    lines: VecDeque<String>,
    names: HashMap<CustomerId, String>,
}

impl DataFeed {
    /// Screen area of the feed.
    pub const AREA: GridRect = GridRect::new(25, 11, 54, 17);

    /// Opens an empty feed.
    pub fn open(windows: &mut WindowManager) -> Result<Self, LayoutError> {
        let mut window = Window::new(Self::AREA, "DATA FEED")
            .with_style(Style::new(Color::Grey, Color::Blue))
            .with_scrollbars(true, false);
        let text = window.add_child(Widget::Text(Text::new(
            GridPos::new(1, 0),
            "DATA FEED",
            Style::new(Color::White, Color::Black),
        )));
        Ok(Self {
            id: windows.add_window(window)?,
            text,
            lines: VecDeque::from(["DATA FEED".to_owned()]),
            names: HashMap::new(),
        })
    }

    /// Window showing the feed.
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Lines currently in the feed, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Appends a line for every noteworthy event and scrolls to the bottom.
    pub fn observe(&mut self, windows: &mut WindowManager, world: &World, events: &[Event]) {
        let cabinets = query::cabinet_view(world);
        let mut changed = false;
        for event in events {
            if let Some(line) = self.describe(event, &cabinets) {
                if self.lines.len() == FEED_HISTORY {
                    let _ = self.lines.pop_front();
                }
                self.lines.push_back(line);
                changed = true;
            }
            if let Event::CustomerLeft { customer, .. } = event {
                let _ = self.names.remove(customer);
            }
        }
        if !changed {
            return;
        }

        let Some(window) = windows.window_mut(self.id) else {
            return;
        };
        if let Some(Widget::Text(text)) = window.child_mut(self.text) {
            let joined: Vec<&str> = self.lines.iter().map(String::as_str).collect();
            text.set_text(&joined.join("\n"));
        }
        window.scroll_to_bottom();
    }

    fn name(&self, customer: CustomerId) -> &str {
        self.names
            .get(&customer)
            .map_or("SOMEONE", String::as_str)
    }

    fn describe(&mut self, event: &Event, cabinets: &CabinetView) -> Option<String> {
        let cabinet_name = |id| {
            cabinets
                .iter()
                .find(|cabinet| cabinet.id == id)
                .map_or_else(|| "a cabinet".to_owned(), |cabinet| cabinet.name.clone())
        };
        match event {
            Event::CabinetPlaced {
                cabinet,
                position,
                play_positions,
            } => Some(format!(
                "Installed {} at ({}, {}) with {play_positions} play spots.",
                cabinet_name(*cabinet),
                position.column(),
                position.row()
            )),
            Event::CabinetPlacementRejected { name, reason } => {
                Some(format!("No room for {name}: {}.", placement_reason(*reason)))
            }
            Event::CustomerArrived { customer, name } => {
                let _ = self.names.insert(*customer, name.clone());
                Some(format!("{name} walked in."))
            }
            Event::CustomerTurnedAway { name } => Some(format!("{name} found no room and left.")),
            Event::PlayStarted {
                customer,
                cabinet,
                price,
            } => Some(format!(
                "{} paid {price} to play {}.",
                self.name(*customer),
                cabinet_name(*cabinet)
            )),
            Event::WaitAbandoned { customer } => {
                Some(format!("{} got tired of waiting.", self.name(*customer)))
            }
            Event::CustomerLeft { customer, reason } => {
                let why = match reason {
                    DepartureReason::WalkedOut => "went home",
                    DepartureReason::OutOfCash => "ran out of cash",
                    DepartureReason::OutOfPatience => "lost patience and stormed out",
                };
                Some(format!("{} {why}.", self.name(*customer)))
            }
            Event::DayPhaseChanged {
                phase: DayPhase::Running,
            } => Some("Doors open.".to_owned()),
            Event::DayPhaseChanged {
                phase: DayPhase::Closing,
            } => Some("Closing time.".to_owned()),
            Event::DayReportPublished { report } => Some(format!(
                "{}: income {}, net {}.",
                report.date, report.income, report.net
            )),
            Event::DayAdvanced { date } => Some(format!("Good morning! It is {date}.")),
            _ => None,
        }
    }
}

fn placement_reason(reason: PlacementError) -> &'static str {
    match reason {
        PlacementError::OutOfBounds => "outside the property",
        PlacementError::Occupied => "the tile is taken",
        PlacementError::DoorBlocked => "it would block the door",
        PlacementError::NoFreeSpace => "no free space left",
        PlacementError::InvalidPhase => "the arcade is open",
    }
}

/// Confirmation dialog asking for the name of a new arcade.
#[derive(Debug)]
pub struct NewGameDialog {
    id: WindowId,
    name: ChildRef,
}

impl NewGameDialog {
    /// Title of the dialog.
    pub const TITLE: &'static str = "START NEW GAME?";

    /// Opens the dialog centred on a `columns` x `rows` screen.
    pub fn open(windows: &mut WindowManager, columns: i32, rows: i32) -> Result<Self, LayoutError> {
        let area = GridRect::new(columns / 2 - 18, rows / 2 - 4, 35, 8);
        let style = Style::new(Color::White, Color::Red);
        let mut window = Window::new(area, Self::TITLE)
            .with_style(style)
            .with_border(Color::LightRed)
            .with_close_button()
            .always_on_top();
        let _ = window.add_child(Widget::Text(Text::new(
            GridPos::new(1, 0),
            "Start a new game?\nUnsaved progress will be lost!",
            style,
        )));
        let _ = window.add_child(Widget::Text(Text::new(GridPos::new(1, 3), "NAME:", style)));
        let entry = window.add_child(Widget::TextEntry(TextEntry::new(
            GridPos::new(7, 3),
            16,
            1,
            "ARCADE NAME",
            Some(16),
            Style::new(Color::Black, Color::Yellow),
        )));
        let _ = window.add_child(Widget::Button(
            Button::new(
                GridPos::new(8, 5),
                "  OK  ",
                Style::new(Color::Black, Color::Green),
                Action::Emit(signals::CONFIRM_NEW_GAME),
            )
            .highlight_on_hover(),
        ));

        let id = windows.add_window(window)?;
        if let Some(window) = windows.window_mut(id) {
            let _ = window.add_child(Widget::Button(
                Button::new(
                    GridPos::new(19, 5),
                    "CANCEL",
                    Style::new(Color::Black, Color::LightGrey),
                    Action::CloseWindow(id),
                )
                .highlight_on_hover(),
            ));
        }
        Ok(Self {
            id,
            name: ChildRef::new(id, entry),
        })
    }

    /// Window showing the dialog.
    #[must_use]
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Name typed into the dialog, if any.
    #[must_use]
    pub fn name(&self, windows: &WindowManager) -> Option<String> {
        let window = windows.window(self.name.window)?;
        match window.child(self.name.widget)? {
            Widget::TextEntry(entry) => {
                let name = entry.text().trim().to_uppercase();
                (!name.is_empty()).then_some(name)
            }
            _ => None,
        }
    }
}

/// Opens the greeting shown when a game starts.
pub fn open_welcome(
    windows: &mut WindowManager,
    world: &World,
    columns: i32,
    rows: i32,
) -> Result<WindowId, LayoutError> {
    let area = GridRect::new(columns / 2 - 16, rows / 2 - 3, 32, 7);
    let mut window = Window::new(area, "WELCOME!");
    let _ = window.add_child(Widget::Text(Text::new(
        GridPos::new(1, 1),
        &format!(
            "{}\nPress START DAY to open up.",
            query::welcome_banner(world)
        ),
        window.style(),
    )));
    let id = windows.add_window(window)?;
    if let Some(window) = windows.window_mut(id) {
        let _ = window.add_child(Widget::Button(Button::new(
            GridPos::new(13, 4),
            " OK ",
            Style::new(Color::Black, Color::Green),
            Action::CloseWindow(id),
        )));
    }
    Ok(id)
}

/// Every screen of a running game.
#[derive(Debug)]
pub struct Screens {
    calendar: CalendarWindow,
    property: PropertyMap,
    status: StatusWindow,
    feed: DataFeed,
    welcome: Option<WindowId>,
    dialog: Option<NewGameDialog>,
}

impl Screens {
    /// Opens the game screens and the welcome greeting.
    pub fn open(
        windows: &mut WindowManager,
        world: &World,
        columns: i32,
        rows: i32,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            calendar: CalendarWindow::open(windows, query::date(world))?,
            property: PropertyMap::open(windows, world)?,
            status: StatusWindow::open(windows, world, None)?,
            feed: DataFeed::open(windows)?,
            welcome: Some(open_welcome(windows, world, columns, rows)?),
            dialog: None,
        })
    }

    /// Calendar screen.
    #[must_use]
    pub const fn calendar(&self) -> &CalendarWindow {
        &self.calendar
    }

    /// Property map screen.
    #[must_use]
    pub const fn property(&self) -> &PropertyMap {
        &self.property
    }

    /// Finances screen.
    #[must_use]
    pub const fn status(&self) -> &StatusWindow {
        &self.status
    }

    /// Data feed screen.
    #[must_use]
    pub const fn feed(&self) -> &DataFeed {
        &self.feed
    }

    /// Open new-game dialog, if any.
    #[must_use]
    pub const fn dialog(&self) -> Option<&NewGameDialog> {
        self.dialog.as_ref()
    }

    /// Welcome greeting, while it is open.
    #[must_use]
    pub const fn welcome(&self) -> Option<WindowId> {
        self.welcome
    }

    /// Feeds a frame's events to the data feed.
    pub fn observe(&mut self, windows: &mut WindowManager, world: &World, events: &[Event]) {
        self.feed.observe(windows, world, events);
    }

    /// Refreshes every screen from the world.
    pub fn refresh(&mut self, windows: &mut WindowManager, world: &World, report: Option<&DayReport>) {
        self.calendar.refresh(windows, query::date(world));
        self.property.refresh(windows, world);
        self.status.refresh(windows, world, report);
    }

    /// Opens the new-game dialog, or raises it when already open.
    pub fn open_new_game(
        &mut self,
        windows: &mut WindowManager,
        columns: i32,
        rows: i32,
    ) -> Result<(), LayoutError> {
        if let Some(dialog) = &self.dialog {
            windows.raise(dialog.id());
            return Ok(());
        }
        self.dialog = Some(NewGameDialog::open(windows, columns, rows)?);
        Ok(())
    }

    /// Closes the welcome greeting.
    pub fn dismiss_welcome(&mut self, windows: &mut WindowManager) {
        if let Some(id) = self.welcome.take() {
            windows.queue_destroy(id);
        }
    }

    /// Drops references to windows the manager purged.
    pub fn forget(&mut self, purged: &[WindowId]) {
        if self.welcome.is_some_and(|id| purged.contains(&id)) {
            self.welcome = None;
        }
        if self
            .dialog
            .as_ref()
            .is_some_and(|dialog| purged.contains(&dialog.id()))
        {
            self.dialog = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_manager_core::{Command, Month};
    use arcade_manager_ui::{Element, GridSurface};
    use arcade_manager_world as world;

    fn render(windows: &WindowManager) -> GridSurface {
        let mut surface = GridSurface::new(80, 30, Style::default());
        windows.render(&mut surface);
        surface
    }

    #[test]
    fn month_grid_highlights_today() {
        let date = calendar::date_for(40);
        assert_eq!((date.month, date.day), (Month::Feb, 10));

        let widgets = month_grid(date);
        assert_eq!(widgets.len(), 1 + 28);
        let Widget::Text(header) = &widgets[0] else {
            panic!("header should be text");
        };
        assert_eq!(header.lines(), [WEEKDAY_HEADER]);

        let first = i32::from(calendar::first_weekday_of_month(0, Month::Feb));
        assert_eq!(widgets[1].bounds().origin(), GridPos::new(1 + first * 3, 1));

        let style =
            Style::new(Color::White, Color::Blue).with_highlight(Color::Blue, Color::LightGrey);
        let today = widgets[10].bounds().origin();
        assert_eq!(
            widgets[10],
            Widget::Text(Text::new(today, "10", style).highlighted())
        );
        let yesterday = widgets[9].bounds().origin();
        assert_eq!(widgets[9], Widget::Text(Text::new(yesterday, " 9", style)));
    }

    #[test]
    fn floor_plan_draws_walls_door_and_cabinets() {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceCabinet {
                record: arcade_manager_core::CatalogRecord {
                    name: "PAC".to_owned(),
                    description: String::new(),
                    release_year: 1980,
                    genre: arcade_manager_core::Genre::new("MAZE"),
                    players: 1,
                },
                position: None,
            },
            &mut events,
        );

        let mut windows = WindowManager::new(80, 30);
        let map = PropertyMap::open(&mut windows, &world).unwrap();
        let surface = render(&windows);
        let area = PropertyMap::AREA;

        // Garage: 8 tiles wide, centred at offset 5 inside the border.
        let top = surface.row_text(area.top + 2);
        assert!(top.contains("\u{250C}\u{2500}\u{2500}[_]\u{2500}\u{2500}\u{2500}\u{2510}"), "{top}");
        let slot = query::cabinet_view(&world).iter().next().unwrap().position;
        let cell = surface
            .cell(GridPos::new(area.left + 1 + 5 + 1 + slot.column(), area.top + 1 + 2 + slot.row()))
            .unwrap();
        assert_eq!(cell.glyph, glyphs::CABINET);
        assert_eq!(windows.window(map.id()).map(Window::title), Some("GARAGE"));
    }

    #[test]
    fn finances_follow_the_day_phase() {
        let mut world = World::new();
        let mut windows = WindowManager::new(80, 30);
        let mut status = StatusWindow::open(&mut windows, &world, None).unwrap();
        let surface = render(&windows);
        assert!(surface.row_text(3).contains("FUNDS: $10.00"));
        assert!(surface.row_text(7).contains("START DAY"));

        let mut events = Vec::new();
        world::apply(&mut world, Command::StartDay, &mut events);
        status.refresh(&mut windows, &world, None);
        let surface = render(&windows);
        assert!(surface.row_text(2).contains("OPEN"));
        assert!(!surface.row_text(7).contains("START DAY"));
    }

    #[test]
    fn feed_keeps_a_bounded_history() {
        let world = World::new();
        let mut windows = WindowManager::new(80, 30);
        let mut feed = DataFeed::open(&mut windows).unwrap();
        let events: Vec<Event> = (0..FEED_HISTORY + 5)
            .map(|index| Event::CustomerTurnedAway {
                name: format!("GUEST {index}"),
            })
            .collect();
        feed.observe(&mut windows, &world, &events);

        assert_eq!(feed.lines().count(), FEED_HISTORY);
        let last = format!("GUEST {} found no room and left.", FEED_HISTORY + 4);
        assert_eq!(feed.lines().last(), Some(last.as_str()));
        let window = windows.window(feed.id()).unwrap();
        assert_eq!(window.viewport().bottom(), window.full_content().bottom());
    }

    #[test]
    fn feed_names_customers_until_they_leave() {
        let world = World::new();
        let mut windows = WindowManager::new(80, 30);
        let mut feed = DataFeed::open(&mut windows).unwrap();
        let customer = CustomerId::new(7);
        feed.observe(
            &mut windows,
            &world,
            &[
                Event::CustomerArrived {
                    customer,
                    name: "DORIS".to_owned(),
                },
                Event::CustomerLeft {
                    customer,
                    reason: DepartureReason::OutOfCash,
                },
                Event::WaitAbandoned { customer },
            ],
        );
        let lines: Vec<_> = feed.lines().skip(1).collect();
        assert_eq!(
            lines,
            [
                "DORIS walked in.",
                "DORIS ran out of cash.",
                "SOMEONE got tired of waiting."
            ]
        );
    }

    #[test]
    fn dialog_reads_the_typed_name() {
        let mut windows = WindowManager::new(80, 30);
        let dialog = NewGameDialog::open(&mut windows, 80, 30).unwrap();
        assert_eq!(dialog.name(&windows), None);

        let entry = windows.entry_mut(dialog.name).unwrap();
        for glyph in "neon ".chars() {
            let _ = entry.insert(glyph);
        }
        assert_eq!(dialog.name(&windows).as_deref(), Some("NEON"));
    }

    #[test]
    fn mood_turns_red_as_patience_runs_out() {
        assert_eq!(mood_color(80), Color::Green);
        assert_eq!(mood_color(30), Color::Yellow);
        assert_eq!(mood_color(0), Color::Red);
    }
}
