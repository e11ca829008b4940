//! Cooperative per-frame pipeline: input, UI signals, simulation, systems,
//! screen refresh, and rendering, in that order.

use std::{mem, ops::ControlFlow, time::Duration};

use anyhow::Result;
use arcade_manager_core::{Command, DayPhase, Event, Money};
use arcade_manager_rendering::{
    palette, CellFrame, GridPresentation, InputTranslator, Presentation, RenderingBackend,
};
use arcade_manager_system_arrivals::Arrivals;
use arcade_manager_system_bookkeeping::Bookkeeping;
use arcade_manager_ui::{
    Color, GridSurface, InfoBar, InteractionController, LayoutError, MenuBar, Signal, Style,
    UiContext, UiInput, WindowManager,
};
use arcade_manager_world::{self as world, query, World};
use glam::Vec2;
use tracing::{debug, error, info};

use crate::{
    config::ArcadeConfig,
    screens::{self, signals, Screens},
};

const ARRIVALS_SEED_SALT: u64 = 0x5eed_a771_0a15;

#[derive(Debug)]
struct PendingRestart {
    name: Option<String>,
}

/// A running game together with its user interface.
#[derive(Debug)]
pub struct Session {
    config: ArcadeConfig,
    world: World,
    arrivals: Arrivals,
    bookkeeping: Bookkeeping,
    windows: WindowManager,
    menus: MenuBar,
    info: InfoBar,
    ctx: UiContext,
    controller: InteractionController,
    screens: Screens,
    signals: Vec<Signal>,
    restart: Option<PendingRestart>,
    autoplay: Option<u32>,
    days_closed: u32,
    quit: bool,
}

impl Session {
    /// Starts a new game described by `config`.
    pub fn new(config: ArcadeConfig) -> Result<Self, LayoutError> {
        let columns = config.screen.columns;
        let rows = config.screen.rows;
        let (world, setup) = new_game(&config, None);
        let mut windows = WindowManager::new(columns, rows);
        let mut screens = Screens::open(&mut windows, &world, columns, rows)?;
        screens.observe(&mut windows, &world, &setup);

        let mut session = Self {
            arrivals: Arrivals::new(
                config
                    .customers
                    .arrivals(config.simulation.seed ^ ARRIVALS_SEED_SALT),
            ),
            bookkeeping: Bookkeeping::new(),
            menus: screens::menu_bar(),
            info: InfoBar::new(screens::info_text(&world)),
            ctx: UiContext::new(columns, rows, Style::new(Color::White, Color::Black)),
            controller: InteractionController::new(),
            signals: Vec::new(),
            restart: None,
            autoplay: None,
            days_closed: 0,
            quit: false,
            config,
            world,
            windows,
            screens,
        };
        session.render();
        Ok(session)
    }

    /// Plays `days` business days without input, then stops.
    pub fn set_autoplay(&mut self, days: Option<u32>) {
        self.autoplay = days;
    }

    /// Authoritative world of the current game.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Windows of the interface.
    #[must_use]
    pub const fn windows(&self) -> &WindowManager {
        &self.windows
    }

    /// Menu bar along the top row.
    #[must_use]
    pub const fn menus(&self) -> &MenuBar {
        &self.menus
    }

    /// Game screens.
    #[must_use]
    pub const fn screens(&self) -> &Screens {
        &self.screens
    }

    /// Grid rendered at the end of the last frame.
    #[must_use]
    pub const fn surface(&self) -> &GridSurface {
        self.ctx.surface()
    }

    /// Days closed since the game started.
    #[must_use]
    pub const fn days_closed(&self) -> u32 {
        self.days_closed
    }

    /// Runs one frame and reports whether the session wants to continue.
    pub fn frame(&mut self, dt: Duration, inputs: &[UiInput]) -> ControlFlow<()> {
        for input in inputs {
            self.controller.handle(
                *input,
                &mut self.ctx,
                &mut self.windows,
                &mut self.menus,
                &mut self.signals,
            );
        }
        self.queue_autoplay();

        let mut events = Vec::new();
        for signal in mem::take(&mut self.signals) {
            self.dispatch(signal, &mut events);
        }

        let purged = self.windows.tick();
        self.screens.forget(&purged);
        if let Some(restart) = self.restart.take() {
            events.clear();
            self.restart(restart.name, &mut events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let mut commands = Vec::new();
        self.arrivals.handle(
            &events,
            query::phase(&self.world),
            query::arrival_outlook(&self.world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        let mut published = Vec::new();
        self.bookkeeping.handle(&events, &mut published);
        events.extend(published);

        let closed = events
            .iter()
            .filter(|event| matches!(event, Event::DayClosed { .. }))
            .count();
        self.days_closed += u32::try_from(closed).unwrap_or(0);

        self.screens.observe(&mut self.windows, &self.world, &events);
        self.screens.refresh(
            &mut self.windows,
            &self.world,
            self.bookkeeping.last_report(),
        );
        self.info.set_text(screens::info_text(&self.world));

        self.ctx.tick(dt);
        self.render();

        if self.quit || self.autoplay_finished() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Hands the session to a rendering backend until either side stops.
    pub fn run<B: RenderingBackend>(mut self, backend: B) -> Result<()> {
        let screen = &self.config.screen;
        let grid = GridPresentation::new(
            screen.columns,
            screen.rows,
            Vec2::new(screen.cell_width, screen.cell_height),
        )?;
        let translator = InputTranslator::new(grid);
        let title = query::property_layout(&self.world).name.clone();
        let presentation = Presentation::new(title, palette(Color::Black), grid);

        let mut inputs = Vec::new();
        backend.run(presentation, move |dt, input, frame| {
            inputs.clear();
            translator.translate_frame(&input, &mut inputs);
            let mut flow = self.frame(dt, &inputs);
            *frame = CellFrame::capture(self.surface());
            if input.quit_requested {
                flow = ControlFlow::Break(());
            }
            if flow.is_break() {
                info!(
                    days = self.days_closed,
                    funds = %query::funds(&self.world),
                    date = %query::date(&self.world),
                    "session finished"
                );
            }
            flow
        })
    }

    fn render(&mut self) {
        self.controller
            .refresh_hover(&mut self.ctx, &mut self.windows);
        self.ctx.render(&self.windows, &self.menus, &self.info);
    }

    fn queue_autoplay(&mut self) {
        let Some(days) = self.autoplay else {
            return;
        };
        if self.days_closed >= days {
            return;
        }
        match query::phase(&self.world) {
            DayPhase::Opening => {
                self.screens.dismiss_welcome(&mut self.windows);
                self.signals.push(signals::START_DAY);
            }
            DayPhase::Closed => self.signals.push(signals::NEXT_DAY),
            DayPhase::Running | DayPhase::Closing => {}
        }
    }

    fn autoplay_finished(&self) -> bool {
        self.autoplay.is_some_and(|days| self.days_closed >= days)
    }

    fn dispatch(&mut self, signal: Signal, events: &mut Vec<Event>) {
        debug!(signal = signal.get(), "dispatching signal");
        match signal {
            signals::START_DAY => {
                if query::phase(&self.world) == DayPhase::Opening {
                    world::apply(&mut self.world, Command::StartDay, events);
                }
            }
            signals::NEXT_DAY => {
                if query::phase(&self.world) == DayPhase::Closed {
                    world::apply(&mut self.world, Command::AdvanceDay, events);
                }
            }
            signals::NEW_GAME => {
                let screen = &self.config.screen;
                if let Err(error) =
                    self.screens
                        .open_new_game(&mut self.windows, screen.columns, screen.rows)
                {
                    error!(%error, "new game dialog does not fit");
                }
            }
            signals::CONFIRM_NEW_GAME => {
                let name = self
                    .screens
                    .dialog()
                    .and_then(|dialog| dialog.name(&self.windows));
                self.windows.queue_destroy_all();
                self.restart = Some(PendingRestart { name });
            }
            signals::EXIT => self.quit = true,
            other => debug!(signal = other.get(), "ignoring unknown signal"),
        }
    }

    fn restart(&mut self, name: Option<String>, events: &mut Vec<Event>) {
        let (world, setup) = new_game(&self.config, name.as_deref());
        let screen = &self.config.screen;
        match Screens::open(&mut self.windows, &world, screen.columns, screen.rows) {
            Ok(screens) => self.screens = screens,
            Err(error) => {
                error!(%error, "failed to rebuild the game screens");
                self.quit = true;
                return;
            }
        }
        self.world = world;
        self.arrivals = Arrivals::new(
            self.config
                .customers
                .arrivals(self.config.simulation.seed ^ ARRIVALS_SEED_SALT),
        );
        self.bookkeeping = Bookkeeping::new();
        self.days_closed = 0;
        events.extend(setup);
    }
}

/// Builds a world from the configuration and installs the catalog cabinets.
///
/// Returns the world with the events its setup produced.
#[must_use]
pub fn new_game(config: &ArcadeConfig, name: Option<&str>) -> (World, Vec<Event>) {
    let simulation = &config.simulation;
    let mut world = World::with_seed(simulation.seed);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureProperty {
            layout: config.property.to_layout(name),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::ConfigureLogicStep {
            step_duration: simulation.logic_step(),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::ConfigureDayLength {
            ticks: simulation.day_length,
        },
        &mut events,
    );

    for entry in &config.catalog {
        let first = events.len();
        world::apply(
            &mut world,
            Command::PlaceCabinet {
                record: entry.record(),
                position: entry.tile(),
            },
            &mut events,
        );
        let placed = events[first..].iter().find_map(|event| match event {
            Event::CabinetPlaced { cabinet, .. } => Some(*cabinet),
            _ => None,
        });
        if let (Some(cabinet), Some(cents)) = (placed, entry.price_cents) {
            world::apply(
                &mut world,
                Command::SetCabinetPrice {
                    cabinet,
                    price: Money::from_cents(cents),
                },
                &mut events,
            );
        }
    }

    info!(
        arcade = %query::property_layout(&world).name,
        cabinets = query::cabinet_view(&world).len(),
        seed = simulation.seed,
        "new game started"
    );
    (world, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_applies_catalog_prices() {
        let mut config = ArcadeConfig::default();
        config.catalog[0].price_cents = Some(50);
        let (world, events) = new_game(&config, Some("NEON"));

        assert_eq!(query::property_layout(&world).name, "NEON");
        let placed = events
            .iter()
            .filter(|event| matches!(event, Event::CabinetPlaced { .. }))
            .count();
        assert_eq!(placed, config.catalog.len());
        let prices: Vec<_> = query::cabinet_view(&world)
            .iter()
            .map(|cabinet| cabinet.price)
            .collect();
        assert_eq!(prices[0], Money::from_cents(50));
        assert_eq!(query::cheapest_price(&world), Some(Money::from_cents(25)));
    }

    #[test]
    fn signals_outside_their_phase_are_ignored() {
        let mut session = Session::new(ArcadeConfig::default()).unwrap();
        let mut events = Vec::new();
        session.dispatch(signals::NEXT_DAY, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::phase(session.world()), DayPhase::Opening);

        session.dispatch(signals::START_DAY, &mut events);
        session.dispatch(signals::START_DAY, &mut events);
        let opened = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::DayPhaseChanged {
                        phase: DayPhase::Running
                    }
                )
            })
            .count();
        assert_eq!(opened, 1);
    }
}
