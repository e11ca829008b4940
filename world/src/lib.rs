#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Arcade Manager.

pub mod cabinet;
pub mod calendar;
pub mod customer;
pub mod property;

use std::time::Duration;

use arcade_manager_core::{
    CabinetId, CatalogRecord, Command, CustomerId, CustomerProfile, CustomerState, DayPhase,
    DepartureReason, Event, Money, PlacementError, TilePos, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{
    cabinet::Cabinet,
    calendar::EconomyCalendar,
    customer::{AgentOutcome, Customer, Floor},
    property::Property,
};

/// Simulated time consumed by one logic tick unless reconfigured.
pub const DEFAULT_LOGIC_STEP: Duration = Duration::from_millis(100);

/// Logic ticks the arcade stays open each day unless reconfigured.
pub const DEFAULT_DAY_LENGTH: u32 = 184;

/// Funds a new game starts with.
pub const STARTING_FUNDS: Money = Money::from_dollars(10);

/// Scale applied to the occupancy ratio when deciding crowding evictions.
pub const CROWDING_PATIENCE_SCALE: f64 = 10.0;

const DEFAULT_RNG_SEED: u64 = 0x0a4c_ade0_5eed_2024;

/// Represents the authoritative Arcade Manager world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    property: Property,
    cabinets: Vec<Cabinet>,
    customers: Vec<Customer>,
    calendar: EconomyCalendar,
    funds: Money,
    phase: DayPhase,
    rng: ChaCha8Rng,
    accumulator: Duration,
    logic_step: Duration,
    day_tick: u32,
    day_length: u32,
    next_cabinet_id: u32,
    next_customer_id: u32,
}

impl World {
    /// Creates a new world with the starter property and a fixed seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_RNG_SEED)
    }

    /// Creates a new world whose customer behaviour derives from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            banner: WELCOME_BANNER,
            property: Property::default(),
            cabinets: Vec::new(),
            customers: Vec::new(),
            calendar: EconomyCalendar::default(),
            funds: STARTING_FUNDS,
            phase: DayPhase::Opening,
            rng: ChaCha8Rng::seed_from_u64(seed),
            accumulator: Duration::ZERO,
            logic_step: DEFAULT_LOGIC_STEP,
            day_tick: 0,
            day_length: DEFAULT_DAY_LENGTH,
            next_cabinet_id: 0,
            next_customer_id: 0,
        }
    }

    fn cheapest_price(&self) -> Option<Money> {
        self.cabinets.iter().map(Cabinet::price).min()
    }

    fn set_phase(&mut self, phase: DayPhase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        info!(?phase, day = self.calendar.date().absolute_day, "day phase changed");
        self.phase = phase;
        out_events.push(Event::DayPhaseChanged { phase });
    }

    fn place_cabinet(
        &mut self,
        record: CatalogRecord,
        position: Option<TilePos>,
        out_events: &mut Vec<Event>,
    ) {
        let name = record.name.clone();
        let placement = if self.phase.simulates() {
            Err(PlacementError::InvalidPhase)
        } else {
            let position = match position {
                Some(position) => Some(position),
                None => self.property.next_cabinet_position(&mut self.rng),
            };
            let id = CabinetId::new(self.next_cabinet_id);
            position
                .ok_or(PlacementError::NoFreeSpace)
                .and_then(|position| self.property.place_cabinet(id, record, position))
        };

        match placement {
            Ok(cabinet) => {
                self.next_cabinet_id = self.next_cabinet_id.saturating_add(1);
                debug!(
                    cabinet = cabinet.id().get(),
                    %name,
                    play_positions = cabinet.capacity(),
                    "cabinet placed"
                );
                out_events.push(Event::CabinetPlaced {
                    cabinet: cabinet.id(),
                    position: cabinet.position(),
                    play_positions: cabinet.capacity(),
                });
                self.cabinets.push(cabinet);
            }
            Err(reason) => {
                warn!(%name, ?reason, "cabinet placement rejected");
                out_events.push(Event::CabinetPlacementRejected { name, reason });
            }
        }
    }

    fn admit_customer(&mut self, profile: CustomerProfile, out_events: &mut Vec<Event>) {
        let capacity = usize::try_from(self.property.layout().capacity).unwrap_or(usize::MAX);
        let id = CustomerId::new(self.next_customer_id);
        if self.phase != DayPhase::Running
            || self.customers.len() >= capacity
            || !self.property.admit(id)
        {
            debug!(name = %profile.name, "customer turned away");
            out_events.push(Event::CustomerTurnedAway { name: profile.name });
            return;
        }

        self.next_customer_id = self.next_customer_id.saturating_add(1);
        self.calendar.record_visitor();
        let name = profile.name.clone();
        self.customers
            .push(Customer::new(id, profile, self.property.door()));
        debug!(customer = id.get(), %name, "customer arrived");
        out_events.push(Event::CustomerArrived { customer: id, name });
    }

    fn start_day(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != DayPhase::Opening {
            debug!(phase = ?self.phase, "start day ignored");
            return;
        }
        let rent = self.property.layout().rent;
        if rent.is_positive() {
            self.funds -= rent;
            self.calendar.record_transaction(None, -rent);
        }
        self.day_tick = 0;
        self.accumulator = Duration::ZERO;
        self.set_phase(DayPhase::Running, out_events);
    }

    fn advance_day(&mut self, out_events: &mut Vec<Event>) {
        if !matches!(self.phase, DayPhase::Closed | DayPhase::Opening) {
            debug!(phase = ?self.phase, "advance day ignored");
            return;
        }
        self.calendar.roll_day();
        out_events.push(Event::DayAdvanced {
            date: self.calendar.date(),
        });
        self.set_phase(DayPhase::Opening, out_events);
    }

    fn run_logic_tick(&mut self, out_events: &mut Vec<Event>) {
        if self.phase == DayPhase::Running {
            self.day_tick = self.day_tick.saturating_add(1);
        }

        self.sweep_departures(out_events);
        if self.phase == DayPhase::Running {
            self.evict_most_impatient(out_events);
        }
        self.step_customers(out_events);
        self.sweep_departures(out_events);
        out_events.push(Event::LogicTicked {
            tick: self.day_tick,
        });

        if self.phase == DayPhase::Running && self.day_tick >= self.day_length {
            self.begin_closing(out_events);
        }
        if self.phase == DayPhase::Closing && self.customers.is_empty() {
            self.close_day(out_events);
        }
    }

    fn step_customers(&mut self, out_events: &mut Vec<Event>) {
        let mut floor = Floor {
            property: &mut self.property,
            cabinets: &mut self.cabinets,
            rng: &mut self.rng,
        };
        for customer in &mut self.customers {
            let Some(outcome) = customer.act(&mut floor) else {
                continue;
            };
            match outcome {
                AgentOutcome::PlayStarted { cabinet, price } => {
                    self.funds += price;
                    self.calendar.record_transaction(Some(cabinet), price);
                    self.calendar.record_play();
                    out_events.push(Event::PlayStarted {
                        customer: customer.id(),
                        cabinet,
                        price,
                    });
                }
                AgentOutcome::PlayFinished { cabinet } => {
                    out_events.push(Event::PlayFinished {
                        customer: customer.id(),
                        cabinet,
                    });
                }
                AgentOutcome::WaitAbandoned => {
                    out_events.push(Event::WaitAbandoned {
                        customer: customer.id(),
                    });
                }
                AgentOutcome::ReachedDoor => {}
            }
        }
    }

    /// Removes customers who walked out, ran out of patience, or can no
    /// longer afford any cabinet. Customers mid-game finish before the cash
    /// check applies.
    fn sweep_departures(&mut self, out_events: &mut Vec<Event>) {
        let cheapest = self.cheapest_price();
        let mut index = 0;
        while let Some(customer) = self.customers.get(index) {
            let reason = if customer.is_destroyed() {
                Some(DepartureReason::WalkedOut)
            } else if customer.patience() <= 0 {
                Some(DepartureReason::OutOfPatience)
            } else if !customer.is_playing()
                && cheapest.map_or(false, |price| customer.cash() < price)
            {
                Some(DepartureReason::OutOfCash)
            } else {
                None
            };

            match reason {
                Some(reason) => self.remove_customer(index, reason, out_events),
                None => index += 1,
            }
        }
    }

    fn remove_customer(&mut self, index: usize, reason: DepartureReason, out_events: &mut Vec<Event>) {
        let mut customer = self.customers.remove(index);
        if let Some(cabinet) = customer.release(&mut self.cabinets) {
            out_events.push(Event::PlayFinished {
                customer: customer.id(),
                cabinet,
            });
        }
        let _ = self.property.vacate(customer.position());
        debug!(customer = customer.id().get(), ?reason, "customer left");
        out_events.push(Event::CustomerLeft {
            customer: customer.id(),
            reason,
        });
    }

    /// Sends the most impatient customer home when the arcade is crowded
    /// relative to that customer's patience.
    fn evict_most_impatient(&mut self, out_events: &mut Vec<Event>) {
        let capacity = self.property.layout().capacity;
        if capacity == 0 || self.customers.is_empty() {
            return;
        }
        let busy_ratio = self.customers.len() as f64 / f64::from(capacity);
        let threshold = CROWDING_PATIENCE_SCALE * busy_ratio;

        let Some(customer) = self
            .customers
            .iter_mut()
            .filter(|customer| customer.state() != CustomerState::Leave)
            .min_by_key(|customer| customer.patience())
        else {
            return;
        };
        if f64::from(customer.patience()) >= threshold {
            return;
        }

        debug!(customer = customer.id().get(), "crowding sends customer home");
        if let Some(cabinet) = customer.begin_leave(&mut self.cabinets) {
            out_events.push(Event::PlayFinished {
                customer: customer.id(),
                cabinet,
            });
        }
    }

    fn begin_closing(&mut self, out_events: &mut Vec<Event>) {
        self.set_phase(DayPhase::Closing, out_events);
        for customer in &mut self.customers {
            if let Some(cabinet) = customer.begin_leave(&mut self.cabinets) {
                out_events.push(Event::PlayFinished {
                    customer: customer.id(),
                    cabinet,
                });
            }
        }
    }

    fn close_day(&mut self, out_events: &mut Vec<Event>) {
        let day = self.calendar.date().absolute_day;
        for cabinet in &mut self.cabinets {
            cabinet.close_day(day);
        }
        self.accumulator = Duration::ZERO;
        self.set_phase(DayPhase::Closed, out_events);
        out_events.push(Event::DayClosed {
            ledger: self.calendar.ledger().clone(),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureProperty { layout } => {
            if world.phase.simulates() {
                warn!(name = %layout.name, "property cannot change while the arcade is open");
                return;
            }
            world.property = Property::new(layout);
            world.cabinets.clear();
            world.customers.clear();
            world.next_cabinet_id = 0;
        }
        Command::ConfigureLogicStep { step_duration } => {
            if step_duration.is_zero() {
                warn!("ignoring zero logic step");
                return;
            }
            world.logic_step = step_duration;
        }
        Command::ConfigureDayLength { ticks } => {
            world.day_length = ticks.max(1);
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            if !world.phase.simulates() {
                world.accumulator = Duration::ZERO;
                return;
            }
            world.accumulator = world.accumulator.saturating_add(dt);
            while world.phase.simulates() && world.accumulator >= world.logic_step {
                world.accumulator -= world.logic_step;
                world.run_logic_tick(out_events);
            }
        }
        Command::PlaceCabinet { record, position } => {
            world.place_cabinet(record, position, out_events);
        }
        Command::SetCabinetPrice { cabinet, price } => {
            if let Some(target) = world
                .cabinets
                .iter_mut()
                .find(|candidate| candidate.id() == cabinet)
            {
                target.set_price(price);
            }
        }
        Command::AdmitCustomer { profile } => world.admit_customer(profile, out_events),
        Command::StartDay => world.start_day(out_events),
        Command::AdvanceDay => world.advance_day(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use arcade_manager_core::{
        ArrivalOutlook, CabinetId, CabinetView, CustomerView, Date, DayLedger, DayPhase, Money,
        PropertyLayout, TilePos,
    };

    use super::World;
    use crate::{cabinet::CabinetDay, property::Occupant};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current phase of the business day.
    #[must_use]
    pub fn phase(world: &World) -> DayPhase {
        world.phase
    }

    /// Current calendar date.
    #[must_use]
    pub fn date(world: &World) -> Date {
        world.calendar.date()
    }

    /// Money available to the player.
    #[must_use]
    pub fn funds(world: &World) -> Money {
        world.funds
    }

    /// Ledger collecting today's transactions.
    #[must_use]
    pub fn ledger(world: &World) -> &DayLedger {
        world.calendar.ledger()
    }

    /// Closed ledgers from oldest to newest.
    pub fn ledger_history(world: &World) -> impl Iterator<Item = &DayLedger> {
        world.calendar.history()
    }

    /// Static description of the property.
    #[must_use]
    pub fn property_layout(world: &World) -> &PropertyLayout {
        world.property.layout()
    }

    /// Reports what stands on a tile.
    #[must_use]
    pub fn occupant(world: &World, pos: TilePos) -> Option<Occupant> {
        world.property.occupant(pos)
    }

    /// Reports whether a tile is inside the property and unoccupied.
    #[must_use]
    pub fn is_space_empty(world: &World, pos: TilePos) -> bool {
        world.property.is_space_empty(pos)
    }

    /// Captures a read-only view of the installed cabinets.
    #[must_use]
    pub fn cabinet_view(world: &World) -> CabinetView {
        CabinetView::from_snapshots(world.cabinets.iter().map(|cabinet| cabinet.snapshot()).collect())
    }

    /// Captures a read-only view of the customers inside.
    #[must_use]
    pub fn customer_view(world: &World) -> CustomerView {
        CustomerView::from_snapshots(
            world
                .customers
                .iter()
                .map(|customer| customer.snapshot())
                .collect(),
        )
    }

    /// Closed days of statistics for one cabinet, oldest first.
    #[must_use]
    pub fn cabinet_history(world: &World, cabinet: CabinetId) -> Vec<CabinetDay> {
        world
            .cabinets
            .iter()
            .find(|candidate| candidate.id() == cabinet)
            .map(|candidate| candidate.history().copied().collect())
            .unwrap_or_default()
    }

    /// Cheapest price among installed cabinets.
    #[must_use]
    pub fn cheapest_price(world: &World) -> Option<Money> {
        world.cheapest_price()
    }

    /// Occupancy figures used to roll for arrivals.
    #[must_use]
    pub fn arrival_outlook(world: &World) -> ArrivalOutlook {
        let layout = world.property.layout();
        ArrivalOutlook {
            customers: u32::try_from(world.customers.len()).unwrap_or(u32::MAX),
            capacity: layout.capacity,
            popularity: layout.popularity,
        }
    }

    /// Progress through the open part of the current day.
    #[must_use]
    pub fn day_progress(world: &World) -> DayProgress {
        DayProgress {
            tick: world.day_tick,
            length: world.day_length,
        }
    }

    /// Logic ticks elapsed in the current day versus the day's length.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DayProgress {
        /// Logic ticks elapsed since the doors opened.
        pub tick: u32,
        /// Logic ticks the doors stay open.
        pub length: u32,
    }
}
