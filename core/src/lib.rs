#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arcade Manager engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{
    collections::BTreeMap,
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Arcade Manager.";

/// Number of days in every in-game year. Leap years do not exist.
pub const DAYS_PER_YEAR: i64 = 365;

/// Describes which part of the business day the simulation is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    /// Doors are shut and the player prepares the next day.
    Opening,
    /// The arcade is open; customers arrive and play.
    Running,
    /// Closing time passed; remaining customers walk out.
    Closing,
    /// Every customer left and the day's ledger is final.
    Closed,
}

impl DayPhase {
    /// Reports whether logic ticks advance customers during this phase.
    #[must_use]
    pub const fn simulates(self) -> bool {
        matches!(self, Self::Running | Self::Closing)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the property layout, clearing cabinets and customers.
    ConfigureProperty {
        /// Layout describing the new property.
        layout: PropertyLayout,
    },
    /// Updates the duration that must accumulate before a logic tick runs.
    ConfigureLogicStep {
        /// Simulated time consumed by a single logic tick.
        step_duration: Duration,
    },
    /// Updates how many logic ticks the arcade stays open each day.
    ConfigureDayLength {
        /// Number of logic ticks in an open day.
        ticks: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Installs a catalog cabinet into the property.
    PlaceCabinet {
        /// Catalog entry describing the machine.
        record: CatalogRecord,
        /// Explicit tile for the cabinet, or `None` to use the next free slot.
        position: Option<TilePos>,
    },
    /// Changes the price charged per game on a cabinet.
    SetCabinetPrice {
        /// Cabinet to reprice.
        cabinet: CabinetId,
        /// New price per game.
        price: Money,
    },
    /// Requests that a customer with the provided profile enters at the door.
    AdmitCustomer {
        /// Traits of the arriving customer.
        profile: CustomerProfile,
    },
    /// Opens the arcade for the current day.
    StartDay,
    /// Rolls the ledger over and moves the calendar to the next day.
    AdvanceDay,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Indicates that a fixed-step logic tick ran.
    LogicTicked {
        /// Index of the logic tick within the current day.
        tick: u32,
    },
    /// Confirms that a cabinet was installed.
    CabinetPlaced {
        /// Identifier allocated to the cabinet.
        cabinet: CabinetId,
        /// Tile occupied by the cabinet.
        position: TilePos,
        /// Number of play positions that fit around the cabinet.
        play_positions: usize,
    },
    /// Reports that a cabinet placement request was rejected.
    CabinetPlacementRejected {
        /// Name of the catalog entry that could not be placed.
        name: String,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a customer walked in through the door.
    CustomerArrived {
        /// Identifier assigned to the customer.
        customer: CustomerId,
        /// Display name of the customer.
        name: String,
    },
    /// Reports that an arriving customer could not be admitted.
    CustomerTurnedAway {
        /// Display name of the customer.
        name: String,
    },
    /// Confirms that a customer paid for a game.
    PlayStarted {
        /// Paying customer.
        customer: CustomerId,
        /// Cabinet being played.
        cabinet: CabinetId,
        /// Amount charged.
        price: Money,
    },
    /// Confirms that a customer finished a game.
    PlayFinished {
        /// Customer that stepped away.
        customer: CustomerId,
        /// Cabinet that was released.
        cabinet: CabinetId,
    },
    /// Reports that a customer gave up waiting on a busy cabinet.
    WaitAbandoned {
        /// Customer that ran out of patience for the queue.
        customer: CustomerId,
    },
    /// Confirms that a customer was removed from the property.
    CustomerLeft {
        /// Customer that left.
        customer: CustomerId,
        /// Why the customer left.
        reason: DepartureReason,
    },
    /// Announces that the day moved into a new phase.
    DayPhaseChanged {
        /// Phase that became active.
        phase: DayPhase,
    },
    /// Publishes the final ledger of a day once every customer left.
    DayClosed {
        /// Final ledger for the day.
        ledger: DayLedger,
    },
    /// Confirms that the calendar moved to a new day.
    DayAdvanced {
        /// Date that became current.
        date: Date,
    },
    /// Publishes a summary report derived from a closed day.
    DayReportPublished {
        /// Report produced by the bookkeeping system.
        report: DayReport,
    },
}

/// Reasons a customer leaves the property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepartureReason {
    /// Walked out through the door.
    WalkedOut,
    /// Could no longer afford the cheapest cabinet.
    OutOfCash,
    /// Patience ran out.
    OutOfPatience,
}

/// Reasons a cabinet placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested tile lies outside the property.
    OutOfBounds,
    /// The requested tile already holds a cabinet or customer.
    Occupied,
    /// The requested tile is the property's door.
    DoorBlocked,
    /// No free tile remains for the cabinet.
    NoFreeSpace,
    /// Cabinets can only be installed while the arcade is shut.
    InvalidPhase,
}

/// Cardinal directions used when probing neighbouring tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Probe order used when assigning play positions.
    pub const PRIORITY: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to a cabinet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CabinetId(u32);

impl CabinetId {
    /// Creates a new cabinet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(u32);

impl CustomerId {
    /// Creates a new customer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single property tile expressed as column and row.
///
/// Coordinates are signed so neighbour probes next to the property edge can
/// be expressed and rejected by bounds checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    column: i32,
    row: i32,
}

impl TilePos {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the neighbouring tile in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (column, row) = direction.delta();
        Self::new(self.column + column, self.row + row)
    }

    /// Returns the tile offset by the provided deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Straight-line distance between two tiles.
    #[must_use]
    pub fn euclidean_distance(self, other: TilePos) -> f64 {
        let columns = f64::from(self.column - other.column);
        let rows = f64::from(self.row - other.row);
        columns.hypot(rows)
    }

    /// Number of king moves separating two tiles.
    #[must_use]
    pub fn chebyshev_distance(self, other: TilePos) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Amount of money measured in whole cents.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// No money at all.
    pub const ZERO: Money = Money(0);

    /// Creates an amount from a count of cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates an amount from whole dollars.
    #[must_use]
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Retrieves the amount in cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Reports whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Magnitude of the amount.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl fmt::Display for Money {
    /// Formats as dollars with thousands separators, e.g. `$1,234.05`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let dollars = (magnitude / 100).to_string();
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (index, digit) in dollars.chars().enumerate() {
            if index > 0 && (dollars.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{sign}${grouped}.{:02}", magnitude % 100)
    }
}

/// Game genre used to match customers with cabinets.
///
/// Genres are compared case-insensitively by normalising to upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Genre(String);

impl Genre {
    /// Creates a genre tag from free-form text.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_uppercase())
    }

    /// Normalised genre name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed cabinet catalog entry supplied by an external catalog source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Title of the machine.
    pub name: String,
    /// Short blurb shown in catalog screens.
    pub description: String,
    /// Year the machine was released.
    pub release_year: i32,
    /// Genre tag of the machine.
    pub genre: Genre,
    /// Number of simultaneous players the machine supports.
    pub players: u8,
}

/// Traits of a customer about to enter the arcade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerProfile {
    /// Display name.
    pub name: String,
    /// Favourite genre.
    pub preference: Genre,
    /// Cash carried on arrival.
    pub cash: Money,
    /// Starting patience.
    pub patience: i32,
}

/// Behaviour state of a customer agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerState {
    /// Just walked through the door.
    Enter,
    /// Strolling around without a target.
    Wander,
    /// Walking toward a target cabinet.
    Move,
    /// Queueing for a busy cabinet.
    Wait,
    /// Playing a game.
    Play,
    /// Heading for the door.
    Leave,
}

/// Month of the in-game calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    /// January.
    Jan,
    /// February.
    Feb,
    /// March.
    Mar,
    /// April.
    Apr,
    /// May.
    May,
    /// June.
    Jun,
    /// July.
    Jul,
    /// August.
    Aug,
    /// September.
    Sep,
    /// October.
    Oct,
    /// November.
    Nov,
    /// December.
    Dec,
}

impl Month {
    /// Months in calendar order.
    pub const ALL: [Month; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    /// Number of days in the month. February always has 28.
    #[must_use]
    pub const fn days(self) -> u8 {
        match self {
            Self::Feb => 28,
            Self::Apr | Self::Jun | Self::Sep | Self::Nov => 30,
            _ => 31,
        }
    }

    /// Zero-based position of the month within the year.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Three-letter upper-case abbreviation.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Jan => "JAN",
            Self::Feb => "FEB",
            Self::Mar => "MAR",
            Self::Apr => "APR",
            Self::May => "MAY",
            Self::Jun => "JUN",
            Self::Jul => "JUL",
            Self::Aug => "AUG",
            Self::Sep => "SEP",
            Self::Oct => "OCT",
            Self::Nov => "NOV",
            Self::Dec => "DEC",
        }
    }

    /// Number of days in the year that precede the first of this month.
    #[must_use]
    pub fn days_before(self) -> u16 {
        Self::ALL[..self.index()]
            .iter()
            .map(|month| u16::from(month.days()))
            .sum()
    }
}

/// Calendar date derived from an absolute day counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Date {
    /// Absolute day counter; day 0 is 1 JAN of year 0.
    pub absolute_day: i64,
    /// Year number.
    pub year: i64,
    /// Month of the year.
    pub month: Month,
    /// One-based day of the month.
    pub day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02} {}, Year {}",
            self.day,
            self.month.abbreviation(),
            self.year
        )
    }
}

/// Financial record of a single day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLedger {
    /// Date the ledger belongs to.
    pub date: Date,
    /// Money taken in.
    pub income: Money,
    /// Money paid out, stored as a positive magnitude.
    pub expenses: Money,
    /// Customers admitted through the door.
    pub visitors: u32,
    /// Games played across all cabinets.
    pub plays: u32,
    /// Signed running total per cabinet.
    pub income_per_cabinet: BTreeMap<CabinetId, Money>,
}

impl DayLedger {
    /// Creates an empty ledger for the provided date.
    #[must_use]
    pub fn new(date: Date) -> Self {
        Self {
            date,
            income: Money::ZERO,
            expenses: Money::ZERO,
            visitors: 0,
            plays: 0,
            income_per_cabinet: BTreeMap::new(),
        }
    }

    /// Income minus expenses.
    #[must_use]
    pub fn net(&self) -> Money {
        self.income - self.expenses
    }

    /// Books a transaction, optionally attributing it to a cabinet.
    ///
    /// Positive amounts count as income, everything else as an expense.
    pub fn record(&mut self, cabinet: Option<CabinetId>, amount: Money) {
        if let Some(cabinet) = cabinet {
            *self.income_per_cabinet.entry(cabinet).or_default() += amount;
        }
        if amount.is_positive() {
            self.income += amount;
        } else {
            self.expenses += amount.abs();
        }
    }
}

/// Summary of a closed day published by the bookkeeping system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    /// Date the report covers.
    pub date: Date,
    /// Money taken in.
    pub income: Money,
    /// Money paid out.
    pub expenses: Money,
    /// Income minus expenses.
    pub net: Money,
    /// Customers admitted.
    pub visitors: u32,
    /// Games played.
    pub plays: u32,
    /// Highest-earning cabinet of the day, if any earned money.
    pub top_cabinet: Option<(CabinetId, Money)>,
    /// Mean daily income over the trailing reporting window.
    pub trailing_average_income: Money,
}

/// Static description of an arcade property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyLayout {
    /// Display name.
    pub name: String,
    /// Largest valid column index.
    pub width: i32,
    /// Largest valid row index.
    pub height: i32,
    /// Tile customers enter and leave through.
    pub door: TilePos,
    /// Maximum number of customers inside at once.
    pub capacity: u32,
    /// Percent chance per logic tick that a customer shows up when empty.
    pub popularity: u32,
    /// Expense charged whenever a day starts.
    pub rent: Money,
    /// Preferred cabinet tiles in installation order.
    pub cabinet_slots: Vec<TilePos>,
}

impl PropertyLayout {
    /// Reports whether the tile lies within the inclusive property bounds.
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.column() >= 0 && pos.row() >= 0 && pos.column() <= self.width && pos.row() <= self.height
    }
}

/// Immutable representation of a single cabinet used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CabinetSnapshot {
    /// Identifier of the cabinet.
    pub id: CabinetId,
    /// Title of the machine.
    pub name: String,
    /// Genre tag.
    pub genre: Genre,
    /// Price per game.
    pub price: Money,
    /// Tile occupied by the cabinet.
    pub position: TilePos,
    /// Tiles customers stand on while playing.
    pub play_positions: Vec<TilePos>,
    /// Player count from the catalog.
    pub players: u8,
    /// Customers currently playing.
    pub current_players: u8,
    /// Whether every play position is taken.
    pub busy: bool,
    /// Games played today.
    pub plays_today: u32,
    /// Money earned today.
    pub income_today: Money,
}

/// Read-only snapshot describing all cabinets in the property.
#[derive(Clone, Debug, Default)]
pub struct CabinetView {
    snapshots: Vec<CabinetSnapshot>,
}

impl CabinetView {
    /// Creates a new cabinet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CabinetSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CabinetSnapshot> {
        self.snapshots.iter()
    }

    /// Number of cabinets captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no cabinets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CabinetSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single customer used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomerSnapshot {
    /// Identifier of the customer.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Favourite genre.
    pub preference: Genre,
    /// Cash left.
    pub cash: Money,
    /// Patience left.
    pub patience: i32,
    /// Tile currently occupied.
    pub position: TilePos,
    /// Behaviour state.
    pub state: CustomerState,
    /// Cabinet the customer is heading for or playing.
    pub target: Option<CabinetId>,
}

/// Read-only snapshot describing all customers inside the property.
#[derive(Clone, Debug, Default)]
pub struct CustomerView {
    snapshots: Vec<CustomerSnapshot>,
}

impl CustomerView {
    /// Creates a new customer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CustomerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of customers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no customers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Occupancy figures the arrival system uses to roll for new customers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrivalOutlook {
    /// Customers currently inside.
    pub customers: u32,
    /// Maximum customers allowed inside.
    pub capacity: u32,
    /// Popularity of the property in percent.
    pub popularity: u32,
}

impl ArrivalOutlook {
    /// Fraction of capacity in use, between 0.0 and 1.0.
    #[must_use]
    pub fn busy_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        (f64::from(self.customers) / f64::from(self.capacity)).min(1.0)
    }
}
