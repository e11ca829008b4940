//! Arcade cabinets, their play positions and per-day statistics.

use std::collections::VecDeque;

use arcade_manager_core::{
    CabinetId, CabinetSnapshot, CatalogRecord, CustomerId, Genre, Money, TilePos,
};

/// Price charged per game unless the player reprices the cabinet.
pub const DEFAULT_PRICE: Money = Money::from_cents(25);

/// Logic ticks a single game lasts.
pub const DEFAULT_PLAYTIME: u32 = 5;

/// Upper bound on play positions around one cabinet.
pub const MAX_PLAY_POSITIONS: usize = 5;

/// Number of closed days of statistics retained per cabinet.
pub const CABINET_HISTORY_DAYS: usize = 30;

/// Plays and income a cabinet recorded during one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CabinetDay {
    /// Absolute day the statistics belong to.
    pub day: i64,
    /// Games played.
    pub plays: u32,
    /// Money earned.
    pub income: Money,
}

/// Coin-operated machine installed in the property.
#[derive(Clone, Debug)]
pub struct Cabinet {
    id: CabinetId,
    record: CatalogRecord,
    price: Money,
    playtime: u32,
    position: TilePos,
    play_positions: Vec<TilePos>,
    slots: Vec<Option<CustomerId>>,
    today: CabinetDay,
    history: VecDeque<CabinetDay>,
}

impl Cabinet {
    /// Creates a cabinet installed at `position` with precomputed play positions.
    #[must_use]
    pub fn new(
        id: CabinetId,
        record: CatalogRecord,
        position: TilePos,
        play_positions: Vec<TilePos>,
    ) -> Self {
        let slots = vec![None; play_positions.len()];
        Self {
            id,
            record,
            price: DEFAULT_PRICE,
            playtime: DEFAULT_PLAYTIME,
            position,
            play_positions,
            slots,
            today: CabinetDay::default(),
            history: VecDeque::with_capacity(CABINET_HISTORY_DAYS),
        }
    }

    /// Identifier of the cabinet.
    #[must_use]
    pub const fn id(&self) -> CabinetId {
        self.id
    }

    /// Catalog data the cabinet was created from.
    #[must_use]
    pub const fn record(&self) -> &CatalogRecord {
        &self.record
    }

    /// Genre tag of the machine.
    #[must_use]
    pub const fn genre(&self) -> &Genre {
        &self.record.genre
    }

    /// Price per game.
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }

    /// Changes the price per game. Negative prices are clamped to zero.
    pub fn set_price(&mut self, price: Money) {
        self.price = price.max(Money::ZERO);
    }

    /// Logic ticks a single game lasts.
    #[must_use]
    pub const fn playtime(&self) -> u32 {
        self.playtime
    }

    /// Tile the cabinet stands on.
    #[must_use]
    pub const fn position(&self) -> TilePos {
        self.position
    }

    /// Tiles players stand on, in slot order.
    #[must_use]
    pub fn play_positions(&self) -> &[TilePos] {
        &self.play_positions
    }

    /// Number of simultaneous players the installation supports.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.play_positions.len()
    }

    /// Number of customers currently playing.
    #[must_use]
    pub fn current_players(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Reports whether every play position is taken.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.current_players() == self.capacity()
    }

    /// Earliest play slot nobody is using.
    #[must_use]
    pub fn next_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Reports whether the slot exists and is unused.
    #[must_use]
    pub fn is_slot_free(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(None))
    }

    /// Tile associated with a play slot.
    #[must_use]
    pub fn slot_position(&self, slot: usize) -> Option<TilePos> {
        self.play_positions.get(slot).copied()
    }

    /// Seats a customer in the slot and books the game into today's statistics.
    ///
    /// Returns the price to charge, or `None` when the slot is unavailable.
    pub fn start_play(&mut self, customer: CustomerId, slot: usize) -> Option<Money> {
        if !self.is_slot_free(slot) {
            return None;
        }
        self.slots[slot] = Some(customer);
        self.today.plays = self.today.plays.saturating_add(1);
        self.today.income += self.price;
        Some(self.price)
    }

    /// Releases whichever slot the customer occupies.
    ///
    /// Returns `false` when the customer was not playing this cabinet.
    pub fn end_play(&mut self, customer: CustomerId) -> bool {
        match self
            .slots
            .iter_mut()
            .find(|slot| **slot == Some(customer))
        {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Statistics of the running day.
    #[must_use]
    pub const fn today(&self) -> CabinetDay {
        self.today
    }

    /// Closed days from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = &CabinetDay> {
        self.history.iter()
    }

    /// Archives today's statistics under `day` and starts a fresh record.
    pub fn close_day(&mut self, day: i64) {
        let mut finished = std::mem::take(&mut self.today);
        finished.day = day;
        if self.history.len() == CABINET_HISTORY_DAYS {
            let _ = self.history.pop_front();
        }
        self.history.push_back(finished);
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> CabinetSnapshot {
        CabinetSnapshot {
            id: self.id,
            name: self.record.name.clone(),
            genre: self.record.genre.clone(),
            price: self.price,
            position: self.position,
            play_positions: self.play_positions.clone(),
            players: self.record.players,
            current_players: u8::try_from(self.current_players()).unwrap_or(u8::MAX),
            busy: self.is_busy(),
            plays_today: self.today.plays,
            income_today: self.today.income,
        }
    }
}
