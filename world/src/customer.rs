//! Customer agents and their per-tick behaviour.

use arcade_manager_core::{
    CabinetId, CustomerId, CustomerProfile, CustomerSnapshot, CustomerState, Genre, Money, TilePos,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{cabinet::Cabinet, property::Property};

/// Ticks a customer strolls around after finishing a game or failing to find one.
pub const WANDER_TICKS: i32 = 3;

/// Patience lost when a target cabinet fills up before the customer reaches it.
pub const MOVE_BUSY_PENALTY: i32 = 5;

/// Patience gained when a cabinet of the favourite genre is chosen.
pub const PREFERRED_GENRE_BONUS: i32 = 1;

/// Probability that a freshly entered customer heads straight for a cabinet.
pub const ENTER_SEEK_CHANCE: f64 = 0.7;

/// Consecutive ticks without getting closer to a goal before the customer
/// gives up on it.
pub const STALL_LIMIT: u32 = 6;

/// Mutable surroundings a customer acts upon during a logic tick.
#[derive(Debug)]
pub struct Floor<'a> {
    /// Property holding the occupancy grid.
    pub property: &'a mut Property,
    /// Installed cabinets in placement order.
    pub cabinets: &'a mut [Cabinet],
    /// Source of randomness for wandering and entry decisions.
    pub rng: &'a mut ChaCha8Rng,
}

/// Notable result of a single customer decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The customer paid for and started a game.
    PlayStarted {
        /// Cabinet being played.
        cabinet: CabinetId,
        /// Amount paid.
        price: Money,
    },
    /// The customer finished a game.
    PlayFinished {
        /// Cabinet released.
        cabinet: CabinetId,
    },
    /// The customer stopped queueing for a busy cabinet.
    WaitAbandoned,
    /// The leaving customer stepped onto the door or squeezed past a
    /// blockage on the way out.
    ReachedDoor,
}

/// Customer walking around the property.
#[derive(Clone, Debug)]
pub struct Customer {
    id: CustomerId,
    name: String,
    preference: Genre,
    cash: Money,
    patience: i32,
    position: TilePos,
    state: CustomerState,
    target: Option<CabinetId>,
    target_pos: TilePos,
    slot: Option<usize>,
    timer: i32,
    stalled: u32,
    games_played: u32,
    destroy: bool,
}

impl Customer {
    /// Creates a customer standing on `position` in the entering state.
    #[must_use]
    pub fn new(id: CustomerId, profile: CustomerProfile, position: TilePos) -> Self {
        Self {
            id,
            name: profile.name,
            preference: profile.preference,
            cash: profile.cash,
            patience: profile.patience.max(0),
            position,
            state: CustomerState::Enter,
            target: None,
            target_pos: position,
            slot: None,
            timer: 0,
            stalled: 0,
            games_played: 0,
            destroy: false,
        }
    }

    /// Identifier of the customer.
    #[must_use]
    pub const fn id(&self) -> CustomerId {
        self.id
    }

    /// Cash left.
    #[must_use]
    pub const fn cash(&self) -> Money {
        self.cash
    }

    /// Patience left.
    #[must_use]
    pub const fn patience(&self) -> i32 {
        self.patience
    }

    /// Tile currently occupied.
    #[must_use]
    pub const fn position(&self) -> TilePos {
        self.position
    }

    /// Behaviour state.
    #[must_use]
    pub const fn state(&self) -> CustomerState {
        self.state
    }

    /// Cabinet the customer is heading for or playing.
    #[must_use]
    pub const fn target(&self) -> Option<CabinetId> {
        self.target
    }

    /// Tile the customer is walking toward.
    #[must_use]
    pub const fn target_position(&self) -> TilePos {
        self.target_pos
    }

    /// Number of games played since arriving.
    #[must_use]
    pub const fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Reports whether the customer walked out and awaits removal.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroy
    }

    /// Reports whether the customer is mid-game.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == CustomerState::Play
    }

    /// Runs one decision of the behaviour state machine.
    pub fn act(&mut self, floor: &mut Floor<'_>) -> Option<AgentOutcome> {
        match self.state {
            CustomerState::Enter => {
                if floor.rng.gen_bool(ENTER_SEEK_CHANCE) {
                    self.select_target(floor.cabinets);
                    if self.state == CustomerState::Move {
                        return self.approach(floor);
                    }
                } else {
                    self.state = CustomerState::Wander;
                    self.timer = WANDER_TICKS;
                }
                self.wander(floor);
                None
            }
            CustomerState::Wander => {
                self.timer -= 1;
                self.wander(floor);
                if self.timer < 1 {
                    self.select_target(floor.cabinets);
                }
                None
            }
            CustomerState::Move => self.pursue(floor),
            CustomerState::Wait => self.wait(floor),
            CustomerState::Play => self.play(floor),
            CustomerState::Leave => {
                let door = floor.property.door();
                if self.walk_toward(door, floor.property) || self.stalled >= STALL_LIMIT {
                    self.destroy = true;
                    return Some(AgentOutcome::ReachedDoor);
                }
                None
            }
        }
    }

    /// Picks the best cabinet to play.
    ///
    /// Busy and unaffordable cabinets are skipped, the favourite genre beats
    /// any other, and within the same class the closer cabinet wins. Ties go
    /// to the cabinet placed first.
    pub fn select_target(&mut self, cabinets: &[Cabinet]) {
        let mut best: Option<(&Cabinet, bool, f64)> = None;
        for cabinet in cabinets {
            if cabinet.is_busy() || cabinet.price() > self.cash {
                continue;
            }
            let preferred = *cabinet.genre() == self.preference;
            let distance = self.position.euclidean_distance(cabinet.position());
            let better = match best {
                None => true,
                Some((_, best_preferred, best_distance)) => {
                    (preferred && !best_preferred)
                        || (preferred == best_preferred && distance < best_distance)
                }
            };
            if better {
                best = Some((cabinet, preferred, distance));
            }
        }

        self.stalled = 0;
        let choice = best.and_then(|(cabinet, preferred, _)| {
            let slot = cabinet.next_free_slot()?;
            Some((cabinet.id(), slot, cabinet.slot_position(slot)?, preferred))
        });
        match choice {
            Some((cabinet, slot, position, preferred)) => {
                self.state = CustomerState::Move;
                self.target = Some(cabinet);
                self.slot = Some(slot);
                self.target_pos = position;
                if preferred {
                    self.patience = self.patience.saturating_add(PREFERRED_GENRE_BONUS);
                }
            }
            None => {
                self.state = CustomerState::Wander;
                self.target = None;
                self.slot = None;
                self.timer = WANDER_TICKS;
            }
        }
    }

    /// Abandons whatever the customer is doing and heads for the door.
    ///
    /// Returns the cabinet released when the customer was mid-game.
    pub fn begin_leave(&mut self, cabinets: &mut [Cabinet]) -> Option<CabinetId> {
        let released = self.release(cabinets);
        self.stalled = 0;
        self.state = CustomerState::Leave;
        self.target = None;
        self.slot = None;
        released
    }

    /// Frees the play slot held by the customer, if any.
    pub fn release(&mut self, cabinets: &mut [Cabinet]) -> Option<CabinetId> {
        if !self.is_playing() {
            return None;
        }
        let target = self.target?;
        let cabinet = cabinets.iter_mut().find(|cabinet| cabinet.id() == target)?;
        cabinet.end_play(self.id).then_some(target)
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> CustomerSnapshot {
        CustomerSnapshot {
            id: self.id,
            name: self.name.clone(),
            preference: self.preference.clone(),
            cash: self.cash,
            patience: self.patience,
            position: self.position,
            state: self.state,
            target: self.target,
        }
    }

    fn pursue(&mut self, floor: &mut Floor<'_>) -> Option<AgentOutcome> {
        let Some(cabinet) = self
            .target
            .and_then(|target| floor.cabinets.iter().find(|cabinet| cabinet.id() == target))
        else {
            self.select_target(floor.cabinets);
            return None;
        };

        if cabinet.is_busy() {
            if self.position.chebyshev_distance(self.target_pos) <= 1 {
                self.state = CustomerState::Wait;
                self.timer = 0;
            } else {
                self.state = CustomerState::Wander;
                self.target = None;
                self.slot = None;
                self.timer = 0;
                self.lose_patience(MOVE_BUSY_PENALTY);
            }
            return None;
        }

        let slot_taken = self.slot.map_or(true, |slot| !cabinet.is_slot_free(slot));
        if slot_taken {
            let reaimed = cabinet
                .next_free_slot()
                .and_then(|slot| cabinet.slot_position(slot).map(|position| (slot, position)));
            if let Some((slot, position)) = reaimed {
                self.slot = Some(slot);
                self.target_pos = position;
            }
        }

        self.approach(floor)
    }

    fn approach(&mut self, floor: &mut Floor<'_>) -> Option<AgentOutcome> {
        if !self.walk_toward(self.target_pos, floor.property) {
            if self.stalled >= STALL_LIMIT {
                self.state = CustomerState::Wander;
                self.target = None;
                self.slot = None;
                self.timer = WANDER_TICKS;
                self.lose_patience(MOVE_BUSY_PENALTY);
            }
            return None;
        }
        let (target, slot) = (self.target?, self.slot?);
        let cabinet = floor
            .cabinets
            .iter_mut()
            .find(|cabinet| cabinet.id() == target)?;
        if cabinet.price() > self.cash {
            self.select_target(floor.cabinets);
            return None;
        }
        let price = cabinet.start_play(self.id, slot)?;
        self.cash -= price;
        self.state = CustomerState::Play;
        self.timer = i32::try_from(cabinet.playtime()).unwrap_or(i32::MAX);
        self.games_played = self.games_played.saturating_add(1);
        Some(AgentOutcome::PlayStarted {
            cabinet: target,
            price,
        })
    }

    fn wait(&mut self, floor: &mut Floor<'_>) -> Option<AgentOutcome> {
        self.timer += 1;
        let busy = self.target.and_then(|target| {
            floor
                .cabinets
                .iter()
                .find(|cabinet| cabinet.id() == target)
                .map(Cabinet::is_busy)
        });
        match busy {
            Some(true) => {
                self.lose_patience(self.timer);
                if self.timer > self.patience / 10 {
                    self.select_target(floor.cabinets);
                    return Some(AgentOutcome::WaitAbandoned);
                }
                None
            }
            Some(false) => {
                self.state = CustomerState::Move;
                self.pursue(floor)
            }
            None => {
                self.select_target(floor.cabinets);
                None
            }
        }
    }

    fn play(&mut self, floor: &mut Floor<'_>) -> Option<AgentOutcome> {
        self.timer -= 1;
        if self.timer >= 1 {
            return None;
        }
        let released = self.release(floor.cabinets);
        self.state = CustomerState::Wander;
        self.target = None;
        self.slot = None;
        self.timer = WANDER_TICKS;
        self.wander(floor);
        released.map(|cabinet| AgentOutcome::PlayFinished { cabinet })
    }

    fn wander(&mut self, floor: &mut Floor<'_>) {
        let layout = floor.property.layout();
        let (width, height) = (layout.width.max(0), layout.height.max(0));
        self.target_pos = TilePos::new(
            floor.rng.gen_range(0..=width),
            floor.rng.gen_range(0..=height),
        );
        let _ = self.step_toward(self.target_pos, floor.property);
    }

    /// Steps toward `goal` and tracks how long the customer has made no
    /// progress.
    fn walk_toward(&mut self, goal: TilePos, property: &mut Property) -> bool {
        let before = self.position.chebyshev_distance(goal);
        let arrived = self.step_toward(goal, property);
        if arrived || self.position.chebyshev_distance(goal) < before {
            self.stalled = 0;
        } else {
            self.stalled = self.stalled.saturating_add(1);
        }
        arrived
    }

    /// Takes one step toward `goal`, returning whether the customer stands on it.
    ///
    /// The diagonal step is tried first; when it is blocked the column step
    /// and then the row step are tried. A blocked straight step sidesteps,
    /// diagonally forward first, then to either side.
    fn step_toward(&mut self, goal: TilePos, property: &mut Property) -> bool {
        if self.position == goal {
            return true;
        }
        let columns = (goal.column() - self.position.column()).signum();
        let rows = (goal.row() - self.position.row()).signum();
        let mut candidates = vec![self.position.offset(columns, rows)];
        if columns != 0 && rows != 0 {
            candidates.push(self.position.offset(columns, 0));
            candidates.push(self.position.offset(0, rows));
        } else {
            let (side_columns, side_rows) = (rows.abs(), columns.abs());
            for sign in [-1, 1] {
                candidates.push(
                    self.position
                        .offset(columns + sign * side_columns, rows + sign * side_rows),
                );
            }
            for sign in [-1, 1] {
                candidates.push(self.position.offset(sign * side_columns, sign * side_rows));
            }
        }
        if let Some(next) = candidates
            .into_iter()
            .find(|tile| property.is_space_empty(*tile))
        {
            if property.relocate(self.position, next) {
                self.position = next;
            }
        }
        self.position == goal
    }

    fn lose_patience(&mut self, amount: i32) {
        self.patience = self.patience.saturating_sub(amount).max(0);
    }
}
