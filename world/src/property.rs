//! Spatial model of the arcade property: bounds, occupancy, door and slots.

use arcade_manager_core::{
    CabinetId, CatalogRecord, CustomerId, Direction, Money, PlacementError, PropertyLayout,
    TilePos,
};
use rand::Rng;

use crate::cabinet::{Cabinet, MAX_PLAY_POSITIONS};

/// Random probes attempted before the free-space search falls back to a scan.
pub const FREE_SPACE_ATTEMPTS: usize = 64;

/// Layout of the starter property every new game begins with.
#[must_use]
pub fn garage_layout() -> PropertyLayout {
    let width = 7;
    PropertyLayout {
        name: "GARAGE".to_owned(),
        width,
        height: 3,
        door: TilePos::new(width / 2, 0),
        capacity: 2,
        popularity: 100,
        rent: Money::from_dollars(2),
        cabinet_slots: vec![TilePos::new(1, 3), TilePos::new(3, 3), TilePos::new(5, 3)],
    }
}

/// Entity standing on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// An installed cabinet.
    Cabinet(CabinetId),
    /// A customer.
    Customer(CustomerId),
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Occupant>>,
}

impl OccupancyGrid {
    fn new(layout: &PropertyLayout) -> Self {
        let columns = u32::try_from(layout.width.saturating_add(1)).unwrap_or(0);
        let rows = u32::try_from(layout.height.saturating_add(1)).unwrap_or(0);
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        let column = u32::try_from(pos.column()).ok()?;
        let row = u32::try_from(pos.row()).ok()?;
        if column < self.columns && row < self.rows {
            let width = usize::try_from(self.columns).ok()?;
            Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
        } else {
            None
        }
    }

    fn occupant(&self, pos: TilePos) -> Option<Occupant> {
        self.index(pos)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, pos: TilePos, occupant: Occupant) {
        if let Some(slot) = self.index(pos).and_then(|index| self.cells.get_mut(index)) {
            *slot = Some(occupant);
        }
    }

    fn vacate(&mut self, pos: TilePos) -> Option<Occupant> {
        self.index(pos)
            .and_then(|index| self.cells.get_mut(index))
            .and_then(Option::take)
    }
}

/// Arcade property holding the occupancy grid and cabinet slot bookkeeping.
#[derive(Clone, Debug)]
pub struct Property {
    layout: PropertyLayout,
    occupancy: OccupancyGrid,
    play_tiles: Vec<TilePos>,
    next_slot: usize,
}

impl Property {
    /// Creates an empty property from its layout.
    #[must_use]
    pub fn new(layout: PropertyLayout) -> Self {
        Self {
            occupancy: OccupancyGrid::new(&layout),
            layout,
            play_tiles: Vec::new(),
            next_slot: 0,
        }
    }

    /// Static description of the property.
    #[must_use]
    pub const fn layout(&self) -> &PropertyLayout {
        &self.layout
    }

    /// Tile customers enter and leave through.
    #[must_use]
    pub const fn door(&self) -> TilePos {
        self.layout.door
    }

    /// Reports whether the tile lies inside the inclusive bounds.
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        self.layout.contains(pos)
    }

    /// Returns what stands on the tile, if anything.
    #[must_use]
    pub fn occupant(&self, pos: TilePos) -> Option<Occupant> {
        self.occupancy.occupant(pos)
    }

    /// Reports whether the tile is inside the property and holds nothing.
    #[must_use]
    pub fn is_space_empty(&self, pos: TilePos) -> bool {
        self.contains(pos) && self.occupancy.occupant(pos).is_none()
    }

    /// Reports whether the tile is a play position of an installed cabinet.
    #[must_use]
    pub fn is_play_tile(&self, pos: TilePos) -> bool {
        self.play_tiles.contains(&pos)
    }

    /// Installs a cabinet on `position`, computing its play positions.
    pub fn place_cabinet(
        &mut self,
        id: CabinetId,
        record: CatalogRecord,
        position: TilePos,
    ) -> Result<Cabinet, PlacementError> {
        if !self.contains(position) {
            return Err(PlacementError::OutOfBounds);
        }
        if position == self.door() {
            return Err(PlacementError::DoorBlocked);
        }
        if !self.is_space_empty(position) || self.is_play_tile(position) {
            return Err(PlacementError::Occupied);
        }

        let play_positions = self.probe_play_positions(position, record.players);
        self.occupancy.occupy(position, Occupant::Cabinet(id));
        self.play_tiles.extend(play_positions.iter().copied());
        Ok(Cabinet::new(id, record, position, play_positions))
    }

    /// Chooses play positions around a cabinet tile.
    ///
    /// Once a direction is taken, its opposite is preferred so players face
    /// each other across the machine; otherwise directions are tried north,
    /// east, south, west. Fewer positions than requested are returned when
    /// the neighbourhood is crowded.
    #[must_use]
    pub fn probe_play_positions(&self, origin: TilePos, players: u8) -> Vec<TilePos> {
        let wanted = usize::from(players).min(MAX_PLAY_POSITIONS);
        let open = |direction: Direction| {
            let tile = origin.step(direction);
            self.is_space_empty(tile) && tile != self.door() && !self.is_play_tile(tile)
        };

        let mut chosen: Vec<Direction> = Vec::with_capacity(wanted);
        while chosen.len() < wanted {
            let paired = chosen
                .iter()
                .map(|direction| direction.opposite())
                .find(|direction| !chosen.contains(direction) && open(*direction));
            let next = paired.or_else(|| {
                Direction::PRIORITY
                    .into_iter()
                    .find(|direction| !chosen.contains(direction) && open(*direction))
            });
            match next {
                Some(direction) => chosen.push(direction),
                None => break,
            }
        }

        chosen
            .into_iter()
            .map(|direction| origin.step(direction))
            .collect()
    }

    /// Picks the tile the next cabinet without an explicit position goes to.
    ///
    /// Configured slots are used in order; once they run out a random free
    /// tile is chosen.
    pub fn next_cabinet_position<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TilePos> {
        while let Some(slot) = self.layout.cabinet_slots.get(self.next_slot).copied() {
            self.next_slot += 1;
            if self.accepts_cabinet(slot) {
                return Some(slot);
            }
        }
        let door = self.door();
        self.find_random_tile(door, rng, |property, tile| property.accepts_cabinet(tile))
    }

    /// Finds a random empty tile distinct from `avoid`.
    ///
    /// Gives up on random probing after [`FREE_SPACE_ATTEMPTS`] and scans
    /// row by row instead; `None` means the property is saturated.
    pub fn find_free_random_space<R: Rng + ?Sized>(
        &self,
        avoid: TilePos,
        rng: &mut R,
    ) -> Option<TilePos> {
        self.find_random_tile(avoid, rng, |property, tile| property.is_space_empty(tile))
    }

    fn find_random_tile<R, F>(&self, avoid: TilePos, rng: &mut R, accept: F) -> Option<TilePos>
    where
        R: Rng + ?Sized,
        F: Fn(&Self, TilePos) -> bool,
    {
        if self.layout.width < 0 || self.layout.height < 0 {
            return None;
        }
        for _ in 0..FREE_SPACE_ATTEMPTS {
            let tile = TilePos::new(
                rng.gen_range(0..=self.layout.width),
                rng.gen_range(0..=self.layout.height),
            );
            if tile != avoid && accept(self, tile) {
                return Some(tile);
            }
        }
        (0..=self.layout.height)
            .flat_map(|row| (0..=self.layout.width).map(move |column| TilePos::new(column, row)))
            .find(|tile| *tile != avoid && accept(self, *tile))
    }

    fn accepts_cabinet(&self, tile: TilePos) -> bool {
        tile != self.door() && self.is_space_empty(tile) && !self.is_play_tile(tile)
    }

    /// Places a customer on the door tile when it is free.
    pub fn admit(&mut self, customer: CustomerId) -> bool {
        let door = self.door();
        if !self.is_space_empty(door) {
            return false;
        }
        self.occupancy.occupy(door, Occupant::Customer(customer));
        true
    }

    /// Moves whatever stands on `from` to the empty tile `to`.
    pub fn relocate(&mut self, from: TilePos, to: TilePos) -> bool {
        if !self.is_space_empty(to) {
            return false;
        }
        match self.occupancy.vacate(from) {
            Some(occupant) => {
                self.occupancy.occupy(to, occupant);
                true
            }
            None => false,
        }
    }

    /// Clears the tile, returning its former occupant.
    pub fn vacate(&mut self, pos: TilePos) -> Option<Occupant> {
        self.occupancy.vacate(pos)
    }
}

impl Default for Property {
    fn default() -> Self {
        Self::new(garage_layout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_manager_core::Genre;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn record(players: u8) -> CatalogRecord {
        CatalogRecord {
            name: "CABINET".to_owned(),
            description: String::new(),
            release_year: 1981,
            genre: Genre::new("ACTION"),
            players,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let property = Property::default();
        assert!(property.is_space_empty(TilePos::new(7, 3)));
        assert!(!property.is_space_empty(TilePos::new(8, 3)));
        assert!(!property.is_space_empty(TilePos::new(7, 4)));
        assert!(!property.is_space_empty(TilePos::new(-1, 0)));
    }

    #[test]
    fn two_player_cabinet_pairs_north_then_east() {
        let mut property = Property::default();
        let cabinet = property
            .place_cabinet(CabinetId::new(0), record(2), TilePos::new(3, 3))
            .expect("placement succeeds");
        assert_eq!(
            cabinet.play_positions(),
            &[TilePos::new(3, 2), TilePos::new(4, 3)]
        );
    }

    #[test]
    fn opposite_side_completes_pair_before_fresh_direction() {
        let mut property = Property::default();
        let cabinet = property
            .place_cabinet(CabinetId::new(0), record(3), TilePos::new(3, 2))
            .expect("placement succeeds");
        assert_eq!(
            cabinet.play_positions(),
            &[TilePos::new(3, 1), TilePos::new(3, 3), TilePos::new(4, 2)]
        );
    }

    #[test]
    fn crowded_corner_degrades_capacity() {
        let mut property = Property::default();
        let cabinet = property
            .place_cabinet(CabinetId::new(0), record(4), TilePos::new(0, 3))
            .expect("placement succeeds");
        assert_eq!(
            cabinet.play_positions(),
            &[TilePos::new(0, 2), TilePos::new(1, 3)]
        );
        assert_eq!(cabinet.capacity(), 2);
    }

    #[test]
    fn placement_rejections() {
        let mut property = Property::default();
        let door = property.door();
        assert_eq!(
            property
                .place_cabinet(CabinetId::new(0), record(1), TilePos::new(9, 9))
                .err(),
            Some(PlacementError::OutOfBounds)
        );
        assert_eq!(
            property.place_cabinet(CabinetId::new(0), record(1), door).err(),
            Some(PlacementError::DoorBlocked)
        );
        let _ = property
            .place_cabinet(CabinetId::new(0), record(1), TilePos::new(1, 3))
            .expect("placement succeeds");
        assert_eq!(
            property
                .place_cabinet(CabinetId::new(1), record(1), TilePos::new(1, 3))
                .err(),
            Some(PlacementError::Occupied)
        );
        assert_eq!(
            property
                .place_cabinet(CabinetId::new(1), record(1), TilePos::new(1, 2))
                .err(),
            Some(PlacementError::Occupied)
        );
    }

    #[test]
    fn configured_slots_are_used_in_order() {
        let mut property = Property::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let first = property.next_cabinet_position(&mut rng);
        assert_eq!(first, Some(TilePos::new(1, 3)));
        let second = property.next_cabinet_position(&mut rng);
        assert_eq!(second, Some(TilePos::new(3, 3)));
    }

    #[test]
    fn free_space_search_reports_saturation() {
        let layout = PropertyLayout {
            width: 1,
            height: 0,
            door: TilePos::new(0, 0),
            cabinet_slots: Vec::new(),
            ..garage_layout()
        };
        let mut property = Property::new(layout);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(
            property.find_free_random_space(TilePos::new(0, 0), &mut rng),
            Some(TilePos::new(1, 0))
        );
        assert!(property.admit(CustomerId::new(0)));
        assert!(property.relocate(TilePos::new(0, 0), TilePos::new(1, 0)));
        assert_eq!(
            property.find_free_random_space(TilePos::new(0, 0), &mut rng),
            None
        );
    }

    #[test]
    fn admission_requires_a_free_door() {
        let mut property = Property::default();
        assert!(property.admit(CustomerId::new(1)));
        assert!(!property.admit(CustomerId::new(2)));
        assert_eq!(
            property.occupant(property.door()),
            Some(Occupant::Customer(CustomerId::new(1)))
        );
        let door = property.door();
        assert_eq!(
            property.vacate(door),
            Some(Occupant::Customer(CustomerId::new(1)))
        );
        assert!(property.admit(CustomerId::new(2)));
    }
}
