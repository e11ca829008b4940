//! Keyboard-driven grid cursor.

use std::time::Duration;

use crate::geometry::GridPos;

/// Time the blinking cursor spends in each phase.
pub const BLINK_PERIOD: Duration = Duration::from_millis(400);

/// Cell cursor clamped to the usable part of the screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    position: GridPos,
    max: GridPos,
    blink_elapsed: Duration,
}

impl Cursor {
    /// Creates a cursor for a screen of the provided size.
    ///
    /// The bottom row is reserved for the info bar.
    #[must_use]
    pub fn new(columns: i32, rows: i32) -> Self {
        Self {
            position: GridPos::default(),
            max: GridPos::new((columns - 1).max(0), (rows - 2).max(0)),
            blink_elapsed: Duration::ZERO,
        }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Largest reachable position.
    #[must_use]
    pub const fn max_area(&self) -> GridPos {
        self.max
    }

    /// Moves to an absolute position, clamped to the usable area.
    pub fn move_to(&mut self, pos: GridPos) {
        self.position = GridPos::new(
            pos.column.clamp(0, self.max.column),
            pos.row.clamp(0, self.max.row),
        );
    }

    /// Moves by a relative offset; returns `false` when the move was clamped.
    pub fn move_by(&mut self, columns: i32, rows: i32) -> bool {
        let target = self.position.offset(columns, rows);
        self.move_to(target);
        self.position == target
    }

    /// Advances the blink timer.
    pub fn tick(&mut self, dt: Duration) {
        let cycle = (BLINK_PERIOD * 2).as_nanos();
        let phase = (self.blink_elapsed.as_nanos() + dt.as_nanos()) % cycle;
        self.blink_elapsed = Duration::from_nanos(u64::try_from(phase).unwrap_or(0));
    }

    /// Whether the blink glyph is currently shown.
    #[must_use]
    pub fn blink_on(&self) -> bool {
        self.blink_elapsed > BLINK_PERIOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_are_clamped_to_the_usable_area() {
        let mut cursor = Cursor::new(80, 30);
        assert_eq!(cursor.max_area(), GridPos::new(79, 28));
        assert!(!cursor.move_by(-1, 0));
        assert_eq!(cursor.position(), GridPos::new(0, 0));
        cursor.move_to(GridPos::new(200, 200));
        assert_eq!(cursor.position(), GridPos::new(79, 28));
        assert!(cursor.move_by(-1, -1));
    }

    #[test]
    fn blink_alternates_every_period() {
        let mut cursor = Cursor::new(10, 10);
        cursor.tick(Duration::from_millis(300));
        assert!(!cursor.blink_on());
        cursor.tick(Duration::from_millis(200));
        assert!(cursor.blink_on());
        cursor.tick(Duration::from_millis(350));
        assert!(!cursor.blink_on());
    }

    #[test]
    fn huge_deltas_keep_the_blink_phase() {
        let mut cursor = Cursor::new(10, 10);
        // A year is a whole number of 800 ms cycles.
        cursor.tick(Duration::from_secs(31_536_000) + Duration::from_millis(500));
        assert!(cursor.blink_on());
        cursor.tick(Duration::MAX);
        let shown = cursor.blink_on();
        cursor.tick(BLINK_PERIOD * 2);
        assert_eq!(cursor.blink_on(), shown);
    }
}
