/// One of the four cardinal step directions (`W/A/S/D` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in the order `Random` resolution picks from.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row/column delta for a single step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// `true` for the two directions along which a charged sweep walks
    /// cell indices in ascending order (`Down`/`Right`); `false` for the
    /// two that walk in descending order (`Up`/`Left`).
    pub fn sweeps_ascending(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}
