// Core value types shared by the simulator, the value fields and the search

use serde::{Deserialize, Serialize};

/// Grid coordinate addressed by row then column
///
/// Signed so that off-grid neighbours can be represented and rejected.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Point { row, col }
    }

    /// Manhattan distance between two points
    pub fn manhattan(self, other: Point) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// The four orthogonal neighbours in Left, Up, Right, Down order
    pub fn neighbors(self) -> [Point; 4] {
        Action::MOVES.map(|dir| dir.apply(self))
    }
}

/// One of the five per-tick actions a snake may take
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Up,
    Right,
    Down,
    Shield,
}

impl Action {
    /// The four movement actions
    pub const MOVES: [Action; 4] = [Action::Left, Action::Up, Action::Right, Action::Down];

    /// Every action, movement first
    pub const ALL: [Action; 5] = [
        Action::Left,
        Action::Up,
        Action::Right,
        Action::Down,
        Action::Shield,
    ];

    /// Numeric code used on the wire
    pub fn code(self) -> u8 {
        match self {
            Action::Left => 0,
            Action::Up => 1,
            Action::Right => 2,
            Action::Down => 3,
            Action::Shield => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Action> {
        match code {
            0 => Some(Action::Left),
            1 => Some(Action::Up),
            2 => Some(Action::Right),
            3 => Some(Action::Down),
            4 => Some(Action::Shield),
            _ => None,
        }
    }

    pub fn is_move(self) -> bool {
        self != Action::Shield
    }

    /// Row/column step of a movement action; Shield stays in place
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::Left => (0, -1),
            Action::Up => (-1, 0),
            Action::Right => (0, 1),
            Action::Down => (1, 0),
            Action::Shield => (0, 0),
        }
    }

    /// The 180 degree reversal of a move
    pub fn opposite(self) -> Option<Action> {
        match self {
            Action::Left => Some(Action::Right),
            Action::Up => Some(Action::Down),
            Action::Right => Some(Action::Left),
            Action::Down => Some(Action::Up),
            Action::Shield => None,
        }
    }

    /// The two moves at right angles to this one
    pub fn perpendicular(self) -> [Action; 2] {
        match self {
            Action::Left | Action::Right => [Action::Up, Action::Down],
            Action::Up | Action::Down | Action::Shield => [Action::Left, Action::Right],
        }
    }

    /// Calculates the next point when moving in this direction
    pub fn apply(self, p: Point) -> Point {
        let (dr, dc) = self.delta();
        Point::new(p.row + dr, p.col + dc)
    }

    /// The move that leads from `from` to the adjacent point `to`
    pub fn between(from: Point, to: Point) -> Option<Action> {
        Action::MOVES.iter().copied().find(|dir| dir.apply(from) == to)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Left => "left",
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Shield => "shield",
        }
    }
}

/// Map object sitting on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectTag {
    None,
    /// Graded score item worth 1 to 21 points
    Score(u8),
    Growth,
    Trap,
    Wall,
}

impl ObjectTag {
    pub const MAX_SCORE: u8 = 21;

    /// Decodes a protocol type code
    pub fn from_code(code: i64) -> Option<ObjectTag> {
        match code {
            1..=21 => Some(ObjectTag::Score(code as u8)),
            -1 => Some(ObjectTag::Growth),
            -2 => Some(ObjectTag::Trap),
            -4 => Some(ObjectTag::Wall),
            _ => None,
        }
    }

    /// Whether stepping onto the object is worth something
    pub fn is_collectible(self) -> bool {
        matches!(self, ObjectTag::Score(_) | ObjectTag::Growth)
    }
}

/// One board square: who occupies it and what lies on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub snake: Option<usize>,
    pub object: ObjectTag,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            snake: None,
            object: ObjectTag::None,
        }
    }
}
