#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the bboard simulation.
//!
//! This crate defines the value types that connect decision-makers, the
//! authoritative board state, and the adapters. Decision-makers answer each
//! tick with a [`Move`], the world crate's `step` entry point applies one move
//! per agent, and the board itself is made of packed [`Cell`] values while live
//! explosives are tracked as packed [`Bomb`] integers.
//!
//! The constants below double as the wire contract for any state exchanged
//! with external tooling: changing them changes the meaning of every packed
//! value.

mod bomb;
mod cell;

use serde::{Deserialize, Serialize};

pub use bomb::Bomb;
pub use cell::{Cell, CodecError, PowerUp};

/// Number of agents taking part in every game.
pub const AGENT_COUNT: usize = 4;

/// Edge length of the square board measured in tiles.
pub const BOARD_SIZE: usize = 11;

const _: () = assert!(BOARD_SIZE <= 15, "board positions must fit into 4 bits");

/// Ticks between planting a bomb and its detonation.
pub const BOMB_LIFETIME: u32 = 10;

/// Blast strength every agent starts with.
pub const BOMB_DEFAULT_STRENGTH: u32 = 1;

/// Largest blast strength representable in a packed [`Bomb`].
pub const MAX_BLAST_STRENGTH: u32 = 0xF;

/// Ticks a flame burns before its tiles clear.
pub const FLAME_LIFETIME: u32 = 4;

/// Upper bound of simultaneously planted bombs for one agent.
pub const MAX_BOMBS_PER_AGENT: u32 = 5;

/// Capacity of the bomb and flame queues.
pub const MAX_BOMBS: usize = AGENT_COUNT * MAX_BOMBS_PER_AGENT as usize;

/// Exclusive upper bound of flame identifiers stamped into burning tiles.
pub const FLAME_ID_LIMIT: u16 = 1 << 13;

/// Atomic action an agent submits for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Stay in place.
    #[default]
    Idle,
    /// Move toward decreasing row indices.
    Up,
    /// Move toward increasing row indices.
    Down,
    /// Move toward decreasing column indices.
    Left,
    /// Move toward increasing column indices.
    Right,
    /// Plant a bomb on the occupied tile.
    Bomb,
}

impl Move {
    /// Every move in discriminant order.
    pub const ALL: [Move; 6] = [
        Move::Idle,
        Move::Up,
        Move::Down,
        Move::Left,
        Move::Right,
        Move::Bomb,
    ];

    /// Direction of travel requested by the move, if it is a movement at all.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::Idle | Self::Bomb => None,
        }
    }
}

impl From<Direction> for Move {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}

/// Cardinal directions used by movement and flame propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// All four directions in the order flames propagate.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Column and row offsets of a single step.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Identifier of one of the [`AGENT_COUNT`] agents.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(u8);

impl AgentId {
    /// Every agent identifier in ascending order.
    pub const ALL: [AgentId; AGENT_COUNT] = [AgentId(0), AgentId(1), AgentId(2), AgentId(3)];

    /// Creates a new agent identifier.
    ///
    /// Values at or above [`AGENT_COUNT`] are a caller contract violation.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        debug_assert!((value as usize) < AGENT_COUNT, "agent id out of range");
        Self(value)
    }

    /// Creates an identifier if `value` names an existing agent.
    #[must_use]
    pub const fn try_new(value: u8) -> Option<Self> {
        if (value as usize) < AGENT_COUNT {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Identifier as an index into per-agent arrays.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Location of a tile expressed as column (`x`) and row (`y`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: u8,
    y: u8,
}

impl Position {
    /// Creates a new board position.
    ///
    /// Coordinates outside the board are a caller contract violation.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        debug_assert!((x as usize) < BOARD_SIZE && (y as usize) < BOARD_SIZE);
        Self { x, y }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Neighbouring position one tile toward `direction`, or `None` past the edge.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        if usize::from(x) < BOARD_SIZE && usize::from(y) < BOARD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Every board position in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as u8).flat_map(|y| (0..BOARD_SIZE as u8).map(move |x| Position { x, y }))
    }

    /// Largest per-axis distance between two positions.
    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> u8 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
