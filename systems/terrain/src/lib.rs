#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded terrain generation for fresh games.
//!
//! Rigid and wood obstacles are laid out symmetrically around the main
//! diagonal, pick-ups are hidden inside wood, and the corner zones where agents
//! spawn stay clear. Layouts that wall a corner off are rejected and drawn
//! again from the same random stream, so a seed always yields the same board.

use std::collections::VecDeque;

use bboard_core::{AgentId, Cell, Position, PowerUp, AGENT_COUNT, BOARD_SIZE};
use bboard_world::State;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 0x1337;

const MAX_ATTEMPTS: usize = 32;
const CORNER_ZONE: u8 = 2;

type Grid = [[Cell; BOARD_SIZE]; BOARD_SIZE];

/// Amount of each terrain feature placed on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainConfig {
    /// Rigid tiles to place.
    pub rigid: usize,
    /// Wood tiles to place.
    pub wood: usize,
    /// Pick-ups hidden inside wood; capped by the wood placed.
    pub items: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            rigid: 36,
            wood: 36,
            items: 20,
        }
    }
}

/// Fills the board with the default amount of terrain. Agents are not placed.
pub fn init_board_items(state: &mut State, seed: u64) {
    generate(state, seed, &TerrainConfig::default());
}

/// Fills the board with terrain drawn from `seed`, overwriting every tile.
///
/// Counts are reached in mirrored pairs, so an odd target may be exceeded by
/// one tile.
pub fn generate(state: &mut State, seed: u64, config: &TerrainConfig) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let grid = match connected_layout(&mut rng, config) {
        Some(grid) => grid,
        None => {
            warn!(seed, rigid = config.rigid, "no connected layout found, dropping rigid terrain");
            layout(&mut rng, 0, config)
        }
    };

    for position in Position::all() {
        state.put_item(position, grid[usize::from(position.y())][usize::from(position.x())]);
    }
}

/// Builds a fresh game: terrain from `seed` and the agents placed clockwise
/// into the corners starting top left.
#[must_use]
pub fn init_state(seed: u64, corners: [AgentId; AGENT_COUNT]) -> State {
    let mut state = State::new();
    init_board_items(&mut state, seed);
    let [a0, a1, a2, a3] = corners;
    state.put_agents_in_corners(a0, a1, a2, a3);
    state
}

fn connected_layout(rng: &mut ChaCha8Rng, config: &TerrainConfig) -> Option<Grid> {
    (0..MAX_ATTEMPTS)
        .map(|_| layout(rng, config.rigid, config))
        .find(corners_connected)
}

fn layout(rng: &mut ChaCha8Rng, rigid: usize, config: &TerrainConfig) -> Grid {
    let mut grid = [[Cell::Passage; BOARD_SIZE]; BOARD_SIZE];

    let mut candidates: Vec<Position> = Position::all()
        .filter(|p| p.x() <= p.y() && !in_corner_zone(*p))
        .collect();
    candidates.shuffle(rng);
    let mut candidates = candidates.into_iter();

    fill_mirrored(&mut grid, &mut candidates, rigid, Cell::Rigid);
    fill_mirrored(&mut grid, &mut candidates, config.wood, Cell::Wood(None));

    let mut wood: Vec<Position> = Position::all()
        .filter(|p| cell(&grid, *p).is_wood())
        .collect();
    wood.shuffle(rng);
    for position in wood.into_iter().take(config.items) {
        let power_up = PowerUp::ALL[rng.gen_range(0..PowerUp::ALL.len())];
        *cell_mut(&mut grid, position) = Cell::Wood(Some(power_up));
    }

    grid
}

fn fill_mirrored(
    grid: &mut Grid,
    candidates: &mut impl Iterator<Item = Position>,
    target: usize,
    item: Cell,
) {
    let mut placed = 0;
    while placed < target {
        let Some(position) = candidates.next() else {
            return;
        };
        let mirror = Position::new(position.y(), position.x());
        *cell_mut(grid, position) = item;
        *cell_mut(grid, mirror) = item;
        placed += if mirror == position { 1 } else { 2 };
    }
}

fn in_corner_zone(position: Position) -> bool {
    let edge = (BOARD_SIZE - 1) as u8;
    let near = |value: u8| value.min(edge - value);
    let (dx, dy) = (near(position.x()), near(position.y()));
    (dx == 0 && dy <= CORNER_ZONE) || (dy == 0 && dx <= CORNER_ZONE)
}

fn corners_connected(grid: &Grid) -> bool {
    let edge = (BOARD_SIZE - 1) as u8;
    let start = Position::new(0, 0);
    let mut seen = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut frontier = VecDeque::from([start]);
    seen[0][0] = true;

    while let Some(position) = frontier.pop_front() {
        for direction in bboard_core::Direction::ALL {
            let Some(next) = position.step(direction) else {
                continue;
            };
            let visited = &mut seen[usize::from(next.y())][usize::from(next.x())];
            if *visited || cell(grid, next) == Cell::Rigid {
                continue;
            }
            *visited = true;
            frontier.push_back(next);
        }
    }

    [(edge, 0), (edge, edge), (0, edge)]
        .into_iter()
        .all(|(x, y)| seen[usize::from(y)][usize::from(x)])
}

fn cell(grid: &Grid, position: Position) -> Cell {
    grid[usize::from(position.y())][usize::from(position.x())]
}

fn cell_mut(grid: &mut Grid, position: Position) -> &mut Cell {
    &mut grid[usize::from(position.y())][usize::from(position.x())]
}
