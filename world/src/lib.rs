#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for bboard.
//!
//! A [`State`] owns the tile grid, the four [`AgentInfo`] records and two
//! [`FixedQueue`] timelines: bombs ordered by ascending fuse and flames ordered
//! by descending remaining lifetime. Insertion order stands in for both
//! orderings, so every primitive below appends at the back and consumes from
//! the front. The [`step`] entry point composes the primitives into one tick.
//!
//! Nothing here allocates; cloning a state is a flat copy.

mod queue;
mod step;

use std::ops::{Index, IndexMut};

use bboard_core::{
    AgentId, Bomb, Cell, Direction, Position, PowerUp, AGENT_COUNT, BOARD_SIZE,
    BOMB_DEFAULT_STRENGTH, BOMB_LIFETIME, FLAME_ID_LIMIT, FLAME_LIFETIME, MAX_BLAST_STRENGTH,
    MAX_BOMBS, MAX_BOMBS_PER_AGENT,
};
use tracing::debug;

pub use queue::FixedQueue;
pub use step::step;

/// Timeline of planted bombs, soonest detonation first.
pub type BombQueue = FixedQueue<Bomb, MAX_BOMBS>;

/// Timeline of burning flames, soonest to clear first.
pub type FlameQueue = FixedQueue<Flame, MAX_BOMBS>;

/// Everything known about one agent besides its behaviour.
///
/// Keeping this apart from the decision-maker lets a fogged observation drop
/// or keep it as a unit, and lets behaviours be swapped mid-game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentInfo {
    /// Tile the agent stands on.
    pub position: Position,
    /// Bombs currently planted and not yet detonated.
    pub bomb_count: u32,
    /// Bombs the agent may have planted at the same time.
    pub max_bomb_count: u32,
    /// Strength assigned to newly planted bombs.
    pub bomb_strength: u32,
    /// Whether walking into a bomb pushes it.
    pub can_kick: bool,
    /// Whether the agent has been eliminated.
    pub dead: bool,
    /// Whether the record describes the agent. Out of sight in a fogged
    /// observation, the record is reset to defaults and this is `false`.
    pub visible: bool,
}

impl AgentInfo {
    /// Applies the effect of a collected pick-up.
    pub fn collect(&mut self, power_up: PowerUp) {
        match power_up {
            PowerUp::ExtraBomb => {
                self.max_bomb_count = (self.max_bomb_count + 1).min(MAX_BOMBS_PER_AGENT);
            }
            PowerUp::IncreaseRange => {
                self.bomb_strength = (self.bomb_strength + 1).min(MAX_BLAST_STRENGTH);
            }
            PowerUp::Kick => self.can_kick = true,
        }
    }
}

impl Default for AgentInfo {
    fn default() -> Self {
        Self {
            position: Position::default(),
            bomb_count: 0,
            max_bomb_count: 1,
            bomb_strength: BOMB_DEFAULT_STRENGTH,
            can_kick: false,
            dead: false,
            visible: true,
        }
    }
}

/// All fire produced by a single detonation.
///
/// Tiles reached by the blast carry the flame's `id`; the origin and strength
/// are kept so the same rays can be walked again when the fire clears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flame {
    /// Tile the bomb detonated on.
    pub position: Position,
    /// Ticks until the fire clears.
    pub time_left: u32,
    /// Reach of the rays in tiles.
    pub strength: u32,
    /// Identifier stamped into every tile this flame owns.
    pub id: u16,
}

/// Complete board of one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    board: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    agents: [AgentInfo; AGENT_COUNT],
    bombs: BombQueue,
    flames: FlameQueue,
    time_step: u32,
    alive_agents: usize,
    next_flame_id: u16,
}

impl State {
    /// Creates an empty board with every agent alive at default stats.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: [[Cell::Passage; BOARD_SIZE]; BOARD_SIZE],
            agents: [AgentInfo::default(); AGENT_COUNT],
            bombs: BombQueue::new(),
            flames: FlameQueue::new(),
            time_step: 0,
            alive_agents: AGENT_COUNT,
            next_flame_id: 0,
        }
    }

    /// Occupant of the tile at `position`.
    #[must_use]
    pub fn cell(&self, position: Position) -> Cell {
        self[position]
    }

    /// Overwrites the tile at `position`.
    pub fn put_item(&mut self, position: Position, cell: Cell) {
        self[position] = cell;
    }

    /// Rows of the grid, indexed `[y][x]`.
    #[must_use]
    pub fn board(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.board
    }

    /// Record of a single agent.
    #[must_use]
    pub fn agent(&self, agent: AgentId) -> &AgentInfo {
        &self.agents[agent.index()]
    }

    /// Mutable record of a single agent.
    pub fn agent_mut(&mut self, agent: AgentId) -> &mut AgentInfo {
        &mut self.agents[agent.index()]
    }

    /// Records of every agent, ordered by id.
    #[must_use]
    pub fn agents(&self) -> &[AgentInfo; AGENT_COUNT] {
        &self.agents
    }

    /// Planted bombs, soonest detonation first.
    #[must_use]
    pub fn bombs(&self) -> &BombQueue {
        &self.bombs
    }

    /// Burning flames, soonest to clear first.
    #[must_use]
    pub fn flames(&self) -> &FlameQueue {
        &self.flames
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub const fn time_step(&self) -> u32 {
        self.time_step
    }

    /// Number of agents not yet eliminated.
    #[must_use]
    pub const fn alive_agents(&self) -> usize {
        self.alive_agents
    }

    /// Plants a bomb for `agent` at `position`.
    ///
    /// Nothing happens if the agent already has its maximum number of bombs
    /// planted, a bomb already lies there, or the bomb queue is full. With
    /// `mark_cell` the bomb marker is written into the grid; otherwise the
    /// tile keeps showing whoever stands on it.
    pub fn plant_bomb(&mut self, position: Position, agent: AgentId, mark_cell: bool) {
        let info = self.agents[agent.index()];
        if info.bomb_count >= info.max_bomb_count || self.has_bomb(position) {
            return;
        }

        let bomb = Bomb::new(position, agent, info.bomb_strength, BOMB_LIFETIME);
        if self.bombs.push(bomb).is_err() {
            debug!(agent = agent.get(), %position, "bomb queue full, plant ignored");
            return;
        }

        self.agents[agent.index()].bomb_count += 1;
        if mark_cell {
            self[position] = Cell::Bomb;
        }
    }

    /// Whether a planted bomb lies at `position`, covered or not.
    #[must_use]
    pub fn has_bomb(&self, position: Position) -> bool {
        self.bomb_index_at(position).is_some()
    }

    /// Queue index of the bomb lying at `position`.
    #[must_use]
    pub fn bomb_index_at(&self, position: Position) -> Option<usize> {
        self.bombs.position(|bomb| bomb.position() == position)
    }

    /// Detonates the bomb at the front of the queue.
    ///
    /// The blast is driven by the queued bomb alone; whatever the grid shows at
    /// its position (an agent, a bomb marker, nothing) is overwritten by fire.
    pub fn explode_top_bomb(&mut self) {
        if !self.bombs.is_empty() {
            self.explode_bomb_at(0);
        }
    }

    /// Detonates the bomb at queue `index` out of order, along with every bomb
    /// its blast reaches.
    pub fn explode_bomb_at(&mut self, index: usize) {
        let mut pending = BombQueue::new();
        self.take_bomb(index, &mut pending);
        self.detonate(pending);
    }

    /// Sets fire to `origin` and up to `strength` tiles in each direction.
    ///
    /// A ray stops before rigid tiles and on wood, which burns and remembers
    /// its hidden pick-up. Tiles already burning are re-stamped. Bombs caught
    /// by the rays go off once all four rays are laid, in the order they were
    /// reached.
    pub fn spawn_flame(&mut self, origin: Position, strength: u32) {
        let mut pending = BombQueue::new();
        self.blast(origin, strength, &mut pending);
        self.detonate(pending);
    }

    /// Detonates every bomb whose fuse has run out.
    ///
    /// Expired bombs go off in queue order and bombs caught by their rays are
    /// appended behind them, so each blast is laid against the grid left by
    /// the blasts before it.
    pub(crate) fn explode_expired_bombs(&mut self) {
        let mut pending = BombQueue::new();
        while self.bombs.front().is_some_and(|bomb| bomb.fuse() == 0) {
            self.take_bomb(0, &mut pending);
        }
        self.detonate(pending);
    }

    /// Clears the flame at the front of the queue.
    ///
    /// Tiles still owned by the flame become passage again, or the pick-up the
    /// burnt wood was hiding.
    pub fn pop_flame(&mut self) {
        let Some(flame) = self.flames.pop() else {
            return;
        };

        self.extinguish(flame.position, flame.id);
        for direction in Direction::ALL {
            let mut position = flame.position;
            for _ in 0..flame.strength {
                let Some(next) = position.step(direction) else {
                    break;
                };
                position = next;
                if self[position] == Cell::Rigid {
                    break;
                }
                self.extinguish(position, flame.id);
            }
        }
    }

    /// Eliminates `agent`. Killing a dead agent has no effect.
    pub fn kill(&mut self, agent: AgentId) {
        let info = &mut self.agents[agent.index()];
        if info.dead {
            return;
        }
        info.dead = true;
        let position = info.position;
        self.alive_agents = self.alive_agents.saturating_sub(1);

        if self[position] == Cell::Agent(agent) {
            self[position] = self.vacated_cell(position);
        }
        debug!(agent = agent.get(), %position, alive = self.alive_agents, "agent eliminated");
    }

    /// Eliminates every listed agent as one operation.
    pub fn kill_all(&mut self, agents: &[AgentId]) {
        for &agent in agents {
            self.kill(agent);
        }
    }

    /// Places `agent` on `position`, updating both the grid and its record.
    pub fn put_agent(&mut self, position: Position, agent: AgentId) {
        let previous = self.agents[agent.index()].position;
        if previous != position && self[previous] == Cell::Agent(agent) {
            self[previous] = self.vacated_cell(previous);
        }
        self[position] = Cell::Agent(agent);
        self.agents[agent.index()].position = position;
    }

    /// Places the agents clockwise into the corners, starting top left.
    pub fn put_agents_in_corners(&mut self, a0: AgentId, a1: AgentId, a2: AgentId, a3: AgentId) {
        let edge = (BOARD_SIZE - 1) as u8;
        self.put_agent(Position::new(0, 0), a0);
        self.put_agent(Position::new(edge, 0), a1);
        self.put_agent(Position::new(edge, edge), a2);
        self.put_agent(Position::new(0, edge), a3);
    }

    /// Copy of the state as seen by `viewer`.
    ///
    /// Tiles farther than `view_range` (Chebyshev distance) become
    /// [`Cell::Fog`]. Bombs lying there and flames centred there are dropped
    /// from their queues, and the records of agents standing there are reset
    /// with [`AgentInfo::visible`] cleared.
    #[must_use]
    pub fn fogged(&self, viewer: AgentId, view_range: u8) -> State {
        let mut view = self.clone();
        let center = self.agents[viewer.index()].position;

        for position in Position::all() {
            if center.chebyshev_distance(position) > view_range {
                view[position] = Cell::Fog;
            }
        }

        let mut index = view.bombs.len();
        while index > 0 {
            index -= 1;
            if center.chebyshev_distance(view.bombs[index].position()) > view_range {
                let _ = view.bombs.remove_at(index);
            }
        }

        let mut index = view.flames.len();
        while index > 0 {
            index -= 1;
            if center.chebyshev_distance(view.flames[index].position) > view_range {
                let _ = view.flames.remove_at(index);
            }
        }

        for info in &mut view.agents {
            if center.chebyshev_distance(info.position) > view_range {
                *info = AgentInfo {
                    visible: false,
                    ..AgentInfo::default()
                };
            }
        }
        view
    }

    fn detonate(&mut self, mut pending: BombQueue) {
        while let Some(bomb) = pending.pop() {
            let owner = &mut self.agents[bomb.owner().index()];
            owner.bomb_count = owner.bomb_count.saturating_sub(1);
            self.blast(bomb.position(), bomb.strength(), &mut pending);
        }
    }

    fn blast(&mut self, origin: Position, strength: u32, caught: &mut BombQueue) {
        let id = self.next_flame_id;
        let flame = Flame {
            position: origin,
            time_left: FLAME_LIFETIME,
            strength,
            id,
        };
        if self.flames.push(flame).is_err() {
            debug!(%origin, "flame queue full, blast dropped");
            if self[origin] == Cell::Bomb {
                self[origin] = Cell::Passage;
            }
            return;
        }
        self.next_flame_id = (id + 1) % FLAME_ID_LIMIT;

        self.burn(origin, id, caught);
        for direction in Direction::ALL {
            let mut position = origin;
            for _ in 0..strength {
                let Some(next) = position.step(direction) else {
                    break;
                };
                position = next;
                if !self.ignite(position, id, caught) {
                    break;
                }
            }
        }
    }

    /// Sets fire to one tile of a ray; `false` when the ray stops there.
    fn ignite(&mut self, position: Position, id: u16, caught: &mut BombQueue) -> bool {
        match self[position] {
            Cell::Rigid => false,
            Cell::Wood(reveals) => {
                self[position] = Cell::Flames { id, reveals };
                false
            }
            _ => {
                self.burn(position, id, caught);
                true
            }
        }
    }

    fn burn(&mut self, position: Position, id: u16, caught: &mut BombQueue) {
        let reveals = match self[position] {
            Cell::Wood(reveals) | Cell::Flames { reveals, .. } => reveals,
            _ => None,
        };
        self[position] = Cell::Flames { id, reveals };

        if let Some(index) = self.bomb_index_at(position) {
            self.take_bomb(index, caught);
        }
    }

    /// Moves the bomb at queue `index` onto `pending`.
    ///
    /// A bomb leaves the timeline before it joins `pending`, so the two never
    /// hold more than the timeline's capacity together.
    fn take_bomb(&mut self, index: usize, pending: &mut BombQueue) {
        let removed = if index == 0 {
            self.bombs.pop()
        } else {
            self.bombs.remove_at(index)
        };
        if let Some(bomb) = removed {
            if pending.push(bomb).is_err() {
                debug!(position = %bomb.position(), "detonation list full, bomb dropped");
            }
        }
    }

    fn extinguish(&mut self, position: Position, id: u16) {
        if let Cell::Flames { id: owner, reveals } = self[position] {
            if owner == id {
                self[position] = reveals.map_or(Cell::Passage, Cell::PowerUp);
            }
        }
    }

    fn vacated_cell(&self, position: Position) -> Cell {
        if self.has_bomb(position) {
            Cell::Bomb
        } else {
            Cell::Passage
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Position> for State {
    type Output = Cell;

    fn index(&self, position: Position) -> &Cell {
        &self.board[usize::from(position.y())][usize::from(position.x())]
    }
}

impl IndexMut<Position> for State {
    fn index_mut(&mut self, position: Position) -> &mut Cell {
        &mut self.board[usize::from(position.y())][usize::from(position.x())]
    }
}
