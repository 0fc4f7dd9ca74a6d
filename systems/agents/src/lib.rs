#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decision-makers that choose a move for one agent per tick.

use bboard_core::{AgentId, Move};
use bboard_world::State;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Behaviour of a single agent.
///
/// The environment calls [`Agent::act`] once per tick with the state the agent
/// is allowed to observe, which may be fogged.
pub trait Agent {
    /// Chooses the move of agent `id` for the upcoming tick.
    fn act(&mut self, id: AgentId, state: &State) -> Move;
}

impl<F> Agent for F
where
    F: FnMut(AgentId, &State) -> Move,
{
    fn act(&mut self, id: AgentId, state: &State) -> Move {
        self(id, state)
    }
}

/// Agent that never does anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleAgent;

impl Agent for IdleAgent {
    fn act(&mut self, _id: AgentId, _state: &State) -> Move {
        Move::Idle
    }
}

/// Agent picking uniformly among every move, bombs included.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    /// Creates an agent whose choices are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _id: AgentId, _state: &State) -> Move {
        Move::ALL[self.rng.gen_range(0..Move::ALL.len())]
    }
}

/// Random agent that never plants bombs.
#[derive(Clone, Debug)]
pub struct HarmlessAgent {
    rng: ChaCha8Rng,
}

const HARMLESS_MOVES: [Move; 5] = [Move::Idle, Move::Up, Move::Down, Move::Left, Move::Right];

impl HarmlessAgent {
    /// Creates an agent whose choices are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for HarmlessAgent {
    fn act(&mut self, _id: AgentId, _state: &State) -> Move {
        HARMLESS_MOVES[self.rng.gen_range(0..HARMLESS_MOVES.len())]
    }
}
