#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game driver that polls decision-makers and advances the board.
//!
//! An [`Environment`] owns one [`State`] and one [`Agent`] per seat. Every
//! [`Environment::step`] hands each living agent its observation, applies the
//! returned moves through [`bboard_world::step`], re-evaluates the outcome and
//! finally notifies the step listener.
//!
//! With a time limit configured each agent runs on its own worker thread and
//! must answer within the limit; late agents idle for that tick.

use std::{
    borrow::Cow,
    io,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::{Duration, Instant},
};

use bboard_core::{AgentId, Move, AGENT_COUNT};
use bboard_system_agents::Agent;
use bboard_world::State;
use thiserror::Error;
use tracing::{info, warn};

/// Response budget used in competitive play.
pub const COMPETITIVE_TIME_LIMIT: Duration = Duration::from_millis(100);

/// Decision-maker owned by one seat.
pub type BoxedAgent = Box<dyn Agent + Send>;

/// Step listener invoked after every tick.
pub type StepListener = Box<dyn FnMut(&Environment)>;

/// Parameters of a single game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Ticks after which the game ends in a draw.
    pub max_steps: u32,
    /// Per-tick response budget; `None` polls agents inline without a limit.
    pub time_limit: Option<Duration>,
    /// Chebyshev view range of each agent; `None` observes the full board.
    pub view_range: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_steps: 800,
            time_limit: None,
            view_range: None,
        }
    }
}

/// Result of a game as known after the latest tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The game has not ended yet.
    Running,
    /// Exactly one agent survived.
    Won(AgentId),
    /// Every agent died or the step limit was reached.
    Draw,
}

/// Errors raised while setting up an environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The worker thread of a timed agent could not be started.
    #[error("failed to spawn worker thread for agent {agent}")]
    SpawnWorker {
        /// Seat whose worker failed to start.
        agent: u8,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

struct Request {
    tick: u32,
    observation: State,
}

struct Reply {
    tick: u32,
    action: Move,
}

struct Worker {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
}

enum Seats {
    Inline([BoxedAgent; AGENT_COUNT]),
    Timed { workers: Vec<Worker>, limit: Duration },
}

/// Owner of one running game.
pub struct Environment {
    state: State,
    seats: Seats,
    config: Config,
    outcome: Outcome,
    listener: Option<StepListener>,
}

impl Environment {
    /// Wraps an existing state, seating `agents` by id.
    ///
    /// With a time limit in `config` one worker thread is spawned per agent.
    /// Workers stop once the environment is dropped and their current
    /// decision finishes; they are never joined.
    pub fn new(
        state: State,
        agents: [BoxedAgent; AGENT_COUNT],
        config: Config,
    ) -> Result<Self, EnvironmentError> {
        let seats = match config.time_limit {
            None => Seats::Inline(agents),
            Some(limit) => {
                let mut workers = Vec::with_capacity(AGENT_COUNT);
                for (agent, id) in agents.into_iter().zip(AgentId::ALL) {
                    workers.push(spawn_worker(id, agent)?);
                }
                Seats::Timed { workers, limit }
            }
        };

        Ok(Self {
            state,
            seats,
            config,
            outcome: Outcome::Running,
            listener: None,
        })
    }

    /// Starts a fresh game on terrain generated from `seed`, agent `i` in
    /// the `i`-th corner clockwise from the top left.
    pub fn make_game(
        agents: [BoxedAgent; AGENT_COUNT],
        seed: u64,
        config: Config,
    ) -> Result<Self, EnvironmentError> {
        let state = bboard_system_terrain::init_state(seed, AgentId::ALL);
        Self::new(state, agents, config)
    }

    /// Registers the callback invoked with the environment after every tick.
    pub fn set_step_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&Environment) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Advances the game by one tick. Does nothing once the game is over.
    pub fn step(&mut self) {
        if self.is_done() {
            return;
        }

        let moves = self.collect_moves();
        bboard_world::step(&mut self.state, &moves);
        self.outcome = self.evaluate();

        if self.is_done() {
            info!(
                steps = self.state.time_step(),
                outcome = ?self.outcome,
                "game finished"
            );
        }

        if let Some(mut listener) = self.listener.take() {
            listener(self);
            self.listener = Some(listener);
        }
    }

    /// Steps until the game ends and reports the outcome.
    pub fn run(&mut self) -> Outcome {
        while !self.is_done() {
            self.step();
        }
        self.outcome
    }

    /// Current board state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Parameters the game runs with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Outcome after the latest tick.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Whether the latest tick ended the game.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.outcome != Outcome::Running
    }

    /// Whether the game ended without a winner.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.outcome == Outcome::Draw
    }

    /// Sole survivor of a finished game.
    #[must_use]
    pub fn winner(&self) -> Option<AgentId> {
        match self.outcome {
            Outcome::Won(agent) => Some(agent),
            Outcome::Running | Outcome::Draw => None,
        }
    }

    fn evaluate(&self) -> Outcome {
        if self.state.alive_agents() == 1 {
            if let Some(survivor) = AgentId::ALL
                .into_iter()
                .find(|agent| !self.state.agent(*agent).dead)
            {
                return Outcome::Won(survivor);
            }
        }
        if self.state.alive_agents() == 0 || self.state.time_step() >= self.config.max_steps {
            return Outcome::Draw;
        }
        Outcome::Running
    }

    fn collect_moves(&mut self) -> [Move; AGENT_COUNT] {
        let mut moves = [Move::Idle; AGENT_COUNT];
        let living: Vec<AgentId> = AgentId::ALL
            .into_iter()
            .filter(|agent| !self.state.agent(*agent).dead)
            .collect();
        let tick = self.state.time_step();
        let view_range = self.config.view_range;

        match &mut self.seats {
            Seats::Inline(agents) => {
                for &agent in &living {
                    let observation = observe(&self.state, agent, view_range);
                    moves[agent.index()] = agents[agent.index()].act(agent, &observation);
                }
            }
            Seats::Timed { workers, limit } => {
                let deadline = Instant::now() + *limit;
                for &agent in &living {
                    let request = Request {
                        tick,
                        observation: observe(&self.state, agent, view_range).into_owned(),
                    };
                    if workers[agent.index()].requests.send(request).is_err() {
                        warn!(agent = agent.get(), tick, "agent worker is gone");
                    }
                }
                for &agent in &living {
                    moves[agent.index()] =
                        await_reply(&workers[agent.index()], agent, tick, deadline);
                }
            }
        }

        moves
    }
}

fn observe(state: &State, agent: AgentId, view_range: Option<u8>) -> Cow<'_, State> {
    match view_range {
        Some(range) => Cow::Owned(state.fogged(agent, range)),
        None => Cow::Borrowed(state),
    }
}

fn spawn_worker(id: AgentId, mut agent: BoxedAgent) -> Result<Worker, EnvironmentError> {
    let (request_tx, request_rx) = mpsc::channel::<Request>();
    let (reply_tx, reply_rx) = mpsc::channel::<Reply>();

    let _ = thread::Builder::new()
        .name(format!("bboard-agent-{}", id.get()))
        .spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let request = latest_request(request, &request_rx);
                let action = agent.act(id, &request.observation);
                let reply = Reply {
                    tick: request.tick,
                    action,
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        })
        .map_err(|source| EnvironmentError::SpawnWorker {
            agent: id.get(),
            source,
        })?;

    Ok(Worker {
        requests: request_tx,
        replies: reply_rx,
    })
}

/// Skips past requests superseded while the agent was still deciding.
fn latest_request(mut request: Request, requests: &Receiver<Request>) -> Request {
    while let Ok(newer) = requests.try_recv() {
        request = newer;
    }
    request
}

fn await_reply(worker: &Worker, agent: AgentId, tick: u32, deadline: Instant) -> Move {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match worker.replies.recv_timeout(remaining) {
            Ok(reply) if reply.tick == tick => return reply.action,
            // answer to a tick that already timed out
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) => {
                warn!(agent = agent.get(), tick, "agent timed out, idling");
                return Move::Idle;
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(agent = agent.get(), tick, "agent worker disconnected, idling");
                return Move::Idle;
            }
        }
    }
}
