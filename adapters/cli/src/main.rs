#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a bboard game between built-in agents.

mod config;

use std::{io, path::PathBuf, thread, time::Duration};

use anyhow::{anyhow, Context, Result as AnyResult};
use bboard_rendering::{RenderingBackend, TerminalBackend};
use bboard_system_environment::{Environment, Outcome};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AgentKind, GameConfig};

/// Flags override the values of the config file.
#[derive(Debug, Parser)]
#[command(name = "bboard", about = "Play a bboard game between built-in agents")]
struct Cli {
    /// TOML file providing defaults for every other option.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for terrain and agent randomness.
    #[arg(long)]
    seed: Option<u64>,
    /// Ticks after which the game is a draw.
    #[arg(long)]
    max_steps: Option<u32>,
    /// Comma separated agent kinds, one per seat.
    #[arg(long, value_enum, value_delimiter = ',')]
    agents: Option<Vec<AgentKind>>,
    /// Print the board after every tick.
    #[arg(long)]
    render: bool,
    /// Pause between rendered ticks in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Per-tick response budget of every agent in milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Enforce the competitive response budget.
    #[arg(long)]
    competitive: bool,
    /// Limit what every agent observes to this Chebyshev range.
    #[arg(long)]
    view_range: Option<u8>,
    /// Wait for Enter after every tick.
    #[arg(long)]
    step_by_step: bool,
}

impl Cli {
    fn apply(self, mut config: GameConfig) -> AnyResult<GameConfig> {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(agents) = self.agents {
            config.agents = agents.try_into().map_err(|agents: Vec<AgentKind>| {
                anyhow!("expected {} agents, got {}", config.agents.len(), agents.len())
            })?;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(time_limit_ms) = self.time_limit_ms {
            config.time_limit_ms = Some(time_limit_ms);
        }
        if let Some(view_range) = self.view_range {
            config.view_range = Some(view_range);
        }
        config.render |= self.render;
        config.competitive |= self.competitive;
        config.step_by_step |= self.step_by_step;
        Ok(config)
    }
}

/// Entry point for the bboard command-line interface.
fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let file_config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let config = cli.apply(file_config)?;

    let outcome = play(&config)?;
    match outcome {
        Outcome::Won(agent) => println!("agent {} wins", agent.get()),
        Outcome::Draw => println!("draw"),
        Outcome::Running => println!("game interrupted"),
    }
    Ok(())
}

fn play(config: &GameConfig) -> AnyResult<Outcome> {
    let mut env = Environment::make_game(config.build_agents(), config.seed, config.environment())
        .context("failed to set up game")?;
    info!(seed = config.seed, agents = ?config.agents, "game started");

    if config.render || config.step_by_step {
        let mut backend = config.render.then(|| TerminalBackend::clearing(io::stdout()));
        if let Some(backend) = backend.as_mut() {
            backend.present(env.state())?;
        }
        let delay = Duration::from_millis(config.delay_ms);
        let step_by_step = config.step_by_step;

        env.set_step_listener(move |env| {
            if let Some(backend) = backend.as_mut() {
                if let Err(error) = backend.present(env.state()) {
                    warn!("failed to render frame: {error:#}");
                }
            }
            if step_by_step {
                let mut line = String::new();
                if let Err(error) = io::stdin().read_line(&mut line) {
                    warn!(%error, "failed to read from stdin");
                }
            } else if !delay.is_zero() && backend.is_some() {
                thread::sleep(delay);
            }
        });
    }

    Ok(env.run())
}
