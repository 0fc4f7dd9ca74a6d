use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result as AnyResult};
use bboard_core::AGENT_COUNT;
use bboard_system_agents::{HarmlessAgent, IdleAgent, RandomAgent};
use bboard_system_environment::{BoxedAgent, Config, COMPETITIVE_TIME_LIMIT};
use bboard_system_terrain::DEFAULT_SEED;
use clap::ValueEnum;
use serde::Deserialize;

/// Built-in behaviour selectable for a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum AgentKind {
    /// Never acts.
    Idle,
    /// Uniformly random moves, bombs included.
    Random,
    /// Random moves without bombs.
    Harmless,
}

impl AgentKind {
    fn build(self, seed: u64) -> BoxedAgent {
        match self {
            Self::Idle => Box::new(IdleAgent),
            Self::Random => Box::new(RandomAgent::new(seed)),
            Self::Harmless => Box::new(HarmlessAgent::new(seed)),
        }
    }
}

/// Game settings read from an optional TOML file.
///
/// Every key is optional; missing keys keep their default.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) seed: u64,
    pub(crate) max_steps: u32,
    pub(crate) agents: [AgentKind; AGENT_COUNT],
    pub(crate) render: bool,
    pub(crate) delay_ms: u64,
    pub(crate) time_limit_ms: Option<u64>,
    pub(crate) competitive: bool,
    pub(crate) view_range: Option<u8>,
    pub(crate) step_by_step: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_steps: Config::default().max_steps,
            agents: [AgentKind::Random; AGENT_COUNT],
            render: false,
            delay_ms: 100,
            time_limit_ms: None,
            competitive: false,
            view_range: None,
            step_by_step: false,
        }
    }
}

impl GameConfig {
    pub(crate) fn load(path: &Path) -> AnyResult<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub(crate) fn from_toml(contents: &str) -> AnyResult<Self> {
        toml::from_str(contents).context("invalid game config")
    }

    /// Driver parameters; an explicit time limit wins over competitive mode.
    pub(crate) fn environment(&self) -> Config {
        let time_limit = self
            .time_limit_ms
            .map(Duration::from_millis)
            .or(self.competitive.then_some(COMPETITIVE_TIME_LIMIT));
        Config {
            max_steps: self.max_steps,
            time_limit,
            view_range: self.view_range,
        }
    }

    /// One decision-maker per seat, each seeded from the game seed.
    pub(crate) fn build_agents(&self) -> [BoxedAgent; AGENT_COUNT] {
        std::array::from_fn(|index| {
            self.agents[index].build(self.seed.wrapping_add(index as u64 + 1))
        })
    }
}
