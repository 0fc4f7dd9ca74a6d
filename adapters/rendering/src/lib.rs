#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering of bboard states.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use bboard_core::{AgentId, Cell, PowerUp, BOARD_SIZE};
use bboard_world::State;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Three-character glyph of a single tile.
#[must_use]
pub const fn item_glyph(cell: Cell) -> &'static str {
    match cell {
        Cell::Passage => "   ",
        Cell::Rigid => "[X]",
        Cell::Wood(_) => "[ ]",
        Cell::Bomb => " o ",
        Cell::Flames { .. } => " * ",
        Cell::Fog => " ~ ",
        Cell::PowerUp(PowerUp::ExtraBomb) => " b ",
        Cell::PowerUp(PowerUp::IncreaseRange) => " r ",
        Cell::PowerUp(PowerUp::Kick) => " k ",
        Cell::Agent(agent) => match agent.get() {
            0 => "<0>",
            1 => "<1>",
            2 => "<2>",
            _ => "<3>",
        },
    }
}

/// Display adapter printing the framed board followed by one status line per
/// agent.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    state: &'a State,
}

impl<'a> BoardView<'a> {
    /// Wraps `state` for display.
    #[must_use]
    pub const fn new(state: &'a State) -> Self {
        Self { state }
    }
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "=".repeat(BOARD_SIZE * 3 + 2);
        writeln!(f, "tick {}", self.state.time_step())?;
        writeln!(f, "{border}")?;
        for row in self.state.board() {
            write!(f, "|")?;
            for cell in row {
                f.write_str(item_glyph(*cell))?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{border}")?;

        for agent in AgentId::ALL {
            let info = self.state.agent(agent);
            if info.dead {
                writeln!(f, "agent {}: dead", agent.get())?;
            } else {
                writeln!(
                    f,
                    "agent {}: {} bombs {}/{} range {}{}",
                    agent.get(),
                    info.position,
                    info.bomb_count,
                    info.max_bomb_count,
                    info.bomb_strength,
                    if info.can_kick { " kick" } else { "" },
                )?;
            }
        }
        Ok(())
    }
}

/// Sink that presents states as the game progresses.
pub trait RenderingBackend {
    /// Presents one post-step state.
    fn present(&mut self, state: &State) -> AnyResult<()>;
}

/// Backend writing [`BoardView`] frames to a text stream.
#[derive(Debug)]
pub struct TerminalBackend<W: Write> {
    out: W,
    clear: bool,
}

impl<W: Write> TerminalBackend<W> {
    /// Appends frames one after another.
    pub const fn new(out: W) -> Self {
        Self { out, clear: false }
    }

    /// Clears the terminal before every frame.
    pub const fn clearing(out: W) -> Self {
        Self { out, clear: true }
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, state: &State) -> AnyResult<()> {
        if self.clear {
            self.out
                .write_all(CLEAR_SCREEN.as_bytes())
                .context("failed to clear terminal")?;
        }
        write!(self.out, "{}", BoardView::new(state)).context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}
