//! Packed encoding of a single board tile.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AgentId, AGENT_COUNT, FLAME_ID_LIMIT};

const PASSAGE: u32 = 0;
const RIGID: u32 = 1;
const WOOD: u32 = 2 << 8;
const BOMB: u32 = 3;
const FLAMES: u32 = 4 << 16;
const FOG: u32 = 5;
const EXTRA_BOMB: u32 = 6;
const INCREASE_RANGE: u32 = 7;
const KICK: u32 = 8;
const AGENT: u32 = 1 << 24;

const FLAG_MASK: u32 = 0b11;
const FLAME_ID_SHIFT: u32 = 3;

/// Pick-up items hidden in wood or lying on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Raises the number of bombs an agent may have planted at once.
    ExtraBomb,
    /// Raises the blast strength of the agent's bombs.
    IncreaseRange,
    /// Lets the agent push bombs by walking into them.
    Kick,
}

impl PowerUp {
    /// Every pick-up in flag order.
    pub const ALL: [PowerUp; 3] = [PowerUp::ExtraBomb, PowerUp::IncreaseRange, PowerUp::Kick];

    /// Two-bit reveal flag recorded in wood and flame tiles.
    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::ExtraBomb => 1,
            Self::IncreaseRange => 2,
            Self::Kick => 3,
        }
    }

    /// Decodes a reveal flag; zero means the tile hides nothing.
    #[must_use]
    pub const fn from_flag(flag: u8) -> Option<Self> {
        match flag & FLAG_MASK as u8 {
            1 => Some(Self::ExtraBomb),
            2 => Some(Self::IncreaseRange),
            3 => Some(Self::Kick),
            _ => None,
        }
    }

    const fn item_code(self) -> u32 {
        match self {
            Self::ExtraBomb => EXTRA_BOMB,
            Self::IncreaseRange => INCREASE_RANGE,
            Self::Kick => KICK,
        }
    }
}

/// Semantic occupant of one board tile.
///
/// A tile holds exactly one occupant. Bombs hidden underneath an agent are not
/// visible here; the bomb queue is the authority on where bombs lie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Empty, walkable tile.
    #[default]
    Passage,
    /// Indestructible obstacle that stops flames.
    Rigid,
    /// Destructible obstacle, optionally hiding a pick-up.
    Wood(Option<PowerUp>),
    /// Planted bomb not covered by an agent.
    Bomb,
    /// Burning tile stamped by the flame with identifier `id`.
    Flames {
        /// Identifier of the flame that stamped the tile last.
        id: u16,
        /// Pick-up revealed once the fire clears.
        reveals: Option<PowerUp>,
    },
    /// Tile hidden from the observing agent.
    Fog,
    /// Pick-up lying on the board.
    PowerUp(PowerUp),
    /// Tile occupied by an agent.
    Agent(AgentId),
}

impl Cell {
    /// Whether an agent may step onto the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Passage | Self::PowerUp(_))
    }

    /// Whether the tile is currently burning.
    #[must_use]
    pub const fn is_flame(self) -> bool {
        matches!(self, Self::Flames { .. })
    }

    /// Whether the tile holds a destructible obstacle.
    #[must_use]
    pub const fn is_wood(self) -> bool {
        matches!(self, Self::Wood(_))
    }

    /// Packs the cell into the integer wire format.
    #[must_use]
    pub const fn encode(self) -> u32 {
        match self {
            Self::Passage => PASSAGE,
            Self::Rigid => RIGID,
            Self::Wood(reveals) => WOOD | encode_flag(reveals),
            Self::Bomb => BOMB,
            Self::Flames { id, reveals } => {
                FLAMES | ((id as u32 % FLAME_ID_LIMIT as u32) << FLAME_ID_SHIFT) | encode_flag(reveals)
            }
            Self::Fog => FOG,
            Self::PowerUp(power_up) => power_up.item_code(),
            Self::Agent(agent) => AGENT + agent.get() as u32,
        }
    }

    /// Unpacks a cell from the integer wire format.
    pub fn decode(raw: u32) -> Result<Self, CodecError> {
        match raw {
            PASSAGE => return Ok(Self::Passage),
            RIGID => return Ok(Self::Rigid),
            BOMB => return Ok(Self::Bomb),
            FOG => return Ok(Self::Fog),
            EXTRA_BOMB => return Ok(Self::PowerUp(PowerUp::ExtraBomb)),
            INCREASE_RANGE => return Ok(Self::PowerUp(PowerUp::IncreaseRange)),
            KICK => return Ok(Self::PowerUp(PowerUp::Kick)),
            _ => {}
        }

        if raw & !FLAG_MASK == WOOD {
            return Ok(Self::Wood(decode_flag(raw)));
        }

        if raw >> 16 == FLAMES >> 16 {
            // bit 2 is never set by the encoder
            if raw & 0b100 != 0 {
                return Err(CodecError::UnknownCell(raw));
            }
            let id = ((raw & 0xFFFF) >> FLAME_ID_SHIFT) as u16;
            return Ok(Self::Flames {
                id,
                reveals: decode_flag(raw),
            });
        }

        if raw >= AGENT {
            let index = raw - AGENT;
            if (index as usize) < AGENT_COUNT {
                return Ok(Self::Agent(AgentId::new(index as u8)));
            }
            return Err(CodecError::UnknownAgent(index));
        }

        Err(CodecError::UnknownCell(raw))
    }
}

impl From<Cell> for u32 {
    fn from(cell: Cell) -> Self {
        cell.encode()
    }
}

impl TryFrom<u32> for Cell {
    type Error = CodecError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Cell::decode(raw)
    }
}

/// Errors raised when an integer does not describe a valid packed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The integer matches none of the defined cell patterns.
    #[error("value {0:#x} is not a valid cell encoding")]
    UnknownCell(u32),
    /// The integer uses the agent tag with an identifier past the agent count.
    #[error("agent marker {0} exceeds the agent count")]
    UnknownAgent(u32),
}

const fn encode_flag(reveals: Option<PowerUp>) -> u32 {
    match reveals {
        Some(power_up) => power_up.flag() as u32,
        None => 0,
    }
}

const fn decode_flag(raw: u32) -> Option<PowerUp> {
    PowerUp::from_flag((raw & FLAG_MASK) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_items_keep_their_wire_values() {
        assert_eq!(Cell::Passage.encode(), 0);
        assert_eq!(Cell::Rigid.encode(), 1);
        assert_eq!(Cell::Wood(None).encode(), 2 << 8);
        assert_eq!(Cell::Bomb.encode(), 3);
        assert_eq!(Cell::Fog.encode(), 5);
        assert_eq!(Cell::PowerUp(PowerUp::ExtraBomb).encode(), 6);
        assert_eq!(Cell::PowerUp(PowerUp::IncreaseRange).encode(), 7);
        assert_eq!(Cell::PowerUp(PowerUp::Kick).encode(), 8);
        assert_eq!(Cell::Agent(AgentId::new(0)).encode(), 1 << 24);
        assert_eq!(Cell::Agent(AgentId::new(3)).encode(), (1 << 24) + 3);
    }

    #[test]
    fn wood_carries_reveal_flag() {
        for power_up in PowerUp::ALL {
            let raw = Cell::Wood(Some(power_up)).encode();
            assert_eq!(raw >> 8, 2);
            assert_eq!(raw & 0b11, u32::from(power_up.flag()));
            assert_eq!(Cell::decode(raw), Ok(Cell::Wood(Some(power_up))));
        }
    }

    #[test]
    fn flame_id_and_flag_are_independent() {
        let cell = Cell::Flames {
            id: 1234,
            reveals: Some(PowerUp::IncreaseRange),
        };
        let raw = cell.encode();
        assert_eq!(raw >> 16, 4);
        assert_eq!((raw & 0xFFFF) >> 3, 1234);
        assert_eq!(raw & 0b11, 2);
        assert_eq!(Cell::decode(raw), Ok(cell));

        let hidden = Cell::Flames {
            id: FLAME_ID_LIMIT - 1,
            reveals: None,
        };
        assert_eq!(Cell::decode(hidden.encode()), Ok(hidden));
    }

    #[test]
    fn decoding_rejects_undefined_patterns() {
        assert_eq!(Cell::decode(9), Err(CodecError::UnknownCell(9)));
        assert_eq!(Cell::decode(2 << 8 | 0b100), Err(CodecError::UnknownCell(2 << 8 | 0b100)));
        assert_eq!(Cell::decode(4 << 16 | 0b100), Err(CodecError::UnknownCell(4 << 16 | 0b100)));
        assert_eq!(Cell::decode((1 << 24) + 4), Err(CodecError::UnknownAgent(4)));
        assert!(Cell::try_from(0xFFFF_FFFF).is_err());
    }

    #[test]
    fn only_passage_and_pick_ups_are_walkable() {
        assert!(Cell::Passage.is_walkable());
        assert!(Cell::PowerUp(PowerUp::Kick).is_walkable());
        assert!(!Cell::Rigid.is_walkable());
        assert!(!Cell::Wood(None).is_walkable());
        assert!(!Cell::Bomb.is_walkable());
        assert!(!Cell::Flames { id: 0, reveals: None }.is_walkable());
        assert!(!Cell::Agent(AgentId::new(1)).is_walkable());
    }

    #[test]
    fn reveal_flag_zero_means_nothing_hidden() {
        assert_eq!(PowerUp::from_flag(0), None);
        for power_up in PowerUp::ALL {
            assert_eq!(PowerUp::from_flag(power_up.flag()), Some(power_up));
        }
    }
}
