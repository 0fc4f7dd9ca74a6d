//! Packed encoding of a planted bomb.

use serde::{Deserialize, Serialize};

use crate::{AgentId, Position};

const X_SHIFT: u32 = 0;
const Y_SHIFT: u32 = 4;
const OWNER_SHIFT: u32 = 8;
const STRENGTH_SHIFT: u32 = 12;
const FUSE_SHIFT: u32 = 16;

const NIBBLE: u32 = 0xF;
const FUSE_MASK: u32 = 0xFFFF;

/// All information about a single bomb packed into one integer.
///
/// | Bits    | Field        |
/// |---------|--------------|
/// | 0..4    | column       |
/// | 4..8    | row          |
/// | 8..12   | owner        |
/// | 12..16  | strength     |
/// | 16..32  | fuse         |
///
/// Every setter rewrites only its own field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bomb(u32);

impl Bomb {
    /// Packs a new bomb.
    #[must_use]
    pub fn new(position: Position, owner: AgentId, strength: u32, fuse: u32) -> Self {
        let mut bomb = Self(0);
        bomb.set_position(position);
        bomb.set_owner(owner);
        bomb.set_strength(strength);
        bomb.set_fuse(fuse);
        bomb
    }

    /// Wraps an already packed value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The packed representation.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Tile the bomb lies on.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(
            self.field(X_SHIFT, NIBBLE) as u8,
            self.field(Y_SHIFT, NIBBLE) as u8,
        )
    }

    /// Agent that planted the bomb.
    #[must_use]
    pub const fn owner(&self) -> AgentId {
        AgentId::new(self.field(OWNER_SHIFT, NIBBLE) as u8)
    }

    /// Flame reach in tiles along each direction.
    #[must_use]
    pub const fn strength(&self) -> u32 {
        self.field(STRENGTH_SHIFT, NIBBLE)
    }

    /// Ticks left until detonation; zero detonates this tick.
    #[must_use]
    pub const fn fuse(&self) -> u32 {
        self.field(FUSE_SHIFT, FUSE_MASK)
    }

    /// Moves the bomb to another tile.
    pub fn set_position(&mut self, position: Position) {
        self.set_field(X_SHIFT, NIBBLE, u32::from(position.x()));
        self.set_field(Y_SHIFT, NIBBLE, u32::from(position.y()));
    }

    /// Reassigns the owning agent.
    pub fn set_owner(&mut self, owner: AgentId) {
        self.set_field(OWNER_SHIFT, NIBBLE, u32::from(owner.get()));
    }

    /// Replaces the blast strength.
    pub fn set_strength(&mut self, strength: u32) {
        debug_assert!(strength <= NIBBLE, "blast strength exceeds 4 bits");
        self.set_field(STRENGTH_SHIFT, NIBBLE, strength);
    }

    /// Replaces the remaining fuse.
    pub fn set_fuse(&mut self, fuse: u32) {
        debug_assert!(fuse <= FUSE_MASK, "fuse exceeds 16 bits");
        self.set_field(FUSE_SHIFT, FUSE_MASK, fuse);
    }

    /// Burns one tick of fuse.
    pub fn tick_fuse(&mut self) {
        let fuse = self.fuse();
        debug_assert!(fuse > 0, "bomb fuse would drop below zero");
        self.set_fuse(fuse.saturating_sub(1));
    }

    const fn field(&self, shift: u32, mask: u32) -> u32 {
        (self.0 >> shift) & mask
    }

    fn set_field(&mut self, shift: u32, mask: u32, value: u32) {
        self.0 = (self.0 & !(mask << shift)) | ((value & mask) << shift);
    }
}
