// Occupancy kinds of the treasure map, and their map symbols.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::grid::Cost;

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum TrapKind {
    /// X1: every step costs double energy.
    HeavyGravity,
    /// X2: every move costs double steps.
    Slowdown,
    /// X3: pushes the player two cells forward.
    Push,
    /// X4: destroys all uncollected treasures.
    TreasureDestroyer,
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum RewardKind {
    /// R1: every step costs half energy.
    LowGravity,
    /// R2: every move costs half steps.
    Speedup,
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Default)]
pub enum Tile {
    #[default]
    Empty,
    Start,
    Blocked,
    Treasure,
    Trap(TrapKind),
    Reward(RewardKind),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TileParseError {
    #[error("unknown tile symbol {0:?}")]
    UnknownSymbol(String),
    #[error("no trap kind X{0} (expected X1 to X4)")]
    UnknownTrap(u32),
    #[error("no reward kind R{0} (expected R1 or R2)")]
    UnknownReward(u32),
}

impl TrapKind {
    pub const ALL: [TrapKind; 4] = [TrapKind::HeavyGravity, TrapKind::Slowdown,
                                    TrapKind::Push, TrapKind::TreasureDestroyer];

    pub fn index(&self) -> u32 {
        match self {
            TrapKind::HeavyGravity => 1,
            TrapKind::Slowdown => 2,
            TrapKind::Push => 3,
            TrapKind::TreasureDestroyer => 4,
        }
    }

    fn from_index(index: u32) -> Option<Self> {
        TrapKind::ALL.iter().copied().find(|kind| kind.index() == index)
    }
}

impl RewardKind {
    pub const ALL: [RewardKind; 2] = [RewardKind::LowGravity, RewardKind::Speedup];

    pub fn index(&self) -> u32 {
        match self {
            RewardKind::LowGravity => 1,
            RewardKind::Speedup => 2,
        }
    }

    fn from_index(index: u32) -> Option<Self> {
        RewardKind::ALL.iter().copied().find(|kind| kind.index() == index)
    }
}

impl Tile {
    /// Cost charged for stepping onto this tile, in half-steps.
    pub fn step_cost(&self) -> Cost {
        match self {
            Tile::Trap(_) => Cost::from_half_steps(4),
            Tile::Reward(_) => Cost::from_half_steps(1),
            _ => Cost::STEP,
        }
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        *self == Tile::Blocked
    }

    /// Text shown to the player when hovering the tile.
    pub fn description(&self) -> &'static str {
        match self {
            Tile::Trap(TrapKind::HeavyGravity) =>
                "Trap 1: Increases gravity, step costs double energy.",
            Tile::Trap(TrapKind::Slowdown) =>
                "Trap 2: Decreases speed, moves cost double steps.",
            Tile::Trap(TrapKind::Push) =>
                "Trap 3: Pushes you two cells forward.",
            Tile::Trap(TrapKind::TreasureDestroyer) =>
                "Trap 4: Destroys all uncollected treasures.",
            Tile::Reward(RewardKind::LowGravity) =>
                "Reward 1: Decreases gravity, step costs half energy.",
            Tile::Reward(RewardKind::Speedup) =>
                "Reward 2: Increases speed, moves cost half steps.",
            Tile::Treasure => "Treasure! You found one!",
            Tile::Empty => "Empty Tile",
            Tile::Blocked => "Blocked Tile",
            Tile::Start => "Start Position",
        }
    }

    /// Parses a JSON map symbol, where the empty tile is the empty string.
    pub fn from_symbol(symbol: &str) -> Result<Self, TileParseError> {
        lazy_static! {
            static ref KIND: Regex = Regex::new(r"^([XR])(\d+)$").unwrap();
        }
        match symbol {
            "" => Ok(Tile::Empty),
            "S" => Ok(Tile::Start),
            "#" => Ok(Tile::Blocked),
            "T" => Ok(Tile::Treasure),
            _ => {
                let caps = KIND.captures(symbol)
                    .ok_or_else(|| TileParseError::UnknownSymbol(symbol.to_string()))?;
                let index: u32 = caps[2].parse()
                    .map_err(|_| TileParseError::UnknownSymbol(symbol.to_string()))?;
                if &caps[1] == "X" {
                    TrapKind::from_index(index).map(Tile::Trap)
                        .ok_or(TileParseError::UnknownTrap(index))
                } else {
                    RewardKind::from_index(index).map(Tile::Reward)
                        .ok_or(TileParseError::UnknownReward(index))
                }
            }
        }
    }

    /// Symbol used in JSON maps ("" for empty).
    pub fn symbol(&self) -> String {
        match self {
            Tile::Empty => String::new(),
            other => other.to_string(),
        }
    }
}

// Text maps use '.' for empty tiles, since they are whitespace-separated.
impl FromStr for Tile {
    type Err = TileParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "." => Ok(Tile::Empty),
            "" => Err(TileParseError::UnknownSymbol(String::new())),
            _ => Tile::from_symbol(token),
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Empty => write!(f, "."),
            Tile::Start => write!(f, "S"),
            Tile::Blocked => write!(f, "#"),
            Tile::Treasure => write!(f, "T"),
            Tile::Trap(kind) => write!(f, "X{}", kind.index()),
            Tile::Reward(kind) => write!(f, "R{}", kind.index()),
        }
    }
}
