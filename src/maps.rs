// Map configuration: text and JSON layouts, the built-in map, and seeded
// random maps for benchmarks and experiments.
//
// Text maps hold one row per line, with whitespace-separated tiles:
//
//     // comment lines and blank lines are skipped
//     S  X2 .  T
//     .  #  R1 T
//
// JSON maps are `{"tiles": [["S", "X2", "", "T"], ...]}`, with "" for empty.

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::grid::{Grid, Pos};
use crate::tiles::{RewardKind, Tile, TileParseError, TrapKind};

/// Rows and columns are addressed with u16 coordinates.
pub const MAX_SIDE: usize = u16::MAX as usize;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Failed reading the map file")]
    Io(#[from] std::io::Error),
    #[error("Failed parsing the JSON map")]
    Json(#[from] serde_json::Error),
    #[error("Bad tile at row {row}, column {col}: {source}")]
    UnknownSymbol {
        row: usize,
        col: usize,
        source: TileParseError,
    },
    #[error("Row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("The map has no tiles")]
    Empty,
    #[error("The map has no start tile")]
    MissingStart,
    #[error("The map is {rows}x{cols}, at most {max} per side is supported", max = MAX_SIDE)]
    TooLarge {
        rows: usize,
        cols: usize,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub tiles: Vec<Vec<String>>,
}

impl MapConfig {
    pub fn from_grid(grid: &Grid) -> Self {
        let tiles = (0..grid.rows()).map(|row| {
            (0..grid.cols())
                .map(|col| grid.tile(&Pos::new(row as u16, col as u16)).symbol())
                .collect::<Vec<String>>()
        }).collect();
        MapConfig { tiles }
    }

    pub fn to_grid(&self) -> Result<Grid, MapError> {
        let rows = self.tiles.iter().enumerate().map(|(row, symbols)| {
            symbols.iter().enumerate().map(|(col, symbol)| {
                Tile::from_symbol(symbol)
                    .map_err(|source| MapError::UnknownSymbol { row, col, source })
            }).collect::<Result<Vec<Tile>, MapError>>()
        }).collect::<Result<Vec<_>, _>>()?;
        build_grid(rows)
    }
}

/// Errors when a side doesn't fit in u16 coordinates.
pub fn check_size(rows: usize, cols: usize) -> Result<(), MapError> {
    if rows > MAX_SIDE || cols > MAX_SIDE {
        return Err(MapError::TooLarge { rows, cols });
    }
    Ok(())
}

fn build_grid(rows: Vec<Vec<Tile>>) -> Result<Grid, MapError> {
    let expected = match rows.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(MapError::Empty),
    };
    if let Some((row, tiles)) = rows.iter().enumerate()
        .find(|(_, tiles)| tiles.len() != expected) {
        return Err(MapError::RaggedRow { row, expected, found: tiles.len() });
    }
    check_size(rows.len(), expected)?;
    Ok(Grid::from_tiles(rows))
}

pub fn parse_text(text: &str) -> Result<Grid, MapError> {
    let rows = text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .enumerate()
        .map(|(row, line)| {
            line.split_whitespace().enumerate().map(|(col, token)| {
                token.parse::<Tile>()
                    .map_err(|source| MapError::UnknownSymbol { row, col, source })
            }).collect::<Result<Vec<Tile>, MapError>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    build_grid(rows)
}

pub fn parse_json(json: &str) -> Result<Grid, MapError> {
    let config: MapConfig = serde_json::from_str(json)?;
    config.to_grid()
}

/// Loads a map file, picking the format from the extension (`.json`, or text
/// for anything else).
pub fn load(path: &Path) -> Result<Grid, MapError> {
    let data = std::fs::read_to_string(path)?;
    let grid = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&data)?,
        _ => parse_text(&data)?,
    };
    debug!("Loaded {}x{} map from {}", grid.rows(), grid.cols(), path.display());
    Ok(grid)
}

const DEFAULT_MAP: &str = "
.  .  .  .  .  .  .  .  .  .
S  X2 .  X4 R1 .  .  .  .  .
.  .  .  .  T  .  X3 R2 #  .
.  R1 #  #  #  X3 .  T  X1 T
#  .  .  T  .  .  #  #  .  .
.  .  X2 .  #  R2 #  .  .  .
.  .  .  .  .  .  .  .  .  .
";

/// The built-in 7x10 treasure map.
pub fn default_grid() -> Grid {
    parse_text(DEFAULT_MAP).expect("built-in map is valid")
}

/// Random map with a start tile, `treasures` treasure tiles, and a sprinkle of
/// blocked, trap and reward tiles. The same seed always gives the same map.
/// Sides must pass `check_size`.
pub fn random_grid(rows: usize, cols: usize, treasures: usize, seed: u64) -> Grid {
    let mut rng = SmallRng::seed_from_u64(seed);
    let tiles: Vec<Vec<Tile>> = (0..rows).map(|_| (0..cols).map(|_| {
        let roll: f64 = rng.gen();
        if roll < 0.15 {
            Tile::Blocked
        } else if roll < 0.25 {
            Tile::Trap(TrapKind::ALL[rng.gen_range(0..TrapKind::ALL.len())])
        } else if roll < 0.32 {
            Tile::Reward(RewardKind::ALL[rng.gen_range(0..RewardKind::ALL.len())])
        } else {
            Tile::Empty
        }
    }).collect::<Vec<_>>()).collect();
    let mut grid = Grid::from_tiles(tiles);

    let mut positions: Vec<Pos> = grid.positions().collect();
    positions.shuffle(&mut rng);
    let mut special = positions.into_iter();
    if let Some(start) = special.next() {
        grid.set_tile(&start, Tile::Start);
    }
    for pos in special.take(treasures) {
        grid.set_tile(&pos, Tile::Treasure);
    }
    grid
}
