use arrayvec::ArrayVec;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::tiles::Tile;

#[derive(Serialize, Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Copy, Clone)]
pub struct Pos {
    pub row: u16,
    pub col: u16,
}

impl Pos {
    pub const fn new(row: u16, col: u16) -> Self {
        Pos { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// Every step cost is a multiple of 0.5, so costs are kept exact as a count of
// half-steps. u32::MAX is reserved for "unreachable".
#[derive(Debug, PartialEq, Eq, Hash, Ord, PartialOrd, Copy, Clone, Default)]
pub struct Cost(u32);

impl Cost {
    pub const ZERO: Cost = Cost(0);
    pub const STEP: Cost = Cost(2);
    pub const INFINITE: Cost = Cost(u32::MAX);

    pub const fn from_half_steps(half_steps: u32) -> Self {
        Cost(half_steps)
    }

    pub fn half_steps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        *self != Cost::INFINITE
    }

    pub fn as_f64(&self) -> f64 {
        if self.is_finite() {
            self.0 as f64 / 2.0
        } else {
            f64::INFINITY
        }
    }
}

impl Add for Cost {
    type Output = Cost;

    // Saturates, so anything plus INFINITE stays INFINITE.
    fn add(self, other: Cost) -> Cost {
        Cost(self.0.saturating_add(other.0))
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Cost {
        iter.fold(Cost::ZERO, |acc, cost| acc + cost)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

pub type Neighbors = ArrayVec<Pos, 6>;

/// Hexagonal map in "odd-q" offset layout: odd columns sit half a tile lower
/// than even ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    // tiles[row][col]
    tiles: Vec<Vec<Tile>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Builds a grid from rows of tiles. All rows must have the same length;
    /// `maps` validates this for user-provided layouts.
    pub fn from_tiles(tiles: Vec<Vec<Tile>>) -> Self {
        let rows = tiles.len();
        let cols = tiles.first().map_or(0, |row| row.len());
        assert!(tiles.iter().all(|row| row.len() == cols),
                "Ragged grid: every row needs {} tiles", cols);
        Grid { tiles, rows, cols }
    }

    /// An all-empty grid.
    pub fn open(rows: usize, cols: usize) -> Self {
        Grid::from_tiles(vec![vec![Tile::Empty; cols]; rows])
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, pos: &Pos) -> bool {
        (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    #[inline]
    pub fn tile(&self, pos: &Pos) -> Tile {
        self.tiles[pos.row as usize][pos.col as usize]
    }

    /// Changes a tile between planning requests (e.g. a trap clearing
    /// treasures). Searches always read the current layout.
    pub fn set_tile(&mut self, pos: &Pos, tile: Tile) {
        self.tiles[pos.row as usize][pos.col as usize] = tile;
    }

    #[inline]
    pub fn walkable(&self, pos: &Pos) -> bool {
        self.contains(pos) && !self.tile(pos).is_blocked()
    }

    /// Cost of entering `pos`.
    #[inline]
    pub fn step_cost(&self, pos: &Pos) -> Cost {
        self.tile(pos).step_cost()
    }

    pub fn positions(&self) -> impl Iterator<Item=Pos> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| Pos::new(row as u16, col as u16))
        })
    }

    /// First start tile, in row-major order.
    pub fn start(&self) -> Option<Pos> {
        self.positions().find(|pos| self.tile(pos) == Tile::Start)
    }

    /// All treasure tiles, in row-major order.
    pub fn treasures(&self) -> Vec<Pos> {
        self.positions().filter(|pos| self.tile(pos) == Tile::Treasure).collect()
    }

    pub fn neighbors(&self, pos: Pos) -> Neighbors {
        const CARDINALS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        // Even columns reach up diagonally, odd columns reach down.
        const EVEN_DIAGONALS: [(i32, i32); 2] = [(-1, -1), (-1, 1)];
        const ODD_DIAGONALS: [(i32, i32); 2] = [(1, -1), (1, 1)];
        let diagonals = if pos.col % 2 == 0 { EVEN_DIAGONALS } else { ODD_DIAGONALS };

        CARDINALS.iter().chain(diagonals.iter()).filter_map(|&(dr, dc)| {
            let row = pos.row as i32 + dr;
            let col = pos.col as i32 + dc;
            if row < 0 || col < 0 {
                return None;
            }
            let neighbor = Pos::new(row as u16, col as u16);
            if self.walkable(&neighbor) {
                Some(neighbor)
            } else {
                None
            }
        }).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.tiles {
            let line: Vec<String> = row.iter()
                .map(|tile| format!("{:>2}", tile.to_string())).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
