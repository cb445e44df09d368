use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use core::str::FromStr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square board of tiles, indexed `[row][col]` with row 0 at the top.
///
/// Accessors taking raw coordinates panic when they fall outside the board; use
/// [`Grid::validate_pos`] at API boundaries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    tiles: Array2<Tile>,
    size: Coord,
}

impl Grid {
    /// Board with every cell empty, waiting for a generator to fill it.
    pub fn empty(size: Coord) -> Result<Self> {
        if size < MIN_SIZE {
            return Err(EngineError::BoardTooSmall);
        }
        let dim = usize::from(size);
        let tiles = Array2::from_shape_fn((dim, dim), |(row, col)| {
            Tile::new((row as Coord, col as Coord), Payload::EMPTY)
        });
        Ok(Self { tiles, size })
    }

    /// Builds a board from explicit rows of colors, top row first.
    pub fn from_rows<R: AsRef<[Color]>>(rows: &[R]) -> Result<Self> {
        let size = square_size(rows.len(), rows.iter().map(|row| row.as_ref().len()))?;
        let mut grid = Self::empty(size)?;
        for (row, colors) in rows.iter().enumerate() {
            for (col, &color) in colors.as_ref().iter().enumerate() {
                grid.set_payload((row as Coord, col as Coord), Payload::gem(color));
            }
        }
        Ok(grid)
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self> {
        let (rows, cols) = snapshot.cells.dim();
        let size = square_size(rows, core::iter::repeat_n(cols, rows))?;
        let mut grid = Self::empty(size)?;
        for (pos, payload) in snapshot.iter() {
            grid.set_payload(pos, payload);
        }
        Ok(grid)
    }

    pub const fn size(&self) -> Coord {
        self.size
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }

    pub const fn contains(&self, (row, col): Pos) -> bool {
        row < self.size && col < self.size
    }

    pub fn validate_pos(&self, pos: Pos) -> Result<Pos> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(EngineError::OutOfBounds)
        }
    }

    pub fn get(&self, row: Coord, col: Coord) -> Tile {
        self[(row, col)]
    }

    pub fn payload(&self, pos: Pos) -> Payload {
        self[pos].payload()
    }

    pub fn set_color(&mut self, row: Coord, col: Coord, color: Option<Color>) {
        self.tile_mut((row, col)).set_color(color);
    }

    pub fn set_booster(&mut self, row: Coord, col: Coord, booster: BoosterKind) {
        self.tile_mut((row, col)).set_booster(booster);
    }

    /// Replaces a cell's payload, returning the previous one.
    pub fn set_payload(&mut self, pos: Pos, payload: Payload) -> Payload {
        self.tile_mut(pos).replace_payload(payload)
    }

    /// Empties a cell, returning what it held.
    pub fn clear(&mut self, pos: Pos) -> Payload {
        self.set_payload(pos, Payload::EMPTY)
    }

    pub fn are_adjacent(&self, a: Pos, b: Pos) -> bool {
        self.contains(a) && self.contains(b) && are_adjacent(a, b)
    }

    /// Exchanges color and booster between two cells; positions stay put.
    pub fn swap_payload(&mut self, a: Pos, b: Pos) {
        let payload_a = self.payload(a);
        let payload_b = self.set_payload(b, payload_a);
        self.set_payload(a, payload_b);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| (row, col)))
    }

    pub fn row_positions(&self, row: Coord) -> impl Iterator<Item = Pos> + use<> {
        (0..self.size).map(move |col| (row, col))
    }

    pub fn column_positions(&self, col: Coord) -> impl Iterator<Item = Pos> + use<> {
        (0..self.size).map(move |row| (row, col))
    }

    /// Every row (top to bottom) followed by every column (left to right).
    pub fn lines(&self) -> impl Iterator<Item = (Axis, Vec<Pos>)> + use<> {
        let size = self.size;
        let rows = (0..size).map(move |row| {
            let line = (0..size).map(|col| (row, col)).collect();
            (Axis::Horizontal, line)
        });
        let columns = (0..size).map(move |col| {
            let line = (0..size).map(|row| (row, col)).collect();
            (Axis::Vertical, line)
        });
        rows.chain(columns)
    }

    pub fn neighbors(&self, pos: Pos) -> NeighborIter {
        NeighborIter::new(pos, self.size)
    }

    pub fn empty_count(&self) -> CellCount {
        self.tiles
            .iter()
            .filter(|tile| tile.is_empty())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    pub fn is_full(&self) -> bool {
        self.tiles.iter().all(|tile| !tile.is_empty())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: self.tiles.map(Tile::payload),
        }
    }

    fn tile_mut(&mut self, pos: Pos) -> &mut Tile {
        &mut self.tiles[pos.to_nd_index()]
    }
}

impl Index<Pos> for Grid {
    type Output = Tile;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.tiles[pos.to_nd_index()]
    }
}

fn square_size(rows: usize, row_lengths: impl Iterator<Item = usize>) -> Result<Coord> {
    let size: Coord = rows
        .try_into()
        .map_err(|_| EngineError::InvalidBoardShape)?;
    if size < MIN_SIZE {
        return Err(EngineError::BoardTooSmall);
    }
    let mut row_lengths = row_lengths;
    if row_lengths.all(|len| len == rows) {
        Ok(size)
    } else {
        Err(EngineError::InvalidBoardShape)
    }
}

/// Committed board state handed to observers between passes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    cells: Array2<Payload>,
}

impl BoardSnapshot {
    pub fn size(&self) -> Coord {
        self.cells.dim().0.try_into().unwrap_or(Coord::MAX)
    }

    pub fn payload(&self, pos: Pos) -> Option<Payload> {
        self.cells.get(pos.to_nd_index()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, Payload)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &payload)| ((row as Coord, col as Coord), payload))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|payload| !payload.is_empty())
    }

    pub fn booster_count(&self) -> usize {
        self.cells.iter().filter(|payload| payload.is_booster()).count()
    }
}

impl Index<Pos> for BoardSnapshot {
    type Output = Payload;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[pos.to_nd_index()]
    }
}

/// One-character cell notation used by [`Grid`]'s `Display` and `FromStr`.
///
/// Colors are their initial (`R G B Y O P`), `.` is empty, `-` a row clear, `|` a column clear and
/// `*` a color bomb.
pub const fn payload_symbol(payload: Payload) -> char {
    match (payload.booster, payload.color) {
        (BoosterKind::RowClear, _) => '-',
        (BoosterKind::ColumnClear, _) => '|',
        (BoosterKind::ColorBomb, _) => '*',
        (BoosterKind::None, None) => '.',
        (BoosterKind::None, Some(Color::Red)) => 'R',
        (BoosterKind::None, Some(Color::Green)) => 'G',
        (BoosterKind::None, Some(Color::Blue)) => 'B',
        (BoosterKind::None, Some(Color::Yellow)) => 'Y',
        (BoosterKind::None, Some(Color::Orange)) => 'O',
        (BoosterKind::None, Some(Color::Purple)) => 'P',
        (BoosterKind::None, Some(Color::Neutral)) => '#',
    }
}

pub fn parse_symbol(symbol: char) -> Result<Payload> {
    Ok(match symbol {
        'R' => Payload::gem(Color::Red),
        'G' => Payload::gem(Color::Green),
        'B' => Payload::gem(Color::Blue),
        'Y' => Payload::gem(Color::Yellow),
        'O' => Payload::gem(Color::Orange),
        'P' => Payload::gem(Color::Purple),
        '#' => Payload::gem(Color::Neutral),
        '.' => Payload::EMPTY,
        '-' => Payload::booster(BoosterKind::RowClear),
        '|' => Payload::booster(BoosterKind::ColumnClear),
        '*' => Payload::booster(BoosterKind::ColorBomb),
        other => return Err(EngineError::UnknownSymbol(other)),
    })
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                write!(f, "{}", payload_symbol(self.payload((row, col))))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = EngineError;

    /// Parses one board row per non-blank line; whitespace inside a line is ignored.
    fn from_str(text: &str) -> Result<Self> {
        let rows = text
            .lines()
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(parse_symbol)
                    .collect::<Result<Vec<_>>>()
            })
            .filter(|row| !matches!(row, Ok(cells) if cells.is_empty()))
            .collect::<Result<Vec<_>>>()?;

        let size = square_size(rows.len(), rows.iter().map(Vec::len))?;
        let mut grid = Self::empty(size)?;
        for (row, cells) in rows.into_iter().enumerate() {
            for (col, payload) in cells.into_iter().enumerate() {
                grid.set_payload((row as Coord, col as Coord), payload);
            }
        }
        Ok(grid)
    }
}
