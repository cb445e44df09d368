use serde::{Deserialize, Serialize};

use crate::{Coord, Pos};

/// Gem color. The six playable colors form [`Color::PALETTE`]; `Neutral` only ever marks booster
/// tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    Neutral,
}

impl Color {
    pub const PALETTE: [Color; 6] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Orange,
        Color::Purple,
    ];

    pub const fn is_playable(self) -> bool {
        !matches!(self, Self::Neutral)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoosterKind {
    None,
    RowClear,
    ColumnClear,
    ColorBomb,
}

impl BoosterKind {
    pub const fn is_booster(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn is_line(self) -> bool {
        matches!(self, Self::RowClear | Self::ColumnClear)
    }
}

impl Default for BoosterKind {
    fn default() -> Self {
        Self::None
    }
}

/// What a cell holds: the part of a tile that moves during a cascade.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payload {
    pub color: Option<Color>,
    pub booster: BoosterKind,
}

impl Payload {
    pub const EMPTY: Payload = Payload {
        color: None,
        booster: BoosterKind::None,
    };

    pub const fn gem(color: Color) -> Self {
        Self {
            color: Some(color),
            booster: BoosterKind::None,
        }
    }

    /// A booster tile carries the neutral marker instead of a playable color.
    pub const fn booster(kind: BoosterKind) -> Self {
        Self {
            color: Some(Color::Neutral),
            booster: kind,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.color.is_none()
    }

    pub const fn is_booster(self) -> bool {
        self.booster.is_booster()
    }

    /// Color this payload contributes to run detection, if any.
    pub const fn match_color(self) -> Option<Color> {
        match (self.color, self.booster) {
            (Some(color), BoosterKind::None) if color.is_playable() => Some(color),
            _ => None,
        }
    }
}

/// A grid cell. Its position never changes; only the payload does.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    row: Coord,
    col: Coord,
    color: Option<Color>,
    booster: BoosterKind,
}

impl Tile {
    pub(crate) const fn new((row, col): Pos, payload: Payload) -> Self {
        Self {
            row,
            col,
            color: payload.color,
            booster: payload.booster,
        }
    }

    pub const fn row(&self) -> Coord {
        self.row
    }

    pub const fn col(&self) -> Coord {
        self.col
    }

    pub const fn pos(&self) -> Pos {
        (self.row, self.col)
    }

    pub const fn color(&self) -> Option<Color> {
        self.color
    }

    pub const fn booster(&self) -> BoosterKind {
        self.booster
    }

    pub const fn payload(&self) -> Payload {
        Payload {
            color: self.color,
            booster: self.booster,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.color.is_none()
    }

    pub(crate) fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub(crate) fn set_booster(&mut self, booster: BoosterKind) {
        self.booster = booster;
    }

    /// Replaces the payload, returning the previous one.
    pub(crate) fn replace_payload(&mut self, payload: Payload) -> Payload {
        let old = self.payload();
        self.color = payload.color;
        self.booster = payload.booster;
        old
    }
}
