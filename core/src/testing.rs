//! Board fixtures shared by the unit tests.

use crate::*;

/// No two orthogonal neighbors share a color, so nothing matches. Only `Y`, `O` and `P` appear,
/// leaving `R`, `G` and `B` free for the cells a test places.
pub(crate) const QUIET: &str = "
    YOPYOPYO
    OPYOPYOP
    PYOPYOPY
    YOPYOPYO
    OPYOPYOP
    PYOPYOPY
    YOPYOPYO
    OPYOPYOP
";

/// [`QUIET`] with the given cells overwritten, using the board text notation.
pub(crate) fn quiet_with(cells: &[(Pos, char)]) -> Grid {
    let mut grid: Grid = QUIET.parse().unwrap();
    for &(pos, symbol) in cells {
        grid.set_payload(pos, parse_symbol(symbol).unwrap());
    }
    grid
}
