use gemgrid_core::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = core::result::Result<T, ProtocolError>;

/// Player or host request, one per JSON line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    ProposeSwap {
        from: Pos,
        to: Pos,
    },
    Activate {
        pos: Pos,
    },
    Reset {
        #[serde(default)]
        seed: Option<u64>,
    },
    Snapshot,
}

/// Reply to a [`Command`]. Every variant carries the session's running total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Swap {
        score: Score,
        total: Score,
        passes: Vec<CascadePass>,
        board: BoardSnapshot,
    },
    Activation {
        score: Score,
        total: Score,
        affected: Vec<Pos>,
        passes: Vec<CascadePass>,
        board: BoardSnapshot,
    },
    Rejected {
        reason: RejectReason,
        total: Score,
    },
    Board {
        total: Score,
        board: BoardSnapshot,
    },
}

impl Response {
    pub fn total(&self) -> Score {
        match *self {
            Self::Swap { total, .. }
            | Self::Activation { total, .. }
            | Self::Rejected { total, .. }
            | Self::Board { total, .. } => total,
        }
    }
}

/// What a click on the board turned into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClickAction {
    Select(Pos),
    Deselect,
    Swap(Pos, Pos),
    Activate(Pos),
}

/// Click-to-select state: pick a tile, then pick a neighbor to swap with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Pos>,
}

impl Selection {
    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Clicking the selected booster a second time pops it; clicking any other selected tile again
    /// drops the selection. A non-adjacent click moves the selection.
    pub fn click(&mut self, pos: Pos, is_booster: bool) -> ClickAction {
        use ClickAction::*;

        match self.selected.take() {
            Some(current) if current == pos && is_booster => Activate(pos),
            Some(current) if current == pos => Deselect,
            Some(current) if are_adjacent(current, pos) => Swap(current, pos),
            None | Some(_) => {
                self.selected = Some(pos);
                Select(pos)
            }
        }
    }
}

/// Embedding layer around an [`Engine`]. It is the only owner of the running score.
#[derive(Clone, Debug)]
pub struct Session {
    engine: Engine,
    total: Score,
    selection: Selection,
}

impl Session {
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self> {
        Ok(Self::from_engine(Engine::new(config, seed)?))
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self {
            engine,
            total: 0,
            selection: Selection::default(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn total(&self) -> Score {
        self.total
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn handle(&mut self, command: Command) -> Result<Response> {
        log::debug!("Handling {command:?}");

        let response = match command {
            Command::ProposeSwap { from, to } => match self.engine.propose_swap(from, to)? {
                SwapResult::Rejected(reason) => Response::Rejected {
                    reason,
                    total: self.total,
                },
                SwapResult::Accepted(report) => {
                    self.add(report.score);
                    Response::Swap {
                        score: report.score,
                        total: self.total,
                        passes: report.passes,
                        board: report.snapshot,
                    }
                }
            },
            Command::Activate { pos } => {
                let result = self.engine.activate_at(pos)?;
                self.add(result.score);
                Response::Activation {
                    score: result.score,
                    total: self.total,
                    affected: result.affected,
                    passes: result.passes,
                    board: result.snapshot,
                }
            }
            Command::Reset { seed } => {
                let board = self.engine.reset(seed);
                self.total = 0;
                self.selection.clear();
                Response::Board {
                    total: self.total,
                    board,
                }
            }
            Command::Snapshot => Response::Board {
                total: self.total,
                board: self.engine.snapshot(),
            },
        };

        Ok(response)
    }

    /// Parses one JSON [`Command`] and answers with one JSON [`Response`].
    pub fn handle_json(&mut self, line: &str) -> Result<String> {
        let command: Command = serde_json::from_str(line)?;
        let response = self.handle(command)?;
        Ok(serde_json::to_string(&response)?)
    }

    /// Feeds a click through the selection. Returns a response only when the click did something
    /// to the board.
    pub fn click(&mut self, pos: Pos) -> Result<Option<Response>> {
        let grid = self.engine.grid();
        let pos = grid.validate_pos(pos)?;
        let is_booster = grid[pos].booster().is_booster();

        match self.selection.click(pos, is_booster) {
            ClickAction::Select(_) | ClickAction::Deselect => Ok(None),
            ClickAction::Swap(from, to) => self.handle(Command::ProposeSwap { from, to }).map(Some),
            ClickAction::Activate(pos) => self.handle(Command::Activate { pos }).map(Some),
        }
    }

    fn add(&mut self, score: Score) {
        self.total = self.total.saturating_add(score);
        log::debug!("Scored {score}, total {}", self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: &str = "
        YOPYOPYO
        OPYOPYOP
        PYOPYOPY
        YOPYOPYO
        OPYOPYOP
        PYOPYOPY
        YOPYOPYO
        OPYOPYOP
    ";

    fn session_with(cells: &[(Pos, char)]) -> Session {
        let mut grid: Grid = QUIET.parse().unwrap();
        for &(pos, symbol) in cells {
            grid.set_payload(pos, parse_symbol(symbol).unwrap());
        }
        Session::from_engine(Engine::from_grid(grid, EngineConfig::default(), 3).unwrap())
    }

    #[test]
    fn commands_parse_from_tagged_json() {
        let swap: Command =
            serde_json::from_str(r#"{"type":"proposeSwap","from":[0,0],"to":[0,1]}"#).unwrap();
        let reset: Command = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        let activate: Command = serde_json::from_str(r#"{"type":"activate","pos":[2,5]}"#).unwrap();

        assert_eq!(
            swap,
            Command::ProposeSwap {
                from: (0, 0),
                to: (0, 1)
            }
        );
        assert_eq!(reset, Command::Reset { seed: None });
        assert_eq!(activate, Command::Activate { pos: (2, 5) });
    }

    #[test]
    fn unknown_command_is_a_json_error() {
        let mut session = session_with(&[]);

        let err = session.handle_json(r#"{"type":"shuffle"}"#).unwrap_err();

        assert!(matches!(err, ProtocolError::Json(_)));
    }

    #[test]
    fn rejected_swap_keeps_total() {
        let mut session = session_with(&[]);

        let response = session
            .handle(Command::ProposeSwap {
                from: (0, 0),
                to: (0, 1),
            })
            .unwrap();

        assert_eq!(
            response,
            Response::Rejected {
                reason: RejectReason::NoMatch,
                total: 0
            }
        );
    }

    #[test]
    fn scores_accumulate_across_moves() {
        let mut session = session_with(&[
            ((3, 0), 'R'),
            ((3, 1), 'R'),
            ((4, 2), 'R'),
            ((7, 7), '|'),
        ]);

        let swap = session
            .handle(Command::ProposeSwap {
                from: (4, 2),
                to: (3, 2),
            })
            .unwrap();
        let after_swap = session.total();
        assert!(after_swap >= 30);
        assert_eq!(swap.total(), after_swap);

        // Bottom row cells never fall, so the column clear is still in place.
        let activation = session.handle(Command::Activate { pos: (7, 7) }).unwrap();

        assert!(session.total() >= after_swap + 80);
        assert_eq!(activation.total(), session.total());
    }

    #[test]
    fn engine_errors_pass_through() {
        let mut session = session_with(&[]);

        let not_booster = session.handle(Command::Activate { pos: (0, 0) }).unwrap_err();
        let outside = session
            .handle(Command::Activate { pos: (9, 9) })
            .unwrap_err();

        assert!(matches!(
            not_booster,
            ProtocolError::Engine(EngineError::NotABooster)
        ));
        assert!(matches!(
            outside,
            ProtocolError::Engine(EngineError::OutOfBounds)
        ));
    }

    #[test]
    fn reset_starts_a_new_game() {
        let mut session = session_with(&[((2, 5), '-')]);
        session.handle(Command::Activate { pos: (2, 5) }).unwrap();
        assert!(session.total() > 0);

        let first = session.handle(Command::Reset { seed: Some(8) }).unwrap();
        let second = session.handle(Command::Reset { seed: Some(8) }).unwrap();

        assert_eq!(session.total(), 0);
        assert_eq!(first, second);
        assert!(session.engine().is_stable());
    }

    #[test]
    fn json_lines_round_trip_through_session() {
        let mut session = session_with(&[]);

        let rejected = session
            .handle_json(r#"{"type":"proposeSwap","from":[0,0],"to":[5,5]}"#)
            .unwrap();
        let board = session.handle_json(r#"{"type":"snapshot"}"#).unwrap();

        let rejected: serde_json::Value = serde_json::from_str(&rejected).unwrap();
        assert_eq!(rejected["type"], "rejected");
        assert_eq!(rejected["reason"], "NotAdjacent");
        let board: Response = serde_json::from_str(&board).unwrap();
        assert_eq!(
            board,
            Response::Board {
                total: 0,
                board: session.engine().snapshot()
            }
        );
    }

    #[test]
    fn selection_follows_clicks() {
        let mut selection = Selection::default();

        assert_eq!(selection.click((2, 2), false), ClickAction::Select((2, 2)));
        assert_eq!(selection.click((2, 2), false), ClickAction::Deselect);
        assert_eq!(selection.selected(), None);

        selection.click((2, 2), false);
        assert_eq!(selection.click((5, 5), false), ClickAction::Select((5, 5)));
        assert_eq!(
            selection.click((5, 6), false),
            ClickAction::Swap((5, 5), (5, 6))
        );
        assert_eq!(selection.selected(), None);

        selection.click((1, 1), true);
        assert_eq!(selection.click((1, 1), true), ClickAction::Activate((1, 1)));
    }

    #[test]
    fn clicks_drive_the_engine() {
        let mut session = session_with(&[((3, 0), 'R'), ((3, 1), 'R'), ((4, 2), 'R')]);

        assert_eq!(session.click((4, 2)).unwrap(), None);
        let response = session.click((3, 2)).unwrap();

        assert!(matches!(response, Some(Response::Swap { .. })));
        assert_eq!(session.selection().selected(), None);
        assert!(session.total() >= 30);
    }
}
