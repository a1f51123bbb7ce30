//! Error types for rejected input and broken board invariants.

use std::fmt;

use crate::game::Outcome;
use crate::Pos;

/// Why a selection was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// The chosen cell holds no piece.
    EmptyCell(Pos),
    /// The chosen cell holds a piece of the player not on move.
    OpponentPiece(Pos),
    /// The piece belongs to the side to move but cannot move this turn
    /// (blocked, or another piece has a mandatory capture).
    NoLegalMoves(Pos),
    /// A capture chain is in progress and only this piece may move.
    MustContinueChain { piece: Pos },
    /// A destination was chosen before any piece was selected.
    NothingSelected,
}

/// Errors reported by the rule engine.
///
/// `IllegalSelection`, `IllegalDestination` and `GameFinished` are ordinary
/// rejections: the game is left exactly as it was. `InvariantViolation`
/// means the engine itself is broken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// Raw coordinates outside the 8x8 grid.
    OutOfBounds { row: u8, col: u8 },
    IllegalSelection(SelectionError),
    /// The destination is not among the legal moves of the moving piece.
    IllegalDestination { from: Pos, to: Pos },
    InvariantViolation(&'static str),
    /// Input arrived after the game ended.
    GameFinished(Outcome),
    /// Move or board text that could not be parsed.
    BadNotation(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::EmptyCell(pos) => write!(f, "no piece at {pos}"),
            SelectionError::OpponentPiece(pos) => write!(f, "piece at {pos} belongs to the opponent"),
            SelectionError::NoLegalMoves(pos) => write!(f, "piece at {pos} has no legal move this turn"),
            SelectionError::MustContinueChain { piece } => {
                write!(f, "the piece at {piece} must continue capturing")
            }
            SelectionError::NothingSelected => write!(f, "no piece selected"),
        }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::OutOfBounds { row, col } => {
                write!(f, "position ({row},{col}) is outside the board")
            }
            RuleError::IllegalSelection(reason) => write!(f, "illegal selection: {reason}"),
            RuleError::IllegalDestination { from, to } => {
                write!(f, "illegal destination: {from} cannot move to {to}")
            }
            RuleError::InvariantViolation(what) => write!(f, "board invariant violated: {what}"),
            RuleError::GameFinished(outcome) => write!(f, "game is over ({outcome})"),
            RuleError::BadNotation(text) => write!(f, "cannot parse {text:?}"),
        }
    }
}

impl std::error::Error for SelectionError {}

impl std::error::Error for RuleError {}

impl From<SelectionError> for RuleError {
    fn from(reason: SelectionError) -> Self {
        RuleError::IllegalSelection(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_positions() {
        let err = RuleError::IllegalDestination {
            from: Pos::from_row_col(5, 0),
            to: Pos::from_row_col(3, 0),
        };
        assert_eq!(err.to_string(), "illegal destination: 5,0 cannot move to 3,0");

        let err: RuleError = SelectionError::EmptyCell(Pos::from_row_col(4, 1)).into();
        assert_eq!(err.to_string(), "illegal selection: no piece at 4,1");
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = RuleError::OutOfBounds { row: 8, col: 0 };
        assert_eq!(err.to_string(), "position (8,0) is outside the board");
    }
}
