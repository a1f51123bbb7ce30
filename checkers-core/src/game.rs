//! Turn and game state machine.
//!
//! A [`Game`] owns the board, knows whose turn it is, and is the only way to
//! change the position during play. Each call either applies one validated
//! transition or rejects the input and leaves everything unchanged.
//!
//! ```text
//!   AwaitingSelection --select--> AwaitingDestination --choose--+
//!          ^                            |                       |
//!          |<---------deselect----------+                       v
//!          |                                           capture with more
//!          |<------turn over (switch side)----------   captures available?
//!          |                                                |yes
//!          |                                                v
//!          +<------------------------------------- ChainCapturing --choose--+
//!                                                           ^               |
//!                                                           +---------------+
//!   any turn start with no legal move (or quiet limit hit) -> GameOver
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, SelectionError};
use crate::{Board, Cell, Kind, Move, Player, Pos};

/// How a finished game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Player),
    /// The quiet-move limit was reached.
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{player} wins"),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

/// Rule options. The defaults are standard checkers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// When any capture is available, steps are illegal.
    pub forced_capture: bool,
    /// Side that opens the game.
    pub first_player: Player,
    /// Declare a draw after this many consecutive plies in which only kings
    /// moved and nothing was captured. `None` (or zero) disables the rule.
    pub quiet_move_limit: Option<u16>,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            forced_capture: true,
            first_player: Player::One,
            quiet_move_limit: Some(80),
        }
    }
}

/// Where the game is in the turn cycle.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the side to move to pick a piece.
    AwaitingSelection,
    /// A piece is picked; `moves` are its legal moves this turn.
    AwaitingDestination { selected: Pos, moves: Vec<Move> },
    /// The piece at `piece` captured and must keep capturing.
    ChainCapturing { piece: Pos, moves: Vec<Move> },
    GameOver(Outcome),
}

/// Result of a successfully applied move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Applied {
    #[serde(rename = "move")]
    pub mov: Move,
    pub mover: Player,
    /// The moving pawn was crowned.
    pub promoted: bool,
    /// False when the same piece must continue a capture chain.
    pub turn_over: bool,
}

/// Everything needed to step back one move.
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    board: Board,
    side_to_move: Player,
    chain: Option<Pos>,
    quiet_plies: u16,
}

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    side_to_move: Player,
    phase: Phase,
    rules: Rules,
    quiet_plies: u16,
    /// Snapshot taken before each applied move.
    history: Vec<Snapshot>,
    /// Moves applied so far; one entry per chain link.
    played: Vec<Move>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Start a standard game.
    pub fn new() -> Game {
        Self::with_rules(Rules::default())
    }

    /// Start from the initial layout with custom rules.
    pub fn with_rules(rules: Rules) -> Game {
        Self::from_position(Board::initial_layout(), rules.first_player, rules)
    }

    /// Start from an arbitrary position. If `side_to_move` cannot move the
    /// game is over immediately.
    ///
    /// The board is trusted: every public way of building one (`set`,
    /// `FromStr`, deserialization) keeps the encoding invariants. A quiet-move
    /// limit of zero is treated as no limit.
    pub fn from_position(board: Board, side_to_move: Player, rules: Rules) -> Game {
        debug_assert!(board.check_invariants().is_ok());
        let rules = Rules {
            quiet_move_limit: rules.quiet_move_limit.filter(|&limit| limit > 0),
            ..rules
        };
        let mut game = Game {
            board,
            side_to_move,
            phase: Phase::AwaitingSelection,
            rules,
            quiet_plies: 0,
            history: Vec::new(),
            played: Vec::new(),
        };
        game.start_turn(None);
        game
    }

    /// Return to the initial layout, keeping the rules.
    pub fn reset(&mut self) {
        *self = Self::with_rules(self.rules);
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Consecutive plies without a capture or pawn move.
    #[inline]
    pub fn quiet_plies(&self) -> u16 {
        self.quiet_plies
    }

    /// Moves applied so far, oldest first.
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.played
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// The selected piece, or the piece that must continue its chain.
    pub fn selected(&self) -> Option<Pos> {
        match self.phase {
            Phase::AwaitingDestination { selected, .. } => Some(selected),
            Phase::ChainCapturing { piece, .. } => Some(piece),
            _ => None,
        }
    }

    /// Destinations reachable by the selected piece.
    pub fn highlighted(&self) -> Vec<Pos> {
        match &self.phase {
            Phase::AwaitingDestination { moves, .. } | Phase::ChainCapturing { moves, .. } => {
                moves.iter().map(Move::to).collect()
            }
            _ => Vec::new(),
        }
    }

    // ========== Move Queries ==========

    /// Every move the side to move may make right now, with the forced-capture
    /// rule and any capture chain applied.
    pub fn turn_moves(&self) -> Vec<Move> {
        match &self.phase {
            Phase::GameOver(_) => Vec::new(),
            Phase::ChainCapturing { moves, .. } => moves.clone(),
            _ => self.unrestricted_turn_moves(),
        }
    }

    /// Moves the piece at `pos` may make this turn.
    pub fn legal_moves_from(&self, pos: Pos) -> Vec<Move> {
        let mut moves = self.turn_moves();
        moves.retain(|mov| mov.from() == pos);
        moves
    }

    /// Turn moves ignoring the current phase.
    fn unrestricted_turn_moves(&self) -> Vec<Move> {
        let mut moves = self.board.all_moves(self.side_to_move);
        if self.rules.forced_capture && moves.iter().any(Move::is_capture) {
            moves.retain(Move::is_capture);
        }
        moves
    }

    // ========== Transitions ==========

    /// Pick the piece to move. Picking another own piece replaces the
    /// current selection.
    pub fn select(&mut self, pos: Pos) -> Result<(), RuleError> {
        match self.phase {
            Phase::GameOver(outcome) => return Err(RuleError::GameFinished(outcome)),
            Phase::ChainCapturing { piece, .. } => {
                return if pos == piece {
                    Ok(())
                } else {
                    Err(SelectionError::MustContinueChain { piece }.into())
                };
            }
            Phase::AwaitingSelection | Phase::AwaitingDestination { .. } => {}
        }

        self.check_own_piece(pos)?;
        let moves = self.legal_moves_from(pos);
        if moves.is_empty() {
            return Err(SelectionError::NoLegalMoves(pos).into());
        }
        self.phase = Phase::AwaitingDestination { selected: pos, moves };
        Ok(())
    }

    /// Drop the current selection. A capture chain cannot be abandoned.
    pub fn deselect(&mut self) {
        if let Phase::AwaitingDestination { .. } = self.phase {
            self.phase = Phase::AwaitingSelection;
        }
    }

    /// Move the selected piece to `to`.
    pub fn choose(&mut self, to: Pos) -> Result<Applied, RuleError> {
        let (from, mov) = match &self.phase {
            Phase::GameOver(outcome) => return Err(RuleError::GameFinished(*outcome)),
            Phase::AwaitingSelection => return Err(SelectionError::NothingSelected.into()),
            Phase::AwaitingDestination { selected: from, moves }
            | Phase::ChainCapturing { piece: from, moves } => {
                (*from, moves.iter().copied().find(|mov| mov.to() == to))
            }
        };
        let mov = mov.ok_or(RuleError::IllegalDestination { from, to })?;
        self.apply(mov)
    }

    /// Apply a complete move without going through selection.
    pub fn play(&mut self, mov: Move) -> Result<Applied, RuleError> {
        match self.phase {
            Phase::GameOver(outcome) => return Err(RuleError::GameFinished(outcome)),
            Phase::ChainCapturing { piece, .. } if mov.from() != piece => {
                return Err(SelectionError::MustContinueChain { piece }.into());
            }
            _ => {}
        }
        if !self.turn_moves().contains(&mov) {
            self.check_own_piece(mov.from())?;
            return Err(RuleError::IllegalDestination { from: mov.from(), to: mov.to() });
        }
        self.apply(mov)
    }

    /// Step back one move (one chain link). Returns the move undone.
    pub fn undo(&mut self) -> Option<Move> {
        let snapshot = self.history.pop()?;
        let mov = self.played.pop();
        self.board = snapshot.board;
        self.side_to_move = snapshot.side_to_move;
        self.quiet_plies = snapshot.quiet_plies;
        self.start_turn(snapshot.chain);
        mov
    }

    fn check_own_piece(&self, pos: Pos) -> Result<(), SelectionError> {
        match self.board.cell_at(pos).owner() {
            None => Err(SelectionError::EmptyCell(pos)),
            Some(owner) if owner != self.side_to_move => Err(SelectionError::OpponentPiece(pos)),
            Some(_) => Ok(()),
        }
    }

    /// Apply a move already known to be legal this turn.
    fn apply(&mut self, mov: Move) -> Result<Applied, RuleError> {
        let mover = self.side_to_move;
        let Cell::Occupied { kind, .. } = self.board.cell_at(mov.from()) else {
            return Err(RuleError::InvariantViolation("moving piece is missing"));
        };

        let snapshot = Snapshot {
            board: self.board,
            side_to_move: self.side_to_move,
            chain: match self.phase {
                Phase::ChainCapturing { piece, .. } => Some(piece),
                _ => None,
            },
            quiet_plies: self.quiet_plies,
        };
        let promoted = self.board.apply_move(mov)?;
        self.history.push(snapshot);
        self.played.push(mov);

        if mov.is_capture() || kind == Kind::Pawn {
            self.quiet_plies = 0;
        } else {
            self.quiet_plies = self.quiet_plies.saturating_add(1);
        }

        // A freshly crowned piece ends the turn.
        let continuation = if mov.is_capture() && !promoted {
            self.board.captures_from(mov.to())
        } else {
            Vec::new()
        };
        let turn_over = continuation.is_empty();
        if turn_over {
            self.side_to_move = mover.opponent();
            self.start_turn(None);
        } else {
            self.phase = Phase::ChainCapturing { piece: mov.to(), moves: continuation };
        }

        Ok(Applied { mov, mover, promoted, turn_over })
    }

    /// Set the phase for the start of a turn (or the middle of a chain).
    fn start_turn(&mut self, chain: Option<Pos>) {
        if let Some(piece) = chain {
            let moves = self.board.captures_from(piece);
            if !moves.is_empty() {
                self.phase = Phase::ChainCapturing { piece, moves };
                return;
            }
        }

        // A side that cannot move has lost, even on the ply that reaches the
        // quiet-move limit.
        self.phase = if self.unrestricted_turn_moves().is_empty() {
            Phase::GameOver(Outcome::Winner(self.side_to_move.opponent()))
        } else if self
            .rules
            .quiet_move_limit
            .is_some_and(|limit| self.quiet_plies >= limit)
        {
            Phase::GameOver(Outcome::Draw)
        } else {
            Phase::AwaitingSelection
        };
    }
}
