//! Move-path enumeration for validating move generation.
//!
//! A whole capture chain counts as one ply, so the numbers match published
//! English draughts perft tables.
//!
//! | Depth | Nodes  |
//! | ----- | ------ |
//! | 1     | 7      |
//! | 2     | 49     |
//! | 3     | 302    |
//! | 4     | 1469   |
//! | 5     | 7361   |
//! | 6     | 36768  |

use crate::error::RuleError;
use crate::game::Game;
use crate::Move;

/// Count the leaf nodes `depth` plies below the current position.
///
/// The game is played forward and undone in place; on return it is back in
/// the state it started in.
pub fn perft(game: &mut Game, depth: u32) -> Result<u64, RuleError> {
    if depth == 0 {
        return Ok(1);
    }

    let mut nodes = 0;
    for mov in game.turn_moves() {
        nodes += perft_after(game, mov, depth)?;
    }
    Ok(nodes)
}

/// Per-move node counts at the root (a "divide").
pub fn divide(game: &mut Game, depth: u32) -> Result<Vec<(Move, u64)>, RuleError> {
    if depth == 0 {
        return Ok(Vec::new());
    }
    game.turn_moves()
        .into_iter()
        .map(|mov| Ok((mov, perft_after(game, mov, depth)?)))
        .collect()
}

/// Nodes below `mov`. A chain link that does not end the turn keeps the
/// same depth.
pub fn perft_after(game: &mut Game, mov: Move, depth: u32) -> Result<u64, RuleError> {
    let applied = game.play(mov)?;
    let remaining = if applied.turn_over { depth - 1 } else { depth };
    let nodes = perft(game, remaining);
    game.undo();
    nodes
}
