//! Checkers (draughts) rule engine with bit-based board representation.
//!
//! # Board Encoding (3 × 64-bit)
//!
//! ```text
//! one:   bit set where a Player One piece stands
//! two:   bit set where a Player Two piece stands
//! kings: bit set where a king stands (always a subset of one | two)
//!
//! Bit index = row * 8 + col. Only dark squares ((row + col) odd) are ever set.
//!
//!          col 0 1 2 3 4 5 6 7
//!   row 0      . o . o . o . o      Player Two starts on rows 0-2
//!       1      o . o . o . o .      and moves toward row 7.
//!       2      . o . o . o . o
//!       3      _ . _ . _ . _ .
//!       4      . _ . _ . _ . _
//!       5      x . x . x . x .      Player One starts on rows 5-7
//!       6      . x . x . x . x      and moves toward row 0.
//!       7      x . x . x . x .
//! ```
//!
//! # Move Notation
//!
//! ```text
//! 5,0-4,1    step from (5,0) to (4,1)
//! 3,2x1,4    capture from (3,2) over (2,3) to (1,4)
//! ```

pub mod error;
pub mod game;
pub mod input;
pub mod perft;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::{RuleError, SelectionError};
pub use game::{Applied, Game, Outcome, Phase, Rules};
pub use input::{Geometry, InputEvent, PointerInput, Renderer, SelectionAdapter, View};
pub use perft::perft;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Row delta of a pawn move. Player One moves toward row 0.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Player::One => -1,
            Player::Two => 1,
        }
    }

    /// The far rank on which this player's pawns are crowned.
    #[inline]
    pub const fn crowning_row(self) -> u8 {
        match self {
            Player::One => 0,
            Player::Two => 7,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => f.write_str("Player One"),
            Player::Two => f.write_str("Player Two"),
        }
    }
}

/// Piece kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Kind {
    Pawn,
    King,
}

/// Contents of one square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied { kind: Kind, owner: Player },
}

impl Cell {
    #[inline]
    pub const fn pawn(owner: Player) -> Cell {
        Cell::Occupied { kind: Kind::Pawn, owner }
    }

    #[inline]
    pub const fn king(owner: Player) -> Cell {
        Cell::Occupied { kind: Kind::King, owner }
    }

    #[inline]
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied { owner, .. } => Some(owner),
        }
    }

    #[inline]
    pub fn kind(self) -> Option<Kind> {
        match self {
            Cell::Empty => None,
            Cell::Occupied { kind, .. } => Some(kind),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Compact code for renderers: 0 empty, 1 P1 pawn, 2 P1 king, 3 P2 pawn,
    /// 4 P2 king.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Occupied { kind: Kind::Pawn, owner: Player::One } => 1,
            Cell::Occupied { kind: Kind::King, owner: Player::One } => 2,
            Cell::Occupied { kind: Kind::Pawn, owner: Player::Two } => 3,
            Cell::Occupied { kind: Kind::King, owner: Player::Two } => 4,
        }
    }

    /// Text symbol used by the board `Display`/`FromStr` format.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::Occupied { kind: Kind::Pawn, owner: Player::One } => 'x',
            Cell::Occupied { kind: Kind::King, owner: Player::One } => 'X',
            Cell::Occupied { kind: Kind::Pawn, owner: Player::Two } => 'o',
            Cell::Occupied { kind: Kind::King, owner: Player::Two } => 'O',
        }
    }

    fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            '.' | '_' => Some(Cell::Empty),
            'x' => Some(Cell::pawn(Player::One)),
            'X' => Some(Cell::king(Player::One)),
            'o' => Some(Cell::pawn(Player::Two)),
            'O' => Some(Cell::king(Player::Two)),
            _ => None,
        }
    }
}

/// Position on the 8x8 board (0-63, row-major).
///
/// A `Pos` is always in bounds: the only fallible constructor is [`Pos::new`],
/// and stepping off the edge with [`Pos::offset`] yields `None`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Pos(u8);

impl Pos {
    /// Number of rows (and columns).
    pub const SIZE: u8 = 8;

    /// Create a position, failing with `OutOfBounds` outside [0,8)×[0,8).
    #[inline]
    pub fn new(row: u8, col: u8) -> Result<Pos, RuleError> {
        if row < Self::SIZE && col < Self::SIZE {
            Ok(Pos(row * Self::SIZE + col))
        } else {
            Err(RuleError::OutOfBounds { row, col })
        }
    }

    /// Create a position from literal coordinates. Panics when out of range.
    #[inline]
    pub const fn from_row_col(row: u8, col: u8) -> Pos {
        assert!(row < Self::SIZE && col < Self::SIZE, "position out of range");
        Pos(row * Self::SIZE + col)
    }

    /// Create a position from its bit index (0-63).
    #[inline]
    pub const fn from_index(idx: u8) -> Option<Pos> {
        if idx < Self::SIZE * Self::SIZE {
            Some(Pos(idx))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.0 / Self::SIZE
    }

    #[inline]
    pub const fn col(self) -> u8 {
        self.0 % Self::SIZE
    }

    /// Dark squares are the only playable ones.
    #[inline]
    pub const fn is_dark(self) -> bool {
        (self.row() + self.col()) % 2 == 1
    }

    #[inline]
    const fn bit(self) -> u64 {
        1 << self.0
    }

    /// The neighbouring square in `dir`, or `None` past the edge.
    #[inline]
    pub fn offset(self, dir: Direction) -> Option<Pos> {
        let (d_row, d_col) = dir.delta();
        let row = u8::try_from(self.row() as i8 + d_row).ok()?;
        let col = u8::try_from(self.col() as i8 + d_col).ok()?;
        Pos::new(row, col).ok()
    }

    /// Iterate over all 64 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..Self::SIZE * Self::SIZE).map(Pos)
    }

    /// Iterate over the 32 dark squares.
    pub fn dark_squares() -> impl Iterator<Item = Pos> {
        Self::all().filter(|pos| pos.is_dark())
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row(), self.col())
    }
}

impl TryFrom<(u8, u8)> for Pos {
    type Error = RuleError;

    fn try_from((row, col): (u8, u8)) -> Result<Self, Self::Error> {
        Pos::new(row, col)
    }
}

impl From<Pos> for (u8, u8) {
    fn from(pos: Pos) -> Self {
        (pos.row(), pos.col())
    }
}

impl FromStr for Pos {
    type Err = RuleError;

    /// Parse `row,col`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RuleError::BadNotation(s.to_string());
        let (row, col) = s.trim().split_once(',').ok_or_else(bad)?;
        let row: u8 = row.trim().parse().map_err(|_| bad())?;
        let col: u8 = col.trim().parse().map_err(|_| bad())?;
        Pos::new(row, col)
    }
}

/// One of the four diagonal directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// (row, col) delta of one step.
    #[inline]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (-1, 1),
            Direction::DownLeft => (1, -1),
            Direction::DownRight => (1, 1),
        }
    }

    /// Directions a piece may step and capture in.
    pub fn for_piece(kind: Kind, owner: Player) -> &'static [Direction] {
        match (kind, owner) {
            (Kind::King, _) => &Self::ALL,
            (Kind::Pawn, Player::One) => &[Direction::UpLeft, Direction::UpRight],
            (Kind::Pawn, Player::Two) => &[Direction::DownLeft, Direction::DownRight],
        }
    }
}

/// A single move. A turn is one `Step` or a chain of `Capture`s by one piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Move to an adjacent empty dark square.
    Step { from: Pos, to: Pos },
    /// Jump over an adjacent opposing piece, removing it.
    Capture { from: Pos, over: Pos, to: Pos },
}

impl Move {
    #[inline]
    pub fn from(&self) -> Pos {
        match self {
            Move::Step { from, .. } | Move::Capture { from, .. } => *from,
        }
    }

    #[inline]
    pub fn to(&self) -> Pos {
        match self {
            Move::Step { to, .. } | Move::Capture { to, .. } => *to,
        }
    }

    /// The jumped square, for captures.
    #[inline]
    pub fn captured(&self) -> Option<Pos> {
        match self {
            Move::Step { .. } => None,
            Move::Capture { over, .. } => Some(*over),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        matches!(self, Move::Capture { .. })
    }

    /// A step goes one square diagonally; a capture goes two, over the square
    /// in between.
    pub fn is_diagonal(&self) -> bool {
        let (from, to) = (self.from(), self.to());
        let span = from.row().abs_diff(to.row());
        if from.col().abs_diff(to.col()) != span {
            return false;
        }
        match *self {
            Move::Step { .. } => span == 1,
            Move::Capture { over, .. } => {
                span == 2
                    && 2 * over.row() == from.row() + to.row()
                    && 2 * over.col() == from.col() + to.col()
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Step { from, to } => write!(f, "{from}-{to}"),
            Move::Capture { from, to, .. } => write!(f, "{from}x{to}"),
        }
    }
}

impl FromStr for Move {
    type Err = RuleError;

    /// Parse `r,c-r,c` (step) or `r,cxr,c` (capture).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RuleError::BadNotation(s.to_string());
        let text = s.trim();

        let mov = if let Some((from, to)) = text.split_once('-') {
            Move::Step { from: from.parse()?, to: to.parse()? }
        } else if let Some((from, to)) = text.split_once('x') {
            let (from, to): (Pos, Pos) = (from.parse()?, to.parse()?);
            let over = Pos::new((from.row() + to.row()) / 2, (from.col() + to.col()) / 2)?;
            Move::Capture { from, over, to }
        } else {
            return Err(bad());
        };
        if mov.is_diagonal() {
            Ok(mov)
        } else {
            Err(bad())
        }
    }
}

/// Iterate over the squares whose bit is set in `mask`, lowest index first.
fn squares(mut mask: u64) -> impl Iterator<Item = Pos> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let idx = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        Some(Pos(idx))
    })
}

/// Compact board state - three occupancy masks.
///
/// See module documentation for encoding details. Deserialization goes
/// through [`Board::check_invariants`], so a `Board` value is always well
/// formed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "Masks")]
pub struct Board {
    one: u64,
    two: u64,
    kings: u64,
}

/// Unchecked wire form of a [`Board`].
#[derive(Deserialize)]
struct Masks {
    one: u64,
    two: u64,
    kings: u64,
}

impl TryFrom<Masks> for Board {
    type Error = RuleError;

    fn try_from(Masks { one, two, kings }: Masks) -> Result<Self, Self::Error> {
        let board = Board { one, two, kings };
        board.check_invariants()?;
        Ok(board)
    }
}

impl Board {
    /// Squares with (row + col) odd.
    pub const DARK_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

    /// Create a board with no pieces.
    #[inline]
    pub const fn empty() -> Board {
        Board { one: 0, two: 0, kings: 0 }
    }

    /// Standard opening position: 12 pawns each on the dark squares of the
    /// three rows nearest each player.
    pub fn initial_layout() -> Board {
        let mut board = Board::empty();
        for pos in Pos::dark_squares() {
            if pos.row() < 3 {
                board.put(pos, Cell::pawn(Player::Two));
            } else if pos.row() > 4 {
                board.put(pos, Cell::pawn(Player::One));
            }
        }
        board
    }

    /// Occupancy mask of one player's pieces.
    #[inline]
    pub fn owner_mask(&self, player: Player) -> u64 {
        match player {
            Player::One => self.one,
            Player::Two => self.two,
        }
    }

    #[inline]
    pub fn occupied(&self) -> u64 {
        self.one | self.two
    }

    /// Get the contents of a square.
    #[inline]
    pub fn cell_at(&self, pos: Pos) -> Cell {
        let bit = pos.bit();
        let owner = if self.one & bit != 0 {
            Player::One
        } else if self.two & bit != 0 {
            Player::Two
        } else {
            return Cell::Empty;
        };
        let kind = if self.kings & bit != 0 { Kind::King } else { Kind::Pawn };
        Cell::Occupied { kind, owner }
    }

    /// Get the contents of a square from raw coordinates.
    pub fn at(&self, row: u8, col: u8) -> Result<Cell, RuleError> {
        Ok(self.cell_at(Pos::new(row, col)?))
    }

    /// Overwrite a square. Pieces may only be put on dark squares.
    pub fn set(&mut self, pos: Pos, cell: Cell) -> Result<(), RuleError> {
        if !cell.is_empty() && !pos.is_dark() {
            return Err(RuleError::InvariantViolation("pieces may only stand on dark squares"));
        }
        self.put(pos, cell);
        Ok(())
    }

    #[inline]
    fn put(&mut self, pos: Pos, cell: Cell) {
        let bit = pos.bit();
        self.one &= !bit;
        self.two &= !bit;
        self.kings &= !bit;
        if let Cell::Occupied { kind, owner } = cell {
            match owner {
                Player::One => self.one |= bit,
                Player::Two => self.two |= bit,
            }
            if kind == Kind::King {
                self.kings |= bit;
            }
        }
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.occupied() & pos.bit() == 0
    }

    /// Squares holding the given player's pieces.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = Pos> {
        squares(self.owner_mask(player))
    }

    /// Number of pieces a player has on the board.
    #[inline]
    pub fn count(&self, player: Player) -> u32 {
        self.owner_mask(player).count_ones()
    }

    #[inline]
    pub fn count_kings(&self, player: Player) -> u32 {
        (self.owner_mask(player) & self.kings).count_ones()
    }

    /// Crown the pawn at `pos`. Returns false if there is no pawn there.
    pub fn promote(&mut self, pos: Pos) -> bool {
        match self.cell_at(pos) {
            Cell::Occupied { kind: Kind::Pawn, .. } => {
                self.kings |= pos.bit();
                true
            }
            _ => false,
        }
    }

    /// Verify the encoding invariants: owners disjoint, kings occupied, and
    /// nothing on a light square.
    pub fn check_invariants(&self) -> Result<(), RuleError> {
        if self.one & self.two != 0 {
            return Err(RuleError::InvariantViolation("two pieces claim the same square"));
        }
        if self.kings & !self.occupied() != 0 {
            return Err(RuleError::InvariantViolation("king flag on an empty square"));
        }
        if self.occupied() & !Self::DARK_SQUARES != 0 {
            return Err(RuleError::InvariantViolation("piece on a light square"));
        }
        Ok(())
    }

    // ========== Apply ==========

    /// Relocate the moving piece, remove a captured piece, and crown a pawn
    /// that lands on its far rank. Returns whether the piece was crowned.
    ///
    /// Only the mechanics are checked here (diagonal shape, source occupied,
    /// destination empty, jumped piece hostile); turn order, pawn direction
    /// and forced capture are the business of [`Game`].
    pub fn apply_move(&mut self, mov: Move) -> Result<bool, RuleError> {
        if !mov.is_diagonal() {
            return Err(RuleError::IllegalDestination { from: mov.from(), to: mov.to() });
        }
        let Cell::Occupied { kind, owner } = self.cell_at(mov.from()) else {
            return Err(RuleError::InvariantViolation("no piece on the source square"));
        };
        if !self.is_empty(mov.to()) {
            return Err(RuleError::InvariantViolation("destination square is occupied"));
        }
        if let Some(over) = mov.captured() {
            if self.cell_at(over).owner() != Some(owner.opponent()) {
                return Err(RuleError::InvariantViolation("jumped square holds no opposing piece"));
            }
            self.put(over, Cell::Empty);
        }

        self.put(mov.from(), Cell::Empty);
        self.put(mov.to(), Cell::Occupied { kind, owner });

        let promoted =
            kind == Kind::Pawn && mov.to().row() == owner.crowning_row() && self.promote(mov.to());
        debug_assert!(self.check_invariants().is_ok());
        Ok(promoted)
    }

    // ========== Move Generation ==========

    /// Every step and capture available to the piece at `from`, ignoring
    /// whose turn it is and the forced-capture rule. Empty for an empty cell.
    pub fn legal_moves(&self, from: Pos) -> Vec<Move> {
        let Cell::Occupied { kind, owner } = self.cell_at(from) else {
            return Vec::new();
        };

        let mut moves = Vec::with_capacity(4);
        for &dir in Direction::for_piece(kind, owner) {
            let Some(next) = from.offset(dir) else {
                continue;
            };
            match self.cell_at(next) {
                Cell::Empty => moves.push(Move::Step { from, to: next }),
                Cell::Occupied { owner: other, .. } if other != owner => {
                    if let Some(landing) = next.offset(dir) {
                        if self.is_empty(landing) {
                            moves.push(Move::Capture { from, over: next, to: landing });
                        }
                    }
                }
                Cell::Occupied { .. } => {}
            }
        }
        moves
    }

    /// Captures available to the piece at `from`.
    pub fn captures_from(&self, from: Pos) -> Vec<Move> {
        let mut moves = self.legal_moves(from);
        moves.retain(Move::is_capture);
        moves
    }

    /// Check if any piece of `player` can capture.
    pub fn has_capture(&self, player: Player) -> bool {
        self.pieces(player)
            .any(|pos| self.legal_moves(pos).iter().any(Move::is_capture))
    }

    /// All steps and captures for every piece of `player`.
    pub fn all_moves(&self, player: Player) -> Vec<Move> {
        self.pieces(player).flat_map(|pos| self.legal_moves(pos)).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..Pos::SIZE {
            for col in 0..Pos::SIZE {
                let pos = Pos::from_row_col(row, col);
                let symbol = if pos.is_dark() { self.cell_at(pos).symbol() } else { '.' };
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = RuleError;

    /// Parse the 64-symbol format produced by `Display`. Whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if symbols.len() != 64 {
            return Err(RuleError::BadNotation(format!(
                "expected 64 squares, found {}",
                symbols.len()
            )));
        }

        let mut board = Board::empty();
        for (pos, &symbol) in Pos::all().zip(&symbols) {
            let cell = Cell::from_symbol(symbol)
                .ok_or_else(|| RuleError::BadNotation(format!("unknown square symbol {symbol:?}")))?;
            board.set(pos, cell)?;
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Pos {
        Pos::from_row_col(row, col)
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
        assert_eq!(Player::One.crowning_row(), 0);
        assert_eq!(Player::Two.crowning_row(), 7);
    }

    #[test]
    fn test_dark_square_mask_matches_parity() {
        let mask = Pos::dark_squares().fold(0u64, |mask, pos| mask | pos.bit());
        assert_eq!(mask, Board::DARK_SQUARES);
        assert_eq!(Pos::dark_squares().count(), 32);
    }

    #[test]
    fn test_pos_new_out_of_bounds() {
        assert_eq!(Pos::new(8, 0), Err(RuleError::OutOfBounds { row: 8, col: 0 }));
        assert_eq!(Pos::new(0, 8), Err(RuleError::OutOfBounds { row: 0, col: 8 }));
        assert_eq!(Pos::new(7, 7), Ok(pos(7, 7)));
        assert_eq!(Board::initial_layout().at(9, 9), Err(RuleError::OutOfBounds { row: 9, col: 9 }));
    }

    #[test]
    fn test_offset_never_wraps() {
        assert_eq!(pos(0, 0).offset(Direction::UpLeft), None);
        assert_eq!(pos(0, 3).offset(Direction::UpRight), None);
        assert_eq!(pos(3, 0).offset(Direction::DownLeft), None);
        assert_eq!(pos(7, 7).offset(Direction::DownRight), None);
        assert_eq!(pos(4, 7).offset(Direction::UpRight), None);
        assert_eq!(pos(4, 1).offset(Direction::UpLeft), Some(pos(3, 0)));
        assert_eq!(pos(4, 1).offset(Direction::DownRight), Some(pos(5, 2)));
    }

    #[test]
    fn test_initial_layout() {
        let board = Board::initial_layout();
        assert_eq!(board.count(Player::One), 12);
        assert_eq!(board.count(Player::Two), 12);
        assert_eq!(board.count_kings(Player::One), 0);

        for p in Pos::all() {
            let expected = if !p.is_dark() || (3..5).contains(&p.row()) {
                Cell::Empty
            } else if p.row() < 3 {
                Cell::pawn(Player::Two)
            } else {
                Cell::pawn(Player::One)
            };
            assert_eq!(board.cell_at(p), expected, "square {p}");
        }
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn test_set_and_cell_at() {
        let mut board = Board::empty();
        board.set(pos(4, 3), Cell::king(Player::Two)).unwrap();
        assert_eq!(board.cell_at(pos(4, 3)), Cell::king(Player::Two));
        assert_eq!(board.count_kings(Player::Two), 1);

        board.set(pos(4, 3), Cell::pawn(Player::One)).unwrap();
        assert_eq!(board.cell_at(pos(4, 3)), Cell::pawn(Player::One));
        assert_eq!(board.count_kings(Player::Two), 0);
        assert_eq!(board.count(Player::Two), 0);

        board.set(pos(4, 3), Cell::Empty).unwrap();
        assert_eq!(board, Board::empty());
    }

    #[test]
    fn test_set_light_square_rejected() {
        let mut board = Board::empty();
        let err = board.set(pos(0, 0), Cell::pawn(Player::One)).unwrap_err();
        assert!(matches!(err, RuleError::InvariantViolation(_)));
        // Clearing a light square is harmless.
        assert!(board.set(pos(0, 0), Cell::Empty).is_ok());
    }

    #[test]
    fn test_edge_pawn_has_single_step() {
        let board = Board::initial_layout();
        assert_eq!(
            board.legal_moves(pos(5, 0)),
            vec![Move::Step { from: pos(5, 0), to: pos(4, 1) }]
        );
    }

    #[test]
    fn test_blocked_back_rank_pawn_has_no_moves() {
        let board = Board::initial_layout();
        assert!(board.legal_moves(pos(6, 1)).is_empty());
        assert!(board.legal_moves(pos(7, 0)).is_empty());
    }

    #[test]
    fn test_empty_cell_has_no_moves() {
        let board = Board::initial_layout();
        assert!(board.legal_moves(pos(4, 1)).is_empty());
        assert!(board.legal_moves(pos(0, 0)).is_empty());
    }

    #[test]
    fn test_player_two_pawn_moves_down() {
        let board = Board::initial_layout();
        let moves = board.legal_moves(pos(2, 3));
        assert_eq!(
            moves,
            vec![
                Move::Step { from: pos(2, 3), to: pos(3, 2) },
                Move::Step { from: pos(2, 3), to: pos(3, 4) },
            ]
        );
    }

    #[test]
    fn test_pawn_capture() {
        let mut board = Board::empty();
        board.set(pos(3, 2), Cell::pawn(Player::One)).unwrap();
        board.set(pos(2, 3), Cell::pawn(Player::Two)).unwrap();

        let moves = board.legal_moves(pos(3, 2));
        assert!(moves.contains(&Move::Capture { from: pos(3, 2), over: pos(2, 3), to: pos(1, 4) }));
        assert!(moves.contains(&Move::Step { from: pos(3, 2), to: pos(2, 1) }));
        assert_eq!(moves.len(), 2);
        assert!(board.has_capture(Player::One));
        // The Player Two pawn cannot capture backwards.
        assert!(!board.has_capture(Player::Two));
    }

    #[test]
    fn test_capture_blocked_by_edge_and_pieces() {
        let mut board = Board::empty();
        // Jump would land off the board.
        board.set(pos(2, 1), Cell::pawn(Player::One)).unwrap();
        board.set(pos(1, 0), Cell::pawn(Player::Two)).unwrap();
        assert!(board.captures_from(pos(2, 1)).is_empty());

        // Landing square occupied.
        board.set(pos(5, 4), Cell::pawn(Player::One)).unwrap();
        board.set(pos(4, 5), Cell::pawn(Player::Two)).unwrap();
        board.set(pos(3, 6), Cell::pawn(Player::Two)).unwrap();
        assert!(board.captures_from(pos(5, 4)).is_empty());

        // Own pieces are never jumped.
        board.set(pos(4, 3), Cell::pawn(Player::One)).unwrap();
        assert!(board.captures_from(pos(5, 4)).is_empty());
    }

    #[test]
    fn test_king_moves_all_directions() {
        let mut board = Board::empty();
        board.set(pos(4, 3), Cell::king(Player::One)).unwrap();
        let moves = board.legal_moves(pos(4, 3));
        let targets: Vec<Pos> = moves.iter().map(Move::to).collect();
        assert_eq!(targets, vec![pos(3, 2), pos(3, 4), pos(5, 2), pos(5, 4)]);

        board.set(pos(5, 4), Cell::pawn(Player::Two)).unwrap();
        assert_eq!(
            board.captures_from(pos(4, 3)),
            vec![Move::Capture { from: pos(4, 3), over: pos(5, 4), to: pos(6, 5) }]
        );
    }

    #[test]
    fn test_corner_king_single_direction() {
        let mut board = Board::empty();
        board.set(pos(7, 0), Cell::king(Player::Two)).unwrap();
        assert_eq!(
            board.legal_moves(pos(7, 0)),
            vec![Move::Step { from: pos(7, 0), to: pos(6, 1) }]
        );
    }

    #[test]
    fn test_generated_destinations_are_empty() {
        let board: Board = "
            . o . o . o . o
            o . _ . o . o .
            . _ . o . X . o
            _ . x . _ . _ .
            . o . x . _ . _
            x . _ . O . x .
            . x . x . x . x
            x . x . x . _ .
        "
        .parse()
        .unwrap();

        for player in [Player::One, Player::Two] {
            for mov in board.all_moves(player) {
                assert!(board.is_empty(mov.to()), "{mov} lands on an occupied square");
                assert_eq!(board.cell_at(mov.from()).owner(), Some(player));
                if let Some(over) = mov.captured() {
                    assert_eq!(board.cell_at(over).owner(), Some(player.opponent()));
                }
            }
        }
    }

    #[test]
    fn test_apply_capture_and_promotion() {
        let mut board = Board::empty();
        board.set(pos(2, 3), Cell::pawn(Player::One)).unwrap();
        board.set(pos(1, 4), Cell::pawn(Player::Two)).unwrap();

        let promoted = board
            .apply_move(Move::Capture { from: pos(2, 3), over: pos(1, 4), to: pos(0, 5) })
            .unwrap();
        assert!(promoted);
        assert_eq!(board.cell_at(pos(0, 5)), Cell::king(Player::One));
        assert!(board.is_empty(pos(1, 4)));
        assert!(board.is_empty(pos(2, 3)));
        assert_eq!(board.count(Player::Two), 0);
    }

    #[test]
    fn test_apply_rejects_broken_moves() {
        let mut board = Board::initial_layout();
        let before = board;

        let into_occupied = Move::Step { from: pos(6, 1), to: pos(5, 0) };
        assert!(board.apply_move(into_occupied).is_err());

        let from_empty = Move::Step { from: pos(4, 1), to: pos(3, 0) };
        assert!(board.apply_move(from_empty).is_err());

        let jump_nothing = Move::Capture { from: pos(5, 2), over: pos(4, 3), to: pos(3, 4) };
        assert!(board.apply_move(jump_nothing).is_err());

        assert_eq!(board, before);
    }

    #[test]
    fn test_apply_rejects_non_diagonal_moves() {
        let mut board = Board::empty();
        board.set(pos(5, 0), Cell::pawn(Player::One)).unwrap();
        board.set(pos(4, 1), Cell::pawn(Player::Two)).unwrap();
        let before = board;

        let teleport = Move::Step { from: pos(5, 0), to: pos(0, 7) };
        assert_eq!(
            board.apply_move(teleport),
            Err(RuleError::IllegalDestination { from: pos(5, 0), to: pos(0, 7) })
        );

        let long_step = Move::Step { from: pos(5, 0), to: pos(3, 2) };
        assert!(board.apply_move(long_step).is_err());

        let wrong_over = Move::Capture { from: pos(5, 0), over: pos(4, 1), to: pos(1, 4) };
        assert!(board.apply_move(wrong_over).is_err());

        let skewed = Move::Capture { from: pos(5, 0), over: pos(4, 1), to: pos(3, 0) };
        assert!(board.apply_move(skewed).is_err());

        assert_eq!(board, before);
        assert!(Move::Capture { from: pos(5, 0), over: pos(4, 1), to: pos(3, 2) }.is_diagonal());
    }

    #[test]
    fn test_king_reaching_far_rank_is_not_promoted_again() {
        let mut board = Board::empty();
        board.set(pos(1, 2), Cell::king(Player::One)).unwrap();
        let promoted = board.apply_move(Move::Step { from: pos(1, 2), to: pos(0, 1) }).unwrap();
        assert!(!promoted);
        assert_eq!(board.cell_at(pos(0, 1)), Cell::king(Player::One));
    }

    #[test]
    fn test_board_display_parse() {
        let board = Board::initial_layout();
        let text = board.to_string();
        assert!(text.starts_with(". o . o . o . o\n"));
        assert_eq!(text.lines().nth(5), Some("x . x . x . x ."));
        assert_eq!(text.parse::<Board>(), Ok(board));
    }

    #[test]
    fn test_board_parse_errors() {
        assert!(matches!("x x x".parse::<Board>(), Err(RuleError::BadNotation(_))));

        let light_square_piece = format!("x{}", ".".repeat(63));
        assert!(matches!(
            light_square_piece.parse::<Board>(),
            Err(RuleError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_move_notation() {
        let step: Move = "5,0-4,1".parse().unwrap();
        assert_eq!(step, Move::Step { from: pos(5, 0), to: pos(4, 1) });
        assert_eq!(step.to_string(), "5,0-4,1");

        let capture: Move = " 3,2x1,4 ".parse().unwrap();
        assert_eq!(capture, Move::Capture { from: pos(3, 2), over: pos(2, 3), to: pos(1, 4) });
        assert_eq!(capture.to_string(), "3,2x1,4");

        assert!("5,0-3,2".parse::<Move>().is_err());
        assert!("3,2x2,3".parse::<Move>().is_err());
        assert!("5,0".parse::<Move>().is_err());
        assert_eq!(
            "9,0-8,1".parse::<Move>(),
            Err(RuleError::OutOfBounds { row: 9, col: 0 })
        );
    }

    #[test]
    fn test_pieces_iterates_in_index_order() {
        let board = Board::initial_layout();
        let first: Vec<Pos> = board.pieces(Player::Two).take(3).collect();
        assert_eq!(first, vec![pos(0, 1), pos(0, 3), pos(0, 5)]);
        assert_eq!(board.pieces(Player::One).count(), 12);
    }
}
