//! Pointer-to-board adapter and the seam to an external renderer.
//!
//! Nothing here decides what is legal. The adapter turns a pointer position
//! into a square, forwards it to the [`Game`], and projects the game state
//! into a [`View`] for drawing.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::RuleError;
use crate::game::{Applied, Game, Outcome};
use crate::{Board, Player, Pos};

/// Tile geometry in logical window units.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    /// Radius of a piece disc.
    pub piece_radius: f32,
    /// Radius of the inner mark drawn on kings.
    pub king_radius: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            width: 800.0,
            height: 800.0,
            piece_radius: 30.0,
            king_radius: 10.0,
        }
    }
}

impl Geometry {
    #[inline]
    pub fn tile_width(&self) -> f32 {
        self.width / f32::from(Pos::SIZE)
    }

    #[inline]
    pub fn tile_height(&self) -> f32 {
        self.height / f32::from(Pos::SIZE)
    }

    /// The square under a pointer, or `None` outside the board (or for NaN).
    pub fn cell_at_point(&self, x: f32, y: f32) -> Option<Pos> {
        let inside = x >= 0.0 && y >= 0.0 && x < self.width && y < self.height;
        if !inside {
            return None;
        }
        let max = Pos::SIZE - 1;
        let col = ((x / self.tile_width()) as u8).min(max);
        let row = ((y / self.tile_height()) as u8).min(max);
        Pos::new(row, col).ok()
    }

    /// Pixel centre of a square.
    pub fn cell_center(&self, pos: Pos) -> (f32, f32) {
        (
            (f32::from(pos.col()) + 0.5) * self.tile_width(),
            (f32::from(pos.row()) + 0.5) * self.tile_height(),
        )
    }
}

/// What a pointer release did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Released outside the board.
    Ignored,
    Selected { pos: Pos },
    Deselected,
    Moved { applied: Applied },
}

/// Read-only snapshot handed to the renderer each frame.
///
/// Serialized, `board` is 64 [`Cell::code`](crate::Cell::code) values in
/// row-major order.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct View<'a> {
    #[serde(serialize_with = "cell_codes")]
    pub board: &'a Board,
    pub side_to_move: Player,
    pub selected: Option<Pos>,
    pub highlighted: Vec<Pos>,
    pub outcome: Option<Outcome>,
}

fn cell_codes<S: Serializer>(board: &&Board, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(Pos::all().map(|pos| board.cell_at(pos).code()))
}

/// Source of pointer events, polled once per frame.
pub trait PointerInput {
    /// Position of a pointer release since the last poll, if any.
    fn poll_release(&mut self) -> Option<(f32, f32)>;
}

/// Draws a [`View`].
pub trait Renderer {
    fn draw(&mut self, view: &View<'_>, geometry: &Geometry);
}

/// Maps pointer input onto a [`Game`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionAdapter {
    geometry: Geometry,
}

impl SelectionAdapter {
    pub fn new(geometry: Geometry) -> SelectionAdapter {
        SelectionAdapter { geometry }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Handle one pointer release.
    ///
    /// - outside the board: ignored
    /// - on the selected piece: deselect (except mid-chain)
    /// - on another piece of the side to move: select it
    /// - anywhere else with a selection: try to move there
    pub fn pointer_released(&self, game: &mut Game, x: f32, y: f32) -> Result<InputEvent, RuleError> {
        let Some(pos) = self.geometry.cell_at_point(x, y) else {
            return Ok(InputEvent::Ignored);
        };
        if let Some(outcome) = game.outcome() {
            return Err(RuleError::GameFinished(outcome));
        }

        let own_piece = game.board().cell_at(pos).owner() == Some(game.side_to_move());
        match game.selected() {
            Some(selected) if selected == pos => {
                game.deselect();
                Ok(match game.selected() {
                    Some(_) => InputEvent::Selected { pos },
                    None => InputEvent::Deselected,
                })
            }
            Some(_) if !own_piece => {
                let applied = game.choose(pos)?;
                Ok(InputEvent::Moved { applied })
            }
            _ => {
                game.select(pos)?;
                Ok(InputEvent::Selected { pos })
            }
        }
    }

    pub fn currently_selected(&self, game: &Game) -> Option<Pos> {
        game.selected()
    }

    pub fn highlighted_destinations(&self, game: &Game) -> Vec<Pos> {
        game.highlighted()
    }

    pub fn view<'a>(&self, game: &'a Game) -> View<'a> {
        View {
            board: game.board(),
            side_to_move: game.side_to_move(),
            selected: self.currently_selected(game),
            highlighted: self.highlighted_destinations(game),
            outcome: game.outcome(),
        }
    }

    /// One frame: poll input once, apply at most one transition, render.
    ///
    /// Returns the result of the pointer event, if there was one. Rejected
    /// input is reported but does not stop the frame from rendering.
    pub fn run_frame<I, R>(
        &self,
        game: &mut Game,
        input: &mut I,
        renderer: &mut R,
    ) -> Option<Result<InputEvent, RuleError>>
    where
        I: PointerInput + ?Sized,
        R: Renderer + ?Sized,
    {
        let result = input
            .poll_release()
            .map(|(x, y)| self.pointer_released(game, x, y));
        renderer.draw(&self.view(game), &self.geometry);
        result
    }
}
