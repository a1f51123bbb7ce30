//! WASM bindings for checkers-core
//!
//! Exposes the game controller to a browser renderer. The page forwards
//! pointer releases and redraws from `view()` every frame.

use wasm_bindgen::prelude::*;

use crate::{Game, Geometry, Move, Outcome, Player, Pos, Rules, SelectionAdapter};

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn rule_error(err: crate::RuleError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-friendly wrapper around Game and its input adapter
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
    adapter: SelectionAdapter,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a standard game with the default 800x800 geometry
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            game: Game::new(),
            adapter: SelectionAdapter::default(),
        }
    }

    /// Start a game from `Rules` and `Geometry` objects. Missing fields take
    /// their defaults; `undefined` means all defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(rules: JsValue, geometry: JsValue) -> Result<WasmGame, JsValue> {
        let rules: Rules = if rules.is_undefined() {
            Rules::default()
        } else {
            serde_wasm_bindgen::from_value(rules)?
        };
        let geometry: Geometry = if geometry.is_undefined() {
            Geometry::default()
        } else {
            serde_wasm_bindgen::from_value(geometry)?
        };
        Ok(WasmGame {
            game: Game::with_rules(rules),
            adapter: SelectionAdapter::new(geometry),
        })
    }

    /// Feed one pointer release. Returns the input event as an object, or
    /// throws the rejection message.
    #[wasm_bindgen(js_name = pointerReleased)]
    pub fn pointer_released(&mut self, x: f32, y: f32) -> Result<JsValue, JsValue> {
        let event = self
            .adapter
            .pointer_released(&mut self.game, x, y)
            .map_err(rule_error)?;
        to_js(&event)
    }

    /// Snapshot for drawing: board (cell codes as in `cells()`), side to move,
    /// selection, highlights, outcome
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&self.adapter.view(&self.game))
    }

    /// 64 cell codes, row-major: 0 empty, 1 P1 pawn, 2 P1 king, 3 P2 pawn, 4 P2 king
    pub fn cells(&self) -> Vec<u8> {
        let board = self.game.board();
        Pos::all().map(|pos| board.cell_at(pos).code()).collect()
    }

    /// Current player (1 or 2)
    #[wasm_bindgen(js_name = sideToMove)]
    pub fn side_to_move(&self) -> u8 {
        self.game.side_to_move() as u8
    }

    /// Legal moves this turn as an array of move objects
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.turn_moves())
    }

    /// Apply a move in notation ("5,0-4,1", "3,2x1,4")
    #[wasm_bindgen(js_name = playMove)]
    pub fn play_move(&mut self, notation: &str) -> Result<JsValue, JsValue> {
        let mov: Move = notation.parse().map_err(rule_error)?;
        let applied = self.game.play(mov).map_err(rule_error)?;
        to_js(&applied)
    }

    /// Take back one move. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.game.undo().is_some()
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    /// Get game result: "ongoing", "player_one_wins", "player_two_wins", or "draw"
    pub fn result(&self) -> String {
        match self.game.outcome() {
            None => "ongoing".to_string(),
            Some(Outcome::Winner(Player::One)) => "player_one_wins".to_string(),
            Some(Outcome::Winner(Player::Two)) => "player_two_wins".to_string(),
            Some(Outcome::Draw) => "draw".to_string(),
        }
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
