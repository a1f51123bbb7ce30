//! Terminal host for the checkers controller.
//!
//! Stands in for a windowed front end: each stdin line is at most one pointer
//! release (or a direct command), and the board is redrawn after every frame.
//!
//! Usage:
//!   cargo run --bin play
//!   cargo run --bin play -- --no-forced-capture --quiet-limit 40
//!   cargo run --bin play -- --rules rules.json
//!
//! Commands:
//!   click X Y      pointer release at window coordinates
//!   cell R C       pointer release at the centre of square (R, C)
//!   move 5,0-4,1   play a move in notation
//!   undo | reset | moves | quit

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use checkers_core::{
    Game, Geometry, InputEvent, Move, PointerInput, Pos, Renderer, Rules, SelectionAdapter, View,
};

#[derive(Parser, Debug)]
#[command(about = "Play checkers from the terminal")]
struct Args {
    /// Window width in logical units.
    #[arg(long, default_value_t = 800.0)]
    width: f32,
    /// Window height in logical units.
    #[arg(long, default_value_t = 800.0)]
    height: f32,
    /// Quiet plies before a draw; 0 disables the rule.
    #[arg(long)]
    quiet_limit: Option<u16>,
    /// Allow steps while a capture is available.
    #[arg(long)]
    no_forced_capture: bool,
    /// JSON file with rule options; command-line flags override it.
    #[arg(long)]
    rules: Option<PathBuf>,
}

impl Args {
    fn load_rules(&self) -> anyhow::Result<Rules> {
        let mut rules = match &self.rules {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => Rules::default(),
        };
        if self.no_forced_capture {
            rules.forced_capture = false;
        }
        if let Some(limit) = self.quiet_limit {
            rules.quiet_move_limit = Some(limit);
        }
        Ok(rules)
    }

    fn geometry(&self) -> anyhow::Result<Geometry> {
        if !(self.width > 0.0 && self.height > 0.0) {
            bail!("window size must be positive, got {}x{}", self.width, self.height);
        }
        Ok(Geometry { width: self.width, height: self.height, ..Geometry::default() })
    }
}

/// Holds the release parsed from the current stdin line until the next poll.
#[derive(Default)]
struct LineInput {
    pending: Option<(f32, f32)>,
}

impl PointerInput for LineInput {
    fn poll_release(&mut self) -> Option<(f32, f32)> {
        self.pending.take()
    }
}

/// Draws the board as text. `[ ]` marks the selected piece, `*` a
/// highlighted destination.
struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        writeln!(self.out, "    0  1  2  3  4  5  6  7")?;
        for row in 0..Pos::SIZE {
            write!(self.out, "{row} ")?;
            for col in 0..Pos::SIZE {
                let pos = Pos::from_row_col(row, col);
                let symbol = if !pos.is_dark() {
                    '.'
                } else if view.highlighted.contains(&pos) {
                    '*'
                } else {
                    view.board.cell_at(pos).symbol()
                };
                if view.selected == Some(pos) {
                    write!(self.out, "[{symbol}]")?;
                } else {
                    write!(self.out, " {symbol} ")?;
                }
            }
            writeln!(self.out)?;
        }
        match view.outcome {
            Some(outcome) => writeln!(self.out, "Game over: {outcome}")?,
            None => writeln!(self.out, "{} to move", view.side_to_move)?,
        }
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn draw(&mut self, view: &View<'_>, _geometry: &Geometry) {
        if let Err(e) = self.render(view) {
            eprintln!("render failed: {e}");
        }
    }
}

enum Command {
    Release(f32, f32),
    Play(Move),
    Undo,
    Reset,
    Moves,
    Quit,
}

fn parse_command(line: &str, geometry: &Geometry) -> anyhow::Result<Option<Command>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        [] => return Ok(None),
        ["click", x, y] => {
            let x = x.parse().with_context(|| format!("bad x coordinate '{x}'"))?;
            let y = y.parse().with_context(|| format!("bad y coordinate '{y}'"))?;
            Command::Release(x, y)
        }
        ["cell", row, col] => {
            let row = row.parse().with_context(|| format!("bad row '{row}'"))?;
            let col = col.parse().with_context(|| format!("bad column '{col}'"))?;
            let (x, y) = geometry.cell_center(Pos::new(row, col)?);
            Command::Release(x, y)
        }
        ["move", notation] => Command::Play(notation.parse()?),
        ["undo"] => Command::Undo,
        ["reset"] => Command::Reset,
        ["moves"] => Command::Moves,
        ["quit"] | ["exit"] => Command::Quit,
        _ => bail!("unknown command '{line}'"),
    };
    Ok(Some(command))
}

fn describe(event: InputEvent) -> String {
    match event {
        InputEvent::Ignored => "ignored (outside the board)".to_string(),
        InputEvent::Selected { pos } => format!("selected {pos}"),
        InputEvent::Deselected => "deselected".to_string(),
        InputEvent::Moved { applied } => {
            let mut text = format!("{} played {}", applied.mover, applied.mov);
            if applied.promoted {
                text.push_str(", crowned");
            }
            if !applied.turn_over {
                text.push_str(", must keep capturing");
            }
            text
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let rules = args.load_rules()?;
    let adapter = SelectionAdapter::new(args.geometry()?);
    let mut game = Game::with_rules(rules);
    let rules = *game.rules();
    let mut input = LineInput::default();
    let mut renderer = TextRenderer { out: io::stdout() };

    println!("Checkers");
    println!("========");
    println!("Forced capture: {}", rules.forced_capture);
    match rules.quiet_move_limit {
        Some(limit) => println!("Quiet-move limit: {limit} plies"),
        None => println!("Quiet-move limit: off"),
    }
    println!();
    renderer.draw(&adapter.view(&game), adapter.geometry());

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let command = match parse_command(line.trim(), adapter.geometry()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e:#}");
                continue;
            }
        };

        match command {
            Command::Release(x, y) => {
                input.pending = Some((x, y));
                match adapter.run_frame(&mut game, &mut input, &mut renderer) {
                    Some(Ok(event)) => println!("{}", describe(event)),
                    Some(Err(e)) => eprintln!("rejected: {e}"),
                    None => {}
                }
            }
            Command::Play(mov) => {
                match game.play(mov) {
                    Ok(applied) => println!("{}", describe(InputEvent::Moved { applied })),
                    Err(e) => eprintln!("rejected: {e}"),
                }
                renderer.draw(&adapter.view(&game), adapter.geometry());
            }
            Command::Undo => {
                match game.undo() {
                    Some(mov) => println!("took back {mov}"),
                    None => eprintln!("nothing to undo"),
                }
                renderer.draw(&adapter.view(&game), adapter.geometry());
            }
            Command::Reset => {
                game.reset();
                renderer.draw(&adapter.view(&game), adapter.geometry());
            }
            Command::Moves => {
                let moves = game.turn_moves();
                if moves.is_empty() {
                    println!("no legal moves");
                }
                for mov in moves {
                    println!("  {mov}");
                }
            }
            Command::Quit => break,
        }
    }
    Ok(())
}
